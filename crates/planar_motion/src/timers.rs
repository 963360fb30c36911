//! Cooperative single-shot timers keyed by purpose

use std::collections::BTreeMap;

/// What a timer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKey {
    UngroundedJumpBuffer,
    KinematicPath,
    Dash,
}

/// What happens when a timer runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    ClearJumpBuffer,
    EndKinematicPath,
    EndDash,
}

#[derive(Debug, Clone)]
struct Timer<A> {
    remaining: f32,
    action: A,
}

/// Timer table ticked once per simulation step
///
/// Starting a timer under a key that is already running replaces it.
/// Timers that expire on the same tick complete in key order.
#[derive(Debug, Clone)]
pub struct TimerTable<K, A> {
    timers: BTreeMap<K, Timer<A>>,
}

impl<K: Ord + Copy, A: Clone> TimerTable<K, A> {
    pub fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
        }
    }

    /// Start (or restart) the timer for `key`; returns the replaced action
    pub fn start(&mut self, key: K, duration: f32, action: A) -> Option<A> {
        self.timers
            .insert(
                key,
                Timer {
                    remaining: duration.max(0.0),
                    action,
                },
            )
            .map(|old| old.action)
    }

    pub fn cancel(&mut self, key: K) -> bool {
        self.timers.remove(&key).is_some()
    }

    pub fn is_active(&self, key: K) -> bool {
        self.timers.contains_key(&key)
    }

    pub fn remaining(&self, key: K) -> Option<f32> {
        self.timers.get(&key).map(|t| t.remaining)
    }

    /// Advance every timer, returning the ones that completed
    pub fn tick(&mut self, dt: f32) -> Vec<(K, A)> {
        let mut done = Vec::new();
        for (key, timer) in self.timers.iter_mut() {
            timer.remaining -= dt;
            if timer.remaining <= 0.0 {
                done.push((*key, timer.action.clone()));
            }
        }
        for (key, _) in &done {
            self.timers.remove(key);
        }
        done
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

impl<K: Ord + Copy, A: Clone> Default for TimerTable<K, A> {
    fn default() -> Self {
        Self::new()
    }
}

/// The timer table a character runs on
pub type MotionTimers = TimerTable<TimerKey, TimerAction>;
