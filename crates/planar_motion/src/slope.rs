//! Slope history and the rotational momentum estimator
//!
//! While grounded, every change of ground normal is recorded together with
//! how long the previous slope was ridden. On leaving the ground the
//! recorded curvature is turned into an airborne spin about the plane
//! normal, so a character launched off the lip of a curve keeps rotating
//! the way the curve was turning it.

use crate::config::SlopeHistoryConfig;
use planar_math::Vec3;
use std::collections::VecDeque;

/// Number of slope samples kept
pub const SLOPE_HISTORY_CAPACITY: usize = 5;

/// A ground normal and how long it was ridden
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeSample {
    pub normal: Vec3,
    pub time_on_slope: f32,
}

#[derive(Debug, Clone)]
pub struct SlopeHistory {
    samples: VecDeque<SlopeSample>,
    time_on_slope: f32,
    config: SlopeHistoryConfig,
}

impl SlopeHistory {
    pub fn new(config: SlopeHistoryConfig) -> Self {
        Self {
            samples: VecDeque::with_capacity(SLOPE_HISTORY_CAPACITY),
            time_on_slope: 0.0,
            config,
        }
    }

    pub fn samples(&self) -> impl Iterator<Item = &SlopeSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn time_on_slope(&self) -> f32 {
        self.time_on_slope
    }

    /// Advance the slope timer; stale history is dropped
    pub fn tick(&mut self, dt: f32) {
        self.time_on_slope += dt;
        if self.time_on_slope > self.config.max_track_time && !self.samples.is_empty() {
            log::trace!("slope history stale after {:.3}s, clearing", self.time_on_slope);
            self.samples.clear();
        }
    }

    /// Append a sample, evicting the oldest when full
    pub fn record(&mut self, normal: Vec3) {
        if self.samples.len() == SLOPE_HISTORY_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(SlopeSample {
            normal,
            time_on_slope: self.time_on_slope,
        });
        self.time_on_slope = 0.0;
    }

    /// The ground normal changed while grounded; `previous` is the slope just left
    pub fn record_slope_change(&mut self, previous: Vec3) {
        self.record(previous);
    }

    /// Record the last ground normal and turn the history into a spin
    pub fn leave_ground(&mut self, last_normal: Vec3, axis: Vec3) -> f32 {
        self.record(last_normal);
        let spin = self.estimate(axis);
        self.clear();
        spin
    }

    /// Average angular rate across adjacent samples, scaled and clamped
    pub fn estimate(&self, axis: Vec3) -> f32 {
        if self.samples.len() < 2 {
            return 0.0;
        }

        let mut total = 0.0;
        let mut pairs = 0;
        for (a, b) in self.samples.iter().zip(self.samples.iter().skip(1)) {
            let duration = a.time_on_slope + b.time_on_slope;
            if duration <= f32::EPSILON {
                continue;
            }
            total += a.normal.signed_angle(b.normal, axis) / duration;
            pairs += 1;
        }
        if pairs == 0 {
            return 0.0;
        }

        let rate = total / pairs as f32 * self.config.rotation_factor;
        let rate = rate.clamp(-self.config.max_angular_speed, self.config.max_angular_speed);
        if rate.abs() < self.config.min_angular_speed {
            0.0
        } else {
            rate
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.time_on_slope = 0.0;
    }
}
