//! Overlap tracking for a single character

use crate::events::{TriggerEvent, TriggerTag, VolumeId};
use crate::volume::TriggerVolume;
use planar_math::Vec3;
use std::collections::BTreeMap;

/// A volume placed in the world
#[derive(Debug, Clone)]
pub struct RegisteredVolume {
    pub tag: TriggerTag,
    pub shape: TriggerVolume,
    pub position: Vec3,
}

/// Tracks which volumes contain a moving point
///
/// Events come out in a fixed order: every exit before any enter, each
/// group in ascending volume id. A character that crosses from one plane
/// volume into an adjacent one therefore always leaves before it enters.
pub struct TriggerSystem {
    volumes: BTreeMap<VolumeId, RegisteredVolume>,
    /// Volumes currently containing the point, with time spent inside
    inside: BTreeMap<VolumeId, f32>,
    /// Exits produced by unregistering an occupied volume
    pending: Vec<TriggerEvent>,
    next_id: u64,
}

impl TriggerSystem {
    /// Create a new trigger system
    pub fn new() -> Self {
        Self {
            volumes: BTreeMap::new(),
            inside: BTreeMap::new(),
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a volume
    pub fn register(&mut self, tag: TriggerTag, shape: TriggerVolume, position: Vec3) -> VolumeId {
        let id = VolumeId(self.next_id);
        self.next_id += 1;
        log::debug!("registered {:?} volume {:?} at {:?}", tag, id, position);
        self.volumes.insert(
            id,
            RegisteredVolume {
                tag,
                shape,
                position,
            },
        );
        id
    }

    /// Unregister a volume; an occupied volume reports its exit on the next update
    pub fn unregister(&mut self, id: VolumeId) -> Option<RegisteredVolume> {
        let volume = self.volumes.remove(&id)?;
        if let Some(time) = self.inside.remove(&id) {
            self.pending.push(TriggerEvent::exit(id, volume.tag, time));
        }
        Some(volume)
    }

    /// Move a volume
    pub fn set_position(&mut self, id: VolumeId, position: Vec3) {
        match self.volumes.get_mut(&id) {
            Some(volume) => volume.position = position,
            None => log::warn!("set_position on unknown volume {:?}", id),
        }
    }

    pub fn volume(&self, id: VolumeId) -> Option<&RegisteredVolume> {
        self.volumes.get(&id)
    }

    /// Whether the tracked point was inside `id` at the last update
    pub fn is_inside(&self, id: VolumeId) -> bool {
        self.inside.contains_key(&id)
    }

    /// Volumes containing the tracked point, ascending by id
    pub fn overlapping(&self) -> impl Iterator<Item = VolumeId> + '_ {
        self.inside.keys().copied()
    }

    /// Get volume count
    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    /// Test `point` against every volume and report what changed
    pub fn update(&mut self, delta_time: f32, point: Vec3) -> Vec<TriggerEvent> {
        let mut exits = std::mem::take(&mut self.pending);
        let mut enters = Vec::new();

        for (&id, volume) in &self.volumes {
            let contains = volume.shape.contains_point_at(point, volume.position);
            match (self.inside.get_mut(&id), contains) {
                (Some(time), true) => *time += delta_time,
                (Some(time), false) => {
                    exits.push(TriggerEvent::exit(id, volume.tag, *time));
                }
                (None, true) => enters.push(TriggerEvent::enter(id, volume.tag)),
                (None, false) => {}
            }
        }

        for event in &exits {
            self.inside.remove(&event.volume);
        }
        for event in &enters {
            self.inside.insert(event.volume, 0.0);
        }

        exits.extend(enters);
        exits
    }

    /// Forget all overlaps without producing events
    pub fn reset(&mut self) {
        self.inside.clear();
        self.pending.clear();
    }
}

impl Default for TriggerSystem {
    fn default() -> Self {
        Self::new()
    }
}
