//! Overlap events reported by the [`TriggerSystem`](crate::TriggerSystem)

use serde::{Deserialize, Serialize};

/// Identifier of a registered trigger volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VolumeId(pub u64);

/// What a volume means to the character overlapping it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerTag {
    /// Redefines the movement plane while inside
    DynamicPlane,
    /// Lets the character leave the current plane along a path
    PlaneBreaker,
    /// Pushes parameter overrides while inside
    Effector,
}

/// Direction of a boundary crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crossing {
    Enter,
    Exit,
}

/// The tracked point crossed the boundary of a volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    pub crossing: Crossing,
    pub volume: VolumeId,
    pub tag: TriggerTag,
    /// Seconds spent inside before leaving; zero on enter
    pub dwell: f32,
}

impl TriggerEvent {
    pub fn enter(volume: VolumeId, tag: TriggerTag) -> Self {
        Self { crossing: Crossing::Enter, volume, tag, dwell: 0.0 }
    }

    pub fn exit(volume: VolumeId, tag: TriggerTag, dwell: f32) -> Self {
        Self { crossing: Crossing::Exit, volume, tag, dwell }
    }

    #[inline]
    pub fn is_enter(&self) -> bool {
        matches!(self.crossing, Crossing::Enter)
    }

    #[inline]
    pub fn is_exit(&self) -> bool {
        matches!(self.crossing, Crossing::Exit)
    }
}
