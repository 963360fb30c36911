//! Binary snapshots of a character's motion state
//!
//! Snapshots carry the state a host needs to rewind a character (replays,
//! checkpoints). Attribute overrides, timers and volume occupancy are owned
//! by whoever applied them and are not part of a snapshot.

use crate::error::{MotionError, Result};
use crate::state::MotionState;
use planar_math::{Plane, Vec3};
use serde::{Deserialize, Serialize};

/// Format version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSnapshot {
    pub version: u32,
    pub state: MotionState,
    pub plane: Plane,
    pub up: Vec3,
}

impl MotionSnapshot {
    pub fn new(state: MotionState, plane: Plane, up: Vec3) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            state,
            plane,
            up,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let snapshot: Self = bincode::deserialize(data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(MotionError::IncompatibleSnapshot {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_restore_state() {
        let mut state = MotionState::default();
        state.velocity = Vec3::new(3.0, -1.0, 0.0);
        state.grounded = true;
        state.air_jumps_used = 2;
        let snapshot = MotionSnapshot::new(state, Plane::default(), Vec3::Y);

        let restored = MotionSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut snapshot = MotionSnapshot::new(MotionState::default(), Plane::default(), Vec3::Y);
        snapshot.version = 99;
        let bytes = snapshot.to_bytes().unwrap();

        assert!(matches!(
            MotionSnapshot::from_bytes(&bytes),
            Err(MotionError::IncompatibleSnapshot { found: 99, .. })
        ));
    }

    #[test]
    fn test_truncated_bytes_rejected() {
        let bytes = MotionSnapshot::new(MotionState::default(), Plane::default(), Vec3::Y)
            .to_bytes()
            .unwrap();
        assert!(matches!(
            MotionSnapshot::from_bytes(&bytes[..bytes.len() / 2]),
            Err(MotionError::Snapshot(_))
        ));
    }
}
