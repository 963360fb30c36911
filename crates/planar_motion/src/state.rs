//! Per-character motion state

use planar_math::Vec3;
use serde::{Deserialize, Serialize};

/// Which way along the movement axis the character faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing for a signed value; zero keeps `current`
    pub fn from_sign(value: f32, current: Facing) -> Facing {
        if value > 0.0 {
            Facing::Right
        } else if value < 0.0 {
            Facing::Left
        } else {
            current
        }
    }
}

/// Physics effects a contributor has claimed for the current tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Negations {
    pub friction: bool,
    pub drag: bool,
    pub gravity: bool,
}

impl Negations {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn any(&self) -> bool {
        self.friction || self.drag || self.gravity
    }
}

/// Non-ground contacts from the last movement sweep
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WallHitSet {
    pub ceiling: Option<Vec3>,
    pub left: Option<Vec3>,
    pub right: Option<Vec3>,
}

impl WallHitSet {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.ceiling.is_none() && self.left.is_none() && self.right.is_none()
    }

    pub fn normals(&self) -> impl Iterator<Item = Vec3> + '_ {
        [self.ceiling, self.left, self.right].into_iter().flatten()
    }

    /// Whether moving along `direction` pushes into any recorded surface
    pub fn blocks(&self, direction: Vec3) -> bool {
        self.normals().any(|n| direction.dot(n) < 0.0)
    }
}

/// Motion state of one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub velocity: Vec3,
    /// Spin about the active plane normal, radians per second
    pub angular_velocity: f32,
    pub grounded: bool,
    pub was_grounded: bool,
    pub facing: Facing,
    pub is_jumping: bool,
    /// Ground normal from the latest grounded tick
    pub ground_normal: Vec3,
    /// Set when the ground normal changed since the previous grounded tick
    pub slope_changed: bool,
    /// Ground normal usable for a late jump after walking off a ledge
    pub ungrounded_jump_normal: Option<Vec3>,
    pub air_jumps_used: i32,
    /// Continuous time spent on a non-walkable slope
    pub steep_time: f32,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            angular_velocity: 0.0,
            grounded: false,
            was_grounded: false,
            facing: Facing::Right,
            is_jumping: false,
            ground_normal: Vec3::Y,
            slope_changed: false,
            ungrounded_jump_normal: None,
            air_jumps_used: 0,
            steep_time: 0.0,
        }
    }
}

impl MotionState {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn just_landed(&self) -> bool {
        self.grounded && !self.was_grounded
    }

    pub fn just_left_ground(&self) -> bool {
        !self.grounded && self.was_grounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_from_sign() {
        assert_eq!(Facing::from_sign(-0.3, Facing::Right), Facing::Left);
        assert_eq!(Facing::from_sign(0.0, Facing::Left), Facing::Left);
        assert_eq!(Facing::Left.sign(), -1.0);
    }

    #[test]
    fn test_wall_hits_block_only_into_surface() {
        let hits = WallHitSet {
            right: Some(Vec3::NEG_X),
            ..Default::default()
        };
        assert!(hits.blocks(Vec3::X));
        assert!(!hits.blocks(Vec3::NEG_X));

        let mut hits = hits;
        hits.clear();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_negations_clear() {
        let mut n = Negations {
            friction: true,
            gravity: true,
            ..Default::default()
        };
        assert!(n.any());
        n.clear();
        assert!(!n.any());
    }
}
