//! Contract with the host kinematic motor
//!
//! The host owns collision sweeping and ground probing. Each tick it calls
//! the [`MotorCallbacks`] in a fixed order:
//!
//! ```text
//! before_update -> update_rotation -> update_velocity
//!   -> (host moves, reporting hits) -> (host probes ground)
//!   -> post_grounding_update -> after_update
//! ```
//!
//! [`MotorLink`] is the state the two sides share: the host writes position
//! and grounding, the character writes tolerances and unground requests.

use crate::layers::ColliderInfo;
use planar_math::{Quat, Vec3};

/// Result of the host's ground probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundingReport {
    pub found_any_ground: bool,
    pub is_stable_on_ground: bool,
    pub ground_normal: Vec3,
    pub ground_point: Vec3,
}

impl Default for GroundingReport {
    fn default() -> Self {
        Self {
            found_any_ground: false,
            is_stable_on_ground: false,
            ground_normal: Vec3::Y,
            ground_point: Vec3::ZERO,
        }
    }
}

impl GroundingReport {
    pub fn stable(normal: Vec3, point: Vec3) -> Self {
        Self {
            found_any_ground: true,
            is_stable_on_ground: true,
            ground_normal: normal,
            ground_point: point,
        }
    }

    pub fn airborne() -> Self {
        Self::default()
    }
}

/// A contact found while sweeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    pub normal: Vec3,
    pub point: Vec3,
    /// Host's own stability verdict for the hit
    pub is_stable: bool,
    pub collider: ColliderInfo,
}

/// Host stability classification, open to correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitStabilityReport {
    pub is_stable: bool,
    pub ledge_detected: bool,
    /// Normal of the surface on the inner side of a ledge
    pub inner_normal: Vec3,
    pub outer_normal: Vec3,
}

/// State shared between the host motor and a character
#[derive(Debug, Clone, PartialEq)]
pub struct MotorLink {
    pub position: Vec3,
    pub rotation: Quat,
    pub grounding: GroundingReport,
    pub last_grounding: GroundingReport,
    /// Written by the character every tick, degrees
    pub max_stable_slope_angle: f32,
    /// Written by the character every tick
    pub ground_probe_distance: f32,
    must_unground: bool,
}

impl MotorLink {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            grounding: GroundingReport::default(),
            last_grounding: GroundingReport::default(),
            max_stable_slope_angle: 60.0,
            ground_probe_distance: 0.1,
            must_unground: false,
        }
    }

    /// Host side: store a new probe result, keeping the previous one
    pub fn set_grounding(&mut self, report: GroundingReport) {
        self.last_grounding = self.grounding;
        self.grounding = report;
    }

    /// Ask the host to skip ground snapping on its next probe
    pub fn force_unground(&mut self) {
        self.must_unground = true;
    }

    pub fn must_unground(&self) -> bool {
        self.must_unground
    }

    /// Host side: consume the unground request
    pub fn take_force_unground(&mut self) -> bool {
        std::mem::take(&mut self.must_unground)
    }
}

/// Callbacks a host motor drives once per tick
///
/// None of these return errors: every expected edge condition is handled
/// in place.
pub trait MotorCallbacks {
    fn before_update(&mut self, motor: &mut MotorLink, dt: f32);

    fn update_rotation(&mut self, motor: &mut MotorLink, rotation: &mut Quat, dt: f32);

    fn update_velocity(&mut self, motor: &mut MotorLink, velocity: &mut Vec3, dt: f32);

    fn post_grounding_update(&mut self, motor: &mut MotorLink, dt: f32);

    fn after_update(&mut self, motor: &mut MotorLink, dt: f32);

    /// Contact found by the ground probe
    fn on_ground_hit(&mut self, motor: &MotorLink, hit: &HitInfo);

    /// Contact found while moving
    fn on_movement_hit(&mut self, motor: &MotorLink, hit: &HitInfo);

    fn process_hit_stability_report(
        &mut self,
        motor: &MotorLink,
        hit: &HitInfo,
        report: &mut HitStabilityReport,
    );

    /// Overlap resolved outside of a sweep
    fn on_discrete_collision_detected(&mut self, motor: &MotorLink, hit: &HitInfo);

    fn is_collider_valid_for_collisions(&self, collider: &ColliderInfo) -> bool;
}
