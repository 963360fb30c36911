//! The contributor pipeline
//!
//! Action, Ability and Physics each get one shot per tick at the rotation
//! and the velocity, always in that order. A contributor that takes over a
//! physics effect for the tick raises the matching flag in
//! [`MotionContext::negations`]; Physics skips flagged effects and the
//! orchestrator clears the flags at the end of the tick.

pub mod ability;
pub mod action;
pub mod physics;

use crate::attributes::{CharacterAttributes, MotorSchema, PhysicsSchema};
use crate::config::MotionConfig;
use crate::error::Result;
use crate::events::MotionEvent;
use crate::input::InputLatch;
use crate::state::{MotionState, Negations, WallHitSet};
use crate::timers::MotionTimers;
use planar_event::EventBus;
use planar_math::{Plane, Vec3};

pub use ability::{Ability, AbilityContributor};
pub use action::ActionContributor;
pub use physics::PhysicsContributor;

/// Everything a contributor may read or change during one callback
pub struct MotionContext {
    pub dt: f32,
    pub state: MotionState,
    pub negations: Negations,
    pub wall_hits: WallHitSet,
    pub input: InputLatch,
    pub attributes: CharacterAttributes,
    /// Active constraint plane
    pub plane: Plane,
    pub timers: MotionTimers,
    pub events: EventBus<MotionEvent>,
    /// Unground request waiting for the next `before_update`
    pub force_unground: bool,
}

impl MotionContext {
    pub fn new(config: &MotionConfig) -> Result<Self> {
        Ok(Self {
            dt: config.timestep,
            state: MotionState::default(),
            negations: Negations::default(),
            wall_hits: WallHitSet::default(),
            input: InputLatch::new(),
            attributes: CharacterAttributes::from_config(config)?,
            plane: config.plane,
            timers: MotionTimers::new(),
            events: EventBus::new(),
            force_unground: false,
        })
    }

    /// Opposite of the effective gravity
    pub fn world_up(&self) -> Vec3 {
        (-self.attributes.physics.vector(PhysicsSchema::GRAVITY))
            .try_normalize()
            .unwrap_or(Vec3::Y)
    }

    /// In-plane axis perpendicular to `up`, pointing "right"
    pub fn move_axis(&self, up: Vec3) -> Vec3 {
        up.cross(self.plane.normal).normalize_or_zero()
    }

    /// Movement axis along the current ground
    pub fn ground_tangent(&self) -> Vec3 {
        self.move_axis(self.state.ground_normal)
    }

    /// Movement axis while airborne
    pub fn air_axis(&self) -> Vec3 {
        self.move_axis(self.world_up())
    }

    /// Angle between the ground normal and world up, degrees
    pub fn slope_angle(&self) -> f32 {
        planar_math::degrees(self.state.ground_normal.angle_between(self.world_up()))
    }

    /// Whether the current ground can be stood on without speed
    pub fn is_walkable(&self) -> bool {
        self.slope_angle() <= self.attributes.motor.float(MotorSchema::WALKABLE_ANGLE)
    }

    /// Queue an unground for the start of the next tick
    pub fn request_unground(&mut self) {
        self.force_unground = true;
    }
}

/// One stage of the pipeline
pub trait MotionContributor {
    fn before_update(&mut self, _ctx: &mut MotionContext) {}

    fn update_rotation(&mut self, _ctx: &mut MotionContext, _angular_velocity: &mut f32) {}

    fn update_velocity(&mut self, ctx: &mut MotionContext, velocity: &mut Vec3);

    fn after_update(&mut self, _ctx: &mut MotionContext) {}
}
