//! Planar Motion - Plane-Constrained Character Motion
//!
//! The motion core of a "2.5D" character: a character moves freely in 3D
//! space but its velocity and facing are confined to one active plane at a
//! time. A host kinematic motor handles collision; this crate decides how
//! the character wants to move.
//!
//! # Features
//!
//! - Overridable run, jump, physics and motor attributes
//! - Action, Ability and Physics contributors with per-tick negation flags
//! - Rotational momentum synthesized from recent ground curvature
//! - Dynamic planes and plane breakers with momentum-preserving switches
//! - Coyote-time jumps, air jumps, kinematic paths and timed abilities
//! - Binary snapshots of the motion state
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────── CharacterController ───────────────────────┐
//! │  MotionContext (state, negations, input, attributes, plane, ...)  │
//! │                                                                    │
//! │   ActionContributor → AbilityContributor → PhysicsContributor     │
//! │                                                                    │
//! │   PlaneSystem        SlopeHistory        MotionTimers             │
//! └──────────────────────────────┬─────────────────────────────────────┘
//!                                │ MotorCallbacks
//!                          host kinematic motor
//! ```
//!
//! # Example
//!
//! ```ignore
//! use planar_motion::prelude::*;
//!
//! let mut character = CharacterController::new(&MotionConfig::default())?;
//! let mut motor = MotorLink::new(Vec3::ZERO);
//!
//! character.feed_input(InputFrame::default().with_run(1.0));
//! character.before_update(&mut motor, dt);
//! character.update_rotation(&mut motor, &mut rotation, dt);
//! character.update_velocity(&mut motor, &mut velocity, dt);
//! // host sweeps, probes ground and calls motor.set_grounding(..)
//! character.post_grounding_update(&mut motor, dt);
//! character.after_update(&mut motor, dt);
//! ```

pub mod attributes;
pub mod config;
pub mod contributor;
pub mod controller;
pub mod error;
pub mod events;
pub mod input;
pub mod layers;
pub mod motor;
pub mod plane;
pub mod slope;
pub mod snapshot;
pub mod state;
pub mod timers;

pub mod prelude {
    //! Common imports for character motion
    pub use crate::attributes::{
        AppliedAttributeOverride, AttributeOverride, CharacterAttributes, JumpSchema, MotorSchema,
        PhysicsSchema, RunSchema,
    };
    pub use crate::config::{AbilityKind, MotionConfig};
    pub use crate::contributor::{Ability, MotionContext, MotionContributor};
    pub use crate::controller::CharacterController;
    pub use crate::error::{MotionError, Result};
    pub use crate::events::MotionEvent;
    pub use crate::input::{ExtraAction, InputFrame};
    pub use crate::layers::{ColliderInfo, CollisionGroups, CollisionLayer};
    pub use crate::motor::{GroundingReport, HitInfo, HitStabilityReport, MotorCallbacks, MotorLink};
    pub use crate::plane::{PlaneRequest, PlaneSystem};
    pub use crate::snapshot::MotionSnapshot;
    pub use crate::state::{Facing, MotionState};
    pub use planar_math::{Plane, Quat, Vec3};
}
