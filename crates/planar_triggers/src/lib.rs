//! Planar Triggers - Trigger Volume System
//!
//! Volumes that shape how a character moves while it is inside them.
//!
//! # Features
//!
//! - Box, sphere and capsule volume shapes
//! - Tagged volumes: dynamic planes, plane breakers and movement effectors
//! - Deterministic enter/exit events from a point overlap tracker
//! - Polyline plane paths that answer "which plane is closest"
//!
//! # Example
//!
//! ```ignore
//! use planar_triggers::prelude::*;
//!
//! let mut triggers = TriggerSystem::new();
//! let ramp = triggers.register(
//!     TriggerTag::DynamicPlane,
//!     TriggerVolume::box_shape(10.0, 4.0, 10.0),
//!     Vec3::new(5.0, 0.0, 0.0),
//! );
//! for event in triggers.update(dt, character_position) {
//!     // forward to the character controller
//! }
//! ```

pub mod events;
pub mod path;
pub mod system;
pub mod volume;

pub mod prelude {
    pub use crate::events::{Crossing, TriggerEvent, TriggerTag, VolumeId};
    pub use crate::path::PlanePath;
    pub use crate::system::TriggerSystem;
    pub use crate::volume::TriggerVolume;
}

pub use prelude::*;
