//! # planar_math - Motion Math
//!
//! Small, copyable math primitives for plane-constrained character motion:
//! 3D vectors, rotation quaternions and planes, plus the scalar helpers the
//! motion pipeline leans on every tick.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod plane;
pub mod quaternion;
pub mod vector;

pub use plane::*;
pub use quaternion::*;
pub use vector::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
    pub const EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

/// Convert radians to degrees
#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * consts::RAD_TO_DEG
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Inverse of [`lerp`], clamped to `[0, 1]`.
///
/// Returns 1 when the range is empty so callers treat a degenerate range as
/// "fully reached".
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= consts::EPSILON {
        return 1.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Move `current` towards `target` by at most `max_delta`
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

pub mod prelude {
    pub use crate::plane::Plane;
    pub use crate::quaternion::Quat;
    pub use crate::vector::Vec3;
    pub use crate::{degrees, inverse_lerp, lerp, move_towards, radians};
}
