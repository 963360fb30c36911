//! Notifications published by a character

use planar_math::Vec3;

/// Something observable happened to the character this tick
///
/// Queued while the tick runs and delivered in `after_update`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionEvent {
    /// The constraint plane changed
    PlaneChanged { normal: Vec3, from_breaker: bool },
    /// A jump was performed along `normal`
    Jumped { normal: Vec3, air_jump: bool },
    /// Touched down
    Landed { speed: f32 },
    /// Went airborne with the synthesized spin
    LeftGround { angular_velocity: f32 },
    /// Too slow to stay on a steep surface
    ForcedDetach { normal: Vec3 },
}
