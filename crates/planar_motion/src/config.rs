//! Motion configuration
//!
//! Designer defaults for every overridable attribute plus the tuning of the
//! non-overridable subsystems. Loaded from JSON and validated once when a
//! character is built.

use crate::error::{MotionError, Result};
use planar_math::{Plane, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base values of the physics attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsDefaults {
    /// Gravity acceleration (default: -30 in Y)
    pub gravity: Vec3,
    /// Ground friction below `friction_speed_split`
    pub friction_static: f32,
    /// Ground friction at or above `friction_speed_split`
    pub friction_kinetic: f32,
    pub friction_speed_split: f32,
    /// Below this speed a grounded, idle character sticks in place
    pub stick_speed: f32,
    /// Extra friction on ceilings
    pub upside_down_friction: f32,
    /// Extra friction on walls
    pub sideways_friction: f32,
    /// Continuous time on a steep slope before the penalties ramp in
    pub slope_penalty_delay: f32,
    pub air_drag: f32,
    pub extra_drag_speed: f32,
    pub extra_drag: f32,
    pub uphill_gravity_scale: f32,
    pub downhill_gravity_scale: f32,
    /// Fall speed past which the terminal deceleration applies
    pub terminal_speed: f32,
    pub terminal_decel: f32,
    /// World-space acceleration applied every tick (wind, conveyor)
    pub constant_accel: Vec3,
}

impl Default for PhysicsDefaults {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -30.0, 0.0),
            friction_static: 40.0,
            friction_kinetic: 12.0,
            friction_speed_split: 4.0,
            stick_speed: 0.5,
            upside_down_friction: 20.0,
            sideways_friction: 6.0,
            slope_penalty_delay: 0.25,
            air_drag: 0.1,
            extra_drag_speed: 25.0,
            extra_drag: 10.0,
            uphill_gravity_scale: 1.0,
            downhill_gravity_scale: 0.8,
            terminal_speed: 40.0,
            terminal_decel: 60.0,
            constant_accel: Vec3::ZERO,
        }
    }
}

/// Base values of the run attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunDefaults {
    pub run_accel: f32,
    pub brake_decel: f32,
    pub max_run_speed: f32,
    pub air_accel_precise: f32,
    pub air_accel_loose: f32,
    /// Horizontal air speed below which the precise acceleration is used
    pub air_precise_speed: f32,
    pub kick_off_speed: f32,
    pub auto_kick_off_speed: f32,
    /// Minimum downhill slope for the automatic kick-off, in degrees
    pub auto_kick_off_angle: f32,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            run_accel: 15.0,
            brake_decel: 45.0,
            max_run_speed: 12.0,
            air_accel_precise: 25.0,
            air_accel_loose: 10.0,
            air_precise_speed: 6.0,
            kick_off_speed: 8.0,
            auto_kick_off_speed: 6.0,
            auto_kick_off_angle: 14.0,
        }
    }
}

/// Base values of the jump attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpDefaults {
    pub jump_speed: f32,
    /// Upward speed a cancelled jump is clamped to
    pub cancel_target_speed: f32,
    /// Above this upward speed a cancel waits for the next tick
    pub cancel_max_speed: f32,
    /// How long a jump is still allowed after walking off a ledge
    pub buffer_time: f32,
    pub air_jumps: i32,
}

impl Default for JumpDefaults {
    fn default() -> Self {
        Self {
            jump_speed: 14.0,
            cancel_target_speed: 4.0,
            cancel_max_speed: 10.0,
            buffer_time: 0.12,
            air_jumps: 0,
        }
    }
}

/// Base values of the motor attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorDefaults {
    /// Hard cap on speed
    pub max_speed: f32,
    /// Speed needed to stay attached to a surface steeper than `walkable_angle`
    pub attach_speed: f32,
    /// Degrees
    pub walkable_angle: f32,
    /// Max stable slope angle at rest, in degrees
    pub min_stable_angle: f32,
    /// Max stable slope angle at `stable_angle_full_speed`, in degrees
    pub max_stable_angle: f32,
    pub stable_angle_full_speed: f32,
    pub probe_min: f32,
    pub probe_max: f32,
    /// Airborne up-vector alignment rate, degrees per second
    pub up_align_rate: f32,
}

impl Default for MotorDefaults {
    fn default() -> Self {
        Self {
            max_speed: 60.0,
            attach_speed: 8.0,
            walkable_angle: 50.0,
            min_stable_angle: 55.0,
            max_stable_angle: 89.0,
            stable_angle_full_speed: 20.0,
            probe_min: 0.1,
            probe_max: 0.6,
            up_align_rate: 360.0,
        }
    }
}

/// Rotational momentum estimator tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeHistoryConfig {
    /// History older than this is discarded, seconds
    pub max_track_time: f32,
    pub rotation_factor: f32,
    /// Radians per second
    pub min_angular_speed: f32,
    /// Radians per second
    pub max_angular_speed: f32,
}

impl Default for SlopeHistoryConfig {
    fn default() -> Self {
        Self {
            max_track_time: 0.75,
            rotation_factor: 1.0,
            min_angular_speed: 0.5,
            max_angular_speed: 12.0,
        }
    }
}

/// Orientation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Distance from the transform origin to the ground contact point
    pub contact_offset: f32,
    /// A swept floor within this many degrees of world up ends an airborne spin
    pub snap_floor_angle: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            contact_offset: 0.5,
            snap_floor_angle: 30.0,
        }
    }
}

/// Which character variant drives the ability layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKind {
    #[default]
    Standard,
    Glider,
    Dasher,
}

/// Ability tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityConfig {
    pub kind: AbilityKind,
    /// Gravity multiplier while gliding
    pub glide_gravity_scale: f32,
    /// Terminal speed forced while gliding
    pub glide_terminal_speed: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            kind: AbilityKind::Standard,
            glide_gravity_scale: 0.3,
            glide_terminal_speed: 5.0,
            dash_speed: 20.0,
            dash_duration: 0.18,
        }
    }
}

/// Complete motion configuration for one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub physics: PhysicsDefaults,
    pub run: RunDefaults,
    pub jump: JumpDefaults,
    pub motor: MotorDefaults,
    pub slope: SlopeHistoryConfig,
    pub rotation: RotationConfig,
    pub abilities: AbilityConfig,
    /// Plane the character starts constrained to
    pub plane: Plane,
    /// Fixed simulation step
    pub timestep: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsDefaults::default(),
            run: RunDefaults::default(),
            jump: JumpDefaults::default(),
            motor: MotorDefaults::default(),
            slope: SlopeHistoryConfig::default(),
            rotation: RotationConfig::default(),
            abilities: AbilityConfig::default(),
            plane: Plane::default(),
            timestep: 1.0 / 60.0,
        }
    }
}

impl MotionConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set gravity
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.physics.gravity = gravity;
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the starting plane
    pub fn with_plane(mut self, plane: Plane) -> Self {
        self.plane = plane;
        self
    }

    /// Select the character variant
    pub fn with_ability(mut self, kind: AbilityKind) -> Self {
        self.abilities.kind = kind;
        self
    }

    pub fn with_air_jumps(mut self, air_jumps: i32) -> Self {
        self.jump.air_jumps = air_jumps;
        self
    }

    /// Reject values that would make the simulation diverge
    pub fn validate(&self) -> Result<()> {
        let p = &self.physics;
        let r = &self.run;
        let j = &self.jump;
        let m = &self.motor;
        let s = &self.slope;

        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(invalid("timestep must be positive"));
        }
        if !p.gravity.is_finite() || !p.constant_accel.is_finite() {
            return Err(invalid("gravity and constant acceleration must be finite"));
        }
        if p.gravity.is_near_zero() {
            return Err(invalid("gravity must not be zero"));
        }
        if self.plane.normal.is_near_zero() || !self.plane.normal.is_finite() {
            return Err(invalid("plane normal must be a finite non-zero vector"));
        }

        let non_negative = [
            ("physics.friction_static", p.friction_static),
            ("physics.friction_kinetic", p.friction_kinetic),
            ("physics.friction_speed_split", p.friction_speed_split),
            ("physics.stick_speed", p.stick_speed),
            ("physics.upside_down_friction", p.upside_down_friction),
            ("physics.sideways_friction", p.sideways_friction),
            ("physics.slope_penalty_delay", p.slope_penalty_delay),
            ("physics.air_drag", p.air_drag),
            ("physics.extra_drag_speed", p.extra_drag_speed),
            ("physics.extra_drag", p.extra_drag),
            ("physics.uphill_gravity_scale", p.uphill_gravity_scale),
            ("physics.downhill_gravity_scale", p.downhill_gravity_scale),
            ("physics.terminal_speed", p.terminal_speed),
            ("physics.terminal_decel", p.terminal_decel),
            ("run.run_accel", r.run_accel),
            ("run.brake_decel", r.brake_decel),
            ("run.max_run_speed", r.max_run_speed),
            ("run.air_accel_precise", r.air_accel_precise),
            ("run.air_accel_loose", r.air_accel_loose),
            ("run.air_precise_speed", r.air_precise_speed),
            ("run.kick_off_speed", r.kick_off_speed),
            ("run.auto_kick_off_speed", r.auto_kick_off_speed),
            ("run.auto_kick_off_angle", r.auto_kick_off_angle),
            ("jump.jump_speed", j.jump_speed),
            ("jump.cancel_target_speed", j.cancel_target_speed),
            ("jump.cancel_max_speed", j.cancel_max_speed),
            ("jump.buffer_time", j.buffer_time),
            ("motor.max_speed", m.max_speed),
            ("motor.attach_speed", m.attach_speed),
            ("motor.walkable_angle", m.walkable_angle),
            ("motor.min_stable_angle", m.min_stable_angle),
            ("motor.max_stable_angle", m.max_stable_angle),
            ("motor.stable_angle_full_speed", m.stable_angle_full_speed),
            ("motor.probe_min", m.probe_min),
            ("motor.probe_max", m.probe_max),
            ("motor.up_align_rate", m.up_align_rate),
            ("slope.max_track_time", s.max_track_time),
            ("slope.rotation_factor", s.rotation_factor),
            ("slope.min_angular_speed", s.min_angular_speed),
            ("slope.max_angular_speed", s.max_angular_speed),
            ("rotation.contact_offset", self.rotation.contact_offset),
            ("rotation.snap_floor_angle", self.rotation.snap_floor_angle),
            ("abilities.glide_gravity_scale", self.abilities.glide_gravity_scale),
            ("abilities.glide_terminal_speed", self.abilities.glide_terminal_speed),
            ("abilities.dash_speed", self.abilities.dash_speed),
            ("abilities.dash_duration", self.abilities.dash_duration),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{name} must be finite and non-negative, got {value}")));
            }
        }

        if j.air_jumps < 0 {
            return Err(invalid("jump.air_jumps must not be negative"));
        }
        if j.cancel_target_speed > j.cancel_max_speed {
            return Err(invalid("jump.cancel_target_speed exceeds jump.cancel_max_speed"));
        }
        if m.min_stable_angle > m.max_stable_angle || m.max_stable_angle >= 180.0 {
            return Err(invalid("motor stable angles must satisfy min <= max < 180"));
        }
        if m.probe_min > m.probe_max {
            return Err(invalid("motor.probe_min exceeds motor.probe_max"));
        }
        if s.min_angular_speed > s.max_angular_speed {
            return Err(invalid("slope.min_angular_speed exceeds slope.max_angular_speed"));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> MotionError {
    MotionError::InvalidConfig(reason.into())
}
