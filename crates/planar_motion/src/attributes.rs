//! The four overridable attributes of a character
//!
//! Each schema is a unit type whose associated constants are the stable
//! field indices contributors read through.

use crate::config::{JumpDefaults, MotionConfig, MotorDefaults, PhysicsDefaults, RunDefaults};
use crate::error::Result;
use planar_params::prelude::*;

/// Gravity, friction, drag and slope penalties
pub struct PhysicsSchema;

impl PhysicsSchema {
    pub const GRAVITY: usize = 0;
    pub const FRICTION_STATIC: usize = 1;
    pub const FRICTION_KINETIC: usize = 2;
    pub const FRICTION_SPEED_SPLIT: usize = 3;
    pub const STICK_SPEED: usize = 4;
    pub const UPSIDE_DOWN_FRICTION: usize = 5;
    pub const SIDEWAYS_FRICTION: usize = 6;
    pub const SLOPE_PENALTY_DELAY: usize = 7;
    pub const AIR_DRAG: usize = 8;
    pub const EXTRA_DRAG_SPEED: usize = 9;
    pub const EXTRA_DRAG: usize = 10;
    pub const UPHILL_GRAVITY_SCALE: usize = 11;
    pub const DOWNHILL_GRAVITY_SCALE: usize = 12;
    pub const TERMINAL_SPEED: usize = 13;
    pub const TERMINAL_DECEL: usize = 14;
    pub const CONSTANT_ACCEL: usize = 15;

    pub fn defaults(d: &PhysicsDefaults) -> Result<ParameterSet<Self>> {
        Ok(ParameterSet::from_values(vec![
            ParamValue::Vector(d.gravity),
            ParamValue::Float(d.friction_static),
            ParamValue::Float(d.friction_kinetic),
            ParamValue::Float(d.friction_speed_split),
            ParamValue::Float(d.stick_speed),
            ParamValue::Float(d.upside_down_friction),
            ParamValue::Float(d.sideways_friction),
            ParamValue::Float(d.slope_penalty_delay),
            ParamValue::Float(d.air_drag),
            ParamValue::Float(d.extra_drag_speed),
            ParamValue::Float(d.extra_drag),
            ParamValue::Float(d.uphill_gravity_scale),
            ParamValue::Float(d.downhill_gravity_scale),
            ParamValue::Float(d.terminal_speed),
            ParamValue::Float(d.terminal_decel),
            ParamValue::Vector(d.constant_accel),
        ])?)
    }
}

impl ParameterSchema for PhysicsSchema {
    const NAME: &'static str = "physics";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::vector("gravity"),
        FieldDef::float("friction_static"),
        FieldDef::float("friction_kinetic"),
        FieldDef::float("friction_speed_split"),
        FieldDef::float("stick_speed"),
        FieldDef::float("upside_down_friction"),
        FieldDef::float("sideways_friction"),
        FieldDef::float("slope_penalty_delay"),
        FieldDef::float("air_drag"),
        FieldDef::float("extra_drag_speed"),
        FieldDef::float("extra_drag"),
        FieldDef::float("uphill_gravity_scale"),
        FieldDef::float("downhill_gravity_scale"),
        FieldDef::float("terminal_speed"),
        FieldDef::float("terminal_decel"),
        FieldDef::vector("constant_accel"),
    ];
}

/// Running, braking, air control and kick-off
pub struct RunSchema;

impl RunSchema {
    pub const RUN_ACCEL: usize = 0;
    pub const BRAKE_DECEL: usize = 1;
    pub const MAX_RUN_SPEED: usize = 2;
    pub const AIR_ACCEL_PRECISE: usize = 3;
    pub const AIR_ACCEL_LOOSE: usize = 4;
    pub const AIR_PRECISE_SPEED: usize = 5;
    pub const KICK_OFF_SPEED: usize = 6;
    pub const AUTO_KICK_OFF_SPEED: usize = 7;
    pub const AUTO_KICK_OFF_ANGLE: usize = 8;

    pub fn defaults(d: &RunDefaults) -> Result<ParameterSet<Self>> {
        Ok(ParameterSet::from_values(vec![
            ParamValue::Float(d.run_accel),
            ParamValue::Float(d.brake_decel),
            ParamValue::Float(d.max_run_speed),
            ParamValue::Float(d.air_accel_precise),
            ParamValue::Float(d.air_accel_loose),
            ParamValue::Float(d.air_precise_speed),
            ParamValue::Float(d.kick_off_speed),
            ParamValue::Float(d.auto_kick_off_speed),
            ParamValue::Float(d.auto_kick_off_angle),
        ])?)
    }
}

impl ParameterSchema for RunSchema {
    const NAME: &'static str = "run";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::float("run_accel"),
        FieldDef::float("brake_decel"),
        FieldDef::float("max_run_speed"),
        FieldDef::float("air_accel_precise"),
        FieldDef::float("air_accel_loose"),
        FieldDef::float("air_precise_speed"),
        FieldDef::float("kick_off_speed"),
        FieldDef::float("auto_kick_off_speed"),
        FieldDef::float("auto_kick_off_angle"),
    ];
}

/// Jumping and jump cancel
pub struct JumpSchema;

impl JumpSchema {
    pub const JUMP_SPEED: usize = 0;
    pub const CANCEL_TARGET_SPEED: usize = 1;
    pub const CANCEL_MAX_SPEED: usize = 2;
    pub const BUFFER_TIME: usize = 3;
    pub const AIR_JUMPS: usize = 4;

    pub fn defaults(d: &JumpDefaults) -> Result<ParameterSet<Self>> {
        Ok(ParameterSet::from_values(vec![
            ParamValue::Float(d.jump_speed),
            ParamValue::Float(d.cancel_target_speed),
            ParamValue::Float(d.cancel_max_speed),
            ParamValue::Float(d.buffer_time),
            ParamValue::Int(d.air_jumps),
        ])?)
    }
}

impl ParameterSchema for JumpSchema {
    const NAME: &'static str = "jump";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::float("jump_speed"),
        FieldDef::float("cancel_target_speed"),
        FieldDef::float("cancel_max_speed"),
        FieldDef::float("buffer_time"),
        FieldDef::int("air_jumps"),
    ];
}

/// Speed cap, attachment and motor tolerances
pub struct MotorSchema;

impl MotorSchema {
    pub const MAX_SPEED: usize = 0;
    pub const ATTACH_SPEED: usize = 1;
    pub const WALKABLE_ANGLE: usize = 2;
    pub const MIN_STABLE_ANGLE: usize = 3;
    pub const MAX_STABLE_ANGLE: usize = 4;
    pub const STABLE_ANGLE_FULL_SPEED: usize = 5;
    pub const PROBE_MIN: usize = 6;
    pub const PROBE_MAX: usize = 7;
    pub const UP_ALIGN_RATE: usize = 8;

    pub fn defaults(d: &MotorDefaults) -> Result<ParameterSet<Self>> {
        Ok(ParameterSet::from_values(vec![
            ParamValue::Float(d.max_speed),
            ParamValue::Float(d.attach_speed),
            ParamValue::Float(d.walkable_angle),
            ParamValue::Float(d.min_stable_angle),
            ParamValue::Float(d.max_stable_angle),
            ParamValue::Float(d.stable_angle_full_speed),
            ParamValue::Float(d.probe_min),
            ParamValue::Float(d.probe_max),
            ParamValue::Float(d.up_align_rate),
        ])?)
    }
}

impl ParameterSchema for MotorSchema {
    const NAME: &'static str = "motor";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::float("max_speed"),
        FieldDef::float("attach_speed"),
        FieldDef::float("walkable_angle"),
        FieldDef::float("min_stable_angle"),
        FieldDef::float("max_stable_angle"),
        FieldDef::float("stable_angle_full_speed"),
        FieldDef::float("probe_min"),
        FieldDef::float("probe_max"),
        FieldDef::float("up_align_rate"),
    ];
}

/// An override aimed at one of the character's attributes
#[derive(Debug, Clone)]
pub enum AttributeOverride {
    Physics(ParameterOverride<PhysicsSchema>),
    Run(ParameterOverride<RunSchema>),
    Jump(ParameterOverride<JumpSchema>),
    Motor(ParameterOverride<MotorSchema>),
}

/// Receipt for an [`AttributeOverride`] that has been applied
#[derive(Debug, Clone)]
pub enum AppliedAttributeOverride {
    Physics(AppliedOverride<PhysicsSchema>),
    Run(AppliedOverride<RunSchema>),
    Jump(AppliedOverride<JumpSchema>),
    Motor(AppliedOverride<MotorSchema>),
}

/// Every overridable attribute of one character
#[derive(Debug, Clone)]
pub struct CharacterAttributes {
    pub physics: OverridableAttribute<PhysicsSchema>,
    pub run: OverridableAttribute<RunSchema>,
    pub jump: OverridableAttribute<JumpSchema>,
    pub motor: OverridableAttribute<MotorSchema>,
}

impl CharacterAttributes {
    /// Build the base sets from designer defaults
    pub fn from_config(config: &MotionConfig) -> Result<Self> {
        Ok(Self {
            physics: OverridableAttribute::new(PhysicsSchema::defaults(&config.physics)?),
            run: OverridableAttribute::new(RunSchema::defaults(&config.run)?),
            jump: OverridableAttribute::new(JumpSchema::defaults(&config.jump)?),
            motor: OverridableAttribute::new(MotorSchema::defaults(&config.motor)?),
        })
    }

    pub fn apply(&mut self, values: &AttributeOverride) -> AppliedAttributeOverride {
        match values {
            AttributeOverride::Physics(v) => AppliedAttributeOverride::Physics(self.physics.apply_override(v)),
            AttributeOverride::Run(v) => AppliedAttributeOverride::Run(self.run.apply_override(v)),
            AttributeOverride::Jump(v) => AppliedAttributeOverride::Jump(self.jump.apply_override(v)),
            AttributeOverride::Motor(v) => AppliedAttributeOverride::Motor(self.motor.apply_override(v)),
        }
    }

    pub fn remove(&mut self, applied: &AppliedAttributeOverride) -> bool {
        match applied {
            AppliedAttributeOverride::Physics(a) => self.physics.remove_override(a),
            AppliedAttributeOverride::Run(a) => self.run.remove_override(a),
            AppliedAttributeOverride::Jump(a) => self.jump.remove_override(a),
            AppliedAttributeOverride::Motor(a) => self.motor.remove_override(a),
        }
    }

    pub fn active_override_count(&self) -> usize {
        self.physics.active_override_count()
            + self.run.active_override_count()
            + self.jump.active_override_count()
            + self.motor.active_override_count()
    }
}
