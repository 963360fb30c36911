//! Minimal scripted host motor shared by the integration tests

#![allow(dead_code)]

use planar_math::radians;
use planar_motion::prelude::*;

pub const DT: f32 = 1.0 / 60.0;

/// Ground normal tilted by `degrees` about +Z (positive leans towards -X)
pub fn tilted(degrees: f32) -> Vec3 {
    Quat::from_axis_angle(Vec3::Z, radians(degrees)).rotate(Vec3::Y)
}

pub struct Host {
    pub controller: CharacterController,
    pub motor: MotorLink,
    pub velocity: Vec3,
    pub rotation: Quat,
}

impl Host {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            controller: CharacterController::new(&config).unwrap(),
            motor: MotorLink::new(Vec3::ZERO),
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn standard() -> Self {
        Self::new(MotionConfig::default())
    }

    /// Put the character on the ground with the given normal and velocity
    pub fn place_on_ground(&mut self, normal: Vec3, velocity: Vec3) {
        let state = MotionState {
            velocity,
            grounded: true,
            was_grounded: true,
            ground_normal: normal,
            ..MotionState::default()
        };
        let plane = self.controller.plane();
        self.controller.restore(MotionSnapshot::new(state, plane, normal));
        self.velocity = velocity;
        self.motor
            .set_grounding(GroundingReport::stable(normal, self.motor.position));
    }

    pub fn begin(&mut self) {
        self.controller.before_update(&mut self.motor, DT);
        self.controller
            .update_rotation(&mut self.motor, &mut self.rotation, DT);
        self.controller
            .update_velocity(&mut self.motor, &mut self.velocity, DT);
    }

    /// Move, probe the ground and finish the tick
    pub fn finish(&mut self, ground: GroundingReport) {
        self.motor.position += self.velocity * DT;
        let report = if self.motor.take_force_unground() {
            GroundingReport::airborne()
        } else {
            ground
        };
        self.motor.set_grounding(report);
        self.controller.post_grounding_update(&mut self.motor, DT);
        self.controller.after_update(&mut self.motor, DT);
    }

    pub fn tick(&mut self, ground: GroundingReport) {
        self.begin();
        self.finish(ground);
    }

    pub fn tick_on(&mut self, normal: Vec3) {
        self.tick(GroundingReport::stable(normal, self.motor.position));
    }

    pub fn tick_airborne(&mut self) {
        self.tick(GroundingReport::airborne());
    }
}
