//! Headless host motor
//!
//! Stands in for a collision engine: the character is a point that rides
//! the terrain profile, stops at the wall and is tracked through the course
//! volumes. Each step drives the motor callbacks in their fixed order.

use crate::course::{Course, Terrain};
use planar_motion::prelude::*;
use planar_triggers::{TriggerSystem, TriggerTag, VolumeId};
use std::collections::BTreeMap;

pub struct SimHost {
    pub controller: CharacterController,
    pub motor: MotorLink,
    pub velocity: Vec3,
    pub rotation: Quat,
    terrain: Terrain,
    triggers: TriggerSystem,
    names: BTreeMap<VolumeId, &'static str>,
    dt: f32,
}

impl SimHost {
    pub fn new(config: &MotionConfig, course: Course) -> Result<Self> {
        let mut controller = CharacterController::new(config)?;
        let mut triggers = TriggerSystem::new();
        let mut names = BTreeMap::new();

        for volume in course.volumes {
            let id = triggers.register(volume.tag, volume.shape, volume.position);
            match volume.tag {
                TriggerTag::Effector => controller.register_effector(id, volume.overrides)?,
                _ => controller.register_plane_volume(id, volume.tag, volume.path, false)?,
            }
            log::debug!("placed {} as {:?}", volume.name, id);
            names.insert(id, volume.name);
        }

        let start = Vec3::new(0.0, course.terrain.height(0.0), 0.0);
        Ok(Self {
            controller,
            motor: MotorLink::new(start),
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            terrain: course.terrain,
            triggers,
            names,
            dt: config.timestep,
        })
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn step(&mut self, input: InputFrame) {
        let dt = self.dt;
        self.controller.feed_input(input);
        self.controller.before_update(&mut self.motor, dt);
        self.controller
            .update_rotation(&mut self.motor, &mut self.rotation, dt);
        self.controller
            .update_velocity(&mut self.motor, &mut self.velocity, dt);

        self.sweep(dt);
        let report = self.probe_ground();
        self.motor.set_grounding(report);
        self.forward_triggers(dt);

        self.controller.post_grounding_update(&mut self.motor, dt);
        self.controller.after_update(&mut self.motor, dt);
    }

    fn sweep(&mut self, dt: f32) {
        let mut target = self.motor.position + self.velocity * dt;
        if target.x > self.terrain.wall_x {
            let hit = HitInfo {
                normal: Vec3::NEG_X,
                point: Vec3::new(self.terrain.wall_x, target.y, target.z),
                is_stable: false,
                collider: ColliderInfo::solid(),
            };
            if self.controller.is_collider_valid_for_collisions(&hit.collider) {
                target.x = self.terrain.wall_x;
                self.velocity.x = self.velocity.x.min(0.0);
                self.controller.on_movement_hit(&self.motor, &hit);
            }
        }

        let floor = self.terrain.height(target.x);
        if target.y < floor {
            let hit = HitInfo {
                normal: self.terrain.normal(target.x),
                point: Vec3::new(target.x, floor, target.z),
                is_stable: true,
                collider: ColliderInfo::solid(),
            };
            target.y = floor;
            self.controller.on_discrete_collision_detected(&self.motor, &hit);
        }
        self.motor.position = target;
    }

    fn probe_ground(&mut self) -> GroundingReport {
        if self.motor.take_force_unground() {
            return GroundingReport::airborne();
        }

        let x = self.motor.position.x;
        let floor = self.terrain.height(x);
        if self.motor.position.y > floor + self.motor.ground_probe_distance {
            return GroundingReport::airborne();
        }

        let normal = self.terrain.normal(x);
        let point = Vec3::new(x, floor, self.motor.position.z);
        let hit = HitInfo {
            normal,
            point,
            is_stable: true,
            collider: ColliderInfo::solid(),
        };
        let mut stability = HitStabilityReport {
            is_stable: true,
            ledge_detected: false,
            inner_normal: normal,
            outer_normal: normal,
        };
        self.controller
            .process_hit_stability_report(&self.motor, &hit, &mut stability);
        self.controller.on_ground_hit(&self.motor, &hit);

        self.motor.position.y = floor;
        if stability.is_stable {
            GroundingReport::stable(normal, point)
        } else {
            GroundingReport {
                found_any_ground: true,
                is_stable_on_ground: false,
                ground_normal: normal,
                ground_point: point,
            }
        }
    }

    fn forward_triggers(&mut self, dt: f32) {
        for event in self.triggers.update(dt, self.motor.position) {
            let name = self.names.get(&event.volume).copied().unwrap_or("unnamed volume");
            if event.is_enter() {
                log::info!("entered {}", name);
                self.controller.on_trigger_enter(event.tag, event.volume);
            } else {
                log::info!("left {} after {:.2}s", name, event.dwell);
                self.controller.on_trigger_exit(event.tag, event.volume);
            }
        }
    }
}
