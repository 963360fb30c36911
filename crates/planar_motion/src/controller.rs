//! Per-tick orchestration of one character
//!
//! [`CharacterController`] implements [`MotorCallbacks`]. It owns the tick
//! context, the three contributors, the plane system and the slope history,
//! and sequences them inside the callbacks the host motor drives.

use crate::attributes::{AttributeOverride, CharacterAttributes, JumpSchema, MotorSchema};
use crate::config::{MotionConfig, RotationConfig};
use crate::contributor::{
    AbilityContributor, ActionContributor, MotionContext, MotionContributor, PhysicsContributor,
};
use crate::error::{MotionError, Result};
use crate::events::MotionEvent;
use crate::input::InputFrame;
use crate::layers::{collider_blocks, ColliderInfo, CollisionGroups};
use crate::motor::{HitInfo, HitStabilityReport, MotorCallbacks, MotorLink};
use crate::plane::{switch_plane, PlaneSystem, PlaneVolume, PlaneVolumeKind};
use crate::slope::SlopeHistory;
use crate::snapshot::MotionSnapshot;
use crate::state::{MotionState, Negations, WallHitSet};
use crate::timers::{MotionTimers, TimerAction, TimerKey};
use planar_event::{Priority, SubscriberId};
use planar_math::{degrees, inverse_lerp, lerp, radians, Plane, Quat, Vec3};
use planar_triggers::{PlanePath, TriggerTag, VolumeId};
use std::collections::BTreeMap;

/// A hit whose normal points this far against up is a ceiling
const CEILING_DOT: f32 = -0.7;
/// Ground normals closer than this count as the same slope
const SLOPE_EPSILON: f32 = 1e-4;

/// Motion controller for one plane-constrained character
pub struct CharacterController {
    ctx: MotionContext,
    action: ActionContributor,
    ability: AbilityContributor,
    physics: PhysicsContributor,
    planes: PlaneSystem,
    effectors: BTreeMap<VolumeId, Vec<AttributeOverride>>,
    slope: SlopeHistory,
    rotation: RotationConfig,
    groups: CollisionGroups,
    /// Character up, follows the ground or eases back to world up
    up: Vec3,
    impulse: Vec3,
    kinematic: Option<Vec3>,
    /// Plane switch rotation not yet applied to the host's velocity
    velocity_rotation: Option<Quat>,
    /// Normals from discrete overlaps to strip from the next velocity
    discrete_normals: Vec<Vec3>,
    snap_floor: bool,
    last_events: Vec<MotionEvent>,
}

impl CharacterController {
    /// Wire up a character; the configuration is validated first
    pub fn new(config: &MotionConfig) -> Result<Self> {
        config.validate()?;
        let ctx = MotionContext::new(config)?;
        let up = ctx.world_up();

        log::debug!(
            "character created on plane {:?} with {:?} ability",
            config.plane.normal,
            config.abilities.kind
        );

        Ok(Self {
            ctx,
            action: ActionContributor::new(),
            ability: AbilityContributor::new(&config.abilities),
            physics: PhysicsContributor::new(),
            planes: PlaneSystem::new(),
            effectors: BTreeMap::new(),
            slope: SlopeHistory::new(config.slope.clone()),
            rotation: config.rotation.clone(),
            groups: CollisionGroups::character(),
            up,
            impulse: Vec3::ZERO,
            kinematic: None,
            velocity_rotation: None,
            discrete_normals: Vec::new(),
            snap_floor: false,
            last_events: Vec::new(),
        })
    }

    // ---- input and listeners ----

    /// Latch input for the next tick
    pub fn feed_input(&mut self, input: InputFrame) {
        self.ctx.input.feed(input);
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&MotionEvent) + Send + Sync + 'static,
    {
        self.ctx.events.subscribe(handler)
    }

    pub fn subscribe_with_priority<F>(&mut self, handler: F, priority: Priority) -> SubscriberId
    where
        F: Fn(&MotionEvent) + Send + Sync + 'static,
    {
        self.ctx.events.subscribe_with_priority(handler, priority)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.ctx.events.unsubscribe(id)
    }

    /// Events delivered at the end of the last tick
    pub fn last_events(&self) -> &[MotionEvent] {
        &self.last_events
    }

    // ---- state access ----

    pub fn state(&self) -> &MotionState {
        &self.ctx.state
    }

    pub fn plane(&self) -> Plane {
        self.ctx.plane
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn attributes(&self) -> &CharacterAttributes {
        &self.ctx.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut CharacterAttributes {
        &mut self.ctx.attributes
    }

    pub fn negations(&self) -> Negations {
        self.ctx.negations
    }

    pub fn wall_hits(&self) -> &WallHitSet {
        &self.ctx.wall_hits
    }

    pub fn slope_history(&self) -> &SlopeHistory {
        &self.slope
    }

    pub fn timers(&self) -> &MotionTimers {
        &self.ctx.timers
    }

    pub fn ability(&self) -> &AbilityContributor {
        &self.ability
    }

    pub fn planes(&self) -> &PlaneSystem {
        &self.planes
    }

    /// Unground request queued for the start of the next tick
    pub fn pending_force_unground(&self) -> bool {
        self.ctx.force_unground
    }

    /// Capture the motion state for a later [`restore`](Self::restore)
    pub fn snapshot(&self) -> MotionSnapshot {
        MotionSnapshot::new(self.ctx.state.clone(), self.ctx.plane, self.up)
    }

    /// Rewind to a snapshot; queued impulses and plane rotations are dropped
    pub fn restore(&mut self, snapshot: MotionSnapshot) {
        self.ctx.state = snapshot.state;
        self.ctx.plane = snapshot.plane;
        self.up = snapshot.up;
        self.impulse = Vec3::ZERO;
        self.velocity_rotation = None;
        self.discrete_normals.clear();
        self.slope.clear();
        log::debug!("restored snapshot on plane {:?}", self.ctx.plane.normal);
    }

    // ---- external requests ----

    /// Add a one-off velocity change at the next velocity update
    pub fn queue_impulse(&mut self, impulse: Vec3) {
        self.impulse += impulse;
    }

    /// Drive the character at a fixed velocity for `duration` seconds
    ///
    /// The contributor pipeline is bypassed while the path runs. Starting a
    /// new path replaces the running one.
    pub fn start_kinematic_path(&mut self, velocity: Vec3, duration: f32) {
        self.kinematic = Some(velocity);
        self.ctx
            .timers
            .start(TimerKey::KinematicPath, duration, TimerAction::EndKinematicPath);
        log::debug!("kinematic path {:?} for {:.2}s", velocity, duration);
    }

    pub fn is_on_kinematic_path(&self) -> bool {
        self.kinematic.is_some()
    }

    /// Switch planes at the start of the next tick
    pub fn request_plane_switch(&mut self, plane: Plane) {
        self.planes.request(plane, false);
    }

    // ---- volumes ----

    /// Register a dynamic plane or plane breaker described by a path
    pub fn register_plane_volume(
        &mut self,
        id: VolumeId,
        tag: TriggerTag,
        points: Vec<Vec3>,
        prioritize: bool,
    ) -> Result<()> {
        let kind = match tag {
            TriggerTag::DynamicPlane => PlaneVolumeKind::Dynamic,
            TriggerTag::PlaneBreaker => PlaneVolumeKind::Breaker,
            TriggerTag::Effector => {
                return Err(MotionError::InvalidVolume {
                    id,
                    reason: "effectors carry overrides, not a plane path".to_string(),
                })
            }
        };
        let path = PlanePath::new(points, self.ctx.world_up()).ok_or_else(|| {
            MotionError::MissingCollaborator(format!("plane volume {:?} has no usable path", id))
        })?;
        self.planes.register(
            id,
            PlaneVolume {
                kind,
                path,
                prioritize,
            },
        )
    }

    /// Register the overrides an effector volume applies while occupied
    pub fn register_effector(&mut self, id: VolumeId, overrides: Vec<AttributeOverride>) -> Result<()> {
        if self.effectors.contains_key(&id) || self.planes.contains(id) {
            return Err(MotionError::InvalidVolume {
                id,
                reason: "already registered".to_string(),
            });
        }
        self.effectors.insert(id, overrides);
        Ok(())
    }

    pub fn on_trigger_enter(&mut self, tag: TriggerTag, id: VolumeId) {
        log::debug!("trigger enter {:?} {:?}", tag, id);
        match tag {
            TriggerTag::DynamicPlane | TriggerTag::PlaneBreaker => self.planes.on_enter(id, self.ctx.plane),
            TriggerTag::Effector => match self.effectors.get(&id) {
                Some(overrides) => self.ability.on_effector_enter(&mut self.ctx, id, overrides),
                None => log::warn!("enter from unregistered effector {:?}", id),
            },
        }
    }

    pub fn on_trigger_exit(&mut self, tag: TriggerTag, id: VolumeId) {
        log::debug!("trigger exit {:?} {:?}", tag, id);
        match tag {
            TriggerTag::DynamicPlane | TriggerTag::PlaneBreaker => self.planes.on_exit(id),
            TriggerTag::Effector => self.ability.on_effector_exit(&mut self.ctx, id),
        }
    }

    // ---- tick internals ----

    fn on_timer(&mut self, action: TimerAction) {
        log::debug!("timer finished: {:?}", action);
        match action {
            TimerAction::ClearJumpBuffer => self.ctx.state.ungrounded_jump_normal = None,
            TimerAction::EndKinematicPath => self.kinematic = None,
            TimerAction::EndDash => self.ability.on_timer(&mut self.ctx, action),
        }
    }

    fn apply_plane_switches(&mut self, motor: &mut MotorLink) {
        let travel = self
            .ctx
            .state
            .velocity
            .try_normalize()
            .unwrap_or_else(|| self.ctx.air_axis() * self.ctx.state.facing.sign());

        let pending = self.planes.take_pending();
        let selected = self.planes.select(
            motor.position,
            travel,
            self.ctx.state.grounded,
            self.ctx.state.speed(),
            self.ctx.attributes.motor.float(MotorSchema::ATTACH_SPEED),
        );

        for request in pending.into_iter().chain(selected) {
            if let Some(rotation) = switch_plane(&mut self.ctx, &mut motor.position, request) {
                self.velocity_rotation = Some(match self.velocity_rotation {
                    Some(previous) => rotation * previous,
                    None => rotation,
                });
            }
        }
    }

    /// Whether the character should orient to the ground this tick
    fn attached(&self) -> bool {
        self.ctx.state.grounded
            && (self.ctx.is_walkable()
                || self.ctx.state.speed() >= self.ctx.attributes.motor.float(MotorSchema::ATTACH_SPEED))
    }

    /// Up this tick from ground or world alignment; `None` while an
    /// airborne spin drives the orientation instead
    fn aligned_up(&mut self, dt: f32) -> Option<Vec3> {
        let axis = self.ctx.plane.normal;
        let world_up = self.ctx.world_up();

        if std::mem::take(&mut self.snap_floor) {
            self.ctx.state.angular_velocity = 0.0;
            log::debug!("swept a floor while spinning, snapping upright");
            return Some(world_up);
        }
        if self.attached() {
            return Some(self.ctx.state.ground_normal);
        }
        if !self.ctx.state.grounded && self.ctx.state.angular_velocity != 0.0 {
            return None;
        }

        let max_step = radians(self.ctx.attributes.motor.float(MotorSchema::UP_ALIGN_RATE)) * dt;
        let angle = self.up.signed_angle(world_up, axis);
        let step = angle.clamp(-max_step, max_step);
        Some(Quat::from_axis_angle(axis, step).rotate(self.up))
    }

    fn land(&mut self) {
        let speed = self.ctx.state.speed();
        log::debug!("landed at {:.2}", speed);

        let state = &mut self.ctx.state;
        state.is_jumping = false;
        state.air_jumps_used = 0;
        state.angular_velocity = 0.0;
        state.ungrounded_jump_normal = None;
        state.steep_time = 0.0;
        self.ctx.timers.cancel(TimerKey::UngroundedJumpBuffer);
        self.slope.clear();
        self.ability.on_landed(&mut self.ctx);
        self.ctx.events.publish(MotionEvent::Landed { speed });
    }

    fn leave_ground(&mut self) {
        let normal = self.ctx.state.ground_normal;
        let spin = self.slope.leave_ground(normal, self.ctx.plane.normal);
        self.ctx.state.angular_velocity = spin;
        self.ctx.state.slope_changed = false;
        log::debug!("left ground, spin {:.3} rad/s", spin);

        if !self.ctx.state.is_jumping {
            self.ctx.state.ungrounded_jump_normal = Some(normal);
            let buffer = self.ctx.attributes.jump.float(JumpSchema::BUFFER_TIME);
            self.ctx
                .timers
                .start(TimerKey::UngroundedJumpBuffer, buffer, TimerAction::ClearJumpBuffer);
        }
        self.ctx.events.publish(MotionEvent::LeftGround { angular_velocity: spin });
    }

    fn record_wall_hit(&mut self, hit: &HitInfo) {
        if hit.is_stable {
            let world_up = self.ctx.world_up();
            let floor_angle = degrees(hit.normal.angle_between(world_up));
            if !self.ctx.state.grounded
                && self.ctx.state.angular_velocity != 0.0
                && floor_angle <= self.rotation.snap_floor_angle
            {
                self.snap_floor = true;
            }
            return;
        }

        let axis = self.ctx.move_axis(self.up);
        let walls = &mut self.ctx.wall_hits;
        if hit.normal.dot(self.up) < CEILING_DOT {
            walls.ceiling = Some(hit.normal);
        } else if hit.normal.dot(axis) < 0.0 {
            walls.right = Some(hit.normal);
        } else {
            walls.left = Some(hit.normal);
        }
    }
}

impl MotorCallbacks for CharacterController {
    fn before_update(&mut self, motor: &mut MotorLink, dt: f32) {
        self.ctx.dt = dt;

        for (_, action) in self.ctx.timers.tick(dt) {
            self.on_timer(action);
        }
        if std::mem::take(&mut self.ctx.force_unground) {
            motor.force_unground();
        }
        self.apply_plane_switches(motor);

        self.action.before_update(&mut self.ctx);
        self.ability.before_update(&mut self.ctx);
        self.physics.before_update(&mut self.ctx);
    }

    fn update_rotation(&mut self, motor: &mut MotorLink, rotation: &mut Quat, dt: f32) {
        let axis = self.ctx.plane.normal;
        let old_up = self.up;
        let aligned = self.aligned_up(dt);
        if let Some(up) = aligned {
            self.up = up;
        }

        let mut spin = self.ctx.state.angular_velocity;
        self.action.update_rotation(&mut self.ctx, &mut spin);
        self.ability.update_rotation(&mut self.ctx, &mut spin);
        self.physics.update_rotation(&mut self.ctx, &mut spin);
        self.ctx.state.angular_velocity = spin;

        let target = match aligned {
            Some(up) => up,
            None => Quat::from_axis_angle(axis, spin * dt).rotate(old_up),
        };
        let new_up = target
            .project_on_plane(axis)
            .try_normalize()
            .unwrap_or_else(|| self.ctx.world_up());
        self.up = new_up;

        if self.ctx.state.grounded {
            let offset = self.rotation.contact_offset;
            let contact = motor.position - old_up * offset;
            motor.position = contact + new_up * offset;
        }

        let forward = self.ctx.move_axis(new_up) * self.ctx.state.facing.sign();
        *rotation = Quat::look_rotation(forward, new_up);
        motor.rotation = *rotation;
    }

    fn update_velocity(&mut self, motor: &mut MotorLink, velocity: &mut Vec3, dt: f32) {
        self.ctx.dt = dt;
        let mut v = *velocity;
        if let Some(rotation) = self.velocity_rotation.take() {
            v = rotation.rotate(v);
        }
        for normal in self.discrete_normals.drain(..) {
            let into = v.dot(normal);
            if into < 0.0 {
                v -= normal * into;
            }
        }

        if self.ctx.state.grounded {
            let projected = v.project_on_plane(self.ctx.state.ground_normal);
            v = if std::mem::take(&mut self.ctx.state.slope_changed) {
                projected.try_normalize().map_or(projected, |dir| dir * v.length())
            } else {
                projected
            };
        }

        v += std::mem::take(&mut self.impulse);

        match self.kinematic {
            Some(path_velocity) => v = path_velocity,
            None => {
                if !self.ability.suppresses_action() {
                    self.action.update_velocity(&mut self.ctx, &mut v);
                }
                self.ability.update_velocity(&mut self.ctx, &mut v);
                if !self.ability.suppresses_physics() {
                    self.physics.update_velocity(&mut self.ctx, &mut v);
                }
            }
        }

        v = v.project_on_plane(self.ctx.plane.normal);
        let motor_attr = &self.ctx.attributes.motor;
        let max_speed = motor_attr.float(MotorSchema::MAX_SPEED);
        if v.length() > max_speed {
            v = v.normalize() * max_speed;
        }

        let t = inverse_lerp(0.0, motor_attr.float(MotorSchema::STABLE_ANGLE_FULL_SPEED), v.length());
        motor.max_stable_slope_angle = lerp(
            motor_attr.float(MotorSchema::MIN_STABLE_ANGLE),
            motor_attr.float(MotorSchema::MAX_STABLE_ANGLE),
            t,
        );
        motor.ground_probe_distance = lerp(
            motor_attr.float(MotorSchema::PROBE_MIN),
            motor_attr.float(MotorSchema::PROBE_MAX),
            t,
        );

        self.ctx.wall_hits.clear();
        self.ctx.state.velocity = v;
        *velocity = v;
        log::trace!("velocity {:?}", v);
    }

    fn post_grounding_update(&mut self, motor: &mut MotorLink, dt: f32) {
        let was_grounded = self.ctx.state.grounded;
        let grounded =
            motor.grounding.is_stable_on_ground && !self.ctx.force_unground && !motor.must_unground();
        self.ctx.state.was_grounded = was_grounded;

        self.slope.tick(dt);
        if grounded {
            let normal = motor
                .grounding
                .ground_normal
                .try_normalize()
                .unwrap_or_else(|| self.ctx.world_up());
            let previous = self.ctx.state.ground_normal;
            if was_grounded && !normal.abs_diff_eq(previous, SLOPE_EPSILON) {
                self.slope.record_slope_change(previous);
                self.ctx.state.slope_changed = true;
            }
            self.ctx.state.ground_normal = normal;
        }

        self.ctx.state.grounded = grounded;
        match (was_grounded, grounded) {
            (false, true) => self.land(),
            (true, false) => self.leave_ground(),
            _ => {}
        }

        if self.ctx.state.grounded {
            let normal = self.ctx.state.ground_normal;
            let tangential = self.ctx.state.velocity.project_on_plane(normal).length();
            let attach = self.ctx.attributes.motor.float(MotorSchema::ATTACH_SPEED);
            if tangential < attach && !self.ctx.is_walkable() {
                log::debug!(
                    "forced detach at {:.2} on {:.1} degree slope",
                    tangential,
                    self.ctx.slope_angle()
                );
                self.ctx.request_unground();
                self.ctx.state.grounded = false;
                self.ctx.events.publish(MotionEvent::ForcedDetach { normal });
                self.leave_ground();
            }
        }
    }

    fn after_update(&mut self, _motor: &mut MotorLink, _dt: f32) {
        self.action.after_update(&mut self.ctx);
        self.ability.after_update(&mut self.ctx);
        self.physics.after_update(&mut self.ctx);

        self.ctx.input.end_tick();
        self.ctx.negations.clear();
        self.last_events = self.ctx.events.process();
    }

    fn on_ground_hit(&mut self, _motor: &MotorLink, hit: &HitInfo) {
        self.record_wall_hit(hit);
    }

    fn on_movement_hit(&mut self, _motor: &MotorLink, hit: &HitInfo) {
        self.record_wall_hit(hit);
    }

    fn process_hit_stability_report(
        &mut self,
        motor: &MotorLink,
        hit: &HitInfo,
        report: &mut HitStabilityReport,
    ) {
        let normal = if report.ledge_detected {
            report.inner_normal
        } else {
            hit.normal
        };
        let angle = degrees(normal.angle_between(self.up));
        let stable = angle <= motor.max_stable_slope_angle;
        if stable != report.is_stable {
            log::trace!("stability corrected to {} at {:.1} degrees", stable, angle);
        }
        report.is_stable = stable;
    }

    fn on_discrete_collision_detected(&mut self, _motor: &MotorLink, hit: &HitInfo) {
        if let Some(normal) = hit.normal.try_normalize() {
            self.discrete_normals.push(normal);
        }
    }

    fn is_collider_valid_for_collisions(&self, collider: &ColliderInfo) -> bool {
        collider_blocks(&self.groups, collider, self.ctx.state.velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::GroundingReport;
    use approx::assert_relative_eq;

    fn tick(controller: &mut CharacterController, motor: &mut MotorLink, velocity: &mut Vec3, ground: GroundingReport) {
        let dt = 0.1;
        let mut rotation = motor.rotation;
        controller.before_update(motor, dt);
        controller.update_rotation(motor, &mut rotation, dt);
        controller.update_velocity(motor, velocity, dt);
        motor.position += *velocity * dt;
        motor.take_force_unground();
        motor.set_grounding(ground);
        controller.post_grounding_update(motor, dt);
        controller.after_update(motor, dt);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let config = MotionConfig::default().with_timestep(-1.0);
        assert!(CharacterController::new(&config).is_err());
    }

    #[test]
    fn test_landing_resets_air_state() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let mut motor = MotorLink::new(Vec3::new(0.0, 1.0, 0.0));
        let mut velocity = Vec3::new(0.0, -5.0, 0.0);
        controller.ctx.state.air_jumps_used = 1;
        controller.ctx.state.is_jumping = true;

        tick(&mut controller, &mut motor, &mut velocity, GroundingReport::stable(Vec3::Y, Vec3::ZERO));

        assert!(controller.state().grounded);
        assert!(controller.state().just_landed());
        assert!(!controller.state().is_jumping);
        assert_eq!(controller.state().air_jumps_used, 0);
        assert!(matches!(controller.last_events(), [MotionEvent::Landed { .. }]));
    }

    #[test]
    fn test_airborne_spin_turns_up() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let mut motor = MotorLink::new(Vec3::ZERO);
        let mut rotation = Quat::IDENTITY;
        controller.ctx.state.angular_velocity = 2.0;

        controller.before_update(&mut motor, 0.1);
        controller.update_rotation(&mut motor, &mut rotation, 0.1);

        let expected = Quat::from_axis_angle(Vec3::Z, 0.2).rotate(Vec3::Y);
        assert!(controller.up().abs_diff_eq(expected, 1e-5));
        assert!(rotation.up().abs_diff_eq(expected, 1e-5));
        assert_relative_eq!(controller.state().angular_velocity, 2.0);
    }

    #[test]
    fn test_grounded_up_follows_ground_and_drops_spin() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let mut motor = MotorLink::new(Vec3::ZERO);
        let mut rotation = Quat::IDENTITY;
        let normal = Quat::from_axis_angle(Vec3::Z, radians(10.0)).rotate(Vec3::Y);
        controller.ctx.state.grounded = true;
        controller.ctx.state.ground_normal = normal;
        controller.ctx.state.angular_velocity = 3.0;

        controller.update_rotation(&mut motor, &mut rotation, 0.1);

        assert!(controller.up().abs_diff_eq(normal, 1e-5));
        assert_eq!(controller.state().angular_velocity, 0.0);
    }

    #[test]
    fn test_forced_detach_drops_pending_slope_change() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let mut motor = MotorLink::new(Vec3::ZERO);
        let mut velocity = Vec3::ZERO;
        tick(&mut controller, &mut motor, &mut velocity, GroundingReport::stable(Vec3::Y, Vec3::ZERO));
        assert!(controller.state().grounded);

        let wall = Quat::from_axis_angle(Vec3::Z, radians(80.0)).rotate(Vec3::Y);
        let report = GroundingReport::stable(wall, motor.position);
        tick(&mut controller, &mut motor, &mut velocity, report);

        assert!(!controller.state().grounded);
        assert!(!controller.state().slope_changed);
    }

    #[test]
    fn test_walking_off_ledge_buffers_jump_normal() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let mut motor = MotorLink::new(Vec3::ZERO);
        let mut velocity = Vec3::new(6.0, 0.0, 0.0);
        let ground = GroundingReport::stable(Vec3::Y, Vec3::ZERO);
        tick(&mut controller, &mut motor, &mut velocity, ground);

        tick(&mut controller, &mut motor, &mut velocity, GroundingReport::airborne());
        assert!(controller.state().just_left_ground());
        assert_eq!(controller.state().ungrounded_jump_normal, Some(Vec3::Y));
        assert!(controller.timers().is_active(TimerKey::UngroundedJumpBuffer));

        tick(&mut controller, &mut motor, &mut velocity, GroundingReport::airborne());
        tick(&mut controller, &mut motor, &mut velocity, GroundingReport::airborne());
        assert!(controller.state().ungrounded_jump_normal.is_none());
    }

    #[test]
    fn test_kinematic_path_bypasses_pipeline() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let mut motor = MotorLink::new(Vec3::ZERO);
        let mut velocity = Vec3::ZERO;
        controller.start_kinematic_path(Vec3::new(10.0, 10.0, 0.0), 0.25);

        tick(&mut controller, &mut motor, &mut velocity, GroundingReport::airborne());
        assert_eq!(velocity, Vec3::new(10.0, 10.0, 0.0));

        for _ in 0..3 {
            tick(&mut controller, &mut motor, &mut velocity, GroundingReport::airborne());
        }
        assert!(!controller.is_on_kinematic_path());
        assert!(velocity.y < 10.0);
    }

    #[test]
    fn test_velocity_clamped_and_kept_in_plane() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let mut motor = MotorLink::new(Vec3::ZERO);
        let mut velocity = Vec3::ZERO;
        controller.queue_impulse(Vec3::new(100.0, 0.0, 30.0));

        tick(&mut controller, &mut motor, &mut velocity, GroundingReport::airborne());
        assert_relative_eq!(velocity.z, 0.0);
        assert_relative_eq!(velocity.length(), 60.0, epsilon = 1e-3);
    }

    #[test]
    fn test_tolerances_scale_with_speed() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let mut motor = MotorLink::new(Vec3::ZERO);
        let mut velocity = Vec3::ZERO;
        let mut rotation = Quat::IDENTITY;
        controller.ctx.negations.gravity = true;

        controller.before_update(&mut motor, 0.1);
        controller.update_rotation(&mut motor, &mut rotation, 0.1);
        controller.ctx.negations.gravity = true;
        controller.update_velocity(&mut motor, &mut velocity, 0.1);
        assert_relative_eq!(motor.max_stable_slope_angle, 55.0);
        assert_relative_eq!(motor.ground_probe_distance, 0.1);

        velocity = Vec3::new(30.0, 0.0, 0.0);
        controller.update_velocity(&mut motor, &mut velocity, 0.1);
        assert_relative_eq!(motor.max_stable_slope_angle, 89.0);
        assert_relative_eq!(motor.ground_probe_distance, 0.6);
    }

    #[test]
    fn test_wall_hits_classified() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let motor = MotorLink::new(Vec3::ZERO);
        let wall = |normal| HitInfo {
            normal,
            point: Vec3::ZERO,
            is_stable: false,
            collider: ColliderInfo::solid(),
        };

        controller.on_movement_hit(&motor, &wall(Vec3::NEG_X));
        controller.on_movement_hit(&motor, &wall(Vec3::X));
        controller.on_movement_hit(&motor, &wall(Vec3::NEG_Y));

        let walls = controller.wall_hits();
        assert_eq!(walls.right, Some(Vec3::NEG_X));
        assert_eq!(walls.left, Some(Vec3::X));
        assert_eq!(walls.ceiling, Some(Vec3::NEG_Y));
    }

    #[test]
    fn test_stability_report_uses_inner_normal_on_ledge() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let mut motor = MotorLink::new(Vec3::ZERO);
        motor.max_stable_slope_angle = 55.0;
        let hit = HitInfo {
            normal: Vec3::X,
            point: Vec3::ZERO,
            is_stable: false,
            collider: ColliderInfo::solid(),
        };
        let mut report = HitStabilityReport {
            is_stable: false,
            ledge_detected: true,
            inner_normal: Vec3::Y,
            outer_normal: Vec3::X,
        };

        controller.process_hit_stability_report(&motor, &hit, &mut report);
        assert!(report.is_stable);

        report.ledge_detected = false;
        controller.process_hit_stability_report(&motor, &hit, &mut report);
        assert!(!report.is_stable);
    }

    #[test]
    fn test_one_way_platform_validity() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let platform = ColliderInfo::one_way(Vec3::Y);

        controller.ctx.state.velocity = Vec3::new(0.0, 5.0, 0.0);
        assert!(!controller.is_collider_valid_for_collisions(&platform));

        controller.ctx.state.velocity = Vec3::new(0.0, -5.0, 0.0);
        assert!(controller.is_collider_valid_for_collisions(&platform));
        assert!(!controller.is_collider_valid_for_collisions(&ColliderInfo::trigger()));
    }

    #[test]
    fn test_restore_rewinds_state() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        let mut motor = MotorLink::new(Vec3::ZERO);
        let mut velocity = Vec3::new(4.0, 0.0, 0.0);
        let saved = controller.snapshot();

        tick(&mut controller, &mut motor, &mut velocity, GroundingReport::stable(Vec3::Y, Vec3::ZERO));
        assert!(controller.state().grounded);

        controller.restore(MotionSnapshot::from_bytes(&saved.to_bytes().unwrap()).unwrap());
        assert_eq!(controller.state(), &saved.state);
        assert_eq!(controller.plane(), saved.plane);
    }

    #[test]
    fn test_effector_registration_rules() {
        let mut controller = CharacterController::new(&MotionConfig::default()).unwrap();
        controller.register_effector(VolumeId(1), Vec::new()).unwrap();
        assert!(controller.register_effector(VolumeId(1), Vec::new()).is_err());

        let err = controller
            .register_plane_volume(VolumeId(2), TriggerTag::Effector, vec![Vec3::ZERO, Vec3::X], false)
            .unwrap_err();
        assert!(matches!(err, MotionError::InvalidVolume { .. }));

        let err = controller
            .register_plane_volume(VolumeId(3), TriggerTag::DynamicPlane, vec![Vec3::ZERO], false)
            .unwrap_err();
        assert!(matches!(err, MotionError::MissingCollaborator(_)));
    }
}
