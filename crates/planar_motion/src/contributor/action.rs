//! Input-driven movement: running, air control, kick-off and jumping

use super::{MotionContext, MotionContributor};
use crate::attributes::{JumpSchema as J, RunSchema as R};
use crate::events::MotionEvent;
use crate::state::Facing;
use crate::timers::TimerKey;
use planar_math::{move_towards, Vec3};

/// Run input below this magnitude is ignored
const RUN_DEADZONE: f32 = 0.1;
/// Speed at which the character counts as standing still
const REST_SPEED: f32 = 0.05;

#[derive(Debug, Clone, Default)]
pub struct ActionContributor {
    /// A jump cancel arrived while moving up too fast; retry next tick
    pending_cancel: bool,
    jumped_this_tick: bool,
}

impl ActionContributor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_pending(&self) -> bool {
        self.pending_cancel
    }

    fn run_input(ctx: &MotionContext) -> f32 {
        let axis = ctx.input.frame().run_axis;
        if axis.abs() < RUN_DEADZONE {
            0.0
        } else {
            axis
        }
    }

    fn ground_move(ctx: &mut MotionContext, velocity: &mut Vec3, run: f32) {
        if run == 0.0 {
            return;
        }
        let tangent = ctx.ground_tangent();
        if tangent.is_near_zero() {
            return;
        }
        let run_sign = run.signum();
        let direction = tangent * run_sign;
        let attr = &ctx.attributes.run;

        if ctx.input.frame().double_tap_run {
            *velocity = direction * attr.float(R::KICK_OFF_SPEED);
            ctx.negations.friction = true;
            log::debug!("kick-off at {:.2}", attr.float(R::KICK_OFF_SPEED));
            return;
        }

        let downhill = direction.dot(ctx.world_up()) < 0.0;
        if velocity.length() <= REST_SPEED
            && downhill
            && ctx.slope_angle() >= attr.float(R::AUTO_KICK_OFF_ANGLE)
        {
            *velocity = direction * attr.float(R::AUTO_KICK_OFF_SPEED);
            ctx.negations.friction = true;
            log::debug!("auto kick-off on {:.1} degree slope", ctx.slope_angle());
            return;
        }

        ctx.negations.friction = true;
        let along = velocity.dot(tangent);
        let strength = run.abs() * ctx.dt;
        let target = run * attr.float(R::MAX_RUN_SPEED);
        let new_along = if along * run_sign < 0.0 {
            move_towards(along, 0.0, attr.float(R::BRAKE_DECEL) * strength)
        } else if along * run_sign < target.abs() {
            move_towards(along, target, attr.float(R::RUN_ACCEL) * strength)
        } else {
            along
        };
        *velocity += tangent * (new_along - along);
    }

    fn air_move(ctx: &mut MotionContext, velocity: &mut Vec3, run: f32) {
        if run == 0.0 {
            return;
        }
        let axis = ctx.air_axis();
        let run_sign = run.signum();
        if axis.is_near_zero() || ctx.wall_hits.blocks(axis * run_sign) {
            return;
        }

        let attr = &ctx.attributes.run;
        let along = velocity.dot(axis);
        let accel = if along.abs() < attr.float(R::AIR_PRECISE_SPEED) {
            attr.float(R::AIR_ACCEL_PRECISE)
        } else {
            attr.float(R::AIR_ACCEL_LOOSE)
        };
        let target = run * attr.float(R::MAX_RUN_SPEED);
        if along * run_sign < target.abs() {
            let new_along = move_towards(along, target, accel * run.abs() * ctx.dt);
            *velocity += axis * (new_along - along);
        }
    }

    fn try_jump(&mut self, ctx: &mut MotionContext, velocity: &mut Vec3) -> bool {
        let (normal, air_jump, late) = if ctx.state.grounded {
            (ctx.state.ground_normal, false, false)
        } else if let Some(normal) = ctx.state.ungrounded_jump_normal.take() {
            ctx.timers.cancel(TimerKey::UngroundedJumpBuffer);
            (normal, false, true)
        } else if ctx.state.air_jumps_used < ctx.attributes.jump.int(J::AIR_JUMPS) {
            ctx.state.air_jumps_used += 1;
            (ctx.world_up(), true, false)
        } else {
            return false;
        };

        if air_jump || late {
            let into = velocity.dot(normal);
            if into < 0.0 {
                *velocity -= normal * into;
            }
        }
        *velocity += normal * ctx.attributes.jump.float(J::JUMP_SPEED);

        ctx.state.is_jumping = true;
        // still grounded until the unground lands next tick
        ctx.negations.friction = true;
        ctx.request_unground();
        ctx.events.publish(MotionEvent::Jumped { normal, air_jump });
        log::debug!("jump along {:?} (air: {}, late: {})", normal, air_jump, late);

        self.jumped_this_tick = true;
        self.pending_cancel = false;
        true
    }

    fn jump_cancel(&mut self, ctx: &MotionContext, velocity: &mut Vec3) {
        self.pending_cancel = false;
        if !ctx.state.is_jumping {
            return;
        }

        let up = ctx.world_up();
        let upward = velocity.dot(up);
        let target = ctx.attributes.jump.float(J::CANCEL_TARGET_SPEED);
        if upward > ctx.attributes.jump.float(J::CANCEL_MAX_SPEED) {
            self.pending_cancel = true;
        } else if upward > target {
            *velocity -= up * (upward - target);
            log::trace!("jump cancelled at {:.2}", upward);
        }
    }
}

impl MotionContributor for ActionContributor {
    fn update_rotation(&mut self, ctx: &mut MotionContext, _angular_velocity: &mut f32) {
        let run = Self::run_input(ctx);
        ctx.state.facing = Facing::from_sign(run, ctx.state.facing);
    }

    fn update_velocity(&mut self, ctx: &mut MotionContext, velocity: &mut Vec3) {
        let run = Self::run_input(ctx);
        if ctx.state.grounded {
            Self::ground_move(ctx, velocity, run);
        } else {
            Self::air_move(ctx, velocity, run);
        }

        let input = *ctx.input.frame();
        if input.jump && !self.jumped_this_tick {
            self.try_jump(ctx, velocity);
        }
        if (input.jump_cancel || self.pending_cancel) && !self.jumped_this_tick {
            self.jump_cancel(ctx, velocity);
        }
    }

    fn after_update(&mut self, _ctx: &mut MotionContext) {
        self.jumped_this_tick = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotionConfig;
    use crate::input::InputFrame;
    use crate::state::WallHitSet;
    use approx::assert_relative_eq;
    use planar_math::{radians, Quat};

    const DT: f32 = 0.1;

    fn context() -> MotionContext {
        let config = MotionConfig::default().with_air_jumps(1);
        let mut ctx = MotionContext::new(&config).unwrap();
        ctx.dt = DT;
        ctx
    }

    fn grounded_on(ctx: &mut MotionContext, degrees_about_z: f32) {
        ctx.state.grounded = true;
        ctx.state.ground_normal =
            Quat::from_axis_angle(Vec3::Z, radians(degrees_about_z)).rotate(Vec3::Y);
    }

    #[test]
    fn test_run_accelerates_and_claims_friction() {
        let mut ctx = context();
        grounded_on(&mut ctx, 0.0);
        ctx.input.feed(InputFrame::default().with_run(1.0));
        let mut v = Vec3::ZERO;

        ActionContributor::new().update_velocity(&mut ctx, &mut v);

        assert_relative_eq!(v.x, 1.5, epsilon = 1e-5);
        assert!(ctx.negations.friction);
    }

    #[test]
    fn test_brake_against_motion() {
        let mut ctx = context();
        grounded_on(&mut ctx, 0.0);
        ctx.input.feed(InputFrame::default().with_run(-1.0));
        let mut v = Vec3::new(10.0, 0.0, 0.0);

        ActionContributor::new().update_velocity(&mut ctx, &mut v);
        assert_relative_eq!(v.x, 5.5, epsilon = 1e-5);
    }

    #[test]
    fn test_auto_kick_off_sets_speed_downhill() {
        let mut ctx = context();
        // Slope descending towards +X
        grounded_on(&mut ctx, -20.0);
        ctx.input.feed(InputFrame::default().with_run(1.0));
        let mut v = Vec3::ZERO;

        ActionContributor::new().update_velocity(&mut ctx, &mut v);

        let expected = ctx.ground_tangent() * 6.0;
        assert!(v.abs_diff_eq(expected, 1e-5));
        assert!(expected.y < 0.0);
    }

    #[test]
    fn test_no_auto_kick_off_uphill_or_shallow() {
        let mut ctx = context();
        grounded_on(&mut ctx, 20.0);
        ctx.input.feed(InputFrame::default().with_run(1.0));
        let mut v = Vec3::ZERO;
        ActionContributor::new().update_velocity(&mut ctx, &mut v);
        assert_relative_eq!(v.length(), 1.5, epsilon = 1e-5);

        let mut ctx = context();
        grounded_on(&mut ctx, -10.0);
        ctx.input.feed(InputFrame::default().with_run(1.0));
        let mut v = Vec3::ZERO;
        ActionContributor::new().update_velocity(&mut ctx, &mut v);
        assert_relative_eq!(v.length(), 1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_manual_kick_off() {
        let mut ctx = context();
        grounded_on(&mut ctx, 0.0);
        ctx.input.feed(InputFrame::default().with_run(-1.0).with_double_tap());
        let mut v = Vec3::new(2.0, 0.0, 0.0);

        ActionContributor::new().update_velocity(&mut ctx, &mut v);
        assert!(v.abs_diff_eq(Vec3::new(-8.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_grounded_jump() {
        let mut ctx = context();
        grounded_on(&mut ctx, 0.0);
        ctx.input.feed(InputFrame::default().with_jump());
        let mut v = Vec3::new(3.0, 0.0, 0.0);
        let mut action = ActionContributor::new();

        action.update_velocity(&mut ctx, &mut v);

        assert!(ctx.state.is_jumping);
        assert!(ctx.force_unground);
        assert!(ctx.negations.friction);
        assert!(v.abs_diff_eq(Vec3::new(3.0, 14.0, 0.0), 1e-5));
        assert_eq!(ctx.events.pending_count(), 1);

        // The same latched edge must not jump twice in one tick
        action.update_velocity(&mut ctx, &mut v);
        assert_relative_eq!(v.y, 14.0, epsilon = 1e-5);
    }

    #[test]
    fn test_air_jump_budget() {
        let mut ctx = context();
        ctx.input.feed(InputFrame::default().with_jump());
        let mut v = Vec3::new(0.0, -5.0, 0.0);
        let mut action = ActionContributor::new();

        assert!(action.try_jump(&mut ctx, &mut v));
        assert_relative_eq!(v.y, 14.0, epsilon = 1e-5);
        assert!(!action.try_jump(&mut ctx, &mut v));
    }

    #[test]
    fn test_late_jump_uses_buffered_normal() {
        let mut ctx = context();
        ctx.state.air_jumps_used = 1;
        ctx.state.ungrounded_jump_normal = Some(Vec3::Y);
        let mut v = Vec3::ZERO;
        let mut action = ActionContributor::new();

        assert!(action.try_jump(&mut ctx, &mut v));
        assert!(ctx.state.ungrounded_jump_normal.is_none());
        assert!(!action.try_jump(&mut ctx, &mut v));
    }

    #[test]
    fn test_jump_cancel_band() {
        let mut action = ActionContributor::new();
        let mut ctx = context();
        ctx.state.is_jumping = true;

        // Too fast: deferred
        let mut v = Vec3::new(0.0, 12.0, 0.0);
        action.jump_cancel(&ctx, &mut v);
        assert!(action.cancel_pending());
        assert_relative_eq!(v.y, 12.0);

        // Inside the band: clamped to the target
        let mut v = Vec3::new(0.0, 8.0, 0.0);
        action.jump_cancel(&ctx, &mut v);
        assert!(!action.cancel_pending());
        assert_relative_eq!(v.y, 4.0);

        // Below the target: nothing to do
        let mut v = Vec3::new(0.0, 2.0, 0.0);
        action.jump_cancel(&ctx, &mut v);
        assert_relative_eq!(v.y, 2.0);
    }

    #[test]
    fn test_deferred_cancel_retried_next_tick() {
        let mut action = ActionContributor::new();
        let mut ctx = context();
        ctx.state.is_jumping = true;
        ctx.input.feed(InputFrame::default().with_jump_cancel());

        let mut v = Vec3::new(0.0, 12.0, 0.0);
        action.update_velocity(&mut ctx, &mut v);
        assert!(action.cancel_pending());

        action.after_update(&mut ctx);
        ctx.input.end_tick();
        v.y = 9.0;
        action.update_velocity(&mut ctx, &mut v);
        assert!(!action.cancel_pending());
        assert_relative_eq!(v.y, 4.0);
    }

    #[test]
    fn test_air_control_blocked_by_wall() {
        let mut ctx = context();
        ctx.input.feed(InputFrame::default().with_run(1.0));
        ctx.wall_hits = WallHitSet {
            right: Some(Vec3::NEG_X),
            ..Default::default()
        };
        let mut v = Vec3::ZERO;
        ActionContributor::new().update_velocity(&mut ctx, &mut v);
        assert_eq!(v, Vec3::ZERO);

        ctx.wall_hits.clear();
        ActionContributor::new().update_velocity(&mut ctx, &mut v);
        // Precise air acceleration below the precise speed
        assert_relative_eq!(v.x, 2.5, epsilon = 1e-5);
    }

    #[test]
    fn test_facing_follows_input() {
        let mut ctx = context();
        ctx.input.feed(InputFrame::default().with_run(-0.6));
        let mut spin = 0.0;
        ActionContributor::new().update_rotation(&mut ctx, &mut spin);
        assert_eq!(ctx.state.facing, Facing::Left);
    }
}
