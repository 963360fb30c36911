//! Friction, slope penalties, drag and gravity

use super::{MotionContext, MotionContributor};
use crate::attributes::PhysicsSchema as P;
use planar_math::{move_towards, Vec3};

/// Environmental forces, applied last so earlier contributors can opt out
#[derive(Debug, Clone, Default)]
pub struct PhysicsContributor;

impl PhysicsContributor {
    pub fn new() -> Self {
        Self
    }

    fn ground_friction(ctx: &mut MotionContext, velocity: &mut Vec3) {
        let physics = &ctx.attributes.physics;
        let speed = velocity.length();

        if speed < physics.float(P::STICK_SPEED) && ctx.is_walkable() {
            *velocity = Vec3::ZERO;
            ctx.negations.gravity = true;
            return;
        }

        let coefficient = if speed < physics.float(P::FRICTION_SPEED_SPLIT) {
            physics.float(P::FRICTION_STATIC)
        } else {
            physics.float(P::FRICTION_KINETIC)
        };
        reduce_speed(velocity, coefficient * ctx.dt);
    }

    /// Penalties for riding walls and ceilings, after a grace period
    fn slope_penalty(ctx: &mut MotionContext, velocity: &mut Vec3) {
        if ctx.is_walkable() {
            ctx.state.steep_time = 0.0;
            return;
        }
        ctx.state.steep_time += ctx.dt;

        let physics = &ctx.attributes.physics;
        if ctx.state.steep_time <= physics.float(P::SLOPE_PENALTY_DELAY) {
            return;
        }

        let alignment = ctx.state.ground_normal.dot(ctx.world_up());
        let upside_down = (-alignment).max(0.0);
        let sideways = 1.0 - alignment.abs();
        let penalty = physics.float(P::UPSIDE_DOWN_FRICTION) * upside_down
            + physics.float(P::SIDEWAYS_FRICTION) * sideways;
        reduce_speed(velocity, penalty * ctx.dt);
    }

    fn air_drag(ctx: &MotionContext, velocity: &mut Vec3) {
        let physics = &ctx.attributes.physics;
        let drag = (physics.float(P::AIR_DRAG) * ctx.dt).clamp(0.0, 1.0);
        *velocity -= *velocity * drag;

        let threshold = physics.float(P::EXTRA_DRAG_SPEED);
        let speed = velocity.length();
        if speed > threshold {
            let reduced = move_towards(speed, threshold, physics.float(P::EXTRA_DRAG) * ctx.dt);
            *velocity *= reduced / speed;
        }
    }

    fn gravity(ctx: &MotionContext, velocity: &mut Vec3) {
        let physics = &ctx.attributes.physics;
        let gravity = physics.vector(P::GRAVITY);

        if ctx.state.grounded {
            let along_slope = gravity.project_on_plane(ctx.state.ground_normal);
            let scale = if velocity.dot(along_slope) >= 0.0 {
                physics.float(P::DOWNHILL_GRAVITY_SCALE)
            } else {
                physics.float(P::UPHILL_GRAVITY_SCALE)
            };
            *velocity += along_slope * (scale * ctx.dt);
            return;
        }

        *velocity += gravity * ctx.dt;
        let Some(down) = gravity.try_normalize() else {
            return;
        };
        let fall_speed = velocity.dot(down);
        let terminal = physics.float(P::TERMINAL_SPEED);
        if fall_speed > terminal {
            let excess = (fall_speed - terminal).min(physics.float(P::TERMINAL_DECEL) * ctx.dt);
            *velocity -= down * excess;
        }
    }
}

impl MotionContributor for PhysicsContributor {
    fn update_rotation(&mut self, ctx: &mut MotionContext, angular_velocity: &mut f32) {
        if ctx.state.grounded {
            *angular_velocity = 0.0;
        }
    }

    fn update_velocity(&mut self, ctx: &mut MotionContext, velocity: &mut Vec3) {
        if ctx.state.grounded {
            if !ctx.negations.friction {
                Self::ground_friction(ctx, velocity);
            }
            if !ctx.force_unground {
                Self::slope_penalty(ctx, velocity);
            }
        } else {
            ctx.state.steep_time = 0.0;
            if !ctx.negations.drag {
                Self::air_drag(ctx, velocity);
            }
        }

        if !ctx.negations.gravity {
            Self::gravity(ctx, velocity);
        }

        *velocity += ctx.attributes.physics.vector(P::CONSTANT_ACCEL) * ctx.dt;
    }
}

/// Take `amount` off the speed without reversing direction
fn reduce_speed(velocity: &mut Vec3, amount: f32) {
    let speed = velocity.length();
    if speed <= f32::EPSILON {
        return;
    }
    *velocity *= move_towards(speed, 0.0, amount) / speed;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotionConfig;
    use approx::assert_relative_eq;
    use planar_math::{radians, Quat};
    use planar_params::prelude::*;

    const DT: f32 = 0.1;

    fn context() -> MotionContext {
        let mut ctx = MotionContext::new(&MotionConfig::default()).unwrap();
        ctx.dt = DT;
        ctx
    }

    #[test]
    fn test_stick_region_zeroes_velocity_and_claims_gravity() {
        let mut ctx = context();
        ctx.state.grounded = true;
        let mut v = Vec3::new(0.2, 0.0, 0.0);

        PhysicsContributor::new().update_velocity(&mut ctx, &mut v);

        assert_eq!(v, Vec3::ZERO);
        assert!(ctx.negations.gravity);
    }

    #[test]
    fn test_kinetic_friction() {
        let mut ctx = context();
        ctx.state.grounded = true;
        let mut v = Vec3::new(10.0, 0.0, 0.0);

        PhysicsContributor::new().update_velocity(&mut ctx, &mut v);

        // kinetic friction 12 over 0.1s, gravity is normal to flat ground
        assert_relative_eq!(v.x, 8.8, epsilon = 1e-4);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_friction_negation_respected() {
        let mut ctx = context();
        ctx.state.grounded = true;
        ctx.negations.friction = true;
        let mut v = Vec3::new(10.0, 0.0, 0.0);

        PhysicsContributor::new().update_velocity(&mut ctx, &mut v);
        assert_relative_eq!(v.x, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_grounded_gravity_follows_slope() {
        let mut ctx = context();
        ctx.state.grounded = true;
        ctx.negations.friction = true;
        ctx.state.ground_normal = Quat::from_axis_angle(Vec3::Z, radians(-30.0)).rotate(Vec3::Y);
        let mut v = Vec3::ZERO;

        PhysicsContributor::new().update_velocity(&mut ctx, &mut v);

        // 30 * sin(30) along the slope, downhill scale 0.8
        assert_relative_eq!(v.length(), 30.0 * 0.5 * 0.8 * DT, epsilon = 1e-4);
        assert_relative_eq!(v.dot(ctx.state.ground_normal), 0.0, epsilon = 1e-5);
        assert!(v.y < 0.0);
    }

    #[test]
    fn test_airborne_terminal_speed() {
        let mut ctx = context();
        ctx.negations.drag = true;
        let mut v = Vec3::new(0.0, -50.0, 0.0);

        PhysicsContributor::new().update_velocity(&mut ctx, &mut v);

        // 3 more from gravity, then at most 6 of the 13 excess removed
        assert_relative_eq!(v.y, -47.0, epsilon = 1e-4);
    }

    #[test]
    fn test_gravity_negation() {
        let mut ctx = context();
        ctx.negations.gravity = true;
        ctx.negations.drag = true;
        let mut v = Vec3::new(1.0, 0.0, 0.0);

        PhysicsContributor::new().update_velocity(&mut ctx, &mut v);
        assert_eq!(v, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ceiling_penalty_after_delay() {
        let mut ctx = context();
        ctx.state.grounded = true;
        ctx.negations.friction = true;
        ctx.negations.gravity = true;
        ctx.state.ground_normal = Vec3::NEG_Y;
        let mut physics = PhysicsContributor::new();

        let mut v = Vec3::new(20.0, 0.0, 0.0);
        physics.update_velocity(&mut ctx, &mut v);
        physics.update_velocity(&mut ctx, &mut v);
        assert_relative_eq!(v.x, 20.0, epsilon = 1e-4);

        physics.update_velocity(&mut ctx, &mut v);
        physics.update_velocity(&mut ctx, &mut v);
        assert!(v.x < 20.0);
    }

    #[test]
    fn test_no_ceiling_penalty_while_leaving_ground() {
        let mut ctx = context();
        ctx.state.grounded = true;
        ctx.state.ground_normal = Vec3::NEG_Y;
        ctx.state.steep_time = 10.0;
        ctx.negations.friction = true;
        ctx.negations.gravity = true;
        ctx.request_unground();

        let mut v = Vec3::new(0.0, -14.0, 0.0);
        PhysicsContributor::new().update_velocity(&mut ctx, &mut v);
        assert_eq!(v, Vec3::new(0.0, -14.0, 0.0));
    }

    #[test]
    fn test_constant_accel_override() {
        let mut ctx = context();
        ctx.negations.gravity = true;
        ctx.negations.drag = true;
        ctx.attributes.physics.push_set(
            PartialParameterSet::new()
                .with_vector(P::CONSTANT_ACCEL, Vec3::new(5.0, 0.0, 0.0))
                .unwrap(),
        );
        let mut v = Vec3::ZERO;

        PhysicsContributor::new().update_velocity(&mut ctx, &mut v);
        assert_relative_eq!(v.x, 0.5, epsilon = 1e-6);
    }
}
