//! End-to-end ticks of a character against a scripted host

mod common;

use approx::assert_relative_eq;
use common::{tilted, Host, DT};
use parking_lot::Mutex;
use planar_motion::prelude::*;
use planar_motion::slope::SLOPE_HISTORY_CAPACITY;
use planar_params::{ParameterOverride, ParameterSet, PartialParameterSet};
use planar_triggers::{TriggerSystem, TriggerTag, TriggerVolume};
use std::sync::Arc;

#[test]
fn test_auto_kick_off_sets_speed_on_steep_downhill() {
    let mut host = Host::standard();
    let normal = tilted(-20.0);
    host.place_on_ground(normal, Vec3::ZERO);

    host.controller.feed_input(InputFrame::default().with_run(1.0));
    host.tick_on(normal);

    let downhill = normal.cross(Vec3::Z).normalize();
    let speed = host.velocity.length();
    assert!(host.velocity.normalize().abs_diff_eq(downhill, 1e-3));
    // kick-off speed plus one tick of downhill gravity, far beyond one tick of run acceleration
    assert!(speed >= 6.0 && speed < 6.5, "speed {}", speed);
}

#[test]
fn test_run_accelerates_on_flat_ground() {
    let mut host = Host::standard();
    host.place_on_ground(Vec3::Y, Vec3::ZERO);

    host.controller.feed_input(InputFrame::default().with_run(1.0));
    host.tick_on(Vec3::Y);

    assert_relative_eq!(host.velocity.x, 15.0 * DT, epsilon = 1e-4);
    assert_eq!(host.controller.state().facing, Facing::Right);
}

#[test]
fn test_run_follows_custom_start_plane() {
    let plane = Plane::new(Vec3::X, 0.0).unwrap();
    let mut host = Host::new(MotionConfig::default().with_plane(plane));
    assert_eq!(host.controller.plane(), plane);
    host.place_on_ground(Vec3::Y, Vec3::ZERO);

    let boost = ParameterOverride::Multiplicative(
        ParameterSet::multiplicative_identity()
            .with_float(RunSchema::RUN_ACCEL, 2.0)
            .unwrap(),
    );
    host.controller.attributes_mut().run.apply_override(&boost);
    host.controller.feed_input(InputFrame::default().with_run(1.0));
    host.tick_on(Vec3::Y);

    // moving right on the X plane means travelling along -Z
    assert_relative_eq!(host.velocity.z, -30.0 * DT, epsilon = 1e-4);
    assert_relative_eq!(host.velocity.x, 0.0, epsilon = 1e-5);
}

#[test]
fn test_jump_queues_unground_for_next_tick() {
    let mut host = Host::standard();
    host.place_on_ground(Vec3::Y, Vec3::ZERO);
    host.controller.feed_input(InputFrame::default().with_jump());

    host.begin();
    assert!(host.controller.state().is_jumping);
    assert_relative_eq!(host.velocity.y, 14.0, epsilon = 1e-5);
    assert_relative_eq!(host.velocity.x, 0.0);
    assert!(host.controller.pending_force_unground());
    assert!(!host.motor.must_unground());

    host.finish(GroundingReport::stable(Vec3::Y, Vec3::ZERO));
    assert!(!host.controller.state().grounded);
    assert!(matches!(
        host.controller.last_events(),
        [MotionEvent::Jumped { air_jump: false, .. }, MotionEvent::LeftGround { .. }]
    ));

    host.controller.before_update(&mut host.motor, DT);
    assert!(host.motor.must_unground());
    assert!(!host.controller.pending_force_unground());
}

#[test]
fn test_small_jump_survives_ground_stick() {
    let mut host = Host::standard();
    host.place_on_ground(Vec3::Y, Vec3::ZERO);
    host.controller.attributes_mut().jump.apply_override(&ParameterOverride::Set(
        PartialParameterSet::new()
            .with_float(JumpSchema::JUMP_SPEED, 0.2)
            .unwrap(),
    ));
    host.controller.feed_input(InputFrame::default().with_jump());

    host.begin();
    assert!(host.controller.state().is_jumping);
    assert_relative_eq!(host.velocity.y, 0.2, epsilon = 1e-6);
    assert!(host.controller.pending_force_unground());
}

#[test]
fn test_jump_does_not_start_coyote_buffer() {
    let mut host = Host::standard();
    host.place_on_ground(Vec3::Y, Vec3::ZERO);
    host.controller.feed_input(InputFrame::default().with_jump());
    host.tick_on(Vec3::Y);

    assert!(host.controller.state().ungrounded_jump_normal.is_none());

    // No air jumps configured
    host.controller.feed_input(InputFrame::default().with_jump());
    let before = host.velocity;
    host.tick_airborne();
    assert!(host.velocity.y < before.y);
}

#[test]
fn test_late_jump_after_walking_off_ledge() {
    let mut host = Host::standard();
    host.place_on_ground(Vec3::Y, Vec3::new(5.0, 0.0, 0.0));
    host.tick_airborne();
    assert_eq!(host.controller.state().ungrounded_jump_normal, Some(Vec3::Y));

    host.controller.feed_input(InputFrame::default().with_jump());
    host.tick_airborne();
    assert!(host.velocity.y > 10.0);
    assert!(host.controller.state().is_jumping);
}

#[test]
fn test_air_jump_budget_resets_on_landing() {
    let mut host = Host::new(MotionConfig::default().with_air_jumps(1));
    host.tick_airborne();

    host.controller.feed_input(InputFrame::default().with_jump());
    host.tick_airborne();
    assert_eq!(host.controller.state().air_jumps_used, 1);

    // The jump's unground request skips the first ground probe
    host.tick_on(Vec3::Y);
    assert!(!host.controller.state().grounded);
    host.tick_on(Vec3::Y);
    assert_eq!(host.controller.state().air_jumps_used, 0);
}

#[test]
fn test_negations_cleared_every_tick() {
    let mut host = Host::standard();
    host.place_on_ground(Vec3::Y, Vec3::ZERO);

    host.controller.feed_input(InputFrame::default().with_run(1.0));
    host.begin();
    assert!(host.controller.negations().friction);

    host.finish(GroundingReport::stable(Vec3::Y, Vec3::ZERO));
    assert!(!host.controller.negations().any());
}

#[test]
fn test_slope_history_bounded_and_spin_on_leaving() {
    let mut host = Host::standard();
    host.place_on_ground(Vec3::Y, Vec3::new(10.0, 0.0, 0.0));

    for step in 1..=8 {
        host.tick_on(tilted(4.0 * step as f32));
        assert!(host.controller.slope_history().len() <= SLOPE_HISTORY_CAPACITY);
    }
    assert_eq!(host.controller.slope_history().len(), SLOPE_HISTORY_CAPACITY);

    host.tick_airborne();
    let spin = host.controller.state().angular_velocity;
    assert!(spin > 1.0, "spin {}", spin);
    assert!(host.controller.slope_history().is_empty());
    assert!(host
        .controller
        .last_events()
        .iter()
        .any(|e| matches!(e, MotionEvent::LeftGround { angular_velocity } if *angular_velocity == spin)));
}

#[test]
fn test_leaving_flat_ground_has_no_spin() {
    let mut host = Host::standard();
    host.place_on_ground(Vec3::Y, Vec3::new(10.0, 0.0, 0.0));
    host.tick_on(Vec3::Y);
    host.tick_airborne();

    assert_eq!(host.controller.state().angular_velocity, 0.0);
}

#[test]
fn test_forced_detach_when_slow_on_wall() {
    let mut host = Host::standard();
    let wall = tilted(80.0);
    host.place_on_ground(wall, Vec3::ZERO);

    host.tick_on(wall);

    assert!(!host.controller.state().grounded);
    assert!(host.controller.pending_force_unground());
    assert!(host
        .controller
        .last_events()
        .iter()
        .any(|e| matches!(e, MotionEvent::ForcedDetach { .. })));
}

#[test]
fn test_effector_round_trip_through_triggers() {
    let mut host = Host::standard();
    let mut triggers = TriggerSystem::new();
    let id = triggers.register(TriggerTag::Effector, TriggerVolume::cube(2.0), Vec3::new(5.0, 0.0, 0.0));

    let boost = ParameterSet::<RunSchema>::additive_identity()
        .with_float(RunSchema::RUN_ACCEL, 5.0)
        .unwrap();
    host.controller
        .register_effector(id, vec![AttributeOverride::Run(ParameterOverride::Additive(boost))])
        .unwrap();

    let forward = |host: &mut Host, triggers: &mut TriggerSystem, x: f32| {
        for event in triggers.update(DT, Vec3::new(x, 0.0, 0.0)) {
            if event.is_enter() {
                host.controller.on_trigger_enter(event.tag, event.volume);
            } else {
                host.controller.on_trigger_exit(event.tag, event.volume);
            }
        }
    };

    forward(&mut host, &mut triggers, 5.0);
    assert_relative_eq!(host.controller.attributes().run.float(RunSchema::RUN_ACCEL), 20.0);

    forward(&mut host, &mut triggers, 10.0);
    assert_relative_eq!(host.controller.attributes().run.float(RunSchema::RUN_ACCEL), 15.0);
    assert_eq!(host.controller.attributes().active_override_count(), 0);
}

#[test]
fn test_listener_receives_events_in_tick_order() {
    let mut host = Host::standard();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    host.controller.subscribe(move |event: &MotionEvent| sink.lock().push(*event));

    host.tick_on(Vec3::Y);
    host.controller.feed_input(InputFrame::default().with_jump());
    host.tick_on(Vec3::Y);

    let seen = seen.lock();
    assert!(matches!(seen[0], MotionEvent::Landed { .. }));
    assert!(matches!(seen[1], MotionEvent::Jumped { .. }));
    assert!(matches!(seen[2], MotionEvent::LeftGround { .. }));
}

#[test]
fn test_dash_ignores_gravity() {
    let mut host = Host::new(MotionConfig::default().with_ability(AbilityKind::Dasher));
    host.controller
        .feed_input(InputFrame::default().with_extra(ExtraAction::Primary, true, false));

    host.tick_airborne();
    assert!(host.controller.ability().is_dashing());
    assert!(host.velocity.abs_diff_eq(Vec3::new(20.0, 0.0, 0.0), 1e-4));

    for _ in 0..12 {
        host.tick_airborne();
    }
    assert!(!host.controller.ability().is_dashing());
    assert!(host.velocity.y < 0.0);
}

#[test]
fn test_glide_caps_fall_speed() {
    let mut host = Host::new(MotionConfig::default().with_ability(AbilityKind::Glider));
    for _ in 0..60 {
        host.tick_airborne();
    }
    let free_fall = host.velocity.y;
    assert!(free_fall < -20.0);

    host.controller
        .feed_input(InputFrame::default().with_extra(ExtraAction::Primary, true, true));
    for _ in 0..120 {
        host.tick_airborne();
    }
    assert!(host.controller.ability().is_gliding());
    assert!(host.velocity.y > -6.0, "fall speed {}", host.velocity.y);
}
