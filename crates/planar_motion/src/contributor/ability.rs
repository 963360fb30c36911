//! Per-character abilities and movement effectors
//!
//! The set of playable characters is closed, so each one is a variant of
//! [`Ability`] rather than a trait object. The ability layer is also where
//! effector volumes push and pop their attribute overrides.

use super::{MotionContext, MotionContributor};
use crate::attributes::{AppliedAttributeOverride, AttributeOverride, PhysicsSchema as P};
use crate::config::{AbilityConfig, AbilityKind};
use crate::input::ExtraAction;
use crate::timers::{TimerAction, TimerKey};
use planar_math::Vec3;
use planar_params::prelude::*;
use planar_triggers::VolumeId;
use std::collections::BTreeMap;

/// Overrides held while gliding
#[derive(Debug, Clone)]
pub struct GlideOverrides {
    gravity: AppliedAttributeOverride,
    terminal_speed: AppliedAttributeOverride,
}

/// Character-specific movement
#[derive(Debug, Clone)]
pub enum Ability {
    /// No extra movement
    Standard,
    /// Holding the primary action while falling slows the fall
    Glider { active: Option<GlideOverrides> },
    /// The primary action starts a timed dash along the facing direction
    Dasher { direction: Option<Vec3>, ready: bool },
}

impl Ability {
    pub fn from_kind(kind: AbilityKind) -> Self {
        match kind {
            AbilityKind::Standard => Ability::Standard,
            AbilityKind::Glider => Ability::Glider { active: None },
            AbilityKind::Dasher => Ability::Dasher {
                direction: None,
                ready: true,
            },
        }
    }

    pub fn kind(&self) -> AbilityKind {
        match self {
            Ability::Standard => AbilityKind::Standard,
            Ability::Glider { .. } => AbilityKind::Glider,
            Ability::Dasher { .. } => AbilityKind::Dasher,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AbilityContributor {
    ability: Ability,
    config: AbilityConfig,
    effectors: BTreeMap<VolumeId, Vec<AppliedAttributeOverride>>,
}

impl AbilityContributor {
    pub fn new(config: &AbilityConfig) -> Self {
        Self {
            ability: Ability::from_kind(config.kind),
            config: config.clone(),
            effectors: BTreeMap::new(),
        }
    }

    pub fn ability(&self) -> &Ability {
        &self.ability
    }

    pub fn is_gliding(&self) -> bool {
        matches!(self.ability, Ability::Glider { active: Some(_) })
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.ability, Ability::Dasher { direction: Some(_), .. })
    }

    /// Whether Action is skipped this tick
    pub fn suppresses_action(&self) -> bool {
        self.is_dashing()
    }

    /// Whether Physics is skipped this tick
    pub fn suppresses_physics(&self) -> bool {
        self.is_dashing()
    }

    /// Effector volumes whose overrides are currently applied
    pub fn active_effectors(&self) -> impl Iterator<Item = VolumeId> + '_ {
        self.effectors.keys().copied()
    }

    /// Push the overrides of an effector the character just entered
    pub fn on_effector_enter(
        &mut self,
        ctx: &mut MotionContext,
        id: VolumeId,
        overrides: &[AttributeOverride],
    ) {
        if self.effectors.contains_key(&id) {
            log::warn!("effector {:?} entered twice, ignoring", id);
            return;
        }
        let applied = overrides.iter().map(|o| ctx.attributes.apply(o)).collect();
        log::debug!("effector {:?} applied {} overrides", id, overrides.len());
        self.effectors.insert(id, applied);
    }

    /// Pop the overrides of an effector the character just left
    pub fn on_effector_exit(&mut self, ctx: &mut MotionContext, id: VolumeId) {
        match self.effectors.remove(&id) {
            Some(applied) => {
                for receipt in &applied {
                    ctx.attributes.remove(receipt);
                }
                log::debug!("effector {:?} removed {} overrides", id, applied.len());
            }
            None => log::warn!("exit from effector {:?} that was never entered", id),
        }
    }

    pub fn on_landed(&mut self, ctx: &mut MotionContext) {
        self.stop_glide(ctx);
        if let Ability::Dasher { ready, .. } = &mut self.ability {
            *ready = true;
        }
    }

    pub fn on_timer(&mut self, _ctx: &mut MotionContext, action: TimerAction) {
        if let (TimerAction::EndDash, Ability::Dasher { direction, .. }) = (action, &mut self.ability) {
            *direction = None;
            log::debug!("dash finished");
        }
    }

    fn start_glide(&mut self, ctx: &mut MotionContext) {
        let Ability::Glider { active } = &mut self.ability else {
            return;
        };
        if active.is_some() {
            return;
        }
        let gravity = ParameterSet::<P>::multiplicative_identity()
            .with_vector(P::GRAVITY, Vec3::splat(self.config.glide_gravity_scale));
        let terminal =
            PartialParameterSet::<P>::new().with_float(P::TERMINAL_SPEED, self.config.glide_terminal_speed);
        let (gravity, terminal) = match (gravity, terminal) {
            (Ok(gravity), Ok(terminal)) => (gravity, terminal),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("glide overrides rejected: {}", e);
                return;
            }
        };

        *active = Some(GlideOverrides {
            gravity: ctx
                .attributes
                .apply(&AttributeOverride::Physics(ParameterOverride::Multiplicative(gravity))),
            terminal_speed: ctx
                .attributes
                .apply(&AttributeOverride::Physics(ParameterOverride::Set(terminal))),
        });
        log::debug!("glide started");
    }

    fn stop_glide(&mut self, ctx: &mut MotionContext) {
        if let Ability::Glider { active } = &mut self.ability {
            if let Some(glide) = active.take() {
                ctx.attributes.remove(&glide.gravity);
                ctx.attributes.remove(&glide.terminal_speed);
                log::debug!("glide stopped");
            }
        }
    }
}

impl MotionContributor for AbilityContributor {
    fn before_update(&mut self, ctx: &mut MotionContext) {
        let input = *ctx.input.frame();
        let gliding = self.is_gliding();
        match &mut self.ability {
            Ability::Standard => {}
            Ability::Glider { .. } => {
                let falling = !ctx.state.grounded && ctx.state.velocity.dot(ctx.world_up()) < 0.0;
                let held = input.extra_held(ExtraAction::Primary);
                if falling && held && !gliding {
                    self.start_glide(ctx);
                } else if (!held || ctx.state.grounded) && gliding {
                    self.stop_glide(ctx);
                }
            }
            Ability::Dasher { direction, ready } => {
                if direction.is_none() && *ready && input.extra_pressed(ExtraAction::Primary) {
                    let axis = if ctx.state.grounded {
                        ctx.ground_tangent()
                    } else {
                        ctx.air_axis()
                    };
                    *direction = Some(axis * ctx.state.facing.sign());
                    *ready = ctx.state.grounded;
                    ctx.timers
                        .start(TimerKey::Dash, self.config.dash_duration, TimerAction::EndDash);
                    log::debug!("dash started");
                }
            }
        }
    }

    fn update_velocity(&mut self, ctx: &mut MotionContext, velocity: &mut Vec3) {
        if let Ability::Dasher {
            direction: Some(direction),
            ..
        } = &self.ability
        {
            *velocity = *direction * self.config.dash_speed;
            ctx.negations.friction = true;
            ctx.negations.drag = true;
            ctx.negations.gravity = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::RunSchema;
    use crate::config::MotionConfig;
    use crate::input::InputFrame;
    use approx::assert_relative_eq;

    fn setup(kind: AbilityKind) -> (MotionContext, AbilityContributor) {
        let config = MotionConfig::default().with_ability(kind);
        let ctx = MotionContext::new(&config).unwrap();
        let ability = AbilityContributor::new(&config.abilities);
        (ctx, ability)
    }

    #[test]
    fn test_standard_is_inert() {
        let (mut ctx, mut ability) = setup(AbilityKind::Standard);
        ctx.input.feed(InputFrame::default().with_extra(ExtraAction::Primary, true, true));
        let mut v = Vec3::new(1.0, 2.0, 0.0);

        ability.before_update(&mut ctx);
        ability.update_velocity(&mut ctx, &mut v);

        assert_eq!(v, Vec3::new(1.0, 2.0, 0.0));
        assert!(!ability.suppresses_action());
        assert!(!ctx.negations.any());
    }

    #[test]
    fn test_glide_pushes_and_pops_overrides() {
        let (mut ctx, mut ability) = setup(AbilityKind::Glider);
        ctx.state.velocity = Vec3::new(0.0, -3.0, 0.0);
        ctx.input.feed(InputFrame::default().with_extra(ExtraAction::Primary, true, true));

        ability.before_update(&mut ctx);
        assert!(ability.is_gliding());
        assert_relative_eq!(ctx.attributes.physics.vector(P::GRAVITY).y, -9.0, epsilon = 1e-5);
        assert_relative_eq!(ctx.attributes.physics.float(P::TERMINAL_SPEED), 5.0);

        ctx.input.feed(InputFrame::default());
        ability.before_update(&mut ctx);
        assert!(!ability.is_gliding());
        assert_relative_eq!(ctx.attributes.physics.vector(P::GRAVITY).y, -30.0);
        assert_eq!(ctx.attributes.active_override_count(), 0);
    }

    #[test]
    fn test_glide_ends_on_landing() {
        let (mut ctx, mut ability) = setup(AbilityKind::Glider);
        ctx.state.velocity = Vec3::new(0.0, -3.0, 0.0);
        ctx.input.feed(InputFrame::default().with_extra(ExtraAction::Primary, true, true));
        ability.before_update(&mut ctx);

        ability.on_landed(&mut ctx);
        assert!(!ability.is_gliding());
        assert_eq!(ctx.attributes.active_override_count(), 0);
    }

    #[test]
    fn test_dash_suppresses_and_expires() {
        let (mut ctx, mut ability) = setup(AbilityKind::Dasher);
        ctx.input.feed(InputFrame::default().with_extra(ExtraAction::Primary, true, false));

        ability.before_update(&mut ctx);
        assert!(ability.is_dashing());
        assert!(ability.suppresses_action());
        assert!(ability.suppresses_physics());
        assert!(ctx.timers.is_active(TimerKey::Dash));

        let mut v = Vec3::ZERO;
        ability.update_velocity(&mut ctx, &mut v);
        assert!(v.abs_diff_eq(Vec3::new(20.0, 0.0, 0.0), 1e-5));
        assert!(ctx.negations.gravity);

        for (_, action) in ctx.timers.tick(1.0) {
            ability.on_timer(&mut ctx, action);
        }
        assert!(!ability.is_dashing());

        // Airborne dash used up until landing
        ctx.input.end_tick();
        ctx.input.feed(InputFrame::default().with_extra(ExtraAction::Primary, true, false));
        ability.before_update(&mut ctx);
        assert!(!ability.is_dashing());

        ability.on_landed(&mut ctx);
        ability.before_update(&mut ctx);
        assert!(ability.is_dashing());
    }

    #[test]
    fn test_effector_enter_exit() {
        let (mut ctx, mut ability) = setup(AbilityKind::Standard);
        let id = VolumeId(7);
        let boost = AttributeOverride::Run(ParameterOverride::Multiplicative(
            ParameterSet::multiplicative_identity()
                .with_float(RunSchema::MAX_RUN_SPEED, 2.0)
                .unwrap(),
        ));

        ability.on_effector_enter(&mut ctx, id, &[boost.clone()]);
        ability.on_effector_enter(&mut ctx, id, &[boost]);
        assert_relative_eq!(ctx.attributes.run.float(RunSchema::MAX_RUN_SPEED), 24.0);
        assert_eq!(ability.active_effectors().collect::<Vec<_>>(), vec![id]);

        ability.on_effector_exit(&mut ctx, id);
        ability.on_effector_exit(&mut ctx, id);
        assert_relative_eq!(ctx.attributes.run.float(RunSchema::MAX_RUN_SPEED), 12.0);
    }
}
