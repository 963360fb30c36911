//! The demo course: a height-field profile, its volumes and an input script

use planar_math::radians;
use planar_motion::prelude::*;
use planar_params::{ParameterOverride, ParameterSet};
use planar_triggers::{TriggerTag, TriggerVolume};

/// Piecewise-linear ground profile along X, independent of depth
#[derive(Debug, Clone)]
pub struct Terrain {
    points: Vec<(f32, f32)>,
    /// Vertical wall at this X
    pub wall_x: f32,
}

impl Terrain {
    pub fn new(points: Vec<(f32, f32)>, wall_x: f32) -> Self {
        Self { points, wall_x }
    }

    fn segment(&self, x: f32) -> Option<((f32, f32), (f32, f32))> {
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .find(|(a, b)| x >= a.0 && x <= b.0)
            .or_else(|| {
                let first = self.points.first().copied()?;
                let last = self.points.last().copied()?;
                let (a, b) = if x < first.0 {
                    (first, (first.0 + 1.0, first.1))
                } else {
                    (last, (last.0 + 1.0, last.1))
                };
                Some((a, b))
            })
    }

    pub fn height(&self, x: f32) -> f32 {
        match self.segment(x) {
            Some((a, b)) if b.0 > a.0 => a.1 + (b.1 - a.1) * (x - a.0) / (b.0 - a.0),
            Some((a, _)) => a.1,
            None => 0.0,
        }
    }

    pub fn normal(&self, x: f32) -> Vec3 {
        match self.segment(x) {
            Some((a, b)) => Vec3::new(-(b.1 - a.1), b.0 - a.0, 0.0).normalize_or_zero(),
            None => Vec3::Y,
        }
    }
}

/// A trigger volume placed on the course
#[derive(Debug, Clone)]
pub struct CourseVolume {
    pub name: &'static str,
    pub tag: TriggerTag,
    pub shape: TriggerVolume,
    pub position: Vec3,
    /// Plane path for dynamic planes and breakers
    pub path: Vec<Vec3>,
    /// Overrides for effectors
    pub overrides: Vec<AttributeOverride>,
}

pub struct Course {
    pub terrain: Terrain,
    pub volumes: Vec<CourseVolume>,
}

impl Course {
    /// Flat run-up, a 20 degree ramp, a plateau with a breaker, a drop and a wall
    pub fn demo() -> Result<Self> {
        let ramp_top = 20.0 * radians(20.0).tan();
        let terrain = Terrain::new(
            vec![
                (-50.0, 0.0),
                (20.0, 0.0),
                (40.0, ramp_top),
                (60.0, ramp_top),
                (70.0, 1.0),
                (120.0, 1.0),
            ],
            110.0,
        );

        let boost = ParameterSet::<RunSchema>::multiplicative_identity()
            .with_float(RunSchema::MAX_RUN_SPEED, 1.5)?
            .with_float(RunSchema::RUN_ACCEL, 2.0)?;
        let plateau = ramp_top + 1.0;

        let volumes = vec![
            CourseVolume {
                name: "speed strip",
                tag: TriggerTag::Effector,
                shape: TriggerVolume::box_shape(10.0, 4.0, 4.0),
                position: Vec3::new(10.0, 1.0, 0.0),
                path: Vec::new(),
                overrides: vec![AttributeOverride::Run(ParameterOverride::Multiplicative(boost))],
            },
            CourseVolume {
                name: "plateau fork",
                tag: TriggerTag::PlaneBreaker,
                shape: TriggerVolume::box_shape(12.0, 4.0, 30.0),
                position: Vec3::new(50.0, plateau, 0.0),
                path: vec![Vec3::new(44.0, plateau, 0.0), Vec3::new(56.0, plateau, -6.0)],
                overrides: Vec::new(),
            },
        ];

        Ok(Self { terrain, volumes })
    }
}

/// Input for tick number `tick`
pub fn scripted_input(tick: u64, dt: f32) -> InputFrame {
    let at = |mark: f32| tick == (mark / dt).round() as u64;
    let mut input = InputFrame::default();

    if tick as f32 * dt >= 0.5 {
        input = input.with_run(1.0);
    }
    if at(0.5) {
        input = input.with_double_tap();
    }
    if at(1.5) || at(6.0) {
        input = input.with_jump();
    }
    if at(1.7) {
        input = input.with_jump_cancel();
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_terrain_profile() {
        let course = Course::demo().unwrap();
        let terrain = &course.terrain;

        assert_relative_eq!(terrain.height(0.0), 0.0);
        assert_relative_eq!(terrain.height(30.0), 10.0 * radians(20.0).tan(), epsilon = 1e-4);
        assert_relative_eq!(terrain.height(200.0), 1.0);
        assert!(terrain.normal(0.0).abs_diff_eq(Vec3::Y, 1e-6));

        let ramp = terrain.normal(30.0);
        assert_relative_eq!(ramp.angle_between(Vec3::Y).to_degrees(), 20.0, epsilon = 1e-3);
        assert!(ramp.x < 0.0);
    }

    #[test]
    fn test_script_edges_fire_once() {
        let dt = 1.0 / 60.0;
        let jumps = (0..600)
            .map(|tick| scripted_input(tick, dt))
            .filter(|input| input.jump)
            .count();
        assert_eq!(jumps, 2);
    }
}
