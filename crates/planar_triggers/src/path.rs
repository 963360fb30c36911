//! Polyline paths describing a sequence of movement planes

use planar_math::{Plane, Vec3};
use serde::{Deserialize, Serialize};

const JOINT_EPSILON: f32 = 1e-4;

/// A horizontal polyline; each segment defines the vertical plane through it
///
/// The plane normal of a segment running along `dir` is `dir × up`, so a
/// path running along +X yields the default +Z plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanePath {
    points: Vec<Vec3>,
    up: Vec3,
}

impl PlanePath {
    /// Create a path; needs at least two distinct points and a usable up axis
    pub fn new(points: Vec<Vec3>, up: Vec3) -> Option<Self> {
        let up = up.try_normalize()?;
        let path = Self { points, up };
        if path.points.len() < 2 || (0..path.segment_count()).any(|i| path.segment_normal(i).is_none()) {
            return None;
        }
        Some(path)
    }

    /// Straight single-segment path
    pub fn line(start: Vec3, end: Vec3, up: Vec3) -> Option<Self> {
        Self::new(vec![start, end], up)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Plane through segment `index`
    pub fn segment_plane(&self, index: usize) -> Option<Plane> {
        let normal = self.segment_normal(index)?;
        Plane::from_point_normal(self.points[index], normal)
    }

    /// The plane closest to `position`, given the direction of travel
    ///
    /// When the closest point is a joint between two segments, the segment
    /// the character is heading into wins.
    pub fn closest_plane(&self, position: Vec3, travel: Vec3) -> Option<Plane> {
        let flat = position.project_on_plane(self.up);
        let mut best: Option<(usize, f32, f32)> = None;

        for index in 0..self.segment_count() {
            let (t, dist_sq) = self.project_onto_segment(index, flat);
            if best.map_or(true, |(_, _, d)| dist_sq < d - JOINT_EPSILON) {
                best = Some((index, t, dist_sq));
            }
        }

        let (mut index, t, _) = best?;
        let travel = travel.project_on_plane(self.up);
        if t >= 1.0 - JOINT_EPSILON && index + 1 < self.segment_count() {
            if travel.dot(self.segment_direction(index + 1)) > 0.0 {
                index += 1;
            }
        } else if t <= JOINT_EPSILON && index > 0 {
            if travel.dot(self.segment_direction(index - 1)) < 0.0 {
                index -= 1;
            }
        }

        self.segment_plane(index)
    }

    fn segment_direction(&self, index: usize) -> Vec3 {
        (self.points[index + 1] - self.points[index])
            .project_on_plane(self.up)
            .normalize_or_zero()
    }

    fn segment_normal(&self, index: usize) -> Option<Vec3> {
        self.segment_direction(index).cross(self.up).try_normalize()
    }

    /// Clamped segment parameter and squared distance, both in the horizontal plane
    fn project_onto_segment(&self, index: usize, flat: Vec3) -> (f32, f32) {
        let a = self.points[index].project_on_plane(self.up);
        let b = self.points[index + 1].project_on_plane(self.up);
        let ab = b - a;
        let len_sq = ab.length_squared();
        let t = if len_sq > 0.0 {
            ((flat - a).dot(ab) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let closest = a + ab * t;
        (t, (flat - closest).length_squared())
    }
}
