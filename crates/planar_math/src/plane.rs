//! Planes

use crate::vector::Vec3;

/// Plane in 3D space (`normal · p + distance = 0`)
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    /// Plane normal (unit vector)
    pub normal: Vec3,
    /// Signed offset along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a plane from a normal and distance
    ///
    /// The normal is normalized; a zero normal yields `None`.
    #[inline]
    pub fn new(normal: Vec3, distance: f32) -> Option<Self> {
        let len = normal.length();
        if len > 1e-10 && len.is_finite() && distance.is_finite() {
            Some(Self {
                normal: normal / len,
                distance: distance / len,
            })
        } else {
            None
        }
    }

    /// Create a plane from a point on the plane and its normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        Some(Self {
            normal,
            distance: -normal.dot(point),
        })
    }

    /// Signed distance from a point to the plane (positive on the normal side)
    #[inline]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Closest point on the plane to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.distance_to_point(point)
    }

    /// Same plane with the normal facing the other way
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }

    /// Orient this plane so its normal points into the same half-space as `reference`
    pub fn aligned_with(&self, reference: Vec3) -> Self {
        if self.normal.dot(reference) < 0.0 {
            self.flipped()
        } else {
            *self
        }
    }

    /// Whether both planes coincide within `epsilon`
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.normal.abs_diff_eq(other.normal, epsilon) && (self.distance - other.distance).abs() <= epsilon
    }
}

impl Default for Plane {
    /// The XY plane: motion along X and Y, depth along Z
    fn default() -> Self {
        Self {
            normal: Vec3::Z,
            distance: 0.0,
        }
    }
}
