//! Volume shapes, expressed in the volume's local frame

use planar_math::Vec3;
use serde::{Deserialize, Serialize};

/// Shape of a trigger volume, centered on its placement position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TriggerVolume {
    /// Axis-aligned box given by its half-extents
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Segment along local Y, swept by `radius`
    Capsule { radius: f32, half_height: f32 },
}

impl TriggerVolume {
    /// Box with full `size` along each axis
    pub fn box_shape(width: f32, height: f32, depth: f32) -> Self {
        Self::Box { half_extents: Vec3::new(width, height, depth) * 0.5 }
    }

    pub fn cube(size: f32) -> Self {
        Self::Box { half_extents: Vec3::splat(size * 0.5) }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Capsule whose straight section is `height` long
    pub fn capsule(radius: f32, height: f32) -> Self {
        Self::Capsule { radius, half_height: height * 0.5 }
    }

    /// Whether `local` (relative to the volume center) lies inside
    pub fn contains_point(&self, local: Vec3) -> bool {
        match *self {
            Self::Box { half_extents } => {
                let d = local.abs();
                d.x <= half_extents.x && d.y <= half_extents.y && d.z <= half_extents.z
            }
            Self::Sphere { radius } => local.length_squared() <= radius * radius,
            Self::Capsule { radius, half_height } => {
                let spine = Vec3::new(0.0, local.y.clamp(-half_height, half_height), 0.0);
                (local - spine).length_squared() <= radius * radius
            }
        }
    }

    /// World-space containment for a volume placed at `origin`
    #[inline]
    pub fn contains_point_at(&self, point: Vec3, origin: Vec3) -> bool {
        self.contains_point(point - origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_edges_are_inclusive() {
        let volume = TriggerVolume::box_shape(2.0, 4.0, 2.0);
        assert!(volume.contains_point(Vec3::new(1.0, 2.0, -1.0)));
        assert!(!volume.contains_point(Vec3::new(1.01, 0.0, 0.0)));
        assert!(!volume.contains_point(Vec3::new(0.0, 2.5, 0.0)));
    }

    #[test]
    fn test_sphere_contains() {
        let volume = TriggerVolume::sphere(1.0);
        assert!(volume.contains_point(Vec3::splat(0.5)));
        assert!(!volume.contains_point(Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_capsule_caps_are_round() {
        let volume = TriggerVolume::capsule(0.5, 2.0);
        assert!(volume.contains_point(Vec3::new(0.0, 1.4, 0.0)));
        assert!(volume.contains_point(Vec3::new(0.45, 0.0, 0.0)));
        // corner of the bounding box lies outside the cap
        assert!(!volume.contains_point(Vec3::new(0.45, 1.45, 0.0)));
    }

    #[test]
    fn test_placed_volume() {
        let volume = TriggerVolume::cube(2.0);
        let origin = Vec3::new(10.0, 0.0, 0.0);
        assert!(volume.contains_point_at(Vec3::new(10.5, 0.5, 0.0), origin));
        assert!(!volume.contains_point_at(Vec3::ZERO, origin));
    }
}
