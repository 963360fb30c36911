//! Quaternion for 3D rotations

use crate::vector::Vec3;
use core::ops::{Mul, MulAssign};

/// Quaternion representing a 3D rotation
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from axis and angle (radians)
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let half = angle * 0.5;
        let (sin, cos) = half.sin_cos();
        let axis = axis.normalize();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    /// Create quaternion that rotates from one direction to another
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let from = from.normalize();
        let to = to.normalize();

        let dot = from.dot(to);

        if dot > 0.99999 {
            return Self::IDENTITY;
        }

        if dot < -0.99999 {
            // Opposite directions: any perpendicular axis works
            let axis = Vec3::X.cross(from);
            let axis = if axis.length_squared() < 1e-6 {
                Vec3::Y.cross(from)
            } else {
                axis
            };
            return Self::from_axis_angle(axis.normalize(), core::f32::consts::PI);
        }

        let axis = from.cross(to);
        let s = ((1.0 + dot) * 2.0).sqrt();
        let inv_s = 1.0 / s;

        Self::new(axis.x * inv_s, axis.y * inv_s, axis.z * inv_s, s * 0.5).normalize()
    }

    /// Create from orthonormal basis columns (local X, Y, Z in world space)
    pub fn from_basis(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        let trace = x_axis.x + y_axis.y + z_axis.z;

        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new(
                (y_axis.z - z_axis.y) / s,
                (z_axis.x - x_axis.z) / s,
                (x_axis.y - y_axis.x) / s,
                0.25 * s,
            )
        } else if x_axis.x > y_axis.y && x_axis.x > z_axis.z {
            let s = (1.0 + x_axis.x - y_axis.y - z_axis.z).sqrt() * 2.0;
            Self::new(
                0.25 * s,
                (x_axis.y + y_axis.x) / s,
                (z_axis.x + x_axis.z) / s,
                (y_axis.z - z_axis.y) / s,
            )
        } else if y_axis.y > z_axis.z {
            let s = (1.0 + y_axis.y - x_axis.x - z_axis.z).sqrt() * 2.0;
            Self::new(
                (x_axis.y + y_axis.x) / s,
                0.25 * s,
                (y_axis.z + z_axis.y) / s,
                (z_axis.x - x_axis.z) / s,
            )
        } else {
            let s = (1.0 + z_axis.z - x_axis.x - y_axis.y).sqrt() * 2.0;
            Self::new(
                (z_axis.x + x_axis.z) / s,
                (y_axis.z + z_axis.y) / s,
                0.25 * s,
                (x_axis.y - y_axis.x) / s,
            )
        };
        q.normalize()
    }

    /// Rotation whose local +Z faces `forward` and local +Y leans towards `up`
    ///
    /// Falls back to identity when `forward` and `up` are parallel.
    pub fn look_rotation(forward: Vec3, up: Vec3) -> Self {
        let z_axis = forward.normalize();
        let x_axis = up.cross(z_axis);
        if x_axis.length_squared() < 1e-10 {
            return Self::IDENTITY;
        }
        let x_axis = x_axis.normalize();
        let y_axis = z_axis.cross(x_axis);
        Self::from_basis(x_axis, y_axis, z_axis)
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len, self.z / len, self.w / len)
        } else {
            Self::IDENTITY
        }
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Rotate a vector
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// Local +Y in world space
    #[inline]
    pub fn up(self) -> Vec3 {
        self.rotate(Vec3::Y)
    }

    /// Local +Z in world space
    #[inline]
    pub fn forward(self) -> Vec3 {
        self.rotate(Vec3::Z)
    }

    /// Angle of the rotation in radians, in `[0, PI]`
    pub fn angle(self) -> f32 {
        2.0 * self.w.abs().clamp(0.0, 1.0).acos()
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl MulAssign for Quat {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec3> for Quat {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_arc_maps_from_to_to() {
        let from = Vec3::Z;
        let to = Vec3::new(1.0, 0.0, 1.0).normalize();
        let q = Quat::from_rotation_arc(from, to);
        assert!((q * from - to).length() < 1e-5);
    }

    #[test]
    fn test_rotation_arc_opposite() {
        let q = Quat::from_rotation_arc(Vec3::Z, Vec3::NEG_Z);
        assert!((q * Vec3::Z - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_look_rotation_axes() {
        let q = Quat::look_rotation(Vec3::X, Vec3::Y);
        assert!((q.forward() - Vec3::X).length() < 1e-5);
        assert!((q.up() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_look_rotation_tilted_up() {
        let up = Vec3::new(-1.0, 1.0, 0.0).normalize();
        let forward = Vec3::new(1.0, 1.0, 0.0).normalize();
        let q = Quat::look_rotation(forward, up);
        assert!((q.forward() - forward).length() < 1e-5);
        assert!((q.up() - up).length() < 1e-5);
    }
}
