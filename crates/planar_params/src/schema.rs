//! Field schemas and values

use planar_math::Vec3;
use serde::{Deserialize, Serialize};

/// Kind of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Float,
    Int,
    Vector,
}

/// One named field of a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn float(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Float }
    }

    pub const fn int(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Int }
    }

    pub const fn vector(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Vector }
    }
}

/// A single parameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Vector(Vec3),
}

impl ParamValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Float(_) => FieldKind::Float,
            Self::Int(_) => FieldKind::Int,
            Self::Vector(_) => FieldKind::Vector,
        }
    }

    /// Additive identity for a field kind
    pub fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Float => Self::Float(0.0),
            FieldKind::Int => Self::Int(0),
            FieldKind::Vector => Self::Vector(Vec3::ZERO),
        }
    }

    /// Multiplicative identity for a field kind
    pub fn one(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Float => Self::Float(1.0),
            FieldKind::Int => Self::Int(1),
            FieldKind::Vector => Self::Vector(Vec3::ONE),
        }
    }

    /// Sum of two values of the same kind; mismatched kinds keep `self`
    pub fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => Self::Float(a + b),
            (Self::Int(a), Self::Int(b)) => Self::Int(a.saturating_add(b)),
            (Self::Vector(a), Self::Vector(b)) => Self::Vector(a + b),
            _ => self,
        }
    }

    /// Component-wise product of two values of the same kind; mismatched kinds keep `self`
    pub fn mul(self, other: Self) -> Self {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => Self::Float(a * b),
            (Self::Int(a), Self::Int(b)) => Self::Int(a.saturating_mul(b)),
            (Self::Vector(a), Self::Vector(b)) => Self::Vector(a.mul_elements(b)),
            _ => self,
        }
    }
}

/// Fixed schema of a concrete attribute ("run", "jump", ...)
///
/// Field order is the stable index callers use; it must never change for a
/// given schema type.
pub trait ParameterSchema: 'static {
    /// Display name used in errors and logs
    const NAME: &'static str;
    /// Field definitions in index order
    const FIELDS: &'static [FieldDef];

    /// Number of fields
    fn len() -> usize {
        Self::FIELDS.len()
    }

    /// Index of the field called `name`
    fn index_of(name: &str) -> Option<usize> {
        Self::FIELDS.iter().position(|f| f.name == name)
    }
}
