//! Parameter sets bound to a schema

use crate::error::{ParamError, Result};
use crate::schema::{ParamValue, ParameterSchema};
use planar_math::Vec3;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// A complete bundle of values for schema `S`
///
/// Always holds exactly `S::FIELDS.len()` values whose kinds match the
/// schema; every constructor enforces that.
pub struct ParameterSet<S: ParameterSchema> {
    values: Vec<ParamValue>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: ParameterSchema> ParameterSet<S> {
    /// Build from raw values, validating size and kinds
    pub fn from_values(values: Vec<ParamValue>) -> Result<Self> {
        if values.len() != S::len() {
            return Err(ParamError::SchemaSize {
                schema: S::NAME,
                expected: S::len(),
                actual: values.len(),
            });
        }
        for (def, value) in S::FIELDS.iter().zip(&values) {
            if def.kind != value.kind() {
                return Err(ParamError::KindMismatch {
                    schema: S::NAME,
                    field: def.name,
                    expected: def.kind,
                    actual: value.kind(),
                });
            }
        }
        Ok(Self {
            values,
            _schema: PhantomData,
        })
    }

    /// All zeros: the starting point for additive overrides
    pub fn additive_identity() -> Self {
        Self {
            values: S::FIELDS.iter().map(|f| ParamValue::zero(f.kind)).collect(),
            _schema: PhantomData,
        }
    }

    /// All ones: the starting point for multiplicative overrides
    pub fn multiplicative_identity() -> Self {
        Self {
            values: S::FIELDS.iter().map(|f| ParamValue::one(f.kind)).collect(),
            _schema: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<ParamValue> {
        self.values.get(index).copied()
    }

    /// Float field at `index`
    ///
    /// Indices come from the schema's constants, so a miss is a programming
    /// error; release builds read it as zero.
    pub fn float(&self, index: usize) -> f32 {
        match self.values.get(index) {
            Some(ParamValue::Float(v)) => *v,
            other => {
                debug_assert!(false, "{}[{}] is not a float: {:?}", S::NAME, index, other);
                0.0
            }
        }
    }

    /// Integer field at `index`
    pub fn int(&self, index: usize) -> i32 {
        match self.values.get(index) {
            Some(ParamValue::Int(v)) => *v,
            other => {
                debug_assert!(false, "{}[{}] is not an int: {:?}", S::NAME, index, other);
                0
            }
        }
    }

    /// Vector field at `index`
    pub fn vector(&self, index: usize) -> Vec3 {
        match self.values.get(index) {
            Some(ParamValue::Vector(v)) => *v,
            other => {
                debug_assert!(false, "{}[{}] is not a vector: {:?}", S::NAME, index, other);
                Vec3::ZERO
            }
        }
    }

    /// Replace one field, checking its kind
    pub fn set(&mut self, index: usize, value: ParamValue) -> Result<()> {
        let def = S::FIELDS
            .get(index)
            .ok_or(ParamError::IndexOutOfRange { schema: S::NAME, index })?;
        if def.kind != value.kind() {
            return Err(ParamError::KindMismatch {
                schema: S::NAME,
                field: def.name,
                expected: def.kind,
                actual: value.kind(),
            });
        }
        self.values[index] = value;
        Ok(())
    }

    /// Replace a field looked up by name
    pub fn set_by_name(&mut self, name: &str, value: ParamValue) -> Result<()> {
        let index = S::index_of(name).ok_or_else(|| ParamError::UnknownField {
            schema: S::NAME,
            name: name.to_string(),
        })?;
        self.set(index, value)
    }

    pub fn with_float(mut self, index: usize, value: f32) -> Result<Self> {
        self.set(index, ParamValue::Float(value))?;
        Ok(self)
    }

    pub fn with_int(mut self, index: usize, value: i32) -> Result<Self> {
        self.set(index, ParamValue::Int(value))?;
        Ok(self)
    }

    pub fn with_vector(mut self, index: usize, value: Vec3) -> Result<Self> {
        self.set(index, ParamValue::Vector(value))?;
        Ok(self)
    }

    /// Field-wise sum
    pub(crate) fn add_assign(&mut self, other: &Self) {
        for (a, b) in self.values.iter_mut().zip(&other.values) {
            *a = a.add(*b);
        }
    }

    /// Field-wise product
    pub(crate) fn mul_assign(&mut self, other: &Self) {
        for (a, b) in self.values.iter_mut().zip(&other.values) {
            *a = a.mul(*b);
        }
    }

    /// Overwrite every field that `partial` sets
    pub(crate) fn overwrite_with(&mut self, partial: &PartialParameterSet<S>) {
        for (a, b) in self.values.iter_mut().zip(&partial.fields) {
            if let Some(value) = b {
                *a = *value;
            }
        }
    }
}

impl<S: ParameterSchema> Clone for ParameterSet<S> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S: ParameterSchema> PartialEq for ParameterSet<S> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<S: ParameterSchema> fmt::Debug for ParameterSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (def, value) in S::FIELDS.iter().zip(&self.values) {
            map.entry(&def.name, value);
        }
        map.finish()
    }
}

impl<S: ParameterSchema> Serialize for ParameterSet<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        self.values.serialize(serializer)
    }
}

impl<'de, S: ParameterSchema> Deserialize<'de> for ParameterSet<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let values = Vec::<ParamValue>::deserialize(deserializer)?;
        Self::from_values(values).map_err(D::Error::custom)
    }
}

/// Field-sparse values for a Set override
///
/// `None` means "leave this field alone", which lets several Set overrides
/// stay active at once as long as they touch different fields.
pub struct PartialParameterSet<S: ParameterSchema> {
    fields: Vec<Option<ParamValue>>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: ParameterSchema> PartialParameterSet<S> {
    /// Every field unset
    pub fn new() -> Self {
        Self {
            fields: vec![None; S::len()],
            _schema: PhantomData,
        }
    }

    /// Set one field, checking its kind
    pub fn set(&mut self, index: usize, value: ParamValue) -> Result<()> {
        let def = S::FIELDS
            .get(index)
            .ok_or(ParamError::IndexOutOfRange { schema: S::NAME, index })?;
        if def.kind != value.kind() {
            return Err(ParamError::KindMismatch {
                schema: S::NAME,
                field: def.name,
                expected: def.kind,
                actual: value.kind(),
            });
        }
        self.fields[index] = Some(value);
        Ok(())
    }

    /// Mark a field unset again
    pub fn unset(&mut self, index: usize) {
        if let Some(field) = self.fields.get_mut(index) {
            *field = None;
        }
    }

    pub fn with_float(mut self, index: usize, value: f32) -> Result<Self> {
        self.set(index, ParamValue::Float(value))?;
        Ok(self)
    }

    pub fn with_int(mut self, index: usize, value: i32) -> Result<Self> {
        self.set(index, ParamValue::Int(value))?;
        Ok(self)
    }

    pub fn with_vector(mut self, index: usize, value: Vec3) -> Result<Self> {
        self.set(index, ParamValue::Vector(value))?;
        Ok(self)
    }

    pub fn get(&self, index: usize) -> Option<ParamValue> {
        self.fields.get(index).copied().flatten()
    }

    /// Number of fields this override touches
    pub fn touched(&self) -> usize {
        self.fields.iter().filter(|f| f.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.touched() == 0
    }
}

impl<S: ParameterSchema> Default for PartialParameterSet<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ParameterSchema> Clone for PartialParameterSet<S> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S: ParameterSchema> PartialEq for PartialParameterSet<S> {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl<S: ParameterSchema> fmt::Debug for PartialParameterSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (def, value) in S::FIELDS.iter().zip(&self.fields) {
            if let Some(value) = value {
                map.entry(&def.name, value);
            }
        }
        map.finish()
    }
}

impl<S: ParameterSchema> FromIterator<(usize, ParamValue)> for PartialParameterSet<S> {
    /// Collect `(index, value)` pairs; entries that do not fit the schema are dropped
    fn from_iter<I: IntoIterator<Item = (usize, ParamValue)>>(iter: I) -> Self {
        let mut partial = Self::new();
        for (index, value) in iter {
            if let Err(err) = partial.set(index, value) {
                log::warn!("Dropping set-override field: {}", err);
            }
        }
        partial
    }
}
