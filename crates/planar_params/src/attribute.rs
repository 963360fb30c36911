//! Overridable attributes

use crate::schema::ParameterSchema;
use crate::set::{ParameterSet, PartialParameterSet};
use planar_math::Vec3;
use std::fmt;

/// How an override combines with the base values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideKind {
    /// Added after everything else
    Additive,
    /// Multiplied after Set overrides, before additive ones
    Multiplicative,
    /// Forces fields to a value, later entries winning per field
    Set,
}

/// Identity of one active Set override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetHandle(u64);

impl SetHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// An override waiting to be applied
pub enum ParameterOverride<S: ParameterSchema> {
    Additive(ParameterSet<S>),
    Multiplicative(ParameterSet<S>),
    Set(PartialParameterSet<S>),
}

impl<S: ParameterSchema> ParameterOverride<S> {
    pub fn kind(&self) -> OverrideKind {
        match self {
            Self::Additive(_) => OverrideKind::Additive,
            Self::Multiplicative(_) => OverrideKind::Multiplicative,
            Self::Set(_) => OverrideKind::Set,
        }
    }
}

impl<S: ParameterSchema> Clone for ParameterOverride<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Additive(v) => Self::Additive(v.clone()),
            Self::Multiplicative(v) => Self::Multiplicative(v.clone()),
            Self::Set(v) => Self::Set(v.clone()),
        }
    }
}

impl<S: ParameterSchema> fmt::Debug for ParameterOverride<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Additive(v) => f.debug_tuple("Additive").field(v).finish(),
            Self::Multiplicative(v) => f.debug_tuple("Multiplicative").field(v).finish(),
            Self::Set(v) => f.debug_tuple("Set").field(v).finish(),
        }
    }
}

/// Receipt for an applied override; hand it back to remove the override
pub enum AppliedOverride<S: ParameterSchema> {
    Additive(ParameterSet<S>),
    Multiplicative(ParameterSet<S>),
    Set(SetHandle),
}

impl<S: ParameterSchema> AppliedOverride<S> {
    pub fn kind(&self) -> OverrideKind {
        match self {
            Self::Additive(_) => OverrideKind::Additive,
            Self::Multiplicative(_) => OverrideKind::Multiplicative,
            Self::Set(_) => OverrideKind::Set,
        }
    }
}

impl<S: ParameterSchema> Clone for AppliedOverride<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Additive(v) => Self::Additive(v.clone()),
            Self::Multiplicative(v) => Self::Multiplicative(v.clone()),
            Self::Set(h) => Self::Set(*h),
        }
    }
}

impl<S: ParameterSchema> fmt::Debug for AppliedOverride<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Additive(v) => f.debug_tuple("Additive").field(v).finish(),
            Self::Multiplicative(v) => f.debug_tuple("Multiplicative").field(v).finish(),
            Self::Set(h) => f.debug_tuple("Set").field(h).finish(),
        }
    }
}

/// A base parameter set plus additive, multiplicative and Set layers
///
/// The effective set is recomputed after every mutation, so readers never
/// see a half-applied override.
pub struct OverridableAttribute<S: ParameterSchema> {
    base: ParameterSet<S>,
    additive: ParameterSet<S>,
    additive_entries: Vec<ParameterSet<S>>,
    multiplicative: ParameterSet<S>,
    multiplicative_entries: Vec<ParameterSet<S>>,
    sets: Vec<(SetHandle, PartialParameterSet<S>)>,
    next_handle: u64,
    effective: ParameterSet<S>,
}

impl<S: ParameterSchema> OverridableAttribute<S> {
    /// Create with designer defaults and no overrides
    pub fn new(base: ParameterSet<S>) -> Self {
        let effective = base.clone();
        Self {
            base,
            additive: ParameterSet::additive_identity(),
            additive_entries: Vec::new(),
            multiplicative: ParameterSet::multiplicative_identity(),
            multiplicative_entries: Vec::new(),
            sets: Vec::new(),
            next_handle: 1,
            effective,
        }
    }

    pub fn base(&self) -> &ParameterSet<S> {
        &self.base
    }

    /// Replace the designer defaults, keeping active overrides
    pub fn set_base(&mut self, base: ParameterSet<S>) {
        self.base = base;
        self.recompute();
    }

    /// The composed values
    pub fn effective(&self) -> &ParameterSet<S> {
        &self.effective
    }

    /// Cumulative additive layer
    pub fn additive_layer(&self) -> &ParameterSet<S> {
        &self.additive
    }

    /// Cumulative multiplicative layer
    pub fn multiplicative_layer(&self) -> &ParameterSet<S> {
        &self.multiplicative
    }

    pub fn float(&self, index: usize) -> f32 {
        self.effective.float(index)
    }

    pub fn int(&self, index: usize) -> i32 {
        self.effective.int(index)
    }

    pub fn vector(&self, index: usize) -> Vec3 {
        self.effective.vector(index)
    }

    /// Number of active overrides across all layers
    pub fn active_override_count(&self) -> usize {
        self.additive_entries.len() + self.multiplicative_entries.len() + self.sets.len()
    }

    pub fn apply_additive(&mut self, values: ParameterSet<S>) {
        self.additive_entries.push(values);
        self.refold_additive();
        self.recompute();
    }

    /// Undo one matching additive override; unknown values are ignored
    pub fn remove_additive(&mut self, values: &ParameterSet<S>) -> bool {
        match self.additive_entries.iter().position(|e| e == values) {
            Some(index) => {
                self.additive_entries.remove(index);
                self.refold_additive();
                self.recompute();
                true
            }
            None => {
                log::warn!("{}: additive override was never applied", S::NAME);
                false
            }
        }
    }

    pub fn apply_multiplicative(&mut self, values: ParameterSet<S>) {
        self.multiplicative_entries.push(values);
        self.refold_multiplicative();
        self.recompute();
    }

    /// Undo one matching multiplicative override; unknown values are ignored
    pub fn remove_multiplicative(&mut self, values: &ParameterSet<S>) -> bool {
        match self.multiplicative_entries.iter().position(|e| e == values) {
            Some(index) => {
                self.multiplicative_entries.remove(index);
                self.refold_multiplicative();
                self.recompute();
                true
            }
            None => {
                log::warn!("{}: multiplicative override was never applied", S::NAME);
                false
            }
        }
    }

    /// Register a Set override after every existing one
    pub fn push_set(&mut self, values: PartialParameterSet<S>) -> SetHandle {
        let handle = SetHandle(self.next_handle);
        self.next_handle += 1;
        self.sets.push((handle, values));
        self.recompute();
        handle
    }

    /// Remove a Set override by identity; unknown handles are ignored
    pub fn remove_set(&mut self, handle: SetHandle) -> bool {
        match self.sets.iter().position(|(h, _)| *h == handle) {
            Some(index) => {
                self.sets.remove(index);
                self.recompute();
                true
            }
            None => {
                log::warn!("{}: set override {:?} is not active", S::NAME, handle);
                false
            }
        }
    }

    /// Apply any kind of override, returning the receipt needed to remove it
    pub fn apply_override(&mut self, values: &ParameterOverride<S>) -> AppliedOverride<S> {
        log::debug!("{}: applying {:?} override", S::NAME, values.kind());
        match values {
            ParameterOverride::Additive(v) => {
                self.apply_additive(v.clone());
                AppliedOverride::Additive(v.clone())
            }
            ParameterOverride::Multiplicative(v) => {
                self.apply_multiplicative(v.clone());
                AppliedOverride::Multiplicative(v.clone())
            }
            ParameterOverride::Set(v) => AppliedOverride::Set(self.push_set(v.clone())),
        }
    }

    /// Remove a previously applied override; a stale receipt is a no-op
    pub fn remove_override(&mut self, applied: &AppliedOverride<S>) -> bool {
        log::debug!("{}: removing {:?} override", S::NAME, applied.kind());
        match applied {
            AppliedOverride::Additive(v) => self.remove_additive(v),
            AppliedOverride::Multiplicative(v) => self.remove_multiplicative(v),
            AppliedOverride::Set(h) => self.remove_set(*h),
        }
    }

    /// Drop every override, returning to the base values
    pub fn clear_overrides(&mut self) {
        self.additive_entries.clear();
        self.multiplicative_entries.clear();
        self.sets.clear();
        self.additive = ParameterSet::additive_identity();
        self.multiplicative = ParameterSet::multiplicative_identity();
        self.recompute();
    }

    fn refold_additive(&mut self) {
        let mut layer = ParameterSet::additive_identity();
        for entry in &self.additive_entries {
            layer.add_assign(entry);
        }
        self.additive = layer;
    }

    fn refold_multiplicative(&mut self) {
        let mut layer = ParameterSet::multiplicative_identity();
        for entry in &self.multiplicative_entries {
            layer.mul_assign(entry);
        }
        self.multiplicative = layer;
    }

    fn recompute(&mut self) {
        let mut effective = self.base.clone();
        for (_, set) in &self.sets {
            effective.overwrite_with(set);
        }
        effective.mul_assign(&self.multiplicative);
        effective.add_assign(&self.additive);
        self.effective = effective;
    }
}

impl<S: ParameterSchema> Clone for OverridableAttribute<S> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            additive: self.additive.clone(),
            additive_entries: self.additive_entries.clone(),
            multiplicative: self.multiplicative.clone(),
            multiplicative_entries: self.multiplicative_entries.clone(),
            sets: self.sets.clone(),
            next_handle: self.next_handle,
            effective: self.effective.clone(),
        }
    }
}

impl<S: ParameterSchema> fmt::Debug for OverridableAttribute<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverridableAttribute")
            .field("schema", &S::NAME)
            .field("effective", &self.effective)
            .field("overrides", &self.active_override_count())
            .finish()
    }
}
