//! Planar Params - Override Composition
//!
//! Designer-authored parameter bundles that gameplay code can bend at
//! runtime without ever losing the original values.
//!
//! # Layers
//!
//! Each [`OverridableAttribute`] owns a *base* [`ParameterSet`] and three
//! modifier layers. The effective value of every field is
//!
//! ```text
//! effective = (set_layers(base) * multiplicative) + additive
//! ```
//!
//! where `set_layers` overwrites fields with the values of every active
//! Set override in registration order (later entries win per field).
//!
//! # Example
//!
//! ```ignore
//! use planar_params::prelude::*;
//!
//! let mut run = OverridableAttribute::new(run_defaults);
//! let boost = ParameterSet::<RunSchema>::additive_identity()
//!     .with_float(RunSchema::ACCEL, 5.0)?;
//! let applied = run.apply_override(&ParameterOverride::Additive(boost));
//! // ... later, on scope exit
//! run.remove_override(&applied);
//! ```

pub mod attribute;
pub mod error;
pub mod schema;
pub mod set;

pub mod prelude {
    pub use crate::attribute::{
        AppliedOverride, OverridableAttribute, OverrideKind, ParameterOverride, SetHandle,
    };
    pub use crate::error::{ParamError, Result};
    pub use crate::schema::{FieldDef, FieldKind, ParamValue, ParameterSchema};
    pub use crate::set::{ParameterSet, PartialParameterSet};
}

pub use prelude::*;
