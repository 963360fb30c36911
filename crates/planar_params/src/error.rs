//! Error types for parameter sets

use crate::schema::FieldKind;
use thiserror::Error;

/// Parameter schema errors
///
/// These only surface while building parameter sets; a character that
/// fails here must not be simulated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    /// Wrong number of values for the schema
    #[error("schema '{schema}' expects {expected} fields, got {actual}")]
    SchemaSize {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Value kind does not match the field definition
    #[error("field '{field}' of schema '{schema}' is {expected:?}, got {actual:?}")]
    KindMismatch {
        schema: &'static str,
        field: &'static str,
        expected: FieldKind,
        actual: FieldKind,
    },

    /// Field index outside the schema
    #[error("field index {index} out of range for schema '{schema}'")]
    IndexOutOfRange { schema: &'static str, index: usize },

    /// No field with that name
    #[error("schema '{schema}' has no field named '{name}'")]
    UnknownField { schema: &'static str, name: String },
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, ParamError>;
