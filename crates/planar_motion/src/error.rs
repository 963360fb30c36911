//! Error types for the motion core

use planar_params::ParamError;
use planar_triggers::VolumeId;
use thiserror::Error;

/// Motion core errors
///
/// Only setup and snapshot decoding can fail. Once a character is wired up,
/// every per-tick callback is infallible.
#[derive(Debug, Error)]
pub enum MotionError {
    /// Invalid configuration
    #[error("Invalid motion configuration: {0}")]
    InvalidConfig(String),

    /// Parameter set could not be built
    #[error("Parameter schema error: {0}")]
    Param(#[from] ParamError),

    /// A required collaborator was not supplied
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),

    /// Volume registered with a tag that cannot serve the request
    #[error("Volume {id:?} cannot be registered: {reason}")]
    InvalidVolume { id: VolumeId, reason: String },

    /// Config file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot encoding failed: {0}")]
    Snapshot(#[from] bincode::Error),

    /// Snapshot written by an incompatible version
    #[error("Snapshot version {found} is not supported (expected {expected})")]
    IncompatibleSnapshot { found: u32, expected: u32 },
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;
