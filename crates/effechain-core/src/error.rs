//! Error types for effechain-core.

use crate::InstanceId;
use thiserror::Error;

/// Error type for effechain-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("Chain is full ({capacity} instances)")]
    ChainFull { capacity: usize },

    #[error("Unknown instance: {0}")]
    UnknownInstance(InstanceId),

    #[error("Block geometry mismatch: expected {expected} samples, got {actual}")]
    GeometryMismatch { expected: usize, actual: usize },

    #[error("Preset error: {0}")]
    Preset(#[from] serde_json::Error),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Failure reported by a unit while processing a block.
///
/// Carries no heap data so it can be built and sent from the render thread.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFault {
    #[error("unit failed: {0}")]
    Failed(&'static str),

    #[error("unit panicked")]
    Panicked,

    #[error("private state does not belong to this unit")]
    StateMismatch,
}
