//! Error types for effechain-dsp

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not a built-in unit type: {0}")]
    UnknownKind(String),

    #[error(transparent)]
    Core(#[from] effechain_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
