//! Centralized error type for the effechain umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] effechain_core::Error),

    #[error("DSP: {0}")]
    Dsp(#[from] effechain_dsp::Error),

    #[error("Channel {channel} has {actual} frames, expected {expected}")]
    RaggedInput {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Stream has {expected} channels, got {actual}")]
    ChannelCountChanged { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
