//! Engine configuration.

use crate::{Error, Result};

/// Configuration for the effect engine.
///
/// `channels` and `block_size` size the renderer's preallocated scratch
/// buffers. Blocks of another geometry are still accepted; they trigger a
/// reconfiguration at the block boundary.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sample_rate: f64,
    pub channels: usize,
    pub block_size: usize,
    /// Longest chain the controller accepts. Sizes the renderer's state
    /// table and the queues that carry retired state back, so the render
    /// thread neither grows nor frees them.
    pub max_instances: usize,
    /// Capacity of the diagnostic event channel.
    pub event_capacity: usize,
    /// Base seed for every randomised unit.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            channels: 2,
            block_size: 128,
            max_instances: 64,
            event_capacity: 256,
            seed: 0x5EED_CAFE,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_sample_rate(self.sample_rate)?;
        if self.channels == 0 || self.channels > 64 {
            return Err(Error::InvalidConfig(format!(
                "channels {} out of range (1-64)",
                self.channels
            )));
        }
        if self.block_size == 0 || self.block_size > 8192 {
            return Err(Error::InvalidConfig(format!(
                "block_size {} out of range (1-8192)",
                self.block_size
            )));
        }
        if self.max_instances == 0 {
            return Err(Error::InvalidConfig(
                "max_instances must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::InvalidConfig(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_sample_rate(sample_rate: f64) -> Result<()> {
    if !(8000.0..=384000.0).contains(&sample_rate) {
        return Err(Error::InvalidConfig(format!(
            "sample_rate {} out of range (8000-384000 Hz)",
            sample_rate
        )));
    }
    Ok(())
}
