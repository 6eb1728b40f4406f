//! Builder for an [`Engine`] with the built-in units registered.

use crate::offline::OfflineRenderer;
use crate::{Engine, EngineConfig, Result, Unit, UnitKind, UnitRegistry};
use effechain_dsp::register_builtin_units;

/// Every [`UnitKind`] is registered unless [`without_builtins`](Self::without_builtins)
/// is called. Extra units added with [`register`](Self::register) sit beside
/// them and may replace a built-in by reusing its tag.
///
/// # Example
///
/// ```
/// use effechain::prelude::*;
///
/// let engine = effechain::builder()
///     .sample_rate(48000.0)
///     .block_size(256)
///     .build()
///     .unwrap();
/// let volume = engine.controller().add("VolumePlugin").unwrap();
/// assert!(engine.controller().set_param(volume, "vl", -6.0));
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    builtins: bool,
    extra: UnitRegistry,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            builtins: true,
            extra: UnitRegistry::new(),
        }
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default: 44100
    pub fn sample_rate(mut self, rate: f64) -> Self {
        self.config.sample_rate = rate;
        self
    }

    /// Default: 2
    pub fn channels(mut self, channels: usize) -> Self {
        self.config.channels = channels;
        self
    }

    /// Default: 128
    pub fn block_size(mut self, frames: usize) -> Self {
        self.config.block_size = frames;
        self
    }

    /// Default: 64
    pub fn max_instances(mut self, count: usize) -> Self {
        self.config.max_instances = count;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Seed for the randomised units. Equal seeds give identical output.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    pub fn register<U: Unit>(mut self, unit: U) -> Self {
        self.extra.register(unit);
        self
    }

    pub fn build(self) -> Result<Engine> {
        let mut registry = UnitRegistry::new();
        if self.builtins {
            register_builtin_units(&mut registry);
        }
        for tag in self.extra.list_types() {
            registry.register_arc(self.extra.get(tag)?);
        }
        tracing::debug!(
            "Building engine: {} unit types, {} Hz, {} ch, {} frames",
            registry.len(),
            self.config.sample_rate,
            self.config.channels,
            self.config.block_size
        );
        Ok(Engine::new(self.config, registry)?)
    }

    /// Build and wrap for whole-buffer rendering.
    pub fn build_offline(self) -> Result<OfflineRenderer> {
        Ok(OfflineRenderer::new(self.build()?))
    }
}
