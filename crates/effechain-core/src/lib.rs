//! Real-time effect chain runtime: block buffers, parameter snapshots, the
//! unit contract, and the engine that runs a chain of units block by block.
//!
//! # Primary API
//!
//! - [`Engine`]: entry point built from an [`EngineConfig`] and a
//!   [`UnitRegistry`]; [`Engine::split`] hands out a [`Controller`] for edits
//!   and a [`Renderer`] for the audio thread
//! - [`Processor`]: implement to add a unit kind, register it in a [`UnitRegistry`]
//! - [`Block`]: planar sample buffer passed to [`Renderer::render_block`]
//! - [`Preset`]: JSON wire format for chains
//! - [`Routing`]: per-instance send/return buses and channel targeting
//!
//! # Example
//!
//! ```ignore
//! use effechain_core::prelude::*;
//!
//! let mut registry = UnitRegistry::new();
//! registry.register(MyGain);
//! let config = EngineConfig {
//!     sample_rate: 48000.0,
//!     ..Default::default()
//! };
//! let engine = Engine::new(config, registry)?;
//! let (controller, mut renderer) = engine.split();
//!
//! let gain = controller.add("MyGain")?;
//! controller.set_param(gain, "gain", -6.0);
//!
//! // audio thread
//! renderer.render_block(&mut block);
//! ```

pub mod error;
pub use error::{Error, Result, UnitFault};

mod config;
pub use config::EngineConfig;

mod block;
pub use block::{Block, Geometry};

pub mod parameter;
pub use parameter::{db_to_linear, linear_to_db, ParamDomain, ParamSpec, ParamValue};

mod snapshot;
pub use snapshot::{ParamSnapshot, ParameterStore};

mod unit;
pub use unit::{PrivateState, Processor, RenderContext, Unit, UnitRole};

mod routing;
pub use routing::{ChannelTarget, Routing, MAX_BUSES};

mod instance;
pub use instance::InstanceId;

mod chain;

mod reclaim;

mod engine;
pub use engine::{Controller, Engine, EngineEvent, Renderer};

mod registry;
pub use registry::UnitRegistry;

mod preset;
pub use preset::{Preset, PresetEntry};

mod metering;
pub use metering::{RenderMeter, RenderMetrics};

mod smooth;
pub use smooth::LinearRamp;

pub(crate) mod lockfree;
pub use lockfree::{AtomicDouble, AtomicFlag, AtomicFloat};

/// Types needed to write and drive units.
pub mod prelude {
    pub use crate::{
        db_to_linear, Block, ChannelTarget, Controller, Engine, EngineConfig, EngineEvent,
        Geometry, InstanceId, LinearRamp, ParamSnapshot, ParamSpec, ParamValue, Preset,
        PresetEntry, PrivateState, Processor, RenderContext, Renderer, Routing, Unit, UnitFault,
        UnitRegistry, UnitRole,
    };
}
