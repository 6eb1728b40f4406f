//! # effechain - Real-time Effect Chain Engine
//!
//! Ordered chains of audio effect units, editable from any thread while an
//! audio thread renders them block by block without locks.
//!
//! ## Architecture
//!
//! effechain is an umbrella crate that coordinates:
//! - **effechain-core** - Runtime (blocks, parameters, unit contract, chain,
//!   controller/renderer, presets, metering)
//! - **effechain-dsp** - Built-in units (volume, balance, M/S, crosstalk,
//!   width, bit crusher, harmonic distortion, tremolo, sections)
//!
//! ## Quick Start
//!
//! ```
//! use effechain::prelude::*;
//!
//! let engine = effechain::builder()
//!     .sample_rate(48000.0)
//!     .build()
//!     .unwrap();
//! let (controller, mut renderer) = engine.split();
//!
//! let volume = controller.add("VolumePlugin").unwrap();
//! controller.set_param(volume, "vl", 20.0);
//!
//! // audio thread
//! let mut block = Block::from_channels(&[&[0.1, 0.2], &[0.1, 0.2]]).unwrap();
//! renderer.render_block(&mut block);
//! assert!((block.channel(0)[1] - 2.0).abs() < 1e-5);
//! ```

/// Re-export of effechain-core for direct access
pub use effechain_core as core;

/// Re-export of effechain-dsp for direct access
pub use effechain_dsp as units;

pub use effechain_core::{
    db_to_linear, linear_to_db, AtomicDouble, AtomicFlag, AtomicFloat, Block, ChannelTarget,
    Controller, Engine, EngineConfig, EngineEvent, Geometry, InstanceId, LinearRamp, ParamDomain,
    ParamSnapshot, ParamSpec, ParamValue, ParameterStore, Preset, PresetEntry, PrivateState,
    Processor, RenderContext, RenderMeter, RenderMetrics, Renderer, Routing, Unit, UnitFault,
    UnitRegistry, UnitRole, MAX_BUSES,
};

pub use effechain_dsp::{builtin_registry, register_builtin_units, UnitKind};

mod error;
pub use error::{Error, Result};

mod builder;
pub use builder::EngineBuilder;

mod offline;
pub use offline::{OfflineRenderer, RenderResult};

/// Start building an engine with every built-in unit registered.
pub fn builder() -> EngineBuilder {
    EngineBuilder::new()
}

pub mod prelude {
    pub use crate::{
        Block, ChannelTarget, Controller, Engine, EngineBuilder, EngineEvent, InstanceId,
        OfflineRenderer, ParamValue, Preset, PresetEntry, Renderer, Routing, UnitKind,
    };

    pub use crate::core::prelude::{
        Geometry, ParamSnapshot, ParamSpec, PrivateState, Processor, RenderContext, Unit,
        UnitFault, UnitRegistry, UnitRole,
    };
}
