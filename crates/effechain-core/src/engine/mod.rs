//! Effect engine: control plane and render plane around one published chain.
//!
//! ```text
//!  host / UI thread                               audio thread
//!  ┌────────────────┐                            ┌─────────────────┐
//!  │ Controller     │── ArcSwap<ChainSnapshot> ─►│ Renderer        │
//!  │  Mutex<pending>│── ArcSwap<ParamSnapshot> ─►│  private states │
//!  │  Reclaimer     │◄─ EngineEvent (bounded) ───│  scratch blocks │
//!  │                │◄─ retired state (bounded) ─│                 │
//!  └────────────────┘                            └─────────────────┘
//! ```
//!
//! The controller serializes its callers with a mutex the renderer never
//! touches. The renderer reads snapshots once per block, never blocks and
//! never frees memory in the steady state.

mod controller;
mod renderer;

pub use controller::Controller;
pub use renderer::Renderer;

use crate::block::{Block, Geometry};
use crate::chain::ChainSnapshot;
use crate::config::EngineConfig;
use crate::error::{Result, UnitFault};
use crate::instance::InstanceId;
use crate::lockfree::AtomicDouble;
use crate::metering::RenderMeter;
use crate::reclaim::Epochs;
use crate::registry::UnitRegistry;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Diagnostic reported by the renderer and drained by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// An instance failed and is bypassed until reset or removed. The block
    /// it was processing continued with that instance's input.
    UnitFault {
        id: InstanceId,
        type_tag: &'static str,
        fault: UnitFault,
        frame: u64,
    },

    /// Sample rate or block shape changed; every private state was reset.
    GeometryChanged { from: Geometry, to: Geometry },
}

/// State reachable from both planes.
pub(crate) struct Shared {
    pub(crate) chain: ArcSwap<ChainSnapshot>,
    pub(crate) epochs: Epochs,
    pub(crate) sample_rate: AtomicDouble,
    pub(crate) meter: RenderMeter,
}

/// Single-owner engine for hosts that render and edit from one place.
///
/// Use [`split`](Self::split) to move the [`Renderer`] onto the audio thread
/// and share the [`Controller`].
pub struct Engine {
    controller: Controller,
    renderer: Renderer,
}

impl Engine {
    /// Validate `config` and wire up both planes around `registry`.
    pub fn new(config: EngineConfig, registry: UnitRegistry) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            chain: ArcSwap::from_pointee(ChainSnapshot::default()),
            epochs: Epochs::default(),
            sample_rate: AtomicDouble::new(config.sample_rate),
            meter: RenderMeter::default(),
        });

        let (event_tx, event_rx) = crossbeam_channel::bounded(config.event_capacity);
        let (retired_tx, retired_rx) = crossbeam_channel::bounded(config.max_instances * 2);

        let renderer = Renderer::new(Arc::clone(&shared), &config, event_tx, retired_tx);
        let controller = Controller::new(shared, Arc::new(registry), config, event_rx, retired_rx);

        Ok(Self {
            controller,
            renderer,
        })
    }

    #[inline]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn config(&self) -> &EngineConfig {
        self.controller.config()
    }

    /// Run one block through the chain in place.
    #[inline]
    pub fn render_block(&mut self, block: &mut Block) {
        self.renderer.render_block(block);
    }

    /// Render a copy of `input` and return it. Allocates; for tests and
    /// offline use.
    pub fn process(&mut self, input: &Block) -> Block {
        let mut output = input.clone();
        self.renderer.render_block(&mut output);
        output
    }

    pub fn split(self) -> (Controller, Renderer) {
        (self.controller, self.renderer)
    }
}
