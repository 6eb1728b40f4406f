//! The contract every effect unit implements.
//!
//! Units are stateless descriptions of an algorithm. Everything that must
//! persist between blocks (filter memories, phase accumulators, ramps, noise
//! generators) lives in a [`PrivateState`] that the renderer creates on first
//! use, owns exclusively, and threads back into every call.
//!
//! Implement [`Processor`] for a concrete unit; the blanket impl turns it into
//! the object-safe [`Unit`] the engine stores as `Arc<dyn Unit>`.
//!
//! ```
//! use effechain_core::prelude::*;
//!
//! struct Invert;
//!
//! impl Processor for Invert {
//!     type State = ();
//!     const TYPE_TAG: &'static str = "Invert";
//!     const LABEL: &'static str = "Invert";
//!     const PARAMS: &'static [ParamSpec] = &[];
//!
//!     fn init_state(&self, _: &Geometry, _: u64) {}
//!
//!     fn process(
//!         &self,
//!         block: &mut Block,
//!         _: &ParamSnapshot,
//!         _: &mut (),
//!         _: &RenderContext<'_>,
//!     ) -> Result<(), UnitFault> {
//!         block.samples_mut().iter_mut().for_each(|s| *s = -*s);
//!         Ok(())
//!     }
//! }
//! ```

use crate::block::{Block, Geometry};
use crate::error::UnitFault;
use crate::parameter::ParamSpec;
use crate::snapshot::ParamSnapshot;
use std::any::Any;

/// How the engine treats an instance in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRole {
    /// Processes audio.
    Effect,
    /// Passes audio through; when disabled, every instance up to the next
    /// section is skipped.
    Section,
}

/// Per-block information handed to every unit.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    sample_rate: f64,
    frame: u64,
    input: &'a Block,
}

impl<'a> RenderContext<'a> {
    pub fn new(sample_rate: f64, frame: u64, input: &'a Block) -> Self {
        Self {
            sample_rate,
            frame,
            input,
        }
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Absolute frame index of the first sample in the block.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Absolute time of the first sample in the block, in seconds.
    #[inline]
    pub fn time(&self) -> f64 {
        self.frame as f64 / self.sample_rate
    }

    /// One channel of the block as it entered the chain.
    #[inline]
    pub fn channel(&self, index: usize) -> Option<&'a [f32]> {
        (index < self.input.channels()).then(|| self.input.channel(index))
    }
}

/// Type-erased per-instance state owned by the renderer.
pub struct PrivateState(Box<dyn Any + Send>);

impl PrivateState {
    pub fn new<T: Any + Send>(state: T) -> Self {
        Self(Box::new(state))
    }

    /// Placeholder holding nothing. Does not allocate.
    pub fn empty() -> Self {
        Self(Box::new(()))
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.downcast_mut()
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl std::fmt::Debug for PrivateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateState(..)")
    }
}

/// Object-safe unit interface used by the engine.
pub trait Unit: Send + Sync + 'static {
    /// Wire-format `type` tag.
    fn type_tag(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn params(&self) -> &'static [ParamSpec];

    /// Blocks with fewer channels pass through untouched.
    fn min_channels(&self) -> usize;

    fn role(&self) -> UnitRole;

    fn create_state(&self, geometry: &Geometry, seed: u64) -> PrivateState;

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        state: &mut PrivateState,
        ctx: &RenderContext<'_>,
    ) -> Result<(), UnitFault>;
}

/// Typed unit definition.
///
/// `init_state` runs on the render thread the first time an instance
/// processes, and again after a reset or geometry change. It may allocate
/// buffers sized by `geometry`; `process` must not allocate.
pub trait Processor: Send + Sync + 'static {
    type State: Send + 'static;

    const TYPE_TAG: &'static str;
    const LABEL: &'static str;
    const PARAMS: &'static [ParamSpec];
    const MIN_CHANNELS: usize = 1;
    const ROLE: UnitRole = UnitRole::Effect;

    fn init_state(&self, geometry: &Geometry, seed: u64) -> Self::State;

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        state: &mut Self::State,
        ctx: &RenderContext<'_>,
    ) -> Result<(), UnitFault>;
}

impl<P: Processor> Unit for P {
    fn type_tag(&self) -> &'static str {
        P::TYPE_TAG
    }

    fn label(&self) -> &'static str {
        P::LABEL
    }

    fn params(&self) -> &'static [ParamSpec] {
        P::PARAMS
    }

    fn min_channels(&self) -> usize {
        P::MIN_CHANNELS
    }

    fn role(&self) -> UnitRole {
        P::ROLE
    }

    fn create_state(&self, geometry: &Geometry, seed: u64) -> PrivateState {
        PrivateState::new(self.init_state(geometry, seed))
    }

    #[inline]
    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        state: &mut PrivateState,
        ctx: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        let state = state
            .downcast_mut::<P::State>()
            .ok_or(UnitFault::StateMismatch)?;
        Processor::process(self, block, params, state, ctx)
    }
}
