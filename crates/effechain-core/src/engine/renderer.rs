//! Render plane.

use super::{EngineEvent, Shared};
use crate::block::{Block, Geometry};
use crate::chain::ChainSnapshot;
use crate::config::EngineConfig;
use crate::error::UnitFault;
use crate::instance::InstanceId;
use crate::metering::RenderMeter;
use crate::routing::MAX_BUSES;
use crate::unit::{PrivateState, RenderContext, UnitRole};
use crossbeam_channel::Sender;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Objects the renderer hands back so their memory is freed off the audio thread.
pub(crate) enum Discard {
    State(PrivateState),
    PanicPayload(Box<dyn Any + Send>),
}

struct StateSlot {
    state: PrivateState,
    reset_generation: u64,
    /// Channel count the state was built for. Differs from the block when
    /// the instance targets a single channel.
    channels: usize,
}

/// Sends discards to the controller. Items that do not fit in the channel
/// wait in a preallocated overflow queue and are retried next block.
struct Handback {
    tx: Sender<Discard>,
    overflow: Vec<Discard>,
    limit: usize,
}

impl Handback {
    fn new(tx: Sender<Discard>, capacity: usize) -> Self {
        Self {
            tx,
            overflow: Vec::with_capacity(capacity),
            limit: capacity,
        }
    }

    fn push(&mut self, item: Discard, meter: &RenderMeter) {
        let Err(err) = self.tx.try_send(item) else {
            return;
        };
        if self.overflow.len() < self.limit {
            self.overflow.push(err.into_inner());
        } else {
            // Dropped here, on the audio thread.
            meter.count_dropped_discard();
        }
    }

    fn flush(&mut self) {
        while let Some(item) = self.overflow.pop() {
            if let Err(err) = self.tx.try_send(item) {
                self.overflow.push(err.into_inner());
                break;
            }
        }
    }
}

/// Auxiliary buses `1..=MAX_BUSES`. Each is zeroed the first time a block
/// touches it.
struct Buses {
    extra: Vec<Block>,
    cleared: u8,
}

impl Buses {
    fn new(channels: usize, block_size: usize) -> Self {
        Self {
            extra: (0..MAX_BUSES)
                .map(|_| Block::allocate(channels, block_size))
                .collect(),
            cleared: 0,
        }
    }

    fn reshape(&mut self, channels: usize, block_size: usize) {
        for bus in &mut self.extra {
            bus.reshape(channels, block_size);
        }
    }

    #[inline]
    fn begin_block(&mut self) {
        self.cleared = 0;
    }

    /// Bus `index`, where bus 0 is `main`.
    fn get<'a>(&'a mut self, main: &'a mut Block, index: u8) -> &'a mut Block {
        let Some(slot) = (index as usize).checked_sub(1) else {
            return main;
        };
        match self.extra.get_mut(slot) {
            Some(bus) => {
                let bit = 1u8 << slot;
                if self.cleared & bit == 0 {
                    bus.fill(0.0);
                    self.cleared |= bit;
                }
                bus
            }
            None => main,
        }
    }
}

/// Owns private state and processes blocks. Lives on the audio thread.
///
/// [`render_block`](Self::render_block) takes no locks and, once every
/// instance has processed at least one block at the current geometry, does
/// not allocate.
pub struct Renderer {
    shared: Arc<Shared>,
    states: HashMap<InstanceId, StateSlot>,
    /// Block as it entered the chain, for [`RenderContext::channel`].
    input: Block,
    /// Pre-instance copy restored when an in-place instance faults.
    scratch: Block,
    buses: Buses,
    /// Staging for instances that write to another bus.
    work: Block,
    /// Staging for instances restricted to one channel.
    mono: Block,
    geometry: Option<Geometry>,
    frame: u64,
    seen_generation: u64,
    events: Sender<EngineEvent>,
    handback: Handback,
}

impl Renderer {
    pub(crate) fn new(
        shared: Arc<Shared>,
        config: &EngineConfig,
        events: Sender<EngineEvent>,
        retired: Sender<Discard>,
    ) -> Self {
        let (channels, block_size) = (config.channels, config.block_size);
        Self {
            shared,
            states: HashMap::with_capacity(config.max_instances),
            input: Block::allocate(channels, block_size),
            scratch: Block::allocate(channels, block_size),
            buses: Buses::new(channels, block_size),
            work: Block::allocate(channels, block_size),
            mono: Block::allocate(1, block_size),
            geometry: None,
            frame: 0,
            seen_generation: 0,
            events,
            handback: Handback::new(retired, config.max_instances * 2),
        }
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Geometry of the last rendered block.
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    /// Run one block through the latest chain, in place.
    pub fn render_block(&mut self, block: &mut Block) {
        let started = self.shared.meter.is_enabled().then(Instant::now);
        let epoch = self.shared.epochs.begin_block();
        let chain = self.shared.chain.load();

        if !self.handback.overflow.is_empty() {
            self.handback.flush();
        }

        let geometry = Geometry {
            sample_rate: self.shared.sample_rate.get(),
            channels: block.channels(),
            block_size: block.block_size(),
        };
        if self.geometry != Some(geometry) {
            self.reconfigure(geometry);
        }
        if chain.generation() != self.seen_generation {
            self.sweep(&chain);
            self.seen_generation = chain.generation();
        }

        if !chain.master_bypass() && !chain.is_empty() && !block.samples().is_empty() {
            self.input.copy_from(block);
            self.run_chain(&chain, block, geometry);
        }

        self.frame += block.block_size() as u64;
        drop(chain);
        self.shared.epochs.end_block(epoch);

        self.shared.meter.count_block();
        if let Some(started) = started {
            self.shared
                .meter
                .record(block.block_size(), geometry.sample_rate, started.elapsed());
        }
    }

    fn run_chain(&mut self, chain: &ChainSnapshot, block: &mut Block, geometry: Geometry) {
        let Self {
            shared,
            states,
            input,
            scratch,
            buses,
            work,
            mono,
            frame,
            events,
            handback,
            ..
        } = self;
        let ctx = RenderContext::new(geometry.sample_rate, *frame, input);
        let mut section_enabled = true;
        buses.begin_block();

        for handle in chain.instances() {
            let params = handle.params().load();

            if handle.role() == UnitRole::Section {
                section_enabled = params.enabled();
                continue;
            }
            if !section_enabled || !params.enabled() || handle.is_faulted() {
                continue;
            }
            let unit = handle.unit();
            let routing = params.routing();
            let target = routing
                .channel
                .map(|c| c.index())
                .filter(|&c| c < geometry.channels);
            let channels = if target.is_some() { 1 } else { geometry.channels };
            if channels < unit.min_channels() {
                continue;
            }
            let (ib, ob) = (routing.input_bus, routing.output_bus);
            let in_place = ib == ob && target.is_none();

            let staged: &mut Block = {
                let source = buses.get(block, ib);
                match target {
                    None if in_place => {
                        scratch.copy_from(source);
                        source
                    }
                    None => {
                        work.copy_from(source);
                        &mut *work
                    }
                    Some(c) => {
                        mono.channel_mut(0).copy_from_slice(source.channel(c));
                        if ib != ob {
                            work.copy_from(source);
                        }
                        &mut *mono
                    }
                }
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let generation = handle.reset_generation();
                let state_geometry = Geometry { channels, ..geometry };
                let slot = states.entry(handle.id()).or_insert_with(|| StateSlot {
                    state: unit.create_state(&state_geometry, handle.seed()),
                    reset_generation: generation,
                    channels,
                });
                if slot.reset_generation != generation || slot.channels != channels {
                    let stale = std::mem::replace(
                        &mut slot.state,
                        unit.create_state(&state_geometry, handle.seed()),
                    );
                    slot.reset_generation = generation;
                    slot.channels = channels;
                    handback.push(Discard::State(stale), &shared.meter);
                }
                unit.process(staged, &params, &mut slot.state, &ctx)
            }));

            let fault = match outcome {
                Ok(Ok(())) => {
                    match target {
                        None if in_place => {}
                        None => buses.get(block, ob).mix_from(work),
                        Some(c) if ib == ob => buses
                            .get(block, ob)
                            .channel_mut(c)
                            .copy_from_slice(mono.channel(0)),
                        Some(c) => {
                            work.channel_mut(c).copy_from_slice(mono.channel(0));
                            buses.get(block, ob).mix_from(work);
                        }
                    }
                    continue;
                }
                Ok(Err(fault)) => fault,
                Err(payload) => {
                    handback.push(Discard::PanicPayload(payload), &shared.meter);
                    UnitFault::Panicked
                }
            };

            // Staged copies are discarded; only in-place work needs undoing.
            if in_place {
                staged.copy_from(scratch);
            }
            handle.mark_faulted();
            shared.meter.count_fault();
            let event = EngineEvent::UnitFault {
                id: handle.id(),
                type_tag: unit.type_tag(),
                fault,
                frame: *frame,
            };
            if events.try_send(event).is_err() {
                shared.meter.count_dropped_event();
            }
        }
    }

    /// Hand back state of instances that left the chain.
    fn sweep(&mut self, chain: &ChainSnapshot) {
        let Self {
            shared,
            states,
            handback,
            ..
        } = self;
        states.retain(|id, slot| {
            let keep = chain.contains(*id);
            if !keep {
                let state = std::mem::replace(&mut slot.state, PrivateState::empty());
                handback.push(Discard::State(state), &shared.meter);
            }
            keep
        });
    }

    /// New geometry: resize scratch space and buses, drop every private state.
    fn reconfigure(&mut self, geometry: Geometry) {
        let previous = self.geometry.replace(geometry);
        let (channels, block_size) = (geometry.channels, geometry.block_size);

        if self.input.channels() != channels || self.input.block_size() != block_size {
            self.input.reshape(channels, block_size);
            self.scratch.reshape(channels, block_size);
            self.work.reshape(channels, block_size);
            self.mono.reshape(1, block_size);
            self.buses.reshape(channels, block_size);
        }

        for (_, slot) in self.states.drain() {
            self.handback
                .push(Discard::State(slot.state), &self.shared.meter);
        }

        if let Some(from) = previous {
            let event = EngineEvent::GeometryChanged { from, to: geometry };
            if self.events.try_send(event).is_err() {
                self.shared.meter.count_dropped_event();
            }
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.shared.epochs.release_all();
    }
}
