//! Control plane.

use super::renderer::Discard;
use super::{EngineEvent, Shared};
use crate::chain::Chain;
use crate::config::{validate_sample_rate, EngineConfig};
use crate::error::{Error, Result};
use crate::instance::{instance_seed, InstanceId, PluginInstance};
use crate::metering::{RenderMeter, RenderMetrics};
use crate::parameter::ParamValue;
use crate::preset::{Preset, PresetEntry};
use crate::reclaim::{Reclaimer, Retired};
use crate::registry::UnitRegistry;
use crate::routing::Routing;
use crate::snapshot::ParameterStore;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;

struct ControlState {
    chain: Chain,
    next_id: u64,
    reclaimer: Reclaimer,
}

/// Edits the chain and instance parameters.
///
/// All methods take `&self` and may be called from any thread; callers are
/// serialized internally. Every successful edit is visible to the renderer
/// from the next block on. Edits never fail because of their values: out of
/// range numbers are clamped and unknown keys or ids are ignored.
pub struct Controller {
    shared: Arc<Shared>,
    registry: Arc<UnitRegistry>,
    config: EngineConfig,
    state: Mutex<ControlState>,
    events: Receiver<EngineEvent>,
    discarded: Receiver<Discard>,
}

impl Controller {
    pub(crate) fn new(
        shared: Arc<Shared>,
        registry: Arc<UnitRegistry>,
        config: EngineConfig,
        events: Receiver<EngineEvent>,
        discarded: Receiver<Discard>,
    ) -> Self {
        Self {
            shared,
            registry,
            config,
            state: Mutex::new(ControlState {
                chain: Chain::default(),
                next_id: 1,
                reclaimer: Reclaimer::default(),
            }),
            events,
            discarded,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Append a new instance with default parameters.
    pub fn add(&self, type_tag: &str) -> Result<InstanceId> {
        self.insert_entry(usize::MAX, &PresetEntry::new(type_tag))
    }

    /// Insert a new instance at `index` (clamped to the chain length).
    pub fn insert(&self, index: usize, type_tag: &str) -> Result<InstanceId> {
        self.insert_entry(index, &PresetEntry::new(type_tag))
    }

    /// Append an instance described in wire format.
    pub fn add_entry(&self, entry: &PresetEntry) -> Result<InstanceId> {
        self.insert_entry(usize::MAX, entry)
    }

    /// Insert an instance described in wire format at `index`.
    ///
    /// Fails with [`Error::ChainFull`] once the chain holds
    /// [`EngineConfig::max_instances`] instances.
    pub fn insert_entry(&self, index: usize, entry: &PresetEntry) -> Result<InstanceId> {
        let mut state = self.state.lock();
        if state.chain.len() >= self.config.max_instances {
            return Err(Error::ChainFull {
                capacity: self.config.max_instances,
            });
        }
        let instance = self.instantiate(&mut state, entry)?;
        let id = instance.id();
        state.chain.insert(index, instance);
        self.publish_chain(&mut state);
        tracing::debug!("Added {} instance {}", entry.type_tag, id);
        Ok(id)
    }

    /// Remove an instance. Its private state is released off the audio thread.
    pub fn remove(&self, id: InstanceId) -> bool {
        let mut state = self.state.lock();
        let Some(instance) = state.chain.remove(id) else {
            return false;
        };
        self.publish_chain(&mut state);
        tracing::debug!("Removed {} instance {}", instance.type_tag(), id);
        true
    }

    /// Put the listed instances first, in order. Unknown or repeated ids are
    /// skipped and unlisted instances follow in their current relative order.
    pub fn reorder(&self, order: &[InstanceId]) -> bool {
        let mut state = self.state.lock();
        let changed = state.chain.reorder(order);
        if changed {
            self.publish_chain(&mut state);
            tracing::debug!("Reordered chain: {:?}", state.chain.ids());
        }
        changed
    }

    /// Move one instance to `index` (clamped).
    pub fn move_to(&self, id: InstanceId, index: usize) -> bool {
        let mut state = self.state.lock();
        let Some(instance) = state.chain.remove(id) else {
            return false;
        };
        state.chain.insert(index, instance);
        self.publish_chain(&mut state);
        true
    }

    /// Remove every instance.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let removed = state.chain.clear();
        self.publish_chain(&mut state);
        tracing::debug!("Cleared chain ({} instances)", removed.len());
    }

    /// When set, blocks pass through untouched regardless of the chain.
    pub fn set_master_bypass(&self, bypass: bool) {
        let mut state = self.state.lock();
        if state.chain.master_bypass() != bypass {
            state.chain.set_master_bypass(bypass);
            self.publish_chain(&mut state);
        }
    }

    pub fn master_bypass(&self) -> bool {
        self.state.lock().chain.master_bypass()
    }

    /// Clamp and set one parameter. `false` for an unknown id or key, or a
    /// value with no meaning for that key.
    pub fn set_param(&self, id: InstanceId, key: &str, value: impl Into<ParamValue>) -> bool {
        let value = value.into();
        self.edit(id, |store| store.set(key, value))
    }

    pub fn set_enabled(&self, id: InstanceId, enabled: bool) -> bool {
        self.edit(id, |store| {
            store.set_enabled(enabled);
            true
        })
    }

    /// Apply several keys (and optionally `enabled`) as one edit; a render
    /// cycle sees either none or all of them.
    pub fn apply(&self, id: InstanceId, params: &Map<String, Value>) -> bool {
        self.edit(id, |store| store.apply(params) > 0)
    }

    /// Reset every parameter to its default, then apply `params`. The
    /// enabled flag and routing are kept unless `params` sets them.
    pub fn replace(&self, id: InstanceId, params: &Map<String, Value>) -> bool {
        self.edit(id, |store| {
            let mut fresh = ParameterStore::new(store.specs());
            fresh.set_enabled(store.enabled());
            fresh.set_routing(store.routing());
            fresh.apply(params);
            *store = fresh;
            true
        })
    }

    /// Route an instance between buses or restrict it to one channel.
    /// Bus indices are clamped to [`MAX_BUSES`](crate::MAX_BUSES).
    pub fn set_routing(&self, id: InstanceId, routing: Routing) -> bool {
        self.edit(id, |store| {
            store.set_routing(routing);
            true
        })
    }

    pub fn routing(&self, id: InstanceId) -> Option<Routing> {
        self.state.lock().chain.get(id).map(|p| p.store.routing())
    }

    /// Clear a fault and start the instance over with fresh private state.
    pub fn reset(&self, id: InstanceId) -> bool {
        let mut state = self.state.lock();
        let Some(instance) = state.chain.get(id) else {
            return false;
        };
        instance.handle.request_reset();
        tracing::debug!("Reset instance {}", id);
        self.collect(&mut state);
        true
    }

    pub fn ids(&self) -> Vec<InstanceId> {
        self.state.lock().chain.ids()
    }

    pub fn len(&self) -> usize {
        self.state.lock().chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_of(&self, id: InstanceId) -> Option<&'static str> {
        self.state.lock().chain.get(id).map(PluginInstance::type_tag)
    }

    pub fn param(&self, id: InstanceId, key: &str) -> Option<ParamValue> {
        self.state.lock().chain.get(id)?.store.get(key).cloned()
    }

    pub fn is_enabled(&self, id: InstanceId) -> Option<bool> {
        self.state.lock().chain.get(id).map(|p| p.store.enabled())
    }

    pub fn is_faulted(&self, id: InstanceId) -> Option<bool> {
        self.state
            .lock()
            .chain
            .get(id)
            .map(|p| p.handle.is_faulted())
    }

    /// Wire-format view of one instance.
    pub fn get_all(&self, id: InstanceId) -> Option<PresetEntry> {
        self.state.lock().chain.get(id).map(entry_of)
    }

    pub fn export_preset(&self) -> Preset {
        Preset::new(self.state.lock().chain.iter().map(entry_of).collect())
    }

    /// Replace the whole chain in one publish. Entries with an unregistered
    /// type, and entries past [`EngineConfig::max_instances`], are skipped.
    /// Returns the ids of the new instances in order.
    pub fn load_preset(&self, preset: &Preset) -> Vec<InstanceId> {
        let mut state = self.state.lock();
        state.chain.clear();
        let mut ids = Vec::with_capacity(preset.len());
        for entry in &preset.entries {
            if ids.len() >= self.config.max_instances {
                tracing::warn!(
                    "Preset has {} entries, keeping the first {}",
                    preset.len(),
                    self.config.max_instances
                );
                break;
            }
            match self.instantiate(&mut state, entry) {
                Ok(instance) => {
                    ids.push(instance.id());
                    state.chain.append(instance);
                }
                Err(e) => tracing::warn!("Skipping preset entry: {}", e),
            }
        }
        self.publish_chain(&mut state);
        tracing::debug!("Loaded preset with {} instances", ids.len());
        ids
    }

    /// Takes effect at the next block boundary; all private state is reset.
    pub fn set_sample_rate(&self, sample_rate: f64) -> Result<()> {
        validate_sample_rate(sample_rate)?;
        self.shared.sample_rate.set(sample_rate);
        tracing::info!("Sample rate set to {} Hz", sample_rate);
        Ok(())
    }

    pub fn sample_rate(&self) -> f64 {
        self.shared.sample_rate.get()
    }

    /// Take every pending renderer event, logging each.
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        let events: Vec<_> = self.events.try_iter().collect();
        for event in &events {
            match event {
                EngineEvent::UnitFault {
                    id,
                    type_tag,
                    fault,
                    frame,
                } => tracing::warn!(
                    "{} instance {} bypassed at frame {}: {}",
                    type_tag,
                    id,
                    frame,
                    fault
                ),
                EngineEvent::GeometryChanged { from, to } => tracing::info!(
                    "Geometry changed from {}ch/{}@{}Hz to {}ch/{}@{}Hz",
                    from.channels,
                    from.block_size,
                    from.sample_rate,
                    to.channels,
                    to.block_size,
                    to.sample_rate
                ),
            }
        }
        events
    }

    /// Free everything the renderer has handed back or can no longer see.
    /// Runs after every chain or parameter edit; call it periodically when
    /// the chain sits idle. Returns how many objects were released.
    pub fn collect_garbage(&self) -> usize {
        let mut state = self.state.lock();
        self.collect(&mut state)
    }

    /// Snapshots parked until the renderer acknowledges a newer epoch.
    pub fn pending_reclaim(&self) -> usize {
        self.state.lock().reclaimer.pending()
    }

    pub fn meter(&self) -> &RenderMeter {
        &self.shared.meter
    }

    pub fn metrics(&self) -> RenderMetrics {
        self.shared.meter.metrics()
    }

    fn instantiate(&self, state: &mut ControlState, entry: &PresetEntry) -> Result<PluginInstance> {
        let unit = self.registry.get(&entry.type_tag)?;
        let id = InstanceId(state.next_id);
        state.next_id += 1;
        let mut store = ParameterStore::new(unit.params());
        store.apply(&entry.to_store_map());
        Ok(PluginInstance::with_store(
            id,
            unit,
            instance_seed(self.config.seed, id),
            store,
        ))
    }

    fn edit(&self, id: InstanceId, f: impl FnOnce(&mut ParameterStore) -> bool) -> bool {
        let mut state = self.state.lock();
        let ControlState {
            chain, reclaimer, ..
        } = &mut *state;
        let Some(instance) = chain.get_mut(id) else {
            return false;
        };
        if !f(&mut instance.store) {
            return false;
        }
        let old = instance.publish();
        let epoch = self.shared.epochs.advance();
        reclaimer.retire(epoch, Retired::Params(old));
        self.collect(&mut state);
        true
    }

    fn publish_chain(&self, state: &mut ControlState) {
        let snapshot = Arc::new(state.chain.snapshot());
        let old = self.shared.chain.swap(snapshot);
        let epoch = self.shared.epochs.advance();
        state.reclaimer.retire(epoch, Retired::Chain(old));
        self.collect(state);
    }

    fn collect(&self, state: &mut ControlState) -> usize {
        let mut released = self.discarded.try_iter().count();
        released += state.reclaimer.collect(self.shared.epochs.rendered());
        released
    }
}

fn entry_of(instance: &PluginInstance) -> PresetEntry {
    PresetEntry {
        type_tag: instance.type_tag().to_string(),
        enabled: Some(instance.store.enabled()),
        params: instance.store.to_map(),
    }
}
