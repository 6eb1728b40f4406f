//! Ordered instance lists.
//!
//! ```text
//!  control plane                          render plane
//!  ┌─────────────┐  publish   ┌────────────────────────┐
//!  │ Chain       │ ─────────► │ ArcSwap<ChainSnapshot> │ ──► load once per block
//!  │ (pending)   │            └────────────────────────┘
//!  └─────────────┘
//! ```
//!
//! [`Chain`] is the mutable, control-plane description. Every edit produces a
//! fresh [`ChainSnapshot`] that shares the untouched instance handles with the
//! previous one; the renderer only ever sees complete snapshots.

use crate::instance::{InstanceHandle, InstanceId, PluginInstance};
use std::sync::Arc;

/// Immutable ordered list of instances as seen by one render cycle.
#[derive(Debug, Default)]
pub struct ChainSnapshot {
    generation: u64,
    master_bypass: bool,
    instances: Vec<Arc<InstanceHandle>>,
}

impl ChainSnapshot {
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn master_bypass(&self) -> bool {
        self.master_bypass
    }

    #[inline]
    pub fn instances(&self) -> &[Arc<InstanceHandle>] {
        &self.instances
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: InstanceId) -> bool {
        self.instances.iter().any(|h| h.id() == id)
    }
}

/// Pending chain owned by the controller.
#[derive(Debug, Default)]
pub(crate) struct Chain {
    instances: Vec<PluginInstance>,
    master_bypass: bool,
    generation: u64,
}

impl Chain {
    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &PluginInstance> {
        self.instances.iter()
    }

    pub(crate) fn get(&self, id: InstanceId) -> Option<&PluginInstance> {
        self.instances.iter().find(|p| p.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: InstanceId) -> Option<&mut PluginInstance> {
        self.instances.iter_mut().find(|p| p.id() == id)
    }

    pub(crate) fn ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(PluginInstance::id).collect()
    }

    pub(crate) fn master_bypass(&self) -> bool {
        self.master_bypass
    }

    pub(crate) fn set_master_bypass(&mut self, bypass: bool) {
        self.master_bypass = bypass;
    }

    pub(crate) fn append(&mut self, instance: PluginInstance) {
        self.instances.push(instance);
    }

    /// Insert at `index`, clamped to the end of the chain.
    pub(crate) fn insert(&mut self, index: usize, instance: PluginInstance) {
        let index = index.min(self.instances.len());
        self.instances.insert(index, instance);
    }

    pub(crate) fn remove(&mut self, id: InstanceId) -> Option<PluginInstance> {
        let index = self.instances.iter().position(|p| p.id() == id)?;
        Some(self.instances.remove(index))
    }

    pub(crate) fn clear(&mut self) -> Vec<PluginInstance> {
        std::mem::take(&mut self.instances)
    }

    /// Move the listed instances to the front in the given order.
    ///
    /// Unknown and repeated ids are skipped. Instances not listed keep their
    /// relative order after the listed ones. Returns whether the order changed.
    pub(crate) fn reorder(&mut self, order: &[InstanceId]) -> bool {
        let before = self.ids();
        let mut remaining = std::mem::take(&mut self.instances);
        let mut reordered = Vec::with_capacity(remaining.len());
        for id in order {
            if let Some(index) = remaining.iter().position(|p| p.id() == *id) {
                reordered.push(remaining.remove(index));
            }
        }
        reordered.append(&mut remaining);
        self.instances = reordered;
        self.ids() != before
    }

    /// Build the next immutable snapshot.
    pub(crate) fn snapshot(&mut self) -> ChainSnapshot {
        self.generation += 1;
        ChainSnapshot {
            generation: self.generation,
            master_bypass: self.master_bypass,
            instances: self
                .instances
                .iter()
                .map(|p| Arc::clone(&p.handle))
                .collect(),
        }
    }
}
