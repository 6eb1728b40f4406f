//! Plugin instances: a unit plus its parameters, identity and fault flag.

use crate::lockfree::AtomicFlag;
use crate::snapshot::{ParamSnapshot, ParameterStore};
use crate::unit::{Unit, UnitRole};
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stable identity of an instance for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) u64);

impl InstanceId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The part of an instance shared with the render plane.
///
/// Reachable from published chain snapshots. Parameters are read through
/// [`params`](Self::params) once per block; the fault flag and the reset
/// generation are the only values the two planes both write.
pub struct InstanceHandle {
    id: InstanceId,
    unit: Arc<dyn Unit>,
    seed: u64,
    params: ArcSwap<ParamSnapshot>,
    faulted: AtomicFlag,
    reset_generation: AtomicU64,
}

impl InstanceHandle {
    pub(crate) fn new(id: InstanceId, unit: Arc<dyn Unit>, seed: u64, params: ParamSnapshot) -> Self {
        Self {
            id,
            unit,
            seed,
            params: ArcSwap::from_pointee(params),
            faulted: AtomicFlag::new(false),
            reset_generation: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    #[inline]
    pub fn unit(&self) -> &dyn Unit {
        &*self.unit
    }

    #[inline]
    pub fn role(&self) -> UnitRole {
        self.unit.role()
    }

    /// Seed handed to the unit whenever its private state is created.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn params(&self) -> &ArcSwap<ParamSnapshot> {
        &self.params
    }

    #[inline]
    pub fn is_faulted(&self) -> bool {
        self.faulted.get()
    }

    #[inline]
    pub(crate) fn mark_faulted(&self) {
        self.faulted.set(true);
    }

    #[inline]
    pub(crate) fn reset_generation(&self) -> u64 {
        self.reset_generation.load(Ordering::Acquire)
    }

    /// Clear the fault flag and ask the renderer for fresh private state.
    pub(crate) fn request_reset(&self) {
        self.reset_generation.fetch_add(1, Ordering::AcqRel);
        self.faulted.set(false);
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHandle")
            .field("id", &self.id)
            .field("type", &self.unit.type_tag())
            .field("faulted", &self.is_faulted())
            .finish()
    }
}

/// Control-plane view of an instance: the shared handle plus the live store.
#[derive(Debug)]
pub(crate) struct PluginInstance {
    pub(crate) handle: Arc<InstanceHandle>,
    pub(crate) store: ParameterStore,
}

impl PluginInstance {
    pub(crate) fn with_store(
        id: InstanceId,
        unit: Arc<dyn Unit>,
        seed: u64,
        store: ParameterStore,
    ) -> Self {
        let handle = InstanceHandle::new(id, unit, seed, store.snapshot());
        Self {
            handle: Arc::new(handle),
            store,
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> InstanceId {
        self.handle.id
    }

    pub(crate) fn type_tag(&self) -> &'static str {
        self.handle.unit.type_tag()
    }

    /// Swap in a snapshot of the store; returns the one it replaced.
    pub(crate) fn publish(&self) -> Arc<ParamSnapshot> {
        self.handle.params.swap(Arc::new(self.store.snapshot()))
    }
}

/// Derive an instance seed from the engine seed.
pub(crate) fn instance_seed(engine_seed: u64, id: InstanceId) -> u64 {
    // splitmix64 finalizer
    let mut z = engine_seed ^ id.0.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
