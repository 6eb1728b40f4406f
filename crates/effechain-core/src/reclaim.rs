//! Deferred reclamation of replaced snapshots.
//!
//! Every publish bumps the published epoch and parks the replaced snapshot
//! tagged with the new value. The renderer reads the epoch before loading
//! anything at block start and acknowledges it once the block is done. A
//! parked snapshot tagged `e` is unreachable from the renderer once the
//! acknowledged epoch reaches `e`, so the controller can drop it without the
//! renderer ever releasing the last reference.

use crate::chain::ChainSnapshot;
use crate::snapshot::ParamSnapshot;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Published and acknowledged epochs shared by both planes.
#[derive(Debug, Default)]
pub(crate) struct Epochs {
    published: AtomicU64,
    rendered: AtomicU64,
}

impl Epochs {
    /// Called after a new snapshot is stored. Returns the tag for the old one.
    pub(crate) fn advance(&self) -> u64 {
        self.published.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn begin_block(&self) -> u64 {
        self.published.load(Ordering::SeqCst)
    }

    pub(crate) fn end_block(&self, epoch: u64) {
        self.rendered.store(epoch, Ordering::SeqCst);
    }

    /// The renderer is gone; nothing it held can still be in use.
    pub(crate) fn release_all(&self) {
        self.rendered.store(u64::MAX, Ordering::SeqCst);
    }

    pub(crate) fn rendered(&self) -> u64 {
        self.rendered.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub(crate) enum Retired {
    Chain(Arc<ChainSnapshot>),
    Params(Arc<ParamSnapshot>),
}

/// Control-plane list of parked snapshots.
#[derive(Debug, Default)]
pub(crate) struct Reclaimer {
    parked: Vec<(u64, Retired)>,
}

impl Reclaimer {
    pub(crate) fn retire(&mut self, epoch: u64, item: Retired) {
        self.parked.push((epoch, item));
    }

    /// Drop everything the renderer can no longer see. Returns how many.
    pub(crate) fn collect(&mut self, rendered: u64) -> usize {
        let before = self.parked.len();
        self.parked.retain(|(epoch, _)| *epoch > rendered);
        before - self.parked.len()
    }

    pub(crate) fn pending(&self) -> usize {
        self.parked.len()
    }
}
