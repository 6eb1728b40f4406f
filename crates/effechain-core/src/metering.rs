//! Render-thread load and health counters.

use crate::lockfree::{AtomicFlag, AtomicFloat};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

/// Point-in-time copy of [`RenderMeter`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderMetrics {
    pub blocks: u64,
    /// Percent of the block deadline used by the last block.
    pub current: f32,
    pub peak: f32,
    pub average: f32,
    /// Blocks that took longer than their deadline.
    pub overruns: u64,
    pub faults: u64,
    /// Diagnostic events lost because the event channel was full.
    pub dropped_events: u64,
    /// Retired states released on the render thread because the controller
    /// did not collect in time.
    pub dropped_discards: u64,
}

/// Lock-free render statistics, written by the renderer and read anywhere.
///
/// Block counts, faults and dropped events are always counted. Load timing
/// reads the clock twice per block and is off until [`enable`](Self::enable).
#[derive(Debug, Default)]
pub struct RenderMeter {
    blocks: AtomicU64,
    current: AtomicFloat,
    peak: AtomicFloat,
    average: AtomicFloat,
    samples: AtomicU32,
    overruns: AtomicU64,
    faults: AtomicU64,
    dropped_events: AtomicU64,
    dropped_discards: AtomicU64,
    timing: AtomicFlag,
}

impl RenderMeter {
    pub fn enable(&self) {
        self.timing.set(true);
    }

    pub fn disable(&self) {
        self.timing.set(false);
    }

    pub fn is_enabled(&self) -> bool {
        self.timing.get()
    }

    #[inline]
    pub(crate) fn count_block(&self) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn count_fault(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn count_dropped_event(&self) {
        self.dropped_events.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn count_dropped_discard(&self) {
        self.dropped_discards.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how long a block of `frames` took against its real-time deadline.
    pub(crate) fn record(&self, frames: usize, sample_rate: f64, elapsed: Duration) {
        let deadline = frames as f64 / sample_rate;
        if deadline <= 0.0 {
            return;
        }
        let load = (elapsed.as_secs_f64() / deadline) as f32;

        self.current.set(load);
        self.peak.fetch_max(load);

        // Exponential moving average, warming up over the first 100 blocks
        let count = self.samples.fetch_add(1, Ordering::Relaxed);
        let alpha = 1.0 / (count.min(100) + 1) as f32;
        let avg = self.average.get();
        self.average.set(avg * (1.0 - alpha) + load * alpha);

        if load > 1.0 {
            self.overruns.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn metrics(&self) -> RenderMetrics {
        RenderMetrics {
            blocks: self.blocks.load(Ordering::Relaxed),
            current: self.current.get() * 100.0,
            peak: self.peak.get() * 100.0,
            average: self.average.get() * 100.0,
            overruns: self.overruns.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
            dropped_events: self.dropped_events.load(Ordering::Relaxed),
            dropped_discards: self.dropped_discards.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.current.set(0.0);
        self.peak.set(0.0);
        self.average.set(0.0);
        self.samples.store(0, Ordering::Relaxed);
        self.overruns.store(0, Ordering::Relaxed);
    }
}
