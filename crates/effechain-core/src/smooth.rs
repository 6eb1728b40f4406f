//! Linear parameter ramps for click-free gain and offset changes.
//!
//! ```
//! use effechain_core::LinearRamp;
//!
//! // 10 ms ramp at 48 kHz, starting settled at unity
//! let mut gain = LinearRamp::new(1.0, 0.010, 48000.0);
//! gain.set_target(0.5);
//!
//! let mut buffer = [1.0f32; 64];
//! gain.apply_gain(&mut buffer);
//! assert!(buffer[63] < 1.0 && buffer[63] > 0.5);
//! ```

/// Value that glides linearly toward its target over a fixed duration.
///
/// A ramp is created settled on its initial value, so the first block after
/// state creation applies the parameter immediately.
#[derive(Debug, Clone)]
pub struct LinearRamp {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
    ramp_samples: u32,
}

impl LinearRamp {
    pub fn new(initial: f32, ramp_secs: f32, sample_rate: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            remaining: 0,
            ramp_samples: (ramp_secs * sample_rate).max(1.0) as u32,
        }
    }

    /// Retarget; restarts the full ramp duration from the current value.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.remaining = self.ramp_samples;
        self.step = (target - self.current) / self.ramp_samples as f32;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.current = if self.remaining == 0 {
                self.target
            } else {
                self.current + self.step
            };
        }
        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }

    /// Advance `frames` samples without producing output.
    #[inline]
    pub fn advance(&mut self, frames: usize) {
        let n = (frames as u32).min(self.remaining);
        self.remaining -= n;
        self.current = if self.remaining == 0 {
            self.target
        } else {
            self.current + self.step * n as f32
        };
    }

    /// Multiply a channel by the ramp. Each call walks the ramp from the same
    /// starting point, so call [`advance`](Self::advance) once per block after
    /// the last channel.
    #[inline]
    pub fn apply_gain(&self, buffer: &mut [f32]) {
        if !self.is_ramping() {
            let g = self.current;
            buffer.iter_mut().for_each(|s| *s *= g);
            return;
        }
        let mut walker = self.clone();
        for sample in buffer.iter_mut() {
            *sample *= walker.next_sample();
        }
    }

    /// Add the ramp to a channel; same walking rules as [`apply_gain`](Self::apply_gain).
    #[inline]
    pub fn apply_offset(&self, buffer: &mut [f32]) {
        if !self.is_ramping() {
            let o = self.current;
            buffer.iter_mut().for_each(|s| *s += o);
            return;
        }
        let mut walker = self.clone();
        for sample in buffer.iter_mut() {
            *sample += walker.next_sample();
        }
    }
}
