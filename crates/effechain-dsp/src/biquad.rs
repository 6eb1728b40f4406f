//! Second-order IIR section, transposed direct form II.

use std::f64::consts::PI;

/// Normalized biquad coefficients (`a0 == 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Identity filter.
    pub const PASS_THROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// RBJ cookbook low-pass.
    ///
    /// Falls back to [`PASS_THROUGH`](Self::PASS_THROUGH) when the cutoff is
    /// not strictly between 0 and Nyquist or the coefficients would be
    /// degenerate.
    pub fn lowpass(cutoff: f64, q: f64, sample_rate: f64) -> Self {
        if !(cutoff > 0.0 && cutoff < sample_rate / 2.0) {
            return Self::PASS_THROUGH;
        }
        let omega = 2.0 * PI * cutoff / sample_rate;
        let (sin, cos) = omega.sin_cos();
        let alpha = sin / (2.0 * q);
        if !(alpha > 0.0 && alpha.is_finite()) {
            return Self::PASS_THROUGH;
        }
        let a0_inv = 1.0 / (1.0 + alpha);
        let b1 = 1.0 - cos;
        Self {
            b0: b1 * 0.5 * a0_inv,
            b1: b1 * a0_inv,
            b2: b1 * 0.5 * a0_inv,
            a1: -2.0 * cos * a0_inv,
            a2: (1.0 - alpha) * a0_inv,
        }
    }
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::PASS_THROUGH
    }
}

/// Filter memory for one signal path.
#[derive(Debug, Clone, Copy, Default)]
pub struct Biquad {
    z1: f64,
    z2: f64,
}

impl Biquad {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn tick(&mut self, c: &BiquadCoeffs, x: f64) -> f64 {
        let y = c.b0 * x + self.z1;
        self.z1 = c.b1 * x - c.a1 * y + self.z2;
        self.z2 = c.b2 * x - c.a2 * y;
        y
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}
