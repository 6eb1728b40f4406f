//! Test helpers and fixtures for effechain integration tests
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (pass-through, unity gain)
//! - `DSP_EPSILON` (1e-4): DSP processing (matrix round trips)
//! - `PERCEPTUAL_EPSILON` (0.001): Perceptual equivalence (-60dB)
//! - `SILENCE_THRESHOLD` (0.0001): Silence detection (-80dB)


use effechain::prelude::*;

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Standard block size for deterministic testing
pub const TEST_BLOCK_SIZE: usize = 128;

/// Fixed seed so randomised units repeat between runs
pub const TEST_SEED: u64 = 0xA11CE;

/// Create a test engine with every built-in unit.
pub fn test_engine() -> Engine {
    effechain::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .block_size(TEST_BLOCK_SIZE)
        .seed(TEST_SEED)
        .build()
        .expect("Failed to create test engine")
}

/// Append a unit and apply parameters given as JSON.
pub fn add_with(controller: &Controller, type_tag: &str, params: serde_json::Value) -> InstanceId {
    let id = controller.add(type_tag).expect("unit type registered");
    if let serde_json::Value::Object(map) = params {
        controller.apply(id, &map);
    }
    id
}

/// Two-channel block from left and right slices.
pub fn stereo(left: &[f32], right: &[f32]) -> Block {
    Block::from_channels(&[left, right]).expect("equal channel lengths")
}

pub fn mono(samples: &[f32]) -> Block {
    Block::from_channels(&[samples]).expect("one channel")
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Generate white noise (random samples in -1..1).
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}

/// Stereo noise block with decorrelated channels.
pub fn noise_block(block_size: usize, seed: u64) -> Block {
    stereo(
        &generate_noise(block_size, seed),
        &generate_noise(block_size, seed.wrapping_add(1)),
    )
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Result of comparing two audio buffers.
#[derive(Debug, Clone)]
pub struct AudioComparisonResult {
    /// Whether all samples are within tolerance.
    pub equal: bool,
    /// Maximum absolute difference between any two samples.
    pub max_diff: f32,
    /// Index of first sample that exceeds tolerance (if any).
    pub first_diff_sample: Option<usize>,
    /// Number of samples that exceed tolerance.
    pub num_diffs: usize,
}

/// Compare two audio buffers with epsilon tolerance.
pub fn compare_audio(a: &[f32], b: &[f32], epsilon: f32) -> AudioComparisonResult {
    if a.len() != b.len() {
        return AudioComparisonResult {
            equal: false,
            max_diff: f32::MAX,
            first_diff_sample: Some(0),
            num_diffs: std::cmp::max(a.len(), b.len()),
        };
    }

    let mut max_diff: f32 = 0.0;
    let mut first_diff: Option<usize> = None;
    let mut num_diffs = 0;

    for (i, (&x, &y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        max_diff = max_diff.max(diff);
        if diff > epsilon {
            num_diffs += 1;
            if first_diff.is_none() {
                first_diff = Some(i);
            }
        }
    }

    AudioComparisonResult {
        equal: num_diffs == 0,
        max_diff,
        first_diff_sample: first_diff,
        num_diffs,
    }
}

/// Assert two signals are equal within tolerance, with detailed error message.
pub fn assert_signals_equal(a: &[f32], b: &[f32], epsilon: f32, context: &str) {
    let result = compare_audio(a, b, epsilon);
    assert!(
        result.equal,
        "{}: Signals differ - first diff at sample {:?}, max_diff={:.6}, num_diffs={}",
        context,
        result.first_diff_sample,
        result.max_diff,
        result.num_diffs
    );
}

/// Assert signal is silent within threshold.
pub fn assert_is_silent(samples: &[f32], threshold: f32, context: &str) {
    let max_val = peak(samples);
    assert!(
        max_val <= threshold,
        "{}: Expected silence (threshold {}), but peak was {}",
        context,
        threshold,
        max_val
    );
}

/// Assert signal is NOT silent (has content above threshold).
pub fn assert_not_silent(samples: &[f32], min_peak: f32, context: &str) {
    let max_val = peak(samples);
    assert!(
        max_val >= min_peak,
        "{}: Expected audio (min_peak {}), but peak was only {}",
        context,
        min_peak,
        max_val
    );
}
