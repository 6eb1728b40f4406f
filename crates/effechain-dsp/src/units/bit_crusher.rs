//! Bit depth and sample rate reduction.

use effechain_core::{Block, Geometry, ParamSnapshot, ParamSpec, Processor, RenderContext, UnitFault};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Quantizes to `2^(bd-1)` levels per unit amplitude, with optional TPDF
/// dither, then holds each quantized sample for `round(sample_rate / zf)`
/// frames. The hold phase carries over block boundaries.
///
/// A nonzero `be` reconstructs each code through an R2R ladder whose bit
/// weights carry a fixed resistor error of up to `be` percent. The errors are
/// drawn per channel from `sd`, so equal seeds give equal ladders.
pub struct BitCrusher;

impl BitCrusher {
    const BD: usize = 0;
    const TD: usize = 1;
    const ZF: usize = 2;
    const BE: usize = 3;
    const SD: usize = 4;
}

const MAX_BITS: usize = 24;

/// Per-channel DAC weights, MSB first.
struct Ladder {
    weights: Vec<[f32; MAX_BITS]>,
    /// `(bd, be, sd)` the weights were drawn for.
    built_for: Option<(u32, f64, i64)>,
}

impl Ladder {
    fn new(channels: usize) -> Self {
        Self {
            weights: vec![[0.0; MAX_BITS]; channels],
            built_for: None,
        }
    }

    fn rebuild(&mut self, bits: u32, error_percent: f64, sd: i64) {
        let key = (bits, error_percent, sd);
        if self.built_for == Some(key) {
            return;
        }
        let spread = (error_percent / 100.0) as f32;
        for (channel, weights) in self.weights.iter_mut().enumerate() {
            let mut rng = SmallRng::seed_from_u64((sd as u64).wrapping_add(channel as u64));
            let mut ideal = 0.5f32;
            for weight in weights.iter_mut().take(bits as usize) {
                let error = rng.gen_range(-1.0f32..=1.0) * spread;
                *weight = ideal * (1.0 + error);
                ideal *= 0.5;
            }
        }
        self.built_for = Some(key);
    }

    /// Decode the bipolar quantized value `q` through `channel`'s ladder.
    fn convert(&self, channel: usize, q: f32, bits: u32) -> f32 {
        let full = ((1u32 << bits) - 1) as f32;
        let code = (((q + 1.0) * 0.5 * full).round() as u32).min((1u32 << bits) - 1);
        let weights = &self.weights[channel];
        let mut out = 0.0f32;
        for bit in 0..bits {
            if code & (1 << (bits - 1 - bit)) != 0 {
                out += weights[bit as usize];
            }
        }
        let ideal_full_scale = 1.0 - 0.5f32.powi(bits as i32);
        out / ideal_full_scale * 2.0 - 1.0
    }
}

pub struct BitCrusherState {
    sample_rate: f64,
    /// Frames since the last captured sample.
    phase: usize,
    held: Vec<f32>,
    ladder: Ladder,
    instance_seed: u64,
    /// `sd` the generator was last seeded with.
    seeded_with: Option<i64>,
    rng: SmallRng,
}

impl BitCrusherState {
    fn reseed(&mut self, sd: i64) {
        if self.seeded_with != Some(sd) {
            self.rng = SmallRng::seed_from_u64(self.instance_seed ^ sd as u64);
            self.seeded_with = Some(sd);
        }
    }
}

impl Processor for BitCrusher {
    type State = BitCrusherState;

    const TYPE_TAG: &'static str = "BitCrusherPlugin";
    const LABEL: &'static str = "Bit Crusher";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::int("bd", "Bit Depth", 4, 24, 8).with_unit("bits"),
        ParamSpec::toggle("td", "TPDF Dither", false),
        ParamSpec::float("zf", "ZOH Frequency", 4000.0, 96000.0, 44100.0)
            .with_step(100.0)
            .with_unit("Hz"),
        ParamSpec::float("be", "Bit Error", 0.0, 10.0, 0.0)
            .with_step(0.01)
            .with_unit("%"),
        ParamSpec::int("sd", "Seed", 0, 1000, 11),
    ];

    fn init_state(&self, geometry: &Geometry, seed: u64) -> BitCrusherState {
        BitCrusherState {
            sample_rate: geometry.sample_rate,
            phase: 0,
            held: vec![0.0; geometry.channels],
            ladder: Ladder::new(geometry.channels),
            instance_seed: seed,
            seeded_with: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        state: &mut BitCrusherState,
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        if state.held.len() != block.channels() {
            return Err(UnitFault::Failed("channel count changed without reset"));
        }
        let sd = params.int(Self::SD);
        state.reseed(sd);

        let bits = params.int(Self::BD).clamp(4, MAX_BITS as i64) as u32;
        let levels = (1u32 << (bits - 1)) as f32;
        let bit_error = params.double(Self::BE);
        let ladder = bit_error > 0.0;
        if ladder {
            state.ladder.rebuild(bits, bit_error, sd);
        }
        let dither = params.flag(Self::TD);
        let hold = ((state.sample_rate / params.double(Self::ZF)).round() as usize).max(1);
        if state.phase >= hold {
            state.phase = 0;
        }

        let BitCrusherState {
            phase,
            held,
            ladder: dac,
            rng,
            ..
        } = state;
        let start = *phase;
        for (index, (channel, last)) in block.channels_mut().zip(held.iter_mut()).enumerate() {
            let mut frame_phase = start;
            for sample in channel {
                if frame_phase == 0 {
                    let mut x = *sample * levels;
                    if dither {
                        x += rng.gen::<f32>() - rng.gen::<f32>();
                    }
                    *last = (x.round() / levels).clamp(-1.0, 1.0);
                    if ladder {
                        *last = dac.convert(index, *last, bits);
                    }
                }
                *sample = *last;
                frame_phase += 1;
                if frame_phase == hold {
                    frame_phase = 0;
                }
            }
        }
        *phase = (start + block.block_size()) % hold;
        Ok(())
    }
}
