//! Amplitude modulation with filtered random drift.
//!
//! ```text
//!   phase ──► sin ──┐
//!                   ├──► dB = -dp*(1-sin)/2 - 2*rn*noise ──► gain = 10^(dB/20)
//!   noise ─► LPF ──┘         (noise = cs*common + (1-cs)*channel)
//! ```

use crate::biquad::{Biquad, BiquadCoeffs};
use effechain_core::{Block, Geometry, ParamSnapshot, ParamSpec, Processor, RenderContext, UnitFault};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{FRAC_1_SQRT_2, TAU};

/// Tremolo whose depth follows a sine LFO plus low-passed noise.
///
/// One noise source is shared by all channels and each channel has its own;
/// `cs` blends between them. `cp` offsets the LFO phase per channel index.
pub struct Tremolo;

impl Tremolo {
    const RT: usize = 0;
    const DP: usize = 1;
    const RN: usize = 2;
    const RC: usize = 3;
    const RS: usize = 4;
    const CP: usize = 5;
    const CS: usize = 6;

    const MIN_Q: f64 = 0.01;

    /// Slope in dB maps to Q: -6 gives Butterworth, each 6 dB is a decade.
    fn slope_to_q(slope_db: f64) -> f64 {
        (10f64.powf((slope_db + 6.0) / 6.0) * FRAC_1_SQRT_2).max(Self::MIN_Q)
    }
}

pub struct TremoloState {
    phase: f64,
    common: Biquad,
    channels: Vec<Biquad>,
    rng: SmallRng,
}

impl Processor for Tremolo {
    type State = TremoloState;

    const TYPE_TAG: &'static str = "TremoloPlugin";
    const LABEL: &'static str = "Tremolo";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::float("rt", "Rate", 0.1, 20.0, 10.0).with_unit("Hz"),
        ParamSpec::float("dp", "Depth", 0.0, 12.0, 2.0).with_unit("dB"),
        ParamSpec::float("rn", "Randomness", 0.0, 96.0, 6.0).with_unit("dB"),
        ParamSpec::float("rc", "Randomness Cutoff", 1.0, 1000.0, 200.0).with_unit("Hz"),
        ParamSpec::float("rs", "Randomness Slope", -12.0, 0.0, -6.0).with_unit("dB"),
        ParamSpec::float("cp", "Channel Phase", -180.0, 180.0, 0.0).with_unit("deg"),
        ParamSpec::float("cs", "Channel Sync", 0.0, 100.0, 100.0).with_unit("%"),
    ];

    fn init_state(&self, geometry: &Geometry, seed: u64) -> TremoloState {
        TremoloState {
            phase: 0.0,
            common: Biquad::new(),
            channels: vec![Biquad::new(); geometry.channels],
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        state: &mut TremoloState,
        ctx: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        let channels = block.channels();
        if state.channels.len() != channels {
            return Err(UnitFault::Failed("channel count changed without reset"));
        }
        let sample_rate = ctx.sample_rate();
        let coeffs = BiquadCoeffs::lowpass(
            params.double(Self::RC),
            Self::slope_to_q(params.double(Self::RS)),
            sample_rate,
        );
        let increment = TAU * params.double(Self::RT) / sample_rate;
        let channel_phase = params.double(Self::CP).to_radians();
        let sync = params.double(Self::CS) * 0.01;
        let depth = params.double(Self::DP);
        let randomness = params.double(Self::RN);

        let block_size = block.block_size();
        let samples = block.samples_mut();
        let TremoloState {
            phase,
            common,
            channels: filters,
            rng,
        } = state;

        for i in 0..block_size {
            *phase += increment;
            if *phase >= TAU {
                *phase -= TAU;
            }
            let shared = common.tick(&coeffs, rng.gen::<f64>() - 0.5);

            for (c, filter) in filters.iter_mut().enumerate() {
                let own = filter.tick(&coeffs, rng.gen::<f64>() - 0.5);
                let noise = sync * shared + (1.0 - sync) * own;
                let lfo = (1.0 - (*phase + c as f64 * channel_phase).sin()) * 0.5;
                let db = -depth * lfo - 2.0 * randomness * noise;
                samples[c * block_size + i] *= 10f64.powf(db / 20.0) as f32;
            }
        }
        Ok(())
    }
}
