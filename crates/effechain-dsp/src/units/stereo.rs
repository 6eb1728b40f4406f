//! Two-channel imaging units. Each works on channels 0 and 1 and leaves any
//! further channels untouched; the engine bypasses them on mono blocks.

use effechain_core::{
    db_to_linear, Block, Geometry, ParamSnapshot, ParamSpec, Processor, RenderContext, UnitFault,
};

/// Attenuates one side; `bl` runs from full left (-1) to full right (1).
pub struct StereoBalance;

impl StereoBalance {
    const BL: usize = 0;
}

impl Processor for StereoBalance {
    type State = ();

    const TYPE_TAG: &'static str = "StereoBalancePlugin";
    const LABEL: &'static str = "Stereo Balance";
    const PARAMS: &'static [ParamSpec] = &[ParamSpec::float("bl", "Balance", -1.0, 1.0, 0.0)];
    const MIN_CHANNELS: usize = 2;

    fn init_state(&self, _: &Geometry, _: u64) {}

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        _: &mut (),
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        let balance = params.float(Self::BL);
        let left_gain = if balance <= 0.0 { 1.0 } else { 1.0 - balance };
        let right_gain = if balance >= 0.0 { 1.0 } else { 1.0 + balance };
        let (left, right) = block.stereo_mut();
        left.iter_mut().for_each(|s| *s *= left_gain);
        right.iter_mut().for_each(|s| *s *= right_gain);
        Ok(())
    }
}

/// Mid/side encoder and decoder.
///
/// Encode: `M = (L+R)/2`, `S = (L-R)/2`, each scaled by its gain, written to
/// channels 0 and 1. Decode: `L = M'+S'`, `R = M'-S'`. Swap exchanges left and
/// right before encoding or after decoding.
pub struct MsMatrix;

impl MsMatrix {
    const MD: usize = 0;
    const MG: usize = 1;
    const SG: usize = 2;
    const SW: usize = 3;
    const DECODE: i64 = 1;
}

impl Processor for MsMatrix {
    type State = ();

    const TYPE_TAG: &'static str = "MSMatrixPlugin";
    const LABEL: &'static str = "MS Matrix";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::choice("md", "Mode", &["Encode", "Decode"], 0),
        ParamSpec::float("mg", "Mid Gain", -18.0, 18.0, 0.0).with_unit("dB"),
        ParamSpec::float("sg", "Side Gain", -18.0, 18.0, 0.0).with_unit("dB"),
        ParamSpec::choice("sw", "Swap L/R", &["Off", "On"], 0),
    ];
    const MIN_CHANNELS: usize = 2;

    fn init_state(&self, _: &Geometry, _: u64) {}

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        _: &mut (),
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        let mid_gain = db_to_linear(params.float(Self::MG));
        let side_gain = db_to_linear(params.float(Self::SG));
        let swap = params.int(Self::SW) == 1;
        let (left, right) = block.stereo_mut();

        if params.int(Self::MD) == Self::DECODE {
            for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                let m = *l * mid_gain;
                let s = *r * side_gain;
                let (a, b) = (m + s, m - s);
                (*l, *r) = if swap { (b, a) } else { (a, b) };
            }
        } else {
            for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                let (a, b) = if swap { (*r, *l) } else { (*l, *r) };
                *l = (a + b) * 0.5 * mid_gain;
                *r = (a - b) * 0.5 * side_gain;
            }
        }
        Ok(())
    }
}

/// Bleeds each channel into the other at `am` dB, level-compensated.
pub struct Crosstalk;

impl Crosstalk {
    const AM: usize = 0;
}

impl Processor for Crosstalk {
    type State = ();

    const TYPE_TAG: &'static str = "CrosstalkPlugin";
    const LABEL: &'static str = "Crosstalk";
    const PARAMS: &'static [ParamSpec] =
        &[ParamSpec::float("am", "Amount", -96.0, 0.0, -12.0).with_unit("dB")];
    const MIN_CHANNELS: usize = 2;

    fn init_state(&self, _: &Geometry, _: u64) {}

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        _: &mut (),
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        let bleed = db_to_linear(params.float(Self::AM));
        let compensation = 1.0 / (1.0 + bleed);
        let (left, right) = block.stereo_mut();
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (a, b) = (*l, *r);
            *l = (a + b * bleed) * compensation;
            *r = (b + a * bleed) * compensation;
        }
        Ok(())
    }
}

/// Stereo width: 0 % collapses to mono, 100 % is unchanged, 200 % doubles
/// the side signal.
pub struct StereoBlend;

impl StereoBlend {
    const STEREO: usize = 0;
}

impl Processor for StereoBlend {
    type State = ();

    const TYPE_TAG: &'static str = "StereoBlendPlugin";
    const LABEL: &'static str = "Stereo Blend";
    const PARAMS: &'static [ParamSpec] =
        &[ParamSpec::float("stereo", "Stereo", 0.0, 200.0, 100.0).with_unit("%")];
    const MIN_CHANNELS: usize = 2;

    fn init_state(&self, _: &Geometry, _: u64) {}

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        _: &mut (),
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        let width = (params.float(Self::STEREO) - 100.0) / 100.0;
        let (left, right) = block.stereo_mut();
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mid = (*l + *r) * 0.5;
            let side = (*l - *r) * 0.5 * (1.0 + width);
            *l = mid + side;
            *r = mid - side;
        }
        Ok(())
    }
}
