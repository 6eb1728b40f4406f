//! Static polynomial waveshaper.

use effechain_core::{Block, Geometry, ParamSnapshot, ParamSpec, Processor, RenderContext, UnitFault};

/// Adds 2nd to 5th harmonics with independent amounts.
///
/// The input is scaled by the sensitivity `sn`, shaped by
/// `y = x + a2 x^2 + a3 x^3 + a4 x^4 + a5 x^5` with `a_n = -h_n / 100`, and
/// scaled back by `1 / sn`.
pub struct HarmonicDistortion;

impl HarmonicDistortion {
    const H2: usize = 0;
    const SN: usize = 4;
}

impl Processor for HarmonicDistortion {
    type State = ();

    const TYPE_TAG: &'static str = "HarmonicDistortionPlugin";
    const LABEL: &'static str = "Harmonic Distortion";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::float("h2", "2nd Harm", -30.0, 30.0, 2.0).with_unit("%"),
        ParamSpec::float("h3", "3rd Harm", -30.0, 30.0, 3.0).with_unit("%"),
        ParamSpec::float("h4", "4th Harm", -30.0, 30.0, 0.5).with_unit("%"),
        ParamSpec::float("h5", "5th Harm", -30.0, 30.0, 0.3).with_unit("%"),
        ParamSpec::float("sn", "Sensitivity", 0.1, 2.0, 0.5).with_unit("x"),
    ];

    fn init_state(&self, _: &Geometry, _: u64) {}

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        _: &mut (),
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        let [a2, a3, a4, a5] =
            std::array::from_fn(|n| -params.float(Self::H2 + n) * 0.01);
        let sensitivity = params.float(Self::SN);
        let makeup = 1.0 / sensitivity;

        for s in block.samples_mut() {
            let x = *s * sensitivity;
            let x2 = x * x;
            let x3 = x2 * x;
            let x4 = x2 * x2;
            let x5 = x4 * x;
            *s = (x + a2 * x2 + a3 * x3 + a4 * x4 + a5 * x5) * makeup;
        }
        Ok(())
    }
}
