//! Level and polarity units, plus the section marker.

use effechain_core::{
    db_to_linear, Block, Geometry, LinearRamp, ParamSnapshot, ParamSpec, Processor,
    RenderContext, UnitFault, UnitRole,
};

/// Duration of gain and offset glides.
const RAMP_SECS: f32 = 0.010;

/// Ramp created on the first block so the initial value applies at once.
#[derive(Debug)]
pub struct RampState {
    sample_rate: f32,
    ramp: Option<LinearRamp>,
}

impl RampState {
    fn new(geometry: &Geometry) -> Self {
        Self {
            sample_rate: geometry.sample_rate as f32,
            ramp: None,
        }
    }

    fn toward(&mut self, target: f32) -> &mut LinearRamp {
        let sample_rate = self.sample_rate;
        let ramp = self
            .ramp
            .get_or_insert_with(|| LinearRamp::new(target, RAMP_SECS, sample_rate));
        ramp.set_target(target);
        ramp
    }
}

/// Silence.
pub struct Mute;

impl Processor for Mute {
    type State = ();

    const TYPE_TAG: &'static str = "MutePlugin";
    const LABEL: &'static str = "Mute";
    const PARAMS: &'static [ParamSpec] = &[];

    fn init_state(&self, _: &Geometry, _: u64) {}

    fn process(
        &self,
        block: &mut Block,
        _: &ParamSnapshot,
        _: &mut (),
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        block.fill(0.0);
        Ok(())
    }
}

/// Gain in decibels.
pub struct Volume;

impl Volume {
    const VL: usize = 0;
}

impl Processor for Volume {
    type State = RampState;

    const TYPE_TAG: &'static str = "VolumePlugin";
    const LABEL: &'static str = "Volume";
    const PARAMS: &'static [ParamSpec] =
        &[ParamSpec::float("vl", "Volume", -60.0, 24.0, 0.0).with_unit("dB")];

    fn init_state(&self, geometry: &Geometry, _: u64) -> RampState {
        RampState::new(geometry)
    }

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        state: &mut RampState,
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        let ramp = state.toward(db_to_linear(params.float(Self::VL)));
        for channel in block.channels_mut() {
            ramp.apply_gain(channel);
        }
        ramp.advance(block.block_size());
        Ok(())
    }
}

/// Adds a constant to every sample.
pub struct DcOffset;

impl DcOffset {
    const OF: usize = 0;
}

impl Processor for DcOffset {
    type State = RampState;

    const TYPE_TAG: &'static str = "DCOffsetPlugin";
    const LABEL: &'static str = "DC Offset";
    const PARAMS: &'static [ParamSpec] = &[ParamSpec::float("of", "Offset", -1.0, 1.0, 0.0)];

    fn init_state(&self, geometry: &Geometry, _: u64) -> RampState {
        RampState::new(geometry)
    }

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        state: &mut RampState,
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        let ramp = state.toward(params.float(Self::OF));
        for channel in block.channels_mut() {
            ramp.apply_offset(channel);
        }
        ramp.advance(block.block_size());
        Ok(())
    }
}

/// Flips the sign of all channels, or of the left or right one only.
pub struct PolarityInversion;

impl PolarityInversion {
    const CH: usize = 0;
    const ALL: i64 = 0;
    const LEFT: i64 = 1;
    const RIGHT: i64 = 2;
}

impl Processor for PolarityInversion {
    type State = ();

    const TYPE_TAG: &'static str = "PolarityInversionPlugin";
    const LABEL: &'static str = "Polarity Inversion";
    const PARAMS: &'static [ParamSpec] =
        &[ParamSpec::choice("ch", "Channel", &["All", "Left", "Right"], 0)];

    fn init_state(&self, _: &Geometry, _: u64) {}

    fn process(
        &self,
        block: &mut Block,
        params: &ParamSnapshot,
        _: &mut (),
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        let target = match params.int(Self::CH) {
            Self::ALL => None,
            Self::LEFT => Some(0),
            Self::RIGHT => Some(1),
            _ => return Err(UnitFault::Failed("polarity channel out of range")),
        };
        match target {
            None => invert(block.samples_mut()),
            Some(c) if c < block.channels() => invert(block.channel_mut(c)),
            Some(_) => {}
        }
        Ok(())
    }
}

#[inline]
fn invert(samples: &mut [f32]) {
    samples.iter_mut().for_each(|s| *s = -*s);
}

/// Chain marker. Passes audio through; disabling it disables every
/// instance up to the next section.
pub struct Section;

impl Processor for Section {
    type State = ();

    const TYPE_TAG: &'static str = "SectionPlugin";
    const LABEL: &'static str = "Section";
    const PARAMS: &'static [ParamSpec] = &[ParamSpec::text("cm", "Comment", 256)];
    const ROLE: UnitRole = UnitRole::Section;

    fn init_state(&self, _: &Geometry, _: u64) {}

    fn process(
        &self,
        _: &mut Block,
        _: &ParamSnapshot,
        _: &mut (),
        _: &RenderContext<'_>,
    ) -> Result<(), UnitFault> {
        Ok(())
    }
}
