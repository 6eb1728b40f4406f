//! Built-in units and the closed set of kinds the crate ships.

mod basic;
mod bit_crusher;
mod harmonic;
mod stereo;
mod tremolo;

pub use basic::{DcOffset, Mute, PolarityInversion, Section, Volume};
pub use bit_crusher::BitCrusher;
pub use harmonic::HarmonicDistortion;
pub use stereo::{Crosstalk, MsMatrix, StereoBalance, StereoBlend};
pub use tremolo::Tremolo;

use crate::error::{Error, Result};
use effechain_core::{Processor, Unit, UnitRegistry};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Every built-in unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Mute,
    Volume,
    PolarityInversion,
    StereoBalance,
    DcOffset,
    BitCrusher,
    MsMatrix,
    Crosstalk,
    StereoBlend,
    HarmonicDistortion,
    Tremolo,
    Section,
}

impl UnitKind {
    pub const ALL: [UnitKind; 12] = [
        UnitKind::Mute,
        UnitKind::Volume,
        UnitKind::PolarityInversion,
        UnitKind::StereoBalance,
        UnitKind::DcOffset,
        UnitKind::BitCrusher,
        UnitKind::MsMatrix,
        UnitKind::Crosstalk,
        UnitKind::StereoBlend,
        UnitKind::HarmonicDistortion,
        UnitKind::Tremolo,
        UnitKind::Section,
    ];

    /// Wire-format `type` tag.
    pub fn tag(self) -> &'static str {
        match self {
            UnitKind::Mute => Mute::TYPE_TAG,
            UnitKind::Volume => Volume::TYPE_TAG,
            UnitKind::PolarityInversion => PolarityInversion::TYPE_TAG,
            UnitKind::StereoBalance => StereoBalance::TYPE_TAG,
            UnitKind::DcOffset => DcOffset::TYPE_TAG,
            UnitKind::BitCrusher => BitCrusher::TYPE_TAG,
            UnitKind::MsMatrix => MsMatrix::TYPE_TAG,
            UnitKind::Crosstalk => Crosstalk::TYPE_TAG,
            UnitKind::StereoBlend => StereoBlend::TYPE_TAG,
            UnitKind::HarmonicDistortion => HarmonicDistortion::TYPE_TAG,
            UnitKind::Tremolo => Tremolo::TYPE_TAG,
            UnitKind::Section => Section::TYPE_TAG,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn instantiate(self) -> Arc<dyn Unit> {
        match self {
            UnitKind::Mute => Arc::new(Mute),
            UnitKind::Volume => Arc::new(Volume),
            UnitKind::PolarityInversion => Arc::new(PolarityInversion),
            UnitKind::StereoBalance => Arc::new(StereoBalance),
            UnitKind::DcOffset => Arc::new(DcOffset),
            UnitKind::BitCrusher => Arc::new(BitCrusher),
            UnitKind::MsMatrix => Arc::new(MsMatrix),
            UnitKind::Crosstalk => Arc::new(Crosstalk),
            UnitKind::StereoBlend => Arc::new(StereoBlend),
            UnitKind::HarmonicDistortion => Arc::new(HarmonicDistortion),
            UnitKind::Tremolo => Arc::new(Tremolo),
            UnitKind::Section => Arc::new(Section),
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for UnitKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s).ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

/// Add every built-in unit to `registry`.
pub fn register_builtin_units(registry: &mut UnitRegistry) {
    for kind in UnitKind::ALL {
        registry.register_arc(kind.instantiate());
    }
}

/// A registry holding exactly the built-in units.
pub fn builtin_registry() -> UnitRegistry {
    let mut registry = UnitRegistry::new();
    register_builtin_units(&mut registry);
    registry
}
