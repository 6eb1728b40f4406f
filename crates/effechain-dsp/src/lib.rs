//! Built-in effect units: gain and polarity, stereo imaging, bit crushing,
//! harmonic saturation and tremolo, plus the section marker.
//!
//! Every unit implements [`effechain_core::Processor`]. [`builtin_registry`]
//! returns a registry with all of them; [`UnitKind`] enumerates them by
//! wire-format tag.

mod error;
pub use error::{Error, Result};

pub mod biquad;

mod units;
pub use units::{
    builtin_registry, register_builtin_units, BitCrusher, Crosstalk, DcOffset,
    HarmonicDistortion, MsMatrix, Mute, PolarityInversion, Section, StereoBalance, StereoBlend,
    Tremolo, UnitKind, Volume,
};
