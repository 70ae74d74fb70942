//! mbc-core: Shared types, parameter layout, and errors for the multiband compressor
//!
//! This crate provides the foundational types used across the mbc crates:
//! - `Sample` and the dB / time conversion helpers used by every processor
//! - `ParameterSnapshot`, the named parameter set handed to the DSP layer
//! - the automatable parameter layout (ranges, defaults, choice lists)
//! - `MbcError` / `MbcResult`

mod error;
mod params;
mod sample;
mod snapshot;

pub use error::*;
pub use params::*;
pub use sample::*;
pub use snapshot::*;

/// Decibel value wrapper
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Decibels(pub f32);

impl Decibels {
    pub const ZERO: Self = Self(0.0);

    /// Level of the silence floor (-120 dB)
    pub const FLOOR: Self = Self(-120.0);

    #[inline]
    pub fn from_gain(gain: f32) -> Self {
        Self(gain_to_db(gain))
    }

    #[inline]
    pub fn to_gain(self) -> f32 {
        db_to_gain(self.0)
    }
}

impl Default for Decibels {
    fn default() -> Self {
        Self::ZERO
    }
}
