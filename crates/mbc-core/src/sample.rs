//! Sample type and unit conversions

/// Type alias for audio samples (f32, full scale is ±1.0)
pub type Sample = f32;

/// Smallest gain used anywhere a ratio or logarithm is taken (-120 dB)
pub const SILENCE: f32 = 0.000_001;

/// Convert decibels to linear gain
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear gain (or sample magnitude) to decibels
///
/// The magnitude is floored at [`SILENCE`], so zero maps to -120 dB
/// instead of negative infinity.
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.abs().max(SILENCE).log10()
}

/// Length of a duration in samples
#[inline]
pub fn ms_to_samples(time_ms: f32, sample_rate: f32) -> f32 {
    time_ms * 0.001 * sample_rate
}

/// One-pole ballistics coefficient for a time constant
///
/// `exp(-1 / samples)`; a time shorter than one sample gives 0 (instant).
#[inline]
pub fn ms_to_coefficient(time_ms: f32, sample_rate: f32) -> f32 {
    let samples = ms_to_samples(time_ms, sample_rate);
    if samples <= 0.0 {
        0.0
    } else {
        (-1.0 / samples).exp()
    }
}
