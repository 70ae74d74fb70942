//! Linkwitz-Riley crossover
//!
//! An LR4 split is two cascaded Butterworth sections per side. The low and
//! high outputs are 180° apart in phase at every frequency once summed, which
//! makes `low + high` a second-order allpass: flat magnitude, rotated phase.
//!
//! Splitting one output again (three bands) leaves the untouched branch
//! without the second split's phase rotation. [`PhaseCompensator`] applies
//! that same allpass to the untouched branch so the three bands sum flat.

use mbc_core::Sample;

use crate::Processor;
use crate::biquad::{BUTTERWORTH_Q, BiquadCoeffs, BiquadTDF2};

/// Lowest frequency a crossover is designed at
pub const MIN_CUTOFF_HZ: f32 = 10.0;

/// Highest design frequency as a fraction of the sample rate
const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Clamp a requested cutoff into the stable design range
#[inline]
fn design_frequency(frequency: f32, sample_rate: f32) -> f64 {
    let max = (sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ);
    frequency.clamp(MIN_CUTOFF_HZ, max) as f64
}

// ============ Linkwitz-Riley ============

#[derive(Debug, Clone, Default)]
struct SplitState {
    lowpass: [BiquadTDF2; 2],
    highpass: [BiquadTDF2; 2],
}

impl SplitState {
    #[inline(always)]
    fn split(&mut self, input: f64) -> (f64, f64) {
        let stage = self.lowpass[0].process(input);
        let low = self.lowpass[1].process(stage);
        let stage = self.highpass[0].process(input);
        let high = self.highpass[1].process(stage);
        (low, high)
    }

    fn set_coeffs(&mut self, lowpass: BiquadCoeffs, highpass: BiquadCoeffs) {
        for stage in &mut self.lowpass {
            stage.set_coeffs(lowpass);
        }
        for stage in &mut self.highpass {
            stage.set_coeffs(highpass);
        }
    }

    fn reset(&mut self) {
        self.lowpass.iter_mut().chain(self.highpass.iter_mut()).for_each(Processor::reset);
    }
}

/// 24 dB/oct Linkwitz-Riley two-way split, one filter state per channel
#[derive(Debug, Clone)]
pub struct LinkwitzRiley {
    sample_rate: f32,
    block_size: usize,
    frequency: f32,
    channels: Vec<SplitState>,
}

impl Default for LinkwitzRiley {
    fn default() -> Self {
        Self {
            sample_rate: 0.0,
            block_size: 0,
            frequency: f32::NAN,
            channels: Vec::new(),
        }
    }
}

impl LinkwitzRiley {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate per-channel state; coefficients are designed by the next
    /// [`set_frequency`](Self::set_frequency)
    pub fn prepare(&mut self, sample_rate: f32, block_size: usize, channels: usize) {
        self.sample_rate = sample_rate;
        self.block_size = block_size;
        self.frequency = f32::NAN;
        self.channels = vec![SplitState::default(); channels];
    }

    /// Redesign at `frequency` if it differs from the current cutoff
    pub fn set_frequency(&mut self, frequency: f32) {
        if frequency == self.frequency {
            return;
        }
        self.frequency = frequency;

        let design = design_frequency(frequency, self.sample_rate);
        let sample_rate = self.sample_rate as f64;
        let lowpass = BiquadCoeffs::lowpass(design, BUTTERWORTH_Q, sample_rate);
        let highpass = BiquadCoeffs::highpass(design, BUTTERWORTH_Q, sample_rate);

        for state in &mut self.channels {
            state.set_coeffs(lowpass, highpass);
        }
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Block size given at prepare
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Split one sample of `channel` into (low, high)
    #[inline(always)]
    pub fn process_sample(&mut self, channel: usize, input: Sample) -> (Sample, Sample) {
        match self.channels.get_mut(channel) {
            Some(state) => {
                let (low, high) = state.split(input as f64);
                (low as Sample, high as Sample)
            }
            None => (input, 0.0),
        }
    }
}

impl Processor for LinkwitzRiley {
    fn reset(&mut self) {
        self.channels.iter_mut().for_each(SplitState::reset);
    }
}

// ============ Phase Compensator ============

/// Allpass matching the phase of an LR4 split at the same frequency
#[derive(Debug, Clone)]
pub struct PhaseCompensator {
    sample_rate: f32,
    frequency: f32,
    channels: Vec<BiquadTDF2>,
}

impl Default for PhaseCompensator {
    fn default() -> Self {
        Self {
            sample_rate: 0.0,
            frequency: f32::NAN,
            channels: Vec::new(),
        }
    }
}

impl PhaseCompensator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepare(&mut self, sample_rate: f32, channels: usize) {
        self.sample_rate = sample_rate;
        self.frequency = f32::NAN;
        self.channels = vec![BiquadTDF2::default(); channels];
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        if frequency == self.frequency {
            return;
        }
        self.frequency = frequency;

        let design = design_frequency(frequency, self.sample_rate);
        let coeffs = BiquadCoeffs::allpass(design, BUTTERWORTH_Q, self.sample_rate as f64);
        for stage in &mut self.channels {
            stage.set_coeffs(coeffs);
        }
    }

    #[inline(always)]
    pub fn process_sample(&mut self, channel: usize, input: Sample) -> Sample {
        match self.channels.get_mut(channel) {
            Some(stage) => stage.process(input as f64) as Sample,
            None => input,
        }
    }
}

impl Processor for PhaseCompensator {
    fn reset(&mut self) {
        self.channels.iter_mut().for_each(Processor::reset);
    }
}
