//! Single-band compressor
//!
//! Hard-knee, feed-forward, no lookahead. Detection is per sample on the
//! trimmed input magnitude; the gain computer's target gain is then smoothed
//! by asymmetric one-pole ballistics. Each channel carries its own running
//! gain reduction (unlinked).
//!
//! Every control feeding the signal path is a [`SmoothedValue`]; the caller
//! advances them once per frame with [`BandCompressor::tick`] and then runs
//! [`BandCompressor::process_sample`] for each channel of that frame.

use mbc_core::{Sample, db_to_gain, gain_to_db, ms_to_coefficient};

use crate::Processor;
use crate::smoothing::SmoothedValue;

/// Compressor controls in user units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSettings {
    pub threshold_db: f32,
    /// Compression ratio; values below 1 act as 1
    pub ratio: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
    pub input_db: f32,
    pub output_db: f32,
}

impl Default for BandSettings {
    fn default() -> Self {
        Self {
            threshold_db: 0.0,
            ratio: 3.0,
            attack_ms: 50.0,
            release_ms: 250.0,
            input_db: 0.0,
            output_db: 0.0,
        }
    }
}

/// Smoothed control values for the current frame
#[derive(Debug, Clone, Copy)]
struct FrameControls {
    threshold_db: f32,
    ratio: f32,
    attack_coeff: f32,
    release_coeff: f32,
    input_gain: f32,
    output_gain: f32,
}

impl Default for FrameControls {
    fn default() -> Self {
        Self {
            threshold_db: 0.0,
            ratio: 1.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            input_gain: 1.0,
            output_gain: 1.0,
        }
    }
}

/// One band's compressor
#[derive(Debug, Clone, Default)]
pub struct BandCompressor {
    sample_rate: f32,
    threshold: SmoothedValue,
    ratio: SmoothedValue,
    attack_coeff: SmoothedValue,
    release_coeff: SmoothedValue,
    input_gain: SmoothedValue,
    output_gain: SmoothedValue,
    frame: FrameControls,
    /// Running gain reduction per channel (linear, 1.0 = none)
    gain_reduction: Vec<f32>,
}

impl BandCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size per-channel state and seed every control at rest
    pub fn prepare(&mut self, sample_rate: f32, channels: usize, settings: &BandSettings) {
        self.sample_rate = sample_rate;

        self.threshold.prepare(sample_rate, settings.threshold_db);
        self.ratio.prepare(sample_rate, settings.ratio);
        self.attack_coeff
            .prepare(sample_rate, ms_to_coefficient(settings.attack_ms, sample_rate));
        self.release_coeff
            .prepare(sample_rate, ms_to_coefficient(settings.release_ms, sample_rate));
        self.input_gain.prepare(sample_rate, db_to_gain(settings.input_db));
        self.output_gain.prepare(sample_rate, db_to_gain(settings.output_db));

        self.frame = self.read_controls();
        self.gain_reduction = vec![1.0; channels];
    }

    /// Re-target the smoothed controls; running state is kept
    pub fn update(&mut self, settings: &BandSettings) {
        self.threshold.set_value(settings.threshold_db);
        self.ratio.set_value(settings.ratio);
        self.attack_coeff
            .set_value(ms_to_coefficient(settings.attack_ms, self.sample_rate));
        self.release_coeff
            .set_value(ms_to_coefficient(settings.release_ms, self.sample_rate));
        self.input_gain.set_value(db_to_gain(settings.input_db));
        self.output_gain.set_value(db_to_gain(settings.output_db));
    }

    /// Advance every smoothed control by one frame
    #[inline]
    pub fn tick(&mut self) {
        self.frame = FrameControls {
            threshold_db: self.threshold.next(),
            ratio: self.ratio.next().max(1.0),
            attack_coeff: self.attack_coeff.next(),
            release_coeff: self.release_coeff.next(),
            input_gain: self.input_gain.next(),
            output_gain: self.output_gain.next(),
        };
    }

    fn read_controls(&self) -> FrameControls {
        FrameControls {
            threshold_db: self.threshold.read(),
            ratio: self.ratio.read().max(1.0),
            attack_coeff: self.attack_coeff.read(),
            release_coeff: self.release_coeff.read(),
            input_gain: self.input_gain.read(),
            output_gain: self.output_gain.read(),
        }
    }

    /// Compress one sample of `channel` using the current frame's controls
    #[inline(always)]
    pub fn process_sample(&mut self, channel: usize, input: Sample) -> Sample {
        let controls = self.frame;
        let Some(gain_reduction) = self.gain_reduction.get_mut(channel) else {
            return input;
        };

        let x = input * controls.input_gain;
        let level_db = gain_to_db(x);

        let target = if level_db > controls.threshold_db {
            let excess = level_db - controls.threshold_db;
            db_to_gain(controls.threshold_db + excess / controls.ratio - level_db)
        } else {
            1.0
        };

        let current = *gain_reduction;
        let coeff = if target < current {
            controls.attack_coeff
        } else {
            controls.release_coeff
        };
        if target != current {
            *gain_reduction = target + coeff * (current - target);
        }

        x * *gain_reduction * controls.output_gain
    }

    /// Running gain reduction of `channel` in dB (0 = none, negative = reducing)
    pub fn gain_reduction_db(&self, channel: usize) -> f32 {
        self.gain_reduction
            .get(channel)
            .map_or(0.0, |&gain| gain_to_db(gain))
    }

    pub fn num_channels(&self) -> usize {
        self.gain_reduction.len()
    }
}

impl Processor for BandCompressor {
    fn reset(&mut self) {
        self.gain_reduction.fill(1.0);
    }
}
