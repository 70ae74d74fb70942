//! Click-free parameter smoothing
//!
//! Two smoothers cover every control that feeds the signal path:
//! - [`SmoothedValue`]: one-pole low-pass for continuous controls
//!   (thresholds, ratios, trims, ballistics coefficients)
//! - [`LogRamp`]: multiplicative gain ramp for on/off gains (band mute,
//!   bypass crossfade), constant speed in dB
//!
//! Both are owned by the audio thread. Re-targeting never allocates and
//! never resets the current output, so a new target only bends the
//! trajectory.

use mbc_core::{SILENCE, ms_to_samples};
use std::f64::consts::PI;

/// Corner frequency of continuous parameter smoothing
pub const DEFAULT_SMOOTHING_HZ: f64 = 0.5;

/// Default mute/bypass ramp times
pub const DEFAULT_RAMP_ATTACK_MS: f32 = 150.0;
pub const DEFAULT_RAMP_RELEASE_MS: f32 = 150.0;

// ============ One-pole ============

/// One-pole low-pass: `y = (1 - b)·x + b·y`, `b = exp(-2π·fc/fs)`
#[derive(Debug, Clone, Copy)]
pub struct OnePole {
    b: f64,
    y: f64,
}

impl Default for OnePole {
    fn default() -> Self {
        Self { b: 0.0, y: 0.0 }
    }
}

impl OnePole {
    pub fn set_frequency(&mut self, frequency: f64, sample_rate: f64) {
        self.b = if sample_rate > 0.0 {
            (-2.0 * PI * frequency / sample_rate).exp()
        } else {
            0.0
        };
    }

    /// Jump the filter state to `value`
    #[inline]
    pub fn reset(&mut self, value: f64) {
        self.y = value;
    }

    #[inline(always)]
    pub fn process(&mut self, x: f64) -> f64 {
        self.y = (1.0 - self.b) * x + self.b * self.y;
        self.y
    }

    #[inline]
    pub fn output(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn coefficient(&self) -> f64 {
        self.b
    }
}

// ============ Smoothed Value ============

/// Smoothed continuous parameter
#[derive(Debug, Clone, Copy)]
pub struct SmoothedValue {
    filter: OnePole,
    frequency: f64,
    target: f64,
}

impl Default for SmoothedValue {
    fn default() -> Self {
        Self::with_frequency(DEFAULT_SMOOTHING_HZ)
    }
}

impl SmoothedValue {
    /// Smoother with a non-default corner frequency
    pub fn with_frequency(frequency: f64) -> Self {
        Self {
            filter: OnePole::default(),
            frequency,
            target: 0.0,
        }
    }

    /// Seed state and target to `initial` at the given sample rate (no ramp)
    pub fn prepare(&mut self, sample_rate: f32, initial: f32) {
        self.filter.set_frequency(self.frequency, sample_rate as f64);
        self.filter.reset(initial as f64);
        self.target = initial as f64;
    }

    /// Change the target; the output keeps moving from where it is
    #[inline]
    pub fn set_value(&mut self, value: f32) {
        self.target = value as f64;
    }

    /// Advance one sample
    #[inline(always)]
    pub fn next(&mut self) -> f32 {
        self.filter.process(self.target) as f32
    }

    /// Last output, without advancing
    #[inline]
    pub fn read(&self) -> f32 {
        self.filter.output() as f32
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target as f32
    }
}

// ============ Logarithmic Ramp ============

/// Multiplicative gain ramp
///
/// Moves from the current gain to the target at a fixed number of dB per
/// sample, so a fade covers the same time regardless of depth. Gains are
/// floored at [`SILENCE`]; [`next_gain`](Self::next_gain) reports the floor
/// as exact zero.
#[derive(Debug, Clone, Copy)]
pub struct LogRamp {
    attack_ms: f32,
    release_ms: f32,
    sample_rate: f32,
    current: f64,
    target: f64,
    step: f64,
    ramp_samples: usize,
}

impl Default for LogRamp {
    fn default() -> Self {
        Self::new(DEFAULT_RAMP_ATTACK_MS, DEFAULT_RAMP_RELEASE_MS)
    }
}

impl LogRamp {
    pub fn new(attack_ms: f32, release_ms: f32) -> Self {
        Self {
            attack_ms,
            release_ms,
            sample_rate: 0.0,
            current: 1.0,
            target: 1.0,
            step: 1.0,
            ramp_samples: 0,
        }
    }

    /// Seed current and target to `value` (no ramp)
    pub fn prepare(&mut self, sample_rate: f32, value: f32) {
        self.sample_rate = sample_rate;
        self.current = (value as f64).max(SILENCE as f64);
        self.target = self.current;
        self.step = 1.0;
        self.ramp_samples = 0;
    }

    /// Start a ramp toward `value`
    ///
    /// Falling ramps take the release time, rising ramps the attack time.
    /// Re-sending the current target leaves the ramp untouched.
    pub fn set_value(&mut self, value: f32) {
        let target = (value as f64).max(SILENCE as f64);
        if target == self.target {
            return;
        }
        self.target = target;

        if target == self.current {
            self.step = 1.0;
            self.ramp_samples = 0;
            return;
        }

        let time_ms = if target < self.current {
            self.release_ms
        } else {
            self.attack_ms
        };
        let length = ms_to_samples(time_ms, self.sample_rate).round().max(1.0) as f64;

        self.ramp_samples = length as usize;
        self.step = (target / self.current).powf(1.0 / length);
    }

    /// Advance one sample
    #[inline(always)]
    pub fn next(&mut self) -> f32 {
        if self.current != self.target {
            self.current *= self.step;
            let crossed = if self.step > 1.0 {
                self.current >= self.target
            } else {
                self.current <= self.target
            };
            if crossed {
                self.current = self.target;
                self.step = 1.0;
            }
        }
        self.current as f32
    }

    /// Advance one sample, reporting a ramp resting at the floor as zero
    #[inline(always)]
    pub fn next_gain(&mut self) -> f32 {
        let gain = self.next();
        if self.is_silent() { 0.0 } else { gain }
    }

    /// Current gain, without advancing
    #[inline]
    pub fn read(&self) -> f32 {
        self.current as f32
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target as f32
    }

    /// Length of the most recent ramp in samples
    #[inline]
    pub fn ramp_samples(&self) -> usize {
        self.ramp_samples
    }

    /// Per-sample multiplier of the running ramp (1.0 when settled)
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.current != self.target
    }

    #[inline]
    fn is_silent(&self) -> bool {
        self.current <= SILENCE as f64 && !self.is_ramping()
    }
}

// ============ Tests ============
