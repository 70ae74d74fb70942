//! Biquad filter using Transposed Direct Form II
//!
//! Coefficients follow the RBJ audio EQ cookbook. State and coefficients are
//! kept in f64; the crossover runs several sections in series and the extra
//! precision keeps low cutoffs quiet.

use mbc_core::Sample;
use std::f64::consts::PI;

use crate::{MonoProcessor, Processor};

/// Butterworth section Q (1/√2)
pub const BUTTERWORTH_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Normalized biquad coefficients (a0 = 1)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// Shared RBJ prototype terms
struct Prototype {
    cos_omega: f64,
    alpha: f64,
}

impl Prototype {
    fn new(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        Self {
            cos_omega: omega.cos(),
            alpha: omega.sin() / (2.0 * q),
        }
    }

    fn normalize(&self, b0: f64, b1: f64, b2: f64) -> BiquadCoeffs {
        let a0 = 1.0 + self.alpha;
        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * self.cos_omega / a0,
            a2: (1.0 - self.alpha) / a0,
        }
    }
}

impl BiquadCoeffs {
    /// Second-order lowpass
    pub fn lowpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let p = Prototype::new(freq, q, sample_rate);
        let b1 = 1.0 - p.cos_omega;
        p.normalize(b1 / 2.0, b1, b1 / 2.0)
    }

    /// Second-order highpass
    pub fn highpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let p = Prototype::new(freq, q, sample_rate);
        let b0 = (1.0 + p.cos_omega) / 2.0;
        p.normalize(b0, -(1.0 + p.cos_omega), b0)
    }

    /// Second-order allpass (unity magnitude, 360° phase turn around `freq`)
    pub fn allpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let p = Prototype::new(freq, q, sample_rate);
        p.normalize(1.0 - p.alpha, -2.0 * p.cos_omega, 1.0 + p.alpha)
    }

    /// Unity gain, no filtering
    pub fn bypass() -> Self {
        Self {
            b0: 1.0,
            ..Self::default()
        }
    }
}

/// Transposed Direct Form II biquad filter
#[derive(Debug, Clone)]
pub struct BiquadTDF2 {
    coeffs: BiquadCoeffs,
    z1: f64,
    z2: f64,
}

impl Default for BiquadTDF2 {
    fn default() -> Self {
        Self::with_coeffs(BiquadCoeffs::bypass())
    }
}

impl BiquadTDF2 {
    pub fn with_coeffs(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Replace coefficients, keeping the filter memory
    #[inline]
    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    #[inline]
    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    #[inline(always)]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }
}

impl Processor for BiquadTDF2 {
    fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

impl MonoProcessor for BiquadTDF2 {
    #[inline(always)]
    fn process_sample(&mut self, input: Sample) -> Sample {
        self.process(input as f64) as Sample
    }
}
