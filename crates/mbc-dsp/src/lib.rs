//! mbc-dsp: DSP processors for the multiband compressor
//!
//! Real-time safe: nothing reachable from `process_block` allocates or
//! blocks.
//!
//! ## Modules
//! - `smoothing` - one-pole parameter smoothing and logarithmic gain ramps
//! - `biquad` - TDF-II biquad sections (lowpass, highpass, allpass)
//! - `crossover` - Linkwitz-Riley LR4 split and phase compensation
//! - `compressor` - hard-knee single-band compressor
//! - `multiband` - three-band orchestrator with mute and bypass crossfades
//! - `handoff` - lock-free-on-read parameter cell (control → audio)
//! - `processor` - realtime boundary tying the handoff to the orchestrator

pub mod biquad;
pub mod compressor;
pub mod crossover;
pub mod handoff;
pub mod multiband;
pub mod processor;
pub mod smoothing;

pub use compressor::{BandCompressor, BandSettings};
pub use crossover::{LinkwitzRiley, PhaseCompensator};
pub use handoff::ParameterHandoff;
pub use multiband::{BandParams, MultibandCompressor, MultibandParams};
pub use processor::MultibandProcessor;
pub use smoothing::{LogRamp, OnePole, SmoothedValue};

pub use mbc_core::Band;

use mbc_core::Sample;

/// Trait for all DSP processors
pub trait Processor: Send + Sync {
    /// Clear filter memory and running gain state
    fn reset(&mut self);

    /// Get latency in samples
    fn latency(&self) -> usize {
        0
    }
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;

    /// Process a block of samples
    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}
