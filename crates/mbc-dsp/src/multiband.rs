//! Three-band compressor
//!
//! ```text
//!            ┌──────────────┐ low  ┌─────────┐  ┌────────┐  ┌──────┐
//!  in ─ trim ┤ LR4 lowMid   ├──────┤ allpass ├──┤ comp L ├──┤ mute ├─┐
//!            │              │ rest ┌─────────┐ mid ┌────────┐ ┌──────┐│
//!            └──────────────┘──────┤ LR4     ├─────┤ comp M ├─┤ mute ├┤
//!                                  │ midHigh │ high┌────────┐ ┌──────┐│
//!                                  └─────────┘─────┤ comp H ├─┤ mute ├┤
//!                                                  └────────┘ └──────┘│
//!  out ─ bypass crossfade (dry / wet) ─ trim ─ Σ ─────────────────────┘
//! ```
//!
//! The low band goes through an allpass at the mid/high cutoff so all three
//! bands carry the same phase rotation and sum magnitude-flat.
//!
//! Processing is frame-major: every smoother advances once per frame and the
//! resulting values are shared by all channels of that frame.

use log::{debug, trace, warn};
use mbc_core::{
    Band, MbcError, MbcResult, ParameterSnapshot, Sample, db_to_gain, keys,
};

use crate::Processor;
use crate::compressor::{BandCompressor, BandSettings};
use crate::crossover::{LinkwitzRiley, PhaseCompensator};
use crate::smoothing::{LogRamp, SmoothedValue};

// ============ Parameters ============

/// One band's validated parameters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandParams {
    pub settings: BandSettings,
    pub mute: bool,
}

/// Every parameter of the processor, validated
///
/// Plain `Copy` data: building it is the only fallible step, so a bad
/// snapshot is rejected before any processing state is touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultibandParams {
    pub sample_rate: f32,
    pub block_size: usize,
    pub channels: usize,
    pub bands: [BandParams; 3],
    pub low_mid_cut: f32,
    pub mid_high_cut: f32,
    pub input_db: f32,
    pub output_db: f32,
    pub bypass: bool,
}

impl MultibandParams {
    /// Validate a snapshot
    pub fn from_snapshot(snapshot: &ParameterSnapshot) -> MbcResult<Self> {
        let sample_rate = snapshot.get(keys::SAMPLE_RATE)?;
        if sample_rate <= 0.0 {
            return Err(MbcError::InvalidSampleRate(sample_rate));
        }

        let channels = snapshot.get(keys::N_CHANNELS)?;
        if channels < 1.0 || channels.fract() != 0.0 {
            return Err(MbcError::InvalidChannelCount(channels));
        }

        let block_size = snapshot.get(keys::BLOCK_SIZE)?;
        if block_size < 0.0 {
            return Err(MbcError::InvalidParam(format!(
                "{} must not be negative: {block_size}",
                keys::BLOCK_SIZE
            )));
        }

        let mut bands = [BandParams::default(); 3];
        for band in Band::ALL {
            let keys = band.keys();
            bands[band.index()] = BandParams {
                settings: BandSettings {
                    threshold_db: snapshot.get(keys.threshold)?,
                    ratio: snapshot.get(keys.ratio)?,
                    attack_ms: snapshot.get(keys.attack)?,
                    release_ms: snapshot.get(keys.release)?,
                    input_db: snapshot.get(keys.input)?,
                    output_db: snapshot.get(keys.output)?,
                },
                mute: snapshot.get_flag(keys.mute)?,
            };
        }

        let params = Self {
            sample_rate,
            block_size: block_size as usize,
            channels: channels as usize,
            bands,
            low_mid_cut: snapshot.get(keys::LOW_MID_CUT)?,
            mid_high_cut: snapshot.get(keys::MID_HIGH_CUT)?,
            input_db: snapshot.get(keys::INPUT_ALL)?,
            output_db: snapshot.get(keys::OUTPUT_ALL)?,
            bypass: snapshot.get_flag(keys::BYPASS)?,
        };

        if params.low_mid_cut >= params.mid_high_cut {
            warn!(
                "Crossover cutoffs out of order ({} Hz >= {} Hz); bands will overlap",
                params.low_mid_cut, params.mid_high_cut
            );
        }

        Ok(params)
    }

    #[inline]
    pub fn band(&self, band: Band) -> &BandParams {
        &self.bands[band.index()]
    }

    /// Whether `other` needs a new prepare (stream format differs)
    pub fn format_differs(&self, other: &MultibandParams) -> bool {
        self.sample_rate != other.sample_rate || self.channels != other.channels
    }
}

#[inline]
fn mute_gain(mute: bool) -> f32 {
    if mute { 0.0 } else { 1.0 }
}

// ============ Multi-band Compressor ============

/// Three-band compressor with smoothed controls, band mute and bypass
#[derive(Debug, Clone, Default)]
pub struct MultibandCompressor {
    params: Option<MultibandParams>,

    input_gain: SmoothedValue,
    output_gain: SmoothedValue,
    low_mid_cut: SmoothedValue,
    mid_high_cut: SmoothedValue,

    low_mid: LinkwitzRiley,
    mid_high: LinkwitzRiley,
    compensator: PhaseCompensator,

    bands: [BandCompressor; 3],
    mutes: [LogRamp; 3],
    bypass: LogRamp,
}

impl MultibandCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `snapshot`, size all state, and seed every smoother at rest
    ///
    /// On error nothing is changed.
    pub fn prepare(&mut self, snapshot: &ParameterSnapshot) -> MbcResult<()> {
        let params = MultibandParams::from_snapshot(snapshot)?;
        self.prepare_params(&params);
        Ok(())
    }

    /// Size all state for `params` and seed every smoother at rest
    pub fn prepare_params(&mut self, params: &MultibandParams) {
        let sr = params.sample_rate;
        let channels = params.channels;

        self.input_gain.prepare(sr, db_to_gain(params.input_db));
        self.output_gain.prepare(sr, db_to_gain(params.output_db));
        self.low_mid_cut.prepare(sr, params.low_mid_cut);
        self.mid_high_cut.prepare(sr, params.mid_high_cut);

        self.low_mid.prepare(sr, params.block_size, channels);
        self.mid_high.prepare(sr, params.block_size, channels);
        self.compensator.prepare(sr, channels);
        self.low_mid.set_frequency(params.low_mid_cut);
        self.mid_high.set_frequency(params.mid_high_cut);
        self.compensator.set_frequency(params.mid_high_cut);

        for band in Band::ALL {
            let band_params = params.band(band);
            let i = band.index();
            self.bands[i].prepare(sr, channels, &band_params.settings);
            self.mutes[i].prepare(sr, mute_gain(band_params.mute));
        }
        self.bypass.prepare(sr, if params.bypass { 1.0 } else { 0.0 });

        self.params = Some(*params);

        debug!(
            "Multiband compressor prepared: {} Hz, {} channels, block {}, cuts {}/{} Hz",
            sr, channels, params.block_size, params.low_mid_cut, params.mid_high_cut
        );
    }

    /// Validate `snapshot` and re-target every smoother
    ///
    /// Never reallocates or resets running state. Stream format changes in
    /// the snapshot are ignored until the next prepare. Before prepare this
    /// only validates.
    pub fn update(&mut self, snapshot: &ParameterSnapshot) -> MbcResult<()> {
        let params = MultibandParams::from_snapshot(snapshot)?;

        if let Some(current) = &self.params {
            if current.format_differs(&params) {
                warn!(
                    "Stream format change ({} Hz, {} ch) needs prepare; keeping {} Hz, {} ch",
                    params.sample_rate, params.channels, current.sample_rate, current.channels
                );
            }
        }
        trace!("Multiband compressor update: {params:?}");

        self.apply_params(&params);
        Ok(())
    }

    /// Re-target every smoother from already validated params
    ///
    /// Allocation-free; safe to call from the audio thread.
    pub fn apply_params(&mut self, params: &MultibandParams) {
        let Some(current) = self.params.as_mut() else {
            return;
        };

        self.input_gain.set_value(db_to_gain(params.input_db));
        self.output_gain.set_value(db_to_gain(params.output_db));
        self.low_mid_cut.set_value(params.low_mid_cut);
        self.mid_high_cut.set_value(params.mid_high_cut);

        for band in Band::ALL {
            let band_params = params.band(band);
            let i = band.index();
            self.bands[i].update(&band_params.settings);
            self.mutes[i].set_value(mute_gain(band_params.mute));
        }
        self.bypass.set_value(if params.bypass { 1.0 } else { 0.0 });

        // Stream format stays as prepared
        *current = MultibandParams {
            sample_rate: current.sample_rate,
            block_size: current.block_size,
            channels: current.channels,
            ..*params
        };
    }

    /// Process a block in place
    ///
    /// The frame count is the shortest prepared channel. Channels beyond the
    /// prepared count are left untouched. Does nothing before prepare.
    pub fn process_block(&mut self, channels: &mut [&mut [Sample]]) {
        let Some(params) = &self.params else {
            return;
        };
        let active = channels.len().min(params.channels);
        let channels = &mut channels[..active];
        let frames = channels.iter().map(|ch| ch.len()).min().unwrap_or(0);

        for frame in 0..frames {
            let input_gain = self.input_gain.next();
            let output_gain = self.output_gain.next();

            let low_mid_cut = self.low_mid_cut.next();
            let mid_high_cut = self.mid_high_cut.next();
            self.low_mid.set_frequency(low_mid_cut);
            self.mid_high.set_frequency(mid_high_cut);
            self.compensator.set_frequency(mid_high_cut);

            for band in &mut self.bands {
                band.tick();
            }
            let mutes = [
                self.mutes[0].next_gain(),
                self.mutes[1].next_gain(),
                self.mutes[2].next_gain(),
            ];
            let bypass = self.bypass.next_gain();

            for (ch, samples) in channels.iter_mut().enumerate() {
                let dry = samples[frame];

                let (low, rest) = self.low_mid.process_sample(ch, dry * input_gain);
                let (mid, high) = self.mid_high.process_sample(ch, rest);
                let low = self.compensator.process_sample(ch, low);

                let low = self.bands[0].process_sample(ch, low) * mutes[0];
                let mid = self.bands[1].process_sample(ch, mid) * mutes[1];
                let high = self.bands[2].process_sample(ch, high) * mutes[2];

                let wet = (low + mid + high) * output_gain;
                samples[frame] = dry * bypass + wet * (1.0 - bypass);
            }
        }
    }

    #[inline]
    pub fn is_prepared(&self) -> bool {
        self.params.is_some()
    }

    /// Parameters currently targeted
    pub fn params(&self) -> Option<&MultibandParams> {
        self.params.as_ref()
    }

    /// Running gain reduction of one band/channel in dB
    pub fn gain_reduction_db(&self, band: Band, channel: usize) -> f32 {
        self.bands[band.index()].gain_reduction_db(channel)
    }

    /// Current gain of a band's mute ramp (1 = audible)
    pub fn mute_gain(&self, band: Band) -> f32 {
        self.mutes[band.index()].read()
    }

    /// Current bypass crossfade position (1 = fully dry)
    pub fn bypass_mix(&self) -> f32 {
        self.bypass.read()
    }
}

impl Processor for MultibandCompressor {
    fn reset(&mut self) {
        self.low_mid.reset();
        self.mid_high.reset();
        self.compensator.reset();
        for band in &mut self.bands {
            band.reset();
        }
    }
}

// ============ Tests ============
