//! Offline render pipeline
//!
//! Drives a [`MultibandProcessor`] over a whole buffer the way a host would:
//! the processor is prepared once from the preset, automation events are
//! published through the parameter handoff, and audio runs in blocks.
//! Blocks are split at event positions so every change lands on the frame
//! it was scheduled for.

use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info};
use mbc_core::{Decibels, Sample, gain_to_db};
use mbc_dsp::MultibandProcessor;

use crate::config::{OfflineConfig, Preset};
use crate::decoder::WavDecoder;
use crate::encoder::WavEncoder;
use crate::error::{OfflineError, OfflineResult};

// ═══════════════════════════════════════════════════════════════════════════════
// AUDIO BUFFER
// ═══════════════════════════════════════════════════════════════════════════════

/// Planar audio buffer
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// One vector per channel, all the same length
    pub channels: Vec<Vec<Sample>>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Silent buffer
    pub fn new(num_channels: usize, frames: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; num_channels],
            sample_rate,
        }
    }

    /// Split interleaved samples into channels (a trailing partial frame is dropped)
    pub fn from_interleaved(samples: &[Sample], num_channels: usize, sample_rate: u32) -> Self {
        if num_channels == 0 {
            return Self {
                channels: Vec::new(),
                sample_rate,
            };
        }

        let frames = samples.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self {
            channels,
            sample_rate,
        }
    }

    pub fn to_interleaved(&self) -> Vec<Sample> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.num_channels());
        for frame in 0..frames {
            out.extend(self.channels.iter().map(|channel| channel[frame]));
        }
        out
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (shortest channel)
    pub fn frames(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / self.sample_rate as f64
        }
    }

    /// Absolute peak across all channels
    pub fn peak(&self) -> Sample {
        self.channels
            .iter()
            .flatten()
            .fold(0.0, |peak: Sample, &s| peak.max(s.abs()))
    }

    pub fn peak_db(&self) -> Decibels {
        Decibels(gain_to_db(self.peak()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDER STATS
// ═══════════════════════════════════════════════════════════════════════════════

/// Summary of a finished render
#[derive(Debug, Clone)]
pub struct RenderStats {
    pub frames: usize,
    pub channels: usize,
    pub sample_rate: u32,
    /// Blocks handed to the processor, including event splits
    pub blocks: usize,
    pub automation_events: usize,
    pub input_peak: Decibels,
    pub output_peak: Decibels,
    pub elapsed: Duration,
}

impl RenderStats {
    /// Audio seconds rendered per wall-clock second
    pub fn realtime_factor(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 || self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64 / secs
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDER PIPELINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Renders audio through the multiband compressor
#[derive(Debug, Clone, Default)]
pub struct RenderPipeline {
    config: OfflineConfig,
    preset: Preset,
}

impl RenderPipeline {
    pub fn new(config: OfflineConfig, preset: Preset) -> Self {
        Self { config, preset }
    }

    pub fn config(&self) -> &OfflineConfig {
        &self.config
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// Process `buffer` in place
    pub fn render_buffer(&self, buffer: &mut AudioBuffer) -> OfflineResult<RenderStats> {
        self.config.validate()?;

        let start = Instant::now();
        let num_channels = buffer.num_channels();
        let frames = buffer.frames();
        let sample_rate = buffer.sample_rate;
        let input_peak = buffer.peak_db();

        let mut snapshot = self
            .preset
            .snapshot(sample_rate as f32, self.config.block_size, num_channels);

        let mut processor = MultibandProcessor::new();
        processor.prepare(&snapshot)?;
        processor.set_non_realtime(self.config.non_realtime);
        let handoff = processor.handoff();

        let events = self.preset.sorted_automation();
        let event_frames: Vec<usize> = events
            .iter()
            .map(|event| (event.at_seconds * sample_rate as f64).round() as usize)
            .collect();

        let mut next_event = 0;
        let mut blocks = 0;
        let mut pos = 0;

        while pos < frames {
            let mut changed = false;
            while next_event < events.len() && event_frames[next_event] <= pos {
                let event = &events[next_event];
                debug!(
                    "Automation at frame {}: {} = {}",
                    pos, event.param, event.value
                );
                snapshot.set_known(&event.param, event.value)?;
                next_event += 1;
                changed = true;
            }
            if changed {
                handoff.publish(&snapshot)?;
            }

            let mut end = (pos + self.config.block_size).min(frames);
            if let Some(&at) = event_frames.get(next_event) {
                end = end.min(at);
            }

            let mut block: Vec<&mut [Sample]> = buffer
                .channels
                .iter_mut()
                .map(|channel| &mut channel[pos..end])
                .collect();
            processor.process_block(&mut block);

            blocks += 1;
            pos = end;
        }

        let stats = RenderStats {
            frames,
            channels: num_channels,
            sample_rate,
            blocks,
            automation_events: next_event,
            input_peak,
            output_peak: buffer.peak_db(),
            elapsed: start.elapsed(),
        };

        info!(
            "Rendered {} frames x {} ch @ {} Hz in {} blocks ({:.1}x realtime), peak {:.2} -> {:.2} dBFS",
            stats.frames,
            stats.channels,
            stats.sample_rate,
            stats.blocks,
            stats.realtime_factor(),
            stats.input_peak.0,
            stats.output_peak.0
        );

        Ok(stats)
    }

    /// Read a WAV file, render it, and write the result
    pub fn render_file(&self, input: &Path, output: &Path) -> OfflineResult<RenderStats> {
        if input == output {
            return Err(OfflineError::InvalidConfig(format!(
                "refusing to overwrite input {}",
                input.display()
            )));
        }

        let mut buffer = WavDecoder::decode(input)?;
        info!(
            "Loaded {}: {} ch, {} Hz, {:.2} s",
            input.display(),
            buffer.num_channels(),
            buffer.sample_rate,
            buffer.duration()
        );

        let stats = self.render_buffer(&mut buffer)?;
        WavEncoder::new(self.config.output_format).write(&buffer, output)?;
        info!("Wrote {}", output.display());

        Ok(stats)
    }
}
