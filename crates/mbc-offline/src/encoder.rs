//! WAV encoding via hound

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use mbc_core::Sample;

use crate::config::WavFormat;
use crate::error::{OfflineError, OfflineResult};
use crate::pipeline::AudioBuffer;

/// WAV encoder using hound
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder {
    format: WavFormat,
}

impl WavEncoder {
    pub fn new(format: WavFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> WavFormat {
        self.format
    }

    fn spec(&self, buffer: &AudioBuffer) -> OfflineResult<hound::WavSpec> {
        let channels = u16::try_from(buffer.num_channels())
            .ok()
            .filter(|&c| c > 0)
            .ok_or_else(|| {
                OfflineError::InvalidConfig(format!(
                    "cannot write {} channels",
                    buffer.num_channels()
                ))
            })?;

        Ok(hound::WavSpec {
            channels,
            sample_rate: buffer.sample_rate,
            bits_per_sample: self.format.bits_per_sample(),
            sample_format: match self.format {
                WavFormat::Float32 => hound::SampleFormat::Float,
                WavFormat::Int16 | WavFormat::Int24 => hound::SampleFormat::Int,
            },
        })
    }

    /// Encode to an in-memory WAV file
    pub fn encode(&self, buffer: &AudioBuffer) -> OfflineResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.encode_into(buffer, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write a WAV file
    pub fn write(&self, buffer: &AudioBuffer, path: &Path) -> OfflineResult<()> {
        let spec = self.spec(buffer)?;
        let writer = hound::WavWriter::create(path, spec)
            .map_err(|e| OfflineError::WriteError(format!("{}: {e}", path.display())))?;
        self.write_samples(buffer, writer)
    }

    fn encode_into<W: Write + Seek>(&self, buffer: &AudioBuffer, sink: W) -> OfflineResult<()> {
        let spec = self.spec(buffer)?;
        let writer =
            hound::WavWriter::new(sink, spec).map_err(|e| OfflineError::WriteError(e.to_string()))?;
        self.write_samples(buffer, writer)
    }

    fn write_samples<W: Write + Seek>(
        &self,
        buffer: &AudioBuffer,
        mut writer: hound::WavWriter<W>,
    ) -> OfflineResult<()> {
        let write_err = |e: hound::Error| OfflineError::WriteError(e.to_string());

        for sample in buffer.to_interleaved() {
            match self.format {
                WavFormat::Int16 => writer
                    .write_sample(quantize(sample, 16) as i16)
                    .map_err(write_err)?,
                WavFormat::Int24 => writer.write_sample(quantize(sample, 24)).map_err(write_err)?,
                WavFormat::Float32 => writer.write_sample(sample).map_err(write_err)?,
            }
        }

        writer.finalize().map_err(write_err)
    }
}

/// Scale to a signed integer of `bits` width, clipping at full scale
fn quantize(sample: Sample, bits: u32) -> i32 {
    let full_scale = (1i64 << (bits - 1)) as f64;
    let scaled = (sample as f64 * full_scale).round();
    scaled.clamp(-full_scale, full_scale - 1.0) as i32
}
