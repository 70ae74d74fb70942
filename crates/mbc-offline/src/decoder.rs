//! WAV decoding via hound
//!
//! Integer PCM (8/16/24/32-bit) is scaled to [-1, 1); 32-bit float is read
//! as is.

use std::io::Read;
use std::path::Path;

use mbc_core::Sample;

use crate::error::{OfflineError, OfflineResult};
use crate::pipeline::AudioBuffer;

pub struct WavDecoder;

impl WavDecoder {
    /// Decode a WAV file
    pub fn decode(path: &Path) -> OfflineResult<AudioBuffer> {
        if !path.exists() {
            return Err(OfflineError::InputNotFound(path.display().to_string()));
        }

        let reader = hound::WavReader::open(path)
            .map_err(|e| OfflineError::ReadError(format!("{}: {e}", path.display())))?;
        Self::decode_reader(reader)
    }

    /// Decode WAV data from any reader
    pub fn decode_from<R: Read>(source: R) -> OfflineResult<AudioBuffer> {
        let reader =
            hound::WavReader::new(source).map_err(|e| OfflineError::ReadError(e.to_string()))?;
        Self::decode_reader(reader)
    }

    fn decode_reader<R: Read>(mut reader: hound::WavReader<R>) -> OfflineResult<AudioBuffer> {
        let spec = reader.spec();

        let samples: Vec<Sample> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| OfflineError::ReadError(e.to_string()))?,
            (hound::SampleFormat::Int, bits @ 8..=32) => {
                let scale = 1.0 / (1u64 << (bits - 1)) as f64;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| (v as f64 * scale) as Sample))
                    .collect::<Result<_, _>>()
                    .map_err(|e| OfflineError::ReadError(e.to_string()))?
            }
            (format, bits) => {
                return Err(OfflineError::UnsupportedFormat(format!(
                    "{bits}-bit {format:?} WAV"
                )));
            }
        };

        Ok(AudioBuffer::from_interleaved(
            &samples,
            spec.channels as usize,
            spec.sample_rate,
        ))
    }
}
