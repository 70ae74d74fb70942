//! mbc-offline: Offline rendering for the multiband compressor
//!
//! Renders WAV files through [`mbc_dsp::MultibandProcessor`] with a JSON
//! preset and optional timed automation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       RenderPipeline                         │
//! │                                                              │
//! │  ┌────────────┐   ┌──────────────────────────┐   ┌─────────┐ │
//! │  │ WavDecoder │ → │ MultibandProcessor       │ → │   Wav   │ │
//! │  │  (hound)   │   │ (blocks, split at events)│   │ Encoder │ │
//! │  └────────────┘   └────────────▲─────────────┘   └─────────┘ │
//! │                                │ publish                     │
//! │                   ┌────────────┴─────────────┐               │
//! │                   │ Preset: params+automation│               │
//! │                   └──────────────────────────┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mbc_offline::{OfflineConfig, Preset, RenderPipeline, WavFormat};
//!
//! let preset = Preset::load("vocal.json".as_ref())?;
//! let config = OfflineConfig::default().with_output_format(WavFormat::Float32);
//!
//! let stats = RenderPipeline::new(config, preset)
//!     .render_file("in.wav".as_ref(), "out.wav".as_ref())?;
//! ```

mod config;
mod decoder;
mod encoder;
mod error;
mod pipeline;

pub use config::*;
pub use decoder::*;
pub use encoder::*;
pub use error::*;
pub use pipeline::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
