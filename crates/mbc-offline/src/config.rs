//! Render configuration and presets

use std::path::Path;

use mbc_core::{ParameterSnapshot, find_param, keys};
use serde::{Deserialize, Serialize};

use crate::error::{OfflineError, OfflineResult};

/// Output sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WavFormat {
    Int16,
    #[default]
    Int24,
    Float32,
}

impl WavFormat {
    /// Format for a bit depth given on the command line
    pub fn from_bit_depth(bits: u16) -> OfflineResult<Self> {
        match bits {
            16 => Ok(Self::Int16),
            24 => Ok(Self::Int24),
            32 => Ok(Self::Float32),
            other => Err(OfflineError::UnsupportedFormat(format!(
                "{other}-bit output (use 16, 24 or 32)"
            ))),
        }
    }

    pub fn bits_per_sample(self) -> u16 {
        match self {
            Self::Int16 => 16,
            Self::Int24 => 24,
            Self::Float32 => 32,
        }
    }
}

/// Offline render configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineConfig {
    /// Samples per processing block
    pub block_size: usize,

    /// Apply the latest parameters before every block instead of only
    /// when a change is pending
    pub non_realtime: bool,

    /// Output sample encoding
    pub output_format: WavFormat,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            block_size: 512,
            non_realtime: true,
            output_format: WavFormat::default(),
        }
    }
}

impl OfflineConfig {
    /// Set block size
    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Set non-realtime mode
    pub fn with_non_realtime(mut self, non_realtime: bool) -> Self {
        self.non_realtime = non_realtime;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: WavFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn validate(&self) -> OfflineResult<()> {
        if self.block_size == 0 {
            return Err(OfflineError::InvalidConfig("block size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// A parameter change at a point in the render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationEvent {
    pub at_seconds: f64,
    pub param: String,
    pub value: f32,
}

/// Parameter overrides plus automation, stored as JSON
///
/// ```json
/// {
///   "params": { "thresholdLow": -24.0, "ratioLow": 4.0 },
///   "automation": [ { "at_seconds": 2.0, "param": "muteHigh", "value": 1.0 } ]
/// }
/// ```
///
/// `params` is merged over the layout defaults; keys it leaves out keep
/// their default values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub params: ParameterSnapshot,
    pub automation: Vec<AutomationEvent>,
}

impl Preset {
    /// Parse and validate a preset
    ///
    /// Nothing partial is returned: a preset with any bad key or event is
    /// rejected as a whole.
    pub fn from_json(json: &str) -> OfflineResult<Self> {
        let preset: Preset =
            serde_json::from_str(json).map_err(|e| OfflineError::InvalidPreset(e.to_string()))?;

        // Round-trip the params through the snapshot parser for key checks
        let params_json = preset.params.to_json()?;
        ParameterSnapshot::from_json(&params_json)?;

        preset.validate_automation()?;
        Ok(preset)
    }

    pub fn load(path: &Path) -> OfflineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> OfflineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| OfflineError::InvalidPreset(e.to_string()))
    }

    fn validate_automation(&self) -> OfflineResult<()> {
        for event in &self.automation {
            if !event.at_seconds.is_finite() || event.at_seconds < 0.0 {
                return Err(OfflineError::InvalidPreset(format!(
                    "automation time {} for {} must be finite and non-negative",
                    event.at_seconds, event.param
                )));
            }
            if find_param(&event.param).is_none() {
                return Err(OfflineError::InvalidPreset(format!(
                    "automation targets unknown parameter {}",
                    event.param
                )));
            }
        }
        Ok(())
    }

    /// Complete snapshot for a stream: defaults overlaid with `params`,
    /// stream format taken from the arguments
    pub fn snapshot(&self, sample_rate: f32, block_size: usize, channels: usize) -> ParameterSnapshot {
        let mut snapshot = ParameterSnapshot::with_defaults(sample_rate, block_size, channels);
        snapshot.merge(&self.params);

        snapshot.set(keys::SAMPLE_RATE, sample_rate);
        snapshot.set(keys::BLOCK_SIZE, block_size as f32);
        snapshot.set(keys::N_CHANNELS, channels as f32);
        snapshot
    }

    /// Automation sorted by time (stable for equal times)
    pub fn sorted_automation(&self) -> Vec<AutomationEvent> {
        let mut events = self.automation.clone();
        events.sort_by(|a, b| a.at_seconds.total_cmp(&b.at_seconds));
        events
    }
}
