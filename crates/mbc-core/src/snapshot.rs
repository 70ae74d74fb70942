//! Named parameter snapshots
//!
//! A snapshot is the complete set of parameter values handed to the DSP layer
//! on prepare and on every control-rate change. It is plain data: nothing in
//! here knows about sample processing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{MbcError, MbcResult, NormalizedValue, find_param, keys, parameter_layout};

/// Map from parameter key to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSnapshot {
    values: BTreeMap<String, f32>,
}

impl ParameterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete snapshot holding every layout default plus the stream format
    pub fn with_defaults(sample_rate: f32, block_size: usize, channels: usize) -> Self {
        let mut snapshot = Self::new();
        snapshot.set(keys::SAMPLE_RATE, sample_rate);
        snapshot.set(keys::BLOCK_SIZE, block_size as f32);
        snapshot.set(keys::N_CHANNELS, channels as f32);

        for spec in parameter_layout() {
            snapshot.set(spec.id, spec.default_value());
        }
        snapshot
    }

    /// Look up a value
    ///
    /// Missing keys and non-finite values are configuration errors.
    pub fn get(&self, key: &str) -> MbcResult<f32> {
        let value = *self
            .values
            .get(key)
            .ok_or_else(|| MbcError::MissingParam(key.to_string()))?;

        if !value.is_finite() {
            return Err(MbcError::NonFiniteParam {
                name: key.to_string(),
                value,
            });
        }
        Ok(value)
    }

    /// Toggle parameters read as on at 0.5 and above
    pub fn get_flag(&self, key: &str) -> MbcResult<bool> {
        Ok(self.get(key)? >= 0.5)
    }

    pub fn set(&mut self, key: impl Into<String>, value: f32) {
        self.values.insert(key.into(), value);
    }

    /// Set a value, rejecting keys that are neither in the layout nor
    /// stream-format keys
    pub fn set_known(&mut self, key: &str, value: f32) -> MbcResult<()> {
        if !is_known_key(key) {
            return Err(MbcError::UnknownParam(key.to_string()));
        }
        self.set(key, value);
        Ok(())
    }

    /// Set a parameter from a host-normalized 0..1 value
    pub fn set_normalized(&mut self, key: &str, normalized: f32) -> MbcResult<()> {
        let spec = find_param(key).ok_or_else(|| MbcError::UnknownParam(key.to_string()))?;
        let value = spec.from_normalized(NormalizedValue::new(normalized));
        self.set(key, value);
        Ok(())
    }

    /// Overlay every value of `other` onto this snapshot
    pub fn merge(&mut self, other: &ParameterSnapshot) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), *value);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Parse a snapshot from JSON
    ///
    /// Unknown keys are rejected so a typo in a preset is reported rather
    /// than silently ignored.
    pub fn from_json(json: &str) -> MbcResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        if let Some((key, _)) = snapshot.iter().find(|(key, _)| !is_known_key(key)) {
            return Err(MbcError::UnknownParam(key.to_string()));
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> MbcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn is_known_key(key: &str) -> bool {
    matches!(key, keys::SAMPLE_RATE | keys::BLOCK_SIZE | keys::N_CHANNELS) || find_param(key).is_some()
}
