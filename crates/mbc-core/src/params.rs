//! Parameter layout for the multiband compressor
//!
//! Every automatable parameter has a stable string id (the key used in a
//! [`ParameterSnapshot`](crate::ParameterSnapshot)), a display name, a range
//! with a default, and a kind. Hosts automate in normalized 0..1 space; the
//! layout maps that back to real units.

use serde::Serialize;

/// Snapshot keys
pub mod keys {
    pub const SAMPLE_RATE: &str = "sampleRate";
    pub const BLOCK_SIZE: &str = "blockSize";
    pub const N_CHANNELS: &str = "nChannels";

    pub const LOW_MID_CUT: &str = "lowMidCut";
    pub const MID_HIGH_CUT: &str = "midHighCut";

    pub const INPUT_ALL: &str = "inputAll";
    pub const OUTPUT_ALL: &str = "outputAll";
    pub const BYPASS: &str = "bypass";
}

/// Ratios offered by the ratio selector
pub const RATIO_CHOICES: [f32; 14] = [
    1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0, 15.0, 20.0, 50.0, 100.0,
];

/// Frequency band produced by the crossover stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Band {
    Low,
    Mid,
    High,
}

/// Snapshot keys of one band's parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandKeys {
    pub threshold: &'static str,
    pub ratio: &'static str,
    pub attack: &'static str,
    pub release: &'static str,
    pub input: &'static str,
    pub output: &'static str,
    pub mute: &'static str,
}

const LOW_KEYS: BandKeys = BandKeys {
    threshold: "thresholdLow",
    ratio: "ratioLow",
    attack: "attackLow",
    release: "releaseLow",
    input: "inputLow",
    output: "outputLow",
    mute: "muteLow",
};

const MID_KEYS: BandKeys = BandKeys {
    threshold: "thresholdMid",
    ratio: "ratioMid",
    attack: "attackMid",
    release: "releaseMid",
    input: "inputMid",
    output: "outputMid",
    mute: "muteMid",
};

const HIGH_KEYS: BandKeys = BandKeys {
    threshold: "thresholdHigh",
    ratio: "ratioHigh",
    attack: "attackHigh",
    release: "releaseHigh",
    input: "inputHigh",
    output: "outputHigh",
    mute: "muteHigh",
};

impl Band {
    pub const ALL: [Band; 3] = [Band::Low, Band::Mid, Band::High];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Mid => 1,
            Self::High => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Mid => "Mid",
            Self::High => "High",
        }
    }

    pub fn keys(self) -> &'static BandKeys {
        match self {
            Self::Low => &LOW_KEYS,
            Self::Mid => &MID_KEYS,
            Self::High => &HIGH_KEYS,
        }
    }
}

/// Parameter value (normalized 0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedValue(f32);

impl NormalizedValue {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    #[inline]
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }
}

/// Parameter skew type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ParamSkew {
    Linear,
    Logarithmic,
}

/// Parameter range specification
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub skew: ParamSkew,
}

impl ParamRange {
    pub const fn linear(min: f32, max: f32, default: f32) -> Self {
        Self {
            min,
            max,
            default,
            skew: ParamSkew::Linear,
        }
    }

    pub const fn logarithmic(min: f32, max: f32, default: f32) -> Self {
        Self {
            min,
            max,
            default,
            skew: ParamSkew::Logarithmic,
        }
    }

    /// Denormalize a 0-1 value to actual value
    pub fn denormalize(&self, normalized: NormalizedValue) -> f32 {
        let n = normalized.get();
        match self.skew {
            ParamSkew::Linear => self.min + n * (self.max - self.min),
            ParamSkew::Logarithmic => {
                let log_min = self.min.ln();
                let log_max = self.max.ln();
                (log_min + n * (log_max - log_min)).exp()
            }
        }
    }

    /// Normalize an actual value to 0-1
    pub fn normalize(&self, value: f32) -> NormalizedValue {
        let clamped = value.clamp(self.min, self.max);
        let n = match self.skew {
            ParamSkew::Linear => (clamped - self.min) / (self.max - self.min),
            ParamSkew::Logarithmic => {
                let log_min = self.min.ln();
                let log_max = self.max.ln();
                (clamped.ln() - log_min) / (log_max - log_min)
            }
        };
        NormalizedValue::new(n)
    }
}

/// How a parameter's value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ParamKind {
    /// Continuous value within the range
    Float,
    /// One of a fixed list of values; the range spans the list indices
    Choice(&'static [f32]),
    /// 0 = off, 1 = on
    Toggle,
}

/// One automatable parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub range: ParamRange,
    pub kind: ParamKind,
}

impl ParamSpec {
    const fn float(id: &'static str, name: &'static str, unit: &'static str, range: ParamRange) -> Self {
        Self {
            id,
            name,
            unit,
            range,
            kind: ParamKind::Float,
        }
    }

    const fn toggle(id: &'static str, name: &'static str) -> Self {
        Self {
            id,
            name,
            unit: "",
            range: ParamRange::linear(0.0, 1.0, 0.0),
            kind: ParamKind::Toggle,
        }
    }

    /// Default value in real units
    pub fn default_value(&self) -> f32 {
        match self.kind {
            ParamKind::Choice(choices) => choices[self.range.default as usize],
            _ => self.range.default,
        }
    }

    /// Map a host-normalized value to real units
    pub fn from_normalized(&self, normalized: NormalizedValue) -> f32 {
        match self.kind {
            ParamKind::Float => self.range.denormalize(normalized),
            ParamKind::Choice(choices) => {
                let last = choices.len() - 1;
                let index = (normalized.get() * last as f32).round() as usize;
                choices[index.min(last)]
            }
            ParamKind::Toggle => {
                if normalized.get() >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Map a real value to host-normalized space
    pub fn to_normalized(&self, value: f32) -> NormalizedValue {
        match self.kind {
            ParamKind::Float => self.range.normalize(value),
            ParamKind::Choice(choices) => {
                let index = choices
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| (*a - value).abs().total_cmp(&(*b - value).abs()))
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                NormalizedValue::new(index as f32 / (choices.len() - 1) as f32)
            }
            ParamKind::Toggle => {
                if value >= 0.5 {
                    NormalizedValue::ONE
                } else {
                    NormalizedValue::ZERO
                }
            }
        }
    }
}

const THRESHOLD_RANGE: ParamRange = ParamRange::linear(-60.0, 12.0, 0.0);
const RATIO_RANGE: ParamRange = ParamRange::linear(0.0, (RATIO_CHOICES.len() - 1) as f32, 3.0);
const ATTACK_RANGE: ParamRange = ParamRange::linear(5.0, 5000.0, 50.0);
const RELEASE_RANGE: ParamRange = ParamRange::linear(5.0, 5000.0, 250.0);
const TRIM_RANGE: ParamRange = ParamRange::linear(-24.0, 24.0, 0.0);

const BAND_NAMES: [[&str; 7]; 3] = [
    [
        "Threshold Low",
        "Ratio Low",
        "Attack Low",
        "Release Low",
        "Input Low",
        "Output Low",
        "Mute Low",
    ],
    [
        "Threshold Mid",
        "Ratio Mid",
        "Attack Mid",
        "Release Mid",
        "Input Mid",
        "Output Mid",
        "Mute Mid",
    ],
    [
        "Threshold High",
        "Ratio High",
        "Attack High",
        "Release High",
        "Input High",
        "Output High",
        "Mute High",
    ],
];

/// Every automatable parameter, in display order
pub fn parameter_layout() -> Vec<ParamSpec> {
    let mut layout = Vec::with_capacity(26);

    for band in Band::ALL {
        let keys = band.keys();
        let names = BAND_NAMES[band.index()];

        layout.push(ParamSpec::float(keys.threshold, names[0], "dB", THRESHOLD_RANGE));
        layout.push(ParamSpec {
            id: keys.ratio,
            name: names[1],
            unit: ":1",
            range: RATIO_RANGE,
            kind: ParamKind::Choice(&RATIO_CHOICES),
        });
        layout.push(ParamSpec::float(keys.attack, names[2], "ms", ATTACK_RANGE));
        layout.push(ParamSpec::float(keys.release, names[3], "ms", RELEASE_RANGE));
        layout.push(ParamSpec::float(keys.input, names[4], "dB", TRIM_RANGE));
        layout.push(ParamSpec::float(keys.output, names[5], "dB", TRIM_RANGE));
        layout.push(ParamSpec::toggle(keys.mute, names[6]));
    }

    layout.push(ParamSpec::float(
        keys::LOW_MID_CUT,
        "Low/Mid Cut",
        "Hz",
        ParamRange::logarithmic(20.0, 20000.0, 700.0),
    ));
    layout.push(ParamSpec::float(
        keys::MID_HIGH_CUT,
        "Mid/High Cut",
        "Hz",
        ParamRange::logarithmic(20.0, 20000.0, 5000.0),
    ));
    layout.push(ParamSpec::float(keys::INPUT_ALL, "Input", "dB", TRIM_RANGE));
    layout.push(ParamSpec::float(keys::OUTPUT_ALL, "Output", "dB", TRIM_RANGE));
    layout.push(ParamSpec::toggle(keys::BYPASS, "Bypass"));

    layout
}

/// Look up a parameter by snapshot key
pub fn find_param(id: &str) -> Option<ParamSpec> {
    parameter_layout().into_iter().find(|spec| spec.id == id)
}
