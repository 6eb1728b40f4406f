//! Parameter values and their declared domains.
//!
//! Every unit publishes a static table of [`ParamSpec`]s. A spec names the
//! short wire key, the domain, and the default, and owns the clamping rule
//! applied to every write:
//!
//! ```
//! use effechain_core::{ParamSpec, ParamValue};
//!
//! const GAIN: ParamSpec = ParamSpec::float("vl", "Volume", -60.0, 24.0, 0.0).with_unit("dB");
//!
//! assert_eq!(GAIN.clamp(&ParamValue::Float(40.0)), Some(ParamValue::Float(24.0)));
//! assert_eq!(GAIN.clamp(&ParamValue::Text("loud".into())), None);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single parameter value.
///
/// Serialized untagged so it maps directly onto JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view; booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Text(_) => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|f| f as f32)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) => Some(f.round() as i64),
            Self::Bool(b) => Some(*b as i64),
            Self::Text(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            Self::Float(f) => Some(*f != 0.0),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert a JSON scalar. Arrays, objects and null have no parameter form.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            // Non-finite floats never reach a store; clamp rejects them.
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for ParamValue {
    fn from(f: f32) -> Self {
        Self::Float(f as f64)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Valid values for one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDomain {
    /// Continuous range, optionally quantized to multiples of `step`.
    Float { min: f64, max: f64, step: Option<f64> },

    /// Whole numbers in `min..=max`.
    Int { min: i64, max: i64 },

    /// Index into a fixed list of labels; stored as [`ParamValue::Int`].
    Choice { options: &'static [&'static str] },

    /// On/off.
    Toggle,

    /// Free text, truncated to `max_len` characters.
    Text { max_len: usize },
}

/// Declaration of one parameter key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub domain: ParamDomain,
    /// Numeric default; index for choices, 0/1 for toggles, unused for text.
    pub default: f64,
}

impl ParamSpec {
    pub const fn float(
        key: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            key,
            label,
            unit: "",
            domain: ParamDomain::Float {
                min,
                max,
                step: None,
            },
            default,
        }
    }

    pub const fn int(key: &'static str, label: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self {
            key,
            label,
            unit: "",
            domain: ParamDomain::Int { min, max },
            default: default as f64,
        }
    }

    pub const fn choice(
        key: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        default: usize,
    ) -> Self {
        Self {
            key,
            label,
            unit: "",
            domain: ParamDomain::Choice { options },
            default: default as f64,
        }
    }

    pub const fn toggle(key: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            key,
            label,
            unit: "",
            domain: ParamDomain::Toggle,
            default: if default { 1.0 } else { 0.0 },
        }
    }

    pub const fn text(key: &'static str, label: &'static str, max_len: usize) -> Self {
        Self {
            key,
            label,
            unit: "",
            domain: ParamDomain::Text { max_len },
            default: 0.0,
        }
    }

    pub const fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// Quantize a float domain. No effect on other domains.
    pub const fn with_step(mut self, step: f64) -> Self {
        if let ParamDomain::Float { min, max, .. } = self.domain {
            self.domain = ParamDomain::Float {
                min,
                max,
                step: Some(step),
            };
        }
        self
    }

    pub fn default_value(&self) -> ParamValue {
        match self.domain {
            ParamDomain::Float { .. } => ParamValue::Float(self.default),
            ParamDomain::Int { .. } | ParamDomain::Choice { .. } => {
                ParamValue::Int(self.default as i64)
            }
            ParamDomain::Toggle => ParamValue::Bool(self.default != 0.0),
            ParamDomain::Text { .. } => ParamValue::Text(String::new()),
        }
    }

    /// Coerce a raw value into this domain.
    ///
    /// Out-of-range numbers are clamped to the nearest valid value. `None`
    /// means the value has no interpretation here (text for a number, NaN,
    /// a number for a text key) and the write should be ignored.
    pub fn clamp(&self, raw: &ParamValue) -> Option<ParamValue> {
        match self.domain {
            ParamDomain::Float { min, max, step } => {
                let mut v = finite(raw.as_f64()?)?;
                if let Some(step) = step {
                    v = (v / step).round() * step;
                }
                Some(ParamValue::Float(v.clamp(min, max)))
            }
            ParamDomain::Int { min, max } => {
                let v = finite(raw.as_f64()?)?.round();
                Some(ParamValue::Int((v.clamp(min as f64, max as f64)) as i64))
            }
            ParamDomain::Choice { options } => {
                let last = options.len().saturating_sub(1) as f64;
                let v = finite(raw.as_f64()?)?.round();
                Some(ParamValue::Int(v.clamp(0.0, last) as i64))
            }
            ParamDomain::Toggle => raw.as_bool().map(ParamValue::Bool),
            ParamDomain::Text { max_len } => {
                let s = raw.as_str()?;
                Some(ParamValue::Text(s.chars().take(max_len).collect()))
            }
        }
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Convert decibels to linear gain.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear gain to decibels.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -f32::INFINITY
    } else {
        20.0 * linear.log10()
    }
}
