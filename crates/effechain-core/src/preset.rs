//! JSON wire format for instances and whole chains.
//!
//! An instance externalizes as a flat object:
//!
//! ```json
//! {"type": "VolumePlugin", "enabled": true, "vl": -6}
//! ```
//!
//! and a preset is an array of those in chain order. Keys a unit does not
//! declare are ignored when loading and never written.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One instance in wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetEntry {
    #[serde(rename = "type")]
    pub type_tag: String,

    /// Missing means "leave as is" (enabled for a new instance).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl PresetEntry {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            enabled: None,
            params: Map::new(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Parameters plus `enabled`, ready for a store to apply.
    pub(crate) fn to_store_map(&self) -> Map<String, Value> {
        let mut map = self.params.clone();
        if let Some(enabled) = self.enabled {
            map.insert("enabled".to_string(), Value::Bool(enabled));
        }
        map
    }
}

/// Ordered list of instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preset {
    pub entries: Vec<PresetEntry>,
}

impl Preset {
    pub fn new(entries: Vec<PresetEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
