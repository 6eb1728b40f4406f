//! Per-instance parameter store and the immutable snapshots the render plane reads.

use crate::parameter::{ParamSpec, ParamValue};
use crate::routing::Routing;
use serde_json::{Map, Value};

/// Immutable copy of every parameter of one instance plus its enabled flag
/// and routing.
///
/// Values are stored in the order of the unit's [`ParamSpec`] table, so units
/// read them by index without hashing. Accessors fall back to neutral values
/// for out-of-range indices or mismatched kinds instead of panicking.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSnapshot {
    enabled: bool,
    routing: Routing,
    values: Box<[ParamValue]>,
}

impl ParamSnapshot {
    pub fn new(enabled: bool, values: Box<[ParamValue]>) -> Self {
        Self {
            enabled,
            routing: Routing::default(),
            values,
        }
    }

    pub fn with_routing(mut self, routing: Routing) -> Self {
        self.routing = routing.clamped();
        self
    }

    /// All-defaults snapshot for a spec table.
    pub fn defaults(specs: &[ParamSpec]) -> Self {
        Self {
            enabled: true,
            routing: Routing::default(),
            values: specs.iter().map(ParamSpec::default_value).collect(),
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn routing(&self) -> Routing {
        self.routing
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn value(&self, index: usize) -> Option<&ParamValue> {
        self.values.get(index)
    }

    #[inline]
    pub fn float(&self, index: usize) -> f32 {
        self.double(index) as f32
    }

    #[inline]
    pub fn double(&self, index: usize) -> f64 {
        self.values
            .get(index)
            .and_then(ParamValue::as_f64)
            .unwrap_or(0.0)
    }

    #[inline]
    pub fn int(&self, index: usize) -> i64 {
        self.values
            .get(index)
            .and_then(ParamValue::as_i64)
            .unwrap_or(0)
    }

    #[inline]
    pub fn flag(&self, index: usize) -> bool {
        self.values
            .get(index)
            .and_then(ParamValue::as_bool)
            .unwrap_or(false)
    }

    #[inline]
    pub fn text(&self, index: usize) -> &str {
        self.values
            .get(index)
            .and_then(ParamValue::as_str)
            .unwrap_or("")
    }
}

/// Live, control-plane side parameter state of one instance.
///
/// Every write goes through the key's [`ParamSpec::clamp`]. Unknown keys and
/// uninterpretable values are dropped without error.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    specs: &'static [ParamSpec],
    values: Vec<ParamValue>,
    enabled: bool,
    routing: Routing,
}

impl ParameterStore {
    pub fn new(specs: &'static [ParamSpec]) -> Self {
        Self {
            specs,
            values: specs.iter().map(ParamSpec::default_value).collect(),
            enabled: true,
            routing: Routing::default(),
        }
    }

    pub fn specs(&self) -> &'static [ParamSpec] {
        self.specs
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.index_of(key).map(|i| &self.values[i])
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Clamp and store. Returns `false` when the key is unknown or the value
    /// has no meaning for it.
    pub fn set(&mut self, key: &str, raw: impl Into<ParamValue>) -> bool {
        let raw = raw.into();
        let Some(index) = self.index_of(key) else {
            return false;
        };
        match self.specs[index].clamp(&raw) {
            Some(value) => {
                self.values[index] = value;
                true
            }
            None => false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn routing(&self) -> Routing {
        self.routing
    }

    pub fn set_routing(&mut self, routing: Routing) {
        self.routing = routing.clamped();
    }

    /// Apply a wire-format mapping. `enabled`, the routing attributes and
    /// every known key are applied; `type` and anything unknown are skipped.
    /// Returns how many entries took.
    pub fn apply(&mut self, map: &Map<String, Value>) -> usize {
        let mut applied = 0;
        for (key, value) in map {
            if let Some(took) = self.routing.apply_wire(key, value) {
                applied += took as usize;
                continue;
            }
            if key == "enabled" {
                if let Some(enabled) = ParamValue::from_json(value).and_then(|v| v.as_bool()) {
                    self.enabled = enabled;
                    applied += 1;
                }
                continue;
            }
            if let Some(raw) = ParamValue::from_json(value) {
                if self.set(key, raw) {
                    applied += 1;
                }
            }
        }
        applied
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            enabled: self.enabled,
            routing: self.routing,
            values: self.values.clone().into_boxed_slice(),
        }
    }

    /// Current values keyed by wire key, without `type`/`enabled`. Routing
    /// attributes are included when they differ from the default.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map: Map<String, Value> = self
            .specs
            .iter()
            .zip(&self.values)
            .map(|(spec, value)| (spec.key.to_string(), value.to_json()))
            .collect();
        self.routing.write_wire(&mut map);
        map
    }
}
