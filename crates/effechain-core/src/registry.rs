//! Unit registry: the table from wire-format type tag to unit implementation.
//!
//! Populated once at start-up and then shared read-only by the controller.
//!
//! ```ignore
//! let mut registry = UnitRegistry::new();
//! registry.register(VolumeUnit);
//! let unit = registry.get("VolumePlugin")?;
//! ```

use crate::error::{Error, Result};
use crate::unit::Unit;
use std::collections::HashMap;
use std::sync::Arc;

/// Table of known unit kinds.
#[derive(Default, Clone)]
pub struct UnitRegistry {
    units: HashMap<&'static str, Arc<dyn Unit>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit under its own type tag, replacing any previous entry.
    pub fn register<U: Unit>(&mut self, unit: U) -> &mut Self {
        self.register_arc(Arc::new(unit))
    }

    pub fn register_arc(&mut self, unit: Arc<dyn Unit>) -> &mut Self {
        self.units.insert(unit.type_tag(), unit);
        self
    }

    pub fn get(&self, type_tag: &str) -> Result<Arc<dyn Unit>> {
        self.units
            .get(type_tag)
            .cloned()
            .ok_or_else(|| Error::UnknownUnitType(type_tag.to_string()))
    }

    pub fn has_type(&self, type_tag: &str) -> bool {
        self.units.contains_key(type_tag)
    }

    /// Registered tags, sorted.
    pub fn list_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.units.keys().copied().collect();
        types.sort_unstable();
        types
    }

    pub fn unregister(&mut self, type_tag: &str) -> bool {
        self.units.remove(type_tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl std::fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitRegistry")
            .field("types", &self.list_types())
            .finish()
    }
}
