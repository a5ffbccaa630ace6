//! Hierarchy registry for structural splitting.

use std::collections::HashMap;

use super::types::{Level, LevelSpec};

/// Registry of level specifications for the hierarchy.
#[derive(Debug, Clone)]
pub struct HierarchyRegistry {
    specs: HashMap<Level, LevelSpec>,
}

impl HierarchyRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Register a level specification.
    pub fn register(&mut self, spec: LevelSpec) {
        self.specs.insert(spec.level, spec);
    }

    /// Get the specification for a level.
    #[must_use]
    pub fn get_spec(&self, level: Level) -> Option<&LevelSpec> {
        self.specs.get(&level)
    }
}

impl Default for HierarchyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
