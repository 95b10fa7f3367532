//! Canonical class and property records

use indexmap::IndexMap;
use sem_model::SemanticRow;
use serde::{Deserialize, Serialize};

/// A property registered under a class.
///
/// `inherited` counts how many subclasses contributed this property
/// when it lives in an abstract pool; concrete properties leave it at
/// zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub row: SemanticRow,
    pub inherited: u32,
}

impl PropertyRecord {
    pub fn new(row: SemanticRow) -> Self {
        Self { row, inherited: 0 }
    }
}

/// A class with its insertion-ordered property map.
///
/// Properties are keyed by `SemanticRow::property_key`; re-registration
/// under an existing key merges rather than appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub row: SemanticRow,
    pub properties: IndexMap<String, PropertyRecord>,
}

impl ClassRecord {
    pub fn new(row: SemanticRow) -> Self {
        Self {
            row,
            properties: IndexMap::new(),
        }
    }

    pub fn class_term(&self) -> &str {
        &self.row.class_term
    }

    /// Drop properties whose multiplicity deletes them, keeping the
    /// order of the survivors.
    pub fn retain_live_properties(&mut self) {
        self.properties
            .retain(|_, p| !p.row.multiplicity.is_some_and(|m| m.is_deleted()));
    }
}
