//! Module-code mapping
//!
//! Maps lowercase module tags to the two-letter codes used in BSM
//! identifiers. The built-in table covers the standard modules; a JSON
//! object file can replace it.

use crate::error::{BsmError, BsmResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Two-letter module codes keyed by module tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleCodes {
    codes: IndexMap<String, String>,
}

impl Default for ModuleCodes {
    fn default() -> Self {
        let codes = [
            ("Unit Type Registry", "UT"),
            ("gen", "GE"),
            ("cor", "CO"),
            ("bus", "BU"),
            ("muc", "MC"),
            ("taf", "TA"),
            ("ehm", "EH"),
            ("usk", "UK"),
            ("lnk", "LK"),
            ("btx", "BT"),
            ("sta", "ST"),
            ("ext", "EX"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { codes }
    }
}

impl ModuleCodes {
    /// Load a replacement table from a JSON object of tag-to-code
    /// pairs.
    pub fn from_json_file(path: impl AsRef<Path>) -> BsmResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BsmError::module_table(path.display().to_string(), e.to_string()))?;
        let codes: IndexMap<String, String> = serde_json::from_str(&text)
            .map_err(|e| BsmError::module_table(path.display().to_string(), e.to_string()))?;
        Ok(Self { codes })
    }

    /// The code for a module tag, `"NA"` when unmapped.
    pub fn code(&self, tag: &str) -> &str {
        self.codes.get(tag).map(String::as_str).unwrap_or("NA")
    }
}
