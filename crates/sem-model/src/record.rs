//! Flat semantic row shared by the FSM and BSM artifacts

use crate::{InheritanceTag, Multiplicity, PropertyType};
use serde::{Deserialize, Serialize};

/// One row of a flattened semantic model.
///
/// Class rows sit at level 1 with the property fields empty; property
/// and association rows sit at level 2 under the most recent class row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticRow {
    /// Source ordering key, kept verbatim from the input sheet
    pub sequence: String,

    /// Nesting level (1 for classes, 2 for properties)
    pub level: u8,

    /// Row kind
    pub property_type: PropertyType,

    /// Identifier flag (`PK`, `REF`, or empty)
    pub identifier: String,

    /// Owning class term, qualifiers joined with `"_ "`
    pub class_term: String,

    /// Property term, qualifiers joined with `"_ "`
    pub property_term: String,

    /// Representation term, datatype qualifiers joined with `"_ "`
    pub representation_term: String,

    /// Associated class term for association rows
    pub associated_class: String,

    /// Occurrence constraint, absent on bare class rows
    pub multiplicity: Option<Multiplicity>,

    /// English definition; merged duplicates are newline-joined
    pub definition: String,

    /// Module (context category) the row belongs to
    pub module: String,

    /// Local-language label
    pub label_local: String,

    /// Local-language definition
    pub definition_local: String,

    /// Assigned identifier (`CO####`, `CO####_###`, `<MOD>##_##`, ...)
    pub id: String,

    /// Inheritance status assigned during flattening
    pub inherited: Option<InheritanceTag>,

    /// Dictionary unique identifier carried from the source sheet
    pub unid: String,

    /// Source acronym (ABIE / ASBIE / BBIE)
    pub acronym: String,

    /// Dictionary entry name carried from the source sheet
    pub den: String,
}

impl SemanticRow {
    /// Create a row with the given kind and owning class, every other
    /// field empty.
    pub fn new(property_type: PropertyType, class_term: impl Into<String>) -> Self {
        Self {
            sequence: String::new(),
            level: if property_type.is_class() { 1 } else { 2 },
            property_type,
            identifier: String::new(),
            class_term: class_term.into(),
            property_term: String::new(),
            representation_term: String::new(),
            associated_class: String::new(),
            multiplicity: None,
            definition: String::new(),
            module: String::new(),
            label_local: String::new(),
            definition_local: String::new(),
            id: String::new(),
            inherited: None,
            unid: String::new(),
            acronym: String::new(),
            den: String::new(),
        }
    }

    /// Key under which this row registers in its class's property map.
    ///
    /// Classes key as the empty string, attributes pair the property
    /// term with the representation term, associations pair it with
    /// the associated class.
    pub fn property_key(&self) -> String {
        if self.property_type.is_class() {
            String::new()
        } else if self.property_type.is_attribute() {
            format!("{}. {}", self.property_term, self.representation_term)
        } else {
            format!("{}. {}", self.property_term, self.associated_class)
        }
    }

    /// The multiplicity rendered for CSV output (empty when absent).
    pub fn multiplicity_str(&self) -> String {
        self.multiplicity.map(|m| m.to_string()).unwrap_or_default()
    }

    /// The inheritance tag rendered for CSV output (empty when absent).
    pub fn inherited_str(&self) -> String {
        self.inherited
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_default()
    }
}

/// One row of a BIE definition sheet, fields verbatim.
///
/// Only a subset drives the pipeline; the remaining columns are kept
/// so diagnostics can echo the source row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BieRow {
    pub sequence: String,
    pub unid: String,
    pub acronym: String,
    pub den: String,
    pub definition: String,
    pub class_term_qualifier: String,
    pub class_term: String,
    pub property_term_qualifier: String,
    pub property_term: String,
    pub datatype_qualifier: String,
    pub representation_term: String,
    pub qualified_data_type_uid: String,
    pub associated_class_qualifier: String,
    pub associated_class: String,
    pub business_term: String,
    pub usage_rule: String,
    pub sequence_number: String,
    pub occurrence_min: String,
    pub occurrence_max: String,
    pub context_categories: String,
    pub tded: String,
    pub publication_source: String,
    pub short_name: String,
    pub bie: String,
}

impl BieRow {
    /// Join a qualifier onto a term with the `"_ "` separator.
    pub fn qualify(qualifier: &str, term: &str) -> String {
        if qualifier.is_empty() {
            term.to_string()
        } else {
            format!("{}_ {}", qualifier, term)
        }
    }

    /// The multiplicity spelling derived from the occurrence columns
    /// (empty when `occurrence_min` is absent).
    pub fn multiplicity_spelling(&self) -> String {
        if self.occurrence_min.is_empty() {
            return String::new();
        }
        let max = if self.occurrence_max == "unbounded" {
            "*"
        } else {
            &self.occurrence_max
        };
        format!("{}..{}", self.occurrence_min, max)
    }
}
