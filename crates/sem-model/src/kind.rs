//! Property-type classification for semantic rows

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The kind of a row in a semantic model artifact.
///
/// The `Display`/`FromStr` pair round-trips the exact spellings used in
/// the CSV artifacts, including the parenthesised `Attribute(PK)` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    /// Concrete class definition (level 1)
    Class,
    /// Derived superclass holding pooled properties
    AbstractClass,
    /// Class that specialises a registered superclass
    SpecializedClass,
    /// Marker row linking a subclass to its superclass
    Specialized,
    /// Simple content property
    Attribute,
    /// Primary-key attribute
    AttributePk,
    /// Association flattened to a reference at walk time
    ReferenceAssociation,
    /// Shared-composition association
    Aggregation,
    /// Exclusive-composition association
    Composition,
    /// Specialization association row
    Specialization,
}

impl PropertyType {
    /// True for class-defining rows (level 1).
    pub fn is_class(&self) -> bool {
        matches!(
            self,
            Self::Class | Self::AbstractClass | Self::SpecializedClass
        )
    }

    /// True for simple-content rows.
    pub fn is_attribute(&self) -> bool {
        matches!(self, Self::Attribute | Self::AttributePk)
    }

    /// True for rows that point at another class.
    pub fn is_association(&self) -> bool {
        matches!(
            self,
            Self::ReferenceAssociation | Self::Aggregation | Self::Composition | Self::Specialization
        )
    }

    /// Ordering rank used when flattening properties: attributes first,
    /// then references, aggregations, and compositions.
    pub fn sort_rank(&self) -> u8 {
        match self {
            Self::AttributePk => 1,
            Self::Attribute => 2,
            Self::ReferenceAssociation => 3,
            Self::Aggregation => 4,
            Self::Composition => 5,
            _ => 99,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Class => "Class",
            Self::AbstractClass => "Abstract Class",
            Self::SpecializedClass => "Specialized Class",
            Self::Specialized => "Specialized",
            Self::Attribute => "Attribute",
            Self::AttributePk => "Attribute(PK)",
            Self::ReferenceAssociation => "Reference Association",
            Self::Aggregation => "Aggregation",
            Self::Composition => "Composition",
            Self::Specialization => "Specialization",
        };
        write!(f, "{}", s)
    }
}

/// Error for an unrecognised property-type spelling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown property type: '{0}'")]
pub struct ParseKindError(pub String);

impl FromStr for PropertyType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Class" => Ok(Self::Class),
            "Abstract Class" => Ok(Self::AbstractClass),
            "Specialized Class" => Ok(Self::SpecializedClass),
            "Specialized" => Ok(Self::Specialized),
            "Attribute" => Ok(Self::Attribute),
            "Attribute(PK)" => Ok(Self::AttributePk),
            // "Reference" appears as shorthand in older sheets
            "Reference" | "Reference Association" => Ok(Self::ReferenceAssociation),
            "Aggregation" => Ok(Self::Aggregation),
            "Composition" => Ok(Self::Composition),
            "Specialization" => Ok(Self::Specialization),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}
