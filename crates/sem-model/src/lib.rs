//! Core vocabulary for the semantic-model compiler.
//!
//! This crate defines the record types shared by every pipeline stage:
//! property-type and inheritance-tag enumerations with their exact CSV
//! spellings, the bounded multiplicity algebra, the flat semantic row
//! carried through the FSM and BSM artifacts, and the term utilities
//! (abbreviation, lower camel case, camel-case splitting) used when
//! deriving identifiers and paths.

pub mod kind;
pub mod multiplicity;
pub mod inherited;
pub mod record;
pub mod text;

pub use kind::{ParseKindError, PropertyType};
pub use multiplicity::{MaxOccur, MinOccur, Multiplicity, ParseMultiplicityError};
pub use inherited::{InheritanceTag, ParseTagError};
pub use record::{BieRow, SemanticRow};
