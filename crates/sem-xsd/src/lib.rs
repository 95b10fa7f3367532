//! XML Schema generation from hierarchical logical models.
//!
//! Renders an LHM node sequence into a business-document schema that
//! imports the UN/CEFACT unqualified data type library, with optional
//! bilingual `xsd:annotation` blocks carrying dictionary metadata.

pub mod emitter;
pub mod error;

pub use emitter::{XsdConfig, XsdEmitter};
pub use error::{XsdError, XsdResult};
