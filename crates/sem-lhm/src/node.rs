//! Hierarchical-model node types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Node kind in the hierarchical model.
///
/// `C` marks a class reached by ordinary descent, `R` a class reached
/// through a reference association, `A` an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[default]
    Class,
    Reference,
    Attribute,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Class => "C",
            NodeKind::Reference => "R",
            NodeKind::Attribute => "A",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("'{0}' is not a node kind")]
pub struct ParseNodeKindError(pub String);

impl FromStr for NodeKind {
    type Err = ParseNodeKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(NodeKind::Class),
            "R" => Ok(NodeKind::Reference),
            "A" => Ok(NodeKind::Attribute),
            other => Err(ParseNodeKindError(other.to_string())),
        }
    }
}

/// One node of the hierarchical logical model, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LhmNode {
    /// Position in the emitted model, starting at 1
    pub sequence: u32,

    /// Nesting depth; the root class sits at 1
    pub level: u8,

    /// Node kind (`C`, `R`, `A`)
    pub kind: NodeKind,

    /// Identifier flag (`PK`, `REF`, or empty)
    pub identifier: String,

    /// Module-prefixed display name, e.g. `cor:Accounting Entries`
    pub name: String,

    /// Representation term of attribute nodes, empty on class nodes
    pub datatype: String,

    /// Occurrence constraint rendered as entered, empty when absent
    pub multiplicity: String,

    /// Reserved for code-list domains, currently unassigned
    pub domain_name: String,

    /// English definition
    pub definition: String,

    /// Module tag
    pub module: String,

    /// Hyphen-joined descent path of class terms
    pub class_term: String,

    /// Occurrence-suffixed code, the last segment of `path`
    pub id: String,

    /// Slash-joined codes of the repeating ancestors plus this node
    pub path: String,

    /// Dotted term path rooted at `$`
    pub semantic_path: String,

    /// `semantic_path` with every segment abbreviated
    pub abbreviation_path: String,

    /// Local-language label
    pub label_local: String,

    /// Local-language definition
    pub definition_local: String,

    /// Lower-camel element name used in schema emission
    pub element: String,

    /// Slash-joined element names of the ancestor chain
    pub xpath: String,
}
