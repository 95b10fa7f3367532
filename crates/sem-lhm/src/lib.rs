//! Hierarchical logical model construction.
//!
//! This crate turns a flat, resolved business model into a tree by
//! walking associations depth first from one or more root classes. A
//! LIFO stack guards against cycles, reference associations flatten to
//! foreign-key leaves, and a second pass assigns the semantic,
//! abbreviated, storage, and element paths of every node.

pub mod error;
pub mod index;
pub mod node;
mod paths;
pub mod walker;

pub use error::{LhmError, LhmResult};
pub use index::IndexManager;
pub use node::{LhmNode, NodeKind, ParseNodeKindError};
pub use walker::GraphWalker;
