//! Path and name assignment over the walked model
//!
//! A second pass over the emitted nodes computes the dotted semantic
//! path, its abbreviated form, the occurrence-suffixed storage path,
//! the module-prefixed display name with its lower-camel element, and
//! finally the element-chained xpath.

use regex::Regex;
use sem_model::text::{abbreviate_term, lc3};
use sem_model::{PropertyType, SemanticRow};
use std::sync::LazyLock;
use tracing::debug;

use crate::index::IndexManager;
use crate::node::{LhmNode, NodeKind};
use crate::walker::WalkNode;

static LEADING_MODULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\$\.[^:]+:").unwrap());
static INNER_MODULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.[^:]+:").unwrap());

/// Strip a `mod:` prefix from a term.
pub(crate) fn strip_module(term: &str) -> &str {
    match term.split_once(':') {
        Some((_, rest)) => rest,
        None => term,
    }
}

/// The dotted term path of a node, rooted at `$`. Class and reference
/// nodes end at their own class term; attributes and associations
/// append the property term (association targets stripped of their
/// module prefix).
fn semantic_path(row: &SemanticRow) -> String {
    let class_path = row.class_term.replace('-', ".");
    match row.property_type {
        t if t.is_class() || t == PropertyType::ReferenceAssociation => {
            format!("$.{}", class_path)
        }
        t if t.is_attribute() => format!("$.{}.{}", class_path, row.property_term),
        _ => {
            if row.property_term.is_empty() {
                format!("$.{}.{}", class_path, row.associated_class)
            } else {
                format!(
                    "$.{}.{} {}",
                    class_path,
                    row.property_term,
                    strip_module(&row.associated_class)
                )
            }
        }
    }
}

/// Abbreviate each segment of a semantic path, squeezing out the
/// whitespace the abbreviation keeps between words.
fn abbreviation_path(semantic_path: &str) -> String {
    let tail = semantic_path.strip_prefix("$.").unwrap_or(semantic_path);
    tail.split('.')
        .map(|segment| {
            abbreviate_term(segment, 4)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Drop module tags, underscores, and periods from a joined segment
/// text, then keep only the first occurrence of each word
/// (case-insensitive, original casing preserved).
fn normalize_and_deduplicate(text: &str) -> String {
    let text = LEADING_MODULE.replace(text, "");
    let text = INNER_MODULE.replace_all(&text, " ");
    let text = text.replace(['_', '.'], "");

    let mut seen: Vec<String> = Vec::new();
    let mut unique: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        let folded = word.to_lowercase();
        if !seen.contains(&folded) {
            seen.push(folded);
            unique.push(word);
        }
    }
    unique.join(" ")
}

/// Display name and element for a node, derived from the last
/// `min(level, depth)` segments of its semantic path.
fn name_and_element(semantic_path: &str, kind: NodeKind, level: u8, property_term: &str) -> (String, String) {
    let semantics: Vec<&str> = semantic_path.split('.').collect();
    let class_segment = match kind {
        NodeKind::Class | NodeKind::Reference => semantics.last().copied().unwrap_or(""),
        NodeKind::Attribute => {
            if semantics.len() > 1 {
                semantics[semantics.len() - 2]
            } else {
                semantics[0]
            }
        }
    };
    let module = match class_segment.split_once(':') {
        Some((tag, _)) => tag.to_string(),
        None => class_segment.chars().take(3).collect(),
    };

    let depth = (level as usize).min(semantics.len());
    let text_parts: Vec<&str> = semantics[semantics.len() - depth..]
        .iter()
        .map(|s| strip_module(s))
        .collect();

    let normalized = if level > 1 {
        let take = (level as usize - 1).min(text_parts.len());
        let combined = text_parts[text_parts.len() - take..].join(" ");
        normalize_and_deduplicate(&combined)
    } else if !property_term.is_empty() {
        property_term.to_string()
    } else {
        text_parts.last().copied().unwrap_or("").to_string()
    };

    let name = format!("{}:{}", module, normalized);
    let element = lc3(&name);
    (name, element)
}

/// Ancestor slot in the path accumulator, one per level.
struct Aggregate {
    code: String,
    unbounded: bool,
}

/// Tracks repeating ancestors and assigns occurrence-suffixed codes.
#[derive(Default)]
struct PathTracker {
    aggregates: Vec<Option<Aggregate>>,
    index: IndexManager,
}

impl PathTracker {
    /// Record this node at its level, clear deeper slots, and return
    /// the slash-joined codes of every repeating ancestor. The node's
    /// own code is appended when it is not already the last repeating
    /// slot; the root always counts as repeating.
    fn track(&mut self, node: &WalkNode) -> String {
        let level = node.level as usize;
        if self.aggregates.len() < level {
            self.aggregates.resize_with(level, || None);
        }
        let code = self.index.indexed_code(&node.row.id);
        let unbounded = level == 1
            || node
                .row
                .multiplicity
                .is_some_and(|m| m.is_unbounded());
        self.aggregates[level - 1] = Some(Aggregate {
            code: code.clone(),
            unbounded,
        });
        for slot in self.aggregates[level..].iter_mut() {
            *slot = None;
        }

        let mut path = String::new();
        for aggregate in self.aggregates.iter().flatten() {
            if aggregate.unbounded {
                path.push('/');
                path.push_str(&aggregate.code);
            }
        }
        if path.is_empty() || !path.split('/').skip(1).any(|segment| segment == code) {
            path.push('/');
            path.push_str(&code);
        }
        path
    }
}

/// Chain the element names of every semantic-path ancestor. Returns
/// None when an ancestor is missing from the emitted records.
fn build_xpath(records: &[LhmNode], semantic_path: &str) -> Option<String> {
    let mut split = semantic_path.splitn(3, '.');
    let dollar = split.next()?;
    let root_segment = split.next()?;
    let suffix = split.next().unwrap_or("");

    let mut current = format!("{}.{}", dollar, root_segment);
    let root = records.iter().find(|r| r.semantic_path == current)?;
    let mut parts = vec![root.element.as_str()];
    for segment in suffix.split('.').filter(|s| !s.is_empty()) {
        current.push('.');
        current.push_str(segment);
        let record = records.iter().find(|r| r.semantic_path == current)?;
        parts.push(record.element.as_str());
    }
    Some(format!("/{}", parts.join("/")))
}

/// Turn the walked model into output nodes with every path column
/// assigned.
pub(crate) fn assign_paths(model: &[WalkNode]) -> Vec<LhmNode> {
    let mut tracker = PathTracker::default();
    let mut records: Vec<LhmNode> = Vec::with_capacity(model.len());

    for (position, node) in model.iter().enumerate() {
        let row = &node.row;
        let semantic_path = semantic_path(row);
        let (name, element) =
            name_and_element(&semantic_path, node.kind, node.level, &row.property_term);
        let datatype = match node.kind {
            NodeKind::Attribute => row.representation_term.clone(),
            NodeKind::Class | NodeKind::Reference => String::new(),
        };
        let abbreviation_path = abbreviation_path(&semantic_path);
        let path = tracker.track(node);
        let id = path.rsplit('/').next().unwrap_or_default().to_string();

        records.push(LhmNode {
            sequence: position as u32 + 1,
            level: node.level,
            kind: node.kind,
            identifier: row.identifier.clone(),
            name,
            datatype,
            multiplicity: row.multiplicity_str(),
            domain_name: String::new(),
            definition: row.definition.clone(),
            module: row.module.clone(),
            class_term: row.class_term.clone(),
            id,
            path,
            semantic_path,
            abbreviation_path,
            label_local: row.label_local.clone(),
            definition_local: row.definition_local.clone(),
            element,
            xpath: String::new(),
        });
    }

    for position in 0..records.len() {
        let semantic_path = records[position].semantic_path.clone();
        let tail = semantic_path
            .strip_prefix("$.")
            .unwrap_or(&semantic_path);
        let xpath = if tail.contains('.') {
            match build_xpath(&records, &semantic_path) {
                Some(xpath) => xpath,
                None => {
                    debug!(semantic_path = %semantic_path, "no xpath for node");
                    String::new()
                }
            }
        } else {
            format!("/{}", tail)
        };
        records[position].xpath = xpath;
    }

    records
}
