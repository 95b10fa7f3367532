//! Recursive graph walk over a resolved business model
//!
//! Starting from one or more root class terms, the walker descends
//! associations depth first, guarding against cycles with a LIFO stack
//! of the class terms currently on the path. Reference associations
//! copy the target's primary-key attributes as foreign-key leaves
//! instead of descending further.

use indexmap::IndexMap;
use sem_model::{Multiplicity, PropertyType, SemanticRow};
use tracing::{debug, trace};

use crate::error::{LhmError, LhmResult};
use crate::node::{LhmNode, NodeKind};
use crate::paths::{self, strip_module};

/// A class with its walkable properties, keyed by descent term.
#[derive(Debug, Clone)]
struct ClassEntry {
    row: SemanticRow,
    properties: IndexMap<String, SemanticRow>,
}

/// Node emitted during the walk, before path assignment.
#[derive(Debug, Clone)]
pub(crate) struct WalkNode {
    pub(crate) row: SemanticRow,
    pub(crate) kind: NodeKind,
    pub(crate) level: u8,
    pub(crate) originating_class_term: String,
}

/// The term under which a property is looked up when stepping through
/// an association: the qualifier-joined target for associations, the
/// property term itself for attributes.
fn walk_term(row: &SemanticRow) -> String {
    if row.property_type.is_attribute() {
        row.property_term.clone()
    } else if row.property_term.is_empty() {
        row.associated_class.clone()
    } else {
        format!(
            "{}_ {}",
            row.property_term,
            strip_module(&row.associated_class)
        )
    }
}

/// Association buckets processed in strict order: mandatory singular
/// first, then optional singular, then plural.
fn bucket(multiplicity: Option<Multiplicity>) -> Option<u8> {
    let m = multiplicity?;
    if m.is_deleted() {
        return None;
    }
    if m.is_unbounded() {
        Some(2)
    } else if !m.is_repeatable() {
        Some(if m.is_mandatory() { 0 } else { 1 })
    } else {
        None
    }
}

/// Builds the hierarchical logical model from a flat business model.
#[derive(Debug, Default)]
pub struct GraphWalker {
    classes: IndexMap<String, ClassEntry>,
    lifo: Vec<String>,
    model: Vec<WalkNode>,
    current_multiplicity: Option<Multiplicity>,
}

impl GraphWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rows of a business model. Class rows open entries,
    /// property rows attach to the owning class, which must already
    /// exist. Specialization markers carry no walkable content and are
    /// dropped.
    pub fn load_model(&mut self, rows: &[SemanticRow]) -> LhmResult<()> {
        for row in rows {
            match row.property_type {
                PropertyType::Specialization | PropertyType::Specialized => {
                    trace!(class_term = %row.class_term, "skipping specialization marker");
                }
                t if t.is_class() => {
                    self.classes
                        .entry(row.class_term.clone())
                        .or_insert_with(|| ClassEntry {
                            row: row.clone(),
                            properties: IndexMap::new(),
                        });
                }
                _ => {
                    let entry = self
                        .classes
                        .get_mut(&row.class_term)
                        .ok_or_else(|| LhmError::undefined_class(&row.class_term))?;
                    let mut property = row.clone();
                    property.class_term = entry.row.class_term.clone();
                    entry.properties.insert(walk_term(row), property);
                }
            }
        }
        Ok(())
    }

    /// Walk the model from each root present in the registry and
    /// assign paths. At least one root must resolve.
    pub fn walk(&mut self, roots: &[String]) -> LhmResult<Vec<LhmNode>> {
        let mut root_found = false;
        for root in roots {
            if self.classes.contains_key(root) {
                root_found = true;
                debug!(root = %root, "walking root class");
                self.parse_class(root, false)?;
            }
        }
        if !root_found {
            return Err(LhmError::root_not_found(roots));
        }
        Ok(paths::assign_paths(&self.model))
    }

    /// Resolve a descent term against the registry: try as given, then
    /// rewrite up to four leading `"<qualifier>_ "` segments into a
    /// module prefix, then fall back to a substring match.
    fn resolve(&self, class_term: &str) -> LhmResult<String> {
        let mut term = class_term.to_string();
        for _ in 0..4 {
            if self.classes.contains_key(&term) {
                return Ok(term);
            }
            let Some((_, rest)) = term.split_once("_ ") else {
                break;
            };
            let prefix: String = term.chars().take(3).collect();
            term = format!("{}:{}", prefix, rest);
        }
        if self.classes.contains_key(&term) {
            return Ok(term);
        }
        let bare: String = term.chars().skip(4).collect();
        if !bare.is_empty() {
            if let Some(key) = self.classes.keys().find(|k| k.contains(&bare)) {
                trace!(class_term, resolved = %key, "resolved by substring match");
                return Ok(key.clone());
            }
        }
        Err(LhmError::unresolved(class_term, term))
    }

    fn parse_class(&mut self, class_term: &str, reference_of: bool) -> LhmResult<()> {
        let resolved = self.resolve(class_term)?;
        let entry = self.classes[&resolved].clone();

        self.lifo.push(class_term.to_string());
        let level = self.lifo.len() as u8;
        let lifo_term = self.lifo.join("-");
        trace!(class_term, resolved = %resolved, level, reference_of, "descending");

        let mut row = entry.row.clone();
        row.level = level;
        if level > 1 {
            row.class_term = lifo_term.clone();
        }

        let kind;
        let mut originating = String::new();
        if reference_of {
            kind = NodeKind::Reference;
            row.property_type = PropertyType::ReferenceAssociation;
            row.definition = row.definition.replace(
                "A class",
                &format!(
                    "The reference association to the {} class, which is a class",
                    class_term.replace('_', " ")
                ),
            );
            originating = lifo_term.clone();
        } else {
            kind = NodeKind::Class;
        }
        if level > 1 && row.multiplicity.is_none() {
            row.multiplicity = self.current_multiplicity;
        }
        self.model.push(WalkNode {
            row,
            kind,
            level,
            originating_class_term: originating,
        });

        if reference_of {
            // Only the primary key crosses a reference association; it
            // lands as a foreign-key leaf and the walk stops here.
            for property in entry.properties.values() {
                let is_pk = property.property_type == PropertyType::AttributePk
                    || (property.property_type.is_attribute() && property.identifier == "PK");
                if !is_pk {
                    continue;
                }
                let mut row = property.clone();
                row.level = level + 1;
                row.identifier = "REF".to_string();
                row.class_term = lifo_term.clone();
                row.definition = row
                    .definition
                    .replace("unique identifier", "reference identifier");
                self.model.push(WalkNode {
                    row,
                    kind: NodeKind::Attribute,
                    level: level + 1,
                    originating_class_term: String::new(),
                });
            }
        } else {
            for property in entry
                .properties
                .values()
                .filter(|p| p.property_type.is_attribute())
            {
                let mut row = property.clone();
                row.level = level + 1;
                row.identifier.clear();
                row.class_term = lifo_term.clone();
                self.model.push(WalkNode {
                    row,
                    kind: NodeKind::Attribute,
                    level: level + 1,
                    originating_class_term: String::new(),
                });
            }

            let associations: Vec<SemanticRow> = entry
                .properties
                .values()
                .filter(|p| {
                    matches!(
                        p.property_type,
                        PropertyType::ReferenceAssociation
                            | PropertyType::Aggregation
                            | PropertyType::Composition
                    )
                })
                .cloned()
                .collect();
            for wanted in 0..3 {
                for property in associations
                    .iter()
                    .filter(|p| bucket(p.multiplicity) == Some(wanted))
                {
                    let key = walk_term(property);
                    let reference =
                        property.property_type == PropertyType::ReferenceAssociation;
                    // References never descend past the primary key, so
                    // re-entering a class on the stack cannot loop.
                    if key.is_empty() || (!reference && self.lifo.contains(&key)) {
                        continue;
                    }
                    self.current_multiplicity = property.multiplicity;
                    debug!(
                        level,
                        class = %property.class_term,
                        multiplicity = %property.multiplicity_str(),
                        target = %key,
                        "selected association"
                    );
                    self.parse_class(&key, reference)?;
                }
            }
        }

        self.lifo.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(term: &str, id: &str) -> SemanticRow {
        let mut row = SemanticRow::new(PropertyType::Class, term);
        row.id = id.to_string();
        row.module = term.split(':').next().unwrap_or("").to_string();
        row.definition = format!("A class to describe {}.", term);
        row
    }

    fn attribute(class: &str, term: &str, rep: &str, mult: &str, id: &str) -> SemanticRow {
        let mut row = SemanticRow::new(PropertyType::Attribute, class);
        row.property_term = term.to_string();
        row.representation_term = rep.to_string();
        row.multiplicity = Some(mult.parse().unwrap());
        row.id = id.to_string();
        row
    }

    fn primary_key(class: &str, id: &str) -> SemanticRow {
        let mut row = attribute(class, "Identifier", "Identifier", "1..1", id);
        row.identifier = "PK".to_string();
        row.definition = "The unique identifier of the class.".to_string();
        row
    }

    fn association(
        kind: PropertyType,
        class: &str,
        target: &str,
        mult: &str,
        id: &str,
    ) -> SemanticRow {
        let mut row = SemanticRow::new(kind, class);
        row.associated_class = target.to_string();
        row.multiplicity = Some(mult.parse().unwrap());
        row.id = id.to_string();
        row
    }

    fn ledger_model() -> Vec<SemanticRow> {
        vec![
            class("cor:Accounting Entries", "GE01"),
            primary_key("cor:Accounting Entries", "GE01_01"),
            association(
                PropertyType::Composition,
                "cor:Accounting Entries",
                "cor:Accounting Entry",
                "0..*",
                "GE01_02",
            ),
            class("cor:Accounting Entry", "GE02"),
            attribute("cor:Accounting Entry", "Posting Date", "Date", "0..1", "GE02_01"),
            association(
                PropertyType::ReferenceAssociation,
                "cor:Accounting Entry",
                "bus:Accountant",
                "0..1",
                "GE02_02",
            ),
            class("bus:Accountant", "BU01"),
            primary_key("bus:Accountant", "BU01_01"),
            attribute("bus:Accountant", "Name", "Text", "0..1", "BU01_02"),
        ]
    }

    fn walk(rows: &[SemanticRow], roots: &[&str]) -> LhmResult<Vec<LhmNode>> {
        let mut walker = GraphWalker::new();
        walker.load_model(rows)?;
        let roots: Vec<String> = roots.iter().map(|s| s.to_string()).collect();
        walker.walk(&roots)
    }

    #[test]
    fn test_walk_emits_depth_first() {
        let nodes = walk(&ledger_model(), &["cor:Accounting Entries"]).unwrap();
        let shape: Vec<(u8, NodeKind)> = nodes.iter().map(|n| (n.level, n.kind)).collect();
        assert_eq!(
            shape,
            vec![
                (1, NodeKind::Class),
                (2, NodeKind::Attribute),
                (2, NodeKind::Class),
                (3, NodeKind::Attribute),
                (3, NodeKind::Reference),
                (4, NodeKind::Attribute),
            ]
        );
        assert_eq!(
            nodes[2].class_term,
            "cor:Accounting Entries-cor:Accounting Entry"
        );
        let sequences: Vec<u32> = nodes.iter().map(|n| n.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_reference_association_copies_only_primary_key() {
        let nodes = walk(&ledger_model(), &["cor:Accounting Entries"]).unwrap();
        let reference = &nodes[4];
        assert_eq!(reference.kind, NodeKind::Reference);
        assert!(reference
            .definition
            .starts_with("The reference association to the bus:Accountant class"));

        let leaf = &nodes[5];
        assert_eq!(leaf.identifier, "REF");
        assert_eq!(leaf.datatype, "Identifier");
        assert!(leaf.definition.contains("reference identifier"));
        // The Name attribute of the referenced class is not copied.
        assert!(!nodes.iter().any(|n| n.name.contains("Name")));
    }

    #[test]
    fn test_descended_attributes_drop_their_key_flag() {
        let nodes = walk(&ledger_model(), &["cor:Accounting Entries"]).unwrap();
        // The root's own primary key lands as a plain attribute; only
        // reference leaves carry an identifier flag.
        assert_eq!(nodes[1].datatype, "Identifier");
        assert_eq!(nodes[1].identifier, "");
        let flagged: Vec<&str> = nodes
            .iter()
            .filter(|n| !n.identifier.is_empty())
            .map(|n| n.identifier.as_str())
            .collect();
        assert_eq!(flagged, vec!["REF"]);
    }

    #[test]
    fn test_cycle_guard_stops_reentry() {
        let rows = vec![
            class("cor:Entry", "GE01"),
            association(PropertyType::Composition, "cor:Entry", "cor:Detail", "1..*", "GE01_01"),
            class("cor:Detail", "GE02"),
            association(PropertyType::Composition, "cor:Detail", "cor:Entry", "0..*", "GE02_01"),
        ];
        let nodes = walk(&rows, &["cor:Entry"]).unwrap();
        let classes: Vec<&str> = nodes.iter().map(|n| n.class_term.as_str()).collect();
        assert_eq!(classes, vec!["cor:Entry", "cor:Entry-cor:Detail"]);
    }

    #[test]
    fn test_reference_back_into_the_path_still_lands() {
        let rows = vec![
            class("cor:Entry", "GE01"),
            primary_key("cor:Entry", "GE01_01"),
            association(PropertyType::Composition, "cor:Entry", "cor:Detail", "1..*", "GE01_02"),
            class("cor:Detail", "GE02"),
            association(
                PropertyType::ReferenceAssociation,
                "cor:Detail",
                "cor:Entry",
                "1..1",
                "GE02_01",
            ),
        ];
        let nodes = walk(&rows, &["cor:Entry"]).unwrap();
        let shape: Vec<(u8, NodeKind)> = nodes.iter().map(|n| (n.level, n.kind)).collect();
        assert_eq!(
            shape,
            vec![
                (1, NodeKind::Class),
                (2, NodeKind::Attribute),
                (2, NodeKind::Class),
                (3, NodeKind::Reference),
                (4, NodeKind::Attribute),
            ]
        );
        assert_eq!(nodes[4].identifier, "REF");
    }

    #[test]
    fn test_mandatory_associations_descend_first() {
        let rows = vec![
            class("cor:Entry", "GE01"),
            association(PropertyType::Composition, "cor:Entry", "cor:Line", "0..*", "GE01_01"),
            association(PropertyType::Aggregation, "cor:Entry", "cor:Header", "1..1", "GE01_02"),
            class("cor:Line", "GE02"),
            class("cor:Header", "GE03"),
        ];
        let nodes = walk(&rows, &["cor:Entry"]).unwrap();
        let order: Vec<&str> = nodes[1..].iter().map(|n| n.class_term.as_str()).collect();
        // Header is mandatory singular and wins over the plural Line
        // despite being declared later.
        assert_eq!(
            order,
            vec!["cor:Entry-cor:Header", "cor:Entry-cor:Line"]
        );
    }

    #[test]
    fn test_qualified_association_resolves_by_substring() {
        let mut qualified = association(
            PropertyType::Aggregation,
            "cor:Entry",
            "cor:Authority",
            "0..1",
            "GE01_01",
        );
        qualified.property_term = "Tax".to_string();
        let rows = vec![
            class("cor:Entry", "GE01"),
            qualified,
            class("cor:Authority", "GE02"),
        ];
        let nodes = walk(&rows, &["cor:Entry"]).unwrap();
        assert_eq!(nodes[1].class_term, "cor:Entry-Tax_ Authority");
        assert_eq!(nodes[1].multiplicity, "0..1");
    }

    #[test]
    fn test_association_multiplicity_lands_on_class_node() {
        let nodes = walk(&ledger_model(), &["cor:Accounting Entries"]).unwrap();
        // The Accounting Entry class row has no multiplicity of its
        // own; the composition that led there supplies 0..*.
        assert_eq!(nodes[2].multiplicity, "0..*");
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let err = walk(&ledger_model(), &["cor:Ghost"]).unwrap_err();
        assert!(matches!(err, LhmError::RootNotFound { .. }));
    }

    #[test]
    fn test_unresolved_association_is_fatal() {
        let rows = vec![
            class("cor:Entry", "GE01"),
            association(PropertyType::Composition, "cor:Entry", "cor:Ghost", "1..1", "GE01_01"),
        ];
        let err = walk(&rows, &["cor:Entry"]).unwrap_err();
        assert!(matches!(err, LhmError::UnresolvedClass { .. }));
    }

    #[test]
    fn test_property_for_unknown_class_is_fatal() {
        let rows = vec![attribute("cor:Ghost", "Name", "Text", "0..1", "GE01_01")];
        let mut walker = GraphWalker::new();
        let err = walker.load_model(&rows).unwrap_err();
        assert!(matches!(err, LhmError::UndefinedClass { .. }));
    }

    #[test]
    fn test_specialization_markers_are_skipped() {
        let mut marker = SemanticRow::new(PropertyType::Specialization, "cor:Entry");
        marker.associated_class = "cor:Base".to_string();
        let rows = vec![class("cor:Entry", "GE01"), marker];
        let nodes = walk(&rows, &["cor:Entry"]).unwrap();
        assert_eq!(nodes.len(), 1);
    }
}
