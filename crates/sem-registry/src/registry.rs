//! Insertion-ordered class registry with duplicate merging

use crate::record::{ClassRecord, PropertyRecord};
use indexmap::IndexMap;
use sem_model::SemanticRow;
use tracing::trace;

/// Registry of every class seen by a pipeline stage, keyed by class
/// term and iterated in registration order.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, ClassRecord>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, class_term: &str) -> bool {
        self.classes.contains_key(class_term)
    }

    pub fn get(&self, class_term: &str) -> Option<&ClassRecord> {
        self.classes.get(class_term)
    }

    pub fn get_mut(&mut self, class_term: &str) -> Option<&mut ClassRecord> {
        self.classes.get_mut(class_term)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ClassRecord)> {
        self.classes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut ClassRecord)> {
        self.classes.iter_mut()
    }

    pub fn class_terms(&self) -> impl Iterator<Item = &String> {
        self.classes.keys()
    }

    /// Register a class row. A re-registration replaces the previous
    /// record and resets its property map; differing fields (other
    /// than sequence) are traced.
    pub fn register_class(&mut self, row: SemanticRow) {
        let class_term = row.class_term.trim().to_string();
        if let Some(existing) = self.classes.get(&class_term) {
            for (field, old, new) in row_diffs(&existing.row, &row) {
                trace!(
                    class_term = %class_term,
                    field,
                    old = %old,
                    new = %new,
                    "duplicate class definition differs"
                );
            }
        }
        self.classes.insert(class_term, ClassRecord::new(row));
    }

    /// Insert a raw class record, keeping its property map.
    pub fn insert_record(&mut self, record: ClassRecord) {
        self.classes
            .insert(record.class_term().trim().to_string(), record);
    }

    /// Register a property row under its class. Returns false when the
    /// class is unknown (the row is dropped with a trace).
    ///
    /// A duplicate key merges: multiplicity widens to cover both
    /// declarations and a differing definition is appended on a new
    /// line.
    pub fn register_property(&mut self, row: SemanticRow) -> bool {
        let class_term = row.class_term.trim().to_string();
        let key = row.property_key();
        let Some(class) = self.classes.get_mut(&class_term) else {
            trace!(
                class_term = %class_term,
                property = %key,
                "class is not defined, property dropped"
            );
            return false;
        };

        let mut row = row;
        if let Some(existing) = class.properties.get(&key) {
            for (field, old, new) in row_diffs(&existing.row, &row) {
                trace!(
                    class_term = %class_term,
                    property = %key,
                    field,
                    old = %old,
                    new = %new,
                    "duplicate property definition differs"
                );
            }
            match (existing.row.multiplicity, row.multiplicity) {
                (Some(a), Some(b)) if a != b => {
                    row.multiplicity = Some(a.widen(b));
                    trace!(
                        class_term = %class_term,
                        property = %key,
                        multiplicity = %row.multiplicity_str(),
                        "widened duplicate multiplicity"
                    );
                }
                (Some(a), None) => row.multiplicity = Some(a),
                _ => {}
            }
            if existing.row.definition != row.definition {
                row.definition = format!("{}\n{}", existing.row.definition, row.definition);
            }
        }
        class.properties.insert(key, PropertyRecord::new(row));
        true
    }
}

/// Field-by-field differences between two rows, sequence excluded.
fn row_diffs(a: &SemanticRow, b: &SemanticRow) -> Vec<(&'static str, String, String)> {
    let mut diffs = Vec::new();
    let mut push = |field: &'static str, old: &str, new: &str| {
        if old != new {
            diffs.push((field, old.to_string(), new.to_string()));
        }
    };
    push("property_type", &a.property_type.to_string(), &b.property_type.to_string());
    push("class_term", &a.class_term, &b.class_term);
    push("property_term", &a.property_term, &b.property_term);
    push("representation_term", &a.representation_term, &b.representation_term);
    push("associated_class", &a.associated_class, &b.associated_class);
    push("multiplicity", &a.multiplicity_str(), &b.multiplicity_str());
    push("definition", &a.definition, &b.definition);
    push("module", &a.module, &b.module);
    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use sem_model::{Multiplicity, PropertyType};

    fn class_row(term: &str) -> SemanticRow {
        let mut row = SemanticRow::new(PropertyType::Class, term);
        row.module = "Common".to_string();
        row
    }

    fn attr_row(class: &str, term: &str, mult: &str, definition: &str) -> SemanticRow {
        let mut row = SemanticRow::new(PropertyType::Attribute, class);
        row.property_term = term.to_string();
        row.representation_term = "Text".to_string();
        row.multiplicity = Some(mult.parse().unwrap());
        row.definition = definition.to_string();
        row
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ClassRegistry::new();
        registry.register_class(class_row("Invoice"));
        assert!(registry.contains("Invoice"));
        assert!(registry.register_property(attr_row("Invoice", "Name", "1..1", "The name.")));

        let class = registry.get("Invoice").unwrap();
        assert_eq!(class.properties.len(), 1);
        assert!(class.properties.contains_key("Name. Text"));
    }

    #[test]
    fn test_property_for_unknown_class_dropped() {
        let mut registry = ClassRegistry::new();
        assert!(!registry.register_property(attr_row("Ghost", "Name", "1..1", "x")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_property_widens_multiplicity() {
        let mut registry = ClassRegistry::new();
        registry.register_class(class_row("Invoice"));
        registry.register_property(attr_row("Invoice", "Name", "1..1", "The name."));
        registry.register_property(attr_row("Invoice", "Name", "0..*", "The name."));

        let class = registry.get("Invoice").unwrap();
        let prop = &class.properties["Name. Text"];
        assert_eq!(prop.row.multiplicity, Some(Multiplicity::many()));
        assert_eq!(prop.row.definition, "The name.");
    }

    #[test]
    fn test_duplicate_property_concatenates_differing_definition() {
        let mut registry = ClassRegistry::new();
        registry.register_class(class_row("Invoice"));
        registry.register_property(attr_row("Invoice", "Name", "1..1", "First wording."));
        registry.register_property(attr_row("Invoice", "Name", "1..1", "Second wording."));

        let class = registry.get("Invoice").unwrap();
        let prop = &class.properties["Name. Text"];
        assert_eq!(prop.row.definition, "First wording.\nSecond wording.");
    }

    #[test]
    fn test_duplicate_class_resets_properties() {
        let mut registry = ClassRegistry::new();
        registry.register_class(class_row("Invoice"));
        registry.register_property(attr_row("Invoice", "Name", "1..1", "x"));
        registry.register_class(class_row("Invoice"));
        assert!(registry.get("Invoice").unwrap().properties.is_empty());
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = ClassRegistry::new();
        for term in ["Zebra", "Apple", "Mango"] {
            registry.register_class(class_row(term));
        }
        let terms: Vec<_> = registry.class_terms().cloned().collect();
        assert_eq!(terms, vec!["Zebra", "Apple", "Mango"]);
    }
}
