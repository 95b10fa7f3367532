//! Ordered flattening of the FSM into output rows

use crate::builder::resolve_superclass;
use sem_model::{InheritanceTag, Multiplicity, PropertyType, SemanticRow};
use sem_registry::{ClassRegistry, PropertyRecord};
use tracing::debug;

/// Flatten abstract pools first, then every concrete class with its
/// specialization marker, tagged properties, and prohibited rows.
pub fn flatten(abstracts: &mut ClassRegistry, registry: &mut ClassRegistry) -> Vec<SemanticRow> {
    let mut out = Vec::new();

    for (class_term, class) in abstracts.clone().iter() {
        debug!(class_term = %class_term, "flatten abstract class");
        out.push(class.row.clone());
        let mut properties: Vec<PropertyRecord> = class.properties.values().cloned().collect();
        sort_properties(&mut properties);
        out.extend(properties.into_iter().map(|p| p.row));
    }

    let class_terms: Vec<String> = registry.class_terms().cloned().collect();
    for class_term in class_terms {
        let Some(class) = registry.get(&class_term).cloned() else {
            continue;
        };
        debug!(class_term = %class_term, "flatten class");
        out.push(class.row.clone());

        let specialized = resolve_superclass(abstracts, registry, &class_term)
            .filter(|(term, _)| term != &class_term);

        let specialized_props = specialized.as_ref().map(|(term, superclass)| {
            let mut marker = superclass.row.clone();
            marker.level = 2;
            marker.property_type = PropertyType::Specialized;
            marker.class_term = class_term.clone();
            marker.associated_class = term.clone();
            marker.multiplicity = Some(Multiplicity::one());
            out.push(marker);
            superclass.properties.clone()
        });

        let mut properties: Vec<(String, PropertyRecord)> = class
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, prop) in properties.iter_mut() {
            match &specialized_props {
                Some(sup_props) => match sup_props.get(key) {
                    Some(sup) => {
                        prop.row.id = format!("{}({})", prop.row.id, sup.row.id);
                        prop.row.inherited = if prop.row.multiplicity == sup.row.multiplicity {
                            Some(InheritanceTag::Inheritance)
                        } else {
                            Some(InheritanceTag::Modified(
                                sup.row
                                    .multiplicity
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| "0".to_string()),
                            ))
                        };
                    }
                    None => prop.row.inherited = Some(InheritanceTag::Aligned),
                },
                None => prop.row.inherited = Some(InheritanceTag::Extension),
            }
        }
        let mut rows: Vec<PropertyRecord> = properties.into_iter().map(|(_, p)| p).collect();
        sort_properties(&mut rows);
        out.extend(rows.into_iter().map(|p| p.row));

        if let Some(sup_props) = specialized_props {
            let mut prohibited: Vec<PropertyRecord> = sup_props
                .iter()
                .filter(|(key, _)| !class.properties.contains_key(*key))
                .map(|(_, sup)| {
                    let mut prop = sup.clone();
                    prop.row.class_term = class_term.clone();
                    prop.row.inherited = Some(InheritanceTag::Prohibited);
                    prop.row.multiplicity = Some(Multiplicity::Deleted);
                    prop
                })
                .collect();
            sort_properties(&mut prohibited);
            out.extend(prohibited.into_iter().map(|p| p.row));
        }
    }

    out
}

/// Split a qualified term at its first `"_ "` into (qualifier, base).
fn split_qualified(term: &str) -> (String, String) {
    match term.find('_') {
        Some(idx) if idx + 2 <= term.len() => {
            (term[..idx].to_string(), term[idx + 2..].to_string())
        }
        _ => (String::new(), term.to_string()),
    }
}

/// Stable ordering of property rows: inheritance priority, then
/// property-type rank, then datatype / qualifier / association terms
/// alphabetically, then source sequence.
fn sort_properties(properties: &mut [PropertyRecord]) {
    properties.sort_by_key(|p| {
        let row = &p.row;
        let inhr_rank = match &row.inherited {
            Some(tag) if row.module.starts_with("Abstract Class") => tag.pool_rank(),
            Some(tag) => tag.concrete_rank(),
            None => 99,
        };
        let (dq, dtype) = split_qualified(&row.representation_term);
        let (aq, assoc) = split_qualified(&row.associated_class);
        let seq = row.sequence.parse::<i64>().unwrap_or(1_000_000);
        (
            inhr_rank,
            row.property_type.sort_rank(),
            dtype.to_lowercase(),
            dq.to_lowercase(),
            assoc.to_lowercase(),
            aq.to_lowercase(),
            row.property_term.to_lowercase(),
            seq,
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use sem_model::SemanticRow;

    fn prop(
        kind: PropertyType,
        term: &str,
        rep: &str,
        assoc: &str,
        seq: &str,
        tag: Option<InheritanceTag>,
    ) -> PropertyRecord {
        let mut row = SemanticRow::new(kind, "Invoice");
        row.property_term = term.to_string();
        row.representation_term = rep.to_string();
        row.associated_class = assoc.to_string();
        row.sequence = seq.to_string();
        row.inherited = tag;
        PropertyRecord::new(row)
    }

    #[test]
    fn test_sort_attributes_before_associations() {
        let mut props = vec![
            prop(PropertyType::Composition, "Line", "", "Invoice Line", "1", None),
            prop(PropertyType::Attribute, "Name", "Text", "", "2", None),
            prop(PropertyType::AttributePk, "Identifier", "Identifier", "", "3", None),
        ];
        sort_properties(&mut props);
        let kinds: Vec<_> = props.iter().map(|p| p.row.property_type).collect();
        assert_eq!(
            kinds,
            vec![
                PropertyType::AttributePk,
                PropertyType::Attribute,
                PropertyType::Composition
            ]
        );
    }

    #[test]
    fn test_sort_inheritance_priority_comes_first() {
        let mut props = vec![
            prop(
                PropertyType::Attribute,
                "Zed",
                "Text",
                "",
                "1",
                Some(InheritanceTag::Prohibited),
            ),
            prop(
                PropertyType::Attribute,
                "Alpha",
                "Text",
                "",
                "2",
                Some(InheritanceTag::Extension),
            ),
            prop(
                PropertyType::Attribute,
                "Mid",
                "Text",
                "",
                "3",
                Some(InheritanceTag::Inheritance),
            ),
        ];
        sort_properties(&mut props);
        let terms: Vec<_> = props.iter().map(|p| p.row.property_term.clone()).collect();
        assert_eq!(terms, vec!["Mid", "Alpha", "Zed"]);
    }

    #[test]
    fn test_sort_datatype_alphabetical_within_rank() {
        let mut props = vec![
            prop(PropertyType::Attribute, "B", "Text", "", "1", None),
            prop(PropertyType::Attribute, "A", "Code", "", "2", None),
            prop(PropertyType::Attribute, "C", "Amount", "", "3", None),
        ];
        sort_properties(&mut props);
        let reps: Vec<_> = props
            .iter()
            .map(|p| p.row.representation_term.clone())
            .collect();
        assert_eq!(reps, vec!["Amount", "Code", "Text"]);
    }

    #[test]
    fn test_sort_qualified_datatype_sorts_on_base() {
        // "Tax_ Amount" sorts with the Amounts, not under "T".
        let mut props = vec![
            prop(PropertyType::Attribute, "B", "Code", "", "1", None),
            prop(PropertyType::Attribute, "A", "Tax_ Amount", "", "2", None),
        ];
        sort_properties(&mut props);
        assert_eq!(props[0].row.representation_term, "Tax_ Amount");
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(
            split_qualified("Tax_ Amount"),
            ("Tax".to_string(), "Amount".to_string())
        );
        assert_eq!(split_qualified("Amount"), (String::new(), "Amount".to_string()));
    }
}
