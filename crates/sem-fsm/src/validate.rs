//! Structural validation of normalized semantic rows

use sem_model::{PropertyType, SemanticRow};

const ACCEPTED_MULTIPLICITY: &[&str] = &["1", "1..1", "1..*", "0..1", "0..2", "0..*", "0..0", "0"];

/// Validate a normalized row before registration.
///
/// Class rows must leave the property fields empty; attributes need a
/// property term and representation term unless deleted; associations
/// need an associated class. Module, property type, and class term are
/// always mandatory, and non-class multiplicities must come from the
/// accepted set.
pub fn check_row(row: &SemanticRow, raw_multiplicity: &str) -> Result<(), String> {
    if !row.property_type.is_class()
        && !ACCEPTED_MULTIPLICITY.contains(&raw_multiplicity)
    {
        return Err(format!("Multiplicity '{}' is not valid.", raw_multiplicity));
    }

    for (name, value) in [
        ("module", &row.module),
        ("class_term", &row.class_term),
    ] {
        if value.is_empty() {
            return Err(format!("Missing mandatory field '{}'.", name));
        }
    }

    if row.property_type.is_class() {
        for (name, value) in [
            ("property_term", &row.property_term),
            ("representation_term", &row.representation_term),
            ("associated_class", &row.associated_class),
        ] {
            if !value.is_empty() {
                return Err(format!(
                    "Field '{}' must be empty for type {}.",
                    name, row.property_type
                ));
            }
        }
    } else if row.property_type.is_attribute() {
        if !matches!(raw_multiplicity, "0" | "0..0") {
            for (name, value) in [
                ("property_term", &row.property_term),
                ("representation_term", &row.representation_term),
            ] {
                if value.is_empty() {
                    return Err(format!(
                        "Field '{}' cannot be empty for type {}.",
                        name, row.property_type
                    ));
                }
            }
        }
    } else if row.property_type.is_association() {
        if row.associated_class.is_empty() {
            return Err(format!(
                "Field 'associated_class' cannot be empty for type {}.",
                row.property_type
            ));
        }
    } else if row.property_type != PropertyType::Specialized {
        return Err(format!("Property type {} is not valid.", row.property_type));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sem_model::PropertyType;

    fn base(kind: PropertyType) -> SemanticRow {
        let mut row = SemanticRow::new(kind, "Invoice");
        row.module = "Common".to_string();
        row
    }

    #[test]
    fn test_class_row_must_have_empty_property_fields() {
        let mut row = base(PropertyType::Class);
        assert!(check_row(&row, "").is_ok());
        row.property_term = "Name".to_string();
        let err = check_row(&row, "").unwrap_err();
        assert!(err.contains("property_term"));
    }

    #[test]
    fn test_attribute_needs_terms_unless_deleted() {
        let mut row = base(PropertyType::Attribute);
        let err = check_row(&row, "1..1").unwrap_err();
        assert!(err.contains("property_term"));

        // A deleted attribute may omit its terms.
        assert!(check_row(&row, "0").is_ok());
        assert!(check_row(&row, "0..0").is_ok());

        row.property_term = "Name".to_string();
        row.representation_term = "Text".to_string();
        assert!(check_row(&row, "1..1").is_ok());
    }

    #[test]
    fn test_association_needs_target() {
        let mut row = base(PropertyType::Composition);
        let err = check_row(&row, "0..*").unwrap_err();
        assert!(err.contains("associated_class"));
        row.associated_class = "Invoice Line".to_string();
        assert!(check_row(&row, "0..*").is_ok());
    }

    #[test]
    fn test_multiplicity_set_is_closed() {
        let mut row = base(PropertyType::Attribute);
        row.property_term = "Name".to_string();
        row.representation_term = "Text".to_string();
        for good in ["1", "1..1", "1..*", "0..1", "0..2", "0..*", "0..0", "0"] {
            assert!(check_row(&row, good).is_ok(), "{}", good);
        }
        for bad in ["", "2", "0..3", "1..2", "many"] {
            assert!(check_row(&row, bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_missing_module_rejected() {
        let mut row = base(PropertyType::Class);
        row.module.clear();
        let err = check_row(&row, "").unwrap_err();
        assert!(err.contains("module"));
    }
}
