//! FSM and BSM artifact readers and writers

use crate::errors::{CsvError, CsvResult};
use crate::header::{field, Header};
use sem_model::SemanticRow;
use std::io::{Read, Write};
use tracing::debug;

/// Base columns shared by the FSM and BSM artifacts.
pub const FSM_COLUMNS: [&str; 13] = [
    "sequence",
    "level",
    "property_type",
    "identifier",
    "class_term",
    "property_term",
    "representation_term",
    "associated_class",
    "multiplicity",
    "definition",
    "module",
    "label_local",
    "definition_local",
];

/// Read a flattened semantic model. Both the FSM artifact (with its
/// `id` and `inherited` columns) and the BSM artifact (with `id`) are
/// accepted; the extra columns are picked up when present. Fully empty
/// rows are skipped.
pub fn read_semantic_rows<R: Read>(reader: R) -> CsvResult<Vec<SemanticRow>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header = Header::from_record(
        csv_reader
            .headers()
            .map_err(|e| CsvError::read_at(1, e.to_string()))?,
    );
    let mut index = [0usize; FSM_COLUMNS.len()];
    for (slot, name) in index.iter_mut().zip(FSM_COLUMNS) {
        *slot = header.require(name)?;
    }
    let id_index = header.find("id");
    let inherited_index = header.find("inherited");

    let mut rows = Vec::new();
    for (position, record) in csv_reader.records().enumerate() {
        let line = position + 2;
        let record = record.map_err(|e| CsvError::read_at(line, e.to_string()))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let get = |column: usize| field(&record, index[column]).to_string();

        let property_type = get(2)
            .parse()
            .map_err(|e: sem_model::ParseKindError| {
                CsvError::conversion(line, "property_type", e.to_string())
            })?;
        let mut row = SemanticRow::new(property_type, get(4));
        row.sequence = get(0);
        let level = get(1);
        if !level.is_empty() {
            row.level = level
                .trim()
                .parse()
                .map_err(|_| CsvError::conversion(line, "level", format!("'{}' is not a level", level)))?;
        }
        row.identifier = get(3);
        row.property_term = get(5);
        row.representation_term = get(6);
        row.associated_class = get(7);
        let multiplicity = get(8);
        if !multiplicity.is_empty() {
            row.multiplicity = Some(multiplicity.parse().map_err(
                |e: sem_model::ParseMultiplicityError| {
                    CsvError::conversion(line, "multiplicity", e.to_string())
                },
            )?);
        }
        row.definition = get(9);
        row.module = get(10);
        row.label_local = get(11);
        row.definition_local = get(12);
        if let Some(id) = id_index {
            row.id = field(&record, id).to_string();
        }
        if let Some(inherited) = inherited_index {
            let tag = field(&record, inherited);
            if !tag.is_empty() {
                row.inherited = Some(tag.parse().map_err(|e: sem_model::ParseTagError| {
                    CsvError::conversion(line, "inherited", e.to_string())
                })?);
            }
        }
        rows.push(row);
    }
    debug!(row_count = rows.len(), "read semantic model");
    Ok(rows)
}

fn base_fields(row: &SemanticRow) -> Vec<String> {
    vec![
        row.sequence.clone(),
        row.level.to_string(),
        row.property_type.to_string(),
        row.identifier.clone(),
        row.class_term.clone(),
        row.property_term.clone(),
        row.representation_term.clone(),
        row.associated_class.clone(),
        row.multiplicity_str(),
        row.definition.clone(),
        row.module.clone(),
        row.label_local.clone(),
        row.definition_local.clone(),
    ]
}

fn write_rows<W: Write>(
    writer: W,
    header: &[&str],
    rows: &[SemanticRow],
    extra: impl Fn(&SemanticRow) -> Vec<String>,
) -> CsvResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(header)
        .map_err(|e| CsvError::write(e.to_string()))?;
    for row in rows {
        let mut record = base_fields(row);
        record.extend(extra(row));
        csv_writer
            .write_record(&record)
            .map_err(|e| CsvError::write(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| CsvError::write(e.to_string()))?;
    debug!(row_count = rows.len(), "wrote semantic model");
    Ok(())
}

/// Write the FSM artifact: base columns plus `id` and `inherited`.
pub fn write_fsm<W: Write>(writer: W, rows: &[SemanticRow]) -> CsvResult<()> {
    let mut header: Vec<&str> = FSM_COLUMNS.to_vec();
    header.extend(["id", "inherited"]);
    write_rows(writer, &header, rows, |row| {
        vec![row.id.clone(), row.inherited_str()]
    })
}

/// Write the BSM artifact: base columns plus `id`.
pub fn write_bsm<W: Write>(writer: W, rows: &[SemanticRow]) -> CsvResult<()> {
    let mut header: Vec<&str> = FSM_COLUMNS.to_vec();
    header.push("id");
    write_rows(writer, &header, rows, |row| vec![row.id.clone()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use sem_model::{InheritanceTag, Multiplicity, PropertyType};

    fn sample_rows() -> Vec<SemanticRow> {
        let mut class = SemanticRow::new(PropertyType::Class, "cor:Entry");
        class.sequence = "1".to_string();
        class.id = "CO0001".to_string();
        class.module = "gen".to_string();

        let mut attribute = SemanticRow::new(PropertyType::Attribute, "cor:Entry");
        attribute.sequence = "2".to_string();
        attribute.property_term = "Posting Date".to_string();
        attribute.representation_term = "Date".to_string();
        attribute.multiplicity = Some(Multiplicity::optional());
        attribute.id = "CO0001_001".to_string();
        attribute.inherited = Some(InheritanceTag::Extension);

        vec![class, attribute]
    }

    #[test]
    fn test_fsm_round_trip() {
        let mut buffer = Vec::new();
        write_fsm(&mut buffer, &sample_rows()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("sequence,level,property_type"));
        assert!(text.contains(",id,inherited"));

        let rows = read_semantic_rows(text.as_bytes()).unwrap();
        assert_eq!(rows, sample_rows());
    }

    #[test]
    fn test_bsm_drops_inherited_column() {
        let mut buffer = Vec::new();
        write_bsm(&mut buffer, &sample_rows()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(!text.contains("inherited"));

        let rows = read_semantic_rows(text.as_bytes()).unwrap();
        assert_eq!(rows[1].id, "CO0001_001");
        assert_eq!(rows[1].inherited, None);
    }

    #[test]
    fn test_bad_multiplicity_reports_line() {
        let text = format!("{}\n1,2,Attribute,,cor:Entry,Name,Text,,7..2,,,,", FSM_COLUMNS.join(","));
        let err = read_semantic_rows(text.as_bytes()).unwrap_err();
        assert_eq!(err.line_number(), Some(2));
        assert!(err.to_string().contains("multiplicity"));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let text = format!("{}\n,,,,,,,,,,,,\n1,1,Class,,cor:Entry,,,,,,gen,,", FSM_COLUMNS.join(","));
        let rows = read_semantic_rows(text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].class_term, "cor:Entry");
    }
}
