//! BIE definition-sheet reader

use crate::errors::{CsvError, CsvResult};
use crate::header::{field, Header};
use sem_model::BieRow;
use std::io::Read;
use tracing::debug;

/// Required columns of a BIE sheet, case-sensitive.
pub const BIE_COLUMNS: [&str; 24] = [
    "sequence",
    "UNID",
    "acronym",
    "DEN",
    "definition",
    "class_term_qualifier",
    "class_term",
    "property_term_qualifier",
    "property_term",
    "datatype_qualifier",
    "representation_term",
    "qualified_data_type_UID",
    "associated_class_qualifier",
    "associated_class",
    "business_term",
    "usage_rule",
    "sequence_number",
    "occurrence_min",
    "occurrence_max",
    "context_categories",
    "TDED",
    "publication_source",
    "short_name",
    "BIE",
];

/// Read a BIE sheet. Rows with an empty `sequence` are skipped and a
/// row whose `acronym` is `END` terminates the input.
pub fn read_bie<R: Read>(reader: R) -> CsvResult<Vec<BieRow>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header = Header::from_record(
        csv_reader
            .headers()
            .map_err(|e| CsvError::read_at(1, e.to_string()))?,
    );
    let mut index = [0usize; BIE_COLUMNS.len()];
    for (slot, name) in index.iter_mut().zip(BIE_COLUMNS) {
        *slot = header.require(name)?;
    }

    let mut rows = Vec::new();
    for (position, record) in csv_reader.records().enumerate() {
        let line = position + 2;
        let record = record.map_err(|e| CsvError::read_at(line, e.to_string()))?;
        let get = |column: usize| field(&record, index[column]).to_string();

        if get(2) == "END" {
            debug!(line, "END marker reached");
            break;
        }
        if get(0).is_empty() {
            continue;
        }

        rows.push(BieRow {
            sequence: get(0),
            unid: get(1),
            acronym: get(2),
            den: get(3),
            definition: get(4),
            class_term_qualifier: get(5),
            class_term: get(6),
            property_term_qualifier: get(7),
            property_term: get(8),
            datatype_qualifier: get(9),
            representation_term: get(10),
            qualified_data_type_uid: get(11),
            associated_class_qualifier: get(12),
            associated_class: get(13),
            business_term: get(14),
            usage_rule: get(15),
            sequence_number: get(16),
            occurrence_min: get(17),
            occurrence_max: get(18),
            context_categories: get(19),
            tded: get(20),
            publication_source: get(21),
            short_name: get(22),
            bie: get(23),
        });
    }
    debug!(row_count = rows.len(), "read BIE sheet");
    Ok(rows)
}
