//! Header lookup shared by the readers

use crate::errors::{CsvError, CsvResult};

/// Column positions resolved from a header row. The UTF-8 byte-order
/// mark some spreadsheet exports prepend is stripped from the first
/// column name.
pub(crate) struct Header {
    columns: Vec<String>,
}

impl Header {
    pub(crate) fn from_record(record: &csv::StringRecord) -> Self {
        let mut columns: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        if let Some(first) = columns.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }
        Self { columns }
    }

    pub(crate) fn require(&self, name: &str) -> CsvResult<usize> {
        self.find(name).ok_or_else(|| CsvError::missing_column(name))
    }

    pub(crate) fn find(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// A field by resolved position, empty when the row is short.
pub(crate) fn field<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_stripped_from_first_column() {
        let record = csv::StringRecord::from(vec!["\u{feff}sequence", "level"]);
        let header = Header::from_record(&record);
        assert_eq!(header.require("sequence").unwrap(), 0);
        assert_eq!(header.require("level").unwrap(), 1);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let record = csv::StringRecord::from(vec!["sequence"]);
        let header = Header::from_record(&record);
        let err = header.require("module").unwrap_err();
        assert!(err.to_string().contains("'module'"));
    }
}
