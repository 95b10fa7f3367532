//! LHM artifact reader and writer

use crate::errors::{CsvError, CsvResult};
use crate::header::{field, Header};
use sem_lhm::LhmNode;
use std::io::{Read, Write};
use tracing::debug;

/// Columns of the hierarchical-model artifact.
pub const LHM_COLUMNS: [&str; 19] = [
    "sequence",
    "level",
    "type",
    "identifier",
    "name",
    "datatype",
    "multiplicity",
    "domain_name",
    "definition",
    "module",
    "class_term",
    "id",
    "path",
    "semantic_path",
    "abbreviation_path",
    "label_local",
    "definition_local",
    "element",
    "xpath",
];

/// Read an LHM artifact back into nodes.
pub fn read_lhm<R: Read>(reader: R) -> CsvResult<Vec<LhmNode>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header = Header::from_record(
        csv_reader
            .headers()
            .map_err(|e| CsvError::read_at(1, e.to_string()))?,
    );
    let mut index = [0usize; LHM_COLUMNS.len()];
    for (slot, name) in index.iter_mut().zip(LHM_COLUMNS) {
        *slot = header.require(name)?;
    }

    let mut nodes = Vec::new();
    for (position, record) in csv_reader.records().enumerate() {
        let line = position + 2;
        let record = record.map_err(|e| CsvError::read_at(line, e.to_string()))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let get = |column: usize| field(&record, index[column]).to_string();

        let sequence = get(0)
            .trim()
            .parse()
            .map_err(|_| CsvError::conversion(line, "sequence", format!("'{}' is not a sequence", get(0))))?;
        let level = get(1)
            .trim()
            .parse()
            .map_err(|_| CsvError::conversion(line, "level", format!("'{}' is not a level", get(1))))?;
        let kind = get(2)
            .parse()
            .map_err(|e: sem_lhm::ParseNodeKindError| {
                CsvError::conversion(line, "type", e.to_string())
            })?;

        nodes.push(LhmNode {
            sequence,
            level,
            kind,
            identifier: get(3),
            name: get(4),
            datatype: get(5),
            multiplicity: get(6),
            domain_name: get(7),
            definition: get(8),
            module: get(9),
            class_term: get(10),
            id: get(11),
            path: get(12),
            semantic_path: get(13),
            abbreviation_path: get(14),
            label_local: get(15),
            definition_local: get(16),
            element: get(17),
            xpath: get(18),
        });
    }
    debug!(node_count = nodes.len(), "read hierarchical model");
    Ok(nodes)
}

/// Write the LHM artifact.
pub fn write_lhm<W: Write>(writer: W, nodes: &[LhmNode]) -> CsvResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(LHM_COLUMNS)
        .map_err(|e| CsvError::write(e.to_string()))?;
    for node in nodes {
        csv_writer
            .write_record([
                node.sequence.to_string(),
                node.level.to_string(),
                node.kind.to_string(),
                node.identifier.clone(),
                node.name.clone(),
                node.datatype.clone(),
                node.multiplicity.clone(),
                node.domain_name.clone(),
                node.definition.clone(),
                node.module.clone(),
                node.class_term.clone(),
                node.id.clone(),
                node.path.clone(),
                node.semantic_path.clone(),
                node.abbreviation_path.clone(),
                node.label_local.clone(),
                node.definition_local.clone(),
                node.element.clone(),
                node.xpath.clone(),
            ])
            .map_err(|e| CsvError::write(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| CsvError::write(e.to_string()))?;
    debug!(node_count = nodes.len(), "wrote hierarchical model");
    Ok(())
}
