//! FSM to BSM resolution passes

use crate::error::{BsmError, BsmResult};
use crate::modules::ModuleCodes;
use indexmap::IndexMap;
use sem_fsm::validate::check_row;
use sem_model::text::{abbreviate_term, lc3, normalize_text};
use sem_model::{PropertyType, SemanticRow};
use sem_registry::{ClassRecord, ClassRegistry, PropertyRecord};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Resolver turning flattened FSM rows into the BSM.
///
/// Accepts several row sets so extension models can override or delete
/// properties of the base model.
pub struct SpecializationResolver {
    codes: ModuleCodes,
    registry: ClassRegistry,
    abstract_classes: HashSet<String>,
    records: Vec<SemanticRow>,
    module_classes: IndexMap<String, Vec<String>>,
    module_id: String,
    class_num: usize,
    current_class: String,
    property_seq: usize,
}

impl SpecializationResolver {
    pub fn new(codes: ModuleCodes) -> Self {
        Self {
            codes,
            registry: ClassRegistry::new(),
            abstract_classes: HashSet::new(),
            records: Vec::new(),
            module_classes: IndexMap::new(),
            module_id: "NA".to_string(),
            class_num: 0,
            current_class: String::new(),
            property_seq: 0,
        }
    }

    /// Resolve every input row set into the sorted BSM.
    pub fn resolve(mut self, inputs: &[Vec<SemanticRow>]) -> BsmResult<Vec<SemanticRow>> {
        for rows in inputs {
            self.ingest(rows)?;
        }
        self.attach()?;
        self.emit()
    }

    /// Pass 1: tag modules, reassign identifiers, and register every
    /// class so forward references resolve.
    fn ingest(&mut self, rows: &[SemanticRow]) -> BsmResult<()> {
        for (row_number, row) in rows.iter().enumerate() {
            let row_number = row_number + 1;
            if row.sequence.is_empty() && row.class_term.is_empty() {
                continue;
            }
            // Specialized markers restate inheritance the FSM already
            // inlined into the subclass rows.
            if row.property_type == PropertyType::Specialized {
                continue;
            }
            if row.module.is_empty() {
                return Err(BsmError::MissingModule { row: row_number });
            }
            check_row(row, &row.multiplicity_str())
                .map_err(|msg| BsmError::invalid_row(row_number, msg))?;

            let record = self.populate_row(row, row_number)?;

            if matches!(
                record.property_type,
                PropertyType::Class | PropertyType::AbstractClass
            ) && !self.registry.contains(&record.class_term)
            {
                self.registry
                    .insert_record(ClassRecord::new(record.clone()));
            }
            self.records.push(record);
        }
        Ok(())
    }

    fn populate_row(&mut self, row: &SemanticRow, row_number: usize) -> BsmResult<SemanticRow> {
        let mut record = row.clone();
        let tag = module_tag(&record.module);
        record.property_term = squeeze(&record.property_term);
        record.associated_class = squeeze(&record.associated_class);

        if record.property_type == PropertyType::Specialization {
            record.id = format!("{}{:02}_00", self.module_id, self.class_num);
            record.associated_class = format!("{}:{}", tag, record.associated_class);
            record.level = 2;
        } else if record.property_type.is_class() {
            let class_term = squeeze(&record.class_term);
            if class_term.is_empty() {
                return Err(BsmError::MissingClassTerm { row: row_number });
            }
            let class_term = format!("{}:{}", tag, class_term);

            if record.property_type == PropertyType::AbstractClass {
                self.abstract_classes.insert(class_term.clone());
            }
            if self.current_class != class_term {
                self.module_id = self.codes.code(&tag).to_string();
                let classes = self.module_classes.entry(self.module_id.clone()).or_default();
                if !classes.contains(&class_term) {
                    classes.push(class_term.clone());
                }
                self.class_num = 1 + classes.iter().position(|t| *t == class_term).unwrap_or(0);
                self.current_class = class_term.clone();
            }
            record.id = format!("{}{:02}", self.module_id, self.class_num);
            record.level = 1;
            self.property_seq = 1;
            debug!(sequence = %record.sequence, id = %record.id, class_term = %class_term, "class");
        } else {
            record.id = format!(
                "{}{:02}_{:02}",
                self.module_id, self.class_num, self.property_seq
            );
            self.property_seq += 1;
            if !record.property_term.is_empty() {
                record.property_term = format!("{}:{}", tag, record.property_term);
            }
            if !record.associated_class.is_empty() {
                record.associated_class = format!("{}:{}", tag, record.associated_class);
            }
            record.level = 2;
        }

        record.module = tag;
        record.class_term = self.current_class.clone();
        Ok(record)
    }

    /// Pass 2: attach properties to their owners, applying override
    /// and delete semantics.
    fn attach(&mut self) -> BsmResult<()> {
        let mut current_class_id = String::new();
        let records = std::mem::take(&mut self.records);
        for mut record in records {
            if record.property_type.is_class() {
                current_class_id = record.id.clone();
                continue;
            }
            let class_term = record.class_term.clone();
            if !self.registry.contains(&class_term) {
                return Err(BsmError::UnregisteredClass { class_term });
            }
            let key = property_key(&mut record);
            let suffix = record
                .id
                .rsplit('_')
                .next()
                .unwrap_or_default()
                .to_string();
            record.id = format!("{}_{}", current_class_id, suffix);

            let class = self
                .registry
                .get_mut(&class_term)
                .expect("class registered above");
            if record.multiplicity.is_some_and(|m| m.is_deleted()) {
                trace!(class_term = %class_term, property = %key, "property deleted");
                class.properties.shift_remove(&key);
            } else {
                class.properties.insert(key, PropertyRecord::new(record));
            }
        }
        Ok(())
    }

    /// Emit concrete classes with their properties, canonically
    /// sorted.
    fn emit(&mut self) -> BsmResult<Vec<SemanticRow>> {
        let mut out = Vec::new();
        for (class_term, class) in self.registry.iter() {
            if self.abstract_classes.contains(class_term) {
                continue;
            }
            out.push(class.row.clone());
            out.extend(class.properties.values().map(|p| p.row.clone()));
        }
        sort_records(&mut out)?;
        Ok(out)
    }
}

fn squeeze(term: &str) -> String {
    term.replace("  ", " ").trim().to_string()
}

/// Abbreviate a module name to its lowercase camel tag.
pub fn module_tag(module: &str) -> String {
    lc3(&abbreviate_term(&normalize_text(module), 4))
}

/// Key a property registers under. Associations with a property term
/// not already contained in the target fold the term into the target
/// as a qualifier.
fn property_key(record: &mut SemanticRow) -> String {
    if record.property_type.is_class() {
        return String::new();
    }
    if record.property_type.is_attribute() {
        return record.property_term.clone();
    }
    if !record.property_term.is_empty()
        && !record.associated_class.contains(&record.property_term)
    {
        let stripped = record
            .associated_class
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(&record.associated_class);
        let term = format!("{}_ {}", record.property_term, stripped);
        record.property_term = String::new();
        record.associated_class = term.clone();
        term
    } else {
        record.associated_class.clone()
    }
}

fn type_rank(property_type: PropertyType) -> u8 {
    match property_type {
        PropertyType::Class => 0,
        PropertyType::Attribute | PropertyType::AttributePk => 1,
        PropertyType::ReferenceAssociation => 2,
        PropertyType::Aggregation => 3,
        PropertyType::Composition => 4,
        _ => 9,
    }
}

/// Sort by base class term, property-type priority, numeric sequence,
/// then module. A non-numeric sequence is fatal.
fn sort_records(rows: &mut [SemanticRow]) -> BsmResult<()> {
    let mut keys = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        let seq: i64 = row
            .sequence
            .parse()
            .map_err(|_| BsmError::InvalidSequence {
                sequence: row.sequence.clone(),
                id: row.id.clone(),
            })?;
        let base = row
            .class_term
            .split('.')
            .next()
            .unwrap_or(&row.class_term)
            .to_string();
        keys.push((base, type_rank(row.property_type), seq, row.module.clone()));
    }
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let sorted: Vec<SemanticRow> = order.iter().map(|&i| rows[i].clone()).collect();
    rows.clone_from_slice(&sorted);
    Ok(())
}
