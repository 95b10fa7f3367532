//! Two-pass FSM construction from BIE rows

use crate::error::{FsmError, FsmResult};
use crate::flatten;
use crate::validate::check_row;
use sem_model::{BieRow, InheritanceTag, Multiplicity, PropertyType, SemanticRow};
use sem_model::text::normalize_ws;
use sem_registry::{superclass_chain, ClassRecord, ClassRegistry, PropertyRecord};
use tracing::{debug, trace};

/// Tunables for FSM construction.
#[derive(Debug, Clone)]
pub struct FsmConfig {
    /// Module code prefixed to generated identifiers
    pub module_code: String,
    /// A pooled property must be inherited by more classes than this
    /// to rank as `Shared`; pools with no such property are dropped
    pub threshold: u32,
    /// First numeric id assigned to derived abstract classes
    pub abstract_id_start: u32,
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self {
            module_code: "CO".to_string(),
            threshold: 3,
            abstract_id_start: 5000,
        }
    }
}

/// Builder turning BIE rows into the flattened FSM.
pub struct FsmBuilder {
    config: FsmConfig,
    registry: ClassRegistry,
    abstracts: ClassRegistry,
    class_terms: Vec<String>,
    current_class: String,
    class_num: usize,
    property_seq: usize,
}

impl FsmBuilder {
    pub fn new(config: FsmConfig) -> Self {
        Self {
            config,
            registry: ClassRegistry::new(),
            abstracts: ClassRegistry::new(),
            class_terms: Vec::new(),
            current_class: String::new(),
            class_num: 0,
            property_seq: 0,
        }
    }

    /// Run both passes and return the flattened FSM rows.
    pub fn build(mut self, rows: &[BieRow]) -> FsmResult<Vec<SemanticRow>> {
        self.ingest(rows)?;
        self.derive_abstracts();
        self.prune_and_tag_pools();
        self.normalize_associations()?;
        Ok(flatten::flatten(&mut self.abstracts, &mut self.registry))
    }

    /// Pass 1: normalize rows, assign identifiers, register classes
    /// and their properties.
    fn ingest(&mut self, rows: &[BieRow]) -> FsmResult<()> {
        for bie in rows {
            if bie.sequence.is_empty() {
                continue;
            }
            let property_type = match bie.acronym.as_str() {
                "ABIE" => PropertyType::Class,
                "ASBIE" => PropertyType::Composition,
                "BBIE" => PropertyType::Attribute,
                "END" => break,
                _ => continue,
            };

            let raw_multiplicity = bie.multiplicity_spelling();
            let row = self.populate_row(bie, property_type, &raw_multiplicity)?;
            check_row(&row, &raw_multiplicity)
                .map_err(|msg| FsmError::invalid_row(&row.sequence, msg))?;

            if property_type.is_class() {
                debug!(sequence = %row.sequence, id = %row.id, class_term = %row.class_term, "class");
                self.registry.register_class(row);
            } else {
                self.registry.register_property(row);
            }
        }
        Ok(())
    }

    fn populate_row(
        &mut self,
        bie: &BieRow,
        property_type: PropertyType,
        raw_multiplicity: &str,
    ) -> FsmResult<SemanticRow> {
        let class_term = BieRow::qualify(&bie.class_term_qualifier, &bie.class_term);
        let mut row = SemanticRow::new(property_type, class_term.clone());
        row.sequence = bie.sequence.clone();
        row.property_term = BieRow::qualify(&bie.property_term_qualifier, &bie.property_term);
        row.representation_term =
            BieRow::qualify(&bie.datatype_qualifier, &bie.representation_term);
        row.associated_class =
            BieRow::qualify(&bie.associated_class_qualifier, &bie.associated_class);
        row.definition = normalize_ws(&bie.definition);
        row.module = bie.context_categories.clone();
        row.unid = bie.unid.clone();
        row.acronym = bie.acronym.clone();
        row.den = bie.den.clone();

        if !raw_multiplicity.is_empty() {
            row.multiplicity = Some(
                raw_multiplicity
                    .parse::<Multiplicity>()
                    .map_err(|e| FsmError::invalid_row(&row.sequence, e.to_string()))?,
            );
        }

        if property_type.is_class() {
            if self.current_class != row.class_term {
                if !self.class_terms.contains(&row.class_term) {
                    self.class_terms.push(row.class_term.clone());
                }
                self.class_num = 1 + self
                    .class_terms
                    .iter()
                    .position(|t| *t == row.class_term)
                    .unwrap_or(0);
                self.current_class = row.class_term.clone();
            }
            row.id = format!("{}{:04}", self.config.module_code, self.class_num);
            self.property_seq = 1;
        } else {
            row.id = format!(
                "{}{:04}_{:03}",
                self.config.module_code, self.class_num, self.property_seq
            );
            self.property_seq += 1;
            // Properties attach to the class most recently declared.
            if row.class_term != self.current_class {
                row.class_term = self.current_class.clone();
            }
        }
        Ok(row)
    }

    /// Pass 2a: pool properties of qualifier-chained classes into
    /// derived abstract superclasses.
    fn derive_abstracts(&mut self) {
        trace!("derive abstract classes");
        let mut next_id = self.config.abstract_id_start;
        let class_terms: Vec<String> = self.registry.class_terms().cloned().collect();

        for class_term in class_terms {
            let Some(class) = self.registry.get(&class_term) else {
                continue;
            };
            let (chain, properties): (Vec<String>, _) = if class_term.contains('_') {
                (
                    superclass_chain(&class_term, false).collect(),
                    class.properties.clone(),
                )
            } else if class.row.module == "In All Contexts" {
                if class.properties.len() < 3 {
                    continue;
                }
                (
                    superclass_chain(&class_term, true).collect(),
                    class.properties.clone(),
                )
            } else {
                continue;
            };

            let class_row = class.row.clone();
            for superclass_term in chain {
                self.ensure_abstract_class(&superclass_term, &class_row, next_id);
                self.merge_into_abstract(&superclass_term, &properties, next_id);
                next_id += 1;
            }
        }
    }

    fn ensure_abstract_class(&mut self, superclass_term: &str, origin: &SemanticRow, id_num: u32) {
        if self.abstracts.contains(superclass_term) {
            return;
        }
        let mut row = origin.clone();
        row.module = abstract_module(&row.module);
        row.property_type = PropertyType::AbstractClass;
        row.level = 1;
        row.class_term = superclass_term.to_string();
        row.id = format!("{}{:04}", self.config.module_code, id_num);
        trace!(id = %row.id, class_term = %superclass_term, "abstract class");
        self.abstracts.insert_record(ClassRecord::new(row));
    }

    fn merge_into_abstract(
        &mut self,
        superclass_term: &str,
        properties: &indexmap::IndexMap<String, PropertyRecord>,
        id_num: u32,
    ) {
        let Some(class) = self.abstracts.get_mut(superclass_term) else {
            return;
        };

        let class_id = class
            .properties
            .values()
            .next()
            .map(|p| {
                let prefix_len = self.config.module_code.len() + 4;
                p.row.id.chars().take(prefix_len).collect::<String>()
            })
            .unwrap_or_else(|| format!("{}{:04}", self.config.module_code, id_num));

        for prop in properties.values() {
            if prop.row.multiplicity.is_some_and(|m| m.is_deleted()) {
                continue;
            }
            let mut row = prop.row.clone();
            row.class_term = superclass_term.to_string();
            row.module = abstract_module(&row.module);
            let key = row.property_key();

            match class.properties.get_mut(&key) {
                None => {
                    let n = 1 + class.properties.len();
                    row.id = format!("{}_{:03}", class_id, n);
                    let mut record = PropertyRecord::new(row);
                    record.inherited = 1;
                    class.properties.insert(key, record);
                }
                Some(pooled) => {
                    pooled.inherited += 1;
                    if let (Some(a), Some(b)) = (pooled.row.multiplicity, row.multiplicity) {
                        pooled.row.multiplicity = Some(a.widen(b));
                    } else if pooled.row.multiplicity.is_none() {
                        pooled.row.multiplicity = row.multiplicity;
                    }
                    // A definition joins the pool only when it differs
                    // from the line most recently appended.
                    if !row.definition.is_empty() {
                        let last_line = pooled
                            .row
                            .definition
                            .rsplit('\n')
                            .next()
                            .unwrap_or_default();
                        if row.definition != last_line {
                            pooled.row.definition = format!(
                                "{}\n{}",
                                pooled.row.definition, row.definition
                            )
                            .trim()
                            .to_string();
                        }
                    }
                }
            }
        }
    }

    /// Pass 2b: drop pools with no property shared widely enough, tag
    /// the survivors.
    fn prune_and_tag_pools(&mut self) {
        let threshold = self.config.threshold;
        let mut keep = Vec::new();
        for (class_term, class) in self.abstracts.iter_mut() {
            let shared = class
                .properties
                .values()
                .any(|p| p.inherited > threshold);
            if !shared {
                trace!(class_term = %class_term, "abstract class pruned");
                continue;
            }
            for prop in class.properties.values_mut() {
                prop.row.inherited = Some(if prop.inherited > threshold {
                    InheritanceTag::Shared
                } else {
                    InheritanceTag::AlignedPool
                });
            }
            keep.push(class_term.clone());
        }
        let kept: Vec<ClassRecord> = keep
            .iter()
            .filter_map(|t| self.abstracts.get(t).cloned())
            .collect();
        self.abstracts = ClassRegistry::new();
        for record in kept {
            self.abstracts.insert_record(record);
        }
    }

    /// Pass 2c: rewrite association targets onto registered class
    /// terms, moving any surplus qualifier into the property term.
    fn normalize_associations(&mut self) -> FsmResult<()> {
        let class_terms: Vec<String> = self.registry.class_terms().cloned().collect();
        for class_term in &class_terms {
            let keys: Vec<String> = self
                .registry
                .get(class_term)
                .map(|c| c.properties.keys().cloned().collect())
                .unwrap_or_default();
            for key in keys {
                let Some(associated) = self
                    .registry
                    .get(class_term)
                    .and_then(|c| c.properties.get(&key))
                    .map(|p| p.row.associated_class.clone())
                else {
                    continue;
                };
                if associated.is_empty() || self.registry.contains(&associated) {
                    continue;
                }
                let resolved = self
                    .resolve_superclass(&associated)
                    .map(|(term, _)| term)
                    .ok_or_else(|| FsmError::unresolved(class_term, &associated))?;
                if resolved == associated {
                    continue;
                }
                let qualifier = strip_suffix_term(&associated, &resolved);
                if let Some(class) = self.registry.get_mut(class_term) {
                    if let Some(prop) = class.properties.get_mut(&key) {
                        trace!(
                            class_term = %class_term,
                            from = %associated,
                            to = %resolved,
                            "association target normalized"
                        );
                        prop.row.property_term =
                            format!("{}_ {}", prop.row.property_term, qualifier);
                        prop.row.associated_class = resolved;
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk the superclass chain of `class_term` until a registered
    /// abstract or concrete class matches. The match is returned with
    /// deleted properties dropped (persistently, so later flattening
    /// agrees).
    pub(crate) fn resolve_superclass(
        &mut self,
        class_term: &str,
    ) -> Option<(String, ClassRecord)> {
        resolve_superclass(&mut self.abstracts, &mut self.registry, class_term)
    }
}

/// Superclass resolution shared between normalization and flattening.
pub(crate) fn resolve_superclass(
    abstracts: &mut ClassRegistry,
    registry: &mut ClassRegistry,
    class_term: &str,
) -> Option<(String, ClassRecord)> {
    if !class_term.contains('_') {
        return None;
    }
    for term in superclass_chain(class_term, false) {
        let term = term.trim().to_string();
        if term.is_empty() {
            break;
        }
        if let Some(class) = abstracts.get_mut(&term) {
            class.retain_live_properties();
            return Some((term.clone(), class.clone()));
        }
        if let Some(class) = registry.get_mut(&term) {
            class.retain_live_properties();
            return Some((term.clone(), class.clone()));
        }
    }
    None
}

/// Wrap a module name for the abstract-class context, merging repeats
/// into a single annotated list.
fn abstract_module(module: &str) -> String {
    if module.contains("Abstract Class") {
        let trimmed = &module[..module.len() - 1];
        format!("{} & {})", trimmed, module)
    } else {
        format!("Abstract Class({})", module)
    }
}

/// The qualifier left over when `suffix` is removed from a qualified
/// term ("Base_ Orange" minus "Orange" leaves "Base").
fn strip_suffix_term(term: &str, suffix: &str) -> String {
    let stripped = term.replace(suffix, "");
    let stripped = stripped.trim();
    stripped
        .strip_suffix('_')
        .unwrap_or(stripped)
        .to_string()
}
