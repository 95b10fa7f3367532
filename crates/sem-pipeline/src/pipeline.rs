//! Stage orchestration
//!
//! Wires the compiler stages together in memory: BIE rows are built
//! into the FSM, specialized into the BSM, walked into the LHM, and
//! optionally rendered as an XML schema. Each stage consumes the
//! previous stage's output by reference and produces a fresh value,
//! so callers can also run stages individually.

use std::io::Read;

use crate::Result;
use sem_adapter_csv::read_bie;
use sem_bsm::{ModuleCodes, SpecializationResolver};
use sem_fsm::{FsmBuilder, FsmConfig};
use sem_lhm::{GraphWalker, LhmNode};
use sem_model::{BieRow, SemanticRow};
use sem_xsd::{XsdConfig, XsdEmitter};
use tracing::info;

/// Configuration for a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// FSM construction tunables
    pub fsm: FsmConfig,
    /// Module-code table for specialization
    pub modules: ModuleCodes,
    /// Root class terms for the hierarchy walk
    pub roots: Vec<String>,
    /// Schema rendering settings; `None` stops after the walk
    pub schema: Option<XsdConfig>,
}

impl PipelineConfig {
    /// A configuration walking from the given roots with default
    /// stage settings and no schema stage.
    pub fn with_roots(roots: Vec<String>) -> Self {
        Self {
            fsm: FsmConfig::default(),
            modules: ModuleCodes::default(),
            roots,
            schema: None,
        }
    }
}

/// Artifacts produced by a full run.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Flattened foundational model
    pub fsm: Vec<SemanticRow>,
    /// Resolved business model
    pub bsm: Vec<SemanticRow>,
    /// Hierarchical model rooted at the configured roots
    pub lhm: Vec<LhmNode>,
    /// Rendered schema text when a schema stage is configured
    pub schema: Option<String>,
}

/// In-memory compiler pipeline.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Build the flattened FSM from BIE definition rows.
    pub fn build_fsm(&self, rows: &[BieRow]) -> Result<Vec<SemanticRow>> {
        let fsm = FsmBuilder::new(self.config.fsm.clone()).build(rows)?;
        info!(rows = fsm.len(), "fsm stage complete");
        Ok(fsm)
    }

    /// Resolve specialization over a base FSM plus optional extensions.
    pub fn specialize(&self, inputs: &[Vec<SemanticRow>]) -> Result<Vec<SemanticRow>> {
        let bsm = SpecializationResolver::new(self.config.modules.clone()).resolve(inputs)?;
        info!(rows = bsm.len(), "specialization stage complete");
        Ok(bsm)
    }

    /// Walk the BSM into the hierarchical model from the configured
    /// roots.
    pub fn graph_walk(&self, bsm: &[SemanticRow]) -> Result<Vec<LhmNode>> {
        let mut walker = GraphWalker::new();
        walker.load_model(bsm)?;
        let lhm = walker.walk(&self.config.roots)?;
        info!(nodes = lhm.len(), "graph walk complete");
        Ok(lhm)
    }

    /// Render the schema when a schema stage is configured.
    pub fn render_schema(&self, lhm: &[LhmNode]) -> Result<Option<String>> {
        match &self.config.schema {
            Some(xsd) => {
                let text = XsdEmitter::new(xsd.clone()).emit(lhm)?;
                info!(bytes = text.len(), "schema stage complete");
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    /// Run every configured stage over in-memory BIE rows.
    pub fn run(&self, rows: &[BieRow]) -> Result<PipelineOutput> {
        let fsm = self.build_fsm(rows)?;
        let bsm = self.specialize(std::slice::from_ref(&fsm))?;
        let lhm = self.graph_walk(&bsm)?;
        let schema = self.render_schema(&lhm)?;
        Ok(PipelineOutput {
            fsm,
            bsm,
            lhm,
            schema,
        })
    }

    /// Run every configured stage over a BIE definition sheet.
    pub fn run_csv<R: Read>(&self, reader: R) -> Result<PipelineOutput> {
        let rows = read_bie(reader)?;
        self.run(&rows)
    }

    /// Get configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sem_lhm::NodeKind;
    use sem_model::PropertyType;

    fn class(sequence: &str, term: &str) -> BieRow {
        BieRow {
            sequence: sequence.to_string(),
            acronym: "ABIE".to_string(),
            class_term: term.to_string(),
            context_categories: "cor".to_string(),
            ..BieRow::default()
        }
    }

    fn attribute(sequence: &str, term: &str, rep: &str, min: &str, max: &str) -> BieRow {
        BieRow {
            sequence: sequence.to_string(),
            acronym: "BBIE".to_string(),
            property_term: term.to_string(),
            representation_term: rep.to_string(),
            occurrence_min: min.to_string(),
            occurrence_max: max.to_string(),
            context_categories: "cor".to_string(),
            ..BieRow::default()
        }
    }

    fn composition(sequence: &str, target: &str, min: &str, max: &str) -> BieRow {
        BieRow {
            sequence: sequence.to_string(),
            acronym: "ASBIE".to_string(),
            associated_class: target.to_string(),
            occurrence_min: min.to_string(),
            occurrence_max: max.to_string(),
            context_categories: "cor".to_string(),
            ..BieRow::default()
        }
    }

    fn ledger_rows() -> Vec<BieRow> {
        vec![
            class("1", "Ledger"),
            attribute("2", "Identification", "Identifier", "1", "1"),
            composition("3", "Entry", "0", "unbounded"),
            class("4", "Entry"),
            attribute("5", "Posting Date", "Date", "0", "1"),
        ]
    }

    #[test]
    fn test_run_produces_every_stage_artifact() {
        let mut config = PipelineConfig::with_roots(vec!["cor:Ledger".to_string()]);
        config.schema = Some(XsdConfig::new("Ledger"));
        let pipeline = Pipeline::new(config);

        let output = pipeline.run(&ledger_rows()).unwrap();
        assert!(!output.fsm.is_empty());
        assert!(!output.bsm.is_empty());
        assert_eq!(output.lhm[0].kind, NodeKind::Class);
        assert_eq!(output.lhm[0].level, 1);
        let schema = output.schema.unwrap();
        assert!(schema.contains("<xsd:schema"));
    }

    #[test]
    fn test_schema_stage_is_optional() {
        let pipeline = Pipeline::new(PipelineConfig::with_roots(vec!["cor:Ledger".to_string()]));
        let output = pipeline.run(&ledger_rows()).unwrap();
        assert!(output.schema.is_none());
    }

    #[test]
    fn test_run_csv_reads_the_definition_sheet() {
        let sheet = "\
sequence,UNID,acronym,DEN,definition,class_term_qualifier,class_term,property_term_qualifier,property_term,datatype_qualifier,representation_term,qualified_data_type_UID,associated_class_qualifier,associated_class,business_term,usage_rule,sequence_number,occurrence_min,occurrence_max,context_categories,TDED,publication_source,short_name,BIE
1,,ABIE,Ledger. Details,,,Ledger,,,,,,,,,,,,,cor,,,,
2,,BBIE,Ledger. Identification. Identifier,,,Ledger,,Identification,,Identifier,,,,,,,1,1,cor,,,,
";
        let pipeline = Pipeline::new(PipelineConfig::with_roots(vec!["cor:Ledger".to_string()]));
        let output = pipeline.run_csv(sheet.as_bytes()).unwrap();
        assert_eq!(output.lhm[0].class_term, "cor:Ledger");
    }

    #[test]
    fn test_missing_root_is_a_walk_error() {
        let pipeline = Pipeline::new(PipelineConfig::with_roots(vec!["Nowhere".to_string()]));
        let error = pipeline.run(&ledger_rows()).unwrap_err();
        assert!(matches!(error, crate::Error::Lhm(_)));
    }

    #[test]
    fn test_stages_compose_with_fsm_output() {
        let pipeline = Pipeline::new(PipelineConfig::with_roots(vec!["cor:Ledger".to_string()]));
        let fsm = pipeline.build_fsm(&ledger_rows()).unwrap();
        assert!(fsm.iter().any(|r| r.property_type == PropertyType::Class));

        let bsm = pipeline.specialize(std::slice::from_ref(&fsm)).unwrap();
        assert!(
            bsm.iter()
                .all(|r| r.property_type != PropertyType::AbstractClass)
        );
    }
}
