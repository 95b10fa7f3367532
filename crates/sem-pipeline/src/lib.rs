//! # sem-pipeline
//!
//! In-memory orchestration of the semantic-model compiler stages:
//! BIE rows through FSM construction, specialization, the hierarchy
//! walk, and schema rendering, with no intermediate files.

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};

use thiserror::Error;

/// Errors surfaced by any stage of the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("csv: {0}")]
    Csv(#[from] sem_adapter_csv::CsvError),

    #[error("fsm: {0}")]
    Fsm(#[from] sem_fsm::FsmError),

    #[error("specialization: {0}")]
    Bsm(#[from] sem_bsm::BsmError),

    #[error("graph walk: {0}")]
    Lhm(#[from] sem_lhm::LhmError),

    #[error("schema: {0}")]
    Xsd(#[from] sem_xsd::XsdError),
}

pub type Result<T> = std::result::Result<T, Error>;
