//! CSV adapters for the pipeline artifacts.
//!
//! Readers resolve columns by header name (tolerating a UTF-8 byte
//! order mark) and report failures with line and column context;
//! writers emit the exact artifact column sets and flush once at the
//! end.

pub mod bie;
pub mod errors;
mod header;
pub mod lhm;
pub mod semantic;

pub use bie::{read_bie, BIE_COLUMNS};
pub use errors::{CsvError, CsvResult};
pub use lhm::{read_lhm, write_lhm, LHM_COLUMNS};
pub use semantic::{read_semantic_rows, write_bsm, write_fsm, FSM_COLUMNS};
