//! Validation report over a run's artifacts.
//!
//! The read path shares nothing with capture except the on-disk layout:
//! it enumerates the run directory, collapses artifacts onto dedup keys,
//! picks one representative per key and validates it (plus its
//! nearest-in-time metadata) through the rule engine. A report is always
//! produced, even for an empty or missing run.

mod build;
mod dedup;

pub use build::build_report_for_run;
pub use dedup::{is_body_json, is_meta_json, unique_key};
