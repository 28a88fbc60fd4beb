//! `harcap report` – build the validation report for a run.

use anyhow::Result;
use harcap_core::config::HarcapConfig;
use harcap_core::report;

pub fn run_report(cfg: &HarcapConfig, run_dir_name: &str) -> Result<()> {
    let path = report::build_report_for_run(cfg, run_dir_name)?;
    println!("Report written to {}", path.display());
    Ok(())
}
