//! `harcap import` – one-shot bulk import of the HAR directory.

use anyhow::Result;
use harcap_core::config::HarcapConfig;
use harcap_core::{filename, har};

pub fn run_import(cfg: &HarcapConfig, run_dir_name: &str) -> Result<()> {
    filename::validate_template(&cfg.storage.file_name_template)?;

    let stats = har::import_all(cfg, run_dir_name);
    if stats.har_processed == 0 && stats.errors == 0 {
        println!("No .har files found in {}", cfg.capture.har_dir.display());
        return Ok(());
    }

    println!(
        "Imported {} HAR file(s) into {}: {} saved, {} filtered, {} already existed, {} errors",
        stats.har_processed,
        run_dir_name,
        stats.json_saved,
        stats.filtered_out,
        stats.already_exist,
        stats.errors
    );
    Ok(())
}
