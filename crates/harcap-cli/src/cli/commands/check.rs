//! `harcap check` – inspect the HAR directory and configuration.

use anyhow::Result;
use chrono::{DateTime, Local};
use harcap_core::config::HarcapConfig;
use harcap_core::{har, store};

pub fn run_check(cfg: &HarcapConfig) -> Result<()> {
    let har_dir = &cfg.capture.har_dir;
    let har_files: Vec<_> = store::list_recursive(har_dir)
        .into_iter()
        .filter(|p| har::is_har_file(p))
        .collect();

    println!("HAR directory: {}", har_dir.display());
    if har_files.is_empty() {
        println!("No .har files found. Configure the proxy to auto-save archives there.");
    } else {
        println!("{} .har file(s)", har_files.len());
        let latest = har_files
            .iter()
            .filter_map(|rel| store::file_mtime_ms(&har_dir.join(rel)).map(|t| (t, rel)))
            .max();
        if let Some((mtime_ms, rel)) = latest {
            let when = DateTime::from_timestamp_millis(mtime_ms)
                .map(|t| {
                    t.with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string()
                })
                .unwrap_or_else(|| "?".to_string());
            println!("Most recent: {} ({})", rel.display(), when);
        }
    }

    let issues = cfg.validate();
    if issues.is_empty() {
        println!("Configuration OK.");
    } else {
        for issue in &issues {
            println!("config: {issue}");
        }
    }
    Ok(())
}
