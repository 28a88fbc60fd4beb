//! `harcap config` – print the effective configuration.

use anyhow::Result;
use harcap_core::config::{self, HarcapConfig};

pub fn run_config(cfg: &HarcapConfig) -> Result<()> {
    println!("Config file:  {}", config::config_path()?.display());
    println!("HAR dir:      {}", cfg.capture.har_dir.display());
    println!("Data dir:     {}", cfg.storage.data_dir.display());
    println!("Report dir:   {}", cfg.report.out_dir.display());
    println!("Environment:  {}", cfg.capture.env.to_uppercase());
    println!("Host filter:  {}", fmt_list(&cfg.effective_hosts()));
    println!("Path filter:  {}", fmt_list(&cfg.filter.include_path));
    println!("Methods:      {}", fmt_list(&cfg.filter.include_method));
    println!("Template:     {}", cfg.storage.file_name_template);
    if let Some(run) = &cfg.runtime.run_name {
        println!("Run name:     {run}");
    }
    if let Some(device) = &cfg.runtime.device_model {
        println!("Device:       {device}");
    }

    let issues = cfg.validate();
    if issues.is_empty() {
        println!("No configuration issues.");
    } else {
        println!("Issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
    }
    Ok(())
}

fn fmt_list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
