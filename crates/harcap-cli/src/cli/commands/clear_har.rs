//! `harcap clear-har` – delete captured HAR archives.

use anyhow::{bail, Result};
use harcap_core::config::HarcapConfig;
use harcap_core::{har, store};
use std::fs;

pub fn run_clear_har(cfg: &HarcapConfig, yes: bool) -> Result<()> {
    let har_dir = &cfg.capture.har_dir;
    let files: Vec<_> = store::list_recursive(har_dir)
        .into_iter()
        .filter(|p| har::is_har_file(p))
        .collect();
    if files.is_empty() {
        println!("No .har files in {}", har_dir.display());
        return Ok(());
    }
    if !yes {
        bail!(
            "refusing to delete {} file(s) from {}; pass --yes to confirm",
            files.len(),
            har_dir.display()
        );
    }

    let mut deleted = 0usize;
    let mut failed = 0usize;
    for rel in files {
        let path = har_dir.join(rel);
        match fs::remove_file(&path) {
            Ok(()) => deleted += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!("could not delete {}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        println!("Deleted {deleted} HAR file(s), {failed} failed");
    } else {
        println!("Deleted {deleted} HAR file(s)");
    }
    Ok(())
}
