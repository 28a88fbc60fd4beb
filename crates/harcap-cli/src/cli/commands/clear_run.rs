//! `harcap clear-run` – delete a run directory.

use anyhow::{bail, Result};
use harcap_core::config::HarcapConfig;
use harcap_core::store;

pub fn run_clear_run(cfg: &HarcapConfig, run_dir_name: &str, yes: bool) -> Result<()> {
    let run_dir = cfg.storage.data_dir.join(run_dir_name);
    if !run_dir.is_dir() {
        println!("Nothing to delete: {}", run_dir.display());
        return Ok(());
    }
    if !yes {
        bail!(
            "refusing to delete {}; pass --yes to confirm",
            run_dir.display()
        );
    }

    if store::remove_dir(&run_dir) {
        println!("Deleted {}", run_dir.display());
        Ok(())
    } else {
        bail!("failed to delete {}", run_dir.display())
    }
}
