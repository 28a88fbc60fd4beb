//! `harcap start` – continuous capture until Ctrl-C.

use anyhow::Result;
use harcap_core::capture::CaptureSession;
use harcap_core::config::HarcapConfig;
use harcap_core::{report, store};
use std::time::Duration;

pub async fn run_start(cfg: HarcapConfig, run_dir_name: String) -> Result<()> {
    for issue in cfg.validate() {
        println!("config: {issue}");
    }

    let har_dir = cfg.capture.har_dir.clone();
    let run_dir = cfg.storage.data_dir.join(&run_dir_name);
    let graceful_wait = Duration::from_millis(cfg.watch.graceful_wait_ms);

    let session = CaptureSession::start(cfg, run_dir_name)?;
    println!("Watching {} -> {}", har_dir.display(), run_dir.display());
    println!("Press Ctrl-C to stop.");

    tokio::signal::ctrl_c().await?;
    println!();
    println!("Stopping...");

    let summary = tokio::task::spawn_blocking(move || session.stop(graceful_wait)).await?;
    if !summary.drained {
        println!("warning: some extractions were still running at shutdown");
    }

    // Count what actually landed on disk; the live counters can miss a
    // file that raced the shutdown.
    let on_disk = store::list_recursive(&run_dir)
        .iter()
        .filter(|p| report::is_body_json(&p.to_string_lossy()))
        .count();

    let s = summary.stats;
    println!(
        "Session finished in {}: {} HAR processed, {} JSON saved ({} on disk), {} filtered, {} errors",
        human_duration(summary.elapsed),
        s.har_processed,
        s.json_saved,
        on_disk,
        s.filtered_out,
        s.errors
    );
    Ok(())
}

fn human_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_duration_picks_largest_unit() {
        assert_eq!(human_duration(Duration::from_secs(42)), "42s");
        assert_eq!(human_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(human_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
