//! Continuous capture session: one worker draining stabilized-file
//! events, with graceful bounded-drain shutdown.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::HarcapConfig;
use crate::har::{self, process_har};
use crate::store;

use super::stats::{SessionStats, SessionSummary};
use super::watch::WatchAdapter;

/// Handle to a running capture session. Dropping without `stop` leaves
/// the worker running until process exit; always call `stop`.
pub struct CaptureSession {
    stats: Arc<SessionStats>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    started_at: Instant,
    run_dir_name: String,
}

impl CaptureSession {
    /// Ensures the run directory, registers the watcher and spawns the
    /// worker. Existing `.har` files are processed once at startup; the
    /// idempotency gate makes re-observing them harmless.
    pub fn start(cfg: HarcapConfig, run_dir_name: String) -> Result<CaptureSession> {
        crate::filename::validate_template(&cfg.storage.file_name_template)?;

        let run_dir = cfg.storage.data_dir.join(&run_dir_name);
        store::ensure_dir(&run_dir)
            .with_context(|| format!("failed to create run directory: {}", run_dir.display()))?;

        let stability = Duration::from_millis(cfg.watch.stability_ms);
        let poll = Duration::from_millis(cfg.watch.poll_ms);
        let mut adapter = WatchAdapter::start(&cfg.capture.har_dir, stability)?;
        for path in existing_har_files(&cfg) {
            adapter.track(path);
        }

        let stats = Arc::new(SessionStats::default());
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker = {
            let stats = Arc::clone(&stats);
            let shutdown = Arc::clone(&shutdown);
            let run_dir_name = run_dir_name.clone();
            std::thread::spawn(move || {
                worker_loop(adapter, cfg, run_dir_name, stats, shutdown, poll);
            })
        };

        tracing::info!("capture session started for run {}", run_dir_name);
        Ok(CaptureSession {
            stats,
            shutdown,
            worker: Some(worker),
            started_at: Instant::now(),
            run_dir_name,
        })
    }

    /// Live counters; readable while the session runs.
    pub fn stats(&self) -> &Arc<SessionStats> {
        &self.stats
    }

    pub fn run_dir_name(&self) -> &str {
        &self.run_dir_name
    }

    /// Requests shutdown, waits up to `graceful_wait` for in-flight
    /// extractions to finish (best-effort drain, not a hard barrier) and
    /// releases the watch resources. On timeout the worker is detached
    /// and shutdown proceeds anyway.
    pub fn stop(mut self, graceful_wait: Duration) -> SessionSummary {
        self.shutdown.store(true, Ordering::SeqCst);

        let deadline = Instant::now() + graceful_wait;
        while self.stats.in_flight() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(100));
        }
        let drained = self.stats.in_flight() == 0;

        if let Some(worker) = self.worker.take() {
            if drained {
                let _ = worker.join();
            } else {
                tracing::warn!(
                    "graceful drain timed out with {} extraction(s) in flight; detaching worker",
                    self.stats.in_flight()
                );
            }
        }

        tracing::info!("capture session stopped for run {}", self.run_dir_name);
        SessionSummary {
            elapsed: self.started_at.elapsed(),
            stats: self.stats.snapshot(),
            drained,
        }
    }
}

fn worker_loop(
    mut adapter: WatchAdapter,
    cfg: HarcapConfig,
    run_dir_name: String,
    stats: Arc<SessionStats>,
    shutdown: Arc<AtomicBool>,
    poll: Duration,
) {
    while !shutdown.load(Ordering::SeqCst) {
        for path in adapter.poll(poll) {
            stats.begin_flight();
            match process_har(&path, &cfg, &run_dir_name) {
                Ok(outcome) => {
                    stats.record(&outcome);
                    if outcome.saved > 0 {
                        tracing::debug!(
                            "processed {}: saved={} filtered={} existing={}",
                            path.display(),
                            outcome.saved,
                            outcome.filtered,
                            outcome.existing
                        );
                    }
                }
                Err(err) => {
                    stats.record_error();
                    tracing::warn!("failed to process {}: {:#}", path.display(), err);
                }
            }
            stats.end_flight();
        }
    }
    // adapter drops here; the OS watch is released
}

fn existing_har_files(cfg: &HarcapConfig) -> Vec<PathBuf> {
    store::list_recursive(&cfg.capture.har_dir)
        .into_iter()
        .map(|rel| cfg.capture.har_dir.join(rel))
        .filter(|p| har::is_har_file(p))
        .collect()
}
