//! Watch adapter: turns raw filesystem events into "HAR file stabilized"
//! notifications.
//!
//! A `.har` file auto-saved by the proxy is written incrementally; acting
//! on the first change event would read a truncated archive. A path is
//! reported only after its (mtime, len) pair has been unchanged for the
//! configured quiet window since the last change event.

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::har::is_har_file;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileSig {
    len: u64,
    mtime_ms: i64,
}

struct Pending {
    sig: Option<FileSig>,
    quiet_since: Instant,
}

/// Wraps the platform watcher (inotify on Linux, kqueue on macOS) and
/// tracks per-file stability.
pub struct WatchAdapter {
    // Held for its Drop; dropping unregisters the OS watch.
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    pending: HashMap<PathBuf, Pending>,
    stability: Duration,
}

impl WatchAdapter {
    /// Starts watching `dir` recursively for `.har` create/modify events.
    pub fn start(dir: &Path, stability: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )
        .context("failed to create filesystem watcher")?;
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch HAR directory: {}", dir.display()))?;

        Ok(WatchAdapter {
            _watcher: watcher,
            rx,
            pending: HashMap::new(),
            stability,
        })
    }

    /// Drains events for up to `wait`, then returns every tracked path
    /// whose content has been stable for the quiet window. Also usable as
    /// the session's shutdown-poll tick.
    pub fn poll(&mut self, wait: Duration) -> Vec<PathBuf> {
        let deadline = Instant::now() + wait;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(Ok(event)) => self.note_event(&event),
                Ok(Err(err)) => tracing::warn!("watcher error: {}", err),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        self.take_stabilized()
    }

    /// Tracks a path from an externally-observed change (initial scan).
    pub fn track(&mut self, path: PathBuf) {
        self.pending.insert(
            path,
            Pending {
                sig: None,
                quiet_since: Instant::now(),
            },
        );
    }

    fn note_event(&mut self, event: &Event) {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }
        for path in &event.paths {
            if is_har_file(path) {
                self.track(path.clone());
            }
        }
    }

    fn take_stabilized(&mut self) -> Vec<PathBuf> {
        let now = Instant::now();
        let mut ready = Vec::new();
        let mut gone = Vec::new();

        for (path, pending) in self.pending.iter_mut() {
            let current = file_sig(path);
            if current != pending.sig {
                // still changing (or briefly unreadable); restart the window
                pending.sig = current;
                pending.quiet_since = now;
                continue;
            }
            if now.duration_since(pending.quiet_since) >= self.stability {
                match current {
                    Some(_) => ready.push(path.clone()),
                    // unreadable for a full quiet window: deleted, stop tracking
                    None => gone.push(path.clone()),
                }
            }
        }

        for path in ready.iter().chain(gone.iter()) {
            self.pending.remove(path);
        }
        ready.sort();
        ready
    }
}

fn file_sig(path: &Path) -> Option<FileSig> {
    let meta = std::fs::metadata(path).ok()?;
    Some(FileSig {
        len: meta.len(),
        mtime_ms: crate::store::file_mtime_ms(path)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn tracked_file_stabilizes_after_quiet_window() {
        let dir = tempfile::tempdir().unwrap();
        let har = dir.path().join("a.har");
        fs::write(&har, "{}").unwrap();

        let mut adapter = WatchAdapter::start(dir.path(), Duration::from_millis(50)).unwrap();
        adapter.track(har.clone());

        // first poll observes the signature and starts the window
        assert!(adapter.poll(Duration::from_millis(10)).is_empty());
        std::thread::sleep(Duration::from_millis(80));
        let ready = adapter.poll(Duration::from_millis(10));
        assert_eq!(ready, vec![har]);
    }

    #[test]
    fn growing_file_keeps_waiting() {
        let dir = tempfile::tempdir().unwrap();
        let har = dir.path().join("a.har");
        fs::write(&har, "{}").unwrap();

        let mut adapter = WatchAdapter::start(dir.path(), Duration::from_millis(60)).unwrap();
        adapter.track(har.clone());
        assert!(adapter.poll(Duration::from_millis(10)).is_empty());

        // file grows: the quiet window restarts
        fs::write(&har, "{\"log\":{}}").unwrap();
        assert!(adapter.poll(Duration::from_millis(10)).is_empty());
        std::thread::sleep(Duration::from_millis(90));
        assert_eq!(adapter.poll(Duration::from_millis(10)), vec![har]);
    }

    #[test]
    fn deleted_file_is_evicted_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let har = dir.path().join("gone.har");

        let mut adapter = WatchAdapter::start(dir.path(), Duration::from_millis(30)).unwrap();
        adapter.track(har);

        assert!(adapter.poll(Duration::from_millis(10)).is_empty());
        std::thread::sleep(Duration::from_millis(60));
        assert!(adapter.poll(Duration::from_millis(10)).is_empty());
        assert!(adapter.pending.is_empty());
    }

    #[test]
    fn stabilized_path_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let har = dir.path().join("a.har");
        fs::write(&har, "{}").unwrap();

        let mut adapter = WatchAdapter::start(dir.path(), Duration::from_millis(20)).unwrap();
        adapter.track(har.clone());
        adapter.poll(Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(adapter.poll(Duration::from_millis(10)), vec![har]);
        assert!(adapter.poll(Duration::from_millis(10)).is_empty());
    }
}
