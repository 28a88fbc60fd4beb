//! Continuous capture: watch the HAR directory, extract each archive
//! once its content stabilizes, accumulate session statistics.
//!
//! Bulk import (`har::import_all`) may run while a session is live; there
//! is no lock. Both paths go through the same first-writer-wins filename
//! gate, so double-processing is an `existing` count, not a duplicate.

mod session;
mod stats;
mod watch;

pub use session::CaptureSession;
pub use stats::{SessionStats, SessionSummary, StatsSnapshot};
pub use watch::WatchAdapter;
