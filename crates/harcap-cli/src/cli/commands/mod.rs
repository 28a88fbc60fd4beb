//! CLI command handlers. Each command is in its own file for clarity and line limit.

mod check;
mod clear_har;
mod clear_run;
mod config;
mod import;
mod report;
mod start;

pub use check::run_check;
pub use clear_har::run_clear_har;
pub use clear_run::run_clear_run;
pub use config::run_config;
pub use import::run_import;
pub use report::run_report;
pub use start::run_start;
