pub mod config;
pub mod logging;

// Core pipeline modules
pub mod capture;
pub mod filename;
pub mod har;
pub mod report;
pub mod rules;
pub mod store;
