//! Artifact filename derivation.
//!
//! Filenames are rendered from a small placeholder template
//! (`{{method}}__{{host}}__{{path}}__{{ts}}.json` by default) with every
//! placeholder value sanitized for the filesystem. The rendered name is
//! the dedup unit for the write path: an existing file with the same name
//! blocks any further write.

mod sanitize;
mod template;

pub use sanitize::sanitize_for_file;
pub use template::{render, validate_template, Placeholder, TemplateError, TemplateValues};

/// Default template when the config does not set one.
pub const DEFAULT_TEMPLATE: &str = "{{method}}__{{host}}__{{path}}__{{ts}}.json";
