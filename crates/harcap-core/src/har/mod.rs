//! HAR (HTTP Archive) extraction: parse archives produced by the
//! recording proxy, filter entries, and persist JSON response bodies as
//! deduplicated artifact pairs.
//!
//! The write path never errors past `process_har`/`import_all` for input
//! malformation: a mid-write archive is a soft skip and a malformed entry
//! is a per-entry filtered count. Capture sessions run unattended for
//! hours, so one corrupt archive must not halt them.

mod body;
mod extract;
mod parse;

pub use body::{is_json_content, looks_like_json, strip_xssi};
pub use extract::{import_all, is_har_file, process_har, ArtifactMeta, ExtractOutcome, ImportStats};
pub use parse::{get_header, HarContent, HarEntry, HarHeader, HarLog, HarRequest, HarResponse};
