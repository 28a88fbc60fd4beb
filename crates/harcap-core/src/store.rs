//! Artifact persistence: (body, metadata) file pairs under a run directory.
//!
//! The write path is first-writer-wins: callers probe for the body file
//! before calling `write_artifact`, and an existing file blocks any
//! further write for that name. Enumeration and deletion degrade to
//! empty/false on I/O failure instead of erroring, so the read path can
//! always produce a report.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Creates `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))
}

/// Sibling metadata filename: a trailing `.json` becomes `.meta.json`.
pub fn meta_file_name(file_name: &str) -> String {
    let lower = file_name.to_ascii_lowercase();
    if let Some(stem) = lower.strip_suffix(".json") {
        format!("{}.meta.json", &file_name[..stem.len()])
    } else {
        format!("{file_name}.meta.json")
    }
}

/// Writes the body file and its metadata sibling into `run_dir`,
/// creating the directory if needed. Body first, then metadata
/// (pretty-printed JSON).
pub fn write_artifact<M: Serialize>(
    run_dir: &Path,
    file_name: &str,
    body_text: &str,
    meta: &M,
) -> Result<()> {
    ensure_dir(run_dir)?;

    let body_path = run_dir.join(file_name);
    fs::write(&body_path, body_text)
        .with_context(|| format!("failed to write body: {}", body_path.display()))?;

    let meta_path = run_dir.join(meta_file_name(file_name));
    let meta_text = serde_json::to_string_pretty(meta).context("failed to serialize metadata")?;
    fs::write(&meta_path, meta_text)
        .with_context(|| format!("failed to write metadata: {}", meta_path.display()))?;

    Ok(())
}

/// Recursively deletes `dir`. Returns `false` on any failure, including
/// "already absent"; never errors.
pub fn remove_dir(dir: &Path) -> bool {
    fs::remove_dir_all(dir).is_ok()
}

/// File modification time in epoch milliseconds, or `None` when the
/// file cannot be stat'd.
pub fn file_mtime_ms(path: &Path) -> Option<i64> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
}

/// All files under `dir`, recursively, as paths relative to `dir`.
/// An unreadable or missing directory yields an empty list.
pub fn list_recursive(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.path().strip_prefix(dir).ok().map(PathBuf::from))
        .collect()
}
