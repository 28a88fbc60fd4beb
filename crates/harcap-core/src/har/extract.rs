//! Per-document extraction: filter HAR entries, normalize JSON response
//! bodies, and persist deduplicated artifact pairs.

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use std::path::Path;
use url::Url;
use walkdir::WalkDir;

use crate::config::HarcapConfig;
use crate::filename::{render, TemplateValues};
use crate::store;

use super::body::{decode_body, is_json_content, strip_xssi};
use super::parse::{HarEntry, HarLog, HarRequest, HarResponse};

/// Counts for one processed HAR document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub saved: u64,
    pub filtered: u64,
    pub existing: u64,
}

/// Accumulated counts for a bulk import over a directory tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub har_processed: u64,
    pub json_saved: u64,
    pub filtered_out: u64,
    pub already_exist: u64,
    pub errors: u64,
}

/// Metadata document persisted next to each body file.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMeta {
    pub run: String,
    pub captured_at: String,
    pub request: HarRequest,
    pub response: HarResponse,
}

enum EntryOutcome {
    Saved,
    Filtered,
    Existing,
}

/// Processes one HAR document into the run directory.
///
/// A document that fails to parse (still being written, truncated) is a
/// soft skip: all-zero outcome, no error. Per-entry failures are counted
/// as filtered and never abort the batch. The only `Err` is a file that
/// cannot be read at all; callers fold that into their error counters.
pub fn process_har(
    har_path: &Path,
    cfg: &HarcapConfig,
    run_dir_name: &str,
) -> Result<ExtractOutcome> {
    let bytes = std::fs::read(har_path)
        .with_context(|| format!("read HAR file: {}", har_path.display()))?;

    let har: HarLog = match serde_json::from_slice(&bytes) {
        Ok(har) => har,
        Err(err) => {
            tracing::debug!(
                "skipping unparseable HAR (possibly mid-write) {}: {}",
                har_path.display(),
                err
            );
            return Ok(ExtractOutcome::default());
        }
    };

    let run_dir = cfg.storage.data_dir.join(run_dir_name);
    let hosts = cfg.effective_hosts();
    let mut outcome = ExtractOutcome::default();

    for entry in &har.log.entries {
        match handle_entry(entry, har_path, cfg, &hosts, run_dir_name, &run_dir) {
            EntryOutcome::Saved => outcome.saved += 1,
            EntryOutcome::Filtered => outcome.filtered += 1,
            EntryOutcome::Existing => outcome.existing += 1,
        }
    }

    Ok(outcome)
}

fn handle_entry(
    entry: &HarEntry,
    har_path: &Path,
    cfg: &HarcapConfig,
    hosts: &[String],
    run_dir_name: &str,
    run_dir: &Path,
) -> EntryOutcome {
    let (request, response) = match (&entry.request, &entry.response) {
        (Some(req), Some(resp)) => (req, resp),
        _ => return EntryOutcome::Filtered,
    };

    let url = match Url::parse(&request.url) {
        Ok(url) => url,
        Err(_) => return EntryOutcome::Filtered,
    };

    if !passes_filters(cfg, hosts, request, &url) {
        return EntryOutcome::Filtered;
    }

    let body_text = match &response.content.text {
        Some(text) if !text.is_empty() => {
            let decoded = decode_body(text.clone(), response.content.encoding.as_deref());
            strip_xssi(&decoded).to_string()
        }
        _ => return EntryOutcome::Filtered,
    };

    if body_text.is_empty() || !is_json_content(&response.content.mime_type, &body_text) {
        return EntryOutcome::Filtered;
    }

    let ts = capture_timestamp_ms(entry.started_date_time.as_deref(), har_path);

    let file_name = render(
        &cfg.storage.file_name_template,
        &TemplateValues {
            method: &request.method,
            host: url.host_str().unwrap_or_default(),
            path: url.path(),
            ts,
        },
    );

    // First-writer-wins gate: an existing body blocks any further write
    // for this name. Probe-then-write; the residual race needs two
    // captures of the same endpoint in the same millisecond.
    if run_dir.join(&file_name).exists() {
        return EntryOutcome::Existing;
    }

    let meta = ArtifactMeta {
        run: run_dir_name.to_string(),
        captured_at: iso_from_millis(ts),
        request: request.clone(),
        response: response.clone(),
    };

    match store::write_artifact(run_dir, &file_name, &body_text, &meta) {
        Ok(()) => EntryOutcome::Saved,
        Err(err) => {
            tracing::warn!("failed to persist artifact {}: {:#}", file_name, err);
            EntryOutcome::Filtered
        }
    }
}

/// Allow-list filters, in order: path substring, host substring
/// (case-insensitive), exact method (case-insensitive). An empty list
/// disables that dimension.
fn passes_filters(cfg: &HarcapConfig, hosts: &[String], request: &HarRequest, url: &Url) -> bool {
    let include_path = &cfg.filter.include_path;
    if !include_path.is_empty() && !include_path.iter().any(|s| url.path().contains(s.as_str())) {
        return false;
    }

    if !hosts.is_empty() {
        let host = url.host_str().unwrap_or_default().to_lowercase();
        if !hosts.iter().any(|h| host.contains(&h.to_lowercase())) {
            return false;
        }
    }

    let methods = &cfg.filter.include_method;
    if !methods.is_empty() && !methods.iter().any(|m| m.eq_ignore_ascii_case(&request.method)) {
        return false;
    }

    true
}

/// Capture instant in epoch milliseconds: `startedDateTime`, else the
/// HAR file's mtime, else now.
fn capture_timestamp_ms(started: Option<&str>, har_path: &Path) -> i64 {
    if let Some(s) = started {
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
            return dt.timestamp_millis();
        }
    }
    store::file_mtime_ms(har_path).unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
}

fn iso_from_millis(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// One-shot import of every `.har` under the configured HAR directory,
/// oldest first (mtime order preserves the chronology of when responses
/// were actually observed). Per-file failures are counted and skipped.
pub fn import_all(cfg: &HarcapConfig, run_dir_name: &str) -> ImportStats {
    let mut har_files: Vec<(std::path::PathBuf, i64)> = WalkDir::new(&cfg.capture.har_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_har_file(e.path()))
        .map(|e| {
            let t = store::file_mtime_ms(e.path()).unwrap_or(0);
            (e.into_path(), t)
        })
        .collect();
    har_files.sort_by_key(|(_, t)| *t);

    let mut stats = ImportStats::default();
    for (path, _) in har_files {
        match process_har(&path, cfg, run_dir_name) {
            Ok(outcome) => {
                stats.har_processed += 1;
                stats.json_saved += outcome.saved;
                stats.filtered_out += outcome.filtered;
                stats.already_exist += outcome.existing;
            }
            Err(err) => {
                stats.errors += 1;
                tracing::warn!("skipping {}: {:#}", path.display(), err);
            }
        }
    }
    stats
}

/// True for `.har` paths, case-insensitively.
pub fn is_har_file(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("har"))
}
