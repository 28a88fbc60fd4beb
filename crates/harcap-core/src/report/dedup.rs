//! Logical artifact identity: collapse a body file, its metadata sibling
//! and every re-capture of the same endpoint onto one key.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading readable timestamp segment: `YYYY-MM-DD_HH-MM-SS__`.
static LEADING_TS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}__").expect("static pattern"));

/// Trailing epoch segment: `__<10-13 digits>` (seconds or milliseconds).
static TRAILING_EPOCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__\d{10,13}$").expect("static pattern"));

/// True for a body artifact path (`*.json` but not `*.meta.json`).
pub fn is_body_json(rel_path: &str) -> bool {
    let lower = rel_path.to_ascii_lowercase();
    lower.ends_with(".json") && !lower.ends_with(".meta.json")
}

/// True for a metadata artifact path.
pub fn is_meta_json(rel_path: &str) -> bool {
    rel_path.to_ascii_lowercase().ends_with(".meta.json")
}

/// Dedup key for a relative artifact path: separators normalized, the
/// `.meta.json`/`.json` distinction erased, and embedded capture
/// timestamps removed, so artifacts of the same endpoint captured at
/// different instants compare equal. Distinct (method, host, path)
/// never collapse; that would be a template defect, not expected input.
pub fn unique_key(rel_path: &str) -> String {
    let norm = rel_path.replace('\\', "/");
    let stem = strip_extension(&norm);
    strip_time_segments(stem)
}

fn strip_extension(path: &str) -> &str {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".meta.json") {
        &path[..path.len() - ".meta.json".len()]
    } else if lower.ends_with(".json") {
        &path[..path.len() - ".json".len()]
    } else {
        path
    }
}

fn strip_time_segments(stem: &str) -> String {
    let without_leading = LEADING_TS.replace(stem, "");
    TRAILING_EPOCH.replace(&without_leading, "").into_owned()
}
