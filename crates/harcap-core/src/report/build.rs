//! Report construction: group artifacts by dedup key, pick one
//! representative per group, validate, render, persist.

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::HarcapConfig;
use crate::filename::sanitize_for_file;
use crate::har::get_header;
use crate::rules::{validate_body, validate_meta};
use crate::store;

use super::dedup::{is_body_json, is_meta_json, unique_key};

/// Device token in the `X-Requested-With` header, e.g. "android 35".
static ANDROID_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)android\s*\d+").expect("static pattern"));

#[derive(Debug, Clone)]
struct FileEntry {
    rel: String,
    key: String,
    mtime_ms: i64,
    issues: usize,
}

/// Builds the validation report for a run and writes it to a fresh file
/// under the configured report directory.
///
/// Never fails for an empty or missing run directory: the report is
/// always produced, even if it only carries the header and a hint. The
/// only errors are from writing the report file itself.
pub fn build_report_for_run(cfg: &HarcapConfig, run_dir_name: &str) -> Result<PathBuf> {
    let base = cfg.storage.data_dir.join(run_dir_name);
    let files: Vec<String> = store::list_recursive(&base)
        .iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();

    let body_files: Vec<&String> = files.iter().filter(|f| is_body_json(f)).collect();
    let meta_files: Vec<&String> = files.iter().filter(|f| is_meta_json(f)).collect();

    let mut lines = Vec::new();
    lines.push(format!("Capture report: {run_dir_name}"));
    lines.push("===================================".to_string());
    lines.push(format!(
        "Date: {}",
        chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    lines.push(String::new());

    let device_token = extract_android_token(&base, &meta_files);
    let device_model = cfg.runtime.device_model.as_deref().unwrap_or("-");
    lines.push("Metadata:".to_string());
    lines.push(format!(
        "  Device under test: {} ({})",
        device_token.as_deref().unwrap_or("not found"),
        device_model
    ));
    lines.push(String::new());

    if body_files.is_empty() {
        lines.push("(no saved JSON files)".to_string());
        lines.push(String::new());
        lines.push(
            "Hint: run `harcap start` and enable Tools -> Auto Save (HTTP Archive) in the proxy."
                .to_string(),
        );
        return write_report(cfg, run_dir_name, &lines.join("\n"));
    }

    // meta entries, grouped by dedup key
    let mut meta_map: HashMap<String, Vec<FileEntry>> = HashMap::new();
    for rel in &meta_files {
        let entry = load_entry(&base, rel, true);
        meta_map.entry(entry.key.clone()).or_default().push(entry);
    }

    // body entries, grouped by dedup key
    let mut groups: HashMap<String, Vec<FileEntry>> = HashMap::new();
    for rel in &body_files {
        let entry = load_entry(&base, rel, false);
        groups.entry(entry.key.clone()).or_default().push(entry);
    }

    let mut chosen: Vec<FileEntry> = groups
        .into_values()
        .map(|group| pick_representative(group))
        .collect();
    chosen.sort_by(|a, b| numeric_compare(&a.rel, &b.rel));

    let mut ok_count = 0usize;
    let mut err_count = 0usize;
    let mut rows = Vec::with_capacity(chosen.len());
    for item in &chosen {
        let meta_extra = nearest_meta_issues(meta_map.get(&item.key), item.mtime_ms);
        let total = item.issues + meta_extra;
        if total > 0 {
            err_count += 1;
            rows.push(format!("{}  [deviations:{}]", item.rel, total));
        } else {
            ok_count += 1;
            rows.push(item.rel.clone());
        }
    }

    lines.push(format!(
        "Unique JSON responses: {} [OK: {} | Error: {}]",
        chosen.len(),
        ok_count,
        err_count
    ));
    lines.extend(rows);

    write_report(cfg, run_dir_name, &lines.join("\n"))
}

/// Parses and validates one artifact file. A file that fails to parse
/// still participates in grouping with exactly one synthetic issue
/// (`invalid.json` / `invalid.meta.json`).
fn load_entry(base: &Path, rel: &str, is_meta: bool) -> FileEntry {
    let abs = base.join(rel);
    let mtime_ms = crate::store::file_mtime_ms(&abs).unwrap_or(0);
    let issues = match std::fs::read_to_string(&abs)
        .ok()
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
    {
        Some(doc) => {
            if is_meta {
                validate_meta(&doc).len()
            } else {
                validate_body(&doc).len()
            }
        }
        None => 1, // invalid.json / invalid.meta.json
    };
    FileEntry {
        rel: rel.to_string(),
        key: unique_key(rel),
        mtime_ms,
        issues,
    }
}

/// Representative choice within a dedup group: highest issue count first,
/// then most recent mtime. Deliberately surfaces the most anomalous
/// capture of an endpoint rather than the latest one; recency only
/// breaks ties.
fn pick_representative(mut group: Vec<FileEntry>) -> FileEntry {
    group.sort_by(|a, b| {
        b.issues
            .cmp(&a.issues)
            .then_with(|| b.mtime_ms.cmp(&a.mtime_ms))
    });
    group.into_iter().next().expect("group is never empty")
}

/// Issue count of the metadata entry closest in mtime to the chosen
/// body; no metadata in the group contributes zero.
fn nearest_meta_issues(group: Option<&Vec<FileEntry>>, target_mtime: i64) -> usize {
    let group = match group {
        Some(g) if !g.is_empty() => g,
        _ => return 0,
    };
    group
        .iter()
        .min_by_key(|e| (e.mtime_ms - target_mtime).abs())
        .map(|e| e.issues)
        .unwrap_or(0)
}

/// Deterministic numeric-aware path ordering: digit runs compare as
/// integers, everything else byte-wise. Locale-independent so report
/// order is stable across machines.
fn numeric_compare(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_digits(&mut ca);
                let nb = take_digits(&mut cb);
                // compare as integers: shorter (minus leading zeros) is smaller
                let ta = na.trim_start_matches('0');
                let tb = nb.trim_start_matches('0');
                let ord = ta
                    .len()
                    .cmp(&tb.len())
                    .then_with(|| ta.cmp(tb))
                    .then_with(|| na.len().cmp(&nb.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.cmp(&y);
                if ord != Ordering::Equal {
                    return ord;
                }
                ca.next();
                cb.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(c) = it.peek() {
        if c.is_ascii_digit() {
            out.push(*c);
            it.next();
        } else {
            break;
        }
    }
    out
}

/// Device token from the chronologically-first metadata file in the run,
/// independent of grouping. Best-effort: any failure is `None`.
fn extract_android_token(base: &Path, meta_files: &[&String]) -> Option<String> {
    let mut with_times: Vec<(&str, i64)> = meta_files
        .iter()
        .map(|rel| {
            let t = crate::store::file_mtime_ms(&base.join(rel.as_str())).unwrap_or(0);
            (rel.as_str(), t)
        })
        .collect();
    with_times.sort_by_key(|(_, t)| *t);
    let (first, _) = with_times.first()?;

    let text = std::fs::read_to_string(base.join(first)).ok()?;
    let meta: serde_json::Value = serde_json::from_str(&text).ok()?;
    let headers: Vec<crate::har::HarHeader> =
        serde_json::from_value(meta.get("request")?.get("headers")?.clone()).ok()?;
    let value = get_header(&headers, "x-requested-with")?;
    ANDROID_TOKEN.find(value).map(|m| m.as_str().to_string())
}

/// Writes the rendered report to
/// `<out_dir>/<sanitized_run>__summary__<generated-at>.txt`. A new file
/// per invocation; nothing is ever overwritten.
fn write_report(cfg: &HarcapConfig, run_dir_name: &str, content: &str) -> Result<PathBuf> {
    let out_dir = &cfg.report.out_dir;
    store::ensure_dir(out_dir)?;

    let safe_run = {
        let s = sanitize_for_file(run_dir_name);
        if s.is_empty() {
            "RUN".to_string()
        } else {
            s
        }
    };
    let ts = chrono::Local::now().format("%Y-%m-%d_%H-%M");
    let out_path = out_dir.join(format!("{safe_run}__summary__{ts}.txt"));

    std::fs::write(&out_path, content)
        .with_context(|| format!("failed to write report: {}", out_path.display()))?;
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};

    fn test_config(dir: &Path) -> HarcapConfig {
        let mut cfg = HarcapConfig::default();
        cfg.storage.data_dir = dir.join("data");
        cfg.report.out_dir = dir.join("reports");
        cfg
    }

    fn write_run_file(cfg: &HarcapConfig, run: &str, name: &str, content: &str, mtime_s: u64) {
        let dir = cfg.storage.data_dir.join(run);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_s);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    const CLEAN_BODY: &str = r#"{"apiVersion":1,"serverTime":"2024-01-01T00:00:00Z","requestId":"x"}"#;

    #[test]
    fn empty_run_still_produces_report() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let path = build_report_for_run(&cfg, "missing__UAT").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Capture report: missing__UAT"));
        assert!(text.contains("(no saved JSON files)"));
        assert!(text.contains("Hint:"));
    }

    #[test]
    fn two_captures_collapse_to_one_group() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000000000.json", CLEAN_BODY, 100);
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000099000.json", CLEAN_BODY, 200);

        let path = build_report_for_run(&cfg, "r__UAT").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Unique JSON responses: 1 [OK: 1 | Error: 0]"), "{text}");
    }

    #[test]
    fn representative_prefers_more_issues_over_recency() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        // newer but clean
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000099000.json", CLEAN_BODY, 200);
        // older with issues (missing everything)
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000000000.json", "{}", 100);

        let path = build_report_for_run(&cfg, "r__UAT").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(
            text.contains("GET__h__p__1700000000000.json  [deviations:3]"),
            "{text}"
        );
        assert!(!text.contains("GET__h__p__1700000099000.json"), "{text}");
    }

    #[test]
    fn recency_breaks_issue_ties() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000000000.json", "{}", 100);
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000099000.json", "{}", 200);

        let path = build_report_for_run(&cfg, "r__UAT").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("GET__h__p__1700000099000.json"), "{text}");
        assert!(!text.contains("GET__h__p__1700000000000.json  ["), "{text}");
    }

    #[test]
    fn unparseable_body_counts_one_issue() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000000000.json", "not json", 100);

        let path = build_report_for_run(&cfg, "r__UAT").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("[deviations:1]"), "{text}");
        assert!(text.contains("[OK: 0 | Error: 1]"), "{text}");
    }

    #[test]
    fn nearest_meta_issues_add_to_total() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000000000.json", CLEAN_BODY, 100);
        // broken meta (unparseable) nearest in time to the body
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000000000.meta.json", "oops", 101);

        let path = build_report_for_run(&cfg, "r__UAT").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("[deviations:1]"), "{text}");
    }

    #[test]
    fn android_token_from_first_meta() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000000000.json", CLEAN_BODY, 100);
        let meta = r#"{
            "run": "r__UAT",
            "capturedAt": "2024-01-01T00:00:00.000Z",
            "request": {
                "method": "GET", "url": "https://h/p",
                "headers": [ { "name": "X-Requested-With", "value": "com.app; Android 35" } ],
                "httpVersion": "HTTP/1.1"
            }
        }"#;
        write_run_file(&cfg, "r__UAT", "GET__h__p__1700000000000.meta.json", meta, 101);

        let path = build_report_for_run(&cfg, "r__UAT").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Device under test: Android 35"), "{text}");
    }

    #[test]
    fn report_rows_sorted_numerically() {
        assert_eq!(numeric_compare("a2.json", "a10.json"), Ordering::Less);
        assert_eq!(numeric_compare("a10.json", "a10.json"), Ordering::Equal);
        assert_eq!(numeric_compare("b1.json", "a2.json"), Ordering::Greater);
        assert_eq!(numeric_compare("a02.json", "a2.json"), Ordering::Greater);
    }

    #[test]
    fn distinct_endpoints_stay_separate() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_run_file(&cfg, "r__UAT", "GET__h__users__1700000000000.json", CLEAN_BODY, 100);
        write_run_file(&cfg, "r__UAT", "GET__h__orders__1700000000000.json", "{}", 100);

        let path = build_report_for_run(&cfg, "r__UAT").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Unique JSON responses: 2 [OK: 1 | Error: 1]"), "{text}");
    }
}
