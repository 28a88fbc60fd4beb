//! Rules for captured response bodies.
//!
//! Deliberately a small, low-false-positive set: required top-level
//! fields plus a conditional error-code check. Extend by appending to
//! `BODY_RULES`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::Rule;

/// `YYYY-MM-DDTHH:MM:SS[.fraction]Z`, nothing looser.
static SERVER_TIME_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z$").expect("static pattern")
});

pub static BODY_RULES: &[Rule] = &[
    Rule {
        code: "missing.apiVersion",
        test: has_api_version,
    },
    Rule {
        code: "missing.serverTime",
        test: has_server_time,
    },
    Rule {
        code: "invalid.serverTime.format",
        test: server_time_format_ok,
    },
    Rule {
        code: "missing.requestId",
        test: has_request_id,
    },
    Rule {
        code: "missing.error.code",
        test: error_code_present_on_failure,
    },
];

fn has_api_version(doc: &Value) -> bool {
    doc.get("apiVersion").is_some()
}

fn has_server_time(doc: &Value) -> bool {
    doc.get("serverTime").is_some()
}

/// Vacuously satisfied when `serverTime` is absent (presence is a
/// separate rule). Non-string values are checked via their JSON text.
fn server_time_format_ok(doc: &Value) -> bool {
    let value = match doc.get("serverTime") {
        Some(v) => v,
        None => return true,
    };
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    SERVER_TIME_FORMAT.is_match(&text)
}

fn has_request_id(doc: &Value) -> bool {
    doc.get("requestId").is_some()
}

/// Only applies when `success` is the boolean `false`; then `error.code`
/// must be present and non-empty.
fn error_code_present_on_failure(doc: &Value) -> bool {
    match doc.get("success") {
        Some(Value::Bool(false)) => {}
        _ => return true,
    }
    match doc.get("error").and_then(|e| e.get("code")) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}
