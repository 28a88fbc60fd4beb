//! Lenient HAR 1.2 structures for extraction.
//!
//! Only the fields the pipeline consumes; everything optional is
//! defaulted so a truncated or sparse archive still parses. Request and
//! response carry exactly the subset persisted into artifact metadata,
//! so they serialize back out unchanged.

use serde::{Deserialize, Serialize};

/// Root HAR log (top-level wrapper).
#[derive(Debug, Deserialize)]
pub struct HarLog {
    pub log: HarRoot,
}

#[derive(Debug, Deserialize)]
pub struct HarRoot {
    #[serde(default)]
    pub entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
pub struct HarEntry {
    pub request: Option<HarRequest>,
    pub response: Option<HarResponse>,
    #[serde(default, rename = "startedDateTime")]
    pub started_date_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarRequest {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<HarHeader>,
    #[serde(default, rename = "httpVersion")]
    pub http_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default, rename = "statusText")]
    pub status_text: String,
    #[serde(default)]
    pub headers: Vec<HarHeader>,
    #[serde(default, rename = "httpVersion")]
    pub http_version: String,
    #[serde(default)]
    pub content: HarContent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarContent {
    #[serde(default, rename = "mimeType")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarHeader {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Case-insensitive header lookup.
pub fn get_header<'a>(headers: &'a [HarHeader], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sparse_entry() {
        let har: HarLog = serde_json::from_str(
            r#"{ "log": { "entries": [ { "request": { "url": "https://a/b" } } ] } }"#,
        )
        .unwrap();
        let entry = &har.log.entries[0];
        assert!(entry.response.is_none());
        assert_eq!(entry.request.as_ref().unwrap().url, "https://a/b");
        assert!(entry.request.as_ref().unwrap().method.is_empty());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let headers = vec![HarHeader {
            name: "X-Requested-With".to_string(),
            value: "android 35".to_string(),
        }];
        assert_eq!(get_header(&headers, "x-requested-with"), Some("android 35"));
        assert_eq!(get_header(&headers, "cookie"), None);
    }
}
