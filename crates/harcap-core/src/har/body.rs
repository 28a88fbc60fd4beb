//! Response body normalization: base64 decode, XSSI strip, JSON sniffing.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Decodes a base64-encoded body to UTF-8 text. Decode or UTF-8 failure
/// leaves the text unchanged (not fatal; the entry may still be filtered
/// later by the JSON classifier).
pub fn decode_body(text: String, encoding: Option<&str>) -> String {
    if encoding.map_or(true, |e| !e.eq_ignore_ascii_case("base64")) {
        return text;
    }
    match STANDARD.decode(text.as_bytes()) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or(text),
        Err(_) => text,
    }
}

/// Strips a defensive "JSON hijacking" prefix (`)]}',` or `)]}` forms) by
/// discarding everything up to and including the first newline. A prefix
/// with no newline leaves nothing.
pub fn strip_xssi(text: &str) -> &str {
    if text.starts_with(")]}',") || text.starts_with(")]}\n") {
        match text.find('\n') {
            Some(i) => &text[i + 1..],
            None => "",
        }
    } else {
        text
    }
}

/// True when the trimmed text is bracketed like a JSON object or array.
pub fn looks_like_json(text: &str) -> bool {
    let s = text.trim();
    (s.starts_with('{') && s.ends_with('}')) || (s.starts_with('[') && s.ends_with(']'))
}

/// JSON classifier: the MIME type mentions json (covers `+json` suffix
/// forms, parameters, any case) or the body sniffs as JSON.
pub fn is_json_content(mime_type: &str, text: &str) -> bool {
    mime_type.to_ascii_lowercase().contains("json") || looks_like_json(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_body() {
        let encoded = STANDARD.encode("{\"a\":1}");
        assert_eq!(decode_body(encoded, Some("base64")), "{\"a\":1}");
    }

    #[test]
    fn bad_base64_left_unchanged() {
        assert_eq!(decode_body("not base64!!".to_string(), Some("base64")), "not base64!!");
    }

    #[test]
    fn no_encoding_left_unchanged() {
        assert_eq!(decode_body("{\"a\":1}".to_string(), None), "{\"a\":1}");
    }

    #[test]
    fn strips_xssi_prefix() {
        assert_eq!(strip_xssi(")]}',\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_xssi(")]}\n[1,2]"), "[1,2]");
    }

    #[test]
    fn xssi_prefix_without_newline_leaves_nothing() {
        assert_eq!(strip_xssi(")]}',"), "");
    }

    #[test]
    fn plain_body_untouched() {
        assert_eq!(strip_xssi("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn classifier_accepts_mime_variants() {
        assert!(is_json_content("application/json; charset=utf-8", ""));
        assert!(is_json_content("application/vnd.api+json", ""));
        assert!(is_json_content("Application/JSON", ""));
    }

    #[test]
    fn classifier_sniffs_plain_text_json() {
        assert!(is_json_content("text/plain", "{\"a\":1}"));
        assert!(is_json_content("text/plain", " [1, 2] "));
    }

    #[test]
    fn classifier_rejects_html() {
        assert!(!is_json_content("text/html", "<html>"));
    }
}
