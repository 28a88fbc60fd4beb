//! Structural validation rules for captured documents.
//!
//! A rule is a `(code, predicate)` pair over a parsed JSON document. The
//! engine runs a fixed ordered list and collects the codes of failed
//! rules. Adding a rule means appending to the list in `body.rs` or
//! `meta.rs`; the engine and its call sites never change.

mod body;
mod meta;

pub use body::BODY_RULES;
pub use meta::META_RULES;

use serde_json::Value;

/// One named validation rule. The predicate is total: it must return
/// `true` for documents where the rule is vacuously satisfied (e.g. a
/// conditional rule whose trigger field is absent) and `false` only when
/// the rule genuinely fails.
pub struct Rule {
    pub code: &'static str,
    pub test: fn(&Value) -> bool,
}

/// Runs `rules` against `doc` in declaration order and returns the codes
/// of the rules that failed. Codes are a fixed static set, so the result
/// never contains duplicates.
pub fn evaluate(doc: &Value, rules: &[Rule]) -> Vec<&'static str> {
    rules
        .iter()
        .filter(|rule| !(rule.test)(doc))
        .map(|rule| rule.code)
        .collect()
}

/// Validates a response body document against the body rule set.
pub fn validate_body(doc: &Value) -> Vec<&'static str> {
    evaluate(doc, BODY_RULES)
}

/// Validates an artifact metadata document against the meta rule set.
pub fn validate_meta(doc: &Value) -> Vec<&'static str> {
    evaluate(doc, META_RULES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_fails_presence_rules_only() {
        let issues = validate_body(&json!({}));
        assert_eq!(
            issues,
            vec!["missing.apiVersion", "missing.serverTime", "missing.requestId"]
        );
    }

    #[test]
    fn failed_error_code_on_explicit_failure() {
        let doc = json!({
            "apiVersion": 1,
            "serverTime": "2024-01-01T00:00:00Z",
            "requestId": "x",
            "success": false,
            "error": {}
        });
        assert_eq!(validate_body(&doc), vec!["missing.error.code"]);
    }

    #[test]
    fn clean_document_yields_no_issues() {
        let doc = json!({
            "apiVersion": "2.1",
            "serverTime": "2024-06-05T10:20:30.123Z",
            "requestId": "req-7",
            "success": true
        });
        assert!(validate_body(&doc).is_empty());
    }

    #[test]
    fn issue_order_matches_declaration_order() {
        let doc = json!({ "success": false });
        assert_eq!(
            validate_body(&doc),
            vec![
                "missing.apiVersion",
                "missing.serverTime",
                "missing.requestId",
                "missing.error.code"
            ]
        );
    }

    #[test]
    fn meta_rules_are_empty_but_wired() {
        assert!(validate_meta(&json!({})).is_empty());
    }
}
