//! Artifact filename template: a closed set of placeholders and a pure
//! substitution function, so templates can be validated without running
//! an extraction.

use super::sanitize::sanitize_for_file;

/// Placeholders a filename template may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Method,
    Host,
    Path,
    Ts,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::Method,
        Placeholder::Host,
        Placeholder::Path,
        Placeholder::Ts,
    ];

    /// Token form as it appears in a template string.
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::Method => "{{method}}",
            Placeholder::Host => "{{host}}",
            Placeholder::Path => "{{path}}",
            Placeholder::Ts => "{{ts}}",
        }
    }
}

/// Raw values for one rendered filename. String values are sanitized
/// during rendering; `ts` is the capture time in epoch milliseconds.
#[derive(Debug, Clone)]
pub struct TemplateValues<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub ts: i64,
}

/// Error for templates that cannot produce a usable filename. This is a
/// configuration defect and the one failure class surfaced to the operator.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("filename template contains no known placeholder: {0:?}")]
    NoPlaceholders(String),
    #[error("filename template renders to an empty name: {0:?}")]
    EmptyRender(String),
}

/// Renders `template`, substituting every placeholder token with its
/// sanitized value. Substitution is order-independent: each token is
/// replaced exactly once, wherever it occurs.
pub fn render(template: &str, values: &TemplateValues<'_>) -> String {
    let mut out = template.to_string();
    for ph in Placeholder::ALL {
        let replacement = match ph {
            Placeholder::Method => sanitize_for_file(values.method),
            Placeholder::Host => sanitize_for_file(values.host),
            Placeholder::Path => sanitize_for_file(values.path),
            Placeholder::Ts => values.ts.to_string(),
        };
        out = out.replace(ph.token(), &replacement);
    }
    out
}

/// Checks that a template references at least one known placeholder and
/// renders to a non-empty name for representative values.
pub fn validate_template(template: &str) -> Result<(), TemplateError> {
    if !Placeholder::ALL.iter().any(|ph| template.contains(ph.token())) {
        return Err(TemplateError::NoPlaceholders(template.to_string()));
    }
    let probe = TemplateValues {
        method: "GET",
        host: "example.com",
        path: "/probe",
        ts: 0,
    };
    if render(template, &probe).trim().is_empty() {
        return Err(TemplateError::EmptyRender(template.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> TemplateValues<'static> {
        TemplateValues {
            method: "POST",
            host: "api.example.com",
            path: "/v1/users/list",
            ts: 1_700_000_000_123,
        }
    }

    #[test]
    fn renders_default_template() {
        let name = render("{{method}}__{{host}}__{{path}}__{{ts}}.json", &values());
        assert_eq!(name, "POST__api.example.com__v1_users_list__1700000000123.json");
    }

    #[test]
    fn substitution_is_order_independent() {
        let name = render("{{ts}}--{{path}}--{{method}}", &values());
        assert_eq!(name, "1700000000123--v1_users_list--POST");
    }

    #[test]
    fn unknown_tokens_pass_through() {
        let name = render("{{method}}__{{unknown}}.json", &values());
        assert_eq!(name, "POST__{{unknown}}.json");
    }

    #[test]
    fn validate_rejects_placeholder_free_template() {
        assert!(matches!(
            validate_template("static-name.json"),
            Err(TemplateError::NoPlaceholders(_))
        ));
    }

    #[test]
    fn validate_accepts_default() {
        assert!(validate_template("{{method}}__{{host}}__{{path}}__{{ts}}.json").is_ok());
    }
}
