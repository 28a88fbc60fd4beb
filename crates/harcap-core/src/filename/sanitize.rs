//! Filename-safe sanitization for template placeholder values.

/// Longest sanitized value we will embed in a filename. Keeps the full
/// rendered name well under filesystem limits even with four placeholders.
const MAX_LEN: usize = 150;

/// Sanitizes a placeholder value (method, host, URL path) for use in a filename.
///
/// - Replaces any run of `\ / : * ? " < > |`, whitespace or `_` with a single `_`
/// - Trims leading/trailing underscores
/// - Truncates to 150 bytes on a char boundary
pub fn sanitize_for_file(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_underscore = false;

    for c in value.chars() {
        let hostile = matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '_')
            || c.is_whitespace();
        if hostile {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches('_');

    if trimmed.len() > MAX_LEN {
        let mut take = MAX_LEN;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_hostile_chars() {
        assert_eq!(sanitize_for_file("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_for_file("q?r*s\"t<u>v|w"), "q_r_s_t_u_v_w");
    }

    #[test]
    fn whitespace_run_becomes_single_underscore() {
        assert_eq!(sanitize_for_file("a  \t b"), "a_b");
    }

    #[test]
    fn collapses_and_trims_underscores() {
        assert_eq!(sanitize_for_file("__a___b__"), "a_b");
        assert_eq!(sanitize_for_file("/v1/users/list"), "v1_users_list");
    }

    #[test]
    fn truncates_to_150_bytes() {
        let long = "x".repeat(400);
        assert_eq!(sanitize_for_file(&long).len(), 150);
    }

    #[test]
    fn truncation_respects_char_boundary() {
        let s = "é".repeat(100); // 200 bytes
        let out = sanitize_for_file(&s);
        assert!(out.len() <= 150);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
