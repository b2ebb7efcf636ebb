//! HTTP method detection

use std::sync::LazyLock;

use regex::Regex;

use crate::frontend::normalize::contains_word;

pub const HTTP_METHODS: &[&str] = &["get", "post", "put", "patch", "delete", "head", "options"];

/// Verbs that introduce a request
pub const REQUEST_VERBS: &[&str] = &["send", "make", "execute"];

static SEND_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:send|make|execute)\b[^.;]*?\b(get|post|put|patch|delete|head|options)\b").unwrap()
});

/// Distinct method keywords in normalized text, uppercased, in order of
/// first appearance
pub fn method_keywords(normalized: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for word in normalized.split(' ') {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        if HTTP_METHODS.contains(&word) {
            let upper = word.to_uppercase();
            if !found.contains(&upper) {
                found.push(upper);
            }
        }
    }
    found
}

/// Method named by a `send ... <METHOD>` phrase
pub fn explicit_send_method(line: &str) -> Option<String> {
    SEND_METHOD_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_uppercase())
}

pub fn has_request_verb(normalized: &str) -> bool {
    REQUEST_VERBS.iter().any(|v| contains_word(normalized, v))
}

/// Uppercase a caller-supplied method hint, if it names a known method
pub fn canonical_method(hint: &str) -> Option<String> {
    let lower = hint.trim().to_lowercase();
    HTTP_METHODS.contains(&lower.as_str()).then(|| lower.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_keywords_in_order() {
        assert_eq!(
            method_keywords("send a post request then send a get request then post again"),
            vec!["POST", "GET"]
        );
        assert!(method_keywords("verify the title").is_empty());
    }

    #[test]
    fn test_explicit_send_method() {
        assert_eq!(explicit_send_method("Send a GET request using the stored id"), Some("GET".into()));
        assert_eq!(explicit_send_method("Make a delete call"), Some("DELETE".into()));
        assert_eq!(explicit_send_method("Get the title field"), None);
        assert_eq!(explicit_send_method("Send it. Then get the title"), None);
    }

    #[test]
    fn test_canonical_method() {
        assert_eq!(canonical_method(" patch "), Some("PATCH".into()));
        assert_eq!(canonical_method("FETCH"), None);
    }
}
