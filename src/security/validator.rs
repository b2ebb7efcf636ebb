//! Shape check for security test instructions
//!
//! Independent of classification: a usable security instruction names a
//! security concern, says what to verify, and says how the attack should
//! fail.

use serde::Serialize;

use super::classifier::occurrences;
use super::intent::REGISTRY;
use crate::frontend::normalize::normalize;

const VERIFICATION_VERBS: &[&str] = &["verify", "check", "ensure", "validate", "confirm"];

const FAILURE_TERMS: &[&str] = &["fail", "error", "reject", "deny", "denied", "block", "prevent"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityValidation {
    pub valid: bool,
    pub has_security_keyword: bool,
    pub has_verification: bool,
    pub has_expected_failure: bool,
    pub suggestions: Vec<String>,
}

fn any_term(normalized: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| occurrences(normalized, t) > 0)
}

pub fn validate_security_instruction(text: &str) -> SecurityValidation {
    let normalized = normalize(text);

    let has_security_keyword = REGISTRY
        .iter()
        .any(|intent| any_term(&normalized, intent.keywords));
    let has_verification = any_term(&normalized, VERIFICATION_VERBS);
    let has_expected_failure = any_term(&normalized, FAILURE_TERMS);

    let mut suggestions = Vec::new();
    if !has_security_keyword {
        suggestions.push(
            "Name the security concern, e.g. SQL injection, authentication or rate limiting".to_string(),
        );
    }
    if !has_verification {
        suggestions.push("Say what to check, e.g. \"verify the status code is 403\"".to_string());
    }
    if !has_expected_failure {
        suggestions.push(
            "Describe the expected failure, e.g. \"the request should be rejected\"".to_string(),
        );
    }

    SecurityValidation {
        valid: suggestions.is_empty(),
        has_security_keyword,
        has_verification,
        has_expected_failure,
        suggestions,
    }
}
