//! Structured Feedback Module
//!
//! Machine-readable report on a parse:
//! - diagnostics for lines that fell back, with rephrasing suggestions
//! - failed security validation checks
//! - parse statistics

use std::collections::BTreeMap;

use serde::Serialize;

use crate::action::{ActionType, Domain, ParsedInstructionSet};
use crate::security::{ClassificationResult, SecurityValidation};

// ==================== Diagnostics ====================

/// One finding about an instruction
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Diagnostic code (e.g., "W0001")
    pub code: String,

    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// 1-based source line, when the finding belongs to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    /// Suggested fixes, best first
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    /// Description of the fix
    pub message: String,

    /// Rewritten instruction text, if there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,

    /// Confidence in this suggestion (0.0 - 1.0)
    pub confidence: f64,
}

impl Diagnostic {
    pub fn new(code: &str, severity: Severity, message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message: message.into(),
            line,
            suggestions: vec![],
        }
    }

    /// Add a suggestion to this diagnostic
    pub fn add_suggestion(&mut self, message: impl Into<String>, replacement: Option<String>, confidence: f64) {
        self.suggestions.push(Suggestion {
            message: message.into(),
            replacement,
            confidence,
        });
    }

    /// Sort suggestions by confidence (highest first)
    pub fn sort_suggestions(&mut self) {
        self.suggestions.sort_by(|a, b| {
            b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

// ==================== Parse Report ====================

#[derive(Debug, Clone, Serialize)]
pub struct ParseStats {
    pub action_count: usize,
    pub fallback_count: usize,
    pub skipped_lines: usize,
    pub mean_confidence: f64,
    pub min_confidence: f64,
    /// Actions per type tag
    pub by_type: BTreeMap<&'static str, usize>,
}

/// Complete feedback for one parse
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    /// False when any diagnostic is a warning or worse
    pub success: bool,

    pub domain: Domain,

    pub diagnostics: Vec<Diagnostic>,

    pub stats: ParseStats,
}

impl ParseReport {
    pub fn from_parsed(parsed: &ParsedInstructionSet, validation: Option<&SecurityValidation>) -> Self {
        let mut diagnostics: Vec<Diagnostic> = parsed
            .actions
            .iter()
            .filter(|a| a.is_fallback())
            .map(|a| fallback_diagnostic(&a.description, a.span.map(|s| s.line)))
            .collect();

        if let Some(validation) = validation {
            diagnostics.extend(validation_diagnostics(validation));
        }
        if let Some(classification) = &parsed.classification {
            if let Some(hint) = assertion_hint(parsed, classification) {
                diagnostics.push(hint);
            }
        }

        let success = !diagnostics
            .iter()
            .any(|d| matches!(d.severity, Severity::Error | Severity::Warning));

        Self {
            success,
            domain: parsed.domain,
            diagnostics,
            stats: stats_for(parsed),
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Output as compact JSON (for programmatic use)
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn stats_for(parsed: &ParsedInstructionSet) -> ParseStats {
    let mut by_type = BTreeMap::new();
    for action in &parsed.actions {
        *by_type.entry(action.action_type.tag()).or_insert(0) += 1;
    }
    ParseStats {
        action_count: parsed.summary.action_count,
        fallback_count: parsed.summary.fallback_count,
        skipped_lines: parsed.summary.skipped_lines,
        mean_confidence: parsed.summary.mean,
        min_confidence: parsed.summary.min,
        by_type,
    }
}

fn fallback_diagnostic(line_text: &str, line: Option<usize>) -> Diagnostic {
    let mut diag = Diagnostic::new(
        "W0001",
        Severity::Warning,
        format!("No action matched, emitted a generic verify step: {}", line_text),
        line,
    );
    diag.add_suggestion(
        "Move the line under Expected Output if it describes the response",
        None,
        0.4,
    );
    diag.add_suggestion(
        "Rephrase as a check on a named field",
        Some("Verify the <field> equals <value>".to_string()),
        0.6,
    );
    if line_text.to_lowercase().contains("status") {
        diag.add_suggestion(
            "Name the expected status code",
            Some("Verify the status code is 200".to_string()),
            0.8,
        );
    }
    diag.sort_suggestions();
    diag
}

fn validation_diagnostics(validation: &SecurityValidation) -> Vec<Diagnostic> {
    let checks = [
        (
            validation.has_security_keyword,
            "I0101",
            "Instruction names no security concern",
            "Mention the attack or control under test",
        ),
        (
            validation.has_verification,
            "I0102",
            "Instruction says nothing to verify",
            "Add a verification step such as \"verify the status code is 403\"",
        ),
        (
            validation.has_expected_failure,
            "I0103",
            "Instruction does not describe the expected failure",
            "State how the request should fail, e.g. \"it should be rejected\"",
        ),
    ];

    checks
        .into_iter()
        .filter(|(passed, ..)| !passed)
        .map(|(_, code, message, fix)| {
            let mut diag = Diagnostic::new(code, Severity::Info, message, None);
            diag.add_suggestion(fix, None, 0.7);
            diag
        })
        .collect()
}

/// Minimum assertions of the classified intent that the parse has no
/// verify step for
fn assertion_hint(parsed: &ParsedInstructionSet, classification: &ClassificationResult) -> Option<Diagnostic> {
    if classification.confidence <= 0.0 || parsed.actions_of(ActionType::Verify).next().is_some() {
        return None;
    }
    let intent = classification.intent;
    let mut diag = Diagnostic::new(
        "H0001",
        Severity::Hint,
        format!("{} test has no verify step", intent.id),
        None,
    );
    for assertion in intent.min_assertions {
        diag.add_suggestion(format!("Assert that {}", assertion), None, classification.confidence);
    }
    Some(diag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::InstructionParser;
    use crate::security::validate_security_instruction;

    const URL: &str = "https://api.example.com/posts";

    #[test]
    fn test_fallback_produces_warning() {
        let parsed = InstructionParser::default().parse(
            "Send a GET request\nthe weather is nice today",
            URL,
            None,
            Domain::Api,
        );
        let report = ParseReport::from_parsed(&parsed, None);

        assert!(!report.success);
        let warnings: Vec<&Diagnostic> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "W0001");
        assert_eq!(warnings[0].line, Some(2));
        let confidences: Vec<f64> = warnings[0].suggestions.iter().map(|s| s.confidence).collect();
        assert!(confidences.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_clean_parse_succeeds() {
        let parsed = InstructionParser::default().parse(
            "Send a GET request\nVerify the status code is 200",
            URL,
            None,
            Domain::Api,
        );
        let report = ParseReport::from_parsed(&parsed, None);
        assert!(report.success);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.stats.by_type.get("send_request"), Some(&1));
        assert_eq!(report.stats.by_type.get("verify"), Some(&1));
    }

    #[test]
    fn test_validation_codes() {
        let text = "send a sql injection payload to the endpoint";
        let parsed = InstructionParser::default().parse(text, URL, None, Domain::Security);
        let validation = validate_security_instruction(text);
        let report = ParseReport::from_parsed(&parsed, Some(&validation));

        let codes: Vec<&str> = report.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert!(codes.contains(&"I0102"));
        assert!(codes.contains(&"I0103"));
        assert!(!codes.contains(&"I0101"));
    }

    #[test]
    fn test_json_output() {
        let parsed = InstructionParser::default().parse("Send a GET request", URL, None, Domain::Api);
        let report = ParseReport::from_parsed(&parsed, None);
        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["domain"], "api");
        assert!(!report.to_json_compact().contains('\n'));
    }
}
