//! Action model
//!
//! An action is one typed test step extracted from an instruction line.
//! Parsing produces an ordered list of them for the code emitters.

pub mod dispatch;
pub mod value;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::security::ClassificationResult;
use crate::utils::{Error, Span};

pub use dispatch::{handler_for, ActionHandler, LineContext, HANDLERS};
pub use value::{ExpectedValue, Literal};

/// Response-wrapper names that never denote a real field
pub const RESERVED_FIELD_ALIASES: &[&str] = &["response", "body", "result", "output", "data"];

/// The closed set of action types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SendRequest,
    SendChainedRequest,
    StoreResponse,
    ReadField,
    Count,
    Verify,
    MeasureTime,
    AttachBody,
}

impl ActionType {
    pub const ALL: [ActionType; 8] = [
        ActionType::SendRequest,
        ActionType::SendChainedRequest,
        ActionType::StoreResponse,
        ActionType::ReadField,
        ActionType::Count,
        ActionType::Verify,
        ActionType::MeasureTime,
        ActionType::AttachBody,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::SendRequest => "send_request",
            Self::SendChainedRequest => "send_chained_request",
            Self::StoreResponse => "store_response",
            Self::ReadField => "read_field",
            Self::Count => "count",
            Self::Verify => "verify",
            Self::MeasureTime => "measure_time",
            Self::AttachBody => "attach_body",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Assertion shape a verify step should be emitted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assertion {
    Equals,
    TypeOf,
    Exists,
    NotExists,
    Status,
}

/// Instruction category, each with its own matcher table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Accessibility,
    Api,
    Security,
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accessibility" | "a11y" => Ok(Domain::Accessibility),
            "api" | "http" => Ok(Domain::Api),
            "security" | "sec" => Ok(Domain::Security),
            other => Err(Error::UnknownDomain(other.to_string())),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Accessibility => "accessibility",
            Domain::Api => "api",
            Domain::Security => "security",
        };
        write!(f, "{}", name)
    }
}

/// One typed test step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,

    /// Human-readable description, usually the source line
    pub description: String,

    /// Field name; dotted for nested paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<ExpectedValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion: Option<Assertion>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_stored_variable: Option<String>,

    /// Classification confidence (0.0 - 1.0)
    pub confidence: f64,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_keywords: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Action {
    pub fn new(action_type: ActionType, description: impl Into<String>) -> Self {
        Self {
            action_type,
            description: description.into(),
            field: None,
            expected_value: None,
            assertion: None,
            method: None,
            url: None,
            use_stored_variable: None,
            confidence: 1.0,
            matched_keywords: Vec::new(),
            span: None,
        }
    }

    /// Generic verify step emitted when nothing scored above threshold
    pub fn fallback(line: &str, confidence: f64) -> Self {
        Self::new(ActionType::Verify, line.trim()).with_confidence(confidence)
    }

    /// True for the generic verify step produced by [`Action::fallback`]
    pub fn is_fallback(&self) -> bool {
        self.action_type == ActionType::Verify && self.field.is_none() && self.matched_keywords.is_empty()
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_expected(mut self, value: impl Into<ExpectedValue>) -> Self {
        self.expected_value = Some(value.into());
        self
    }

    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertion = Some(assertion);
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_stored_variable(mut self, name: impl Into<String>) -> Self {
        self.use_stored_variable = Some(name.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.matched_keywords = keywords;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// Aggregate confidence over a parse
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceSummary {
    pub action_count: usize,
    pub fallback_count: usize,
    pub skipped_lines: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ConfidenceSummary {
    pub fn from_actions(actions: &[Action], fallback_count: usize, skipped_lines: usize) -> Self {
        if actions.is_empty() {
            return Self {
                action_count: 0,
                fallback_count,
                skipped_lines,
                mean: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        let total: f64 = actions.iter().map(|a| a.confidence).sum();
        let min = actions.iter().map(|a| a.confidence).fold(f64::INFINITY, f64::min);
        let max = actions.iter().map(|a| a.confidence).fold(f64::NEG_INFINITY, f64::max);
        Self {
            action_count: actions.len(),
            fallback_count,
            skipped_lines,
            mean: total / actions.len() as f64,
            min,
            max,
        }
    }
}

/// Result of one parse call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInstructionSet {
    pub domain: Domain,
    pub actions: Vec<Action>,
    pub summary: ConfidenceSummary,
    /// Present for the security domain only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationResult>,
}

impl ParsedInstructionSet {
    pub fn actions_of(&self, action_type: ActionType) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(move |a| a.action_type == action_type)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_json_uses_camel_case() {
        let action = Action::new(ActionType::SendChainedRequest, "send a GET request")
            .with_method("GET")
            .with_url("https://api.example.com/posts")
            .with_stored_variable("id");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "send_chained_request");
        assert_eq!(json["useStoredVariable"], "id");
        assert!(json.get("expectedValue").is_none());
    }

    #[test]
    fn test_domain_from_str() {
        assert_eq!("API".parse::<Domain>().unwrap(), Domain::Api);
        assert_eq!("a11y".parse::<Domain>().unwrap(), Domain::Accessibility);
        assert!(matches!("mobile".parse::<Domain>(), Err(Error::UnknownDomain(_))));
    }

    #[test]
    fn test_summary() {
        let actions = vec![
            Action::new(ActionType::SendRequest, "a").with_confidence(1.0),
            Action::fallback("b", 0.2),
        ];
        let summary = ConfidenceSummary::from_actions(&actions, 1, 0);
        assert_eq!(summary.action_count, 2);
        assert!((summary.mean - 0.6).abs() < 1e-9);
        assert_eq!(summary.min, 0.2);
        assert_eq!(summary.max, 1.0);
    }

    #[test]
    fn test_fallback_confidence_is_clamped() {
        assert_eq!(Action::fallback("x", 3.0).confidence, 1.0);
        assert_eq!(Action::fallback("x", 0.2).action_type, ActionType::Verify);
        assert!(Action::fallback("x", 0.2).is_fallback());
        assert!(!Action::new(ActionType::Verify, "x").with_field("id").is_fallback());
    }
}
