//! Instruction parser
//!
//! Walks an instruction line by line, tracking the method in effect and
//! whether the Expected Output block has started, and turns each line into
//! at most one action. The Expected Output block is handled afterwards by
//! its own grammar over the full text.

use std::sync::LazyLock;

use log::{debug, info, warn};
use regex::Regex;

use crate::action::{
    handler_for, Action, ActionType, ConfidenceSummary, Domain, LineContext, ParsedInstructionSet,
};
use crate::config::ScoringConfig;
use crate::frontend::expected::{is_section_marker, marker_offset, parse_expected_output};
use crate::frontend::lines::{split_lines, SourceLine};
use crate::frontend::method::{
    canonical_method, explicit_send_method, has_request_verb, method_keywords, REQUEST_VERBS,
};
use crate::frontend::normalize::{contains_word, normalize};
use crate::matcher::{table_for, ConfidenceScorer, MatcherTable};
use crate::request::ParseRequest;
use crate::security::SecurityClassifier;
use crate::utils::Span;

/// Method assumed when neither the text nor the caller names one
pub const DEFAULT_METHOD: &str = "GET";

static NEGATED_ATTACH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bwithout\s+(?:(?:a|an|the|any)\s+)?(?:request\s+|json\s+)?(?:body|payload|attach\w*)\b").unwrap()
});

/// Section state of the line walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Normal,
    InExpectedOutput,
}

/// Why a line produced no action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TrainingNote,
    Comment,
    SectionMarker,
    ExpectedOutput,
    Negated,
    /// Already emitted as the leading request
    PrimaryRequest,
}

/// Result of one line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Action(Action),
    /// Nothing scored above threshold
    Fallback(Action),
    Skipped(SkipReason),
}

/// Cross-line state for a single parse call
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    pub state: ParseState,
    pub current_method: String,
    /// True when the instruction names more than one method
    pub multi_method: bool,
    pub base_url: &'a str,
    pub table: &'static MatcherTable,
    /// Line number already consumed by the leading request
    pub primary_line: Option<usize>,
}

/// A line that carries text before the Expected Output marker becomes two
/// lines: the leading text, walked as an ordinary line, and the marker.
pub fn split_at_marker(line: SourceLine) -> Vec<SourceLine> {
    if line.is_training_note() {
        return vec![line];
    }
    let Some(offset) = marker_offset(&line.text).filter(|&o| o > 0) else {
        return vec![line];
    };
    let head = line.text[..offset].trim_end();
    if head.is_empty() {
        return vec![line];
    }

    let start = line.span.start;
    let head_line = SourceLine::new(head, Span::new(line.number(), start, start + head.len()));
    let marker_line = SourceLine::new(
        &line.text[offset..],
        Span::new(line.number(), start + offset, line.span.end),
    );
    vec![head_line, marker_line]
}

/// True for lines like "send it without a body"
pub fn is_negated_attachment(normalized: &str) -> bool {
    NEGATED_ATTACH_RE.is_match(normalized)
}

#[derive(Debug, Clone, Default)]
pub struct InstructionParser {
    scorer: ConfidenceScorer,
    classifier: SecurityClassifier,
}

impl InstructionParser {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            scorer: ConfidenceScorer::new(config.clone()),
            classifier: SecurityClassifier::new(config),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        self.scorer.config()
    }

    pub fn parse_request(&self, request: &ParseRequest) -> ParsedInstructionSet {
        self.parse(
            &request.instruction,
            &request.target_url,
            request.method_hint.as_deref(),
            request.domain,
        )
    }

    /// Parse an instruction into an ordered action list
    pub fn parse(
        &self,
        instruction: &str,
        target_url: &str,
        method_hint: Option<&str>,
        domain: Domain,
    ) -> ParsedInstructionSet {
        let lines: Vec<SourceLine> = split_lines(instruction).into_iter().flat_map(split_at_marker).collect();
        let methods = method_keywords(&normalize(instruction));

        let mut ctx = ParseContext {
            state: ParseState::Normal,
            current_method: method_hint
                .and_then(canonical_method)
                .unwrap_or_else(|| DEFAULT_METHOD.to_string()),
            multi_method: methods.len() > 1,
            base_url: target_url,
            table: table_for(domain),
            primary_line: None,
        };

        let mut actions = Vec::new();
        if let Some(primary) = self.primary_request(&lines, &mut ctx) {
            actions.push(primary);
        }

        let mut fallback_count = 0;
        let mut skipped_lines = 0;
        for line in &lines {
            match self.parse_line(line, &mut ctx) {
                LineOutcome::Action(action) => actions.push(action),
                LineOutcome::Fallback(action) => {
                    fallback_count += 1;
                    actions.push(action);
                }
                LineOutcome::Skipped(SkipReason::PrimaryRequest) => {}
                LineOutcome::Skipped(_) => skipped_lines += 1,
            }
        }

        actions.extend(parse_expected_output(instruction));

        let classification = match domain {
            Domain::Security => Some(self.classifier.classify(instruction)),
            _ => None,
        };

        let summary = ConfidenceSummary::from_actions(&actions, fallback_count, skipped_lines);
        info!(
            "parsed {} instruction: {} actions ({} fallback, {} lines skipped), mean confidence {:.2}",
            domain, summary.action_count, summary.fallback_count, summary.skipped_lines, summary.mean
        );

        ParsedInstructionSet {
            domain,
            actions,
            summary,
            classification,
        }
    }

    /// Classify one line and advance the cross-line context
    pub fn parse_line(&self, line: &SourceLine, ctx: &mut ParseContext<'_>) -> LineOutcome {
        if line.is_training_note() {
            debug!("line {}: skipping training note", line.number());
            return LineOutcome::Skipped(SkipReason::TrainingNote);
        }
        if ctx.state == ParseState::InExpectedOutput {
            return LineOutcome::Skipped(SkipReason::ExpectedOutput);
        }
        if is_section_marker(&line.normalized) {
            debug!("line {}: entering expected output section", line.number());
            ctx.state = ParseState::InExpectedOutput;
            return LineOutcome::Skipped(SkipReason::SectionMarker);
        }
        if line.is_comment() {
            return LineOutcome::Skipped(SkipReason::Comment);
        }
        if ctx.primary_line == Some(line.number()) {
            return LineOutcome::Skipped(SkipReason::PrimaryRequest);
        }
        if is_negated_attachment(&line.normalized) {
            debug!("line {}: negative instruction, no action: {}", line.number(), line.text);
            return LineOutcome::Skipped(SkipReason::Negated);
        }

        if ctx.multi_method {
            if let Some(method) = explicit_send_method(&line.text) {
                if method != ctx.current_method {
                    debug!("line {}: method {} -> {}", line.number(), ctx.current_method, method);
                    ctx.current_method = method;
                }
            }
        }

        let Some(candidate) = self.scorer.best(ctx.table, &line.text, &line.normalized) else {
            let confidence = self.config().fallback_confidence;
            warn!(
                "line {}: low confidence classification, falling back to verify: {}",
                line.number(),
                line.text
            );
            return LineOutcome::Fallback(Action::fallback(&line.text, confidence).with_span(line.span));
        };

        let line_ctx = LineContext {
            line: &line.text,
            normalized: &line.normalized,
            method: &ctx.current_method,
            base_url: ctx.base_url,
        };
        let action = handler_for(candidate.action_type)(&line_ctx)
            .with_confidence(candidate.confidence)
            .with_keywords(candidate.matched_keywords)
            .with_span(line.span);
        LineOutcome::Action(action)
    }

    /// The leading request: when the lines of the main pass pair a request
    /// verb with an HTTP method keyword, the first action is always that
    /// request. A negated line can still trigger it but is never consumed.
    fn primary_request(&self, lines: &[SourceLine], ctx: &mut ParseContext<'_>) -> Option<Action> {
        let eligible: Vec<&SourceLine> = lines
            .iter()
            .filter(|l| !l.is_training_note())
            .take_while(|l| !is_section_marker(&l.normalized))
            .filter(|l| !l.is_comment())
            .collect();

        if !eligible.iter().any(|l| has_request_verb(&l.normalized)) {
            return None;
        }
        let first_method = eligible
            .iter()
            .find_map(|l| method_keywords(&l.normalized).into_iter().next())?;

        let candidates: Vec<&SourceLine> = eligible
            .into_iter()
            .filter(|l| !is_negated_attachment(&l.normalized))
            .collect();
        let line = candidates
            .iter()
            .find(|l| has_request_verb(&l.normalized) && !method_keywords(&l.normalized).is_empty())
            .or_else(|| candidates.iter().find(|l| has_request_verb(&l.normalized)))
            .copied();

        let method = line
            .and_then(|l| method_keywords(&l.normalized).into_iter().next())
            .unwrap_or(first_method);
        ctx.current_method = method.clone();

        let mut keywords: Vec<String> = REQUEST_VERBS
            .iter()
            .filter(|v| line.map(|l| contains_word(&l.normalized, v)).unwrap_or(false))
            .map(|v| v.to_string())
            .collect();
        keywords.push(method.clone());

        let action = match line {
            Some(l) => {
                ctx.primary_line = Some(l.number());
                let line_ctx = LineContext {
                    line: &l.text,
                    normalized: &l.normalized,
                    method: &method,
                    base_url: ctx.base_url,
                };
                handler_for(ActionType::SendRequest)(&line_ctx)
                    .with_method(method.clone())
                    .with_span(l.span)
            }
            None => Action::new(ActionType::SendRequest, format!("Send {} request", method))
                .with_method(method.clone())
                .with_url(ctx.base_url),
        };
        debug!("leading request: {} {}", method, ctx.base_url);
        Some(action.with_keywords(keywords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Assertion, ExpectedValue, Literal};
    use crate::security::IntentId;
    use pretty_assertions::assert_eq;

    const URL: &str = "https://jsonplaceholder.typicode.com/posts";

    fn parse(domain: Domain, text: &str) -> ParsedInstructionSet {
        InstructionParser::default().parse(text, URL, None, domain)
    }

    fn types(set: &ParsedInstructionSet) -> Vec<ActionType> {
        set.actions.iter().map(|a| a.action_type).collect()
    }

    #[test]
    fn test_first_action_is_the_request() {
        let cases = [
            ("Send a POST request to create a post", "POST"),
            ("Verify the title field first\nthen make a delete call", "DELETE"),
            ("Execute a put to update the record", "PUT"),
            ("Make a request\nUse GET for it", "GET"),
        ];
        for (text, method) in cases {
            let set = parse(Domain::Api, text);
            let first = &set.actions[0];
            assert_eq!(first.action_type, ActionType::SendRequest, "{}", text);
            assert_eq!(first.method.as_deref(), Some(method), "{}", text);
        }
    }

    #[test]
    fn test_request_before_marker_on_same_line() {
        let set = parse(Domain::Api, "Send a GET request to fetch post 1. Expected Output: id equals 1");
        assert_eq!(types(&set), vec![ActionType::SendRequest, ActionType::Verify]);
        assert_eq!(set.actions[0].method.as_deref(), Some("GET"));
        assert_eq!(set.actions[0].span.map(|s| (s.line, s.start)), Some((1, 0)));
        assert_eq!(set.actions[1].field.as_deref(), Some("id"));
        assert_eq!(set.actions[1].expected_value, Some(Literal::Integer(1).into()));
        assert_eq!(set.summary.fallback_count, 0);
    }

    #[test]
    fn test_split_at_marker() {
        let line = SourceLine::new("  Send a POST request. Expected Output: id equals 1", Span::new(2, 10, 59));
        let parts = split_at_marker(line);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text, "Send a POST request.");
        assert_eq!(parts[1].text, "Expected Output: id equals 1");
        assert_eq!(parts[1].span.start, 10 + 21);
        assert!(parts.iter().all(|p| p.number() == 2));

        let marker_only = SourceLine::new("Expected Output:", Span::new(1, 0, 16));
        assert_eq!(split_at_marker(marker_only).len(), 1);
    }

    #[test]
    fn test_verify_line_mentioning_a_method_is_not_a_request() {
        let set = parse(Domain::Api, "Send a POST request\nVerify the post was created");
        assert_eq!(types(&set), vec![ActionType::SendRequest, ActionType::Verify]);
    }

    #[test]
    fn test_request_line_not_duplicated() {
        let set = parse(Domain::Api, "Send a GET request\nVerify the status code is 200");
        assert_eq!(types(&set), vec![ActionType::SendRequest, ActionType::Verify]);
        assert_eq!(set.actions[0].span.map(|s| s.line), Some(1));
    }

    #[test]
    fn test_body_attachment_value_is_a_number() {
        let set = parse(Domain::Api, "Send a POST request\nattach request body with age 42");
        let attach = set.actions_of(ActionType::AttachBody).next().unwrap();
        assert_eq!(attach.field.as_deref(), Some("age"));
        assert_eq!(attach.expected_value, Some(ExpectedValue::Literal(Literal::Integer(42))));
    }

    #[test]
    fn test_negated_line_yields_nothing() {
        let set = parse(
            Domain::Api,
            "Send a POST request\nSend it again without a body and verify status equals 400",
        );
        assert_eq!(types(&set), vec![ActionType::SendRequest]);
        assert_eq!(set.summary.skipped_lines, 1);
        assert_eq!(set.summary.fallback_count, 0);
    }

    #[test]
    fn test_negated_request_line_still_leads_with_request() {
        let set = parse(Domain::Api, "Send a POST request without a body");
        assert_eq!(set.actions.len(), 1);
        assert_eq!(set.actions[0].action_type, ActionType::SendRequest);
        assert_eq!(set.actions[0].method.as_deref(), Some("POST"));
        assert_eq!(set.actions[0].span, None);
    }

    #[test]
    fn test_chained_request_keeps_base_url() {
        let text = "Send a POST request to create a post\n\
                    Store the id from the response\n\
                    Send a GET request using the stored id";
        let set = parse(Domain::Api, text);
        assert_eq!(
            types(&set),
            vec![ActionType::SendRequest, ActionType::StoreResponse, ActionType::SendChainedRequest]
        );
        let chained = &set.actions[2];
        assert_eq!(chained.method.as_deref(), Some("GET"));
        assert_eq!(chained.use_stored_variable.as_deref(), Some("id"));
        assert_eq!(chained.url.as_deref(), Some(URL));
    }

    #[test]
    fn test_method_context_follows_explicit_switches() {
        let text = "Send a POST request\nSend a DELETE request\nSend the request again";
        let set = parse(Domain::Api, text);
        let methods: Vec<_> = set.actions.iter().map(|a| a.method.clone()).collect();
        assert_eq!(
            methods,
            vec![Some("POST".to_string()), Some("DELETE".to_string()), Some("DELETE".to_string())]
        );
    }

    #[test]
    fn test_method_hint_used_without_keywords() {
        let set = InstructionParser::default().parse("Call the endpoint", URL, Some("patch"), Domain::Api);
        assert_eq!(set.actions[0].action_type, ActionType::SendRequest);
        assert_eq!(set.actions[0].method.as_deref(), Some("PATCH"));
    }

    #[test]
    fn test_fallback_for_unrecognized_line() {
        let set = parse(Domain::Api, "The sky is blue today");
        assert_eq!(set.actions.len(), 1);
        let action = &set.actions[0];
        assert_eq!(action.action_type, ActionType::Verify);
        assert_eq!(action.confidence, 0.2);
        assert_eq!(action.description, "The sky is blue today");
        assert_eq!(set.summary.fallback_count, 1);
    }

    #[test]
    fn test_training_and_comment_lines_skipped() {
        let text = "[training] send a GET request\nThis test trains the model on nothing\n# a comment\nThe sky is blue";
        let set = parse(Domain::Api, text);
        assert_eq!(set.actions.len(), 1);
        assert_eq!(set.actions[0].confidence, 0.2);
        assert_eq!(set.summary.skipped_lines, 3);
    }

    #[test]
    fn test_expected_output_section() {
        let text = "Send a GET request to fetch post 1\n\
                    Expected Output:\n\
                    id value equals 1\n\
                    title value is a string\n\
                    password does not exist\n\
                    some unparseable remark";
        let set = parse(Domain::Api, text);
        assert_eq!(
            types(&set),
            vec![ActionType::SendRequest, ActionType::Verify, ActionType::Verify, ActionType::Verify]
        );
        assert_eq!(set.actions[1].expected_value, Some(Literal::Integer(1).into()));
        assert_eq!(set.actions[2].assertion, Some(Assertion::TypeOf));
        assert_eq!(set.actions[3].expected_value, Some(ExpectedValue::DoesNotExist));
        assert_eq!(set.summary.fallback_count, 0);
    }

    #[test]
    fn test_lines_after_section_are_not_main_pass_actions() {
        let text = "Send a GET request\nExpected Output: id equals 1\n\nThe sky is blue";
        let set = parse(Domain::Api, text);
        assert_eq!(set.summary.fallback_count, 0);
        assert_eq!(set.actions.len(), 2);
    }

    #[test]
    fn test_security_domain_attaches_classification() {
        let set = parse(Domain::Security, "attempt sql injection with ' or 1=1 -- and verify it is blocked");
        let classification = set.classification.expect("security parse is classified");
        assert_eq!(classification.intent.id, IntentId::SecInj);
        assert!(!set.actions.is_empty());
        assert!(parse(Domain::Api, "Send a GET request").classification.is_none());
    }

    #[test]
    fn test_accessibility_domain() {
        let text = "Navigate to the home page\nCount the images without alt text\nVerify the contrast ratio meets WCAG 2.1";
        let set = parse(Domain::Accessibility, text);
        assert_eq!(types(&set), vec![ActionType::SendRequest, ActionType::Count, ActionType::Verify]);
    }

    #[test]
    fn test_parses_are_independent() {
        let parser = InstructionParser::default();
        let a = parser.parse("Send a POST request\nSend a GET request using the stored id", URL, None, Domain::Api);
        let b = parser.parse("Send a POST request\nSend a GET request using the stored id", URL, None, Domain::Api);
        assert_eq!(a.actions, b.actions);
    }
}
