//! Action construction
//!
//! One handler per action type, looked up through `HANDLERS`. Adding an
//! action type means adding a handler and a row, nothing else.

use std::sync::LazyLock;

use regex::Regex;

use super::{Action, ActionType, Assertion, ExpectedValue, Literal};
use crate::frontend::extract::{
    extract_body_pair, extract_field, extract_value, sanitize_field, value_number, DEFAULT_FIELD,
};
use crate::frontend::method::explicit_send_method;

/// Field name used for status-code assertions
pub const STATUS_FIELD: &str = "statusCode";

/// Field name used for timing assertions
pub const RESPONSE_TIME_FIELD: &str = "responseTime";

/// Variable a chained request reuses when none is named
pub const DEFAULT_STORED_VARIABLE: &str = "id";

static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bstatus(?:\s*code)?\b\D{0,20}?\b(\d{3})\b").unwrap());

static STORED_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:stored|saved|previous)\s+([A-Za-z_][\w.-]*)").unwrap()
});

static STORE_AS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bas\s+([A-Za-z_][\w]*)").unwrap());

static NOT_EXISTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:does\s+not|doesn't|should\s+not|must\s+not)\s+(?:exist|be\s+present)\b|\b(?:is\s+)?(?:absent|missing)\b")
        .unwrap()
});

static EXISTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:exists?|is\s+present|is\s+returned)\b").unwrap());

static SECONDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d\s*(?:s|sec|secs|seconds?)\b").unwrap());

/// What a handler sees of the current line
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    /// Raw line, trimmed
    pub line: &'a str,
    pub normalized: &'a str,
    /// Method in effect for this line
    pub method: &'a str,
    pub base_url: &'a str,
}

pub type ActionHandler = fn(&LineContext<'_>) -> Action;

/// Dispatch table, one row per action type
pub const HANDLERS: &[(ActionType, ActionHandler)] = &[
    (ActionType::SendRequest, build_send_request),
    (ActionType::SendChainedRequest, build_chained_request),
    (ActionType::StoreResponse, build_store_response),
    (ActionType::ReadField, build_read_field),
    (ActionType::Count, build_count),
    (ActionType::Verify, build_verify),
    (ActionType::MeasureTime, build_measure_time),
    (ActionType::AttachBody, build_attach_body),
];

pub fn handler_for(action_type: ActionType) -> ActionHandler {
    HANDLERS
        .iter()
        .find(|(t, _)| *t == action_type)
        .map(|(_, h)| *h)
        .unwrap_or(build_verify)
}

fn line_method(ctx: &LineContext<'_>) -> String {
    explicit_send_method(ctx.line).unwrap_or_else(|| ctx.method.to_string())
}

fn build_send_request(ctx: &LineContext<'_>) -> Action {
    Action::new(ActionType::SendRequest, ctx.line)
        .with_method(line_method(ctx))
        .with_url(ctx.base_url)
}

/// The URL stays the base URL: substituting the stored identifier is left
/// to the emitter.
fn build_chained_request(ctx: &LineContext<'_>) -> Action {
    let variable = STORED_VAR_RE
        .captures(ctx.line)
        .and_then(|c| c.get(1))
        .and_then(|m| sanitize_field(m.as_str()))
        .unwrap_or_else(|| DEFAULT_STORED_VARIABLE.to_string());

    Action::new(ActionType::SendChainedRequest, ctx.line)
        .with_method(line_method(ctx))
        .with_url(ctx.base_url)
        .with_stored_variable(variable)
}

fn build_store_response(ctx: &LineContext<'_>) -> Action {
    let field = extract_field(ctx.line);
    let variable = STORE_AS_RE
        .captures(ctx.line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| field.name.clone());

    Action::new(ActionType::StoreResponse, ctx.line)
        .with_field(field.name)
        .with_stored_variable(variable)
}

fn build_read_field(ctx: &LineContext<'_>) -> Action {
    Action::new(ActionType::ReadField, ctx.line).with_field(extract_field(ctx.line).name)
}

fn build_count(ctx: &LineContext<'_>) -> Action {
    let field = extract_field(ctx.line);
    let rest = &ctx.line[field.end..];
    let action = Action::new(ActionType::Count, ctx.line).with_field(field.name);
    match value_number(rest) {
        Some(n) => action.with_expected(n).with_assertion(Assertion::Equals),
        None => action,
    }
}

fn build_verify(ctx: &LineContext<'_>) -> Action {
    if let Some(code) = STATUS_RE.captures(ctx.line).and_then(|c| c.get(1)) {
        if let Some(value) = Literal::from_number_text(code.as_str()) {
            return Action::new(ActionType::Verify, ctx.line)
                .with_field(STATUS_FIELD)
                .with_expected(value)
                .with_assertion(Assertion::Status);
        }
    }

    let field = extract_field(ctx.line);
    let rest = &ctx.line[field.end..];
    let action = Action::new(ActionType::Verify, ctx.line).with_field(field.name);

    if NOT_EXISTS_RE.is_match(rest) {
        return action
            .with_expected(ExpectedValue::DoesNotExist)
            .with_assertion(Assertion::NotExists);
    }
    if EXISTS_RE.is_match(rest) {
        return action.with_expected(ExpectedValue::Exists).with_assertion(Assertion::Exists);
    }
    match extract_value(rest) {
        Literal::String(s) if s.is_empty() => action,
        value => action.with_expected(value).with_assertion(Assertion::Equals),
    }
}

/// Thresholds are normalized to milliseconds
fn build_measure_time(ctx: &LineContext<'_>) -> Action {
    let action = Action::new(ActionType::MeasureTime, ctx.line).with_field(RESPONSE_TIME_FIELD);
    let Some(amount) = value_number(ctx.line).and_then(|n| n.as_f64()) else {
        return action;
    };
    let millis = if SECONDS_RE.is_match(ctx.line) { amount * 1000.0 } else { amount };
    match Literal::from_f64(millis) {
        Some(value) => action.with_expected(value),
        None => action,
    }
}

fn build_attach_body(ctx: &LineContext<'_>) -> Action {
    let action = Action::new(ActionType::AttachBody, ctx.line);
    if let Some((key, value)) = extract_body_pair(ctx.line) {
        return action.with_field(key).with_expected(value);
    }

    let field = extract_field(ctx.line);
    if field.name == DEFAULT_FIELD {
        return action;
    }
    let value = extract_value(&ctx.line[field.end..]);
    action.with_field(field.name).with_expected(value)
}
