//! Expected Output grammar
//!
//! A narrow, fixed set of sentence rules applied to the block that follows
//! the `Expected Output` marker, up to the next blank line. Lines that match
//! no rule are dropped silently; this block is not free text, so there is no
//! low-confidence fallback here.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::action::dispatch::STATUS_FIELD;
use crate::action::{Action, ActionType, Assertion, ExpectedValue, Literal};
use crate::frontend::extract::sanitize_field;
use crate::frontend::lines::is_training_note;
use crate::utils::Span;

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)expected\s+output\s*:?").unwrap());

static BLANK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\r?\n").unwrap());

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s+").unwrap());

static EQUALS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:the\s+)?([A-Za-z_][\w-]*(?:\.[A-Za-z_][\w-]*)*)\s+(?:value\s+|field\s+)?(?:equals|should\s+equal|is\s+equal\s+to)\s+(.+)$",
    )
    .unwrap()
});

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:the\s+)?([A-Za-z_][\w-]*(?:\.[A-Za-z_][\w-]*)*)\s+(?:value\s+|field\s+)?(?:is\s+an?|type\s+is)\s+(number|string|boolean|object)\b",
    )
    .unwrap()
});

static EXISTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:the\s+)?([A-Za-z_][\w-]*(?:\.[A-Za-z_][\w-]*)*)\s+(?:value\s+|object\s+|field\s+)?exists\b")
        .unwrap()
});

static NOT_EXIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:the\s+)?([A-Za-z_][\w-]*(?:\.[A-Za-z_][\w-]*)*)\s+(?:field\s+)?does\s+not\s+exist\b")
        .unwrap()
});

static NOT_CONTAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:the\s+)?([A-Za-z_][\w-]*(?:\.[A-Za-z_][\w-]*)*)\s+does\s+not\s+contain\s+(?:an?\s+|the\s+)?([A-Za-z_][\w-]*)\s+field\b",
    )
    .unwrap()
});

static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:the\s+)?(?:response\s+)?status\s+code\s+(?:equals|is|should\s+be)\s+(\d{3})\b").unwrap()
});

pub type ExpectationRule = fn(&str) -> Option<Action>;

/// Rules, in priority order
pub const RULES: &[(&str, ExpectationRule)] = &[
    ("equals", rule_equals),
    ("type_of", rule_type_of),
    ("exists", rule_exists),
    ("does_not_exist", rule_does_not_exist),
    ("status", rule_status),
];

/// A line of the Expected Output block
#[derive(Debug, Clone, PartialEq)]
pub struct SectionLine<'a> {
    pub text: &'a str,
    pub span: Span,
}

/// True if the normalized line opens an Expected Output block
pub fn is_section_marker(normalized: &str) -> bool {
    normalized.contains("expected output")
}

/// Byte offset of the marker within a single line
pub fn marker_offset(line: &str) -> Option<usize> {
    MARKER_RE.find(line).map(|m| m.start())
}

/// First marker that is not part of a training note
fn find_marker(text: &str) -> Option<regex::Match<'_>> {
    MARKER_RE.find_iter(text).find(|m| {
        let line_start = text[..m.start()].rfind('\n').map_or(0, |i| i + 1);
        let line_end = text[m.end()..].find('\n').map_or(text.len(), |i| m.end() + i);
        !is_training_note(&text[line_start..line_end])
    })
}

/// Lines of the Expected Output block, or an empty list when there is none.
/// Leading blank lines right after the marker are skipped; the block ends
/// at the next blank line.
pub fn section_lines(text: &str) -> Vec<SectionLine<'_>> {
    let Some(marker) = find_marker(text) else {
        return Vec::new();
    };

    let after = &text[marker.end()..];
    let body_start = marker.end() + (after.len() - after.trim_start().len());
    let body = &text[body_start..];
    let body_end = BLANK_LINE_RE.find(body).map(|m| m.start()).unwrap_or(body.len());
    let section = &body[..body_end];

    let mut lines = Vec::new();
    let mut offset = body_start;
    for raw in section.split('\n') {
        let line_start = offset;
        offset += raw.len() + 1;

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let stripped = match BULLET_RE.find(trimmed) {
            Some(b) => &trimmed[b.end()..],
            None => trimmed,
        };
        let start = line_start + (raw.len() - raw.trim_start().len());
        let line_no = text[..start].matches('\n').count() + 1;
        lines.push(SectionLine {
            text: stripped.trim_end_matches('.').trim(),
            span: Span::new(line_no, start, start + trimmed.len()),
        });
    }
    lines
}

/// Run the grammar over a full instruction
pub fn parse_expected_output(text: &str) -> Vec<Action> {
    let mut actions = Vec::new();
    for line in section_lines(text) {
        if is_training_note(line.text) {
            debug!("expected output: skipping training note on line {}", line.span.line);
            continue;
        }
        match parse_expectation(line.text) {
            Some(action) => actions.push(action.with_span(line.span)),
            None => debug!("expected output: no rule for line {}: {}", line.span.line, line.text),
        }
    }
    actions
}

/// First matching rule for one line
pub fn parse_expectation(line: &str) -> Option<Action> {
    RULES.iter().find_map(|(_, rule)| rule(line))
}

fn verify(line: &str, field: String, expected: ExpectedValue, assertion: Assertion) -> Action {
    Action::new(ActionType::Verify, line)
        .with_field(field)
        .with_expected(expected)
        .with_assertion(assertion)
}

fn field_at(caps: &regex::Captures<'_>, group: usize) -> Option<String> {
    sanitize_field(caps.get(group)?.as_str())
}

pub fn rule_equals(line: &str) -> Option<Action> {
    let caps = EQUALS_RE.captures(line)?;
    let field = field_at(&caps, 1)?;
    let value = Literal::coerce(caps.get(2)?.as_str());
    Some(verify(line, field, value.into(), Assertion::Equals))
}

pub fn rule_type_of(line: &str) -> Option<Action> {
    let caps = TYPE_RE.captures(line)?;
    let field = field_at(&caps, 1)?;
    let type_name = caps.get(2)?.as_str().to_lowercase();
    Some(verify(line, field, Literal::String(type_name).into(), Assertion::TypeOf))
}

pub fn rule_exists(line: &str) -> Option<Action> {
    let caps = EXISTS_RE.captures(line)?;
    let field = field_at(&caps, 1)?;
    Some(verify(line, field, ExpectedValue::Exists, Assertion::Exists))
}

pub fn rule_does_not_exist(line: &str) -> Option<Action> {
    if let Some(caps) = NOT_EXIST_RE.captures(line) {
        let field = field_at(&caps, 1)?;
        return Some(verify(line, field, ExpectedValue::DoesNotExist, Assertion::NotExists));
    }

    let caps = NOT_CONTAIN_RE.captures(line)?;
    let parent = caps.get(1)?.as_str();
    let child = caps.get(2)?.as_str();
    let field = sanitize_field(&format!("{}.{}", parent, child))?;
    Some(verify(line, field, ExpectedValue::DoesNotExist, Assertion::NotExists))
}

pub fn rule_status(line: &str) -> Option<Action> {
    let caps = STATUS_RE.captures(line)?;
    let code = Literal::from_number_text(caps.get(1)?.as_str())?;
    Some(verify(line, STATUS_FIELD.to_string(), code.into(), Assertion::Status))
}
