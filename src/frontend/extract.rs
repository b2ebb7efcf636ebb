//! Field and value extraction
//!
//! Both extractors are ordered chains of pure strategies; the first strategy
//! that returns `Some` wins. The chains are plain slices so their order can
//! be inspected and each strategy tested on its own.

use std::sync::LazyLock;

use regex::Regex;

use crate::action::{Literal, RESERVED_FIELD_ALIASES};

/// Words never accepted as field names
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "of", "from", "to", "in", "on", "at", "for", "with", "by",
];

/// Returned when no strategy finds a field
pub const DEFAULT_FIELD: &str = "field";

static DOUBLE_QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());

static SINGLE_QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w])'([^']+)'(?:$|[^\w])").unwrap());

static VALUE_OF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:value|content|data)\s+of\s+(?:the\s+)?([A-Za-z_][\w.-]*)").unwrap()
});

static FROM_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b([A-Za-z_][\w.-]*)\s+(?:field\s+|property\s+|value\s+)?(?:from|in|of)\s+(?:the\s+)?(?:response|body|result)\b",
    )
    .unwrap()
});

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([A-Za-z][\w-]*)\s+header\b").unwrap());

static THE_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bthe\s+([A-Za-z_][\w.-]*)\s+(?:field|property|value|attribute)\b").unwrap()
});

static CAMEL_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)+$").unwrap());

static PASCAL_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z0-9]+(?:[A-Z][a-z0-9]*)+$").unwrap());

static KEBAB_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)+$").unwrap());

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w.])(-?\d+(?:\.\d+)?)(?:$|[^\d.]|\.(?:$|\D))").unwrap()
});

static BOOLEAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(true|false)\b").unwrap());

static NULL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bnull\b").unwrap());

static WITH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bwith\b(.*)$").unwrap());

static WITH_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\bwith\s+(?:(?:a|an|the)\s+)?(?:field\s+)?["']?([A-Za-z_][\w.-]*)["']?\s*(?:=|:|as\s+|of\s+|set\s+to\s+|equal\s+to\s+|equals\s+)?\s*("[^"]*"|'[^']*'|-?\d+(?:\.\d+)?\b|\S+)"#,
    )
    .unwrap()
});

static ASSIGN_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b([A-Za-z_][\w.-]*)\s*[=:]\s*("[^"]*"|'[^']*'|-?\d+(?:\.\d+)?\b|\S+)"#).unwrap()
});

/// Body keys that describe the payload rather than name a field
const BODY_FILLER_WORDS: &[&str] = &["following", "json", "payload", "body", "data", "request", "content"];

// ==================== Field Cascade ====================

/// A field name plus the byte offset where its mention ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub name: String,
    pub end: usize,
    /// Name of the strategy that produced the match
    pub strategy: &'static str,
}

pub type FieldStrategy = fn(&str) -> Option<FieldMatch>;

/// Field strategies, in priority order
pub const FIELD_STRATEGIES: &[(&str, FieldStrategy)] = &[
    ("double_quoted", field_double_quoted),
    ("single_quoted", field_single_quoted),
    ("value_of", field_value_of),
    ("from_response", field_from_response),
    ("header", field_header),
    ("the_field", field_the_field),
    ("identifier_shape", field_identifier_shape),
];

/// Run the field cascade; yields `"field"` when nothing matches
pub fn extract_field(line: &str) -> FieldMatch {
    FIELD_STRATEGIES
        .iter()
        .find_map(|(_, strategy)| strategy(line))
        .unwrap_or_else(|| FieldMatch {
            name: DEFAULT_FIELD.to_string(),
            end: 0,
            strategy: "default",
        })
}

/// Clean a raw field candidate. Leading response-wrapper segments are
/// dropped (`response.body.id` becomes `id`); a bare wrapper or a stop word
/// is rejected.
pub fn sanitize_field(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'));
    if cleaned.is_empty() {
        return None;
    }

    let segments: Vec<&str> = cleaned.split('.').filter(|s| !s.is_empty()).collect();
    let first_real = segments
        .iter()
        .position(|s| !RESERVED_FIELD_ALIASES.contains(&s.to_lowercase().as_str()))?;
    let path = segments[first_real..].join(".");

    if STOP_WORDS.contains(&path.to_lowercase().as_str()) {
        return None;
    }
    Some(path)
}

fn capture_field(re: &Regex, line: &str, strategy: &'static str) -> Option<FieldMatch> {
    re.captures_iter(line).find_map(|caps| {
        let group = caps.get(1)?;
        let name = sanitize_field(group.as_str())?;
        let end = caps.get(0).map(|m| m.end()).unwrap_or(group.end());
        Some(FieldMatch { name, end, strategy })
    })
}

pub fn field_double_quoted(line: &str) -> Option<FieldMatch> {
    capture_field(&DOUBLE_QUOTED_RE, line, "double_quoted")
}

pub fn field_single_quoted(line: &str) -> Option<FieldMatch> {
    capture_field(&SINGLE_QUOTED_RE, line, "single_quoted")
}

pub fn field_value_of(line: &str) -> Option<FieldMatch> {
    capture_field(&VALUE_OF_RE, line, "value_of")
}

pub fn field_from_response(line: &str) -> Option<FieldMatch> {
    capture_field(&FROM_RESPONSE_RE, line, "from_response")
}

pub fn field_header(line: &str) -> Option<FieldMatch> {
    capture_field(&HEADER_RE, line, "header")
}

pub fn field_the_field(line: &str) -> Option<FieldMatch> {
    capture_field(&THE_FIELD_RE, line, "the_field")
}

/// Scan tokens for camelCase, PascalCase or kebab-case identifiers
pub fn field_identifier_shape(line: &str) -> Option<FieldMatch> {
    let mut offset = 0;
    for token in line.split(' ') {
        let start = offset;
        offset += token.len() + 1;

        let word = token.trim_matches(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'));
        if word.is_empty() || STOP_WORDS.contains(&word.to_lowercase().as_str()) {
            continue;
        }
        if CAMEL_CASE_RE.is_match(word) || PASCAL_CASE_RE.is_match(word) || KEBAB_CASE_RE.is_match(word) {
            if let Some(name) = sanitize_field(word) {
                return Some(FieldMatch {
                    name,
                    end: start + token.len(),
                    strategy: "identifier_shape",
                });
            }
        }
    }
    None
}

// ==================== Value Cascade ====================

pub type ValueStrategy = fn(&str) -> Option<Literal>;

/// Value strategies, in priority order
pub const VALUE_STRATEGIES: &[(&str, ValueStrategy)] = &[
    ("quoted", value_quoted),
    ("number", value_number),
    ("boolean", value_boolean),
    ("null", value_null),
    ("after_with", value_after_with),
];

/// Run the value cascade; yields an empty string when nothing matches
pub fn extract_value(text: &str) -> Literal {
    VALUE_STRATEGIES
        .iter()
        .find_map(|(_, strategy)| strategy(text))
        .unwrap_or_else(|| Literal::String(String::new()))
}

pub fn value_quoted(text: &str) -> Option<Literal> {
    let double = DOUBLE_QUOTED_RE.captures(text).and_then(|c| c.get(1));
    let single = SINGLE_QUOTED_RE.captures(text).and_then(|c| c.get(1));
    let found = match (double, single) {
        (Some(d), Some(s)) => Some(if d.start() <= s.start() { d } else { s }),
        (d, s) => d.or(s),
    }?;
    Some(Literal::String(found.as_str().to_string()))
}

pub fn value_number(text: &str) -> Option<Literal> {
    let caps = NUMBER_RE.captures(text)?;
    Literal::from_number_text(caps.get(1)?.as_str())
}

pub fn value_boolean(text: &str) -> Option<Literal> {
    let caps = BOOLEAN_RE.captures(text)?;
    Some(Literal::Boolean(caps.get(1)?.as_str().eq_ignore_ascii_case("true")))
}

pub fn value_null(text: &str) -> Option<Literal> {
    NULL_RE.is_match(text).then_some(Literal::Null)
}

pub fn value_after_with(text: &str) -> Option<Literal> {
    let caps = WITH_RE.captures(text)?;
    let rest = caps.get(1)?.as_str().trim();
    if rest.is_empty() {
        None
    } else {
        Some(Literal::String(rest.to_string()))
    }
}

// ==================== Body Pairs ====================

/// Extract a `key value` pair for request-body attachment:
/// `with <key> <value>`, `<key>=<value>` or `<key>: <value>`.
pub fn extract_body_pair(line: &str) -> Option<(String, Literal)> {
    [&*WITH_PAIR_RE, &*ASSIGN_PAIR_RE].iter().find_map(|re| {
        re.captures_iter(line).find_map(|caps| {
            let key = caps.get(1)?.as_str();
            if BODY_FILLER_WORDS.contains(&key.to_lowercase().as_str()) {
                return None;
            }
            let key = sanitize_field(key)?;
            let value = Literal::coerce(caps.get(2)?.as_str());
            Some((key, value))
        })
    })
}
