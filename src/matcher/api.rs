//! HTTP API matcher table

use std::sync::LazyLock;

use super::{ActionMatcher, MatcherTable};
use crate::action::{ActionType, Domain};

pub(super) static TABLE: LazyLock<MatcherTable> = LazyLock::new(|| MatcherTable {
    domain: Domain::Api,
    entries: vec![
        // Registered ahead of SendRequest: a chained send matches both and
        // must win the tie.
        (
            ActionType::SendChainedRequest,
            ActionMatcher::new(
                &["send", "make", "execute", "call"],
                &["stored", "saved", "previous", "chained"],
                &[
                    r"(?i)\b(?:send|make|execute)\b.*\b(?:get|post|put|patch|delete)\b.*\b(?:stored|saved|previous)\b",
                    r"(?i)\busing\s+(?:the\s+)?(?:stored|saved|previous)\s+\w+",
                ],
            ),
        ),
        (
            ActionType::SendRequest,
            ActionMatcher::new(
                &["send", "make", "execute", "call", "hit"],
                &["request", "endpoint", "api"],
                &[r"(?i)\b(?:send|make|execute)\b.*\b(?:GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)\b"],
            ),
        ),
        (
            ActionType::StoreResponse,
            ActionMatcher::new(
                &["store", "save", "capture", "remember", "keep"],
                &["variable", "id", "token"],
                &[
                    r"(?i)\b(?:store|save|capture)\b.*\bas\s+\w+",
                    r"(?i)\b(?:store|save|capture)\b.*\b(?:from|in)\s+(?:the\s+)?response\b",
                ],
            ),
        ),
        // Ahead of ReadField: "check the X field" is a verification.
        (
            ActionType::Verify,
            ActionMatcher::new(
                &["verify", "check", "ensure", "assert", "validate", "confirm", "expect"],
                &["status", "code", "equals", "contains", "present", "exists", "matches", "header"],
                &[
                    r"(?i)\bstatus\s*code\b.*\b\d{3}\b",
                    r"(?i)\b(?:equals?|should\s+be|is\s+equal\s+to|contains?)\b",
                ],
            ),
        ),
        (
            ActionType::ReadField,
            ActionMatcher::new(
                &["read", "get", "retrieve", "fetch", "extract", "parse"],
                &["field", "property", "attribute", "value", "key"],
                &[r"(?i)\b(?:read|retrieve|extract|get)\s+(?:the\s+)?[\w.-]+\s+(?:field|property|value|attribute)\b"],
            ),
        ),
        (
            ActionType::Count,
            ActionMatcher::new(
                &["count"],
                &["items", "number", "elements", "entries", "length", "total", "records"],
                &[
                    r"(?i)\bcount\b.*\b(?:items|elements|entries|records|results)\b",
                    r"(?i)\b(?:number|length)\s+of\b",
                ],
            ),
        ),
        (
            ActionType::MeasureTime,
            ActionMatcher::new(
                &["measure", "track", "benchmark"],
                &["time", "duration", "latency", "ms", "milliseconds", "seconds"],
                &[
                    r"(?i)\bresponse\s+time\b",
                    r"(?i)\b(?:under|within|less\s+than|below)\s+\d+\s*(?:ms|milliseconds|s|seconds)\b",
                ],
            ),
        ),
        (
            ActionType::AttachBody,
            ActionMatcher::new(
                &["attach", "include", "add", "set", "provide"],
                &["body", "payload", "json"],
                &[
                    r"(?i)\b(?:attach|include|add)\b.*\b(?:body|payload)\b",
                    r"(?i)\bwith\s+[A-Za-z_][\w.-]*\s*[=:]?\s*\S+",
                ],
            ),
        ),
    ],
});
