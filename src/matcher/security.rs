//! Security-testing matcher table

use std::sync::LazyLock;

use super::{ActionMatcher, MatcherTable};
use crate::action::{ActionType, Domain};

pub(super) static TABLE: LazyLock<MatcherTable> = LazyLock::new(|| MatcherTable {
    domain: Domain::Security,
    entries: vec![
        (
            ActionType::SendChainedRequest,
            ActionMatcher::new(
                &["send", "make", "execute", "replay"],
                &["stored", "saved", "previous", "stolen"],
                &[
                    r"(?i)\b(?:send|make|execute|replay)\b.*\b(?:get|post|put|patch|delete)\b.*\b(?:stored|saved|previous)\b",
                    r"(?i)\busing\s+(?:the\s+)?(?:stored|saved|previous|stolen)\s+\w+",
                ],
            ),
        ),
        (
            ActionType::SendRequest,
            ActionMatcher::new(
                &["send", "make", "execute", "attempt", "submit", "call"],
                &["request", "endpoint"],
                &[r"(?i)\b(?:send|make|execute|attempt)\b.*\b(?:GET|POST|PUT|PATCH|DELETE|OPTIONS|TRACE)\b"],
            ),
        ),
        (
            ActionType::AttachBody,
            ActionMatcher::new(
                &["attach", "include", "inject", "submit"],
                &["payload", "body", "input"],
                &[
                    r"(?i)\b(?:attach|include|inject)\b.*\b(?:payload|body)\b",
                    r"(?i)(?:'\s*or\s+1\s*=\s*1|<script|union\s+select|drop\s+table)",
                ],
            ),
        ),
        (
            ActionType::StoreResponse,
            ActionMatcher::new(
                &["store", "save", "capture"],
                &["token", "session", "cookie"],
                &[r"(?i)\b(?:store|save|capture)\b.*\b(?:token|cookie|session)\b"],
            ),
        ),
        (
            ActionType::Verify,
            ActionMatcher::new(
                &["verify", "check", "ensure", "validate", "confirm", "assert"],
                &["blocked", "rejected", "denied", "forbidden", "unauthorized", "status", "error", "sanitized", "header"],
                &[
                    r"(?i)\b(?:40[0135]|429)\b",
                    r"(?i)\b(?:is|are|be|gets?)\s+(?:blocked|rejected|denied|prevented)\b",
                ],
            ),
        ),
        (
            ActionType::MeasureTime,
            ActionMatcher::new(&["measure"], &["latency", "duration"], &[r"(?i)\bresponse\s+time\b"]),
        ),
        (
            ActionType::Count,
            ActionMatcher::new(
                &["count"],
                &["attempts", "requests", "failures"],
                &[r"(?i)\b\d+\s+(?:times|attempts|requests)\b"],
            ),
        ),
    ],
});
