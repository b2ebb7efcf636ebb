//! Accessibility matcher table

use std::sync::LazyLock;

use super::{ActionMatcher, MatcherTable};
use crate::action::{ActionType, Domain};

pub(super) static TABLE: LazyLock<MatcherTable> = LazyLock::new(|| MatcherTable {
    domain: Domain::Accessibility,
    entries: vec![
        (
            ActionType::SendRequest,
            ActionMatcher::new(
                &["navigate", "open", "visit", "load", "go"],
                &["page", "url", "site", "screen"],
                &[
                    r"(?i)\b(?:navigate|go)\s+to\b",
                    r"(?i)\b(?:open|visit|load)\s+(?:the\s+)?(?:page|url|site)\b",
                ],
            ),
        ),
        (
            ActionType::ReadField,
            ActionMatcher::new(
                &["read", "get", "inspect"],
                &["aria-label", "alt", "label", "attribute", "role", "lang"],
                &[r"(?i)\baria-[a-z]+\b"],
            ),
        ),
        (
            ActionType::Count,
            ActionMatcher::new(
                &["count"],
                &["images", "headings", "links", "buttons", "landmarks", "violations", "elements"],
                &[
                    r"(?i)\bcount\b.*\b(?:images|headings|links|buttons|landmarks|violations)\b",
                    r"(?i)\bnumber\s+of\b",
                ],
            ),
        ),
        (
            ActionType::Verify,
            ActionMatcher::new(
                &["verify", "check", "ensure", "validate", "confirm", "assert"],
                &["contrast", "focus", "focusable", "keyboard", "accessible", "wcag", "screen reader"],
                &[
                    r"(?i)\bwcag\s*2(?:\.\d)?\b",
                    r"(?i)\b(?:has|have)\s+(?:an?\s+)?(?:alt|aria-label|label)\b",
                    r"(?i)\bcontrast\s+ratio\b",
                ],
            ),
        ),
        (
            ActionType::MeasureTime,
            ActionMatcher::new(
                &["measure"],
                &["time", "duration"],
                &[r"(?i)\b(?:page\s+)?load\s+time\b"],
            ),
        ),
        (
            ActionType::StoreResponse,
            ActionMatcher::new(
                &["capture", "save", "store"],
                &["snapshot", "screenshot", "tree"],
                &[r"(?i)\baccessibility\s+tree\b"],
            ),
        ),
    ],
});
