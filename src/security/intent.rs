//! Security intent registry
//!
//! Seven fixed intents. Registry order is also the tie-break order.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentId {
    SecInj,
    SecAuth,
    SecAuthz,
    SecData,
    SecHeader,
    SecMethod,
    SecRate,
}

impl IntentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecInj => "SEC_INJ",
            Self::SecAuth => "SEC_AUTH",
            Self::SecAuthz => "SEC_AUTHZ",
            Self::SecData => "SEC_DATA",
            Self::SecHeader => "SEC_HEADER",
            Self::SecMethod => "SEC_METHOD",
            Self::SecRate => "SEC_RATE",
        }
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A security-testing category
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIntent {
    pub id: IntentId,
    #[serde(rename = "type")]
    pub intent_type: &'static str,
    pub keywords: &'static [&'static str],
    /// Words that raise confidence without identifying the intent
    #[serde(skip)]
    pub context_words: &'static [&'static str],
    /// Assertions a test of this intent should make at minimum
    pub min_assertions: &'static [&'static str],
}

pub static REGISTRY: [SecurityIntent; 7] = [
    SecurityIntent {
        id: IntentId::SecInj,
        intent_type: "injection",
        keywords: &[
            "inject", "sql", "xss", "or 1=1", "<script", "union select", "drop table", "payload",
            "malicious", "escape",
        ],
        context_words: &["prevent", "block", "reject", "fail", "error"],
        min_assertions: &[
            "status code is 400 or 422",
            "response body does not echo the payload",
            "no database error details are returned",
        ],
    },
    SecurityIntent {
        id: IntentId::SecAuth,
        intent_type: "authentication",
        keywords: &[
            "authent", "login", "password", "credential", "token", "session", "jwt", "unauthenticated",
        ],
        context_words: &["401", "unauthorized", "invalid", "expired", "deny"],
        min_assertions: &["status code is 401", "no session token is issued"],
    },
    SecurityIntent {
        id: IntentId::SecAuthz,
        intent_type: "authorization",
        keywords: &[
            "authoriz", "permission", "role", "admin", "privilege", "access control", "another user",
            "idor",
        ],
        context_words: &["403", "forbidden", "denied", "restrict", "escalat"],
        min_assertions: &["status code is 403", "resource of another user is not returned"],
    },
    SecurityIntent {
        id: IntentId::SecData,
        intent_type: "data_exposure",
        keywords: &[
            "sensitive", "pii", "ssn", "credit card", "exposure", "leak", "personal data",
            "stack trace",
        ],
        context_words: &["expose", "mask", "redact", "hidden", "plaintext"],
        min_assertions: &[
            "sensitive fields do not exist in the response",
            "error responses contain no stack trace",
        ],
    },
    SecurityIntent {
        id: IntentId::SecHeader,
        intent_type: "security_headers",
        keywords: &[
            "header", "cors", "csp", "content-security-policy", "x-frame-options", "hsts",
            "strict-transport-security", "x-content-type-options",
        ],
        context_words: &["present", "missing", "set", "configured", "strict"],
        min_assertions: &["security header exists", "header value matches the policy"],
    },
    SecurityIntent {
        id: IntentId::SecMethod,
        intent_type: "method_misuse",
        keywords: &["method", "options", "trace", "put", "delete", "patch", "http verb", "not allowed"],
        context_words: &["405", "disallow", "unsupported", "reject"],
        min_assertions: &["status code is 405", "resource is unchanged"],
    },
    SecurityIntent {
        id: IntentId::SecRate,
        intent_type: "rate_limiting",
        keywords: &["rate limit", "throttl", "too many requests", "429", "burst", "requests per"],
        context_words: &["exceed", "limit", "block", "retry-after"],
        min_assertions: &["status code is 429", "retry-after header exists"],
    },
];
