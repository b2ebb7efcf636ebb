//! Keyword-scored security intent classification

use log::debug;
use serde::Serialize;

use super::intent::{SecurityIntent, REGISTRY};
use crate::config::ScoringConfig;
use crate::frontend::normalize::normalize;

/// Classification of one instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub intent: &'static SecurityIntent,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub reasoning: String,
}

/// Raw score of one intent against one instruction
#[derive(Debug, Clone, PartialEq)]
pub struct IntentScore {
    pub intent: &'static SecurityIntent,
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub matched_context: Vec<String>,
}

/// Number of times `keyword` occurs in normalized text.
///
/// Single-word keywords match as a word prefix, so `inject` finds
/// `injection` but `put` does not find `input`. Anything with spaces or
/// punctuation is matched as a plain substring.
pub fn occurrences(normalized: &str, keyword: &str) -> usize {
    let is_word = keyword.chars().all(|c| c.is_alphanumeric() || c == '-');
    if !is_word {
        return normalized.matches(keyword).count();
    }
    normalized
        .split(' ')
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.starts_with(keyword))
        .count()
}

#[derive(Debug, Clone, Default)]
pub struct SecurityClassifier {
    config: ScoringConfig,
}

impl SecurityClassifier {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score every registered intent, in registry order
    pub fn score_all(&self, text: &str) -> Vec<IntentScore> {
        let normalized = normalize(text);
        REGISTRY
            .iter()
            .map(|intent| self.score_intent(intent, &normalized))
            .collect()
    }

    fn score_intent(&self, intent: &'static SecurityIntent, normalized: &str) -> IntentScore {
        let mut raw = 0.0;
        let mut matched_keywords = Vec::new();
        for keyword in intent.keywords {
            let hits = occurrences(normalized, keyword);
            if hits == 0 {
                continue;
            }
            raw += self.config.keyword_weight;
            if hits > 1 {
                raw += self.config.repeat_bonus;
            }
            matched_keywords.push(keyword.to_string());
        }

        let matched_context: Vec<String> = intent
            .context_words
            .iter()
            .filter(|w| occurrences(normalized, w) > 0)
            .map(|w| w.to_string())
            .collect();
        raw += self.config.context_bonus * matched_context.len() as f64;

        IntentScore {
            intent,
            score: raw / intent.keywords.len().max(1) as f64,
            matched_keywords,
            matched_context,
        }
    }

    /// Pick the highest-scoring intent. Ties go to the earlier registry
    /// entry; an instruction with no signal at all lands on the first one
    /// with zero confidence.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let scores = self.score_all(text);
        let mut best: Option<&IntentScore> = None;
        for candidate in &scores {
            match best {
                Some(b) if candidate.score <= b.score => {}
                _ => best = Some(candidate),
            }
        }

        let Some(best) = best else {
            return ClassificationResult {
                intent: &REGISTRY[0],
                confidence: 0.0,
                matched_keywords: Vec::new(),
                reasoning: "No security intents registered".to_string(),
            };
        };

        let confidence = best.score.clamp(0.0, 1.0);
        let reasoning = reasoning_for(best);
        debug!(
            "security: classified as {} ({:.2}) with keywords {:?}",
            best.intent.id, confidence, best.matched_keywords
        );

        ClassificationResult {
            intent: best.intent,
            confidence,
            matched_keywords: best.matched_keywords.clone(),
            reasoning,
        }
    }
}

fn reasoning_for(score: &IntentScore) -> String {
    let intent = score.intent;
    if score.matched_keywords.is_empty() && score.matched_context.is_empty() {
        return format!(
            "No security keywords matched; defaulting to {} ({})",
            intent.id, intent.intent_type
        );
    }

    let mut reasoning = format!(
        "Classified as {} ({}): matched {} of {} keyword(s) [{}]",
        intent.id,
        intent.intent_type,
        score.matched_keywords.len(),
        intent.keywords.len(),
        score.matched_keywords.join(", ")
    );
    if !score.matched_context.is_empty() {
        reasoning.push_str(&format!("; context [{}]", score.matched_context.join(", ")));
    }
    reasoning.push_str(&format!("; score {:.2}", score.score));
    reasoning
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::IntentId;
    use pretty_assertions::assert_eq;

    const INJECTION: &str = "attempt sql injection with ' or 1=1 -- and verify it is blocked";

    #[test]
    fn test_occurrences() {
        assert_eq!(occurrences("sql injection and more injected", "inject"), 2);
        assert_eq!(occurrences("send the input", "put"), 0);
        assert_eq!(occurrences("' or 1=1 --", "or 1=1"), 1);
        assert_eq!(occurrences("check x-frame-options", "x-frame-options"), 1);
    }

    #[test]
    fn test_sql_injection() {
        let classifier = SecurityClassifier::default();
        let result = classifier.classify(INJECTION);

        assert_eq!(result.intent.id, IntentId::SecInj);
        for keyword in ["inject", "sql", "or 1=1"] {
            assert!(result.matched_keywords.iter().any(|k| k == keyword), "missing {}", keyword);
        }
        for other in classifier.score_all(INJECTION) {
            if other.intent.id != IntentId::SecInj {
                assert!(result.confidence > other.score, "{} scored {}", other.intent.id, other.score);
            }
        }
        assert!(result.reasoning.contains("SEC_INJ"));
    }

    #[test]
    fn test_other_intents() {
        let classifier = SecurityClassifier::default();
        let cases = [
            ("login with an expired token and check for 401 unauthorized", IntentId::SecAuth),
            ("access another user's profile as a non-admin role, expect 403 forbidden", IntentId::SecAuthz),
            ("ensure the response does not leak sensitive pii such as ssn", IntentId::SecData),
            ("verify the hsts and x-frame-options header are present", IntentId::SecHeader),
            ("send a trace method request and expect 405", IntentId::SecMethod),
            ("send 100 requests per second and expect 429 too many requests", IntentId::SecRate),
        ];
        for (text, expected) in cases {
            assert_eq!(classifier.classify(text).intent.id, expected, "{}", text);
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = SecurityClassifier::default();
        let first = classifier.classify(INJECTION);
        for _ in 0..5 {
            assert_eq!(classifier.classify(INJECTION), first);
        }
    }

    #[test]
    fn test_authentication_prefix_skips_author_words() {
        let classifier = SecurityClassifier::default();
        let text = "verify the authorization header is set for the author";
        let auth = &classifier.score_all(text)[1];
        assert_eq!(auth.intent.id, IntentId::SecAuth);
        assert!(auth.matched_keywords.is_empty());
        assert_eq!(auth.score, 0.0);
        assert_eq!(classifier.classify(text).intent.id, IntentId::SecHeader);

        let result = classifier.classify("authenticate with a bad password");
        assert_eq!(result.intent.id, IntentId::SecAuth);
        assert!(result.matched_keywords.iter().any(|k| k == "authent"));
    }

    #[test]
    fn test_repeat_bonus() {
        let classifier = SecurityClassifier::default();
        let once = classifier.score_all("sql");
        let twice = classifier.score_all("sql then sql again");
        assert!(twice[0].score > once[0].score);
    }

    #[test]
    fn test_no_signal_defaults_to_first() {
        let result = SecurityClassifier::default().classify("open the page");
        assert_eq!(result.intent.id, IntentId::SecInj);
        assert_eq!(result.confidence, 0.0);
        assert!(result.matched_keywords.is_empty());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let config = ScoringConfig {
            keyword_weight: 50.0,
            ..ScoringConfig::default()
        };
        let result = SecurityClassifier::new(config).classify(INJECTION);
        assert_eq!(result.confidence, 1.0);
    }
}
