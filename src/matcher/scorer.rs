//! Confidence scorer
//!
//! `score = verb_weight * verbs + object_weight * objects + pattern_weight * patterns`,
//! clamped to `[0, 1]`. Keywords are matched as whole words against the
//! normalized line; patterns run against the raw, case-preserved line.

use serde::Serialize;

use super::{ActionMatcher, MatcherTable};
use crate::action::ActionType;
use crate::config::ScoringConfig;
use crate::frontend::normalize::contains_word;

/// Score of one action type against one line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationCandidate {
    pub action_type: ActionType,
    /// Confidence (0.0 - 1.0)
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    config: ScoringConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a single matcher
    pub fn score(
        &self,
        action_type: ActionType,
        matcher: &ActionMatcher,
        line: &str,
        normalized: &str,
    ) -> ClassificationCandidate {
        let mut matched_keywords = Vec::new();

        let verbs: Vec<&str> = matcher.verbs.iter().copied().filter(|v| contains_word(normalized, v)).collect();
        let objects: Vec<&str> = matcher.objects.iter().copied().filter(|o| contains_word(normalized, o)).collect();
        matched_keywords.extend(verbs.iter().map(|v| v.to_string()));
        matched_keywords.extend(objects.iter().map(|o| o.to_string()));

        let mut pattern_hits = 0usize;
        for pattern in &matcher.patterns {
            if let Some(m) = pattern.find(line) {
                pattern_hits += 1;
                matched_keywords.push(m.as_str().trim().to_string());
            }
        }

        let raw = self.config.verb_weight * verbs.len() as f64
            + self.config.object_weight * objects.len() as f64
            + self.config.pattern_weight * pattern_hits as f64;

        ClassificationCandidate {
            action_type,
            confidence: raw.clamp(0.0, 1.0),
            matched_keywords,
        }
    }

    /// Score every entry in the table, best first. The sort is stable, so
    /// equal scores keep table order.
    pub fn rank(&self, table: &MatcherTable, line: &str, normalized: &str) -> Vec<ClassificationCandidate> {
        let mut candidates: Vec<ClassificationCandidate> = table
            .entries
            .iter()
            .map(|(action_type, matcher)| self.score(*action_type, matcher, line, normalized))
            .collect();

        candidates.sort_by(|a, b| {
            b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates
    }

    /// Highest-scoring candidate, or `None` when it falls below the
    /// minimum confidence
    pub fn best(&self, table: &MatcherTable, line: &str, normalized: &str) -> Option<ClassificationCandidate> {
        self.rank(table, line, normalized)
            .into_iter()
            .next()
            .filter(|c| c.confidence >= self.config.min_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Domain;
    use crate::frontend::normalize::normalize;
    use crate::matcher::table_for;

    fn best(domain: Domain, line: &str) -> Option<ClassificationCandidate> {
        ConfidenceScorer::default().best(table_for(domain), line, &normalize(line))
    }

    #[test]
    fn test_score_formula() {
        let matcher = ActionMatcher::new(&["send"], &["request"], &[r"(?i)\bGET\b"]);
        let scorer = ConfidenceScorer::default();
        let line = "send a GET request";
        let c = scorer.score(ActionType::SendRequest, &matcher, line, &normalize(line));
        assert!((c.confidence - 1.0).abs() < 1e-9);
        assert_eq!(c.matched_keywords, vec!["send", "request", "GET"]);

        let c = scorer.score(ActionType::SendRequest, &matcher, "send it", "send it");
        assert!((c.confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_clamped() {
        let matcher = ActionMatcher::new(&["a", "b", "c", "d"], &["e"], &[]);
        let c = ConfidenceScorer::default().score(ActionType::Verify, &matcher, "a b c d e", "a b c d e");
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn test_patterns_see_raw_case() {
        let matcher = ActionMatcher::new(&[], &[], &[r"\bGET\b"]);
        let scorer = ConfidenceScorer::default();
        let c = scorer.score(ActionType::SendRequest, &matcher, "send GET", "send get");
        assert!((c.confidence - 0.4).abs() < 1e-9);
        let c = scorer.score(ActionType::SendRequest, &matcher, "send get", "send get");
        assert_eq!(c.confidence, 0.0);
    }

    #[test]
    fn test_ties_go_to_first_registered() {
        // Both chained and plain sends saturate at 1.0 here; the chained
        // entry is registered first.
        let line = "send a GET request using the stored id";
        let ranked = ConfidenceScorer::default().rank(table_for(Domain::Api), line, &normalize(line));
        assert_eq!(ranked[0].confidence, ranked[1].confidence);
        assert_eq!(ranked[0].action_type, ActionType::SendChainedRequest);
        assert_eq!(ranked[1].action_type, ActionType::SendRequest);

        // Deterministic across calls
        for _ in 0..5 {
            assert_eq!(best(Domain::Api, line).unwrap().action_type, ActionType::SendChainedRequest);
        }
    }

    #[test]
    fn test_equal_scores_keep_table_order() {
        let table = MatcherTable {
            domain: Domain::Api,
            entries: vec![
                (ActionType::Count, ActionMatcher::new(&["tally"], &[], &[])),
                (ActionType::Verify, ActionMatcher::new(&["tally"], &[], &[])),
            ],
        };
        let winner = ConfidenceScorer::default().best(&table, "tally", "tally").unwrap();
        assert_eq!(winner.action_type, ActionType::Count);
    }

    #[test]
    fn test_api_lines() {
        assert_eq!(best(Domain::Api, "Send a POST request to create a post").unwrap().action_type, ActionType::SendRequest);
        assert_eq!(best(Domain::Api, "Store the id from the response").unwrap().action_type, ActionType::StoreResponse);
        assert_eq!(best(Domain::Api, "attach request body with age 42").unwrap().action_type, ActionType::AttachBody);
        assert_eq!(best(Domain::Api, "Verify the status code is 201").unwrap().action_type, ActionType::Verify);
        assert_eq!(best(Domain::Api, "Count the items in the response").unwrap().action_type, ActionType::Count);
        assert_eq!(best(Domain::Api, "Check the response time is under 500ms").unwrap().action_type, ActionType::MeasureTime);
        assert_eq!(best(Domain::Api, "Read the userId field from the response").unwrap().action_type, ActionType::ReadField);
    }

    #[test]
    fn test_method_nouns_and_response_mentions_do_not_steal_lines() {
        let cases = [
            ("Verify the post was created", ActionType::Verify),
            ("Check the author field of the response", ActionType::Verify),
            ("Read the data of response", ActionType::ReadField),
            ("Ensure the deleted record is gone", ActionType::Verify),
        ];
        for (line, expected) in cases {
            assert_eq!(best(Domain::Api, line).unwrap().action_type, expected, "{}", line);
        }
        let line = "Confirm the put response is blocked";
        assert_eq!(best(Domain::Security, line).unwrap().action_type, ActionType::Verify);
    }

    #[test]
    fn test_below_threshold_is_none() {
        assert_eq!(best(Domain::Api, "the sky is blue today"), None);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let strict = ConfidenceScorer::new(ScoringConfig { min_confidence: 0.9, ..ScoringConfig::default() });
        let line = "check it";
        assert!(ConfidenceScorer::default().best(table_for(Domain::Api), line, line).is_some());
        assert!(strict.best(table_for(Domain::Api), line, line).is_none());
    }

    #[test]
    fn test_accessibility_lines() {
        assert_eq!(best(Domain::Accessibility, "Navigate to the home page").unwrap().action_type, ActionType::SendRequest);
        assert_eq!(best(Domain::Accessibility, "Count the images without alt text").unwrap().action_type, ActionType::Count);
        assert_eq!(best(Domain::Accessibility, "Verify the contrast ratio meets WCAG 2.1").unwrap().action_type, ActionType::Verify);
    }
}
