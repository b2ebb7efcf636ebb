//! Matcher library
//!
//! Each domain maps action types to three matcher families: verb keywords,
//! object keywords and compiled patterns. Tables are built once and are
//! read-only afterwards, so they are shared freely across threads.
//!
//! Table order is significant: the scorer breaks ties in favour of the
//! entry registered first.

mod accessibility;
mod api;
mod security;
pub mod scorer;

use regex::Regex;

use crate::action::{ActionType, Domain};

pub use scorer::{ClassificationCandidate, ConfidenceScorer};

/// Matchers for one action type
#[derive(Debug)]
pub struct ActionMatcher {
    pub verbs: &'static [&'static str],
    pub objects: &'static [&'static str],
    pub patterns: Vec<Regex>,
}

impl ActionMatcher {
    pub fn new(verbs: &'static [&'static str], objects: &'static [&'static str], patterns: &[&str]) -> Self {
        Self {
            verbs,
            objects,
            patterns: patterns.iter().map(|p| Regex::new(p).unwrap()).collect(),
        }
    }
}

/// Ordered action-type matchers for one domain
#[derive(Debug)]
pub struct MatcherTable {
    pub domain: Domain,
    pub entries: Vec<(ActionType, ActionMatcher)>,
}

/// The static table for a domain
pub fn table_for(domain: Domain) -> &'static MatcherTable {
    match domain {
        Domain::Accessibility => &*accessibility::TABLE,
        Domain::Api => &*api::TABLE,
        Domain::Security => &*security::TABLE,
    }
}
