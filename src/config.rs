//! Scoring configuration
//!
//! Every weight and threshold used by the action scorer and the security
//! classifier. Defaults reproduce the stock behaviour; a JSON file may
//! override any subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight per matched verb keyword
    pub verb_weight: f64,
    /// Weight per matched object keyword
    pub object_weight: f64,
    /// Weight per matched compiled pattern
    pub pattern_weight: f64,
    /// Scores below this fall back to a generic verify action
    pub min_confidence: f64,
    /// Confidence attached to fallback actions
    pub fallback_confidence: f64,
    /// Security: weight per matched intent keyword
    pub keyword_weight: f64,
    /// Security: bonus when a keyword occurs more than once
    pub repeat_bonus: f64,
    /// Security: bonus per matched contextual word
    pub context_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            verb_weight: 0.3,
            object_weight: 0.3,
            pattern_weight: 0.4,
            min_confidence: 0.3,
            fallback_confidence: 0.2,
            keyword_weight: 1.0,
            repeat_bonus: 0.5,
            context_bonus: 0.3,
        }
    }
}

impl ScoringConfig {
    /// Parse a (possibly partial) JSON override
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON override from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject weights that would break the `[0, 1]` confidence contract
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("verb_weight", self.verb_weight),
            ("object_weight", self.object_weight),
            ("pattern_weight", self.pattern_weight),
            ("keyword_weight", self.keyword_weight),
            ("repeat_bonus", self.repeat_bonus),
            ("context_bonus", self.context_bonus),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("{} must be a non-negative number, got {}", name, value)));
            }
        }

        let thresholds = [
            ("min_confidence", self.min_confidence),
            ("fallback_confidence", self.fallback_confidence),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }
        Ok(())
    }
}
