//! Line splitting for instructions
//!
//! Converts an instruction into non-empty source lines, each with its
//! normalized text and a span back into the original string.

use crate::frontend::normalize::normalize;
use crate::utils::Span;

/// Prefix marking a line as a note for whoever maintains the test corpus
pub const TRAINING_MARKER: &str = "[training]";

/// Phrases that mark a training-note line anywhere in the line
const TRAINING_PHRASES: &[&str] = &["this test trains", "training note", "trains the model"];

/// A single instruction line
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLine {
    /// Raw text, trimmed
    pub text: String,
    /// Normalized text
    pub normalized: String,
    pub span: Span,
}

impl SourceLine {
    pub fn new(text: &str, span: Span) -> Self {
        let text = text.trim();
        Self {
            text: text.to_string(),
            normalized: normalize(text),
            span,
        }
    }

    pub fn number(&self) -> usize {
        self.span.line
    }

    pub fn is_training_note(&self) -> bool {
        is_training_note(&self.text)
    }

    /// `#` and `//` lines are author comments
    pub fn is_comment(&self) -> bool {
        self.text.starts_with('#') || self.text.starts_with("//")
    }
}

pub fn is_training_note(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.to_lowercase().starts_with(TRAINING_MARKER) {
        return true;
    }
    let normalized = normalize(trimmed);
    TRAINING_PHRASES.iter().any(|p| normalized.contains(p))
}

/// Split an instruction into its non-blank lines
pub fn split_lines(instruction: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    let mut offset = 0;

    for (idx, raw) in instruction.split('\n').enumerate() {
        let line_start = offset;
        offset += raw.len() + 1;

        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        let start = line_start + (raw.len() - raw.trim_start().len());
        lines.push(SourceLine::new(text, Span::new(idx + 1, start, start + text.len())));
    }
    lines
}
