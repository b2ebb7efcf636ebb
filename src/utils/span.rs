//! Source location tracking

use serde::{Deserialize, Serialize};

/// A span locates one line inside an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// 1-based line number
    pub line: usize,
    /// Start byte offset in the instruction
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(line: usize, start: usize, end: usize) -> Self {
        Self { line, start, end }
    }
}
