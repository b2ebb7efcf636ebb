//! Error handling for the request and configuration layers
//!
//! The parsing core never returns these: uncertainty there is expressed as
//! confidence scores and skipped lines.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised before or around a parse call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Request Errors ====================

    #[error("Instruction is empty")]
    EmptyInstruction,

    #[error("Instruction too short: {len} characters, minimum is {min}")]
    InstructionTooShort { len: usize, min: usize },

    #[error("Instruction too long: {len} characters, maximum is {max}")]
    InstructionTooLong { len: usize, max: usize },

    #[error("Target URL is empty")]
    EmptyUrl,

    #[error("Invalid target URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    // ==================== Environment Errors ====================

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Stable error code for machine-readable reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyInstruction => "E0001",
            Self::InstructionTooShort { .. } => "E0002",
            Self::InstructionTooLong { .. } => "E0003",
            Self::EmptyUrl => "E0004",
            Self::InvalidUrl { .. } => "E0005",
            Self::UnsupportedMethod(_) => "E0006",
            Self::UnknownDomain(_) => "E0007",
            Self::Config(_) => "E0100",
            Self::Io(_) => "E0200",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        let err = Error::InstructionTooShort { len: 4, min: 10 };
        assert_eq!(err.to_string(), "Instruction too short: 4 characters, minimum is 10");
        assert_eq!(err.code(), "E0002");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(ref msg) if msg.contains("missing")));
    }
}
