//! Natural-language test instruction parser
//!
//! Turns free-form test instructions for HTTP APIs, accessibility checks and
//! security checks into ordered, typed actions.

pub mod action;
pub mod config;
pub mod feedback;
pub mod frontend;
pub mod matcher;
pub mod request;
pub mod security;
pub mod utils;

pub use action::{Action, ActionType, Domain, ExpectedValue, Literal, ParsedInstructionSet};
pub use config::ScoringConfig;
pub use feedback::ParseReport;
pub use frontend::parser::InstructionParser;
pub use request::ParseRequest;
pub use security::{validate_security_instruction, ClassificationResult, SecurityClassifier};
pub use utils::{Error, Result};
