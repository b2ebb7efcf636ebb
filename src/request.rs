//! Caller-level parse requests
//!
//! The parser itself accepts any text; these checks belong to whoever
//! hands it input (the CLI and batch mode).

use serde::{Deserialize, Serialize};
use url::Url;

use crate::action::Domain;
use crate::utils::{Error, Result};

pub const MIN_INSTRUCTION_LEN: usize = 10;
pub const MAX_INSTRUCTION_LEN: usize = 1000;

pub const SUPPORTED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

fn default_domain() -> Domain {
    Domain::Api
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub instruction: String,
    pub target_url: String,
    #[serde(default)]
    pub method_hint: Option<String>,
    #[serde(default = "default_domain")]
    pub domain: Domain,
}

impl ParseRequest {
    pub fn new(instruction: impl Into<String>, target_url: impl Into<String>, domain: Domain) -> Self {
        Self {
            instruction: instruction.into(),
            target_url: target_url.into(),
            method_hint: None,
            domain,
        }
    }

    pub fn with_method_hint(mut self, method: impl Into<String>) -> Self {
        self.method_hint = Some(method.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        let instruction = self.instruction.trim();
        if instruction.is_empty() {
            return Err(Error::EmptyInstruction);
        }
        let len = instruction.chars().count();
        if len < MIN_INSTRUCTION_LEN {
            return Err(Error::InstructionTooShort { len, min: MIN_INSTRUCTION_LEN });
        }
        if len > MAX_INSTRUCTION_LEN {
            return Err(Error::InstructionTooLong { len, max: MAX_INSTRUCTION_LEN });
        }

        validate_url(&self.target_url)?;

        if let Some(method) = &self.method_hint {
            let upper = method.trim().to_uppercase();
            if !SUPPORTED_METHODS.contains(&upper.as_str()) {
                return Err(Error::UnsupportedMethod(method.clone()));
            }
        }
        Ok(())
    }
}

fn validate_url(raw: &str) -> Result<()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::EmptyUrl);
    }
    let invalid = |reason: String| Error::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}
