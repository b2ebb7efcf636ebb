//! Security domain: intent registry, classifier, instruction validator

pub mod classifier;
pub mod intent;
pub mod validator;

pub use classifier::{ClassificationResult, IntentScore, SecurityClassifier};
pub use intent::{IntentId, SecurityIntent, REGISTRY};
pub use validator::{validate_security_instruction, SecurityValidation};
