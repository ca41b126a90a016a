//! Error types shared across the core library.
//!
//! Every capability call ends in a [`CapabilityError`] when it does not produce
//! a typed result. Callers at the UI boundary turn these into a single notice,
//! they never escape as panics.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// A single way in which a JSON value broke its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldViolation {
    NotAnObject,
    Missing { field: &'static str },
    WrongKind { field: &'static str, expected: &'static str },
    Malformed(String),
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldViolation::NotAnObject => write!(f, "expected a JSON object"),
            FieldViolation::Missing { field } => write!(f, "missing required field `{}`", field),
            FieldViolation::WrongKind { field, expected } => {
                write!(f, "field `{}` must be {}", field, expected)
            }
            FieldViolation::Malformed(detail) => write!(f, "{}", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{shape} failed validation: {}", format_violations(.violations))]
pub struct ValidationError {
    pub shape: &'static str,
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(shape: &'static str, violations: Vec<FieldViolation>) -> Self {
        Self { shape, violations }
    }

    pub fn malformed(shape: &'static str, detail: impl Into<String>) -> Self {
        Self::new(shape, vec![FieldViolation::Malformed(detail.into())])
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures raised by a generative model provider before its reply is checked
/// against the output schema.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("provider reply is not valid JSON: {0}")]
    MalformedReply(String),

    #[error("{0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Input broke the capability's input schema; the provider was never called.
    #[error("invalid capability input: {0}")]
    Validation(ValidationError),

    /// The provider answered but the answer broke the output schema.
    #[error("provider output violated its contract: {0}")]
    OutputValidation(ValidationError),

    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl CapabilityError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CapabilityError::Timeout(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown user `{0}`")]
    UnknownUser(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModerationError {
    #[error("no pending submission with id `{0}`")]
    UnknownSubmission(String),
}
