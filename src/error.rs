//! # Hydrator Error Types
//!
//! Structured error handling for the receipt hydration pipeline using thiserror.
//! Only transport failures and backend-declared failures ever reach a caller;
//! everything else is recovered inside the hydrator.

use serde_json::Value;
use thiserror::Error;

/// Errors raised by the document store seam, configuration and hydration steps
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydratorError {
    #[error("Store transport error: {path}: {message}")]
    Transport { path: String, message: String },

    #[error("Permission denied reading {path}")]
    PermissionDenied { path: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unexpected payload shape for {field}: expected {expected}, found {found}")]
    UnexpectedShape {
        field: String,
        expected: String,
        found: String,
    },
}

impl HydratorError {
    /// Create a store transport error
    pub fn transport(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied { path: path.into() }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unexpected shape error, naming the JSON kind that was found
    pub fn unexpected_shape(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: &Value,
    ) -> Self {
        Self::UnexpectedShape {
            field: field.into(),
            expected: expected.into(),
            found: json_kind(found).to_string(),
        }
    }
}

impl From<config::ConfigError> for HydratorError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

/// Failure delivered to a subscriber's `on_error` callback
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiptFailure {
    /// The backend marked the receipt as failed; the payload is passed through verbatim
    Analysis(Value),
    /// The push subscription itself failed and is no longer active
    Subscription(HydratorError),
}

impl ReceiptFailure {
    /// The backend's error payload, when this is an analysis failure
    pub fn analysis_payload(&self) -> Option<&Value> {
        match self {
            Self::Analysis(payload) => Some(payload),
            Self::Subscription(_) => None,
        }
    }
}

impl std::fmt::Display for ReceiptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analysis(Value::String(message)) => write!(f, "Analysis failed: {message}"),
            Self::Analysis(payload) => write!(f, "Analysis failed: {payload}"),
            Self::Subscription(err) => write!(f, "Subscription failed: {err}"),
        }
    }
}

impl std::error::Error for ReceiptFailure {}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub type Result<T> = std::result::Result<T, HydratorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_errors_convert() {
        let err: HydratorError = config::ConfigError::NotFound("collection".to_string()).into();
        assert!(matches!(err, HydratorError::Configuration { .. }));
    }

    #[test]
    fn test_unexpected_shape_names_found_kind() {
        let err = HydratorError::unexpected_shape("analysis", "object", &json!([1, 2]));
        assert_eq!(
            err.to_string(),
            "Unexpected payload shape for analysis: expected object, found array"
        );
    }

    #[test]
    fn test_analysis_failure_keeps_payload() {
        let failure = ReceiptFailure::Analysis(json!("insufficient image quality"));
        assert_eq!(
            failure.analysis_payload(),
            Some(&json!("insufficient image quality"))
        );
        assert_eq!(
            failure.to_string(),
            "Analysis failed: insufficient image quality"
        );
    }
}
