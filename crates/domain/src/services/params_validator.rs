//! Command parameter validation capability.
//!
//! Protocol-specific checks belong to device drivers. The HTTP layer asks a
//! [`ParamsValidator`] before enqueueing; the lifecycle engine never does.

use serde::Serialize;
use thiserror::Error;

/// A single rejected field in a command's parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure to run validation at all, as opposed to invalid parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsValidatorError {
    #[error("Unsupported device protocol: {0}")]
    UnsupportedProtocol(String),
}

/// Validates command parameters for a device protocol.
///
/// Returns the list of field violations; an empty list means the
/// parameters are acceptable.
pub trait ParamsValidator: Send + Sync {
    fn validate(
        &self,
        protocol: &str,
        name: &str,
        params: &serde_json::Value,
    ) -> Result<Vec<FieldViolation>, ParamsValidatorError>;
}

/// Protocol-agnostic validator: parameters must be a JSON object with
/// non-empty keys.
#[derive(Debug, Clone, Default)]
pub struct JsonParamsValidator {
    allowed_protocols: Vec<String>,
}

impl JsonParamsValidator {
    /// An empty list accepts any protocol.
    pub fn new(allowed_protocols: Vec<String>) -> Self {
        Self { allowed_protocols }
    }

    fn protocol_allowed(&self, protocol: &str) -> bool {
        self.allowed_protocols.is_empty()
            || self
                .allowed_protocols
                .iter()
                .any(|p| p.eq_ignore_ascii_case(protocol))
    }
}

impl ParamsValidator for JsonParamsValidator {
    fn validate(
        &self,
        protocol: &str,
        _name: &str,
        params: &serde_json::Value,
    ) -> Result<Vec<FieldViolation>, ParamsValidatorError> {
        if !self.protocol_allowed(protocol) {
            return Err(ParamsValidatorError::UnsupportedProtocol(
                protocol.to_string(),
            ));
        }

        let Some(object) = params.as_object() else {
            return Ok(vec![FieldViolation::new(
                "params",
                "Command parameters must be a JSON object",
            )]);
        };

        let mut violations: Vec<FieldViolation> = object
            .keys()
            .filter(|key| key.trim().is_empty())
            .map(|_| FieldViolation::new("params", "Parameter names cannot be empty"))
            .collect();
        collect_nul_violations("params", params, &mut violations);

        Ok(violations)
    }
}

/// Walks `value` and reports every key or string holding a NUL character,
/// which the command store cannot persist.
fn collect_nul_violations(path: &str, value: &serde_json::Value, out: &mut Vec<FieldViolation>) {
    const MESSAGE: &str = "Parameter text must not contain NUL characters";

    match value {
        serde_json::Value::String(text) if text.contains('\0') => {
            out.push(FieldViolation::new(path, MESSAGE));
        }
        serde_json::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_nul_violations(&format!("{path}[{index}]"), item, out);
            }
        }
        serde_json::Value::Object(map) => {
            for (key, item) in map {
                let child = format!("{path}.{key}");
                if key.contains('\0') {
                    out.push(FieldViolation::new(child.clone(), MESSAGE));
                }
                collect_nul_violations(&child, item, out);
            }
        }
        _ => {}
    }
}
