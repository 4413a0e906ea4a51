//! Required-field check for parsed configs

use crate::constants::{MISSING_FIELDS_MESSAGE, REQUIRED_FIELDS};
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// A parsed mapping that passed [`validate_fields`]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFields(Map<String, Value>);

impl ValidatedFields {
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Object-literal truthiness: `""`, `0`, `false` and `null` are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Check that every required field holds a truthy scalar
///
/// Returns the mapping unchanged on success. All five fields are checked,
/// and the error lists each one that is missing or falsy.
pub fn validate_fields(fields: Map<String, Value>) -> Result<ValidatedFields> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !fields.get(*field).is_some_and(is_truthy))
        .collect();

    if !missing.is_empty() {
        debug!(?missing, "Config is missing required fields");
        return Err(Error::Validation {
            message: MISSING_FIELDS_MESSAGE.to_string(),
            fields: missing,
        });
    }

    if let Some(field) = REQUIRED_FIELDS
        .iter()
        .copied()
        .find(|field| matches!(fields.get(*field), Some(Value::Array(_) | Value::Object(_))))
    {
        return Err(Error::Validation {
            message: format!("The field {field} must be a string."),
            fields: vec![field],
        });
    }

    Ok(ValidatedFields(fields))
}
