//! Input messages
//!
//! An `InputMessage` is the structured record the pipeline engine hands to
//! the stage. Its shape is only partially known: the identity fields, the
//! cluster name and the timestamp are required, everything else is optional
//! metadata. The stage only ever borrows it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::error::FieldError;

const ORG_ID_PATH: [&str; 4] = ["identity", "identity", "internal", "org_id"];
const ACCOUNT_NUMBER_PATH: [&str; 3] = ["identity", "identity", "account_number"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputMessage(Value);

impl InputMessage {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Top-level field lookup. Non-object messages have no fields.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|fields| fields.get(key))
    }

    pub fn org_id(&self) -> Result<i64, FieldError> {
        lookup(&self.0, &ORG_ID_PATH).and_then(|value| coerce_int(value, "org_id"))
    }

    pub fn account_number(&self) -> Result<i64, FieldError> {
        lookup(&self.0, &ACCOUNT_NUMBER_PATH)
            .and_then(|value| coerce_int(value, "account_number"))
    }

    /// The org id as it appears in the message, without coercion.
    pub fn raw_org_id(&self) -> Option<&Value> {
        lookup(&self.0, &ORG_ID_PATH).ok()
    }

    pub fn cluster_name(&self) -> Option<&Value> {
        self.get("cluster_name")
    }

    pub fn timestamp(&self) -> Option<&Value> {
        self.get("timestamp")
    }

    pub fn request_id(&self) -> Option<&Value> {
        self.get("request_id")
    }

    pub fn topic(&self) -> Option<&Value> {
        self.get("topic")
    }

    pub fn partition(&self) -> Option<&Value> {
        self.get("partition")
    }

    pub fn offset(&self) -> Option<&Value> {
        self.get("offset")
    }

    /// Render an optional field for log lines: strings unquoted, absent as `-`.
    pub fn display_field(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => "-".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl From<Value> for InputMessage {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Name of a JSON value's type, used in error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lookup<'a>(root: &'a Value, path: &[&'static str]) -> Result<&'a Value, FieldError> {
    let mut current = root;
    let mut parent = "message";
    for &key in path {
        let fields = current.as_object().ok_or(FieldError::WrongType {
            key: parent,
            found: kind(current),
        })?;
        current = fields.get(key).ok_or(FieldError::MissingKey(key))?;
        parent = key;
    }
    Ok(current)
}

/// Integer coercion for identity fields.
///
/// Integers pass through, finite floats are truncated toward zero and
/// strings are trimmed and parsed as base-10. Anything else is rejected,
/// booleans included: they are not read as `0`/`1`.
fn coerce_int(value: &Value, key: &'static str) -> Result<i64, FieldError> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(int);
            }
            match number.as_f64() {
                Some(float)
                    if float.is_finite()
                        && float >= i64::MIN as f64
                        && float < i64::MAX as f64 =>
                {
                    Ok(float.trunc() as i64)
                }
                _ => Err(FieldError::OutOfRange(number.to_string())),
            }
        }
        Value::String(text) => {
            text.trim()
                .parse::<i64>()
                .map_err(|source| FieldError::NotNumeric {
                    value: text.clone(),
                    source,
                })
        }
        other => Err(FieldError::WrongType {
            key,
            found: kind(other),
        }),
    }
}
