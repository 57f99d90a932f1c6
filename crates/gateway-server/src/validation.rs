//! Request validation helpers.

use serde_json::Value;

use crate::error::ApiError;

/// Check that every field is present and not `null`
///
/// # Errors
/// Returns 400 `Missing required fields: a, b` listing fields in the given order
pub fn validate_required_fields(body: &Value, fields: &[&str]) -> Result<(), ApiError> {
    check_fields(body, fields, Value::is_null)
}

/// Like [`validate_required_fields`], but empty values count as missing too
///
/// Empty strings, arrays and objects, numeric zero and `false` are rejected.
///
/// # Errors
/// Returns 400 `Missing required fields: a, b` listing fields in the given order
pub fn validate_non_empty_fields(body: &Value, fields: &[&str]) -> Result<(), ApiError> {
    check_fields(body, fields, is_empty)
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn check_fields(body: &Value, fields: &[&str], rejected: fn(&Value) -> bool) -> Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|field| body.get(field).map_or(true, rejected))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Non-empty string field
pub(crate) fn str_field<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Count field given as a number or a numeric string
pub(crate) fn count_field(body: &Value, field: &str) -> Result<Option<u32>, ApiError> {
    let invalid = || ApiError::bad_request(format!("'{field}' must be a positive integer"));

    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}
