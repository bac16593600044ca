//! Decoding of stored room field values.
//!
//! Each hash field value is a JSON object produced by the upstream mapping
//! pipeline, e.g. `{"id": 101, "supplier": "acme", ...}`. Only `id` matters
//! here; every other attribute is ignored.

use serde_json::Value;
use thiserror::Error;

/// Reasons a stored field value yields no room id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("value is not valid JSON: {message}")]
    InvalidJson { message: String },

    #[error("value is not a JSON object")]
    NotAnObject,

    #[error("missing 'id' field")]
    MissingId,

    #[error("'id' field is not a number")]
    NonNumericId,

    #[error("'id' field is out of range")]
    OutOfRange,

    #[error("'id' field is zero")]
    ZeroId,
}

/// Decodes a stored blob into a room id, or `None` when it carries no usable id.
pub fn decode_room_id(blob: &str) -> Option<i64> {
    try_decode_room_id(blob).ok()
}

/// Decodes a stored blob into a room id, reporting why decoding failed.
///
/// Integral numbers are taken as-is. Fractional numbers are truncated toward
/// zero, which matches how the producer's float-typed ids have always been
/// read. Zero is never a valid id.
pub fn try_decode_room_id(blob: &str) -> Result<i64, DecodeError> {
    let value: Value = serde_json::from_str(blob).map_err(|e| DecodeError::InvalidJson {
        message: e.to_string(),
    })?;

    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;
    let id = object.get("id").ok_or(DecodeError::MissingId)?;
    let Value::Number(number) = id else {
        return Err(DecodeError::NonNumericId);
    };

    let id = if let Some(i) = number.as_i64() {
        i
    } else if number.is_u64() {
        return Err(DecodeError::OutOfRange);
    } else {
        let f = number.as_f64().ok_or(DecodeError::NonNumericId)?;
        let truncated = f.trunc();
        if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
            return Err(DecodeError::OutOfRange);
        }
        truncated as i64
    };

    if id == 0 {
        return Err(DecodeError::ZeroId);
    }
    Ok(id)
}
