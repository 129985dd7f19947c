//! JSON wire format for `Value`
//!
//! Plain JSON covers most kinds. The rest travel as single-key tagged
//! objects:
//! - `{"$integer": b64}` - Int64, 8 bytes little-endian
//! - `{"$float": b64}`   - Float64 that JSON cannot carry (NaN, infinities)
//! - `{"$bytes": b64}`   - Bytes
//! - `{"$id": "table:id"}` - Id
//!
//! A plain JSON number decodes to Int64 when it is an integer in range and
//! to Float64 when it is not an integer. Integers past `i64::MAX` are
//! rejected rather than rounded. Finite floats encode as float-typed JSON numbers
//! (`3.0`), so the kind survives a round trip.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value as JsonValue};

use super::{DocumentId, Value, ValueMap};

/// Nesting bound applied when decoding JSON input
pub const DEFAULT_DECODE_DEPTH: usize = 64;

/// JSON input that does not describe a `Value`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid '{tag}' payload: {reason}")]
    InvalidTag { tag: &'static str, reason: String },

    #[error("value nesting exceeds depth limit of {0}")]
    TooDeep(usize),

    #[error("integer {0} is out of int64 range")]
    IntegerOutOfRange(String),
}

impl Value {
    /// Decodes a JSON value using the default nesting bound.
    pub fn from_json(json: &JsonValue) -> Result<Value, DecodeError> {
        Self::from_json_with_depth(json, DEFAULT_DECODE_DEPTH)
    }

    /// Decodes a JSON value, failing once nesting exceeds `max_depth`.
    pub fn from_json_with_depth(json: &JsonValue, max_depth: usize) -> Result<Value, DecodeError> {
        decode(json, 0, max_depth)
    }

    /// Encodes this value in the wire format.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Int64(n) => JsonValue::Number((*n).into()),
            Value::Float64(f) => encode_float(*f),
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Bytes(bytes) => tagged("$bytes", JsonValue::String(STANDARD.encode(bytes))),
            Value::Id(id) => tagged("$id", JsonValue::String(id.to_string())),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

pub(crate) fn encode_float(f: f64) -> JsonValue {
    match Number::from_f64(f) {
        Some(n) => JsonValue::Number(n),
        None => tagged("$float", JsonValue::String(STANDARD.encode(f.to_le_bytes()))),
    }
}

pub(crate) fn tagged(tag: &str, payload: JsonValue) -> JsonValue {
    let mut map = Map::new();
    map.insert(tag.to_string(), payload);
    JsonValue::Object(map)
}

fn decode(json: &JsonValue, depth: usize, max_depth: usize) -> Result<Value, DecodeError> {
    if depth > max_depth {
        return Err(DecodeError::TooDeep(max_depth));
    }

    let value = match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None if n.is_u64() => return Err(DecodeError::IntegerOutOfRange(n.to_string())),
            // as_f64 is always Some without arbitrary_precision
            None => Value::Float64(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| decode(item, depth + 1, max_depth))
                .collect::<Result<_, _>>()?,
        ),
        JsonValue::Object(map) => {
            if let Some(value) = decode_tagged(map)? {
                return Ok(value);
            }
            let mut fields = ValueMap::with_capacity(map.len());
            for (key, item) in map {
                fields.insert(key.clone(), decode(item, depth + 1, max_depth)?);
            }
            Value::Object(fields)
        }
    };

    Ok(value)
}

fn decode_tagged(map: &Map<String, JsonValue>) -> Result<Option<Value>, DecodeError> {
    if map.len() != 1 {
        return Ok(None);
    }
    let Some((tag, payload)) = map.iter().next() else {
        return Ok(None);
    };

    let value = match tag.as_str() {
        "$integer" => {
            let bytes = fixed_bytes("$integer", payload)?;
            Value::Int64(i64::from_le_bytes(bytes))
        }
        "$float" => {
            let bytes = fixed_bytes("$float", payload)?;
            Value::Float64(f64::from_le_bytes(bytes))
        }
        "$bytes" => Value::Bytes(base64_payload("$bytes", payload)?),
        "$id" => {
            let text = payload.as_str().ok_or_else(|| DecodeError::InvalidTag {
                tag: "$id",
                reason: "expected a string".into(),
            })?;
            let id: DocumentId = text.parse().map_err(|e: super::IdParseError| {
                DecodeError::InvalidTag {
                    tag: "$id",
                    reason: e.to_string(),
                }
            })?;
            Value::Id(id)
        }
        _ => return Ok(None),
    };

    Ok(Some(value))
}

fn base64_payload(tag: &'static str, payload: &JsonValue) -> Result<Vec<u8>, DecodeError> {
    let text = payload.as_str().ok_or_else(|| DecodeError::InvalidTag {
        tag,
        reason: "expected a base64 string".into(),
    })?;
    STANDARD.decode(text).map_err(|e| DecodeError::InvalidTag {
        tag,
        reason: e.to_string(),
    })
}

fn fixed_bytes(tag: &'static str, payload: &JsonValue) -> Result<[u8; 8], DecodeError> {
    let bytes = base64_payload(tag, payload)?;
    bytes.try_into().map_err(|bytes: Vec<u8>| DecodeError::InvalidTag {
        tag,
        reason: format!("expected 8 bytes, got {}", bytes.len()),
    })
}
