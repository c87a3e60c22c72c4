//! Host wire codec.
//!
//! Values travel as UTF-8 JSON with an explicit kind tag, so `Unknown` and
//! `Null` survive the trip and the decoder can check each attribute against
//! its declared type:
//! ```text
//! {"kind":"object","value":{
//!     "id":   {"kind":"unknown"},
//!     "name": {"kind":"string","value":"foo"}
//! }}
//! ```
//! "No resource" (e.g. the proposed state of a destroy) is encoded as
//! `{"kind":"null"}`; a bare JSON `null` is accepted as the same thing.

use crate::error::{Error, Result};
use crate::schema::ResourceSchema;
use crate::types::ResourceState;
use crate::value::{Attributes, TypedValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
enum WireValue {
    Null,
    Unknown,
    Bool(bool),
    Number(f64),
    String(String),
    Object(BTreeMap<String, WireValue>),
}

impl TryFrom<&TypedValue> for WireValue {
    type Error = Error;

    fn try_from(value: &TypedValue) -> Result<Self> {
        Ok(match value {
            TypedValue::Null => WireValue::Null,
            TypedValue::Unknown => WireValue::Unknown,
            TypedValue::Bool(b) => WireValue::Bool(*b),
            TypedValue::Number(n) if n.is_finite() => WireValue::Number(*n),
            TypedValue::Number(n) => {
                return Err(Error::Encode(format!("non-finite number {n}")));
            }
            TypedValue::String(s) => WireValue::String(s.clone()),
            TypedValue::Object(attrs) => WireValue::Object(
                attrs
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), WireValue::try_from(v)?)))
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

impl From<WireValue> for TypedValue {
    fn from(value: WireValue) -> Self {
        match value {
            WireValue::Null => TypedValue::Null,
            WireValue::Unknown => TypedValue::Unknown,
            WireValue::Bool(b) => TypedValue::Bool(b),
            WireValue::Number(n) => TypedValue::Number(n),
            WireValue::String(s) => TypedValue::String(s),
            WireValue::Object(attrs) => {
                TypedValue::Object(attrs.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Encode a value for the host.
///
/// Fails only for numbers the encoding cannot carry (NaN, infinities).
pub fn encode_wire(value: &TypedValue) -> Result<Vec<u8>> {
    let wire = WireValue::try_from(value)?;
    serde_json::to_vec(&wire).map_err(|e| Error::Encode(e.to_string()))
}

/// Decode a resource value sent by the host, checking it against `schema`.
///
/// Attributes the schema declares but the payload omits decode as `Null`.
pub fn decode_wire(schema: &ResourceSchema, bytes: &[u8]) -> Result<TypedValue> {
    let wire: Option<WireValue> = serde_json::from_slice(bytes)
        .map_err(|e| Error::Decode(format!("{}: malformed payload: {e}", schema.type_name)))?;

    let attrs = match wire {
        None | Some(WireValue::Null) => return Ok(TypedValue::Null),
        Some(WireValue::Object(attrs)) => attrs,
        Some(_) => {
            return Err(Error::Decode(format!(
                "{}: expected an object or null at top level",
                schema.type_name
            )));
        }
    };

    let mut decoded = Attributes::new();
    for (name, value) in attrs {
        let spec = schema.get(&name).ok_or_else(|| {
            Error::Decode(format!(
                "{}: attribute {name:?} is not declared in the schema",
                schema.type_name
            ))
        })?;
        let value = TypedValue::from(value);
        if !value.conforms_to(spec.ty) {
            return Err(Error::Decode(format!(
                "{}: attribute {name:?} is declared {} but the payload carries {}",
                schema.type_name,
                spec.ty,
                value.kind().map_or_else(|| "null".to_string(), |k| k.to_string()),
            )));
        }
        decoded.insert(name, value);
    }

    for spec in &schema.attributes {
        decoded.entry(spec.name.clone()).or_insert(TypedValue::Null);
    }

    Ok(TypedValue::Object(decoded))
}

/// Decode straight into an optional [`ResourceState`]
pub fn decode_state(schema: &ResourceSchema, bytes: &[u8]) -> Result<Option<ResourceState>> {
    ResourceState::from_value(&schema.type_name, decode_wire(schema, bytes)?)
}

/// Encode an optional [`ResourceState`]; `None` encodes as top-level null
pub fn encode_state(state: Option<&ResourceState>) -> Result<Vec<u8>> {
    encode_wire(&ResourceState::to_value(state))
}
