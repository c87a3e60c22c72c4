//! Remote JSON codec.
//!
//! Outbound, attribute values become a flat JSON object keyed by remote field
//! name. Null attributes are left out entirely: on partial updates the remote
//! treats an absent field as "leave alone" and an explicit null as "clear".
//!
//! Inbound, responses carry no schema, so the variant is inferred from the
//! JSON kind and then conformed to the declared attribute type where that
//! can be done without loss.

use crate::error::{Error, Result};
use crate::schema::{AttrType, AttributeSpec, ID_ATTRIBUTE, ResourceSchema};
use crate::types::ResourceState;
use crate::value::{Attributes, TypedValue};
use serde_json::{Map, Number, Value};

/// Envelope the remote adds to every record
const RECORD_ENVELOPE: &str = "attributes";

/// Convert a single value to JSON.
///
/// `Unknown` anywhere in the value is an engine bug and fails loudly.
pub fn value_to_json(value: &TypedValue) -> Result<Value> {
    Ok(match value {
        TypedValue::Null => Value::Null,
        TypedValue::Unknown => {
            return Err(Error::InvariantViolation(
                "unknown value reached the remote boundary".to_string(),
            ));
        }
        TypedValue::Bool(b) => Value::Bool(*b),
        TypedValue::Number(n) => Number::from_f64(*n)
            .map(Value::Number)
            .ok_or_else(|| Error::Encode(format!("non-finite number {n}")))?,
        TypedValue::String(s) => Value::String(s.clone()),
        TypedValue::Object(attrs) => {
            let mut map = Map::new();
            for (name, value) in attrs {
                if value.is_null() {
                    continue;
                }
                map.insert(name.clone(), value_to_json(value)?);
            }
            Value::Object(map)
        }
    })
}

/// Build the request body for a create or update.
///
/// The caller decides which attributes to include; this only renames them to
/// remote field names, drops nulls, and refuses unknowns.
pub fn to_remote_json<'a, I>(schema: &ResourceSchema, attrs: I) -> Result<Map<String, Value>>
where
    I: IntoIterator<Item = (&'a AttributeSpec, &'a TypedValue)>,
{
    let mut body = Map::new();
    for (spec, value) in attrs {
        if value.is_null() {
            continue;
        }
        if !value.is_fully_known() {
            return Err(Error::InvariantViolation(format!(
                "{}: attribute {:?} is still unknown at the remote boundary",
                schema.type_name, spec.name
            )));
        }
        body.insert(spec.remote_name.clone(), value_to_json(value)?);
    }
    Ok(body)
}

/// Infer a value from a JSON response fragment.
pub fn from_remote_json(raw: &Value) -> Result<TypedValue> {
    Ok(match raw {
        Value::Null => TypedValue::Null,
        Value::Bool(b) => TypedValue::Bool(*b),
        Value::Number(n) => TypedValue::Number(
            n.as_f64()
                .ok_or_else(|| Error::Decode(format!("number {n} out of range")))?,
        ),
        Value::String(s) => TypedValue::String(s.clone()),
        Value::Object(map) => TypedValue::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), from_remote_json(v)?)))
                .collect::<Result<Attributes>>()?,
        ),
        Value::Array(_) => {
            return Err(Error::Decode("lists are not supported in remote records".to_string()));
        }
    })
}

/// Bring an inferred value in line with the declared type.
fn conform(schema: &ResourceSchema, spec: &AttributeSpec, value: TypedValue) -> Result<TypedValue> {
    if value.conforms_to(spec.ty) {
        return Ok(value);
    }
    let converted = match (spec.ty, &value) {
        (AttrType::String, TypedValue::Number(n)) => Some(TypedValue::String(n.to_string())),
        (AttrType::Number, TypedValue::String(s)) => s.trim().parse::<f64>().ok().map(TypedValue::Number),
        (AttrType::Bool, TypedValue::String(s)) => match s.as_str() {
            "true" => Some(TypedValue::Bool(true)),
            "false" => Some(TypedValue::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    converted.ok_or_else(|| {
        Error::Decode(format!(
            "{}: remote field {:?} returned {value}, expected {}",
            schema.type_name, spec.remote_name, spec.ty
        ))
    })
}

/// Project a remote record onto the schema.
///
/// - `id` comes from the caller, not the record
/// - local attributes are carried forward from `previous`
/// - declared fields missing from the record are `Null`
/// - record fields the schema does not declare are ignored
pub fn project_remote(
    schema: &ResourceSchema,
    record: &Map<String, Value>,
    id: &str,
    previous: Option<&ResourceState>,
) -> Result<ResourceState> {
    let mut state = ResourceState::new(&schema.type_name);

    for spec in &schema.attributes {
        let value = if spec.name == ID_ATTRIBUTE {
            TypedValue::string(id)
        } else if spec.local {
            previous.map_or(TypedValue::Null, |p| p.get(&spec.name).clone())
        } else {
            match record.get(&spec.remote_name) {
                Some(raw) => conform(schema, spec, from_remote_json(raw)?)?,
                None => TypedValue::Null,
            }
        };
        state.set(spec.name.clone(), value);
    }

    if log::log_enabled!(log::Level::Trace) {
        for field in record.keys() {
            if field != RECORD_ENVELOPE && schema.by_remote_name(field).is_none() {
                log::trace!("{}: ignoring undeclared remote field {field}", schema.type_name);
            }
        }
    }

    Ok(state)
}
