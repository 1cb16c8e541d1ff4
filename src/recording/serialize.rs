//! Conversion of event payloads into plain, JSON-representable mappings.
//!
//! Rules, applied recursively:
//! - an object whose only fields are numeric `x` and `y` stays `{x, y}`
//! - a sequence becomes `{ "array": [...] }`, order preserved
//! - any other object maps each field
//! - a primitive becomes `{ "value": <primitive> }`

use log::warn;
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Serializes any payload into the recorded/bridged mapping form.
pub fn serialize_payload<T: Serialize + ?Sized>(payload: &T) -> Value {
    match serde_json::to_value(payload) {
        Ok(value) => serialize_value(&value),
        Err(err) => {
            warn!("Failed to serialize event payload: {err}");
            json!({ "value": Value::Null })
        }
    }
}

/// Applies the mapping rules to an already-generic JSON value.
pub fn serialize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) if is_vector_like(map) => {
            json!({ "x": map["x"], "y": map["y"] })
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), serialize_value(item)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => json!({ "array": items.iter().map(serialize_value).collect::<Vec<_>>() }),
        primitive => json!({ "value": primitive }),
    }
}

fn is_vector_like(map: &Map<String, Value>) -> bool {
    map.len() == 2
        && map.get("x").is_some_and(Value::is_number)
        && map.get("y").is_some_and(Value::is_number)
}

/// Reads a wrapped primitive number: `data[key].value`.
pub(crate) fn number_field(data: &Value, key: &str) -> Option<f64> {
    data.get(key)?.get("value")?.as_f64()
}

pub(crate) fn string_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key)?.get("value")?.as_str()
}

pub(crate) fn bool_field(data: &Value, key: &str) -> Option<bool> {
    data.get(key)?.get("value")?.as_bool()
}

/// Items of a serialized sequence: `data.array`.
pub(crate) fn array_items(data: &Value) -> Option<&Vec<Value>> {
    data.get("array")?.as_array()
}
