//! Conversion between plain JSON and Firestore typed values.
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type (`stringValue`, `arrayValue`, `mapValue`, ...). The catalog is encoded
//! from its typed form, and decoded documents are turned back into plain JSON
//! so they can go through the same schema validation as any other input.

use serde_json::{Map, Value, json};

use denial_core::{Catalog, Error, Result};

/// Encodes a catalog as a Firestore document `fields` object.
///
/// # Errors
///
/// Returns an error if the catalog cannot be serialized.
pub fn encode_fields(catalog: &Catalog) -> Result<Value> {
    let value = serde_json::to_value(catalog)?;
    let Value::Object(map) = value else {
        return Err(Error::Internal {
            message: "catalog did not serialize to an object".into(),
        });
    };
    Ok(Value::Object(encode_map(&map)))
}

/// Decodes a Firestore document `fields` object into plain JSON.
///
/// # Errors
///
/// Returns a serialization error for unknown or malformed typed values.
pub fn decode_fields(fields: &Value) -> Result<Value> {
    let map = fields.as_object().ok_or_else(|| Error::Serialization {
        message: "Firestore document fields must be an object".into(),
    })?;
    decode_map(map)
}

fn encode_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_map(map) } }),
    }
}

fn decode_map(map: &Map<String, Value>) -> Result<Value> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        out.insert(key.clone(), decode_value(value)?);
    }
    Ok(Value::Object(out))
}

fn decode_value(value: &Value) -> Result<Value> {
    let typed = value
        .as_object()
        .filter(|m| m.len() == 1)
        .and_then(|m| m.iter().next())
        .map(|(kind, inner)| (kind.as_str(), inner))
        .ok_or_else(|| Error::Serialization {
            message: format!("not a Firestore typed value: {value}"),
        })?;

    match typed {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("integerValue", Value::String(s)) => s
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| Error::Serialization {
                message: format!("invalid integerValue {s}: {e}"),
            }),
        ("integerValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("stringValue" | "timestampValue" | "referenceValue" | "bytesValue", Value::String(s)) => {
            Ok(Value::String(s.clone()))
        }
        ("arrayValue", inner) => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        ("mapValue", inner) => match inner.get("fields").and_then(Value::as_object) {
            Some(fields) => decode_map(fields),
            None => Ok(Value::Object(Map::new())),
        },
        (kind, _) => Err(Error::Serialization {
            message: format!("unsupported Firestore value type: {kind}"),
        }),
    }
}
