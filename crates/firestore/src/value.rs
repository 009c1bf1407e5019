//! Codec between plain JSON and Firestore's typed value encoding.
//!
//! Firestore wraps every field in a type discriminator
//! (`{"stringValue": "x"}`, `{"integerValue": "42"}`, ...); integers ride
//! as strings, timestamps as RFC3339. Both directions are pure functions.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Map, Value};

/// Encode a plain JSON value into a Firestore typed value.
pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                json!({ "integerValue": n.to_string() })
            } else {
                json!({ "doubleValue": n })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_firestore_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": to_firestore_fields(map) } }),
    }
}

/// Encode a JSON object into a Firestore fields map.
pub fn to_firestore_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), to_firestore_value(v)))
        .collect()
}

/// Decode a Firestore typed value back into plain JSON.
///
/// Timestamps decode to their RFC3339 string; unknown discriminators
/// decode to null rather than failing the whole document.
pub fn from_firestore_value(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Null;
    };
    if let Some(s) = map.get("stringValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(raw) = map.get("integerValue") {
        let parsed = match raw {
            Value::String(s) => s.parse::<i64>().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        };
        if let Some(n) = parsed {
            return json!(n);
        }
        return Value::Null;
    }
    if let Some(n) = map.get("doubleValue").and_then(Value::as_f64) {
        return json!(n);
    }
    if let Some(b) = map.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(b);
    }
    if map.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(s) = map.get("timestampValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(s) = map.get("referenceValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(fields) = map.get("mapValue").and_then(|m| m.get("fields")) {
        if let Some(fields) = fields.as_object() {
            return Value::Object(from_firestore_fields(fields));
        }
        return json!({});
    }
    if let Some(inner) = map.get("mapValue") {
        if inner.is_object() {
            return json!({});
        }
    }
    if let Some(values) = map.get("arrayValue").and_then(|a| a.get("values")) {
        if let Some(values) = values.as_array() {
            return Value::Array(values.iter().map(from_firestore_value).collect());
        }
        return json!([]);
    }
    if map.contains_key("arrayValue") {
        return json!([]);
    }
    Value::Null
}

/// Decode a Firestore fields map into a JSON object.
pub fn from_firestore_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), from_firestore_value(v)))
        .collect()
}

/// Encode epoch milliseconds as a Firestore `timestampValue`.
pub fn timestamp_value_from_millis(millis: i64) -> Value {
    let rfc3339 = match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        // Out-of-range stamp; encode the epoch instead of failing the write.
        None => Utc
            .timestamp_millis_opt(0)
            .single()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default(),
    };
    json!({ "timestampValue": rfc3339 })
}

/// Parse a Firestore RFC3339 timestamp into epoch milliseconds.
pub fn millis_from_timestamp(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp_millis())
}
