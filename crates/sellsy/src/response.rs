//! Decoding helpers for v1 response envelopes.
//!
//! The CRM answers with `{"status": "success", "response": ...}` on success
//! and `{"status": "error", "error": ...}` otherwise, and it is not
//! consistent about the shape in which it returns identifiers: sometimes an
//! object with an id field, sometimes a one-element list of such objects,
//! sometimes a bare scalar. [`extract_id`] is the single place that
//! normalizes all of those.

use serde_json::Value;

/// The `response` payload of a successful envelope, `None` otherwise.
pub fn success_payload(envelope: &Value) -> Option<&Value> {
    if envelope.get("status").and_then(Value::as_str) == Some("success") {
        envelope.get("response")
    } else {
        None
    }
}

/// Human-readable error carried by a failed envelope.
pub fn envelope_error(envelope: &Value) -> String {
    match envelope.get("error") {
        Some(Value::String(message)) => message.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => "unknown CRM error".to_string(),
    }
}

/// Normalize the CRM's known id reply shapes to one optional identifier.
///
/// `keys` lists the id field names to try, in order, when the value is an
/// object; `"id"` should usually be among them.
pub fn extract_id(value: &Value, keys: &[&str]) -> Option<String> {
    match value {
        Value::Object(map) => keys
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(scalar_to_id),
        Value::Array(items) => match items.as_slice() {
            [single] => extract_id(single, keys),
            _ => None,
        },
        scalar => scalar_to_id(scalar),
    }
}

/// A named id field of an object payload, as a string.
pub fn id_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(scalar_to_id)
}

/// Default address id of a client row, from whatever shape the CRM used:
/// a top-level `addressid`, an embedded `address` object, or a list of
/// address objects (first wins).
pub fn default_address_hint(client: &Value) -> Option<String> {
    if let Some(id) = id_field(client, "addressid") {
        return Some(id);
    }
    match client.get("address") {
        Some(addr @ Value::Object(_)) => id_field(addr, "id"),
        Some(Value::Array(items)) => items.first().and_then(|a| id_field(a, "id")),
        _ => None,
    }
}

fn scalar_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
