//! Wire shape of the remote-call protocol.
//!
//! A call is a JSON array `["signet:rpc", "<16-char id>", "call",
//! "<exported name>", [args...]]`; the response mirrors it with the
//! result as the fourth element. Responses may arrive bare or wrapped in
//! an enclosing JSON object, so extraction scans object values for the
//! marked array.

use signet_value::{Map, Value};

/// Marker distinguishing protocol messages from user messages.
pub const PROTOCOL_MARKER: &str = "signet:rpc";

const CALL_ID_LEN: usize = 16;

/// Generate a fresh opaque call identifier.
pub(crate) fn new_call_id() -> String {
    uuid::Uuid::new_v4().to_string()[..CALL_ID_LEN].to_string()
}

/// Serialize a call envelope. Arguments go through the strict outbound
/// regime: a shape the channel cannot carry is an error, not a fallback.
pub(crate) fn build_envelope(id: &str, name: &str, args: &[Value]) -> Result<String, crate::RpcError> {
    let args = args
        .iter()
        .map(value_to_json)
        .collect::<Result<Vec<_>, _>>()?;
    let envelope = serde_json::json!([PROTOCOL_MARKER, id, "call", name, args]);
    Ok(envelope.to_string())
}

/// Extract `(call id, result)` from a protocol-marked message.
/// `None` means the message is malformed despite carrying the marker.
pub(crate) fn parse_protocol_message(message: &str) -> Option<(String, Value)> {
    let json: serde_json::Value = serde_json::from_str(message).ok()?;
    let items = extract_rpc_array(&json)?;
    let id = items.get(1)?.as_str()?.to_string();
    let result = items.get(3).map_or(Value::Nil, json_to_value);
    Some((id, result))
}

fn extract_rpc_array(json: &serde_json::Value) -> Option<&Vec<serde_json::Value>> {
    match json {
        serde_json::Value::Array(items)
            if items.first().and_then(serde_json::Value::as_str) == Some(PROTOCOL_MARKER) =>
        {
            Some(items)
        }
        serde_json::Value::Object(map) => map.values().find_map(extract_rpc_array),
        _ => None,
    }
}

pub(crate) fn value_to_json(value: &Value) -> Result<serde_json::Value, crate::RpcError> {
    match value {
        Value::Nil => Ok(serde_json::Value::Null),
        Value::Str(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Int(x) => Ok(serde_json::Value::from(*x)),
        Value::Bytes(bytes) => Ok(serde_json::Value::from(bytes.clone())),
        Value::List(items) => items
            .iter()
            .map(value_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),
        Value::Map(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, entry) in map {
                object.insert(key.clone(), value_to_json(entry)?);
            }
            Ok(serde_json::Value::Object(object))
        }
        other => Err(crate::RpcError::UnsupportedArgument(other.shape())),
    }
}

pub(crate) fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(number) => number
            .as_i64()
            .map_or_else(|| Value::Unsupported("number".to_string()), Value::Int),
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(object) => {
            let mut map = Map::with_capacity(object.len());
            for (key, entry) in object {
                map.insert(key.clone(), json_to_value(entry));
            }
            Value::Map(map)
        }
    }
}
