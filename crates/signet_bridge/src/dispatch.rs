//! Type-dispatch table: runtime type name → slot decoder.
//!
//! Signal arguments carry types the bridge discovers only at dispatch
//! time, so decoding goes through a registry keyed by the slot's type
//! name. Entries are collected at link time and frozen into a read-only
//! map on first use; lookups never take a lock. A lookup miss yields
//! [`Value::Nil`] — signal dispatch must never abort because one
//! argument's type is not yet mapped.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use signet_value::{Map, Value, decode};

use crate::slot::{Payload, Slot};
use crate::types::{DetachReason, FileChangeKind};

pub const TYPE_STRING: &str = "string";
pub const TYPE_BYTES: &str = "Bytes";
pub const TYPE_INT: &str = "int";
pub const TYPE_UINT: &str = "uint";
pub const TYPE_CRASH: &str = "Crash";
pub const TYPE_DEVICE: &str = "Device";
pub const TYPE_APPLICATION: &str = "Application";
pub const TYPE_CHILD: &str = "Child";
pub const TYPE_DETACH_REASON: &str = "DetachReason";
pub const TYPE_FILE_CHANGE_KIND: &str = "FileChangeKind";
pub const TYPE_SOCKET_ADDRESS: &str = "SocketAddress";
pub const TYPE_VARIANT: &str = "Variant";

/// One dispatch-table entry, registered with `inventory::submit!`.
pub struct SlotDecoder {
    pub type_name: &'static str,
    pub decode: fn(&Slot) -> Value,
}

inventory::collect!(SlotDecoder);

static DISPATCH: Lazy<AHashMap<&'static str, fn(&Slot) -> Value>> = Lazy::new(|| {
    let mut table = AHashMap::new();
    for entry in inventory::iter::<SlotDecoder> {
        table.insert(entry.type_name, entry.decode);
    }
    table
});

/// Decode one typed argument slot into a managed value.
pub fn decode_slot(slot: &Slot) -> Value {
    match DISPATCH.get(slot.type_name()) {
        Some(decoder) => decoder(slot),
        None => {
            debug!(type_name = slot.type_name(), "no decoder for slot type");
            Value::Nil
        }
    }
}

fn decode_string(slot: &Slot) -> Value {
    match slot.payload() {
        Payload::Str(s) => Value::Str(s.clone()),
        _ => Value::Nil,
    }
}

fn decode_bytes(slot: &Slot) -> Value {
    match slot.payload() {
        Payload::Bytes(bytes) => Value::Bytes(bytes.clone()),
        // A null buffer surfaces as an empty byte sequence.
        _ => Value::Bytes(Vec::new()),
    }
}

fn decode_int(slot: &Slot) -> Value {
    match slot.payload() {
        Payload::Int(x) => Value::Int(*x),
        Payload::UInt(x) => Value::Int(i64::from(*x)),
        _ => Value::Nil,
    }
}

fn decode_object(slot: &Slot) -> Value {
    match slot.payload() {
        Payload::Object(handle) => Value::Handle(handle.clone()),
        _ => Value::Nil,
    }
}

fn decode_detach_reason(slot: &Slot) -> Value {
    match slot.payload() {
        Payload::Int(raw) => DetachReason::from_raw(*raw)
            .map_or(Value::Int(*raw), |reason| Value::Str(reason.to_string())),
        _ => Value::Nil,
    }
}

fn decode_file_change_kind(slot: &Slot) -> Value {
    match slot.payload() {
        Payload::Int(raw) => FileChangeKind::from_raw(*raw)
            .map_or(Value::Int(*raw), |kind| Value::Str(kind.to_string())),
        _ => Value::Nil,
    }
}

fn decode_socket_address(slot: &Slot) -> Value {
    match slot.payload() {
        Payload::Endpoint(endpoint) => {
            let mut map = Map::with_capacity(2);
            map.insert("address".to_string(), Value::Str(endpoint.address.clone()));
            map.insert("port".to_string(), Value::Int(i64::from(endpoint.port)));
            Value::Map(map)
        }
        _ => Value::Nil,
    }
}

fn decode_variant(slot: &Slot) -> Value {
    match slot.payload() {
        Payload::Variant(variant) => decode(variant),
        _ => Value::Nil,
    }
}

inventory::submit! { SlotDecoder { type_name: TYPE_STRING, decode: decode_string } }
inventory::submit! { SlotDecoder { type_name: TYPE_BYTES, decode: decode_bytes } }
inventory::submit! { SlotDecoder { type_name: TYPE_INT, decode: decode_int } }
inventory::submit! { SlotDecoder { type_name: TYPE_UINT, decode: decode_int } }
inventory::submit! { SlotDecoder { type_name: TYPE_CRASH, decode: decode_object } }
inventory::submit! { SlotDecoder { type_name: TYPE_DEVICE, decode: decode_object } }
inventory::submit! { SlotDecoder { type_name: TYPE_APPLICATION, decode: decode_object } }
inventory::submit! { SlotDecoder { type_name: TYPE_CHILD, decode: decode_object } }
inventory::submit! { SlotDecoder { type_name: TYPE_DETACH_REASON, decode: decode_detach_reason } }
inventory::submit! { SlotDecoder { type_name: TYPE_FILE_CHANGE_KIND, decode: decode_file_change_kind } }
inventory::submit! { SlotDecoder { type_name: TYPE_SOCKET_ADDRESS, decode: decode_socket_address } }
inventory::submit! { SlotDecoder { type_name: TYPE_VARIANT, decode: decode_variant } }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SocketAddress;
    use signet_value::{Handle, Variant};

    #[test]
    fn test_scalar_slots() {
        assert_eq!(decode_slot(&Slot::string("hi")), Value::Str("hi".into()));
        assert_eq!(decode_slot(&Slot::int(-4)), Value::Int(-4));
        assert_eq!(decode_slot(&Slot::uint(9)), Value::Int(9));
        assert_eq!(
            decode_slot(&Slot::bytes(vec![0xde, 0xad])),
            Value::Bytes(vec![0xde, 0xad])
        );
    }

    #[test]
    fn test_unmapped_type_yields_nil() {
        let slot = Slot::new("SomeFutureType", Payload::Unit);
        assert_eq!(decode_slot(&slot), Value::Nil);
    }

    #[test]
    fn test_object_slot_yields_handle() {
        let handle = Handle::new(TYPE_CRASH, 42);
        let value = decode_slot(&Slot::object(handle.clone()));
        assert_eq!(value, Value::Handle(handle));
    }

    #[test]
    fn test_reason_codes_decode_to_names() {
        let slot = Slot::new(TYPE_DETACH_REASON, Payload::Int(5));
        assert_eq!(decode_slot(&slot), Value::Str("connection-lost".into()));
        // Unknown codes keep the raw integer.
        let slot = Slot::new(TYPE_DETACH_REASON, Payload::Int(99));
        assert_eq!(decode_slot(&slot), Value::Int(99));
    }

    #[test]
    fn test_socket_address_decodes_to_map() {
        let slot = Slot::endpoint(SocketAddress::new("10.0.0.2", 27042));
        let value = decode_slot(&slot);
        let map = value.as_map().unwrap();
        assert_eq!(map.get("address"), Some(&Value::Str("10.0.0.2".into())));
        assert_eq!(map.get("port"), Some(&Value::Int(27042)));
    }

    #[test]
    fn test_variant_slot_decodes_recursively() {
        let variant = Variant::Dict(vec![("k".into(), Variant::boxed(Variant::Int64(1)))]);
        let value = decode_slot(&Slot::variant(variant));
        assert_eq!(value.as_map().unwrap().get("k"), Some(&Value::Int(1)));
    }
}
