use signet_value::{Handle, Variant};

use crate::types::SocketAddress;

/// A single positional value in an incoming signal invocation.
///
/// Carries the runtime type name the dispatch table keys on plus the
/// payload itself. Slots are transient: they exist only for the duration
/// of one dispatch.
#[derive(Debug, Clone)]
pub struct Slot {
    type_name: String,
    payload: Payload,
}

/// The payload union behind a typed slot.
#[derive(Debug, Clone)]
pub enum Payload {
    Str(String),
    Int(i64),
    UInt(u32),
    Bytes(Vec<u8>),
    Object(Handle),
    Variant(Variant),
    Endpoint(SocketAddress),
    /// No payload; seen when the engine passes a type the glue does not
    /// materialize.
    Unit,
}

impl Slot {
    /// A slot with an explicit runtime type name, for engine glue and
    /// for types the bridge has no constructor for.
    pub fn new(type_name: impl Into<String>, payload: Payload) -> Self {
        Self {
            type_name: type_name.into(),
            payload,
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::new(crate::dispatch::TYPE_STRING, Payload::Str(s.into()))
    }

    pub fn int(x: i64) -> Self {
        Self::new(crate::dispatch::TYPE_INT, Payload::Int(x))
    }

    pub fn uint(x: u32) -> Self {
        Self::new(crate::dispatch::TYPE_UINT, Payload::UInt(x))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(crate::dispatch::TYPE_BYTES, Payload::Bytes(bytes.into()))
    }

    /// An engine object slot; the handle's type name doubles as the
    /// slot's runtime type.
    pub fn object(handle: Handle) -> Self {
        let type_name = handle.type_name().to_string();
        Self::new(type_name, Payload::Object(handle))
    }

    pub fn variant(variant: Variant) -> Self {
        Self::new(crate::dispatch::TYPE_VARIANT, Payload::Variant(variant))
    }

    pub fn endpoint(address: SocketAddress) -> Self {
        Self::new(
            crate::dispatch::TYPE_SOCKET_ADDRESS,
            Payload::Endpoint(address),
        )
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}
