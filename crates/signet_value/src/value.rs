use std::fmt;

use ahash::AHashMap;

/// String-keyed map of decoded values. Keys are unique; iteration order
/// carries no meaning.
pub type Map = AHashMap<String, Value>;

/// An opaque reference to a foreign engine object, surfaced to handlers
/// that receive entity arguments (crash reports, devices, children).
///
/// Carries the runtime type name and the raw identity the engine
/// addresses the object by. Accessor wrappers live with the engine glue,
/// not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    type_name: String,
    raw: u64,
}

impl Handle {
    pub fn new(type_name: impl Into<String>, raw: u64) -> Self {
        Self {
            type_name: type_name.into(),
            raw,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn raw(&self) -> u64 {
        self.raw
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name, self.raw)
    }
}

/// A decoded value tree: the Rust-side shape of everything the engine
/// can hand us.
///
/// `Nil` is the empty placeholder produced when a typed slot's type has
/// no registered decoder; `Unsupported` carries the literal format tag
/// of a value the decoder does not model. Both exist so that decoding
/// stays total over the tag space.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Str(String),
    Bool(bool),
    Int(i64),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Map),
    Handle(Handle),
    Unsupported(String),
}

impl Value {
    /// Short name for this value's shape, used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Handle(_) => "handle",
            Self::Unsupported(_) => "unsupported",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i16> for Value {
    fn from(x: i16) -> Self {
        Self::Int(i64::from(x))
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Self::Int(i64::from(x))
    }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Self::Int(x)
    }
}

impl From<u16> for Value {
    fn from(x: u16) -> Self {
        Self::Int(i64::from(x))
    }
}

impl From<u32> for Value {
    fn from(x: u32) -> Self {
        Self::Int(i64::from(x))
    }
}

/// Unsigned 64-bit values above `i64::MAX` cannot be represented by the
/// protocol's signed integer tag and are rejected.
impl TryFrom<u64> for Value {
    type Error = crate::EncodeError;

    fn try_from(x: u64) -> Result<Self, Self::Error> {
        i64::try_from(x)
            .map(Self::Int)
            .map_err(|_| crate::EncodeError::IntegerRange(x))
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths_normalize_to_i64() {
        assert_eq!(Value::from(7_i16), Value::Int(7));
        assert_eq!(Value::from(7_u32), Value::Int(7));
        assert_eq!(Value::try_from(7_u64).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_u64_out_of_range_rejected() {
        assert!(Value::try_from(u64::MAX).is_err());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::Int(3).as_str(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
    }
}
