//! Outbound conversion: [`Value`] trees into the engine's tagged-value
//! builder representation.
//!
//! Encoding is strict where decoding is lenient: a malformed outbound
//! request must never reach the engine, so an unsupported shape is a
//! hard error instead of a fallback.

use thiserror::Error;

use crate::value::Value;
use crate::variant::{ArrayBuilder, DictBuilder, Variant};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The protocol has no tag for this value shape.
    #[error("type \"{0}\" not implemented")]
    Unsupported(&'static str),
    /// Unsigned value outside the signed 64-bit integer tag's range.
    #[error("unsigned value {0} exceeds the 64-bit signed integer range")]
    IntegerRange(u64),
}

/// Encode a decoded value tree into a tagged value for an outbound
/// request. Maps become ordered dictionaries, lists become arrays of
/// boxed values, scalars map to their scalar tags.
pub fn encode(value: &Value) -> Result<Variant, EncodeError> {
    match value {
        Value::Str(s) => Ok(Variant::Str(s.clone())),
        Value::Bool(b) => Ok(Variant::Bool(*b)),
        Value::Int(x) => Ok(Variant::Int64(*x)),
        Value::Map(map) => {
            let mut builder = DictBuilder::new();
            for (key, entry) in map {
                builder.add(key, encode(entry)?);
            }
            Ok(builder.end())
        }
        Value::List(items) => {
            let mut builder = ArrayBuilder::new();
            for item in items {
                builder.add(Variant::boxed(encode(item)?));
            }
            Ok(builder.end())
        }
        other => Err(EncodeError::Unsupported(other.shape())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::value::Map;

    #[test]
    fn test_scalars_round_trip() {
        for value in [
            Value::Str("hello".into()),
            Value::Bool(false),
            Value::Int(i64::MIN),
            Value::from(40_000_u16),
        ] {
            assert_eq!(decode(&encode(&value).unwrap()), value);
        }
    }

    #[test]
    fn test_compound_round_trip() {
        let mut inner = Map::new();
        inner.insert("threshold".into(), Value::Int(5));
        let mut map = Map::new();
        map.insert("name".into(), Value::Str("probe".into()));
        map.insert("enabled".into(), Value::Bool(true));
        map.insert("limits".into(), Value::Map(inner));
        map.insert(
            "tags".into(),
            Value::List(vec![Value::Str("a".into()), Value::Int(2)]),
        );
        let value = Value::Map(map);

        assert_eq!(decode(&encode(&value).unwrap()), value);
    }

    #[test]
    fn test_unsupported_shapes_fail_fast() {
        assert_eq!(
            encode(&Value::Nil),
            Err(EncodeError::Unsupported("nil"))
        );
        assert_eq!(
            encode(&Value::Bytes(vec![1])),
            Err(EncodeError::Unsupported("bytes"))
        );
        // A bad leaf poisons the whole tree.
        let value = Value::List(vec![Value::Int(1), Value::Nil]);
        assert!(encode(&value).is_err());
    }

    #[test]
    fn test_list_elements_are_boxed() {
        let encoded = encode(&Value::List(vec![Value::Int(1)])).unwrap();
        let Variant::Array(items) = encoded else {
            panic!("expected array");
        };
        assert_eq!(items[0], Variant::boxed(Variant::Int64(1)));
    }
}
