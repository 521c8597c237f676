//! Inbound conversion: engine tagged values into [`Value`] trees.
//!
//! Decoding is total over the tag space. It never errors and never
//! panics; anything unrecognized degrades to [`Value::Unsupported`]
//! carrying the literal tag, so one odd value cannot stall a dispatch
//! in progress.

use ahash::AHashMap;

use crate::value::{Map, Value};
use crate::variant::Variant;

/// Convert a tagged value into the equivalent decoded value tree.
///
/// Boxed values (`"v"`) unwrap level by level until a non-wrapping tag
/// is reached; real data nests shallowly, and the unwrap itself is a
/// loop, so depth costs nothing on the stack.
pub fn decode(variant: &Variant) -> Value {
    let mut current = variant;
    while let Variant::Boxed(inner) = current {
        current = inner;
    }

    match current {
        Variant::Str(s) => Value::Str(s.clone()),
        Variant::Bool(b) => Value::Bool(*b),
        Variant::Int64(x) => Value::Int(*x),
        Variant::Bytes(bytes) => Value::Bytes(bytes.clone()),
        Variant::Dict(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(key.clone(), decode(value));
            }
            Value::Map(map)
        }
        Variant::Array(items) => Value::List(items.iter().map(decode).collect()),
        // The outer array folds into a single map; a key repeated across
        // outer elements keeps the last write. This mirrors how the
        // engine emits parameter-dictionary lists.
        Variant::DictArray(dicts) => {
            let mut map = Map::new();
            for entries in dicts {
                for (key, value) in entries {
                    map.insert(key.clone(), decode(value));
                }
            }
            Value::Map(map)
        }
        Variant::Other(tag) => Value::Unsupported(tag.clone()),
        // Unreachable after the unwrap loop, but harmless.
        Variant::Boxed(inner) => decode(inner),
    }
}

/// Flatten a foreign hash-table of tagged values into a decoded map.
///
/// The source structure is unordered; an empty table yields an empty
/// map, not an absent one.
pub fn flatten_table(table: &AHashMap<String, Variant>) -> Map {
    let mut map = Map::with_capacity(table.len());
    if table.is_empty() {
        return map;
    }
    for (key, value) in table {
        map.insert(key.clone(), decode(value));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(decode(&Variant::Str("abc".into())), Value::Str("abc".into()));
        assert_eq!(decode(&Variant::Bool(true)), Value::Bool(true));
        assert_eq!(decode(&Variant::Int64(-9)), Value::Int(-9));
        assert_eq!(
            decode(&Variant::Bytes(vec![1, 2, 3])),
            Value::Bytes(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_unknown_tag_degrades_to_marker() {
        let value = decode(&Variant::Other("(ss)".into()));
        assert_eq!(value, Value::Unsupported("(ss)".into()));
    }

    #[test]
    fn test_boxed_unwraps_to_any_depth() {
        let mut variant = Variant::Str("deep".into());
        for _ in 0..64 {
            variant = Variant::boxed(variant);
        }
        assert_eq!(decode(&variant), Value::Str("deep".into()));
    }

    #[test]
    fn test_nested_dict_of_dict_of_list() {
        let inner = Variant::Array(vec![
            Variant::boxed(Variant::Int64(1)),
            Variant::boxed(Variant::Str("x".into())),
            Variant::boxed(Variant::Bool(true)),
        ]);
        let middle = Variant::Dict(vec![("b".into(), Variant::boxed(inner))]);
        let outer = Variant::Dict(vec![("a".into(), Variant::boxed(middle))]);

        let decoded = decode(&outer);
        let a = decoded.as_map().unwrap().get("a").unwrap();
        let b = a.as_map().unwrap().get("b").unwrap();
        let items = b.as_list().unwrap();
        assert_eq!(items[0], Value::Int(1));
        assert_eq!(items[1], Value::Str("x".into()));
        assert_eq!(items[2], Value::Bool(true));
    }

    #[test]
    fn test_dict_array_last_write_wins() {
        let first = vec![
            ("shared".into(), Variant::Int64(1)),
            ("only-first".into(), Variant::Int64(2)),
        ];
        let second = vec![("shared".into(), Variant::Int64(3))];
        let decoded = decode(&Variant::DictArray(vec![first, second]));

        let map = decoded.as_map().unwrap();
        assert_eq!(map.get("shared"), Some(&Value::Int(3)));
        assert_eq!(map.get("only-first"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_flatten_empty_table_is_empty_map() {
        let table = AHashMap::new();
        assert_eq!(flatten_table(&table), Map::new());
    }

    #[test]
    fn test_flatten_decodes_each_value() {
        let mut table = AHashMap::new();
        table.insert("name".to_string(), Variant::Str("gadget".into()));
        table.insert(
            "access".to_string(),
            Variant::boxed(Variant::Bool(false)),
        );

        let map = flatten_table(&table);
        assert_eq!(map.get("name"), Some(&Value::Str("gadget".into())));
        assert_eq!(map.get("access"), Some(&Value::Bool(false)));
    }
}
