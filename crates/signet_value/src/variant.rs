use std::fmt;

/// A tagged value from the engine's dynamic value encoding.
///
/// Every variant self-describes its concrete type via a compact format
/// tag (see [`Variant::type_tag`]). Values form a tree by construction;
/// cycles are impossible. Tags the bridge does not model arrive as
/// [`Variant::Other`] carrying the literal tag observed on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    /// `"s"` — UTF-8 string.
    Str(String),
    /// `"b"` — boolean (zero/non-zero on the wire).
    Bool(bool),
    /// `"x"` — signed 64-bit integer.
    Int64(i64),
    /// `"v"` — a value boxing another value, arbitrarily deep.
    Boxed(Box<Variant>),
    /// `"a{sv}"` — string-keyed dictionary of tagged values, insertion
    /// order preserved by the encoding.
    Dict(Vec<(String, Variant)>),
    /// `"av"` — array of boxed values.
    Array(Vec<Variant>),
    /// `"aa{sv}"` — array of dictionaries.
    DictArray(Vec<Vec<(String, Variant)>>),
    /// `"ay"` — fixed-size byte buffer.
    Bytes(Vec<u8>),
    /// Any other format tag observed on the wire.
    Other(String),
}

impl Variant {
    /// The format tag describing this value's concrete type.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Str(_) => "s",
            Self::Bool(_) => "b",
            Self::Int64(_) => "x",
            Self::Boxed(_) => "v",
            Self::Dict(_) => "a{sv}",
            Self::Array(_) => "av",
            Self::DictArray(_) => "aa{sv}",
            Self::Bytes(_) => "ay",
            Self::Other(tag) => tag,
        }
    }

    /// Wrap a value one level deeper.
    pub fn boxed(inner: Self) -> Self {
        Self::Boxed(Box::new(inner))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "variant<{}>", self.type_tag())
    }
}

/// Builder for an ordered-dictionary value, mirroring the engine's
/// builder API: init, add entries, end.
#[derive(Debug, Default)]
pub struct DictBuilder {
    entries: Vec<(String, Variant)>,
}

impl DictBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: Variant) {
        self.entries.push((key.into(), value));
    }

    /// Finish the dictionary and hand back the built value.
    pub fn end(self) -> Variant {
        Variant::Dict(self.entries)
    }
}

/// Builder for an array-of-boxed-value.
#[derive(Debug, Default)]
pub struct ArrayBuilder {
    items: Vec<Variant>,
}

impl ArrayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: Variant) {
        self.items.push(value);
    }

    pub fn end(self) -> Variant {
        Variant::Array(self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(Variant::Str("x".into()).type_tag(), "s");
        assert_eq!(Variant::Int64(1).type_tag(), "x");
        assert_eq!(Variant::boxed(Variant::Bool(true)).type_tag(), "v");
        assert_eq!(Variant::Other("(ss)".into()).type_tag(), "(ss)");
    }

    #[test]
    fn test_dict_builder_preserves_insertion_order() {
        let mut builder = DictBuilder::new();
        builder.add("first", Variant::Int64(1));
        builder.add("second", Variant::Int64(2));
        let Variant::Dict(entries) = builder.end() else {
            panic!("expected dict");
        };
        assert_eq!(entries[0].0, "first");
        assert_eq!(entries[1].0, "second");
    }
}
