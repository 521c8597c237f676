//! Tagged-value marshalling between the engine's dynamic value encoding
//! and idiomatic Rust data.
//!
//! The engine self-describes every value with a format tag ([`Variant`]).
//! Inbound conversion ([`decode`]) is total: unknown tags degrade to a
//! literal-tag marker instead of failing, because inbound data originates
//! from a live event stream that must keep flowing. Outbound conversion
//! ([`encode`]) is strict: a shape the protocol cannot express is an error,
//! never a silent fallback.

pub mod decode;
pub mod encode;
pub mod value;
pub mod variant;

pub use decode::{decode, flatten_table};
pub use encode::{EncodeError, encode};
pub use value::{Handle, Map, Value};
pub use variant::{ArrayBuilder, DictBuilder, Variant};
