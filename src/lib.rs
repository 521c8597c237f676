//! signet — bindings bridge for a native instrumentation engine.
//!
//! The engine drives everything through a signal/event dispatch mechanism
//! of its own and speaks a dynamically-typed tagged value encoding. This
//! workspace provides the two hard pieces of a binding on top of it:
//!
//! - registering Rust functions as signal handlers, with closure lifetime
//!   owned by the engine rather than by Rust reachability
//!   ([`signet_bridge`]), and
//! - converting values in both directions between the tagged encoding and
//!   Rust data ([`signet_value`]), plus remote-call correlation over the
//!   message channel ([`signet_rpc`]).
//!
//! Handlers run synchronously on the engine's dispatch thread. That is an
//! inherited constraint: a slow handler stalls that thread, so handlers
//! must not block on long I/O. [`offload`] offers an explicit opt-in
//! worker queue for callers who need to do real work per event.

pub mod error;
pub mod logging;
pub mod offload;

pub use error::{Error, Result};

pub use signet_bridge::{
    ClosureId, DetachReason, FileChangeKind, ForeignObject, FromValue, IntoHandler, Payload,
    SignalSpec, Slot, SocketAddress, TypeDescriptor, connect, decode_slot,
};
pub use signet_rpc::{Cancellation, MessagePost, PROTOCOL_MARKER, RpcChannel, RpcError};
pub use signet_value::{
    ArrayBuilder, DictBuilder, EncodeError, Handle, Map, Value, Variant, decode, encode,
    flatten_table,
};
