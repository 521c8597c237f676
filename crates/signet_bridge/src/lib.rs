//! Dynamic callback bridge between the engine's signal dispatch and Rust
//! handler functions.
//!
//! The engine addresses closures by raw identity from threads outside
//! Rust's control, so the bridge keeps a process-wide concurrent registry
//! keyed by closure identity. A fixed trampoline looks the handler up at
//! invocation time, decodes the typed argument slots through the
//! type-dispatch table, and calls the handler synchronously on the
//! dispatch thread. Handlers therefore must not block on long I/O; see
//! the `offload` wrapper in the facade crate for the opt-in alternative.
//!
//! Closure lifetime is owned by the engine: a registry entry is evicted
//! only when the engine's finalize notification fires, never by Rust-side
//! reachability.

pub mod closure;
pub mod dispatch;
pub mod handler;
pub mod object;
pub mod slot;
pub mod types;

pub use closure::{ClosureId, connect, is_registered, trampoline};
pub use dispatch::{SlotDecoder, decode_slot};
pub use handler::{FromValue, Handler, IntoHandler};
pub use object::{ForeignObject, SignalId, SignalSpec, TypeDescriptor};
pub use slot::{Payload, Slot};
pub use types::{DetachReason, FileChangeKind, SocketAddress};
