//! Remote-call correlation over the engine's general message channel.
//!
//! Rust-side calls to functions a loaded script exports are carried as
//! "remote call" envelopes over the same bidirectional message channel
//! user messages travel on. Each outbound call gets a generated 16-char
//! identifier; the inbound router intercepts protocol-marked messages,
//! correlates them by that identifier, and forwards everything else to
//! the caller's message handler unchanged.

pub mod channel;
pub mod wire;

pub use channel::{Cancellation, MessagePost, RpcChannel, RpcError};
pub use wire::PROTOCOL_MARKER;
