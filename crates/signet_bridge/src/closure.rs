//! The callback registry and closure bridge.
//!
//! The engine dispatches to closures by raw identity from its own
//! threads, so the (closure identity → handler) association lives in a
//! process-wide concurrent map. Entries are inserted at registration and
//! removed only by the engine's finalize notification — never by Rust
//! drop order — because the engine's object graph may outlive anything
//! the caller still holds.

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::dispatch::decode_slot;
use crate::handler::{Handler, IntoHandler};
use crate::object::ForeignObject;
use crate::slot::Slot;

/// Identity of an engine-allocated closure object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClosureId(u64);

struct ClosureRecord {
    handler: Handler,
    /// Call site that registered the handler, kept for diagnostics.
    origin: &'static Location<'static>,
}

static CLOSURES: Lazy<RwLock<AHashMap<ClosureId, Arc<ClosureRecord>>>> =
    Lazy::new(|| RwLock::new(AHashMap::new()));

static NEXT_CLOSURE: AtomicU64 = AtomicU64::new(1);

fn register(handler: Handler, origin: &'static Location<'static>) -> ClosureId {
    let id = ClosureId(NEXT_CLOSURE.fetch_add(1, Ordering::Relaxed));
    CLOSURES
        .write()
        .insert(id, Arc::new(ClosureRecord { handler, origin }));
    id
}

/// Evict a closure's record. Called when the engine's finalize
/// notification fires for it.
pub(crate) fn finalize(id: ClosureId) {
    if let Some(record) = CLOSURES.write().remove(&id) {
        debug!(?id, registered_at = %record.origin, "closure finalized");
    }
}

/// Whether a closure identity is still registered.
pub fn is_registered(id: ClosureId) -> bool {
    CLOSURES.read().contains_key(&id)
}

/// Fixed entry point the engine invokes for every closure.
///
/// Slot 0 carries the emitting instance and is skipped; only the slots
/// the handler actually declared are decoded. A missing registry entry
/// falls back to an empty handler — a finalize racing a dispatch must
/// not crash the engine's event loop. Handler panics propagate.
///
/// # Panics
///
/// If the registered handler declares more parameters than the
/// invocation supplied. Registration guards against this, so hitting it
/// means the signal table lied about the payload count.
pub fn trampoline(id: ClosureId, slots: &[Slot]) {
    let record = CLOSURES.read().get(&id).cloned();
    let Some(record) = record else {
        debug!(?id, "no handler registered for closure");
        Handler::noop().invoke(&[]);
        return;
    };

    let supplied = slots.len().saturating_sub(1);
    let arity = record.handler.arity();
    assert!(
        arity <= supplied,
        "too many args: have {arity}, max {supplied}"
    );

    let args: Vec<_> = slots.iter().skip(1).take(arity).map(decode_slot).collect();
    record.handler.invoke(&args);
}

/// Register `handler` for the named signal on `obj`.
///
/// The symbolic name is resolved against the object type's signal table;
/// an unknown name is silently ignored — the set of valid names is part
/// of the engine's documented contract, and callers connecting to
/// optional events must not crash.
///
/// # Panics
///
/// If the handler declares more parameters than the signal supplies.
/// That is a programmer error and is surfaced eagerly, not deferred into
/// a dispatch-time failure.
#[track_caller]
pub fn connect<M>(obj: &ForeignObject, signal: &str, handler: impl IntoHandler<M>) {
    let origin = Location::caller();

    let Some(spec) = obj.descriptor().signal(signal) else {
        debug!(
            signal,
            type_name = obj.descriptor().type_name(),
            "unknown signal name, ignoring"
        );
        return;
    };

    let handler = handler.into_handler();
    assert!(
        handler.arity() <= spec.param_count,
        "handler for \"{signal}\" declares {} parameters, but the signal supplies at most {}",
        handler.arity(),
        spec.param_count
    );

    let id = register(handler, origin);
    obj.attach(spec.id, id);
    debug!(signal, closure = ?id, "handler connected");
}
