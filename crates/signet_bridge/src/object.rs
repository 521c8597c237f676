//! Boundary model of the engine's object/dispatch mechanism.
//!
//! The real engine glue implements this seam: a type descriptor holds the
//! signal table resolution goes through, and a [`ForeignObject`] carries
//! the connected closures and fires them via the bridge trampoline. Tests
//! drive the same surface directly, which is what makes closure lifetime
//! and dispatch behavior checkable in-process.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::debug;

use signet_value::Handle;

use crate::closure::{ClosureId, finalize, trampoline};
use crate::slot::Slot;

/// Internal signal identifier, valid within one type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(u32);

/// One entry in a type's signal table: the resolved identifier plus the
/// number of payload slots the signal supplies beyond the implicit
/// instance slot.
#[derive(Debug, Clone, Copy)]
pub struct SignalSpec {
    pub id: SignalId,
    pub param_count: usize,
}

/// Signal table for one engine object type.
#[derive(Debug)]
pub struct TypeDescriptor {
    type_name: &'static str,
    signals: AHashMap<&'static str, SignalSpec>,
}

impl TypeDescriptor {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            signals: AHashMap::new(),
        }
    }

    /// Declare a signal and its payload slot count.
    #[must_use]
    pub fn with_signal(mut self, name: &'static str, param_count: usize) -> Self {
        let id = SignalId(u32::try_from(self.signals.len()).unwrap_or(u32::MAX) + 1);
        self.signals.insert(name, SignalSpec { id, param_count });
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Resolve a symbolic signal name. `None` means the name is unknown
    /// for this object type.
    pub fn signal(&self, name: &str) -> Option<SignalSpec> {
        self.signals.get(name).copied()
    }
}

static NEXT_RAW: AtomicU64 = AtomicU64::new(1);

/// One engine object instance.
///
/// Lifetime is engine-driven: dropping the Rust value does not tear down
/// connected closures; only [`ForeignObject::finalize_closures`] — the
/// stand-in for the engine's finalize notification — evicts their
/// registry entries.
pub struct ForeignObject {
    descriptor: Arc<TypeDescriptor>,
    raw: u64,
    // (signal, closure) pairs in connection order.
    connections: Mutex<Vec<(SignalId, ClosureId)>>,
}

impl ForeignObject {
    pub fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            descriptor,
            raw: NEXT_RAW.fetch_add(1, Ordering::Relaxed),
            connections: Mutex::new(Vec::new()),
        }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The opaque reference other parts of the system see this object as.
    pub fn handle(&self) -> Handle {
        Handle::new(self.descriptor.type_name, self.raw)
    }

    pub(crate) fn attach(&self, signal: SignalId, closure: ClosureId) {
        self.connections.lock().push((signal, closure));
    }

    /// Identities of every closure currently connected, in connection
    /// order.
    pub fn connected_closures(&self) -> Vec<ClosureId> {
        self.connections.lock().iter().map(|(_, c)| *c).collect()
    }

    /// Fire `signal` with the given payload slots.
    ///
    /// Slot 0 (the emitting instance) is prepended here; handlers run
    /// synchronously on the calling thread, in connection order.
    pub fn emit(&self, signal: &str, payload: &[Slot]) {
        let Some(spec) = self.descriptor.signal(signal) else {
            debug!(signal, type_name = self.descriptor.type_name, "emit of unknown signal");
            return;
        };

        let mut slots = Vec::with_capacity(payload.len() + 1);
        slots.push(Slot::object(self.handle()));
        slots.extend_from_slice(payload);

        // Snapshot the targets so a handler reconnecting mid-dispatch
        // cannot deadlock on the connection list.
        let targets: Vec<ClosureId> = self
            .connections
            .lock()
            .iter()
            .filter(|(id, _)| *id == spec.id)
            .map(|(_, closure)| *closure)
            .collect();

        for closure in targets {
            trampoline(closure, &slots);
        }
    }

    /// The engine's finalize notification for every closure this object
    /// holds: evicts their records from the bridge registry.
    pub fn finalize_closures(&self) {
        for (_, closure) in self.connections.lock().drain(..) {
            finalize(closure);
        }
    }
}
