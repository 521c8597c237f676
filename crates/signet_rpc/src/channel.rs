//! The call/response correlator and message router.

use std::sync::Arc;

use ahash::AHashMap;
use crossbeam_channel::{Receiver, Sender, bounded, select};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use signet_bridge::{ForeignObject, connect};
use signet_value::Value;

use crate::wire;

#[derive(Debug, Error)]
pub enum RpcError {
    /// The caller cancelled the wait; the in-flight operation is not
    /// stopped, and its eventual response is drained in the background.
    #[error("call cancelled")]
    Cancelled,
    /// The channel tore down before the call was fulfilled.
    #[error("response channel closed before fulfillment")]
    ChannelClosed,
    /// An argument shape the message channel cannot carry.
    #[error("argument type \"{0}\" cannot be sent over the message channel")]
    UnsupportedArgument(&'static str),
}

/// Outbound half of the engine's general message channel: a (string
/// payload, optional byte buffer) pair handed to the engine's post
/// primitive. The engine glue implements this.
pub trait MessagePost: Send + Sync {
    fn post(&self, payload: &str, data: Option<&[u8]>);
}

type UserHandler = Arc<dyn Fn(&str, &[u8]) + Send + Sync>;

struct Shared {
    post: Box<dyn MessagePost>,
    pending: Mutex<AHashMap<String, Sender<Value>>>,
    user_handler: Mutex<Option<UserHandler>>,
}

impl Shared {
    /// Inspect one inbound message: correlate protocol messages, forward
    /// the rest.
    ///
    /// # Panics
    ///
    /// On a protocol-marked message that is malformed or whose call id
    /// has no pending entry. Both indicate a bridge bug or a protocol
    /// desync; dropping them silently would hang the original caller
    /// forever.
    fn route(&self, message: &str, data: &[u8]) {
        if message.contains(wire::PROTOCOL_MARKER) {
            let Some((id, result)) = wire::parse_protocol_message(message) else {
                panic!("malformed rpc protocol message: {message}");
            };
            let Some(sender) = self.pending.lock().remove(&id) else {
                panic!("rpc call id {id} has no pending entry (protocol desync)");
            };
            if sender.send(result).is_err() {
                // Caller cancelled; the response is consumed here so the
                // engine's every-call-gets-drained assumption holds.
                debug!(%id, "late rpc response drained");
            }
            return;
        }

        let handler = self.user_handler.lock().clone();
        if let Some(handler) = handler {
            handler(message, data);
        }
    }
}

/// A correlating view over one object's message channel.
///
/// Exported-function calls issued here are posted as protocol envelopes;
/// [`RpcChannel::attach`] wires the inbound router onto the object's
/// `"message"` signal so responses are matched back to their callers and
/// ordinary messages reach the handler installed via
/// [`RpcChannel::on_message`].
pub struct RpcChannel {
    shared: Arc<Shared>,
}

impl RpcChannel {
    pub fn new(post: impl MessagePost + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                post: Box::new(post),
                pending: Mutex::new(AHashMap::new()),
                user_handler: Mutex::new(None),
            }),
        }
    }

    /// Connect the inbound router to `obj`'s `"message"` signal.
    pub fn attach(&self, obj: &ForeignObject) {
        let shared = Arc::clone(&self.shared);
        connect(obj, "message", move |message: String, data: Vec<u8>| {
            shared.route(&message, &data);
        });
    }

    /// Install the handler that receives every non-protocol message.
    pub fn on_message(&self, handler: impl Fn(&str, &[u8]) + Send + Sync + 'static) {
        *self.shared.user_handler.lock() = Some(Arc::new(handler));
    }

    /// Call an exported function and block until the correlated response
    /// arrives.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, RpcError> {
        let response = self.issue(name, args)?;
        response.recv().map_err(|_| RpcError::ChannelClosed)
    }

    /// Like [`RpcChannel::call`], but the wait can be interrupted.
    ///
    /// Cancellation is cooperative: the waiting caller unblocks with
    /// [`RpcError::Cancelled`] immediately, the in-flight operation keeps
    /// running, and its eventual response is drained without being
    /// delivered to anyone.
    pub fn call_cancellable(
        &self,
        name: &str,
        args: &[Value],
        cancellation: &Cancellation,
    ) -> Result<Value, RpcError> {
        let response = self.issue(name, args)?;
        select! {
            recv(response) -> result => result.map_err(|_| RpcError::ChannelClosed),
            recv(cancellation.cancelled()) -> _ => Err(RpcError::Cancelled),
        }
    }

    fn issue(&self, name: &str, args: &[Value]) -> Result<Receiver<Value>, RpcError> {
        let id = wire::new_call_id();
        let payload = wire::build_envelope(&id, name, args)?;

        // The entry must exist before the post goes out: a fast response
        // may arrive before this thread resumes.
        let (tx, rx) = bounded(1);
        self.shared.pending.lock().insert(id, tx);
        self.shared.post.post(&payload, None);
        Ok(rx)
    }
}

struct CancellationInner {
    // Dropping the sender disconnects every waiter at once.
    armed: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

/// Cooperative cancellation signal for [`RpcChannel::call_cancellable`].
/// Cloneable; cancelling any clone releases every wait observing it.
#[derive(Clone)]
pub struct Cancellation {
    inner: Arc<CancellationInner>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self {
            inner: Arc::new(CancellationInner {
                armed: Mutex::new(Some(tx)),
                signal: rx,
            }),
        }
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.armed.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.armed.lock().is_none()
    }

    fn cancelled(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_bridge::{Slot, TypeDescriptor};
    use std::thread;
    use std::time::Duration;

    fn script_object() -> Arc<ForeignObject> {
        let descriptor = Arc::new(
            TypeDescriptor::new("Script")
                .with_signal("destroyed", 0)
                .with_signal("message", 2),
        );
        Arc::new(ForeignObject::new(descriptor))
    }

    /// Captures outbound envelopes for the test to respond to.
    struct CapturePost(Arc<Mutex<Vec<String>>>);

    impl MessagePost for CapturePost {
        fn post(&self, payload: &str, _data: Option<&[u8]>) {
            self.0.lock().push(payload.to_string());
        }
    }

    fn posted_call_id(payload: &str) -> String {
        let json: serde_json::Value = serde_json::from_str(payload).unwrap();
        json[1].as_str().unwrap().to_string()
    }

    fn respond(obj: &ForeignObject, id: &str, result: &str) {
        let message = format!("[\"{}\", \"{id}\", \"ok\", {result}]", wire::PROTOCOL_MARKER);
        obj.emit("message", &[Slot::string(message), Slot::bytes(Vec::new())]);
    }

    fn wait_for_posts(posts: &Mutex<Vec<String>>, count: usize) -> Vec<String> {
        for _ in 0..200 {
            {
                let seen = posts.lock();
                if seen.len() >= count {
                    return seen.clone();
                }
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("expected {count} posted envelopes");
    }

    /// An engine stand-in that answers "add" calls synchronously from
    /// inside the post primitive.
    struct AddResponder(Arc<ForeignObject>);

    impl MessagePost for AddResponder {
        fn post(&self, payload: &str, _data: Option<&[u8]>) {
            let json: serde_json::Value = serde_json::from_str(payload).unwrap();
            assert_eq!(json[3], "add");
            let sum: i64 = json[4]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_i64().unwrap())
                .sum();
            respond(&self.0, json[1].as_str().unwrap(), &sum.to_string());
        }
    }

    #[test]
    fn test_call_correlates_response() {
        let obj = script_object();
        let channel = RpcChannel::new(AddResponder(Arc::clone(&obj)));
        channel.attach(&obj);

        let result = channel.call("add", &[Value::Int(1), Value::Int(2)]).unwrap();
        assert_eq!(result, Value::Int(3));
    }

    #[test]
    fn test_response_with_other_id_leaves_call_pending() {
        let obj = script_object();
        let posts = Arc::new(Mutex::new(Vec::new()));
        let channel = Arc::new(RpcChannel::new(CapturePost(Arc::clone(&posts))));
        channel.attach(&obj);

        let (done_tx, done_rx) = bounded(2);
        for name in ["first", "second"] {
            let channel = Arc::clone(&channel);
            let done = done_tx.clone();
            thread::spawn(move || {
                let result = channel.call(name, &[]).unwrap();
                done.send((name, result)).unwrap();
            });
        }

        let envelopes = wait_for_posts(&posts, 2);
        let ids: Vec<String> = envelopes.iter().map(|p| posted_call_id(p)).collect();

        respond(&obj, &ids[1], "\"two\"");
        let (_, result) = done_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(result, Value::Str("two".into()));
        // The other call is still waiting.
        assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());

        respond(&obj, &ids[0], "\"one\"");
        let (_, result) = done_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(result, Value::Str("one".into()));
    }

    #[test]
    fn test_cancellation_unblocks_and_drains_late_response() {
        let obj = script_object();
        let posts = Arc::new(Mutex::new(Vec::new()));
        let channel = Arc::new(RpcChannel::new(CapturePost(Arc::clone(&posts))));
        channel.attach(&obj);

        let forwarded = Arc::new(Mutex::new(0_usize));
        let count = Arc::clone(&forwarded);
        channel.on_message(move |_, _| *count.lock() += 1);

        let cancellation = Cancellation::new();
        let (done_tx, done_rx) = bounded(1);
        {
            let channel = Arc::clone(&channel);
            let cancellation = cancellation.clone();
            thread::spawn(move || {
                done_tx
                    .send(channel.call_cancellable("slow", &[], &cancellation))
                    .unwrap();
            });
        }

        let envelopes = wait_for_posts(&posts, 1);
        cancellation.cancel();
        let result = done_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(result, Err(RpcError::Cancelled)));
        assert!(cancellation.is_cancelled());

        // The late response is consumed without error and without being
        // delivered to the user handler.
        respond(&obj, &posted_call_id(&envelopes[0]), "null");
        assert_eq!(*forwarded.lock(), 0);
    }

    #[test]
    fn test_non_protocol_messages_are_forwarded() {
        let obj = script_object();
        let channel = RpcChannel::new(CapturePost(Arc::new(Mutex::new(Vec::new()))));
        channel.attach(&obj);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        channel.on_message(move |message, data| {
            sink.lock().push((message.to_string(), data.to_vec()));
        });

        obj.emit(
            "message",
            &[Slot::string("{\"type\":\"log\"}"), Slot::bytes(vec![9])],
        );

        let seen = seen.lock();
        assert_eq!(seen[0], ("{\"type\":\"log\"}".to_string(), vec![9]));
    }

    #[test]
    #[should_panic(expected = "no pending entry")]
    fn test_unknown_call_id_is_a_protocol_violation() {
        let obj = script_object();
        let channel = RpcChannel::new(CapturePost(Arc::new(Mutex::new(Vec::new()))));
        channel.attach(&obj);
        respond(&obj, "never-issued-id16", "1");
    }
}
