//! Handler representation and argument adaptation.
//!
//! Signals carry heterogeneous, event-specific argument vectors, so the
//! bridge accepts handlers of a small closed set of shapes: zero to
//! three parameters, each a type implementing [`FromValue`]. The shape
//! is resolved once at registration time into an erased [`Handler`]
//! record; no reflection happens at dispatch.

use signet_value::{Handle, Value};

/// Conversion from a decoded argument into a handler parameter type.
///
/// Adaptation is strict: a mismatch between the decoded value and the
/// declared parameter is a broken signal contract and panics inside the
/// trampoline (handler failures are not swallowed). `Value` itself
/// implements this as the identity for handlers that want the raw tree.
pub trait FromValue: Sized {
    /// Shape name used in adaptation diagnostics.
    const EXPECTS: &'static str;

    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTS: &'static str = "value";

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for String {
    const EXPECTS: &'static str = "string";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const EXPECTS: &'static str = "bool";

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    const EXPECTS: &'static str = "int";

    fn from_value(value: Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for u32 {
    const EXPECTS: &'static str = "uint";

    fn from_value(value: Value) -> Option<Self> {
        value.as_int().and_then(|x| Self::try_from(x).ok())
    }
}

impl FromValue for Vec<u8> {
    const EXPECTS: &'static str = "bytes";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl FromValue for Handle {
    const EXPECTS: &'static str = "handle";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Handle(handle) => Some(handle),
            _ => None,
        }
    }
}

fn adapt<A: FromValue>(value: Value) -> A {
    let shape = value.shape();
    A::from_value(value).unwrap_or_else(|| {
        panic!("cannot adapt decoded {shape} argument into {}", A::EXPECTS)
    })
}

/// An erased handler: declared parameter count plus an invoker that
/// adapts decoded arguments and calls the user function.
pub struct Handler {
    arity: usize,
    invoke: Box<dyn Fn(&[Value]) + Send + Sync>,
}

impl Handler {
    /// Number of parameters the handler declared at registration.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Invoke with exactly `arity` decoded arguments.
    pub fn invoke(&self, args: &[Value]) {
        (self.invoke)(args);
    }

    /// The empty-function placeholder used when a closure identity is no
    /// longer registered.
    pub(crate) fn noop() -> Self {
        Self {
            arity: 0,
            invoke: Box::new(|_| {}),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler").field("arity", &self.arity).finish()
    }
}

/// Conversion of a user function into an erased [`Handler`].
///
/// The marker parameter distinguishes the arities so the blanket impls
/// do not overlap; callers never name it.
pub trait IntoHandler<Marker> {
    fn into_handler(self) -> Handler;
}

impl<F> IntoHandler<()> for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn into_handler(self) -> Handler {
        Handler {
            arity: 0,
            invoke: Box::new(move |_| self()),
        }
    }
}

impl<F, A> IntoHandler<(A,)> for F
where
    F: Fn(A) + Send + Sync + 'static,
    A: FromValue + 'static,
{
    fn into_handler(self) -> Handler {
        Handler {
            arity: 1,
            invoke: Box::new(move |args| self(adapt::<A>(args[0].clone()))),
        }
    }
}

impl<F, A, B> IntoHandler<(A, B)> for F
where
    F: Fn(A, B) + Send + Sync + 'static,
    A: FromValue + 'static,
    B: FromValue + 'static,
{
    fn into_handler(self) -> Handler {
        Handler {
            arity: 2,
            invoke: Box::new(move |args| {
                self(adapt::<A>(args[0].clone()), adapt::<B>(args[1].clone()));
            }),
        }
    }
}

impl<F, A, B, C> IntoHandler<(A, B, C)> for F
where
    F: Fn(A, B, C) + Send + Sync + 'static,
    A: FromValue + 'static,
    B: FromValue + 'static,
    C: FromValue + 'static,
{
    fn into_handler(self) -> Handler {
        Handler {
            arity: 3,
            invoke: Box::new(move |args| {
                self(
                    adapt::<A>(args[0].clone()),
                    adapt::<B>(args[1].clone()),
                    adapt::<C>(args[2].clone()),
                );
            }),
        }
    }
}
