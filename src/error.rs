use thiserror::Error;

/// Top-level error for binding operations.
///
/// Diagnostics coming back from the engine are all wrapped into the
/// single [`Error::Foreign`] kind carrying the engine's message; they are
/// always returned to the caller, never discarded.
#[derive(Debug, Error)]
pub enum Error {
    #[error("engine error: {message}")]
    Foreign { message: String },

    #[error(transparent)]
    Encode(#[from] signet_value::EncodeError),

    #[error(transparent)]
    Rpc(#[from] signet_rpc::RpcError),
}

impl Error {
    /// Wrap a diagnostic message reported by the engine.
    pub fn foreign(message: impl Into<String>) -> Self {
        Self::Foreign {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
