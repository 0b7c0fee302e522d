use serialterm_transport::{ConfigError, TransportError};

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Connection settings failed validation. Nothing was opened.
    #[error("invalid connection settings: {0}")]
    Config(#[from] ConfigError),

    /// Transport-level error while opening or writing.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// `open` was called while a port is already open.
    #[error("port {0} is already open")]
    AlreadyConnected(String),

    /// The operation needs an open connection.
    #[error("not connected")]
    NotConnected,

    /// Releasing the transport failed. The session is disconnected anyway.
    #[error("failed to release {port}: {source}")]
    Close {
        port: String,
        source: TransportError,
    },

    /// The shutdown hook has run; the session cannot be reopened.
    #[error("session has been shut down")]
    ShutDown,
}

pub type Result<T> = std::result::Result<T, SessionError>;
