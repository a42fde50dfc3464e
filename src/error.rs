//! Error types for the managed server.

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Boxed error returned by initialization hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by [`ManagedServer`](crate::ManagedServer) operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The initialization hook failed. Displayed exactly as the hook's error.
    #[error(transparent)]
    Initializer(BoxError),

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Binding the configured address failed.
    #[error("failed to bind {address}: {}", describe_bind_error(.source))]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The pre-bound listener could not be handed to the engine.
    #[error("failed to adopt listener: {0}")]
    Listener(#[source] std::io::Error),

    /// The engine stopped serving with an error.
    #[error("server terminated: {0}")]
    Serve(#[source] std::io::Error),

    /// The server is not accepting connections.
    #[error("service is not ready")]
    NotReady,

    /// `listen` was called while another call is starting or serving.
    #[error("server is already listening")]
    AlreadyListening,

    /// The server has been closed and cannot be started again.
    #[error("server is closed")]
    Closed,

    /// In-flight connections outlived the grace period and were aborted.
    #[error("graceful shutdown exceeded {0:?}; open connections were aborted")]
    ShutdownTimeout(Duration),
}

/// Callers match bind failures on the lowercase phrase, whatever the OS says.
fn describe_bind_error(source: &std::io::Error) -> String {
    match source.kind() {
        std::io::ErrorKind::AddrInUse => format!("address already in use ({source})"),
        _ => source.to_string(),
    }
}

impl ServerError {
    /// Returns the hook's original error if this is an initializer failure.
    pub fn into_initializer_error(self) -> Result<BoxError, Self> {
        match self {
            ServerError::Initializer(e) => Ok(e),
            other => Err(other),
        }
    }

    /// Whether this is the readiness sentinel.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, ServerError::NotReady)
    }
}
