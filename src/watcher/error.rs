//! Error types for the read-watch system.

use thiserror::Error;

/// Error payload carried by aborting and failing handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of an intercepted read, surfaced to the reader.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The matched handler returned `Abort`; the read produced no value.
    #[error("Read aborted by handler '{handler}': {source}")]
    Aborted {
        handler: String,
        #[source]
        source: BoxError,
    },

    /// The matched handler failed without producing an outcome.
    #[error("Handler '{handler}' failed: {source}")]
    HandlerFault {
        handler: String,
        #[source]
        source: BoxError,
    },
}

impl ReadError {
    /// Name of the handler responsible for the failure.
    pub fn handler(&self) -> &str {
        match self {
            ReadError::Aborted { handler, .. } | ReadError::HandlerFault { handler, .. } => {
                handler
            }
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, ReadError::Aborted { .. })
    }

    /// The handler-supplied error payload.
    pub fn payload(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        match self {
            ReadError::Aborted { source, .. } | ReadError::HandlerFault { source, .. } => {
                source.as_ref()
            }
        }
    }
}

/// Errors from configuring the watch system.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to load config: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Failed to save config: {reason}")]
    Save { reason: String },
}

/// Plain-message error used by handlers that abort with text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct AccessDenied(pub String);
