//! Error types for the outcome core.
//!
//! # Design
//! `TransportError` is what a transport call raises. Most of its variants are
//! "recognized": the classifier folds them into an [`Outcome`](crate::Outcome).
//! The rest propagate unchanged through the calling convention's failure
//! channel, so programming errors are never masked as a network outcome.
//! `DeliveryError` is the only type that ever reaches such a channel.

use crate::http::HttpResponse;

/// Boxed error used for opaque causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures a transport call can raise instead of returning a response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The exchange completed, but the transport surfaced it as an error.
    /// The embedded response is classified like any other failed exchange.
    #[error("HTTP {}", .0.status)]
    Http(HttpResponse),

    /// Timeouts, resets, refused connections.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The peer sent something that is not a well-formed HTTP response.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The status line carried a code outside 100..=599.
    #[error("protocol violation: status code {0} is outside 100..=599")]
    InvalidStatus(u16),

    /// The call was already executed or enqueued.
    #[error("call already executed")]
    AlreadyExecuted,

    /// Anything the classifier does not know how to interpret.
    #[error(transparent)]
    Other(BoxError),
}

impl TransportError {
    /// Whether the classifier folds this failure into an outcome.
    pub fn is_recognized(&self) -> bool {
        matches!(
            self,
            TransportError::Http(_)
                | TransportError::Io(_)
                | TransportError::Protocol(_)
                | TransportError::InvalidStatus(_)
        )
    }

    /// True for I/O failures caused by a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Io(e) if e.kind() == std::io::ErrorKind::TimedOut)
    }
}

/// A failure delivered to a caller's failure channel.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// A transport failure the classifier does not recognize.
    #[error(transparent)]
    Unrecognized(TransportError),

    /// The caller's own outcome handler failed.
    #[error("outcome callback failed: {0}")]
    Callback(#[source] BoxError),

    /// The transport dropped the call without ever completing it.
    #[error("call was dropped before completing")]
    Abandoned,
}

/// Failures surfaced by an [`OutcomeStream`](crate::stream::OutcomeStream).
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// A single-value stream completed without producing a value.
    #[error("stream completed without a value")]
    NoElement,
}

/// A decoder could not produce a value from the body text.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Message(String),
}

/// Registry lookups and builds.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no adapter registered for return shape {0:?}")]
    Unsupported(crate::registry::ReturnShape),

    #[error("registry has no adapters enabled")]
    Empty,
}

/// Invalid configuration input.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}
