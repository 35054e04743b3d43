//! The three-way result of one request attempt.
//!
//! # Design
//! `Outcome` is a closed enum so every consumer matches exhaustively. It owns
//! plain data only: decoded bodies, the status code, and the buffered body
//! text. No transport handle survives into it.

use crate::error::TransportError;

/// Result of a request attempt. Exactly one variant per attempt.
#[derive(Debug)]
pub enum Outcome<S, E> {
    /// 2xx with a decoded success body, or 2xx that nothing could decode
    /// when the fallback does not apply (`body` is `None`).
    Success { body: Option<S> },

    /// The server answered but said no, or answered 2xx with an error-shaped
    /// body. `status` is always within 100..=599 and `raw_body` is the exact
    /// text the decoders saw (empty string for an empty body). `headers`
    /// are the response headers exactly as the transport reported them.
    ServerError {
        body: Option<E>,
        status: u16,
        raw_body: String,
        headers: Vec<(String, String)>,
    },

    /// No interpretable HTTP response exists.
    NetworkError(TransportError),
}

impl<S, E> Outcome<S, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Outcome::ServerError { .. })
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, Outcome::NetworkError(_))
    }

    /// Status of a server error. Success outcomes do not keep theirs; the
    /// adapter envelope carries it.
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Outcome::ServerError { raw_body, .. } => Some(raw_body),
            _ => None,
        }
    }

    /// Case-insensitive lookup in a server error's response headers.
    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            Outcome::ServerError { headers, .. } => headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn success_body(&self) -> Option<&S> {
        match self {
            Outcome::Success { body } => body.as_ref(),
            _ => None,
        }
    }

    pub fn error_body(&self) -> Option<&E> {
        match self {
            Outcome::ServerError { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    pub fn network_error(&self) -> Option<&TransportError> {
        match self {
            Outcome::NetworkError(cause) => Some(cause),
            _ => None,
        }
    }

    /// Collapse into a `Result`, keeping the failure side intact.
    pub fn into_result(self) -> Result<Option<S>, Outcome<S, E>> {
        match self {
            Outcome::Success { body } => Ok(body),
            other => Err(other),
        }
    }
}
