//! Outcome classification.
//!
//! # Design
//! Classification is a pure decision over a buffered exchange: the body text
//! was read once by the transport, and every branch below decodes from that
//! same `String`. Nothing here blocks or holds shared mutable state, so a
//! `Classifier` can run concurrently on any transport worker thread.
//!
//! Decision table for a completed exchange:
//!
//! | status        | success decode | fallback | error decode | outcome                         |
//! |---------------|----------------|----------|--------------|---------------------------------|
//! | < 100, > 599  | -              | -        | -            | `NetworkError(InvalidStatus)`   |
//! | 2xx           | ok             | -        | -            | `Success(Some)`                 |
//! | 2xx           | fails          | on       | ok           | `ServerError(Some, status, raw)`|
//! | 2xx           | fails          | on       | fails        | `Success(None)`                 |
//! | 2xx           | fails          | off      | -            | `Success(None)`                 |
//! | other, empty  | -              | -        | -            | `ServerError(None, status, "")` |
//! | other         | -              | -        | ok / fails   | `ServerError(Some/None, ..)`    |

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::ClassifierConfig;
use crate::decode::{Decoder, JsonDecoder};
use crate::error::TransportError;
use crate::http::{is_success_status, is_valid_status, HttpResponse};
use crate::outcome::Outcome;

/// Classify a transport result.
///
/// Returns `Err` only for transport failures outside the recognized set;
/// those are handed back unchanged.
pub fn classify<S, E, DS, DE>(
    result: Result<HttpResponse, TransportError>,
    success: &DS,
    error: &DE,
    config: ClassifierConfig,
) -> Result<Outcome<S, E>, TransportError>
where
    DS: Decoder<S> + ?Sized,
    DE: Decoder<E> + ?Sized,
{
    match result {
        Ok(response) => Ok(classify_response(response, success, error, config)),
        Err(failure) => classify_failure(failure, error),
    }
}

/// Classify a completed exchange.
pub fn classify_response<S, E, DS, DE>(
    response: HttpResponse,
    success: &DS,
    error: &DE,
    config: ClassifierConfig,
) -> Outcome<S, E>
where
    DS: Decoder<S> + ?Sized,
    DE: Decoder<E> + ?Sized,
{
    let HttpResponse { status, headers, body } = response;
    if !is_valid_status(status) {
        tracing::debug!(status, "status outside 100..=599, classifying as network error");
        return Outcome::NetworkError(TransportError::InvalidStatus(status));
    }
    if is_success_status(status) {
        successful_exchange(status, headers, body, success, error, config)
    } else {
        failed_exchange(status, headers, body, error)
    }
}

/// Classify a transport failure.
///
/// An exchange the transport raised as an error re-enters the failed-exchange
/// branch; I/O and protocol failures become `NetworkError` holding the
/// original value; everything else is returned as `Err` untouched.
pub fn classify_failure<S, E, DE>(
    failure: TransportError,
    error: &DE,
) -> Result<Outcome<S, E>, TransportError>
where
    DE: Decoder<E> + ?Sized,
{
    match failure {
        TransportError::Http(response) => {
            let HttpResponse { status, headers, body } = response;
            if !is_valid_status(status) {
                tracing::debug!(status, "wrapped response has invalid status");
                return Ok(Outcome::NetworkError(TransportError::InvalidStatus(status)));
            }
            tracing::debug!(status, "unwrapping HTTP failure raised by transport");
            Ok(failed_exchange(status, headers, body, error))
        }
        failure if failure.is_recognized() => {
            tracing::debug!(error = %failure, "transport failure classified as network error");
            Ok(Outcome::NetworkError(failure))
        }
        failure => {
            tracing::warn!(error = %failure, "unrecognized transport failure, propagating");
            Err(failure)
        }
    }
}

fn successful_exchange<S, E, DS, DE>(
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
    success: &DS,
    error: &DE,
    config: ClassifierConfig,
) -> Outcome<S, E>
where
    DS: Decoder<S> + ?Sized,
    DE: Decoder<E> + ?Sized,
{
    let decode_failure = match success.decode(&body) {
        Ok(value) => {
            tracing::trace!(status, "decoded success body");
            return Outcome::Success { body: Some(value) };
        }
        Err(e) => e,
    };

    if !config.fallback_to_error_on_unparsed_success {
        tracing::debug!(status, error = %decode_failure, "success body did not decode, fallback disabled");
        return Outcome::Success { body: None };
    }

    match error.decode(&body) {
        Ok(value) => {
            tracing::debug!(status, "success status carried an error-shaped body");
            Outcome::ServerError {
                body: Some(value),
                status,
                raw_body: body,
                headers,
            }
        }
        Err(_) => {
            tracing::debug!(status, body_len = body.len(), "neither decoder matched a success body");
            Outcome::Success { body: None }
        }
    }
}

fn failed_exchange<S, E, DE>(
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
    error: &DE,
) -> Outcome<S, E>
where
    DE: Decoder<E> + ?Sized,
{
    if body.is_empty() {
        tracing::debug!(status, "failed exchange with empty body");
        return Outcome::ServerError {
            body: None,
            status,
            raw_body: body,
            headers,
        };
    }
    let decoded = match error.decode(&body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(status, error = %e, "error body did not decode");
            None
        }
    };
    Outcome::ServerError {
        body: decoded,
        status,
        raw_body: body,
        headers,
    }
}

/// Both decoders and the policy for one declared endpoint.
///
/// Cloning shares the decoders; they are immutable.
pub struct Classifier<S, E> {
    success: Arc<dyn Decoder<S>>,
    error: Arc<dyn Decoder<E>>,
    config: ClassifierConfig,
}

impl<S, E> Classifier<S, E> {
    pub fn new(
        success: impl Decoder<S> + 'static,
        error: impl Decoder<E> + 'static,
        config: ClassifierConfig,
    ) -> Self {
        Self::from_shared(Arc::new(success), Arc::new(error), config)
    }

    pub fn from_shared(
        success: Arc<dyn Decoder<S>>,
        error: Arc<dyn Decoder<E>>,
        config: ClassifierConfig,
    ) -> Self {
        Self {
            success,
            error,
            config,
        }
    }

    pub fn config(&self) -> ClassifierConfig {
        self.config
    }

    pub fn classify(&self, result: Result<HttpResponse, TransportError>) -> Result<Outcome<S, E>, TransportError> {
        classify(result, &*self.success, &*self.error, self.config)
    }

    pub fn classify_response(&self, response: HttpResponse) -> Outcome<S, E> {
        classify_response(response, &*self.success, &*self.error, self.config)
    }

    pub fn classify_failure(&self, failure: TransportError) -> Result<Outcome<S, E>, TransportError> {
        classify_failure(failure, &*self.error)
    }
}

impl<S, E> Classifier<S, E>
where
    S: DeserializeOwned + 'static,
    E: DeserializeOwned + 'static,
{
    /// Classifier with JSON decoders for both shapes.
    pub fn json(config: ClassifierConfig) -> Self {
        Self::new(JsonDecoder::<S>::new(), JsonDecoder::<E>::new(), config)
    }
}

impl<S, E> Clone for Classifier<S, E> {
    fn clone(&self) -> Self {
        Self {
            success: Arc::clone(&self.success),
            error: Arc::clone(&self.error),
            config: self.config,
        }
    }
}

impl<S, E> fmt::Debug for Classifier<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier").field("config", &self.config).finish_non_exhaustive()
    }
}
