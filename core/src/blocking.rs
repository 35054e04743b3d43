//! Blocking adapter.
//!
//! Wraps a transport [`Call`] so `execute` returns an [`Outcome`] inside a
//! response envelope instead of a raw response or a transport error. The
//! envelope keeps the original status and headers when the exchange was
//! 2xx; otherwise it is a bare 200, and the outcome carries the real
//! status and headers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::call::Call;
use crate::classify::Classifier;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Response};
use crate::outcome::Outcome;

/// A call whose result is an [`Outcome`].
pub struct BlockingOutcomeCall<S, E> {
    pub(crate) call: Box<dyn Call>,
    pub(crate) classifier: Classifier<S, E>,
    claimed: AtomicBool,
}

impl<S, E> BlockingOutcomeCall<S, E> {
    pub fn new(call: Box<dyn Call>, classifier: Classifier<S, E>) -> Self {
        Self {
            call,
            classifier,
            claimed: AtomicBool::new(false),
        }
    }

    /// Run the exchange and classify it.
    ///
    /// Only unrecognized transport failures come back as `Err`, unchanged.
    pub fn execute(&self) -> Result<Response<Outcome<S, E>>, TransportError> {
        self.claim()?;
        let result = self.call.execute();
        envelope(&self.classifier, result)
    }

    /// Each instance classifies at most one attempt.
    pub(crate) fn claim(&self) -> Result<(), TransportError> {
        if self.claimed.swap(true, Ordering::SeqCst) {
            tracing::warn!(path = %self.call.request().path, "call reused after execution");
            return Err(TransportError::AlreadyExecuted);
        }
        Ok(())
    }

    pub fn cancel(&self) {
        self.call.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.call.is_canceled()
    }

    pub fn is_executed(&self) -> bool {
        self.call.is_executed()
    }

    pub fn request(&self) -> &HttpRequest {
        self.call.request()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.call.timeout()
    }

    pub fn classifier(&self) -> &Classifier<S, E> {
        &self.classifier
    }
}

impl<S, E> Clone for BlockingOutcomeCall<S, E> {
    /// A new adapter over a clone of the transport call, sharing decoders.
    fn clone(&self) -> Self {
        Self::new(self.call.clone_call(), self.classifier.clone())
    }
}

impl<S, E> fmt::Debug for BlockingOutcomeCall<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingOutcomeCall")
            .field("request", self.call.request())
            .field("classifier", &self.classifier)
            .finish()
    }
}

/// Classify a transport result and wrap it in the adapter envelope.
pub(crate) fn envelope<S, E>(
    classifier: &Classifier<S, E>,
    result: Result<HttpResponse, TransportError>,
) -> Result<Response<Outcome<S, E>>, TransportError> {
    match result {
        Ok(response) if response.is_successful() => {
            let status = response.status;
            let headers = response.headers.clone();
            let outcome = classifier.classify_response(response);
            Ok(Response {
                status,
                headers,
                body: outcome,
            })
        }
        Ok(response) => Ok(Response::new(200, classifier.classify_response(response))),
        Err(failure) => Ok(Response::new(200, classifier.classify_failure(failure)?)),
    }
}
