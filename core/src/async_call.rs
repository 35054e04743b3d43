//! Callback-based adapter.
//!
//! # Design
//! `OutcomeCall` registers its own transport [`Callback`] and classifies
//! inside it, so classification runs on whichever thread the transport uses
//! to complete the call (usually a transport worker, never the caller's
//! thread). The caller's [`OutcomeCallback`] is invoked from that same
//! thread, with one exception: an `enqueue` on an instance that was already
//! executed or enqueued never reaches the transport, so its
//! `AlreadyExecuted` rejection is delivered on the calling thread before
//! `enqueue` returns.
//!
//! Recognized failures are delivered through `on_outcome` like any other
//! outcome. `on_unrecognized_failure` only sees unrecognized transport
//! failures and errors returned by the caller's own `on_outcome`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::channel::oneshot;

use crate::blocking::{envelope, BlockingOutcomeCall};
use crate::call::{Call, Callback};
use crate::classify::Classifier;
use crate::error::{BoxError, DeliveryError, TransportError};
use crate::http::{HttpRequest, HttpResponse, Response};
use crate::outcome::Outcome;

/// Completion interface for [`OutcomeCall::enqueue`].
///
/// Each method runs at most once per attempt, on the transport's thread.
pub trait OutcomeCallback<S, E>: Send {
    /// Receives the classified outcome. Returning `Err` routes the error to
    /// `on_unrecognized_failure`.
    fn on_outcome(&mut self, response: Response<Outcome<S, E>>) -> Result<(), BoxError>;

    fn on_unrecognized_failure(&mut self, error: DeliveryError);
}

/// A call that delivers an [`Outcome`] through a callback, a future, or a
/// blocking `execute`. One attempt per instance; use `clone` to go again.
pub struct OutcomeCall<S, E> {
    inner: BlockingOutcomeCall<S, E>,
}

pub(crate) type Delivery<S, E> = Result<Response<Outcome<S, E>>, DeliveryError>;

impl<S, E> OutcomeCall<S, E>
where
    S: 'static,
    E: 'static,
{
    pub fn new(call: Box<dyn Call>, classifier: Classifier<S, E>) -> Self {
        Self {
            inner: BlockingOutcomeCall::new(call, classifier),
        }
    }

    /// Start the exchange; `callback` hears about it on the transport thread.
    ///
    /// A repeated `enqueue` is rejected synchronously on the calling thread.
    pub fn enqueue(&self, mut callback: Box<dyn OutcomeCallback<S, E>>) {
        if let Err(e) = self.inner.claim() {
            callback.on_unrecognized_failure(DeliveryError::Unrecognized(e));
            return;
        }
        tracing::debug!(path = %self.request().path, "enqueueing call");
        self.inner.call.enqueue(Box::new(Forward {
            classifier: self.inner.classifier.clone(),
            callback,
        }));
    }

    /// Blocking variant. Shares the single-attempt guard with `enqueue`.
    pub fn execute(&self) -> Result<Response<Outcome<S, E>>, TransportError> {
        self.inner.execute()
    }

    /// Enqueue now and await the outcome. Dropping the future before it
    /// resolves cancels the call.
    pub fn outcome(self) -> OutcomeFuture<S, E>
    where
        S: Send,
        E: Send,
    {
        let rx = self.enqueue_channel();
        OutcomeFuture {
            call: self,
            rx,
            done: false,
        }
    }

    pub(crate) fn enqueue_channel(&self) -> oneshot::Receiver<Delivery<S, E>>
    where
        S: Send,
        E: Send,
    {
        let (tx, rx) = oneshot::channel();
        self.enqueue(Box::new(ChannelCallback { tx: Some(tx) }));
        rx
    }
}

impl<S, E> OutcomeCall<S, E> {
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.inner.is_canceled()
    }

    pub fn is_executed(&self) -> bool {
        self.inner.is_executed()
    }

    pub fn request(&self) -> &HttpRequest {
        self.inner.request()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.inner.timeout()
    }

    pub fn classifier(&self) -> &Classifier<S, E> {
        self.inner.classifier()
    }
}

impl<S, E> Clone for OutcomeCall<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, E> fmt::Debug for OutcomeCall<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeCall").field("inner", &self.inner).finish()
    }
}

/// Transport callback that classifies and forwards.
struct Forward<S, E> {
    classifier: Classifier<S, E>,
    callback: Box<dyn OutcomeCallback<S, E>>,
}

impl<S, E> Forward<S, E> {
    fn deliver(self, result: Result<HttpResponse, TransportError>) {
        let Forward {
            classifier,
            mut callback,
        } = self;
        match envelope(&classifier, result) {
            Ok(response) => {
                if let Err(e) = callback.on_outcome(response) {
                    tracing::warn!(error = %e, "outcome callback failed, forwarding to failure handler");
                    callback.on_unrecognized_failure(DeliveryError::Callback(e));
                }
            }
            Err(unrecognized) => callback.on_unrecognized_failure(DeliveryError::Unrecognized(unrecognized)),
        }
    }
}

impl<S: 'static, E: 'static> Callback for Forward<S, E> {
    fn on_response(self: Box<Self>, response: HttpResponse) {
        tracing::trace!(status = response.status, "transport completed");
        self.deliver(Ok(response));
    }

    fn on_failure(self: Box<Self>, error: TransportError) {
        tracing::trace!(error = %error, "transport failed");
        self.deliver(Err(error));
    }
}

/// Forwards the single delivery into a oneshot channel.
struct ChannelCallback<S, E> {
    tx: Option<oneshot::Sender<Delivery<S, E>>>,
}

impl<S: Send, E: Send> ChannelCallback<S, E> {
    fn send(&mut self, delivery: Delivery<S, E>) {
        if let Some(tx) = self.tx.take() {
            // The receiver may already be gone; nothing is waiting then.
            let _ = tx.send(delivery);
        }
    }
}

impl<S: Send, E: Send> OutcomeCallback<S, E> for ChannelCallback<S, E> {
    fn on_outcome(&mut self, response: Response<Outcome<S, E>>) -> Result<(), BoxError> {
        self.send(Ok(response));
        Ok(())
    }

    fn on_unrecognized_failure(&mut self, error: DeliveryError) {
        self.send(Err(error));
    }
}

/// Resolves to the outcome of an enqueued [`OutcomeCall`].
pub struct OutcomeFuture<S, E> {
    call: OutcomeCall<S, E>,
    rx: oneshot::Receiver<Delivery<S, E>>,
    done: bool,
}

// No field is structurally pinned.
impl<S, E> Unpin for OutcomeFuture<S, E> {}

impl<S, E> OutcomeFuture<S, E> {
    pub fn request(&self) -> &HttpRequest {
        self.call.request()
    }
}

impl<S, E> fmt::Debug for OutcomeFuture<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeFuture")
            .field("request", &self.call.request().path)
            .field("done", &self.done)
            .finish()
    }
}

impl<S, E> Future for OutcomeFuture<S, E> {
    type Output = Result<Outcome<S, E>, DeliveryError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(delivery)) => {
                this.done = true;
                Poll::Ready(delivery.map(|response| response.body))
            }
            Poll::Ready(Err(oneshot::Canceled)) => {
                this.done = true;
                Poll::Ready(Err(DeliveryError::Abandoned))
            }
        }
    }
}

impl<S, E> Drop for OutcomeFuture<S, E> {
    fn drop(&mut self) {
        if !self.done {
            tracing::debug!(path = %self.call.request().path, "outcome future dropped, canceling call");
            self.call.cancel();
        }
    }
}
