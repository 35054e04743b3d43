//! Push-based stream adapter.
//!
//! An `OutcomeStream` enqueues its [`OutcomeCall`] on creation and yields at
//! most one item. The [`Cardinality`] only decides what happens when the
//! call finishes without delivering anything; outcomes pass through as-is.
//!
//! | cardinality | completes without a value      |
//! |-------------|--------------------------------|
//! | `Unbounded` | stream ends                    |
//! | `Latest`    | stream ends                    |
//! | `Single`    | `Err(StreamError::NoElement)`  |
//! | `Maybe`     | stream ends                    |
//!
//! `Latest` keeps only the newest value under overproduction. A call never
//! produces more than one value, so it behaves like `Unbounded`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::stream::{FusedStream, Stream};

use crate::async_call::{Delivery, OutcomeCall};
use crate::error::StreamError;
use crate::outcome::Outcome;

/// Emission contract requested by the declared return shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Pass every value through.
    Unbounded,
    /// Drop all but the most recent value when the consumer lags.
    Latest,
    /// Exactly one value; finishing empty is an error.
    Single,
    /// Zero or one value; finishing empty is normal.
    Maybe,
}

/// Stream of the single outcome of one call.
pub struct OutcomeStream<S, E> {
    call: OutcomeCall<S, E>,
    rx: Option<oneshot::Receiver<Delivery<S, E>>>,
    cardinality: Cardinality,
}

// No field is structurally pinned.
impl<S, E> Unpin for OutcomeStream<S, E> {}

impl<S, E> OutcomeStream<S, E>
where
    S: Send + 'static,
    E: Send + 'static,
{
    pub fn new(call: OutcomeCall<S, E>, cardinality: Cardinality) -> Self {
        let rx = call.enqueue_channel();
        Self {
            call,
            rx: Some(rx),
            cardinality,
        }
    }
}

impl<S, E> OutcomeStream<S, E> {
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Cancel the underlying call. Has no effect once an outcome exists.
    pub fn cancel(&self) {
        self.call.cancel();
    }

    fn finish_empty(&self) -> Option<Result<Outcome<S, E>, StreamError>> {
        match self.cardinality {
            Cardinality::Single => Some(Err(StreamError::NoElement)),
            Cardinality::Unbounded | Cardinality::Latest | Cardinality::Maybe => None,
        }
    }
}

impl<S, E> Stream for OutcomeStream<S, E> {
    type Item = Result<Outcome<S, E>, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(rx) = this.rx.as_mut() else {
            return Poll::Ready(None);
        };
        let delivery = match Pin::new(rx).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(delivery) => delivery,
        };
        this.rx = None;
        let item = match delivery {
            Ok(Ok(response)) => Some(Ok(response.body)),
            Ok(Err(failure)) => Some(Err(StreamError::Delivery(failure))),
            Err(oneshot::Canceled) => {
                tracing::debug!(cardinality = ?this.cardinality, "call finished without a value");
                this.finish_empty()
            }
        };
        Poll::Ready(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (&self.rx, self.cardinality) {
            (None, _) => (0, Some(0)),
            (Some(_), Cardinality::Single) => (1, Some(1)),
            (Some(_), _) => (0, Some(1)),
        }
    }
}

impl<S, E> FusedStream for OutcomeStream<S, E> {
    fn is_terminated(&self) -> bool {
        self.rx.is_none()
    }
}

impl<S, E> Drop for OutcomeStream<S, E> {
    fn drop(&mut self) {
        if self.rx.is_some() {
            tracing::debug!(path = %self.call.request().path, "stream dropped before completion, canceling call");
            self.call.cancel();
        }
    }
}

impl<S, E> fmt::Debug for OutcomeStream<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeStream")
            .field("request", &self.call.request().path)
            .field("cardinality", &self.cardinality)
            .field("terminated", &self.rx.is_none())
            .finish()
    }
}
