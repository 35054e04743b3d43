//! The transport seam.
//!
//! # Design
//! The core never performs I/O. A transport exposes one exchange as a
//! [`Call`]: it either blocks in `execute`, or hands the result to a
//! [`Callback`] on a thread of its choosing in `enqueue`. Either way the
//! response body arrives already buffered as text.
//!
//! All methods take `&self` so a call can be canceled from another thread
//! while `execute` is blocked; implementations keep their flags in atomics.

use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Completion handler for a transport call.
///
/// Exactly one method is invoked, once. Both consume the callback.
pub trait Callback: Send {
    fn on_response(self: Box<Self>, response: HttpResponse);
    fn on_failure(self: Box<Self>, error: TransportError);
}

/// One HTTP exchange performed by a transport.
pub trait Call: Send + Sync {
    /// Perform the exchange on the calling thread.
    fn execute(&self) -> Result<HttpResponse, TransportError>;

    /// Perform the exchange in the background and report to `callback`.
    fn enqueue(&self, callback: Box<dyn Callback>);

    fn cancel(&self);

    fn is_canceled(&self) -> bool;

    fn is_executed(&self) -> bool;

    fn request(&self) -> &HttpRequest;

    /// The transport's overall timeout for this call, if it has one.
    fn timeout(&self) -> Option<Duration>;

    /// A fresh, unexecuted call for the same request.
    fn clone_call(&self) -> Box<dyn Call>;
}
