//! Classify HTTP round trips into three outcomes.
//!
//! # Overview
//! Every exchange, including one that failed in transport, becomes exactly
//! one [`Outcome`]: `Success`, `ServerError`, or `NetworkError`. Callers
//! match on it instead of inspecting status codes or transport errors.
//!
//! # Design
//! - The core never touches the network (host-does-IO). A transport exposes
//!   an exchange through the [`Call`] trait and buffers the body once.
//! - [`Classifier`] is a pure function of the buffered exchange, the two
//!   body decoders, and [`ClassifierConfig`].
//! - Three calling conventions share that classifier unchanged:
//!   [`BlockingOutcomeCall`], [`OutcomeCall`] (callback or future), and
//!   [`OutcomeStream`].
//! - [`AdapterRegistry`] is built once at startup and maps a declared
//!   [`ReturnShape`] to one of those adapters.

pub mod async_call;
pub mod blocking;
pub mod call;
pub mod classify;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod outcome;
pub mod registry;
pub mod stream;

#[cfg(test)]
mod test_support;

pub use async_call::{OutcomeCall, OutcomeCallback, OutcomeFuture};
pub use blocking::BlockingOutcomeCall;
pub use call::{Call, Callback};
pub use classify::{classify, Classifier};
pub use config::ClassifierConfig;
pub use decode::{decoder_fn, Decoder, JsonDecoder};
pub use error::{BoxError, ConfigError, DecodeError, DeliveryError, RegistryError, StreamError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Response};
pub use outcome::Outcome;
pub use registry::{AdapterKind, AdapterRegistry, Adapted, ReturnShape};
pub use stream::{Cardinality, OutcomeStream};
