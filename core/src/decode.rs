//! Body decoders.
//!
//! The classifier treats decoders as opaque: it only looks at whether
//! `decode` produced a value. Decoders get the buffered body text, never a
//! live stream, so the same text can be handed to more than one of them.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Converts buffered body text into a typed value.
///
/// Implementations must be pure with respect to their input.
pub trait Decoder<T>: Send + Sync {
    fn decode(&self, body: &str) -> Result<T, DecodeError>;
}

/// Decodes a JSON body with `serde_json`. Unknown fields are ignored,
/// missing required fields are a decode failure.
pub struct JsonDecoder<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDecoder<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonDecoder<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonDecoder<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> Decoder<T> for JsonDecoder<T> {
    fn decode(&self, body: &str) -> Result<T, DecodeError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Adapts a closure into a [`Decoder`].
#[derive(Clone)]
pub struct FnDecoder<F>(F);

impl<F> fmt::Debug for FnDecoder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnDecoder")
    }
}

impl<T, F> Decoder<T> for FnDecoder<F>
where
    F: Fn(&str) -> Result<T, DecodeError> + Send + Sync,
{
    fn decode(&self, body: &str) -> Result<T, DecodeError> {
        (self.0)(body)
    }
}

pub fn decoder_fn<T, F>(f: F) -> FnDecoder<F>
where
    F: Fn(&str) -> Result<T, DecodeError> + Send + Sync,
{
    FnDecoder(f)
}
