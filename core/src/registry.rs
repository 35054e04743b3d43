//! Adapter registry.
//!
//! # Design
//! Which calling conventions are available, and the classification policy
//! they share, is decided once at startup by building an `AdapterRegistry`.
//! After that the registry is read-only: `adapt` turns a raw transport call
//! plus the two decoders for an endpoint into the adapter its declared
//! return shape asks for. Discovering the shape and body types from a
//! method signature is the host framework's job; the registry receives them
//! already resolved.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::async_call::{OutcomeCall, OutcomeFuture};
use crate::blocking::BlockingOutcomeCall;
use crate::call::Call;
use crate::classify::Classifier;
use crate::config::ClassifierConfig;
use crate::decode::{Decoder, JsonDecoder};
use crate::error::RegistryError;
use crate::stream::{Cardinality, OutcomeStream};

/// Declared return shape of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnShape {
    /// The caller awaits the outcome itself.
    Direct,
    /// A call object executed on the calling thread.
    Blocking,
    /// A call object completed through a callback.
    Async,
    /// A stream with the given emission contract.
    Stream(Cardinality),
}

impl ReturnShape {
    pub fn kind(self) -> AdapterKind {
        match self {
            ReturnShape::Direct => AdapterKind::Direct,
            ReturnShape::Blocking => AdapterKind::Blocking,
            ReturnShape::Async => AdapterKind::Async,
            ReturnShape::Stream(_) => AdapterKind::Stream,
        }
    }
}

/// Calling conventions a registry can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdapterKind {
    Direct,
    Blocking,
    Async,
    Stream,
}

impl AdapterKind {
    pub const ALL: [AdapterKind; 4] = [
        AdapterKind::Direct,
        AdapterKind::Blocking,
        AdapterKind::Async,
        AdapterKind::Stream,
    ];
}

/// An adapted call, in the convention its return shape asked for.
#[derive(Debug)]
pub enum Adapted<S, E> {
    Direct(OutcomeFuture<S, E>),
    Blocking(BlockingOutcomeCall<S, E>),
    Async(OutcomeCall<S, E>),
    Stream(OutcomeStream<S, E>),
}

impl<S, E> Adapted<S, E> {
    pub fn kind(&self) -> AdapterKind {
        match self {
            Adapted::Direct(_) => AdapterKind::Direct,
            Adapted::Blocking(_) => AdapterKind::Blocking,
            Adapted::Async(_) => AdapterKind::Async,
            Adapted::Stream(_) => AdapterKind::Stream,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdapterRegistryBuilder {
    config: ClassifierConfig,
    kinds: BTreeSet<AdapterKind>,
}

impl AdapterRegistryBuilder {
    pub fn config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn enable(mut self, kind: AdapterKind) -> Self {
        self.kinds.insert(kind);
        self
    }

    pub fn enable_all(mut self) -> Self {
        self.kinds.extend(AdapterKind::ALL);
        self
    }

    pub fn build(self) -> Result<AdapterRegistry, RegistryError> {
        if self.kinds.is_empty() {
            return Err(RegistryError::Empty);
        }
        tracing::debug!(kinds = ?self.kinds, config = ?self.config, "adapter registry built");
        Ok(AdapterRegistry {
            config: self.config,
            kinds: self.kinds,
        })
    }
}

/// Startup-time mapping from return shape to adapter.
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    config: ClassifierConfig,
    kinds: BTreeSet<AdapterKind>,
}

impl AdapterRegistry {
    pub fn builder() -> AdapterRegistryBuilder {
        AdapterRegistryBuilder::default()
    }

    /// Every convention enabled, default policy.
    pub fn with_defaults() -> Self {
        Self {
            config: ClassifierConfig::default(),
            kinds: AdapterKind::ALL.into_iter().collect(),
        }
    }

    pub fn config(&self) -> ClassifierConfig {
        self.config
    }

    pub fn supports(&self, shape: ReturnShape) -> bool {
        self.kinds.contains(&shape.kind())
    }

    pub fn resolve(&self, shape: ReturnShape) -> Result<AdapterKind, RegistryError> {
        if self.supports(shape) {
            Ok(shape.kind())
        } else {
            Err(RegistryError::Unsupported(shape))
        }
    }

    /// Classifier for one endpoint under the registry's policy.
    pub fn classifier<S, E>(&self, success: Arc<dyn Decoder<S>>, error: Arc<dyn Decoder<E>>) -> Classifier<S, E> {
        Classifier::from_shared(success, error, self.config)
    }

    /// Wrap `call` in the adapter `shape` asks for.
    ///
    /// `Direct` and `Stream` enqueue the call immediately.
    pub fn adapt<S, E>(
        &self,
        shape: ReturnShape,
        call: Box<dyn Call>,
        success: Arc<dyn Decoder<S>>,
        error: Arc<dyn Decoder<E>>,
    ) -> Result<Adapted<S, E>, RegistryError>
    where
        S: Send + 'static,
        E: Send + 'static,
    {
        self.resolve(shape)?;
        let classifier = self.classifier(success, error);
        tracing::debug!(?shape, path = %call.request().path, "adapting call");
        Ok(match shape {
            ReturnShape::Direct => Adapted::Direct(OutcomeCall::new(call, classifier).outcome()),
            ReturnShape::Blocking => Adapted::Blocking(BlockingOutcomeCall::new(call, classifier)),
            ReturnShape::Async => Adapted::Async(OutcomeCall::new(call, classifier)),
            ReturnShape::Stream(cardinality) => {
                Adapted::Stream(OutcomeStream::new(OutcomeCall::new(call, classifier), cardinality))
            }
        })
    }

    /// [`adapt`](Self::adapt) with JSON decoders for both body shapes.
    pub fn adapt_json<S, E>(&self, shape: ReturnShape, call: Box<dyn Call>) -> Result<Adapted<S, E>, RegistryError>
    where
        S: DeserializeOwned + Send + 'static,
        E: DeserializeOwned + Send + 'static,
    {
        self.adapt(
            shape,
            call,
            Arc::new(JsonDecoder::<S>::new()),
            Arc::new(JsonDecoder::<E>::new()),
        )
    }
}
