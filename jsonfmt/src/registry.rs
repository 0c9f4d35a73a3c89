//! A concurrent cache of resolved encoders.
//!
//! The [Registry] resolves each distinct descriptor at most once per winner: concurrent first
//! requests for the same never-seen type may each build an encoder, but only the first one
//! inserted is kept and every caller (including the losers) receives that instance. Entries are
//! never evicted.
//!
//! # Example
//!
//! ```
//! use msgfmt_jsonfmt::{Context, Registry};
//!
//! let registry = Registry::default();
//! let mut buf = Vec::new();
//! registry.encode(Context::none(), &mut buf, &-998123123i32).unwrap();
//! registry.encode(Context::none(), &mut buf, &" and ").unwrap();
//! registry.encode(Context::none(), &mut buf, &vec![1u8, 2]).unwrap();
//! assert_eq!(buf, br#"-998123123" and "[1,2]"#);
//! ```

use crate::{
    resolver::{Composites, Primitives, Resolve},
    Addr, Context, Describe, Descriptor, Encoder, Error, Shape,
};
use bytes::BufMut;
use prometheus_client::metrics::{counter::Counter, gauge::Gauge};
use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{debug, trace, warn};

/// Configuration for a [Registry].
#[derive(Clone)]
pub struct Config {
    /// Whether records, sequences, mappings and optional values are resolved.
    ///
    /// When disabled, only integers, text and descriptors claimed by `extensions` resolve.
    pub composites: bool,

    /// Resolvers consulted, in order, for descriptors the built-in tiers do not claim.
    pub extensions: Vec<Arc<dyn Resolve>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            composites: true,
            extensions: Vec::new(),
        }
    }
}

/// Resolves and caches one [Encoder] per described type.
pub struct Registry {
    composites: bool,
    extensions: Vec<Arc<dyn Resolve>>,

    encoders: RwLock<HashMap<TypeId, Arc<dyn Encoder>>>,

    resolutions: Counter,
    hits: Counter,
    unsupported: Counter,
    cached: Gauge,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Registry {
    /// Creates an empty registry.
    pub fn new(cfg: Config) -> Self {
        Self {
            composites: cfg.composites,
            extensions: cfg.extensions,
            encoders: RwLock::new(HashMap::new()),
            resolutions: Counter::default(),
            hits: Counter::default(),
            unsupported: Counter::default(),
            cached: Gauge::default(),
        }
    }

    /// Registers the registry's metrics with `registry`.
    pub fn register_metrics(&self, registry: &mut prometheus_client::registry::Registry) {
        registry.register(
            "resolutions",
            "Number of encoders built",
            self.resolutions.clone(),
        );
        registry.register("hits", "Number of cached encoder lookups", self.hits.clone());
        registry.register(
            "unsupported",
            "Number of failed resolutions, counting each nested descriptor that failed",
            self.unsupported.clone(),
        );
        registry.register("cached", "Number of cached encoders", self.cached.clone());
    }

    fn lookup(&self, id: TypeId) -> Option<Arc<dyn Encoder>> {
        let encoders = self.encoders.read().unwrap_or_else(PoisonError::into_inner);
        encoders.get(&id).cloned()
    }

    /// Returns true if an encoder for `descriptor` is cached.
    pub fn contains(&self, descriptor: &Descriptor) -> bool {
        self.lookup(descriptor.id()).is_some()
    }

    /// Number of cached encoders.
    pub fn len(&self) -> usize {
        self.encoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no encoder is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the encoder for `descriptor`, resolving and caching it on first use.
    pub fn encoder_for(&self, descriptor: &Descriptor) -> Result<Arc<dyn Encoder>, Error> {
        if let Some(encoder) = self.lookup(descriptor.id()) {
            self.hits.inc();
            trace!(name = descriptor.name(), "cached encoder");
            return Ok(encoder);
        }

        // Resolve without holding the lock: composite resolution re-enters the registry
        let encoder = match self.resolve(descriptor) {
            Ok(encoder) => encoder,
            Err(err) => {
                self.unsupported.inc();
                warn!(name = descriptor.name(), ?err, "failed to resolve encoder");
                return Err(err);
            }
        };
        self.resolutions.inc();

        // Keep whichever encoder was inserted first
        let mut encoders = self.encoders.write().unwrap_or_else(PoisonError::into_inner);
        let cached = encoders.entry(descriptor.id()).or_insert(encoder.clone());
        if !Arc::ptr_eq(cached, &encoder) {
            debug!(name = descriptor.name(), "discarded concurrently resolved encoder");
        } else {
            debug!(
                name = descriptor.name(),
                shape = descriptor.shape().kind(),
                "resolved encoder"
            );
        }
        let cached = cached.clone();
        self.cached.set(encoders.len() as i64);
        Ok(cached)
    }

    /// Returns the encoder for `T`.
    ///
    /// Checks the cache before describing `T`, so lookups for resolved types do not build a
    /// descriptor. Fails with [Error::DescriptorMismatch] if `T` describes itself as another
    /// type.
    pub fn encoder_of<T: Describe>(&self) -> Result<Arc<dyn Encoder>, Error> {
        if let Some(encoder) = self.lookup(TypeId::of::<T>()) {
            self.hits.inc();
            trace!(name = type_name::<T>(), "cached encoder");
            return Ok(encoder);
        }
        self.encoder_for(&Descriptor::of::<T>())
    }

    /// Appends the JSON encoding of `value` to `buf`.
    ///
    /// Nothing is written if no encoder can be resolved for `T`.
    pub fn encode<T: Describe>(
        &self,
        ctx: Context<'_>,
        buf: &mut dyn BufMut,
        value: &T,
    ) -> Result<(), Error> {
        let encoder = self.encoder_of::<T>()?;
        encoder.encode(ctx, buf, Addr::of(value));
        Ok(())
    }

    /// Builds an encoder for `descriptor`, consulting each tier in order.
    fn resolve(&self, descriptor: &Descriptor) -> Result<Arc<dyn Encoder>, Error> {
        if let Shape::Mismatch(described) = descriptor.shape() {
            return Err(Error::DescriptorMismatch {
                expected: descriptor.name(),
                found: described.name(),
            });
        }
        if let Some(encoder) = Primitives.resolve(self, descriptor)? {
            return Ok(encoder);
        }
        if self.composites {
            if let Some(encoder) = Composites.resolve(self, descriptor)? {
                return Ok(encoder);
            }
        }
        for extension in &self.extensions {
            if let Some(encoder) = extension.resolve(self, descriptor)? {
                return Ok(encoder);
            }
        }
        Err(Error::UnsupportedType(descriptor.name()))
    }
}
