//! Shared node net with scoped, batched reads.
//!
//! `SharedNodenet` wraps a [`Nodenet`] in an `RwLock`. Every batch of reads
//! runs under one read guard, so no structural mutation can interleave with
//! it; writers take the write guard between batches.
//!
//! # Feature Flag
//!
//! Batch reads run on the rayon thread pool when the `parallel` feature is
//! enabled:
//! ```toml
//! [dependencies]
//! nodenet = { version = "0.1", features = ["parallel"] }
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

use crate::error::LinkResult;
use crate::link::{Link, LinkData, LinkKey};
use crate::network::Nodenet;
use crate::resolver::WeightResolver;

/// A node net shared between threads.
#[derive(Clone, Debug, Default)]
pub struct SharedNodenet {
    inner: Arc<RwLock<Nodenet>>,
    resolver: WeightResolver,
}

impl SharedNodenet {
    /// Wraps a node net.
    pub fn new(net: Nodenet) -> Self {
        Self {
            inner: Arc::new(RwLock::new(net)),
            resolver: WeightResolver::default(),
        }
    }

    /// Uses `resolver` for batch reads.
    pub fn with_resolver(mut self, resolver: WeightResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Acquires a read guard; the topology is stable while it is held.
    pub fn read(&self) -> RwLockReadGuard<'_, Nodenet> {
        self.inner.read()
    }

    /// Acquires a write guard for structural mutation.
    pub fn write(&self) -> RwLockWriteGuard<'_, Nodenet> {
        self.inner.write()
    }

    /// Resolves every key under a single read guard.
    ///
    /// Results are returned in the order of `keys`.
    #[cfg(not(feature = "parallel"))]
    pub fn resolve_many(&self, keys: &[LinkKey]) -> Vec<LinkResult<f64>> {
        let net = self.inner.read();
        keys.iter()
            .map(|key| self.resolver.resolve(&*net, key))
            .collect()
    }

    /// Resolves every key under a single read guard, in parallel.
    ///
    /// Results are returned in the order of `keys`.
    #[cfg(feature = "parallel")]
    pub fn resolve_many(&self, keys: &[LinkKey]) -> Vec<LinkResult<f64>> {
        let net = self.inner.read();
        let net: &Nodenet = &net;
        keys.par_iter()
            .map(|key| self.resolver.resolve(net, key))
            .collect()
    }

    /// Snapshots every key under a single read guard, using this handle's resolver.
    pub fn snapshot_many(&self, keys: &[LinkKey]) -> Vec<LinkResult<LinkData>> {
        let net = self.inner.read();
        keys.iter()
            .map(|key| Link::new(&*net, key.clone()).snapshot_with(&self.resolver))
            .collect()
    }
}
