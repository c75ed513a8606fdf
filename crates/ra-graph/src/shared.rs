//! Shared, snapshot-readable road graph.
//!
//! # Access discipline
//!
//! ```text
//! readers:  snapshot()  → Arc<RoadGraph>   (read lock held only for the Arc clone)
//! writers:  update(f)   → clone attrs, run f, publish   (write lock held throughout)
//! reload:   replace(g)  → swap in a new network
//! ```
//!
//! Writers are serialized by the write lock.  A query that takes its snapshot
//! after a write returns observes that write; queries already running keep
//! the snapshot they started with.  A writer works on a private copy and only
//! publishes it when its closure returns `Ok`, so a failed or panicking write
//! never leaves a half-applied graph behind.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::warn;

use crate::network::RoadGraph;

/// Process-wide road graph with single-writer / many-reader semantics.
pub struct SharedGraph {
    inner: RwLock<Arc<RoadGraph>>,
}

impl SharedGraph {
    pub fn new(graph: RoadGraph) -> Self {
        Self { inner: RwLock::new(Arc::new(graph)) }
    }

    /// A shared graph holding [`RoadGraph::empty`].
    pub fn empty() -> Self {
        Self::new(RoadGraph::empty())
    }

    /// Current graph version.  Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<RoadGraph> {
        Arc::clone(&self.read())
    }

    /// Swap in a wholly new network, returning the previous one.
    pub fn replace(&self, graph: RoadGraph) -> Arc<RoadGraph> {
        std::mem::replace(&mut *self.write(), Arc::new(graph))
    }

    /// Apply an infallible mutation and publish the result.
    pub fn update<T>(&self, f: impl FnOnce(&mut RoadGraph) -> T) -> T {
        let mut guard = self.write();
        let mut next = RoadGraph::clone(&guard);
        let out = f(&mut next);
        *guard = Arc::new(next);
        out
    }

    /// Apply a fallible mutation; the graph is published only on `Ok`.
    pub fn try_update<T, E>(
        &self,
        f: impl FnOnce(&mut RoadGraph) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self.write();
        let mut next = RoadGraph::clone(&guard);
        let out = f(&mut next)?;
        *guard = Arc::new(next);
        Ok(out)
    }

    fn read(&self) -> RwLockReadGuard<'_, Arc<RoadGraph>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("road graph lock poisoned by a panicking writer; continuing with last published graph");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<RoadGraph>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("road graph lock poisoned by a panicking writer; continuing with last published graph");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl Default for SharedGraph {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<RoadGraph> for SharedGraph {
    fn from(graph: RoadGraph) -> Self {
        Self::new(graph)
    }
}
