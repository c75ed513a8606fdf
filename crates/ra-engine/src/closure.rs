//! Construction-closure bookkeeping.
//!
//! Closing an edge sets its base weight to `+∞` and remembers the base weight
//! it had, so re-opening restores it exactly even if damage penalties changed
//! in between (penalties live in the separate penalty factor).

use std::collections::BTreeMap;

use ra_core::{EdgeId, NodeId};
use ra_graph::{GraphError, GraphResult, RoadGraph};

use crate::{EngineError, EngineResult};

/// One active closure.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Closure {
    pub edge:              EdgeId,
    pub from:              NodeId,
    pub to:                NodeId,
    /// Base weight to restore on re-opening.
    pub prior_base_weight: f64,
    /// Free-form reason, e.g. a project name.
    pub label:             Option<String>,
}

/// Active closures keyed by `(from, to)`.
#[derive(Clone, Debug, Default)]
pub struct ClosureRegistry {
    active: BTreeMap<(NodeId, NodeId), Closure>,
}

impl ClosureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_closed(&self, from: NodeId, to: NodeId) -> bool {
        self.active.contains_key(&(from, to))
    }

    /// Active closures ordered by `(from, to)`.
    pub fn iter(&self) -> impl Iterator<Item = &Closure> + '_ {
        self.active.values()
    }

    /// Close `from → to` on `graph` and record it.
    pub fn close(
        &mut self,
        graph: &mut RoadGraph,
        from: NodeId,
        to: NodeId,
        label: Option<String>,
    ) -> EngineResult<Closure> {
        if self.is_closed(from, to) {
            return Err(EngineError::AlreadyClosed { from, to });
        }
        let prior_base_weight = base_weight_of(graph, from, to)?;
        let edge = graph.set_edge_weight(from, to, f64::INFINITY)?;

        let closure = Closure { edge, from, to, prior_base_weight, label };
        self.active.insert((from, to), closure.clone());
        Ok(closure)
    }

    /// Restore the base weight `from → to` had before it was closed.
    pub fn reopen(&mut self, graph: &mut RoadGraph, from: NodeId, to: NodeId) -> EngineResult<Closure> {
        let closure = self
            .active
            .get(&(from, to))
            .cloned()
            .ok_or(EngineError::ClosureNotFound { from, to })?;
        graph.set_edge_weight(from, to, closure.prior_base_weight)?;
        self.active.remove(&(from, to));
        Ok(closure)
    }

    /// Override the base weight of `from → to`, keeping the registry in step.
    ///
    /// A finite weight on a closed edge re-opens it at that weight; `+∞` on an
    /// open edge records an unlabelled closure.
    pub fn override_weight(
        &mut self,
        graph: &mut RoadGraph,
        from: NodeId,
        to: NodeId,
        weight: f64,
    ) -> EngineResult<EdgeId> {
        let prior_base_weight = base_weight_of(graph, from, to)?;
        let edge = graph.set_edge_weight(from, to, weight)?;

        if weight.is_finite() {
            self.active.remove(&(from, to));
        } else if !self.is_closed(from, to) {
            let closure = Closure { edge, from, to, prior_base_weight, label: None };
            self.active.insert((from, to), closure);
        }
        Ok(edge)
    }

    /// Forget every closure without touching any graph.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

fn base_weight_of(graph: &RoadGraph, from: NodeId, to: NodeId) -> GraphResult<f64> {
    graph.check_node(from)?;
    graph
        .find_edge(from, to)
        .map(|e| graph.attrs(e).base_weight)
        .ok_or(GraphError::EdgeNotFound { from, to })
}
