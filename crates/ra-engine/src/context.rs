//! The analytics context: one shared road graph, its configuration, and
//! every operation that reads or writes it.
//!
//! # Concurrency
//!
//! All graph access goes through a [`SharedGraph`].  Queries take a snapshot
//! and never block writers for longer than an `Arc` clone.  Writes (damage
//! ingestion, weight overrides, closures, network reloads) are serialized;
//! a query that starts after a write returns observes that write.
//!
//! The closure registry is guarded by its own mutex, always taken before the
//! graph's write lock, so a closure record and the weight it describes are
//! published together.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use ra_core::{AnalyticsConfig, EdgeId, GeoPoint, InputError, NodeId};
use ra_damage::{
    DamagePoint, DamageSegment, EdgeDamageMapper, MappingSummary, PenaltyEngine, PenaltySummary,
    SpatialClusterer,
};
use ra_flow::{FlowClassifier, FlowReading};
use ra_graph::{
    Alternatives, DijkstraRouter, GraphError, PathSearchLimits, RoadGraph, RoadLine, Route, Router,
    SharedGraph,
};

use crate::advisory::{
    assess_diversion, recommend, score_alternatives, DiversionAssessment, Recommendation,
    RouteProfile,
};
use crate::closure::{Closure, ClosureRegistry};
use crate::{EngineError, EngineResult};

/// Size of a freshly loaded network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Outcome of one damage ingestion.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IngestReport {
    pub segments: Vec<DamageSegment>,
    pub mapping:  MappingSummary,
    pub penalty:  PenaltySummary,
}

/// Owns the shared road graph and runs the analytics pipeline over it.
///
/// Generic over the routing algorithm the same way the rest of the
/// workspace is; [`DijkstraRouter`] is the default.
pub struct AnalyticsContext<R: Router = DijkstraRouter> {
    config:    AnalyticsConfig,
    graph:     SharedGraph,
    closures:  Mutex<ClosureRegistry>,
    clusterer: SpatialClusterer,
    penalty:   PenaltyEngine,
    flow:      FlowClassifier,
    router:    R,
}

impl AnalyticsContext<DijkstraRouter> {
    /// A context with no network loaded.
    pub fn new(config: AnalyticsConfig) -> EngineResult<Self> {
        Self::with_router(config, DijkstraRouter)
    }
}

impl<R: Router> AnalyticsContext<R> {
    pub fn with_router(config: AnalyticsConfig, router: R) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            clusterer: SpatialClusterer::new(config.cluster.clone())?,
            penalty:   PenaltyEngine::new(config.penalty.clone())?,
            flow:      FlowClassifier::new(config.flow.clone())?,
            graph:     SharedGraph::empty(),
            closures:  Mutex::new(ClosureRegistry::new()),
            config,
            router,
        })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    /// Current graph version.
    pub fn snapshot(&self) -> Arc<RoadGraph> {
        self.graph.snapshot()
    }

    // ── Network lifecycle ─────────────────────────────────────────────────

    /// Build a network from line geometries and make it current.
    ///
    /// Active closures are dropped: they refer to the previous network.
    pub fn load_network(&self, lines: &[RoadLine]) -> EngineResult<NetworkSummary> {
        let graph = RoadGraph::from_lines(lines, self.config.base_weight)?;
        Ok(self.load_graph(graph))
    }

    /// Make a prebuilt graph current.
    pub fn load_graph(&self, graph: RoadGraph) -> NetworkSummary {
        let summary = NetworkSummary { nodes: graph.node_count(), edges: graph.edge_count() };
        let mut closures = self.closures();
        let dropped = closures.len();
        closures.clear();
        self.graph.replace(graph);
        drop(closures);

        info!(
            "road network loaded: {} nodes, {} edges ({dropped} closures dropped)",
            summary.nodes, summary.edges,
        );
        summary
    }

    // ── Damage pipeline ───────────────────────────────────────────────────

    /// Validate, cluster, map and penalise `points` as one write.
    ///
    /// Nothing is published unless every stage succeeds.
    pub fn ingest_damage(&self, points: &[DamagePoint]) -> EngineResult<IngestReport> {
        if points.is_empty() {
            return Err(InputError::EmptyPoints.into());
        }
        let segments = self.clusterer.cluster(points)?;

        let (mapping, penalty) = self.graph.try_update(|g| -> EngineResult<_> {
            if g.is_empty() {
                return Err(EngineError::NoNetwork);
            }
            let mapping = EdgeDamageMapper.apply(g, &segments)?;
            let penalty = self.penalty.apply(g);
            Ok((mapping, penalty))
        })?;

        Ok(IngestReport { segments, mapping, penalty })
    }

    /// Clear all damage and penalties; returns the number of edges cleared.
    pub fn reset_damage(&self) -> usize {
        self.graph.update(|g| EdgeDamageMapper.reset(g))
    }

    // ── Weights and closures ──────────────────────────────────────────────

    /// Override the base weight of `from → to`.
    ///
    /// A finite weight re-opens a closed edge; `+∞` closes an open one.
    pub fn set_edge_weight(&self, from: NodeId, to: NodeId, weight: f64) -> EngineResult<EdgeId> {
        let mut closures = self.closures();
        self.graph.try_update(|g| closures.override_weight(g, from, to, weight))
    }

    /// Close `from → to` (e.g. for a construction project).
    pub fn close_edge(&self, from: NodeId, to: NodeId, label: Option<&str>) -> EngineResult<Closure> {
        let mut closures = self.closures();
        let closure = self
            .graph
            .try_update(|g| closures.close(g, from, to, label.map(str::to_owned)))?;
        info!(
            "closed {} → {} ({}); {} closures active",
            closure.from,
            closure.to,
            closure.label.as_deref().unwrap_or("unlabelled"),
            closures.len(),
        );
        Ok(closure)
    }

    /// Re-open a closed edge, restoring its prior base weight.
    pub fn reopen_edge(&self, from: NodeId, to: NodeId) -> EngineResult<Closure> {
        let mut closures = self.closures();
        let closure = self.graph.try_update(|g| closures.reopen(g, from, to))?;
        info!("reopened {} → {}; {} closures active", closure.from, closure.to, closures.len());
        Ok(closure)
    }

    /// Active closures ordered by `(from, to)`.
    pub fn active_closures(&self) -> Vec<Closure> {
        self.closures().iter().cloned().collect()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn nearest_node(&self, pos: GeoPoint) -> EngineResult<NodeId> {
        Ok(self.snapshot().nearest_node(checked(pos)?)?)
    }

    /// Least-weight route between the nodes nearest to `from` and `to`.
    pub fn shortest_path(&self, from: GeoPoint, to: GeoPoint) -> EngineResult<Route> {
        let graph = self.snapshot();
        let (a, b) = snap_pair(&graph, from, to)?;
        Ok(self.router.route(&graph, a, b)?)
    }

    /// Least-weight route between two known nodes.
    pub fn shortest_path_between(&self, from: NodeId, to: NodeId) -> EngineResult<Route> {
        Ok(self.router.route(&self.snapshot(), from, to)?)
    }

    /// The configured number of least-weight alternatives.
    pub fn alternatives(&self, from: GeoPoint, to: GeoPoint) -> EngineResult<Alternatives> {
        let graph = self.snapshot();
        self.alternatives_on(&graph, from, to)
    }

    /// Score the alternatives between `from` and `to` and pick the best.
    pub fn recommend(&self, from: GeoPoint, to: GeoPoint) -> EngineResult<Recommendation> {
        let graph = self.snapshot();
        let alts = self.alternatives_on(&graph, from, to)?;
        Ok(recommend(score_alternatives(alts.routes)))
    }

    /// Check the best route between `from` and `to` against the diversion
    /// rules, using the remaining alternatives as detour candidates.
    pub fn assess_diversion(&self, from: GeoPoint, to: GeoPoint) -> EngineResult<DiversionAssessment> {
        let graph = self.snapshot();
        let (a, b) = snap_pair(&graph, from, to)?;
        let alts = self.alternatives_on(&graph, from, to)?;

        let mut profiles = alts
            .routes
            .iter()
            .enumerate()
            .map(|(i, r)| RouteProfile::of(i, r, &graph));
        let primary = profiles
            .next()
            .ok_or(GraphError::NoPath { from: a, to: b })?;
        let rest: Vec<RouteProfile> = profiles.collect();

        Ok(assess_diversion(&primary, &rest, &self.config.advisory))
    }

    // ── Flow ──────────────────────────────────────────────────────────────

    pub fn classify_flow(&self, speeds: &[f64]) -> FlowReading {
        self.flow.reading(speeds)
    }

    pub fn classify_edges(&self, samples: &[(EdgeId, Vec<f64>)]) -> Vec<(EdgeId, FlowReading)> {
        self.flow.classify_edges(samples)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn alternatives_on(&self, graph: &RoadGraph, from: GeoPoint, to: GeoPoint) -> EngineResult<Alternatives> {
        let (a, b) = snap_pair(graph, from, to)?;
        let limits = PathSearchLimits::from(&self.config.routing);
        Ok(graph.k_alternative_paths(a, b, self.config.routing.alternatives, limits)?)
    }

    fn closures(&self) -> MutexGuard<'_, ClosureRegistry> {
        self.closures.lock().unwrap_or_else(|poisoned| {
            warn!("closure registry lock poisoned; continuing with last recorded closures");
            PoisonError::into_inner(poisoned)
        })
    }
}

fn checked(pos: GeoPoint) -> EngineResult<GeoPoint> {
    if pos.is_valid() {
        Ok(pos)
    } else {
        Err(InputError::InvalidCoordinate(pos).into())
    }
}

fn snap_pair(graph: &RoadGraph, from: GeoPoint, to: GeoPoint) -> EngineResult<(NodeId, NodeId)> {
    let a = graph.nearest_node(checked(from)?)?;
    let b = graph.nearest_node(checked(to)?)?;
    Ok((a, b))
}
