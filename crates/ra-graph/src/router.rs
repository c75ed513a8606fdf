//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Callers route through the [`Router`] trait, so applications can swap in
//! A* or contraction hierarchies without touching the analytics core.  The
//! default [`DijkstraRouter`] is sufficient for city-scale graphs.
//!
//! # Cost model
//!
//! Costs are the edges' effective `weight` (`f64`).  Edges with a non-finite
//! weight are closed and never relaxed, so a closure that cuts every path
//! yields [`GraphError::NoPath`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ra_core::{EdgeId, NodeId};

use crate::network::RoadGraph;
use crate::{GraphError, GraphResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// One traversed edge of a [`Route`], with its cost at query time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteLeg {
    pub edge:     EdgeId,
    pub from:     NodeId,
    pub to:       NodeId,
    pub weight:   f64,
    pub length_m: f64,
}

/// The result of a routing query: the node sequence, a per-edge breakdown,
/// and totals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Nodes in visiting order, source first.  Always non-empty.
    pub nodes: Vec<NodeId>,
    /// Edges to traverse in order.
    pub legs: Vec<RouteLeg>,
    /// Sum of leg weights.
    pub total_weight: f64,
    /// Sum of leg lengths in metres.
    pub total_length_m: f64,
}

impl Route {
    /// Assemble a route from `start` along `edges` (which must be connected).
    pub fn from_edges(graph: &RoadGraph, start: NodeId, edges: &[EdgeId]) -> Route {
        let mut nodes = Vec::with_capacity(edges.len() + 1);
        nodes.push(start);
        let mut legs = Vec::with_capacity(edges.len());
        let mut total_weight = 0.0;
        let mut total_length_m = 0.0;

        for &edge in edges {
            let (from, to) = graph.endpoints(edge);
            let attrs = graph.attrs(edge);
            total_weight += attrs.weight;
            total_length_m += attrs.length_m;
            legs.push(RouteLeg { edge, from, to, weight: attrs.weight, length_m: attrs.length_m });
            nodes.push(to);
        }

        Route { nodes, legs, total_weight, total_length_m }
    }

    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.legs.iter().map(|l| l.edge)
    }

    pub fn length_km(&self) -> f64 {
        self.total_length_m / 1_000.0
    }

    /// Smallest known lane count along the route, `None` if no leg knows.
    pub fn min_lanes(&self, graph: &RoadGraph) -> Option<u8> {
        self.legs.iter().filter_map(|l| graph.attrs(l.edge).lanes).min()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one router can serve queries
/// against graph snapshots from many worker threads.
pub trait Router: Send + Sync {
    /// Compute the least-cost route from `from` to `to`.
    ///
    /// `from == to` is an empty route, not an error.
    fn route(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> GraphResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR road graph using edge `weight`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> GraphResult<Route> {
        dijkstra(graph, from, to)
    }
}

impl RoadGraph {
    /// Least-weight route with the default [`DijkstraRouter`].
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> GraphResult<Route> {
        DijkstraRouter.route(self, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Total order over non-NaN costs for the binary heap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Cost(pub(crate) f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(graph: &RoadGraph, from: NodeId, to: NodeId) -> GraphResult<Route> {
    graph.check_node(from)?;
    graph.check_node(to)?;

    if from == to {
        return Ok(Route::from_edges(graph, from, &[]));
    }

    let n = graph.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;

    // Min-heap via Reverse; NodeId as secondary key for deterministic ties.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let w = graph.weight(edge);
            if !w.is_finite() {
                continue;
            }
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost + w;

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    Err(GraphError::NoPath { from, to })
}

fn reconstruct(graph: &RoadGraph, prev_edge: &[EdgeId], from: NodeId, to: NodeId) -> Route {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = graph.edge_from[e.index()];
    }
    edges.reverse();
    Route::from_edges(graph, from, &edges)
}
