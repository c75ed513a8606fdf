//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Topology arrays (`node_pos`, `node_out_start`, `edge_from`, `edge_to`) and
//! both spatial indexes are frozen at build time and shared behind `Arc`, so
//! cloning a `RoadGraph` only copies the per-edge [`EdgeAttributes`].  That
//! keeps copy-on-write snapshots in [`SharedGraph`](crate::SharedGraph) cheap.
//!
//! # Spatial indexes
//!
//! Two R-trees (via `rstar`) work in planar `[lat, lon]` degree space:
//!
//! - node positions, for snapping query coordinates onto the graph;
//! - edge midpoints, for assigning damage clusters to their nearest edge.

use std::sync::Arc;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use ra_core::{EdgeId, GeoPoint, InputError, InputResult, NodeId};

use crate::edge::EdgeAttributes;
use crate::{GraphError, GraphResult};

// ── R-tree entries ────────────────────────────────────────────────────────────

/// Node position entry: a 2-D `[lat, lon]` point with its `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        planar_2(self.point, *point)
    }
}

/// Edge midpoint entry: mean of the two endpoint coordinates.
#[derive(Clone)]
struct MidpointEntry {
    point: [f64; 2],
    id:    EdgeId,
}

impl RTreeObject for MidpointEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for MidpointEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        planar_2(self.point, *point)
    }
}

#[inline]
fn planar_2(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dlat = a[0] - b[0];
    let dlon = a[1] - b[1];
    dlat * dlat + dlon * dlon
}

// ── RoadLine ──────────────────────────────────────────────────────────────────

/// One road geometry: an ordered vertex list plus optional metadata.
///
/// Consecutive vertices become directed edges.  Set `bidirectional` to also
/// add the reverse of every edge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadLine {
    pub vertices:      Vec<GeoPoint>,
    pub lanes:         Option<u8>,
    pub bidirectional: bool,
}

impl RoadLine {
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        Self { vertices, lanes: None, bidirectional: false }
    }

    /// Build from GeoJSON-ordered `(lon, lat)` pairs.
    pub fn from_lon_lat(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&(lon, lat)| GeoPoint::from_lon_lat(lon, lat)).collect())
    }

    pub fn with_lanes(mut self, lanes: u8) -> Self {
        self.lanes = Some(lanes);
        self
    }

    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus spatial indexes.
///
/// Topology fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadGraphBuilder`].
#[derive(Clone)]
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Rounded position of each node.  Indexed by `NodeId`.
    pub node_pos: Arc<[GeoPoint]>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Arc<[u32]>,

    /// Source node of each edge.
    pub edge_from: Arc<[NodeId]>,

    /// Destination node of each edge.
    pub edge_to: Arc<[NodeId]>,

    // ── Mutable edge state ────────────────────────────────────────────────
    /// Attributes of each edge, indexed by `EdgeId`.
    pub edge_attrs: Vec<EdgeAttributes>,

    // ── Spatial indexes ───────────────────────────────────────────────────
    node_idx:     Arc<RTree<NodeEntry>>,
    midpoint_idx: Arc<RTree<MidpointEntry>>,
}

impl RoadGraph {
    /// Construct an empty graph with no nodes or edges.
    ///
    /// Any query against it reports [`GraphError::GraphEmpty`].
    pub fn empty() -> Self {
        RoadGraphBuilder::new().build()
    }

    /// Build a graph from line geometries with the given base edge weight.
    pub fn from_lines(lines: &[RoadLine], base_weight: f64) -> InputResult<Self> {
        let mut b = RoadGraphBuilder::new().base_weight(base_weight)?;
        for line in lines {
            b.add_line(line)?;
        }
        Ok(b.build())
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    /// Fail with `GraphEmpty` / `NodeNotFound` unless `node` is queryable.
    pub fn check_node(&self, node: NodeId) -> GraphResult<()> {
        if self.is_empty() {
            return Err(GraphError::GraphEmpty);
        }
        if !self.contains_node(node) {
            return Err(GraphError::NodeNotFound(node));
        }
        Ok(())
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over all `EdgeId`s in iteration order (ascending id).
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edge_count()).map(|i| EdgeId::from_index(i))
    }

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range — no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId::from_index(i))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// The edge `from → to`, if present.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if !self.contains_node(from) {
            return None;
        }
        self.out_edges(from).find(|e| self.edge_to[e.index()] == to)
    }

    #[inline]
    pub fn endpoints(&self, edge: EdgeId) -> (NodeId, NodeId) {
        (self.edge_from[edge.index()], self.edge_to[edge.index()])
    }

    /// Arithmetic mean of the edge's endpoint coordinates.
    pub fn edge_midpoint(&self, edge: EdgeId) -> GeoPoint {
        let (u, v) = self.endpoints(edge);
        self.node_pos[u.index()].midpoint(self.node_pos[v.index()])
    }

    #[inline]
    pub fn attrs(&self, edge: EdgeId) -> &EdgeAttributes {
        &self.edge_attrs[edge.index()]
    }

    #[inline]
    pub fn attrs_mut(&mut self, edge: EdgeId) -> &mut EdgeAttributes {
        &mut self.edge_attrs[edge.index()]
    }

    /// Effective traversal cost of `edge`.
    #[inline]
    pub fn weight(&self, edge: EdgeId) -> f64 {
        self.edge_attrs[edge.index()].weight
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Override the base weight of `from → to` (`+∞` closes the edge).
    ///
    /// The effective weight keeps any roughness penalty already applied.
    /// Returns the affected edge.
    pub fn set_edge_weight(&mut self, from: NodeId, to: NodeId, weight: f64) -> GraphResult<EdgeId> {
        if weight.is_nan() || weight < 0.0 {
            return Err(InputError::InvalidWeight(weight).into());
        }
        let edge = self
            .find_edge(from, to)
            .ok_or(GraphError::EdgeNotFound { from, to })?;
        self.attrs_mut(edge).set_base_weight(weight)?;
        Ok(edge)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the node nearest to `pos` by planar distance.
    ///
    /// No tolerance is applied: any coordinate snaps to some node.
    pub fn nearest_node(&self, pos: GeoPoint) -> GraphResult<NodeId> {
        self.node_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
            .ok_or(GraphError::GraphEmpty)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.node_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }

    /// Return the edge whose midpoint is nearest to `pos` by planar distance.
    ///
    /// Equidistant candidates resolve to the lowest `EdgeId`, i.e. the first
    /// edge a linear scan in iteration order (by source node, then insertion
    /// order) would keep.  `None` only if the
    /// graph has no edges.
    pub fn nearest_edge_by_midpoint(&self, pos: GeoPoint) -> Option<EdgeId> {
        let mut iter = self
            .midpoint_idx
            .nearest_neighbor_iter_with_distance_2(&[pos.lat, pos.lon]);
        let (first, best_d2) = iter.next()?;
        let mut best = first.id;
        for (entry, d2) in iter {
            if d2 > best_d2 {
                break;
            }
            best = best.min(entry.id);
        }
        Some(best)
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes are deduplicated by their coordinate rounded to six decimal digits.
/// Edges may be added in any order; `build()` groups them by source node
/// (keeping insertion order within each group), collapses duplicate
/// `(from, to)` pairs (first position, last attributes), and bulk-loads both
/// R-trees.
///
/// # Example
///
/// ```
/// use ra_core::GeoPoint;
/// use ra_graph::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(GeoPoint::new(23.0225, 72.5714));
/// let c = b.add_node(GeoPoint::new(23.0235, 72.5714));
/// b.add_road(a, c, 111.0);
/// let graph = b.build();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // bidirectional
/// ```
pub struct RoadGraphBuilder {
    nodes:       Vec<GeoPoint>,
    node_lookup: FxHashMap<(i64, i64), NodeId>,
    raw_edges:   Vec<RawEdge>,
    base_weight: f64,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
    lanes:    Option<u8>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes:       Vec::new(),
            node_lookup: FxHashMap::default(),
            raw_edges:   Vec::new(),
            base_weight: 1.0,
        }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:       Vec::with_capacity(nodes),
            node_lookup: FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            raw_edges:   Vec::with_capacity(edges),
            base_weight: 1.0,
        }
    }

    /// Base weight given to every edge.  Default: 1.0.
    pub fn base_weight(mut self, weight: f64) -> InputResult<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(InputError::InvalidWeight(weight));
        }
        self.base_weight = weight;
        Ok(self)
    }

    /// Add (or find) the node at the rounded position of `pos`.
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let key = pos.coord_key();
        if let Some(&id) = self.node_lookup.get(&key) {
            return id;
        }
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(pos.rounded());
        self.node_lookup.insert(key, id);
        id
    }

    /// Add a **directed** edge from `from` to `to`.
    ///
    /// `length_m` is the physical length in metres (`0.0` when unknown).
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64) {
        self.add_directed_edge_with_lanes(from, to, length_m, None);
    }

    pub fn add_directed_edge_with_lanes(
        &mut self,
        from: NodeId,
        to: NodeId,
        length_m: f64,
        lanes: Option<u8>,
    ) {
        self.raw_edges.push(RawEdge { from, to, length_m, lanes });
    }

    /// Convenience: add edges in **both directions**.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64) {
        self.add_directed_edge(a, b, length_m);
        self.add_directed_edge(b, a, length_m);
    }

    /// Add one edge per consecutive vertex pair of `line`, each tagged with
    /// its haversine length.  Returns the number of edges added.
    ///
    /// Vertices that round onto the same node produce no self-loop.
    pub fn add_line(&mut self, line: &RoadLine) -> InputResult<usize> {
        if line.vertices.len() < 2 {
            return Err(InputError::DegenerateLine(line.vertices.len()));
        }
        if let Some(bad) = line.vertices.iter().find(|p| !p.is_valid()) {
            return Err(InputError::InvalidCoordinate(*bad));
        }

        let mut added = 0;
        for pair in line.vertices.windows(2) {
            let u = self.add_node(pair[0]);
            let v = self.add_node(pair[1]);
            if u == v {
                continue;
            }
            let length_m = pair[0].distance_m(pair[1]);
            self.add_directed_edge_with_lanes(u, v, length_m, line.lanes);
            added += 1;
            if line.bidirectional {
                self.add_directed_edge_with_lanes(v, u, length_m, line.lanes);
                added += 1;
            }
        }
        Ok(added)
    }

    /// Look up the rounded position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N + E log E) for
    /// the R-tree bulk loads.
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();

        // A repeated (from, to) pair keeps its first slot but takes the last
        // attributes; the stable sort then keeps insertion order per source.
        let mut slot: FxHashMap<(NodeId, NodeId), usize> = FxHashMap::default();
        let mut deduped: Vec<RawEdge> = Vec::with_capacity(self.raw_edges.len());
        for e in self.raw_edges {
            match slot.get(&(e.from, e.to)) {
                Some(&i) => deduped[i] = e,
                None => {
                    slot.insert((e.from, e.to), deduped.len());
                    deduped.push(e);
                }
            }
        }
        deduped.sort_by_key(|e| e.from.0);
        let edge_count = deduped.len();

        let edge_from: Vec<NodeId> = deduped.iter().map(|e| e.from).collect();
        let edge_to:   Vec<NodeId> = deduped.iter().map(|e| e.to).collect();
        let edge_attrs: Vec<EdgeAttributes> = deduped
            .iter()
            .map(|e| EdgeAttributes::new(e.length_m, self.base_weight, e.lanes))
            .collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &deduped {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let node_entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry { point: [pos.lat, pos.lon], id: NodeId::from_index(i) })
            .collect();

        let midpoint_entries: Vec<MidpointEntry> = deduped
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let mid = self.nodes[e.from.index()].midpoint(self.nodes[e.to.index()]);
                MidpointEntry { point: [mid.lat, mid.lon], id: EdgeId::from_index(i) }
            })
            .collect();

        RoadGraph {
            node_pos:       self.nodes.into(),
            node_out_start: node_out_start.into(),
            edge_from:      edge_from.into(),
            edge_to:        edge_to.into(),
            edge_attrs,
            node_idx:       Arc::new(RTree::bulk_load(node_entries)),
            midpoint_idx:   Arc::new(RTree::bulk_load(midpoint_entries)),
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
