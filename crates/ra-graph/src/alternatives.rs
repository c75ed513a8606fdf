//! Bounded k-alternative path search.
//!
//! Simple paths from `start` to `end` are enumerated depth-first, ranked by
//! total weight, and the best `k` kept in a bounded max-heap.  Enumeration is
//! exponential on dense graphs, so two hard limits apply to every query:
//!
//! - `hop_cutoff`: no path longer than this many edges is explored;
//! - `max_expansions`: the DFS stops after this many edge relaxations and
//!   returns the best paths found so far (`truncated = true`).
//!
//! Closed edges (non-finite weight) are skipped, so every returned path has a
//! finite total weight.

use std::collections::BinaryHeap;

use log::{debug, warn};

use ra_core::{EdgeId, InputError, NodeId, RoutingConfig};

use crate::network::RoadGraph;
use crate::router::{Cost, Route};
use crate::GraphResult;

/// Hard bounds for one alternative-path query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSearchLimits {
    pub hop_cutoff:     usize,
    pub max_expansions: usize,
}

impl Default for PathSearchLimits {
    fn default() -> Self {
        Self::from(&RoutingConfig::default())
    }
}

impl From<&RoutingConfig> for PathSearchLimits {
    fn from(cfg: &RoutingConfig) -> Self {
        Self { hop_cutoff: cfg.hop_cutoff, max_expansions: cfg.max_expansions }
    }
}

/// Ranked alternatives returned by [`RoadGraph::k_alternative_paths`].
#[derive(Debug, Clone, PartialEq)]
pub struct Alternatives {
    /// At most `k` routes, ascending by total weight.
    pub routes: Vec<Route>,
    /// `true` if the expansion budget ran out before enumeration finished.
    pub truncated: bool,
    /// Edge relaxations performed.
    pub expansions: usize,
}

/// One DFS frame: a node on the current path and its next unexplored edge.
struct Frame {
    node: NodeId,
    next: usize,
    end:  usize,
}

impl RoadGraph {
    /// The `k` least-weight simple paths from `start` to `end`.
    ///
    /// `start == end` yields the single trivial route.
    pub fn k_alternative_paths(
        &self,
        start: NodeId,
        end: NodeId,
        k: usize,
        limits: PathSearchLimits,
    ) -> GraphResult<Alternatives> {
        if limits.hop_cutoff == 0 || limits.max_expansions == 0 {
            return Err(InputError::Config(
                "path search needs a non-zero hop cutoff and expansion budget".into(),
            )
            .into());
        }
        self.check_node(start)?;
        self.check_node(end)?;

        if k == 0 {
            return Ok(Alternatives { routes: Vec::new(), truncated: false, expansions: 0 });
        }
        if start == end {
            let trivial = Route::from_edges(self, start, &[]);
            return Ok(Alternatives { routes: vec![trivial], truncated: false, expansions: 0 });
        }

        // Max-heap on (cost, discovery order): the root is the worst kept path.
        let mut best: BinaryHeap<(Cost, usize, Vec<EdgeId>)> = BinaryHeap::with_capacity(k + 1);
        let mut found = 0usize;

        let mut on_path = vec![false; self.node_count()];
        let mut path: Vec<EdgeId> = Vec::with_capacity(limits.hop_cutoff);
        // prefix[i] = cost of the first i edges of `path`.
        let mut prefix: Vec<f64> = vec![0.0];
        let mut stack = vec![self.frame(start)];
        on_path[start.index()] = true;

        let mut expansions = 0usize;
        let mut truncated = false;

        while let Some(frame) = stack.last_mut() {
            if frame.next == frame.end {
                on_path[frame.node.index()] = false;
                stack.pop();
                path.pop();
                prefix.pop();
                continue;
            }

            let edge = EdgeId::from_index(frame.next);
            frame.next += 1;

            if expansions == limits.max_expansions {
                truncated = true;
                break;
            }
            expansions += 1;

            let w = self.weight(edge);
            let next = self.edge_to[edge.index()];
            if !w.is_finite() || on_path[next.index()] {
                continue;
            }

            let cost = prefix[path.len()] + w;
            if next == end {
                let key = (Cost(cost), found);
                found += 1;
                let keep = best.len() < k
                    || best.peek().is_some_and(|(c, seq, _)| key < (*c, *seq));
                if keep {
                    let mut edges = path.clone();
                    edges.push(edge);
                    best.push((key.0, key.1, edges));
                    if best.len() > k {
                        best.pop();
                    }
                }
                continue;
            }

            if path.len() + 1 < limits.hop_cutoff {
                on_path[next.index()] = true;
                path.push(edge);
                prefix.push(cost);
                stack.push(self.frame(next));
            }
        }

        if truncated {
            warn!(
                "alternative search {start} → {end} hit its budget of {} expansions; \
                 returning best {} of {found} paths found",
                limits.max_expansions,
                best.len().min(k),
            );
        } else {
            debug!("alternative search {start} → {end}: {found} paths in {expansions} expansions");
        }

        let routes = best
            .into_sorted_vec()
            .into_iter()
            .map(|(_, _, edges)| Route::from_edges(self, start, &edges))
            .collect();

        Ok(Alternatives { routes, truncated, expansions })
    }

    fn frame(&self, node: NodeId) -> Frame {
        Frame {
            node,
            next: self.node_out_start[node.index()] as usize,
            end:  self.node_out_start[node.index() + 1] as usize,
        }
    }
}
