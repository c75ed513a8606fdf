//! Nearest-edge damage mapping and per-edge severity statistics.
//!
//! Each [`DamageSegment`] is assigned to the edge whose midpoint is nearest
//! to its centroid (planar degree distance, ties to the lowest `EdgeId`).
//! Point-to-midpoint is an approximation of point-to-segment distance; long
//! edges can lose a cluster to a shorter neighbour.
//!
//! After assignment a statistics pass refreshes every edge:
//!
//! | entries | variance | mean  | std | critical                                   |
//! |---------|----------|-------|-----|--------------------------------------------|
//! | 0       | 0        | 0     | 0   | no                                         |
//! | 1       | 0        | value | 0   | no                                         |
//! | ≥ 2     | pop.     | pop.  | √v  | variance > 0 and max > mean + 2·std        |

use log::{debug, info};
use rustc_hash::FxHashSet;

use ra_core::{EdgeId, InputError};
use ra_graph::{EdgeAttributes, GraphError, RoadGraph};

use crate::cluster::DamageSegment;
use crate::DamageResult;

/// Outcome of one [`EdgeDamageMapper::apply`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MappingSummary {
    pub segments_assigned: usize,
    /// Distinct edges that received damage in this call.
    pub edges_touched: usize,
    /// Edges flagged critical after the statistics pass (whole graph).
    pub critical_edges: usize,
}

/// Maps damage segments onto road edges.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDamageMapper;

impl EdgeDamageMapper {
    /// Accumulate `segments` onto their nearest edges and refresh the
    /// severity statistics of every edge.
    ///
    /// Accumulation grows across calls until [`reset`](Self::reset).  The
    /// graph is untouched if any segment is invalid.
    pub fn apply(&self, graph: &mut RoadGraph, segments: &[DamageSegment]) -> DamageResult<MappingSummary> {
        for seg in segments {
            if !seg.centroid.is_valid() {
                return Err(InputError::InvalidCoordinate(seg.centroid).into());
            }
            if !seg.avg_severity.is_finite() {
                return Err(InputError::NonFiniteSeverity(seg.avg_severity).into());
            }
        }
        if !segments.is_empty() && graph.edge_count() == 0 {
            return Err(GraphError::GraphEmpty.into());
        }

        let targets = nearest_edges(graph, segments).ok_or(GraphError::GraphEmpty)?;

        let mut touched: FxHashSet<EdgeId> = FxHashSet::default();
        for (seg, &edge) in segments.iter().zip(&targets) {
            let attrs = graph.attrs_mut(edge);
            attrs.damage_count += seg.count;
            attrs.total_severity += seg.avg_severity * seg.count as f64;
            attrs.severity.absorb(seg.avg_severity, seg.count);
            touched.insert(edge);
            debug!("segment {} ({} points) → {edge}", seg.cluster_id, seg.count);
        }

        let critical_edges = refresh_statistics(graph);
        let summary = MappingSummary {
            segments_assigned: segments.len(),
            edges_touched: touched.len(),
            critical_edges,
        };
        info!(
            "mapped {} damage segments onto {} edges; {} edges critical",
            summary.segments_assigned, summary.edges_touched, summary.critical_edges,
        );
        Ok(summary)
    }

    /// Clear all damage accumulation and penalties; returns the number of
    /// edges that carried damage.
    pub fn reset(&self, graph: &mut RoadGraph) -> usize {
        let mut cleared = 0;
        for attrs in &mut graph.edge_attrs {
            if attrs.damage_count > 0 || attrs.roughness_penalty_applied {
                cleared += 1;
            }
            attrs.clear_damage();
        }
        info!("damage reset on {cleared} edges");
        cleared
    }
}

/// Map `segments` onto `graph` with the default mapper.
pub fn apply_damage(graph: &mut RoadGraph, segments: &[DamageSegment]) -> DamageResult<MappingSummary> {
    EdgeDamageMapper.apply(graph, segments)
}

/// Clear all damage state from `graph`.
pub fn reset_damage(graph: &mut RoadGraph) -> usize {
    EdgeDamageMapper.reset(graph)
}

fn nearest_edges(graph: &RoadGraph, segments: &[DamageSegment]) -> Option<Vec<EdgeId>> {
    #[cfg(not(feature = "parallel"))]
    {
        segments.iter().map(|s| graph.nearest_edge_by_midpoint(s.centroid)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        segments.par_iter().map(|s| graph.nearest_edge_by_midpoint(s.centroid)).collect()
    }
}

/// Recompute derived severity fields on every edge; returns the critical count.
fn refresh_statistics(graph: &mut RoadGraph) -> usize {
    graph.edge_attrs.iter_mut().map(refresh_edge).filter(|&c| c).count()
}

fn refresh_edge(attrs: &mut EdgeAttributes) -> bool {
    let stats = &attrs.severity;
    let mean = stats.mean();
    let variance = stats.variance();
    let std = stats.std_dev();

    let threshold = mean + 2.0 * std;
    let critical = stats.len() >= 2
        && variance > 0.0
        && stats.max().is_some_and(|max| max > threshold);

    attrs.severity_mean = mean;
    attrs.severity_variance = variance;
    attrs.severity_std = std;
    attrs.critical_damage = critical;
    critical
}
