//! Unit tests for ra-graph.
//!
//! All tests use hand-crafted graphs so they run without any geometry file.

#[cfg(test)]
mod helpers {
    use ra_core::{GeoPoint, NodeId};
    use crate::{RoadGraph, RoadGraphBuilder};

    /// Build a small grid graph for testing.
    ///
    /// Nodes (lat, lon):
    ///   0:(0,0)  1:(0,1)  2:(0,2)
    ///   3:(1,0)           4:(1,2)
    ///
    /// Undirected edges: 0-1, 1-2, 0-3, 2-4, 3-4
    ///
    /// Weights:
    ///   0→1→2→4: 10+10+10 = 30
    ///   0→3→4:   50+10    = 60
    pub fn grid_graph() -> (RoadGraph, [NodeId; 5]) {
        let mut b = RoadGraphBuilder::new();

        let n0 = b.add_node(GeoPoint::new(0.0, 0.0));
        let n1 = b.add_node(GeoPoint::new(0.0, 1.0));
        let n2 = b.add_node(GeoPoint::new(0.0, 2.0));
        let n3 = b.add_node(GeoPoint::new(1.0, 0.0));
        let n4 = b.add_node(GeoPoint::new(1.0, 2.0));

        b.add_road(n0, n1, 100.0);
        b.add_road(n1, n2, 100.0);
        b.add_road(n2, n4, 100.0);
        b.add_road(n0, n3, 500.0);
        b.add_road(n3, n4, 100.0);

        let mut g = b.build();
        for (u, v, w) in [
            (n0, n1, 10.0), (n1, n0, 10.0),
            (n1, n2, 10.0), (n2, n1, 10.0),
            (n2, n4, 10.0), (n4, n2, 10.0),
            (n0, n3, 50.0), (n3, n0, 50.0),
            (n3, n4, 10.0), (n4, n3, 10.0),
        ] {
            g.set_edge_weight(u, v, w).unwrap();
        }
        (g, [n0, n1, n2, n3, n4])
    }

    /// Direct edge Start→End (5.0) and a detour Start→Mid→End (10 + 10).
    pub fn detour_graph() -> (RoadGraph, [NodeId; 3]) {
        let mut b = RoadGraphBuilder::new();
        let start = b.add_node(GeoPoint::new(0.0, 0.0));
        let mid   = b.add_node(GeoPoint::new(1.0, 1.0));
        let end   = b.add_node(GeoPoint::new(0.0, 2.0));
        b.add_directed_edge(start, end, 5_000.0);
        b.add_directed_edge(start, mid, 10_000.0);
        b.add_directed_edge(mid, end, 10_000.0);
        let mut g = b.build();
        g.set_edge_weight(start, end, 5.0).unwrap();
        g.set_edge_weight(start, mid, 10.0).unwrap();
        g.set_edge_weight(mid, end, 10.0).unwrap();
        (g, [start, mid, end])
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use ra_core::{GeoPoint, InputError};
    use crate::{RoadGraph, RoadGraphBuilder, RoadLine};

    #[test]
    fn empty_build() {
        let g = RoadGraphBuilder::new().build();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_empty());
    }

    #[test]
    fn single_road() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(23.0, 72.5));
        let c = b.add_node(GeoPoint::new(23.1, 72.5));
        b.add_road(a, c, 1_000.0);
        let g = b.build();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2); // bidirectional
        for e in g.edges() {
            assert_eq!(g.attrs(e).weight, 1.0);
            assert_eq!(g.attrs(e).base_weight, 1.0);
            assert_eq!(g.attrs(e).damage_count, 0);
        }
    }

    #[test]
    fn csr_out_edges() {
        let (g, [n0, n1, n2, n3, n4]) = super::helpers::grid_graph();
        assert_eq!(g.out_edges(n1).count(), 2);
        assert_eq!(g.out_degree(n0), 2);
        assert_eq!(g.out_degree(n2), 2);
        assert_eq!(g.out_degree(n3), 2);
        assert_eq!(g.out_degree(n4), 2);
        for e in g.out_edges(n0) {
            assert_eq!(g.edge_from[e.index()], n0);
        }
    }

    #[test]
    fn directed_only_edge() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, 100.0);
        let g = b.build();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.out_degree(a), 1);
        assert_eq!(g.out_degree(c), 0);
        assert!(g.find_edge(a, c).is_some());
        assert!(g.find_edge(c, a).is_none());
    }

    #[test]
    fn duplicate_edge_last_wins() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, 100.0);
        b.add_directed_edge(a, c, 250.0);
        let g = b.build();
        assert_eq!(g.edge_count(), 1);
        let e = g.find_edge(a, c).unwrap();
        assert_eq!(g.attrs(e).length_m, 250.0);
    }

    #[test]
    fn nodes_dedup_by_rounded_coordinate() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(23.022_500_01, 72.571_400_02));
        let same = b.add_node(GeoPoint::new(23.022_499_99, 72.571_399_98));
        let other = b.add_node(GeoPoint::new(23.022_51, 72.571_4));
        assert_eq!(a, same);
        assert_ne!(a, other);
        assert_eq!(b.node_count(), 2);
        assert_eq!(b.node_pos(a), GeoPoint::new(23.0225, 72.5714));
    }

    #[test]
    fn line_builds_consecutive_edges() {
        let line = RoadLine::from_lon_lat(&[(72.5714, 23.0225), (72.5714, 23.0235), (72.5724, 23.0235)])
            .with_lanes(2);
        let g = RoadGraph::from_lines(&[line], 1.0).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        for e in g.edges() {
            let attrs = g.attrs(e);
            assert!(attrs.length_m > 100.0 && attrs.length_m < 120.0, "got {}", attrs.length_m);
            assert_eq!(attrs.lanes, Some(2));
        }
    }

    #[test]
    fn lines_share_nodes_at_junctions() {
        let a = RoadLine::from_lon_lat(&[(72.0, 23.0), (72.001, 23.0)]);
        let b = RoadLine::from_lon_lat(&[(72.001, 23.0), (72.001, 23.001)]).bidirectional();
        let g = RoadGraph::from_lines(&[a, b], 1.0).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn line_rejects_degenerate_and_invalid_input() {
        let mut b = RoadGraphBuilder::new();
        let short = RoadLine::from_lon_lat(&[(72.0, 23.0)]);
        assert_eq!(b.add_line(&short), Err(InputError::DegenerateLine(1)));

        let bad = RoadLine::from_lon_lat(&[(72.0, 23.0), (200.0, 23.0)]);
        assert!(matches!(b.add_line(&bad), Err(InputError::InvalidCoordinate(_))));
        assert_eq!(b.node_count(), 0, "validation must precede node creation");
    }

    #[test]
    fn rounded_duplicate_vertices_skip_self_loops() {
        let line = RoadLine::from_lon_lat(&[(72.0, 23.0), (72.000_000_1, 23.0), (72.001, 23.0)]);
        let g = RoadGraph::from_lines(&[line], 1.0).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn negative_base_weight_rejected() {
        assert!(RoadGraphBuilder::new().base_weight(-0.5).is_err());
    }
}

// ── Spatial snap ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use ra_core::GeoPoint;
    use crate::{GraphError, RoadGraphBuilder};

    #[test]
    fn snap_exact_position() {
        let (g, [n0, ..]) = super::helpers::grid_graph();
        assert_eq!(g.nearest_node(GeoPoint::new(0.0, 0.0)).unwrap(), n0);
    }

    #[test]
    fn snap_nearest() {
        let (g, [n0, n1, ..]) = super::helpers::grid_graph();
        assert_eq!(g.nearest_node(GeoPoint::new(0.0, 0.4)).unwrap(), n0);
        assert_eq!(g.nearest_node(GeoPoint::new(0.0, 0.6)).unwrap(), n1);
    }

    #[test]
    fn snap_has_no_tolerance() {
        let (g, [.., n4]) = super::helpers::grid_graph();
        assert_eq!(g.nearest_node(GeoPoint::new(40.0, 80.0)).unwrap(), n4);
    }

    #[test]
    fn empty_graph_reports_graph_empty() {
        let g = RoadGraphBuilder::new().build();
        assert_eq!(g.nearest_node(GeoPoint::new(0.0, 0.0)), Err(GraphError::GraphEmpty));
    }

    #[test]
    fn k_nearest_order() {
        let (g, nodes) = super::helpers::grid_graph();
        let nearest = g.k_nearest_nodes(GeoPoint::new(0.0, 0.0), 2);
        assert_eq!(nearest[0], nodes[0]);
        // n1 and n3 are equidistant in lat/lon — either is valid.
        assert!(nearest[1] == nodes[1] || nearest[1] == nodes[3]);
    }

    #[test]
    fn nearest_edge_by_midpoint() {
        let (g, [_, _, n2, _, n4]) = super::helpers::grid_graph();
        // Midpoint of 2-4 is (0.5, 2.0).
        let e = g.nearest_edge_by_midpoint(GeoPoint::new(0.6, 2.1)).unwrap();
        let (u, v) = g.endpoints(e);
        assert!((u, v) == (n2, n4) || (u, v) == (n4, n2));
    }

    #[test]
    fn midpoint_ties_resolve_to_first_edge() {
        let (g, [n0, n1, ..]) = super::helpers::grid_graph();
        // 0→1 and 1→0 share the midpoint (0, 0.5); 0→1 comes first.
        let e = g.nearest_edge_by_midpoint(GeoPoint::new(0.0, 0.5)).unwrap();
        assert_eq!(Some(e), g.find_edge(n0, n1));
        assert!(g.find_edge(n0, n1).unwrap() < g.find_edge(n1, n0).unwrap());
    }

    #[test]
    fn midpoint_ties_follow_insertion_order_per_source() {
        let mut b = crate::RoadGraphBuilder::new();
        let a  = b.add_node(GeoPoint::new(0.0, 0.0));
        let lo = b.add_node(GeoPoint::new(0.0, -2.0));
        let hi = b.add_node(GeoPoint::new(0.0, 2.0));
        b.add_directed_edge(a, hi, 100.0);
        b.add_directed_edge(a, lo, 100.0);
        b.add_directed_edge(a, hi, 300.0);
        let g = b.build();

        // The repeated pair keeps its first slot with the latest attributes.
        let targets: Vec<_> = g.out_edges(a).map(|e| g.endpoints(e).1).collect();
        assert_eq!(targets, vec![hi, lo]);
        assert_eq!(g.attrs(g.find_edge(a, hi).unwrap()).length_m, 300.0);

        // Midpoints (0, 1) and (0, -1) are equidistant from the origin.
        let e = g.nearest_edge_by_midpoint(GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(g.endpoints(e), (a, hi));
    }
}

// ── Dijkstra routing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use ra_core::{GeoPoint, NodeId};
    use crate::{DijkstraRouter, GraphError, RoadGraphBuilder, Router};

    #[test]
    fn trivial_same_node() {
        let (g, [n0, ..]) = super::helpers::grid_graph();
        let r = DijkstraRouter.route(&g, n0, n0).unwrap();
        assert!(r.is_trivial());
        assert_eq!(r.nodes, vec![n0]);
        assert_eq!(r.total_weight, 0.0);
    }

    #[test]
    fn shortest_path_correct() {
        let (g, [n0, n1, n2, _, n4]) = super::helpers::grid_graph();
        let route = g.shortest_path(n0, n4).unwrap();

        assert_eq!(route.total_weight, 30.0);
        assert_eq!(route.total_length_m, 300.0);
        assert_eq!(route.nodes, vec![n0, n1, n2, n4]);
        assert_eq!(route.legs.len(), 3);
        assert_eq!(route.legs[0].from, n0);
        assert_eq!(route.legs[0].to, n1);
        assert_eq!(route.legs[2].to, n4);
        assert!(route.legs.iter().all(|l| l.weight == 10.0));
    }

    #[test]
    fn no_route_disconnected() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(1.0, 0.0));
        let g = b.build();
        let err = g.shortest_path(a, c).unwrap_err();
        assert_eq!(err, GraphError::NoPath { from: a, to: c });
        assert!(err.is_not_found());
    }

    #[test]
    fn directed_one_way_blocks_return() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, 100.0);
        let g = b.build();
        assert!(g.shortest_path(a, c).is_ok());
        assert!(g.shortest_path(c, a).is_err());
    }

    #[test]
    fn empty_graph_reports_graph_empty() {
        let g = RoadGraphBuilder::new().build();
        assert_eq!(g.shortest_path(NodeId(0), NodeId(1)), Err(GraphError::GraphEmpty));
    }

    #[test]
    fn unknown_endpoint_is_not_found() {
        let (g, [n0, ..]) = super::helpers::grid_graph();
        let err = g.shortest_path(n0, NodeId(99)).unwrap_err();
        assert_eq!(err, GraphError::NodeNotFound(NodeId(99)));
        assert!(err.is_not_found());
    }

    #[test]
    fn closure_forces_reroute() {
        let (mut g, [start, mid, end]) = super::helpers::detour_graph();

        let before = g.shortest_path(start, end).unwrap();
        assert_eq!(before.nodes, vec![start, end]);
        assert_eq!(before.total_weight, 5.0);

        g.set_edge_weight(start, end, f64::INFINITY).unwrap();

        let after = g.shortest_path(start, end).unwrap();
        assert_eq!(after.nodes, vec![start, mid, end]);
        assert_eq!(after.total_weight, 20.0);
    }

    #[test]
    fn closing_the_only_path_means_no_path() {
        let (mut g, [start, mid, end]) = super::helpers::detour_graph();
        g.set_edge_weight(start, end, f64::INFINITY).unwrap();
        g.set_edge_weight(mid, end, f64::INFINITY).unwrap();
        assert!(matches!(g.shortest_path(start, end), Err(GraphError::NoPath { .. })));
    }
}

// ── Weight mutation ───────────────────────────────────────────────────────────

#[cfg(test)]
mod weights {
    use ra_core::{InputError, NodeId};
    use crate::GraphError;

    #[test]
    fn rejects_negative_and_nan() {
        let (mut g, [n0, n1, ..]) = super::helpers::grid_graph();
        assert_eq!(
            g.set_edge_weight(n0, n1, -1.0),
            Err(GraphError::Input(InputError::InvalidWeight(-1.0)))
        );
        assert!(g.set_edge_weight(n0, n1, f64::NAN).is_err());
        assert_eq!(g.weight(g.find_edge(n0, n1).unwrap()), 10.0);
    }

    #[test]
    fn missing_edge() {
        let (mut g, [n0, _, n2, ..]) = super::helpers::grid_graph();
        assert_eq!(
            g.set_edge_weight(n0, n2, 3.0),
            Err(GraphError::EdgeNotFound { from: n0, to: n2 })
        );
        assert!(g.set_edge_weight(NodeId(77), n0, 3.0).is_err());
    }

    #[test]
    fn override_keeps_penalty_factor() {
        let (mut g, [n0, n1, ..]) = super::helpers::grid_graph();
        let e = g.find_edge(n0, n1).unwrap();
        g.attrs_mut(e).set_penalty_factor(2.0);
        assert_eq!(g.weight(e), 20.0);

        g.set_edge_weight(n0, n1, f64::INFINITY).unwrap();
        assert!(g.attrs(e).is_closed());

        g.set_edge_weight(n0, n1, 4.0).unwrap();
        assert_eq!(g.weight(e), 8.0);
        assert_eq!(g.attrs(e).base_weight, 4.0);
    }

    #[test]
    fn effective_length_defaults() {
        let (g, [n0, n1, ..]) = super::helpers::grid_graph();
        let mut attrs = g.attrs(g.find_edge(n0, n1).unwrap()).clone();
        assert_eq!(attrs.effective_length(100.0), 100.0);
        attrs.length_m = 0.0;
        assert_eq!(attrs.effective_length(100.0), 100.0);
        attrs.length_m = 37.5;
        assert_eq!(attrs.effective_length(100.0), 37.5);
    }

    #[test]
    fn clear_damage_restores_base_weight() {
        let (mut g, [n0, n1, ..]) = super::helpers::grid_graph();
        let e = g.find_edge(n0, n1).unwrap();
        let attrs = g.attrs_mut(e);
        attrs.damage_count = 12;
        attrs.total_severity = 36.0;
        attrs.severity.absorb(3.0, 12);
        attrs.set_penalty_factor(1.5);
        attrs.roughness_penalty_applied = true;

        attrs.clear_damage();
        assert_eq!(attrs.damage_count, 0);
        assert!(attrs.severity.is_empty());
        assert!(!attrs.roughness_penalty_applied);
        assert_eq!(attrs.weight, 10.0);
    }
}

// ── Severity aggregates ───────────────────────────────────────────────────────

#[cfg(test)]
mod severity {
    use crate::SeverityStats;

    #[test]
    fn empty_stats() {
        let s = SeverityStats::new();
        assert!(s.is_empty());
        assert_eq!(s.mean(), 0.0);
        assert_eq!(s.variance(), 0.0);
        assert_eq!(s.max(), None);
    }

    #[test]
    fn identical_values_have_exactly_zero_variance() {
        let mut s = SeverityStats::new();
        s.absorb(2.7, 4);
        s.absorb(2.7, 9);
        s.absorb(2.7, 1);
        assert_eq!(s.len(), 14);
        assert_eq!(s.mean(), 2.7);
        assert_eq!(s.variance(), 0.0);
    }

    #[test]
    fn batched_merge_matches_two_pass_population_variance() {
        let mut s = SeverityStats::new();
        s.absorb(2.0, 10);
        s.absorb(15.0, 2);
        s.absorb(1.5, 5);

        let values: Vec<f64> = std::iter::repeat_n(2.0, 10)
            .chain(std::iter::repeat_n(15.0, 2))
            .chain(std::iter::repeat_n(1.5, 5))
            .collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        assert_eq!(s.len(), 17);
        assert!((s.mean() - mean).abs() < 1e-12);
        assert!((s.variance() - var).abs() < 1e-9);
        assert_eq!(s.max(), Some(15.0));
    }

    #[test]
    fn zero_repeat_is_ignored() {
        let mut s = SeverityStats::new();
        s.absorb(9.0, 0);
        assert!(s.is_empty());
    }
}

// ── Alternative paths ─────────────────────────────────────────────────────────

#[cfg(test)]
mod alternatives {
    use ra_core::{GeoPoint, NodeId};
    use crate::{GraphError, PathSearchLimits, RoadGraphBuilder};

    #[test]
    fn ranked_by_total_weight() {
        let (g, [n0, n1, n2, n3, n4]) = super::helpers::grid_graph();
        let alts = g.k_alternative_paths(n0, n4, 3, PathSearchLimits::default()).unwrap();
        assert!(!alts.truncated);
        assert_eq!(alts.routes.len(), 2);
        assert_eq!(alts.routes[0].nodes, vec![n0, n1, n2, n4]);
        assert_eq!(alts.routes[0].total_weight, 30.0);
        assert_eq!(alts.routes[1].nodes, vec![n0, n3, n4]);
        assert_eq!(alts.routes[1].total_weight, 60.0);
    }

    #[test]
    fn k_limits_result() {
        let (g, [n0, .., n4]) = super::helpers::grid_graph();
        let alts = g.k_alternative_paths(n0, n4, 1, PathSearchLimits::default()).unwrap();
        assert_eq!(alts.routes.len(), 1);
        assert_eq!(alts.routes[0].total_weight, 30.0);

        let none = g.k_alternative_paths(n0, n4, 0, PathSearchLimits::default()).unwrap();
        assert!(none.routes.is_empty());
    }

    #[test]
    fn hop_cutoff_prunes_long_paths() {
        let (g, [n0, _, _, n3, n4]) = super::helpers::grid_graph();
        let limits = PathSearchLimits { hop_cutoff: 2, ..PathSearchLimits::default() };
        let alts = g.k_alternative_paths(n0, n4, 3, limits).unwrap();
        assert_eq!(alts.routes.len(), 1);
        assert_eq!(alts.routes[0].nodes, vec![n0, n3, n4]);
    }

    #[test]
    fn closed_edges_are_not_offered() {
        let (mut g, [start, mid, end]) = super::helpers::detour_graph();
        g.set_edge_weight(start, end, f64::INFINITY).unwrap();
        let alts = g.k_alternative_paths(start, end, 3, PathSearchLimits::default()).unwrap();
        assert_eq!(alts.routes.len(), 1);
        assert_eq!(alts.routes[0].nodes, vec![start, mid, end]);
    }

    #[test]
    fn budget_exhaustion_returns_best_effort() {
        // Complete digraph on 8 nodes: enumerating every simple path is large.
        let mut b = RoadGraphBuilder::new();
        let nodes: Vec<NodeId> = (0..8)
            .map(|i| b.add_node(GeoPoint::new(0.0, i as f64 * 0.01)))
            .collect();
        for &u in &nodes {
            for &v in &nodes {
                if u != v {
                    b.add_directed_edge(u, v, 100.0);
                }
            }
        }
        let g = b.build();
        let limits = PathSearchLimits { hop_cutoff: 20, max_expansions: 50 };
        let alts = g.k_alternative_paths(nodes[0], nodes[7], 3, limits).unwrap();
        assert!(alts.truncated);
        assert_eq!(alts.expansions, 50);
        assert!(!alts.routes.is_empty());
        assert!(alts.routes.windows(2).all(|w| w[0].total_weight <= w[1].total_weight));
    }

    #[test]
    fn zero_cutoff_rejected() {
        let (g, [n0, .., n4]) = super::helpers::grid_graph();
        let limits = PathSearchLimits { hop_cutoff: 0, max_expansions: 10 };
        assert!(matches!(
            g.k_alternative_paths(n0, n4, 3, limits),
            Err(GraphError::Input(_))
        ));
    }

    #[test]
    fn empty_graph() {
        let g = RoadGraphBuilder::new().build();
        assert_eq!(
            g.k_alternative_paths(NodeId(0), NodeId(1), 3, PathSearchLimits::default()),
            Err(GraphError::GraphEmpty)
        );
    }
}

// ── Shared graph ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod shared {
    use crate::{GraphError, GraphResult, RoadGraph, SharedGraph};

    #[test]
    fn snapshots_are_isolated_from_later_writes() {
        let (g, [start, _, end]) = super::helpers::detour_graph();
        let shared = SharedGraph::new(g);

        let before = shared.snapshot();
        shared
            .try_update(|g| g.set_edge_weight(start, end, f64::INFINITY))
            .unwrap();
        let after = shared.snapshot();

        assert_eq!(before.shortest_path(start, end).unwrap().nodes.len(), 2);
        assert_eq!(after.shortest_path(start, end).unwrap().nodes.len(), 3);
    }

    #[test]
    fn failed_write_is_not_published() {
        let (g, [start, mid, end]) = super::helpers::detour_graph();
        let shared = SharedGraph::new(g);

        let result: GraphResult<()> = shared.try_update(|g| {
            g.set_edge_weight(start, end, 99.0)?;
            g.set_edge_weight(end, mid, 1.0)?; // no such edge
            Ok(())
        });
        assert!(matches!(result, Err(GraphError::EdgeNotFound { .. })));

        let snap = shared.snapshot();
        assert_eq!(snap.weight(snap.find_edge(start, end).unwrap()), 5.0);
    }

    #[test]
    fn replace_swaps_network() {
        let shared = SharedGraph::empty();
        assert!(shared.snapshot().is_empty());
        let (g, _) = super::helpers::grid_graph();
        let old = shared.replace(g);
        assert!(old.is_empty());
        assert_eq!(shared.snapshot().node_count(), 5);
        shared.replace(RoadGraph::empty());
        assert!(shared.snapshot().is_empty());
    }

    #[test]
    fn concurrent_readers_and_writer() {
        let (g, [start, _, end]) = super::helpers::detour_graph();
        let shared = SharedGraph::new(g);

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        let snap = shared.snapshot();
                        let w = snap.shortest_path(start, end).unwrap().total_weight;
                        assert!(w == 5.0 || w == 20.0);
                    }
                });
            }
            s.spawn(|| {
                for i in 0..50 {
                    let w = if i % 2 == 0 { f64::INFINITY } else { 5.0 };
                    shared.try_update(|g| g.set_edge_weight(start, end, w)).unwrap();
                }
            });
        });
    }
}
