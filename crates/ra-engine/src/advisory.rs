//! Route advisory: alternative scoring, recommendation, diversion checks,
//! and emission savings.

use std::fmt;

use ra_core::AdvisoryConfig;
use ra_graph::{RoadGraph, Route};

// ── Scoring ───────────────────────────────────────────────────────────────────

/// An alternative with its suitability score.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredRoute {
    /// Position in the ranked alternatives, from 0.
    pub route_id:          usize,
    /// 1-based rank by total weight.
    pub rank:              usize,
    pub length_km:         f64,
    pub num_segments:      usize,
    pub suitability_score: f64,
    pub route:             Route,
}

/// `1 / (1 + length_km)`: shorter is better.  A trivial route scores 0.
pub fn suitability_score(route: &Route) -> f64 {
    if route.is_trivial() {
        return 0.0;
    }
    1.0 / (1.0 + route.length_km())
}

/// Score ranked alternatives, keeping their order.
pub fn score_alternatives(routes: Vec<Route>) -> Vec<ScoredRoute> {
    routes
        .into_iter()
        .enumerate()
        .map(|(i, route)| ScoredRoute {
            route_id:          i,
            rank:              i + 1,
            length_km:         route.length_km(),
            num_segments:      route.legs.len(),
            suitability_score: suitability_score(&route),
            route,
        })
        .collect()
}

// ── Recommendation ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Recommendation {
    /// `route_id` of the best-scoring alternative; `None` without alternatives.
    pub recommended:   Option<usize>,
    pub alternatives:  Vec<ScoredRoute>,
    pub justification: String,
}

impl Recommendation {
    pub fn recommended_route(&self) -> Option<&ScoredRoute> {
        let id = self.recommended?;
        self.alternatives.iter().find(|a| a.route_id == id)
    }
}

/// Pick the highest-scoring alternative; ties keep the better-ranked one.
pub fn recommend(alternatives: Vec<ScoredRoute>) -> Recommendation {
    let best = alternatives.iter().fold(None::<&ScoredRoute>, |best, alt| match best {
        Some(b) if b.suitability_score >= alt.suitability_score => Some(b),
        _ => Some(alt),
    });

    let (recommended, justification) = match best {
        Some(b) => (
            Some(b.route_id),
            format!(
                "Route {} recommended: length {:.4} km, score {:.4}",
                b.route_id, b.length_km, b.suitability_score
            ),
        ),
        None => (None, "No alternative routes found".to_string()),
    };

    Recommendation { recommended, alternatives, justification }
}

// ── Diversion assessment ──────────────────────────────────────────────────────

/// What the diversion rules need to know about one route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteProfile {
    pub route_id:   usize,
    pub length_km:  f64,
    /// Smallest known lane count along the route.
    pub lane_count: Option<u8>,
}

impl RouteProfile {
    pub fn of(route_id: usize, route: &Route, graph: &RoadGraph) -> Self {
        Self { route_id, length_km: route.length_km(), lane_count: route.min_lanes(graph) }
    }
}

/// An alternative that adds more than the detour threshold.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detour {
    pub route_id: usize,
    pub added_km: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiversionReason {
    /// The primary route is a lane bottleneck.
    SingleLane,
    /// Alternatives that exceed the detour threshold.
    InefficientDetours { threshold_km: f64, flagged: Vec<Detour> },
}

impl fmt::Display for DiversionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiversionReason::SingleLane => {
                f.write_str("Infrastructure Constraint: Primary route is Single Lane.")
            }
            DiversionReason::InefficientDetours { threshold_km, flagged } => {
                write!(
                    f,
                    "Efficiency Constraint: Alternative routes exceed deviation threshold (+{threshold_km:.1}km). \
                     Routes flagged: "
                )?;
                for (i, d) in flagged.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "Route {} (+{:.2}km)", d.route_id, d.added_km)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiversionAssessment {
    pub diversion_required: bool,
    pub reason:             Option<DiversionReason>,
}

/// Decide whether a diversion analysis is needed for `primary`.
///
/// The lane rule is checked first and short-circuits the detour rule.  A
/// lane count of 0 is treated as missing data, not as a bottleneck.
pub fn assess_diversion(
    primary: &RouteProfile,
    alternatives: &[RouteProfile],
    config: &AdvisoryConfig,
) -> DiversionAssessment {
    if primary.lane_count.is_some_and(|l| (1..=config.bottleneck_lanes).contains(&l)) {
        return DiversionAssessment {
            diversion_required: true,
            reason:             Some(DiversionReason::SingleLane),
        };
    }

    let flagged: Vec<Detour> = alternatives
        .iter()
        .filter_map(|alt| {
            let added_km = alt.length_km - primary.length_km;
            (added_km > config.detour_threshold_km).then_some(Detour { route_id: alt.route_id, added_km })
        })
        .collect();

    if flagged.is_empty() {
        return DiversionAssessment { diversion_required: false, reason: None };
    }
    DiversionAssessment {
        diversion_required: true,
        reason: Some(DiversionReason::InefficientDetours {
            threshold_km: config.detour_threshold_km,
            flagged,
        }),
    }
}

// ── Emissions ─────────────────────────────────────────────────────────────────

/// Emission saving of the optimised route, proportional to the time saved.
///
/// `max(0, t_original − t_optimised)`; any non-finite input gives 0.
pub fn emission_savings(time_original: f64, time_optimised: f64) -> f64 {
    let delta = time_original - time_optimised;
    if delta.is_finite() && delta > 0.0 { delta } else { 0.0 }
}
