//! Exponential roughness penalty.
//!
//! ```text
//! density = damage_count / length              (length → default if unknown)
//! factor  = exp(density × avg_severity / severity_scale)   if density > threshold
//!         = 1                                               otherwise
//! weight  = base_weight × factor
//! ```
//!
//! The factor is recomputed from `base_weight` on every call, so applying the
//! penalty twice over unchanged damage leaves every weight as it was.

use log::info;

use ra_core::{InputResult, PenaltyConfig};
use ra_graph::{EdgeAttributes, RoadGraph};

/// Outcome of one penalty pass.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PenaltySummary {
    /// Edges whose density exceeded the threshold.
    pub edges_penalised: usize,
    /// Largest factor applied; `1.0` when nothing was penalised.
    pub max_factor: f64,
}

#[derive(Clone, Debug)]
pub struct PenaltyEngine {
    config: PenaltyConfig,
}

impl PenaltyEngine {
    pub fn new(config: PenaltyConfig) -> InputResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PenaltyConfig {
        &self.config
    }

    /// Damage points per unit length on `attrs`.
    pub fn density(&self, attrs: &EdgeAttributes) -> f64 {
        attrs.damage_count as f64 / attrs.effective_length(self.config.default_length)
    }

    /// Penalty multiplier for `attrs`, `None` at or below the threshold.
    pub fn factor(&self, attrs: &EdgeAttributes) -> Option<f64> {
        let density = self.density(attrs);
        (density > self.config.density_threshold)
            .then(|| (density * attrs.avg_severity() / self.config.severity_scale).exp())
    }

    /// Rewrite every edge's penalty factor and effective weight.
    pub fn apply(&self, graph: &mut RoadGraph) -> PenaltySummary {
        let mut summary = PenaltySummary { edges_penalised: 0, max_factor: 1.0 };

        for attrs in &mut graph.edge_attrs {
            match self.factor(attrs) {
                Some(factor) => {
                    attrs.set_penalty_factor(factor);
                    attrs.roughness_penalty_applied = true;
                    summary.edges_penalised += 1;
                    summary.max_factor = summary.max_factor.max(factor);
                }
                None => {
                    attrs.set_penalty_factor(1.0);
                    attrs.roughness_penalty_applied = false;
                }
            }
        }

        info!(
            "roughness penalty applied to {} edges (max factor {:.4})",
            summary.edges_penalised, summary.max_factor,
        );
        summary
    }
}

impl Default for PenaltyEngine {
    fn default() -> Self {
        Self { config: PenaltyConfig::default() }
    }
}

/// Apply the roughness penalty with the given constants.
pub fn apply_roughness_penalty(graph: &mut RoadGraph, config: &PenaltyConfig) -> InputResult<PenaltySummary> {
    Ok(PenaltyEngine::new(config.clone())?.apply(graph))
}
