//! Typed per-edge attributes.
//!
//! Every directed edge carries one [`EdgeAttributes`] record, indexed by
//! `EdgeId`.  The record is the only mutable part of a [`RoadGraph`]; the
//! topology is frozen at build time.
//!
//! # Weight model
//!
//! ```text
//! weight = base_weight × penalty_factor
//! ```
//!
//! `base_weight` is the unpenalised cost (1.0 for a fresh network, `+∞` while
//! an edge is closed).  `penalty_factor` is rewritten by the roughness
//! penalty pass.  Keeping the two apart makes the penalty idempotent: running
//! it twice over the same damage leaves the weight unchanged.
//!
//! [`RoadGraph`]: crate::RoadGraph

use ra_core::{InputError, InputResult};

// ── SeverityStats ─────────────────────────────────────────────────────────────

/// Streaming severity aggregates for one edge.
///
/// Replaces a per-point severity list: count, mean and the sum of squared
/// deviations (`m2`) are merged batch-wise with Chan's parallel update, and
/// the running maximum answers "does any value exceed a threshold" exactly.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeverityStats {
    count: u64,
    mean:  f64,
    m2:    f64,
    max:   f64,
}

impl SeverityStats {
    pub fn new() -> Self {
        Self { count: 0, mean: 0.0, m2: 0.0, max: f64::NEG_INFINITY }
    }

    /// Record `repeat` observations of `value`.
    pub fn absorb(&mut self, value: f64, repeat: u64) {
        if repeat == 0 {
            return;
        }
        if self.count == 0 {
            // Exact seed: a batch of identical values has zero spread.
            self.count = repeat;
            self.mean  = value;
            self.m2    = 0.0;
            self.max   = value;
            return;
        }

        let n     = self.count as f64;
        let k     = repeat as f64;
        let total = n + k;
        let delta = value - self.mean;

        self.mean += delta * (k / total);
        self.m2   += delta * delta * (n * k / total);
        self.count += repeat;
        if value > self.max {
            self.max = value;
        }
    }

    /// Number of observations.
    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Population mean; `0.0` when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// Population variance; `0.0` for fewer than two observations.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / self.count as f64).max(0.0)
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Largest observation, `None` when empty.
    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }
}

impl Default for SeverityStats {
    fn default() -> Self {
        Self::new()
    }
}

// ── EdgeAttributes ────────────────────────────────────────────────────────────

/// Mutable attributes of one directed edge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeAttributes {
    /// Great-circle length in metres.  `0.0` when unknown.
    pub length_m: f64,

    /// Lane count from the source geometry, if known.
    pub lanes: Option<u8>,

    /// Unpenalised traversal cost.  Never negative; `+∞` closes the edge.
    pub base_weight: f64,

    /// Effective traversal cost used by routing (`base_weight × penalty_factor`).
    pub weight: f64,

    /// Multiplier from the last roughness penalty pass; `1.0` when none.
    pub penalty_factor: f64,

    // ── Damage accumulation (grows until reset) ───────────────────────────
    pub damage_count: u64,
    pub total_severity: f64,
    pub severity: SeverityStats,

    // ── Derived by the statistics pass ────────────────────────────────────
    pub severity_variance: f64,
    pub severity_mean: f64,
    pub severity_std: f64,
    pub critical_damage: bool,

    pub roughness_penalty_applied: bool,
}

impl EdgeAttributes {
    pub fn new(length_m: f64, base_weight: f64, lanes: Option<u8>) -> Self {
        Self {
            length_m,
            lanes,
            base_weight,
            weight: base_weight,
            penalty_factor: 1.0,
            damage_count: 0,
            total_severity: 0.0,
            severity: SeverityStats::new(),
            severity_variance: 0.0,
            severity_mean: 0.0,
            severity_std: 0.0,
            critical_damage: false,
            roughness_penalty_applied: false,
        }
    }

    /// Length to use in density maths: `default` if unknown, zero, or
    /// non-finite.
    #[inline]
    pub fn effective_length(&self, default: f64) -> f64 {
        if self.length_m.is_finite() && self.length_m > 0.0 {
            self.length_m
        } else {
            default
        }
    }

    /// `true` while the edge cannot be traversed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        !self.weight.is_finite()
    }

    /// Replace the unpenalised cost, keeping the current penalty factor.
    pub fn set_base_weight(&mut self, base_weight: f64) -> InputResult<()> {
        if base_weight.is_nan() || base_weight < 0.0 {
            return Err(InputError::InvalidWeight(base_weight));
        }
        self.base_weight = base_weight;
        self.refresh_weight();
        Ok(())
    }

    /// Replace the penalty factor and recompute the effective weight.
    pub fn set_penalty_factor(&mut self, factor: f64) {
        self.penalty_factor = factor;
        self.refresh_weight();
    }

    /// Mean severity of the accumulated damage; `0.0` without damage.
    #[inline]
    pub fn avg_severity(&self) -> f64 {
        if self.damage_count == 0 {
            0.0
        } else {
            self.total_severity / self.damage_count as f64
        }
    }

    /// Drop all damage accumulation and penalties.
    pub fn clear_damage(&mut self) {
        self.damage_count = 0;
        self.total_severity = 0.0;
        self.severity = SeverityStats::new();
        self.severity_variance = 0.0;
        self.severity_mean = 0.0;
        self.severity_std = 0.0;
        self.critical_damage = false;
        self.roughness_penalty_applied = false;
        self.set_penalty_factor(1.0);
    }

    fn refresh_weight(&mut self) {
        // A free edge stays free even if the exponential overflowed to ∞.
        self.weight = if self.base_weight == 0.0 {
            0.0
        } else {
            self.base_weight * self.penalty_factor
        };
    }
}
