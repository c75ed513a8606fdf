//! Tunable constants for every analytics stage.
//!
//! # Design
//!
//! Each stage owns a small config struct whose `Default` carries the
//! calibrated constants.  `AnalyticsConfig` bundles them so an application
//! can load a single TOML/JSON document (with the `serde` feature) and hand
//! it to the analytics context.
//!
//! | Struct           | Stage                                  |
//! |------------------|----------------------------------------|
//! | `ClusterConfig`  | DBSCAN radius and density              |
//! | `PenaltyConfig`  | roughness density threshold and scale  |
//! | `FlowConfig`     | entropy and low-speed thresholds       |
//! | `RoutingConfig`  | alternative-path bounds                |
//! | `AdvisoryConfig` | diversion rules                        |

use crate::{InputError, InputResult};

// ── ClusterConfig ─────────────────────────────────────────────────────────────

/// DBSCAN parameters for damage-point clustering.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClusterConfig {
    /// Neighbourhood radius in metres (great-circle).  Default: 20.
    pub epsilon_meters: f64,
    /// Minimum neighbours (the point itself included) for a core point.
    /// Default: 3.
    pub min_samples: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { epsilon_meters: 20.0, min_samples: 3 }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> InputResult<()> {
        if !(self.epsilon_meters.is_finite() && self.epsilon_meters > 0.0) {
            return Err(InputError::NonPositiveEpsilon(self.epsilon_meters));
        }
        if self.min_samples == 0 {
            return Err(InputError::ZeroMinSamples);
        }
        Ok(())
    }
}

// ── PenaltyConfig ─────────────────────────────────────────────────────────────

/// Roughness penalty model.
///
///   density = damage_count / length
///   factor  = exp(density × avg_severity / severity_scale)   if density > threshold
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PenaltyConfig {
    /// Damage points per length unit above which the penalty applies.
    /// Default: 0.05 (five points per 100 m).
    pub density_threshold: f64,
    /// Divisor applied to the average severity inside the exponent.
    /// Default: 10.
    pub severity_scale: f64,
    /// Length substituted for edges with zero or unknown length.  Default: 100.
    pub default_length: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            density_threshold: 0.05,
            severity_scale:    10.0,
            default_length:    100.0,
        }
    }
}

impl PenaltyConfig {
    pub fn validate(&self) -> InputResult<()> {
        if !(self.density_threshold.is_finite() && self.density_threshold >= 0.0) {
            return Err(InputError::Config(format!(
                "density_threshold must be finite and non-negative, got {}",
                self.density_threshold
            )));
        }
        if !(self.severity_scale.is_finite() && self.severity_scale > 0.0) {
            return Err(InputError::Config(format!(
                "severity_scale must be positive, got {}",
                self.severity_scale
            )));
        }
        if !(self.default_length.is_finite() && self.default_length > 0.0) {
            return Err(InputError::Config(format!(
                "default_length must be positive, got {}",
                self.default_length
            )));
        }
        Ok(())
    }
}

// ── FlowConfig ────────────────────────────────────────────────────────────────

/// Entropy classifier thresholds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlowConfig {
    /// Entropy (bits) above which flow is unstable.  Default: 1.5.
    pub entropy_threshold: f64,
    /// Mean speed (km/h) below which stable flow is congested.  Default: 20.
    pub low_speed_threshold: f64,
    /// Histogram bin width in km/h.  Default: 5.
    pub bin_width_kmh: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            entropy_threshold:   1.5,
            low_speed_threshold: 20.0,
            bin_width_kmh:       5.0,
        }
    }
}

impl FlowConfig {
    pub fn validate(&self) -> InputResult<()> {
        if !(self.bin_width_kmh.is_finite() && self.bin_width_kmh > 0.0) {
            return Err(InputError::Config(format!(
                "bin_width_kmh must be positive, got {}",
                self.bin_width_kmh
            )));
        }
        if !self.entropy_threshold.is_finite() || !self.low_speed_threshold.is_finite() {
            return Err(InputError::Config("flow thresholds must be finite".into()));
        }
        Ok(())
    }
}

// ── RoutingConfig ─────────────────────────────────────────────────────────────

/// Bounds for simple-path enumeration.
///
/// Both limits are hard: enumeration is exponential on dense graphs and must
/// never run unbounded.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutingConfig {
    /// Number of alternatives returned.  Default: 3.
    pub alternatives: usize,
    /// Maximum edges per enumerated path.  Default: 20.
    pub hop_cutoff: usize,
    /// Maximum DFS edge expansions per query before returning the best paths
    /// found so far.  Default: 200 000.
    pub max_expansions: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            alternatives:   3,
            hop_cutoff:     20,
            max_expansions: 200_000,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> InputResult<()> {
        if self.hop_cutoff == 0 {
            return Err(InputError::Config("hop_cutoff must be at least 1".into()));
        }
        if self.max_expansions == 0 {
            return Err(InputError::Config("max_expansions must be at least 1".into()));
        }
        Ok(())
    }
}

// ── AdvisoryConfig ────────────────────────────────────────────────────────────

/// Diversion assessment rules.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdvisoryConfig {
    /// Extra kilometres an alternative may add before it counts as an
    /// inefficient detour.  Default: 3.
    pub detour_threshold_km: f64,
    /// Primary routes with between 1 and this many lanes are bottlenecks.
    /// Default: 1.
    pub bottleneck_lanes: u8,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self { detour_threshold_km: 3.0, bottleneck_lanes: 1 }
    }
}

// ── AnalyticsConfig ───────────────────────────────────────────────────────────

/// Top-level analytics configuration.
///
/// Typically loaded from a TOML/JSON file by the application crate and passed
/// to the analytics context.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalyticsConfig {
    pub cluster:  ClusterConfig,
    pub penalty:  PenaltyConfig,
    pub flow:     FlowConfig,
    pub routing:  RoutingConfig,
    pub advisory: AdvisoryConfig,
    /// Traversal cost given to every edge of a freshly loaded network.
    /// Default: 1.0.
    pub base_weight: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cluster:     ClusterConfig::default(),
            penalty:     PenaltyConfig::default(),
            flow:        FlowConfig::default(),
            routing:     RoutingConfig::default(),
            advisory:    AdvisoryConfig::default(),
            base_weight: 1.0,
        }
    }
}

impl AnalyticsConfig {
    /// Check every section; the first failure wins.
    pub fn validate(&self) -> InputResult<()> {
        self.cluster.validate()?;
        self.penalty.validate()?;
        self.flow.validate()?;
        self.routing.validate()?;
        if !(self.base_weight.is_finite() && self.base_weight >= 0.0) {
            return Err(InputError::InvalidWeight(self.base_weight));
        }
        if !(self.advisory.detour_threshold_km.is_finite()
            && self.advisory.detour_threshold_km >= 0.0)
        {
            return Err(InputError::Config(format!(
                "detour_threshold_km must be non-negative, got {}",
                self.advisory.detour_threshold_km
            )));
        }
        Ok(())
    }
}
