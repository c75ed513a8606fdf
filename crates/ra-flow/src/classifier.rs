//! Shannon-entropy flow-state classification.
//!
//! Speeds (km/h) are binned into a fixed-width histogram over
//! `[0, max + 10)`; the entropy of the bin distribution separates mixed
//! (unstable) traffic from uniform traffic, and the mean speed then separates
//! uniformly slow from uniformly fast.
//!
//! ```text
//! H > entropy_threshold         → Unstable
//! mean < low_speed_threshold    → Congested
//! otherwise                     → FreeFlow
//! ```
//!
//! Non-finite and negative samples are ignored.  With no usable samples the
//! road is assumed empty and reads as free flow.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use ra_core::{EdgeId, FlowConfig, InputResult};

/// Headroom added above the fastest sample before binning, in km/h.
const RANGE_HEADROOM_KMH: f64 = 10.0;

// ── FlowState ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowState {
    FreeFlow,
    Congested,
    Unstable,
}

impl FlowState {
    /// Human-readable label: `"Free Flow"`, `"Congested"` or `"Unstable"`.
    pub fn label(self) -> &'static str {
        match self {
            FlowState::FreeFlow  => "Free Flow",
            FlowState::Congested => "Congested",
            FlowState::Unstable  => "Unstable",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classification together with the measurements behind it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowReading {
    pub state:        FlowState,
    /// Shannon entropy of the speed histogram, in bits.
    pub entropy_bits: f64,
    /// Mean of the usable samples, km/h; `0.0` without samples.
    pub mean_speed:   f64,
    /// Number of usable samples.
    pub sample_count: usize,
}

// ── FlowClassifier ────────────────────────────────────────────────────────────

/// Pure, deterministic flow classifier.
#[derive(Clone, Debug)]
pub struct FlowClassifier {
    config: FlowConfig,
}

impl FlowClassifier {
    pub fn new(config: FlowConfig) -> InputResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn classify(&self, speeds: &[f64]) -> FlowState {
        self.reading(speeds).state
    }

    /// Classify `speeds` and report entropy, mean and sample count.
    pub fn reading(&self, speeds: &[f64]) -> FlowReading {
        let usable: Vec<f64> = speeds.iter().copied().filter(|s| s.is_finite() && *s >= 0.0).collect();
        if usable.is_empty() {
            return FlowReading {
                state:        FlowState::FreeFlow,
                entropy_bits: 0.0,
                mean_speed:   0.0,
                sample_count: 0,
            };
        }

        let n = usable.len() as f64;
        let mean_speed = usable.iter().sum::<f64>() / n;
        let entropy_bits = histogram_entropy(&usable, self.config.bin_width_kmh);

        let state = if entropy_bits > self.config.entropy_threshold {
            FlowState::Unstable
        } else if mean_speed < self.config.low_speed_threshold {
            FlowState::Congested
        } else {
            FlowState::FreeFlow
        };

        FlowReading { state, entropy_bits, mean_speed, sample_count: usable.len() }
    }

    /// Classify each edge's sample window; output keeps input order.
    pub fn classify_edges(&self, samples: &[(EdgeId, Vec<f64>)]) -> Vec<(EdgeId, FlowReading)> {
        let classify = |(edge, speeds): &(EdgeId, Vec<f64>)| (*edge, self.reading(speeds));

        #[cfg(not(feature = "parallel"))]
        let readings: Vec<(EdgeId, FlowReading)> = samples.iter().map(classify).collect();

        #[cfg(feature = "parallel")]
        let readings: Vec<(EdgeId, FlowReading)> = {
            use rayon::prelude::*;
            samples.par_iter().map(classify).collect()
        };

        let unstable = readings.iter().filter(|(_, r)| r.state == FlowState::Unstable).count();
        let congested = readings.iter().filter(|(_, r)| r.state == FlowState::Congested).count();
        debug!(
            "classified {} edges: {unstable} unstable, {congested} congested",
            readings.len(),
        );
        readings
    }
}

impl Default for FlowClassifier {
    fn default() -> Self {
        Self { config: FlowConfig::default() }
    }
}

/// Classify `speeds` with explicit thresholds and 5 km/h bins.
pub fn classify(speeds: &[f64], entropy_threshold: f64, low_speed_threshold: f64) -> FlowState {
    FlowClassifier {
        config: FlowConfig { entropy_threshold, low_speed_threshold, ..FlowConfig::default() },
    }
    .classify(speeds)
}

/// Entropy in bits of the histogram of `speeds` (all finite, non-negative).
///
/// Bin edges sit at multiples of `width` from 0 up to (excluding)
/// `max + 10`; values fall in `[lo, hi)` except in the last bin, which is
/// closed.
fn histogram_entropy(speeds: &[f64], width: f64) -> f64 {
    let max = speeds.iter().copied().fold(0.0f64, f64::max);
    let edges = ((max + RANGE_HEADROOM_KMH) / width).ceil();
    let last_bin = (edges - 1.0).max(1.0) - 1.0;

    // Only occupied bins are materialised; keys are integral, non-negative
    // bin indices, whose bit patterns order the same way as the values.
    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for &s in speeds {
        // `abs` folds -0.0 into bin 0.
        let idx = (s / width).floor().min(last_bin).abs();
        *counts.entry(idx.to_bits()).or_default() += 1;
    }

    let total = speeds.len() as f64;
    counts
        .values()
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}
