//! DBSCAN clustering of damage points over great-circle distance.
//!
//! # Algorithm
//!
//! 1. Every point's ε-neighbourhood is computed once.  Candidates come from
//!    an R-tree bounding-box query in `[lat, lon]` degree space; the exact
//!    haversine angle then decides membership (`≤ ε`, the point itself
//!    included).
//! 2. Points with at least `min_samples` neighbours are *core* points.
//! 3. Clusters grow from unlabelled core points in input order.  A border
//!    point joins the first cluster that reaches it; everything else is noise
//!    and never reported.
//!
//! With the `parallel` feature, step 1 runs on Rayon's pool.  Steps 2–3 are
//! sequential, so the labelling is identical either way.

use log::{debug, info};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use ra_core::{meters_to_radians, ClusterConfig, ClusterId, GeoPoint, InputError, InputResult};

// ── Inputs and outputs ────────────────────────────────────────────────────────

/// One road-damage report.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamagePoint {
    pub position: GeoPoint,
    pub severity: f64,
}

impl DamagePoint {
    pub fn new(latitude: f64, longitude: f64, severity: f64) -> Self {
        Self { position: GeoPoint::new(latitude, longitude), severity }
    }

    pub fn validate(&self) -> InputResult<()> {
        if !self.position.is_valid() {
            return Err(InputError::InvalidCoordinate(self.position));
        }
        if !self.severity.is_finite() {
            return Err(InputError::NonFiniteSeverity(self.severity));
        }
        Ok(())
    }
}

/// One cluster of damage points.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSegment {
    pub cluster_id:   ClusterId,
    /// Arithmetic mean of member coordinates.
    pub centroid:     GeoPoint,
    pub avg_severity: f64,
    /// Number of member points.
    pub count:        u64,
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
struct IndexedPoint {
    idx:   usize,
    point: [f64; 2],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── SpatialClusterer ──────────────────────────────────────────────────────────

/// Density-based damage clusterer.
#[derive(Clone, Debug)]
pub struct SpatialClusterer {
    config: ClusterConfig,
}

impl SpatialClusterer {
    /// Fails if `epsilon_meters` is not a positive distance or
    /// `min_samples == 0`.
    pub fn new(config: ClusterConfig) -> InputResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Cluster `points`, returning segments ordered by `cluster_id`.
    ///
    /// Every point is validated before any work is done.  Empty input gives
    /// an empty result.
    pub fn cluster(&self, points: &[DamagePoint]) -> InputResult<Vec<DamageSegment>> {
        for p in points {
            p.validate()?;
        }
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let eps_rad = meters_to_radians(self.config.epsilon_meters);
        let index = RTree::bulk_load(
            points
                .iter()
                .enumerate()
                .map(|(idx, p)| IndexedPoint { idx, point: [p.position.lat, p.position.lon] })
                .collect::<Vec<_>>(),
        );

        let neighbourhoods = neighbourhoods(points, &index, eps_rad);
        let labels = label(&neighbourhoods, self.config.min_samples);
        let segments = aggregate(points, &labels);

        let clustered: u64 = segments.iter().map(|s| s.count).sum();
        info!(
            "clustered {} damage points into {} segments ({} noise, eps {} m, min_samples {})",
            points.len(),
            segments.len(),
            points.len() as u64 - clustered,
            self.config.epsilon_meters,
            self.config.min_samples,
        );
        Ok(segments)
    }
}

/// Cluster `points` with an explicit radius and density.
pub fn cluster(
    points: &[DamagePoint],
    epsilon_meters: f64,
    min_samples: usize,
) -> InputResult<Vec<DamageSegment>> {
    SpatialClusterer::new(ClusterConfig { epsilon_meters, min_samples })?.cluster(points)
}

// ── Internals ─────────────────────────────────────────────────────────────────

fn neighbourhoods(points: &[DamagePoint], index: &RTree<IndexedPoint>, eps_rad: f64) -> Vec<Vec<usize>> {
    let region = |i: usize| region_query(points, index, i, eps_rad);

    #[cfg(not(feature = "parallel"))]
    {
        (0..points.len()).map(region).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..points.len()).into_par_iter().map(region).collect()
    }
}

/// Indices of all points within `eps_rad` of `points[i]`, ascending.
fn region_query(points: &[DamagePoint], index: &RTree<IndexedPoint>, i: usize, eps_rad: f64) -> Vec<usize> {
    let centre = points[i].position;
    let mut out = Vec::new();
    for env in search_envelopes(centre, eps_rad) {
        out.extend(
            index
                .locate_in_envelope(&env)
                .filter(|c| centre.angular_distance_rad(points[c.idx].position) <= eps_rad)
                .map(|c| c.idx),
        );
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// Degree-space boxes that contain every point within `eps_rad` of `centre`.
///
/// The latitude half-width is ε itself.  The longitude half-width widens with
/// latitude; near a pole it covers the whole range.  A box crossing the
/// antimeridian is split in two.
fn search_envelopes(centre: GeoPoint, eps_rad: f64) -> Vec<AABB<[f64; 2]>> {
    let half_lat = eps_rad.to_degrees();
    let lat_lo = (centre.lat - half_lat).max(-90.0);
    let lat_hi = (centre.lat + half_lat).min(90.0);

    let cos_max = lat_lo.abs().max(lat_hi.abs()).to_radians().cos();
    let ratio = if cos_max > 0.0 { (eps_rad * 0.5).sin() / cos_max } else { f64::INFINITY };
    if ratio >= 1.0 {
        return vec![AABB::from_corners([lat_lo, -180.0], [lat_hi, 180.0])];
    }
    let half_lon = (2.0 * ratio.asin()).to_degrees();

    let lon_lo = centre.lon - half_lon;
    let lon_hi = centre.lon + half_lon;
    let mut boxes = vec![AABB::from_corners([lat_lo, lon_lo.max(-180.0)], [lat_hi, lon_hi.min(180.0)])];
    if lon_lo < -180.0 {
        boxes.push(AABB::from_corners([lat_lo, lon_lo + 360.0], [lat_hi, 180.0]));
    }
    if lon_hi > 180.0 {
        boxes.push(AABB::from_corners([lat_lo, -180.0], [lat_hi, lon_hi - 360.0]));
    }
    boxes
}

/// Cluster label per point; `None` is noise.
fn label(neighbourhoods: &[Vec<usize>], min_samples: usize) -> Vec<Option<ClusterId>> {
    let is_core: Vec<bool> = neighbourhoods.iter().map(|n| n.len() >= min_samples).collect();
    let mut labels: Vec<Option<ClusterId>> = vec![None; neighbourhoods.len()];
    let mut next = 0u32;
    let mut stack = Vec::new();

    for seed in 0..neighbourhoods.len() {
        if labels[seed].is_some() || !is_core[seed] {
            continue;
        }
        let id = ClusterId(next);
        next += 1;
        labels[seed] = Some(id);
        stack.push(seed);

        while let Some(p) = stack.pop() {
            for &q in &neighbourhoods[p] {
                if labels[q].is_some() {
                    continue;
                }
                labels[q] = Some(id);
                if is_core[q] {
                    stack.push(q);
                }
            }
        }
    }
    debug!("dbscan: {} core points, {next} clusters", is_core.iter().filter(|&&c| c).count());
    labels
}

fn aggregate(points: &[DamagePoint], labels: &[Option<ClusterId>]) -> Vec<DamageSegment> {
    let n_clusters = labels.iter().flatten().map(|c| c.index() + 1).max().unwrap_or(0);

    // (Σlat, Σlon, Σseverity, count) per cluster.
    let mut sums = vec![(0.0f64, 0.0f64, 0.0f64, 0u64); n_clusters];
    for (p, label) in points.iter().zip(labels) {
        if let Some(id) = label {
            let s = &mut sums[id.index()];
            s.0 += p.position.lat;
            s.1 += p.position.lon;
            s.2 += p.severity;
            s.3 += 1;
        }
    }

    sums.into_iter()
        .enumerate()
        .map(|(i, (lat, lon, sev, count))| {
            let n = count as f64;
            DamageSegment {
                cluster_id:   ClusterId::from_index(i),
                centroid:     GeoPoint::new(lat / n, lon / n),
                avg_severity: sev / n,
                count,
            }
        })
        .collect()
}
