//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Node deduplication rounds to six
//! decimal digits (~0.1 m), which single precision cannot represent at
//! city-scale longitudes, so the workspace stays in double precision.

/// Mean Earth radius in kilometres (IUGG), used for all great-circle maths.
pub const EARTH_RADIUS_KM: f64 = 6_371.008_8;

/// Decimal digits kept when rounding coordinates into node identities.
pub const COORD_PRECISION_DIGITS: i32 = 6;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from a GeoJSON-style `(lon, lat)` vertex.
    #[inline]
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` if both components are finite and inside WGS-84 bounds.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle central angle to `other`, in radians (haversine form).
    pub fn angular_distance_rad(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        2.0 * a.sqrt().min(1.0).asin()
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        self.angular_distance_rad(other) * EARTH_RADIUS_KM * 1_000.0
    }

    /// Squared planar distance in degree space.
    ///
    /// Used where the model deliberately treats lat/lon as a flat plane
    /// (nearest node, nearest edge midpoint).  Only meaningful for ranking.
    #[inline]
    pub fn planar_distance_2(self, other: GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat * dlat + dlon * dlon
    }

    /// Planar Euclidean distance in degree space.
    #[inline]
    pub fn planar_distance(self, other: GeoPoint) -> f64 {
        self.planar_distance_2(other).sqrt()
    }

    /// Arithmetic mean of the two coordinates (not a geodesic midpoint).
    #[inline]
    pub fn midpoint(self, other: GeoPoint) -> GeoPoint {
        GeoPoint::new((self.lat + other.lat) * 0.5, (self.lon + other.lon) * 0.5)
    }

    /// Approximate bounding-box check — much cheaper than `distance_m` for
    /// quick rejection.
    #[inline]
    pub fn within_bbox(self, center: GeoPoint, half_deg: f64) -> bool {
        (self.lat - center.lat).abs() <= half_deg
            && (self.lon - center.lon).abs() <= half_deg
    }

    /// Coordinate rounded to [`COORD_PRECISION_DIGITS`] decimal digits.
    pub fn rounded(self) -> GeoPoint {
        let scale = 10f64.powi(COORD_PRECISION_DIGITS);
        GeoPoint::new(
            (self.lat * scale).round() / scale,
            (self.lon * scale).round() / scale,
        )
    }

    /// Integer identity of the rounded coordinate, `(lon, lat)` order.
    ///
    /// Two vertices map to the same road node exactly when their keys match.
    pub fn coord_key(self) -> (i64, i64) {
        let scale = 10f64.powi(COORD_PRECISION_DIGITS);
        (
            (self.lon * scale).round() as i64,
            (self.lat * scale).round() as i64,
        )
    }
}

/// Convert a distance in metres to a great-circle angle in radians.
#[inline]
pub fn meters_to_radians(meters: f64) -> f64 {
    (meters / 1_000.0) / EARTH_RADIUS_KM
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
