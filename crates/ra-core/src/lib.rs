//! `ra-core` — foundational types for the road analytics workspace.
//!
//! This crate is a dependency of every other `ra-*` crate.  It has no `ra-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `ClusterId`                       |
//! | [`geo`]         | `GeoPoint`, haversine and planar distances            |
//! | [`config`]      | `AnalyticsConfig` and per-stage sections              |
//! | [`error`]       | `InputError`, `InputResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    AdvisoryConfig, AnalyticsConfig, ClusterConfig, FlowConfig, PenaltyConfig, RoutingConfig,
};
pub use error::{InputError, InputResult};
pub use geo::{GeoPoint, EARTH_RADIUS_KM, meters_to_radians};
pub use ids::{ClusterId, EdgeId, NodeId};
