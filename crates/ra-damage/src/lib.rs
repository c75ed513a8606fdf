//! `ra-damage` — from raw damage reports to penalised edge weights.
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`cluster`]     | `DamagePoint`, `DamageSegment`, `SpatialClusterer` (DBSCAN) |
//! | [`mapper`]      | `EdgeDamageMapper`: nearest-edge assignment, critical flag |
//! | [`penalty`]     | `PenaltyEngine`: exponential roughness penalty            |
//! | [`error`]       | `DamageError`, `DamageResult`                              |
//!
//! The three stages run in that order.  The mapper and penalty engine mutate
//! a `RoadGraph` in place; callers sharing a graph across threads run them
//! inside one `SharedGraph::try_update` so readers never see a half-applied
//! batch.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Neighbourhood and nearest-edge queries on Rayon's pool. |
//! | `serde`    | `Serialize`/`Deserialize` on points, segments, summaries. |

pub mod cluster;
pub mod error;
pub mod mapper;
pub mod penalty;


pub use cluster::{cluster, DamagePoint, DamageSegment, SpatialClusterer};
pub use error::{DamageError, DamageResult};
pub use mapper::{apply_damage, reset_damage, EdgeDamageMapper, MappingSummary};
pub use penalty::{apply_roughness_penalty, PenaltyEngine, PenaltySummary};
