//! `ra-engine` — the analytics context tying the workspace together.
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`context`]   | `AnalyticsContext`: network loading, damage pipeline, queries |
//! | [`closure`]   | `ClosureRegistry`: close / re-open edges with exact restore   |
//! | [`advisory`]  | alternative scoring, recommendation, diversion, emissions     |
//! | [`error`]     | `EngineError`, `EngineResult`                                 |
//!
//! # Example
//!
//! ```
//! use ra_core::{AnalyticsConfig, GeoPoint};
//! use ra_engine::AnalyticsContext;
//! use ra_graph::RoadLine;
//!
//! let ctx = AnalyticsContext::new(AnalyticsConfig::default()).unwrap();
//! ctx.load_network(&[
//!     RoadLine::from_lon_lat(&[(72.5710, 23.0220), (72.5714, 23.0225), (72.5720, 23.0230)])
//!         .bidirectional(),
//! ])
//! .unwrap();
//!
//! let route = ctx
//!     .shortest_path(GeoPoint::new(23.0220, 72.5710), GeoPoint::new(23.0230, 72.5720))
//!     .unwrap();
//! assert_eq!(route.legs.len(), 2);
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                          |
//! |------------|-------------------------------------------------|
//! | `parallel` | Enables `parallel` in `ra-damage` and `ra-flow`. |
//! | `serde`    | `Serialize`/`Deserialize` on reports and advice. |

pub mod advisory;
pub mod closure;
pub mod context;
pub mod error;


pub use advisory::{
    assess_diversion, emission_savings, recommend, score_alternatives, suitability_score, Detour,
    DiversionAssessment, DiversionReason, Recommendation, RouteProfile, ScoredRoute,
};
pub use closure::{Closure, ClosureRegistry};
pub use context::{AnalyticsContext, IngestReport, NetworkSummary};
pub use error::{EngineError, EngineResult};
