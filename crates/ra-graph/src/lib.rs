//! `ra-graph` — road graph, spatial indexing, and routing.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                  |
//! |------------------|-----------------------------------------------------------|
//! | [`network`]      | `RoadGraph` (CSR + R-trees), `RoadGraphBuilder`, `RoadLine` |
//! | [`edge`]         | `EdgeAttributes`, `SeverityStats`                         |
//! | [`router`]       | `Router` trait, `Route`, `DijkstraRouter`                 |
//! | [`alternatives`] | bounded k-alternative path search                         |
//! | [`shared`]       | `SharedGraph` snapshot/writer wrapper                     |
//! | [`error`]        | `GraphError`, `GraphResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod alternatives;
pub mod edge;
pub mod error;
pub mod network;
pub mod router;
pub mod shared;

#[cfg(test)]
mod tests;

pub use alternatives::{Alternatives, PathSearchLimits};
pub use edge::{EdgeAttributes, SeverityStats};
pub use error::{GraphError, GraphResult};
pub use network::{RoadGraph, RoadGraphBuilder, RoadLine};
pub use router::{DijkstraRouter, Route, RouteLeg, Router};
pub use shared::SharedGraph;
