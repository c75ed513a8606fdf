//! `ra-flow` — traffic flow-state classification from speed samples.
//!
//! Independent of the road graph: readings are computed per edge from
//! caller-supplied speed windows and never touch edge weights.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                           |
//! |------------|--------------------------------------------------|
//! | `parallel` | `classify_edges` runs on Rayon's pool.           |
//! | `serde`    | `Serialize`/`Deserialize` on states and readings. |

pub mod classifier;


pub use classifier::{classify, FlowClassifier, FlowReading, FlowState};
