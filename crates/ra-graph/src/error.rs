//! Graph-subsystem error type.

use thiserror::Error;

use ra_core::{InputError, NodeId};

/// Errors produced by `ra-graph`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("road graph is empty; load a network first")]
    GraphEmpty,

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("no edge from {from} to {to}")]
    EdgeNotFound { from: NodeId, to: NodeId },

    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error(transparent)]
    Input(#[from] InputError),
}

impl GraphError {
    /// `true` for the "not found" family: a missing endpoint or no path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NodeNotFound(_) | GraphError::NoPath { .. })
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
