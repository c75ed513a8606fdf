use thiserror::Error;

use ra_core::{InputError, NodeId};
use ra_damage::DamageError;
use ra_graph::GraphError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("damage pipeline failed: {0}")]
    Damage(#[from] DamageError),

    #[error("road network not loaded")]
    NoNetwork,

    #[error("edge {from} → {to} has no active closure")]
    ClosureNotFound { from: NodeId, to: NodeId },

    #[error("edge {from} → {to} is already closed")]
    AlreadyClosed { from: NodeId, to: NodeId },
}

impl EngineError {
    /// `true` when the failure means no network is loaded, whichever layer
    /// reported it.
    pub fn is_graph_empty(&self) -> bool {
        matches!(
            self,
            EngineError::NoNetwork
                | EngineError::Graph(GraphError::GraphEmpty)
                | EngineError::Damage(DamageError::Graph(GraphError::GraphEmpty))
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
