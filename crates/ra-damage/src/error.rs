//! Damage-pipeline error type.

use thiserror::Error;

use ra_core::InputError;
use ra_graph::GraphError;

/// Errors produced by `ra-damage`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DamageError {
    #[error("invalid damage input: {0}")]
    Input(#[from] InputError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type DamageResult<T> = Result<T, DamageError>;
