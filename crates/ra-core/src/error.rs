//! Input validation error type.
//!
//! Every crate in the workspace rejects bad caller input with [`InputError`]
//! before touching shared state, then wraps it as one variant of its own
//! error enum.

use thiserror::Error;

use crate::GeoPoint;

/// Caller-supplied data that cannot be processed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("invalid coordinate {0}")]
    InvalidCoordinate(GeoPoint),

    #[error("severity must be finite, got {0}")]
    NonFiniteSeverity(f64),

    #[error("epsilon must be a positive distance in metres, got {0}")]
    NonPositiveEpsilon(f64),

    #[error("min_samples must be at least 1")]
    ZeroMinSamples,

    #[error("no damage points supplied")]
    EmptyPoints,

    #[error("edge weight must be non-negative, got {0}")]
    InvalidWeight(f64),

    #[error("line geometry needs at least two vertices, got {0}")]
    DegenerateLine(usize),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for validation helpers.
pub type InputResult<T> = Result<T, InputError>;
