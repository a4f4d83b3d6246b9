//! Error types for the coordinate space engine.

use ng_types::ModelError;
use thiserror::Error;

/// Errors in requested display axes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AxisError {
    #[error("Display takes three axis names, got {0}")]
    Arity(usize),

    #[error("Axis '{0}' requested more than once")]
    Repeated(String),
}

/// Transform composition and reorientation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpaceError {
    /// Output rank of the new transform does not match the input it is applied to.
    #[error("Rank mismatch: expected {expected}, found {found}")]
    RankMismatch { expected: usize, found: usize },

    #[error("Ragged matrix: row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Reorientation needs exactly three spatial axes.
    #[error("Expected 3 spatial axes, found {found}")]
    SpatialAxes { found: usize },

    #[error("Axis '{0}' not found in coordinate space")]
    MissingAxis(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Affine input errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AffineError {
    #[error("Transforms must be matrices, got {ndim} dimensions")]
    TooManyDimensions { ndim: usize },

    #[error("Matrix values must be numbers")]
    NotNumeric,

    #[error("Cannot reshape {len} values into an n x (n+1) matrix")]
    UnsupportedLength { len: usize },

    #[error("Matrix shape {rows}x{cols} cannot be made square")]
    UnsupportedShape { rows: usize, cols: usize },

    #[error("Matrix is singular and cannot be inverted")]
    SingularMatrix,

    /// Affine rank differs from the axis convention it is declared over.
    #[error("Affine acts on {found} axes but the convention has {expected}")]
    ConventionMismatch { expected: usize, found: usize },

    #[error("Cannot read affine from {path}: {reason}")]
    Load { path: String, reason: String },

    #[error(transparent)]
    Space(#[from] SpaceError),
}

impl AffineError {
    /// Numeric failures, as opposed to malformed input.
    pub fn is_numeric(&self) -> bool {
        matches!(self, AffineError::SingularMatrix)
    }
}

pub type SpaceResult<T> = Result<T, SpaceError>;
