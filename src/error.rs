//! Session error type.

use std::path::PathBuf;

use ng_layout::LayoutError;
use ng_space::{AffineError, AxisError, DescribeError, SpaceError};
use ng_types::{CodecError, ModelError};
use thiserror::Error;

/// Errors from a session command. None of them leave the state modified.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Axis(#[from] AxisError),

    #[error(transparent)]
    Space(#[from] SpaceError),

    #[error(transparent)]
    Affine(#[from] AffineError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Describe(#[from] DescribeError),

    #[error("Layer '{0}' not found")]
    UnknownLayer(String),

    #[error("Layer '{0}' already exists")]
    DuplicateLayer(String),

    #[error("Cannot give a single name to multiple layers, use separate load calls")]
    NameForMany,

    #[error("Nothing to load")]
    NothingToLoad,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Axis(_) | Self::Model(_) => "VALIDATION",
            Self::Affine(err) if err.is_numeric() => "NUMERIC",
            Self::Affine(_) => "VALIDATION",
            Self::Layout(err) if err.is_addressing() => "ADDRESSING",
            Self::Layout(_) => "VALIDATION",
            Self::Space(_) => "SPACE",
            Self::Codec(err) => err.code(),
            Self::Describe(_) => "DESCRIBE",
            Self::UnknownLayer(_) => "UNKNOWN_LAYER",
            Self::DuplicateLayer(_) => "DUPLICATE_LAYER",
            Self::NameForMany | Self::NothingToLoad => "LOAD",
            Self::Io { .. } => "IO",
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
