//! Model and codec error types.

use thiserror::Error;

/// Structural errors raised when building model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Two axes of one coordinate space share a name.
    #[error("Duplicate axis name '{0}' in coordinate space")]
    DuplicateAxis(String),

    /// Display dimensions must name exactly three axes.
    #[error("Display takes three axis names, got {0}")]
    DisplayArity(usize),

    /// Display dimensions must be distinct.
    #[error("Display axis '{0}' is repeated")]
    DuplicateDisplayAxis(String),

    #[error("Unknown view '{0}'")]
    UnknownView(String),

    #[error("Unknown stack direction '{0}', expected row or column")]
    UnknownStack(String),
}

/// Errors raised while encoding or decoding viewer state.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Viewer URL has no fragment")]
    MissingFragment,

    #[error("Viewer URL not recognized: fragment must start with '!'")]
    UnrecognizedFragment,

    #[error("Fragment is not valid percent-encoded UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl CodecError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Json(_) => "JSON",
            Self::Url(_) => "URL",
            Self::MissingFragment => "MISSING_FRAGMENT",
            Self::UnrecognizedFragment => "UNRECOGNIZED_FRAGMENT",
            Self::Encoding(_) => "ENCODING",
        }
    }
}
