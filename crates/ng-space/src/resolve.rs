//! Effective input dimensions and transform of a source.
//!
//! A source may carry its own transform and native dimensions, or neither.
//! When it is missing either one, the description provider is asked about
//! the same locator and the description is resolved the same way, up to a
//! fixed number of hops. Local sources are never described.

use std::collections::HashMap;
use std::path::Path;

use ng_types::{CoordinateSpace, SourceDescription, SourceMetadata, Transform};
use thiserror::Error;
use tracing::{debug, warn};

/// Descriptions fetched per unresolved source.
pub const DEFAULT_DESCRIBE_HOPS: u8 = 1;

#[derive(Debug, Error)]
pub enum DescribeError {
    #[error("No description for '{0}'")]
    NotFound(String),

    #[error("Description of '{locator}' failed: {reason}")]
    Failed { locator: String, reason: String },
}

/// External service that describes the data behind a locator.
pub trait DescriptionProvider {
    fn describe(&self, locator: &str) -> Result<SourceDescription, DescribeError>;
}

/// Provider that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDescriptions;

impl DescriptionProvider for NoDescriptions {
    fn describe(&self, locator: &str) -> Result<SourceDescription, DescribeError> {
        Err(DescribeError::NotFound(locator.to_string()))
    }
}

/// In-memory locator to description map.
#[derive(Debug, Clone, Default)]
pub struct DescriptionCatalog {
    entries: HashMap<String, SourceDescription>,
}

impl DescriptionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locator: impl Into<String>, description: SourceDescription) {
        self.entries.insert(locator.into(), description);
    }

    /// Parse a JSON object of `locator -> description`.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, DescribeError> {
        let failed = |reason: String| DescribeError::Failed {
            locator: path.display().to_string(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
        Self::from_json_str(&text).map_err(|e| failed(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DescriptionProvider for DescriptionCatalog {
    fn describe(&self, locator: &str) -> Result<SourceDescription, DescribeError> {
        self.entries
            .get(locator)
            .cloned()
            .map(|mut description| {
                description.url.get_or_insert_with(|| locator.to_string());
                description
            })
            .ok_or_else(|| DescribeError::NotFound(locator.to_string()))
    }
}

/// What is known about a source after resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub input_dimensions: Option<CoordinateSpace>,
    pub transform: Option<Transform>,
}

impl Resolution {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.input_dimensions.is_none() && self.transform.is_none()
    }

    fn is_complete(&self) -> bool {
        self.input_dimensions.is_some() && self.transform.is_some()
    }
}

/// Resolves sources against a description provider.
pub struct Resolver<'a> {
    provider: &'a dyn DescriptionProvider,
}

impl<'a> Resolver<'a> {
    pub fn new(provider: &'a dyn DescriptionProvider) -> Self {
        Self { provider }
    }

    /// Resolve with at most `remaining_hops` description lookups.
    ///
    /// Values on the source itself win over described ones. Provider
    /// failures leave the missing parts unknown.
    pub fn resolve(&self, source: &dyn SourceMetadata, remaining_hops: u8) -> Resolution {
        let transform = source.transform().cloned();
        let input_dimensions = transform
            .as_ref()
            .and_then(|t| t.input_dimensions.clone())
            .or_else(|| source.dimensions().cloned());
        let own = Resolution {
            input_dimensions,
            transform,
        };

        if own.is_complete() || remaining_hops == 0 || source.is_local() {
            return own;
        }
        let Some(locator) = source.locator() else {
            return own;
        };

        match self.provider.describe(locator) {
            Ok(description) => {
                debug!(locator, "described source");
                let described = self.resolve(&description, remaining_hops - 1);
                Resolution {
                    input_dimensions: own.input_dimensions.or(described.input_dimensions),
                    transform: own.transform.or(described.transform),
                }
            }
            Err(DescribeError::NotFound(_)) => {
                debug!(locator, "no description available");
                own
            }
            Err(err) => {
                warn!(locator, error = %err, "description provider failed");
                own
            }
        }
    }
}
