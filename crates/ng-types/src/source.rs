//! Data sources and their metadata.
//!
//! A layer references its data through one or more [`Source`] values. The
//! description service returns a [`SourceDescription`] for a locator. Both
//! shapes answer the same metadata queries through [`SourceMetadata`], so the
//! transform resolver never has to probe for fields.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{CoordinateSpace, Transform};

/// Locator schemes for data held by the local session.
///
/// Sources under these schemes are never sent to the description service.
pub const LOCAL_SCHEMES: [&str; 2] = ["python://", "local://"];

/// Capability queries shared by every source shape.
pub trait SourceMetadata {
    /// Data locator (URL or local handle).
    fn locator(&self) -> Option<&str>;

    fn transform(&self) -> Option<&Transform>;

    /// Native axes of the data, absent any transform.
    fn dimensions(&self) -> Option<&CoordinateSpace>;

    fn quantiles(&self) -> Option<&IntensityQuantiles> {
        None
    }

    /// True when the data lives in the local session.
    fn is_local(&self) -> bool {
        self.locator()
            .map(|url| LOCAL_SCHEMES.iter().any(|scheme| url.starts_with(scheme)))
            .unwrap_or(false)
    }

    fn has_transform(&self) -> bool {
        self.transform().is_some()
    }

    fn has_dimensions(&self) -> bool {
        self.dimensions().is_some()
    }

    fn has_quantiles(&self) -> bool {
        self.quantiles().is_some()
    }
}

/// One data source of a layer.
///
/// Deserializes from either a bare URL string or an object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<CoordinateSpace>,

    /// Viewer keys this model does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Source {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transform: None,
            dimensions: None,
            extra: Map::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_dimensions(mut self, dimensions: CoordinateSpace) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceRepr {
    Url(String),
    Full {
        url: String,
        #[serde(default)]
        transform: Option<Transform>,
        #[serde(default)]
        dimensions: Option<CoordinateSpace>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match SourceRepr::deserialize(deserializer)? {
            SourceRepr::Url(url) => Source::new(url),
            SourceRepr::Full {
                url,
                transform,
                dimensions,
                extra,
            } => Source {
                url,
                transform,
                dimensions,
                extra,
            },
        })
    }
}

impl SourceMetadata for Source {
    fn locator(&self) -> Option<&str> {
        Some(&self.url)
    }

    fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    fn dimensions(&self) -> Option<&CoordinateSpace> {
        self.dimensions.as_ref()
    }
}

/// Intensity quantiles at 0, 1%, 99% and 100%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityQuantiles {
    pub min: f64,
    pub low: f64,
    pub high: f64,
    pub max: f64,
}

impl IntensityQuantiles {
    /// Shader controls that window the display on these quantiles.
    pub fn shader_controls(&self) -> Value {
        serde_json::json!({
            "normalized": {
                "range": [self.low, self.high],
                "window": [self.min, self.max],
            }
        })
    }
}

/// What the description service knows about a locator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<CoordinateSpace>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantiles: Option<IntensityQuantiles>,
}

impl SourceMetadata for SourceDescription {
    fn locator(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    fn dimensions(&self) -> Option<&CoordinateSpace> {
        self.dimensions.as_ref()
    }

    fn quantiles(&self) -> Option<&IntensityQuantiles> {
        self.quantiles.as_ref()
    }
}

/// Accept either one value or a list of values.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}
