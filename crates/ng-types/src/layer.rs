use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::source::one_or_many;
use crate::Source;

/// Layer type tag.
///
/// Types without a variant are kept as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayerKind {
    #[default]
    Image,
    Segmentation,
    Annotation,
    Mesh,
    Other(String),
}

impl LayerKind {
    pub fn as_str(&self) -> &str {
        match self {
            LayerKind::Image => "image",
            LayerKind::Segmentation => "segmentation",
            LayerKind::Annotation => "annotation",
            LayerKind::Mesh => "mesh",
            LayerKind::Other(tag) => tag,
        }
    }
}

impl From<String> for LayerKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "image" => LayerKind::Image,
            "segmentation" => LayerKind::Segmentation,
            "annotation" => LayerKind::Annotation,
            "mesh" => LayerKind::Mesh,
            _ => LayerKind::Other(tag),
        }
    }
}

impl From<LayerKind> for String {
    fn from(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// A named layer: typed list of sources plus shading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    #[serde(rename = "type", default)]
    pub kind: LayerKind,

    pub name: String,

    #[serde(default, deserialize_with = "one_or_many")]
    pub source: Vec<Source>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shader: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shader_controls: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: LayerKind, source: Vec<Source>) -> Self {
        Self {
            kind,
            name: name.into(),
            source,
            shader: None,
            shader_controls: None,
            extra: Map::new(),
        }
    }

    pub fn image(name: impl Into<String>, source: Source) -> Self {
        Self::new(name, LayerKind::Image, vec![source])
    }

    pub fn is_image(&self) -> bool {
        self.kind == LayerKind::Image
    }
}
