use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Layer, LayoutNode, ModelError};

/// Three distinct axis names shown on screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct DisplayDimensions([String; 3]);

impl DisplayDimensions {
    pub fn new(names: Vec<String>) -> Result<Self, ModelError> {
        let names: [String; 3] = names
            .try_into()
            .map_err(|names: Vec<String>| ModelError::DisplayArity(names.len()))?;
        for i in 1..3 {
            if names[..i].contains(&names[i]) {
                return Err(ModelError::DuplicateDisplayAxis(names[i].clone()));
            }
        }
        Ok(Self(names))
    }

    pub fn names(&self) -> &[String; 3] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }
}

impl Default for DisplayDimensions {
    fn default() -> Self {
        Self(["x".into(), "y".into(), "z".into()])
    }
}

impl TryFrom<Vec<String>> for DisplayDimensions {
    type Error = ModelError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<DisplayDimensions> for Vec<String> {
    fn from(dims: DisplayDimensions) -> Self {
        dims.0.into()
    }
}

/// Top-level viewer state.
///
/// Keys other than display dimensions, layers and layout are carried
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    #[serde(default)]
    pub display_dimensions: DisplayDimensions,

    #[serde(default)]
    pub layers: Vec<Layer>,

    #[serde(default)]
    pub layout: LayoutNode,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ViewerState {
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.name == name)
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|layer| layer.name.clone()).collect()
    }

    pub fn contains_layer(&self, name: &str) -> bool {
        self.layer(name).is_some()
    }

    /// Remove a layer by name, returning it.
    pub fn remove_layer(&mut self, name: &str) -> Option<Layer> {
        let index = self.layers.iter().position(|layer| layer.name == name)?;
        Some(self.layers.remove(index))
    }
}
