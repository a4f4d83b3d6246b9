//! Panel layout tree.
//!
//! ```text
//! "xy"                                               LayoutNode::View
//! {"type": "row", "children": [...]}                 LayoutNode::Stack
//! {"type": "viewer", "layers": [...], "layout": ..}  LayoutNode::Group
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ModelError;

/// A single 2D or 3D panel kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    #[serde(rename = "xy")]
    Xy,
    #[serde(rename = "yz")]
    Yz,
    #[serde(rename = "xz")]
    Xz,
    #[serde(rename = "xy-3d")]
    Xy3d,
    #[serde(rename = "yz-3d")]
    Yz3d,
    #[serde(rename = "xz-3d")]
    Xz3d,
    #[serde(rename = "4panel")]
    FourPanel,
    #[serde(rename = "3d")]
    ThreeD,
}

impl ViewKind {
    pub const ALL: [ViewKind; 8] = [
        ViewKind::Xy,
        ViewKind::Yz,
        ViewKind::Xz,
        ViewKind::Xy3d,
        ViewKind::Yz3d,
        ViewKind::Xz3d,
        ViewKind::FourPanel,
        ViewKind::ThreeD,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Xy => "xy",
            ViewKind::Yz => "yz",
            ViewKind::Xz => "xz",
            ViewKind::Xy3d => "xy-3d",
            ViewKind::Yz3d => "yz-3d",
            ViewKind::Xz3d => "xz-3d",
            ViewKind::FourPanel => "4panel",
            ViewKind::ThreeD => "3d",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| ModelError::UnknownView(s.to_string()))
    }
}

/// Stack direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackDirection {
    #[default]
    Row,
    Column,
}

impl FromStr for StackDirection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "row" => Ok(StackDirection::Row),
            "column" => Ok(StackDirection::Column),
            _ => Err(ModelError::UnknownStack(s.to_string())),
        }
    }
}

/// Row or column of child panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackLayout {
    #[serde(rename = "type")]
    pub direction: StackDirection,

    #[serde(default)]
    pub children: Vec<LayoutNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StackLayout {
    pub fn new(direction: StackDirection, children: Vec<LayoutNode>) -> Self {
        Self {
            direction,
            children,
            flex: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GroupTag {
    #[default]
    Viewer,
}

fn default_flex() -> f64 {
    1.0
}

/// A view or stack scoped to a subset of layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerGroupViewer {
    #[serde(rename = "type")]
    tag: GroupTag,

    #[serde(default)]
    pub layers: Vec<String>,

    pub layout: Box<LayoutNode>,

    #[serde(default = "default_flex")]
    pub flex: f64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayerGroupViewer {
    pub fn new(layers: Vec<String>, layout: LayoutNode, flex: f64) -> Self {
        Self {
            tag: GroupTag::Viewer,
            layers,
            layout: Box::new(layout),
            flex,
            extra: Map::new(),
        }
    }
}

/// Node of the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutNode {
    View(ViewKind),
    Stack(StackLayout),
    Group(LayerGroupViewer),
}

impl Default for LayoutNode {
    fn default() -> Self {
        LayoutNode::View(ViewKind::FourPanel)
    }
}

impl LayoutNode {
    /// Short label for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LayoutNode::View(_) => "view",
            LayoutNode::Stack(_) => "stack",
            LayoutNode::Group(_) => "layer group",
        }
    }

    pub fn as_stack(&self) -> Option<&StackLayout> {
        match self {
            LayoutNode::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&LayerGroupViewer> {
        match self {
            LayoutNode::Group(group) => Some(group),
            _ => None,
        }
    }
}

impl From<ViewKind> for LayoutNode {
    fn from(kind: ViewKind) -> Self {
        LayoutNode::View(kind)
    }
}

impl From<StackLayout> for LayoutNode {
    fn from(stack: StackLayout) -> Self {
        LayoutNode::Stack(stack)
    }
}

impl From<LayerGroupViewer> for LayoutNode {
    fn from(group: LayerGroupViewer) -> Self {
        LayoutNode::Group(group)
    }
}
