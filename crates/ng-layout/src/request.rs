//! Layout requests and the subtrees they build.

use ng_types::{LayerGroupViewer, LayoutNode, StackDirection, StackLayout, ViewKind};

use crate::error::LayoutError;
use crate::path::IndexPath;

/// Raw edit flags. At most one may be set.
///
/// `append` holds the path of the target stack (empty for the root).
/// `insert` and `remove` hold the path of the target stack followed by the
/// child position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditFlags {
    pub append: Option<Vec<usize>>,
    pub insert: Option<Vec<usize>>,
    pub remove: Option<Vec<usize>>,
}

/// A validated edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Replace,
    Append { parent: IndexPath },
    Insert { parent: IndexPath, position: usize },
    Remove { parent: IndexPath, position: usize },
}

impl EditFlags {
    pub fn mode(&self) -> Result<EditMode, LayoutError> {
        let set = [&self.append, &self.insert, &self.remove]
            .iter()
            .filter(|flag| flag.is_some())
            .count();
        if set > 1 {
            return Err(LayoutError::ConflictingEdits);
        }

        if let Some(path) = &self.append {
            return Ok(EditMode::Append {
                parent: IndexPath::new(path.clone()),
            });
        }
        if let Some(path) = &self.insert {
            let (parent, position) = IndexPath::new(path.clone())
                .split_last()
                .ok_or(LayoutError::MissingPosition("insert"))?;
            return Ok(EditMode::Insert { parent, position });
        }
        if let Some(path) = &self.remove {
            let (parent, position) = IndexPath::new(path.clone())
                .split_last()
                .ok_or(LayoutError::MissingPosition("remove"))?;
            return Ok(EditMode::Remove { parent, position });
        }
        Ok(EditMode::Replace)
    }
}

fn default_flex() -> f64 {
    1.0
}

/// One `layout` command.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    pub views: Vec<ViewKind>,
    pub stack: Option<StackDirection>,
    /// Layers to show; empty means decide from context.
    pub layers: Vec<String>,
    pub flex: f64,
    pub edit: EditFlags,
}

impl Default for LayoutRequest {
    fn default() -> Self {
        Self {
            views: Vec::new(),
            stack: None,
            layers: Vec::new(),
            flex: default_flex(),
            edit: EditFlags::default(),
        }
    }
}

impl LayoutRequest {
    pub fn views(views: impl IntoIterator<Item = ViewKind>) -> Self {
        Self {
            views: views.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_stack(mut self, direction: StackDirection) -> Self {
        self.stack = Some(direction);
        self
    }

    pub fn with_layers(mut self, layers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.layers = layers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_edit(mut self, edit: EditFlags) -> Self {
        self.edit = edit;
        self
    }

    /// Build the requested subtree, or `None` when no views were given.
    ///
    /// Views are scoped to the explicit layer set, or to `all_layers` when a
    /// stack is built. Several views without a direction stack as a row.
    pub fn build(&self, all_layers: &[String]) -> Option<LayoutNode> {
        if self.views.is_empty() {
            return None;
        }

        let stacked = self.views.len() > 1 || self.stack.is_some();
        let scope = if !self.layers.is_empty() {
            Some(self.layers.clone())
        } else if stacked {
            Some(all_layers.to_vec())
        } else {
            None
        };

        let mut nodes: Vec<LayoutNode> = self
            .views
            .iter()
            .map(|&view| match &scope {
                Some(layers) => {
                    LayerGroupViewer::new(layers.clone(), view.into(), self.flex).into()
                }
                None => view.into(),
            })
            .collect();

        if stacked {
            let direction = self.stack.unwrap_or_default();
            Some(StackLayout::new(direction, nodes).into())
        } else {
            nodes.pop()
        }
    }
}
