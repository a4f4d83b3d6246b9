//! Layout tree edits.
//!
//! Edits run on a copy of the current tree. Flags are validated first, the
//! target path is resolved next, and only then is the copy mutated, so a
//! failed edit leaves the caller's tree as it was.

use ng_types::{LayerGroupViewer, LayoutNode, StackLayout};
use tracing::debug;

use crate::error::{AddressingError, LayoutError};
use crate::path::IndexPath;
use crate::request::{EditMode, LayoutRequest};

/// Apply `request` to `current`, returning the new tree.
///
/// A request with no views and no removal is a query: the current tree is
/// returned unchanged.
pub fn apply(
    current: &LayoutNode,
    request: &LayoutRequest,
    all_layers: &[String],
) -> Result<LayoutNode, LayoutError> {
    let mode = request.edit.mode()?;
    if !request.views.is_empty() && matches!(mode, EditMode::Remove { .. }) {
        return Err(LayoutError::LayoutWithRemove);
    }

    let node = request.build(all_layers);
    let mut root = current.clone();

    match (mode, node) {
        (EditMode::Remove { parent, position }, _) => {
            let stack = resolve_mut(&mut root, &parent)?;
            check_index(stack, &parent, position, stack.children.len())?;
            stack.children.remove(position);
            debug!(path = %parent, position, "removed layout child");
        }
        (_, None) => {}
        (EditMode::Replace, Some(node)) => {
            root = node;
            debug!(kind = root.kind_name(), "replaced layout");
        }
        (EditMode::Append { parent }, Some(node)) => {
            let stack = resolve_mut(&mut root, &parent)?;
            let node = scoped(node, stack, request, all_layers);
            stack.children.push(node);
            debug!(path = %parent, "appended layout child");
        }
        (EditMode::Insert { parent, position }, Some(node)) => {
            let stack = resolve_mut(&mut root, &parent)?;
            check_index(stack, &parent, position, stack.children.len() + 1)?;
            let node = scoped(node, stack, request, all_layers);
            stack.children.insert(position, node);
            debug!(path = %parent, position, "inserted layout child");
        }
    }

    Ok(root)
}

/// Walk `path` from `root` through stacks only.
pub fn resolve_mut<'t>(
    root: &'t mut LayoutNode,
    path: &IndexPath,
) -> Result<&'t mut StackLayout, AddressingError> {
    let mut node = root;
    let mut cursor = path.cursor();
    loop {
        let depth = cursor.depth();
        let stack = match node {
            LayoutNode::Stack(stack) => stack,
            other => {
                return Err(AddressingError::NotAStack {
                    depth,
                    found: other.kind_name(),
                })
            }
        };
        let Some(index) = cursor.next() else {
            return Ok(stack);
        };
        let len = stack.children.len();
        node = stack
            .children
            .get_mut(index)
            .ok_or(AddressingError::OutOfRange { depth, index, len })?;
    }
}

fn check_index(
    stack: &StackLayout,
    parent: &IndexPath,
    position: usize,
    limit: usize,
) -> Result<(), AddressingError> {
    if position < limit {
        Ok(())
    } else {
        Err(AddressingError::OutOfRange {
            depth: parent.len(),
            index: position,
            len: stack.children.len(),
        })
    }
}

/// Wrap a bare node in a layer group.
///
/// The scope is the explicit layer set, else the parent's last child's
/// layers, else every current layer.
fn scoped(
    node: LayoutNode,
    parent: &StackLayout,
    request: &LayoutRequest,
    all_layers: &[String],
) -> LayoutNode {
    if matches!(node, LayoutNode::Group(_)) {
        return node;
    }
    let layers = if !request.layers.is_empty() {
        request.layers.clone()
    } else if let Some(LayoutNode::Group(last)) = parent.children.last() {
        last.layers.clone()
    } else {
        all_layers.to_vec()
    };
    LayerGroupViewer::new(layers, node, request.flex).into()
}
