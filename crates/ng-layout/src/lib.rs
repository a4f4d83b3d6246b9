//! Layout tree editor.
//!
//! Builds panel subtrees from `layout` requests and places them in the
//! current tree: replace the root, or append, insert or remove a child of a
//! stack addressed by an [`IndexPath`].
//!
//! ```text
//! row ─┬─ viewer[brain] ── xy        path []     → the row
//!      └─ column ─┬─ 3d              path [1]    → the column
//!                 └─ yz              path [1, 1] → yz (not a stack)
//! ```

pub mod editor;
pub mod error;
pub mod path;
pub mod request;

pub use editor::{apply, resolve_mut};
pub use error::{AddressingError, LayoutError};
pub use path::{IndexPath, PathCursor};
pub use request::{EditFlags, EditMode, LayoutRequest};
