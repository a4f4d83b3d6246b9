//! Viewer state data model.
//!
//! This crate defines the shareable state of a remote neuroimaging viewer
//! and its wire forms:
//! - `CoordinateSpace` - ordered, named axes with units and scales
//! - `Transform` - homogeneous affine map between two coordinate spaces
//! - `Source` / `SourceDescription` - data handles and their metadata
//! - `Layer` - named, typed list of sources with shading
//! - `LayoutNode` - recursive panel layout (views, stacks, layer groups)
//! - `ViewerState` - top-level envelope with JSON and URL codecs
//!
//! # Wire format
//!
//! ```text
//! ViewerState
//! ├── displayDimensions: ["x", "y", "z"]
//! ├── layers: [{ type, name, source: [{ url, transform }], shader }]
//! ├── layout: "xy" | { type: row|column, children } | { type: viewer, layers, layout }
//! └── ...any other viewer keys, preserved verbatim
//! ```
//!
//! # Example
//!
//! ```
//! use ng_types::ViewerState;
//!
//! let state = ViewerState::from_json_str(
//!     r#"{"displayDimensions": ["x", "y", "z"], "layers": [], "layout": "xy"}"#,
//! )
//! .unwrap();
//! let url = state.to_url("https://neuroglancer-demo.appspot.com/").unwrap();
//! assert!(url.contains("#!"));
//! assert_eq!(ViewerState::from_url(&url).unwrap(), state);
//! ```

mod codec;
mod error;
mod layer;
mod layout;
mod source;
mod space;
mod state;
mod transform;

pub use codec::DEFAULT_BASE_URL;
pub use error::{CodecError, ModelError};
pub use layer::{Layer, LayerKind};
pub use layout::{LayerGroupViewer, LayoutNode, StackDirection, StackLayout, ViewKind};
pub use source::{IntensityQuantiles, Source, SourceDescription, SourceMetadata, LOCAL_SCHEMES};
pub use space::{Axis, CoordinateSpace};
pub use state::{DisplayDimensions, ViewerState};
pub use transform::Transform;
