//! Coordinate space engine.
//!
//! Keeps image sources spatially coherent while the display order changes or
//! user affines are applied. Every change is composed on top of a source's
//! existing transform, never in place of it.
//!
//! ## Architecture
//!
//! ```text
//!   axes ─────────┐
//!                 ▼
//!   resolve ──► orient ◄── table
//!      │          ▲
//!      ▼          │
//!   compose ──► affine
//! ```
//!
//! - [`axes`] - alias canonicalization and compact names (`"ras"`, `"zyx"`)
//! - [`resolve`] - effective input dims and transform of a source, with a
//!   bounded number of description lookups
//! - [`compose`] - homogeneous transform composition
//! - [`table`] - signed permutation transforms between 3-axis orders
//! - [`orient`] - display orientation over a whole viewer state
//! - [`affine`] - user matrices: reshape, invert, apply to layers

pub mod affine;
pub mod axes;
pub mod compose;
pub mod error;
pub mod matrix;
pub mod orient;
pub mod resolve;
pub mod table;

pub use affine::{AffineApplier, AffineConvention, AffineLoader, AffineTransform, MatrixInput};
pub use axes::{canonicalize, compact_name, AxisAliases, NeuroAxes};
pub use compose::compose;
pub use error::{AffineError, AxisError, SpaceError, SpaceResult};
pub use orient::Orienter;
pub use resolve::{
    DescribeError, DescriptionCatalog, DescriptionProvider, NoDescriptions, Resolution, Resolver,
    DEFAULT_DESCRIBE_HOPS,
};
pub use table::{lift, NeuroTransforms, TransformTable};
