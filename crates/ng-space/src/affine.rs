//! User affine transforms: input normalization and application to layers.
//!
//! Affines are written in a fixed axis convention (RAS+, millimetres by
//! default). Applying one forces the display to that convention so every
//! source exposes named anatomical output axes, composes the affine on top of
//! each source's transform, then restores the caller's display order.

use std::path::Path;

use nalgebra::DMatrix;
use ng_types::{CoordinateSpace, DisplayDimensions, Transform, ViewerState};
use serde_json::Value;
use tracing::{debug, warn};

use crate::compose::compose;
use crate::error::{AffineError, SpaceError, SpaceResult};
use crate::matrix::{embed, to_dmatrix, to_rows, to_square};
use crate::orient::Orienter;
use crate::resolve::{Resolution, DEFAULT_DESCRIBE_HOPS};

/// Raw matrix values as entered by the user or read from a file.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixInput {
    Flat(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

impl MatrixInput {
    /// Accept a flat or nested JSON array of numbers.
    pub fn from_json(value: &Value) -> Result<Self, AffineError> {
        match depth(value)? {
            0 => Ok(MatrixInput::Flat(vec![number(value)?])),
            1 => Ok(MatrixInput::Flat(numbers(value)?)),
            2 => {
                let rows = value
                    .as_array()
                    .map(|rows| rows.iter().map(numbers).collect::<Result<Vec<_>, _>>())
                    .unwrap_or_else(|| Err(AffineError::NotNumeric))?;
                Ok(MatrixInput::Rows(rows))
            }
            ndim => Err(AffineError::TooManyDimensions { ndim }),
        }
    }

    /// Parse command tokens: numbers, or one JSON array.
    pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, AffineError> {
        if let [single] = tokens {
            let text = single.as_ref().trim();
            if text.starts_with('[') {
                let value: Value =
                    serde_json::from_str(text).map_err(|_| AffineError::NotNumeric)?;
                return Self::from_json(&value);
            }
        }
        tokens
            .iter()
            .flat_map(|token| token.as_ref().split(|c: char| c == ',' || c.is_whitespace()))
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<f64>().map_err(|_| AffineError::NotNumeric))
            .collect::<Result<Vec<_>, _>>()
            .map(MatrixInput::Flat)
    }

    /// Reshape into a 2-D matrix.
    ///
    /// Flat lengths: 12 is 3x4, 16 is 4x4, otherwise `n x (n+1)` with
    /// `n(n+1) = len`.
    pub fn to_matrix(&self) -> Result<DMatrix<f64>, AffineError> {
        match self {
            MatrixInput::Rows(rows) => Ok(to_dmatrix(rows)?),
            MatrixInput::Flat(values) => {
                let (rows, cols) = flat_shape(values.len())?;
                Ok(DMatrix::from_row_slice(rows, cols, values))
            }
        }
    }
}

fn flat_shape(len: usize) -> Result<(usize, usize), AffineError> {
    match len {
        12 => Ok((3, 4)),
        16 => Ok((4, 4)),
        k => {
            let n = (((1.0 + 4.0 * k as f64).sqrt() - 1.0) / 2.0).floor() as usize;
            if n > 0 && n * (n + 1) == k {
                Ok((n, n + 1))
            } else {
                Err(AffineError::UnsupportedLength { len })
            }
        }
    }
}

fn depth(value: &Value) -> Result<usize, AffineError> {
    match value {
        Value::Number(_) => Ok(0),
        Value::Array(items) => {
            let mut inner = 0;
            for item in items {
                inner = inner.max(depth(item)?);
            }
            Ok(inner + 1)
        }
        _ => Err(AffineError::NotNumeric),
    }
}

fn number(value: &Value) -> Result<f64, AffineError> {
    value.as_f64().ok_or(AffineError::NotNumeric)
}

fn numbers(value: &Value) -> Result<Vec<f64>, AffineError> {
    value
        .as_array()
        .ok_or(AffineError::NotNumeric)?
        .iter()
        .map(number)
        .collect()
}

/// Source of affines stored in files (`--mov` / `--fix` references for
/// formats that need them).
pub trait AffineLoader {
    fn load(
        &self,
        path: &Path,
        moving: Option<&Path>,
        fixed: Option<&Path>,
    ) -> Result<MatrixInput, AffineError>;
}

/// Axes an affine is written in.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineConvention {
    space: CoordinateSpace,
}

impl AffineConvention {
    pub fn new(space: CoordinateSpace) -> Self {
        Self { space }
    }

    /// Right, anterior, superior in millimetres.
    pub fn ras() -> Self {
        Self {
            space: CoordinateSpace::uniform(["right", "anterior", "superior"], "mm", 1.0)
                .unwrap_or_default(),
        }
    }

    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    /// The convention as a display order.
    pub fn display(&self) -> SpaceResult<DisplayDimensions> {
        Ok(DisplayDimensions::new(
            self.space.names().map(str::to_string).collect(),
        )?)
    }
}

impl Default for AffineConvention {
    fn default() -> Self {
        Self::ras()
    }
}

/// A normalized affine over a convention's axes.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform {
    transform: Transform,
}

impl AffineTransform {
    /// Square the matrix, optionally invert it, then drop the homogeneous row.
    pub fn from_input(
        input: &MatrixInput,
        invert: bool,
        convention: &AffineConvention,
    ) -> Result<Self, AffineError> {
        let matrix = input.to_matrix()?;
        let (rows, cols) = matrix.shape();
        let mut square = to_square(&matrix).ok_or(AffineError::UnsupportedShape { rows, cols })?;
        if invert {
            square = square.try_inverse().ok_or(AffineError::SingularMatrix)?;
        }

        let n = square.nrows();
        let expected = convention.space().rank();
        let found = n.saturating_sub(1);
        if found != expected {
            return Err(AffineError::ConventionMismatch { expected, found });
        }

        let affine = square.rows(0, found).into_owned();
        Ok(Self {
            transform: Transform::new(
                Some(to_rows(&affine)),
                Some(convention.space().clone()),
                convention.space().clone(),
            ),
        })
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Matrix rows, `rank x (rank + 1)`.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.transform.matrix_or_identity()
    }

    /// The affine acting on the matching axes of `space`; other axes are fixed.
    pub fn embed_into(&self, space: &CoordinateSpace) -> SpaceResult<Transform> {
        let positions = self
            .transform
            .output_dimensions
            .names()
            .map(|name| {
                space
                    .position(name)
                    .ok_or_else(|| SpaceError::MissingAxis(name.to_string()))
            })
            .collect::<SpaceResult<Vec<_>>>()?;
        let block = to_dmatrix(&self.rows())?;
        let matrix = embed(&block, &positions, space.rank());
        Ok(Transform::new(
            Some(to_rows(&matrix)),
            Some(space.clone()),
            space.clone(),
        ))
    }
}

/// Composes affines onto image layers.
pub struct AffineApplier<'o, 'a> {
    orienter: &'o Orienter<'a>,
    convention: AffineConvention,
}

impl<'o, 'a> AffineApplier<'o, 'a> {
    pub fn new(orienter: &'o Orienter<'a>, convention: AffineConvention) -> Self {
        Self {
            orienter,
            convention,
        }
    }

    pub fn convention(&self) -> &AffineConvention {
        &self.convention
    }

    /// Apply `affine` to the sources of the named image layers (all when
    /// `layers` is empty), leaving the display order at `current`.
    ///
    /// Returns the number of sources transformed.
    pub fn apply(
        &self,
        state: &mut ViewerState,
        current: &DisplayDimensions,
        affine: &AffineTransform,
        layers: &[String],
    ) -> SpaceResult<usize> {
        self.orienter.orient_to(state, &self.convention.display()?);

        let mut applied = 0;
        let targeted = state
            .layers
            .iter_mut()
            .filter(|layer| layer.is_image())
            .filter(|layer| layers.is_empty() || layers.contains(&layer.name));
        for layer in targeted {
            for source in layer.source.iter_mut() {
                let Resolution {
                    input_dimensions,
                    transform,
                } = self
                    .orienter
                    .resolver()
                    .resolve(&*source, DEFAULT_DESCRIBE_HOPS);

                let base = match (transform, input_dimensions) {
                    (Some(existing), input) => {
                        Transform::new(existing.matrix, input, existing.output_dimensions)
                    }
                    (None, Some(dims)) => Transform::identity(dims),
                    (None, None) => {
                        debug!(url = %source.url, "nothing known about source, skipping");
                        continue;
                    }
                };

                match affine
                    .embed_into(&base.output_dimensions)
                    .and_then(|embedded| compose(&embedded, &base))
                {
                    Ok(composed) => {
                        source.transform = Some(composed);
                        applied += 1;
                    }
                    Err(err) => {
                        warn!(layer = %layer.name, url = %source.url, error = %err, "cannot apply affine");
                    }
                }
            }
        }

        self.orienter.orient_to(state, current);
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::NeuroAxes;
    use crate::matrix::approx_eq;
    use crate::resolve::NoDescriptions;
    use crate::table::NeuroTransforms;
    use ng_types::{Layer, Source};
    use proptest::prelude::*;
    use serde_json::json;

    fn shape(len: usize) -> Result<(usize, usize), AffineError> {
        MatrixInput::Flat(vec![0.0; len]).to_matrix().map(|m| m.shape())
    }

    #[test]
    fn flat_lengths_reshape() {
        assert_eq!(shape(12), Ok((3, 4)));
        assert_eq!(shape(16), Ok((4, 4)));
        assert_eq!(shape(6), Ok((2, 3)));
        assert_eq!(shape(20), Ok((4, 5)));
        assert_eq!(shape(10), Err(AffineError::UnsupportedLength { len: 10 }));
        assert_eq!(shape(0), Err(AffineError::UnsupportedLength { len: 0 }));
    }

    #[test]
    fn twenty_values_do_not_fit_three_axes() {
        let input = MatrixInput::Flat((0..20).map(f64::from).collect());
        let err = AffineTransform::from_input(&input, false, &AffineConvention::ras()).unwrap_err();
        assert_eq!(
            err,
            AffineError::ConventionMismatch {
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn nested_json_deeper_than_two_is_rejected() {
        let err = MatrixInput::from_json(&json!([[[1.0]]])).unwrap_err();
        assert_eq!(err, AffineError::TooManyDimensions { ndim: 3 });
        assert_eq!(
            MatrixInput::from_json(&json!([[1, 0], [0, 1]])).unwrap(),
            MatrixInput::Rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]])
        );
    }

    #[test]
    fn tokens_accept_commas_and_json() {
        assert_eq!(
            MatrixInput::parse_tokens(&["1,0", "0", "2"]).unwrap(),
            MatrixInput::Flat(vec![1.0, 0.0, 0.0, 2.0])
        );
        assert_eq!(
            MatrixInput::parse_tokens(&["[[1, 2, 3], [4, 5, 6]]"]).unwrap(),
            MatrixInput::Rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
        );
        assert_eq!(
            MatrixInput::parse_tokens(&["1", "two"]),
            Err(AffineError::NotNumeric)
        );
    }

    #[test]
    fn singular_inverse_is_numeric_error() {
        let input = MatrixInput::Flat(vec![0., 0., 0., 0., 0., 1., 0., 0., 0., 0., 1., 0.]);
        let err = AffineTransform::from_input(&input, true, &AffineConvention::ras()).unwrap_err();
        assert_eq!(err, AffineError::SingularMatrix);
        assert!(err.is_numeric());
    }

    #[test]
    fn square_input_drops_homogeneous_row() {
        let mut values = vec![0.0; 16];
        for i in 0..4 {
            values[i * 5] = 1.0;
        }
        values[3] = 9.0;
        let affine =
            AffineTransform::from_input(&MatrixInput::Flat(values), false, &AffineConvention::ras())
                .unwrap();
        assert_eq!(
            affine.rows(),
            vec![
                vec![1., 0., 0., 9.],
                vec![0., 1., 0., 0.],
                vec![0., 0., 1., 0.],
            ]
        );
    }

    #[test]
    fn embeds_by_axis_name() {
        let shift = AffineTransform::from_input(
            &MatrixInput::Flat(vec![1., 0., 0., 1., 0., 1., 0., 2., 0., 0., 1., 3.]),
            false,
            &AffineConvention::ras(),
        )
        .unwrap();
        let space =
            CoordinateSpace::uniform(["superior", "t", "right", "anterior"], "mm", 1.0).unwrap();
        let embedded = shift.embed_into(&space).unwrap();
        let rows = embedded.matrix.unwrap();
        assert_eq!(rows[0][4], 3.0);
        assert_eq!(rows[1], vec![0., 1., 0., 0., 0.]);
        assert_eq!(rows[2][4], 1.0);
        assert_eq!(rows[3][4], 2.0);

        let xyz = CoordinateSpace::uniform(["x", "y", "z"], "mm", 1.0).unwrap();
        assert_eq!(
            shift.embed_into(&xyz),
            Err(SpaceError::MissingAxis("right".into()))
        );
    }

    fn xyz_state() -> ViewerState {
        let mut state = ViewerState::default();
        state.layers.push(Layer::image(
            "brain",
            Source::new("zarr://host/brain")
                .with_dimensions(CoordinateSpace::uniform(["x", "y", "z"], "mm", 1.0).unwrap()),
        ));
        state.layers.push(Layer::image(
            "other",
            Source::new("zarr://host/other")
                .with_dimensions(CoordinateSpace::uniform(["x", "y", "z"], "mm", 1.0).unwrap()),
        ));
        state
    }

    #[test]
    fn apply_targets_named_layers_and_restores_display() {
        let orienter = Orienter::new(&NoDescriptions, &NeuroTransforms, &NeuroAxes);
        let applier = AffineApplier::new(&orienter, AffineConvention::ras());
        let shift = AffineTransform::from_input(
            &MatrixInput::Flat(vec![1., 0., 0., 1., 0., 1., 0., 2., 0., 0., 1., 3.]),
            false,
            applier.convention(),
        )
        .unwrap();

        let mut state = xyz_state();
        let current = DisplayDimensions::default();
        let applied = applier
            .apply(&mut state, &current, &shift, &["brain".to_string()])
            .unwrap();

        assert_eq!(applied, 1);
        assert_eq!(state.display_dimensions, current);
        let brain = state.layers[0].source[0].transform.as_ref().unwrap();
        assert_eq!(
            brain.matrix.as_ref().unwrap(),
            &vec![
                vec![1., 0., 0., 1.],
                vec![0., 1., 0., 2.],
                vec![0., 0., 1., 3.],
            ]
        );
        assert_eq!(
            brain.output_dimensions.names().collect::<Vec<_>>(),
            vec!["x", "y", "z"]
        );
        let other = state.layers[1].source[0].transform.as_ref().unwrap();
        assert_eq!(
            other.matrix.as_ref().unwrap(),
            &vec![
                vec![1., 0., 0., 0.],
                vec![0., 1., 0., 0.],
                vec![0., 0., 1., 0.],
            ]
        );
    }

    fn invertible_values() -> impl Strategy<Value = Vec<f64>> {
        (
            prop::collection::vec(-0.3f64..0.3, 9),
            prop::collection::vec(-10.0f64..10.0, 3),
        )
            .prop_map(|(linear, shift)| {
                let mut values = Vec::with_capacity(12);
                for i in 0..3 {
                    for j in 0..3 {
                        let diagonal = if i == j { 1.0 } else { 0.0 };
                        values.push(diagonal + linear[i * 3 + j]);
                    }
                    values.push(shift[i]);
                }
                values
            })
    }

    proptest! {
        #[test]
        fn affine_then_inverse_restores_mapping(values in invertible_values()) {
            let orienter = Orienter::new(&NoDescriptions, &NeuroTransforms, &NeuroAxes);
            let applier = AffineApplier::new(&orienter, AffineConvention::ras());
            let input = MatrixInput::Flat(values);
            let forward = AffineTransform::from_input(&input, false, applier.convention()).unwrap();
            let backward = AffineTransform::from_input(&input, true, applier.convention()).unwrap();

            let mut state = xyz_state();
            let current = DisplayDimensions::default();
            applier.apply(&mut state, &current, &forward, &[]).unwrap();
            applier.apply(&mut state, &current, &backward, &[]).unwrap();

            let transform = state.layers[0].source[0].transform.as_ref().unwrap();
            let effective = to_dmatrix(&transform.matrix_or_identity()).unwrap();
            let identity = crate::matrix::identity(3, 3);
            prop_assert!(approx_eq(&effective, &identity, 1e-9));
        }
    }
}
