//! Coordinate space transforms.

use serde::{Deserialize, Serialize};

use crate::CoordinateSpace;

/// Affine map between two coordinate spaces, in homogeneous form.
///
/// The matrix has shape `output_rank x (input_rank + 1)`; the last column
/// is the translation. A transform without a matrix is the identity over its
/// declared spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Vec<f64>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_dimensions: Option<CoordinateSpace>,

    pub output_dimensions: CoordinateSpace,
}

impl Transform {
    pub fn new(
        matrix: Option<Vec<Vec<f64>>>,
        input_dimensions: Option<CoordinateSpace>,
        output_dimensions: CoordinateSpace,
    ) -> Self {
        Self {
            matrix,
            input_dimensions,
            output_dimensions,
        }
    }

    /// Identity over one space (no explicit matrix).
    pub fn identity(space: CoordinateSpace) -> Self {
        Self {
            matrix: None,
            input_dimensions: Some(space.clone()),
            output_dimensions: space,
        }
    }

    pub fn output_rank(&self) -> usize {
        self.output_dimensions.rank()
    }

    /// Input rank, from the declared input space, else the matrix, else the output.
    pub fn input_rank(&self) -> usize {
        if let Some(input) = &self.input_dimensions {
            return input.rank();
        }
        match self.matrix.as_ref().and_then(|rows| rows.first()) {
            Some(row) => row.len().saturating_sub(1),
            None => self.output_rank(),
        }
    }

    /// The explicit matrix, or the homogeneous identity over the declared ranks.
    pub fn matrix_or_identity(&self) -> Vec<Vec<f64>> {
        match &self.matrix {
            Some(rows) => rows.clone(),
            None => identity_rows(self.output_rank(), self.input_rank()),
        }
    }

    /// Same transform with an explicit input space.
    pub fn with_input_dimensions(mut self, input: Option<CoordinateSpace>) -> Self {
        self.input_dimensions = input;
        self
    }
}

/// Homogeneous identity rows: `rows x (cols + 1)` with a zero translation.
pub(crate) fn identity_rows(rows: usize, cols: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|i| (0..=cols).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}
