//! Conversions between row lists and `nalgebra` matrices.

use nalgebra::DMatrix;

use crate::error::{SpaceError, SpaceResult};

/// Build a dense matrix from rows, rejecting ragged input.
pub fn to_dmatrix(rows: &[Vec<f64>]) -> SpaceResult<DMatrix<f64>> {
    let cols = rows.first().map(Vec::len).unwrap_or(0);
    for (row, values) in rows.iter().enumerate() {
        if values.len() != cols {
            return Err(SpaceError::RaggedMatrix {
                row,
                expected: cols,
                found: values.len(),
            });
        }
    }
    Ok(DMatrix::from_fn(rows.len(), cols, |i, j| rows[i][j]))
}

pub fn to_rows(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

/// Append the homogeneous row `[0, .., 0, 1]`.
pub fn augment(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let (rows, cols) = matrix.shape();
    let mut out = matrix.clone().insert_row(rows, 0.0);
    if cols > 0 {
        out[(rows, cols - 1)] = 1.0;
    }
    out
}

/// Augment an `(n-1) x n` matrix to `n x n`; square matrices are returned as is.
pub fn to_square(matrix: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let (rows, cols) = matrix.shape();
    if rows == cols {
        Some(matrix.clone())
    } else if rows + 1 == cols {
        Some(augment(matrix))
    } else {
        None
    }
}

/// Homogeneous identity of shape `rows x (cols + 1)`.
pub fn identity(rows: usize, cols: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows, cols + 1, |i, j| if i == j { 1.0 } else { 0.0 })
}

/// Place a homogeneous `k x (k + 1)` block into a rank-`rank` identity.
///
/// `positions[i]` is the axis of the larger space that block axis `i` maps to.
pub fn embed(block: &DMatrix<f64>, positions: &[usize], rank: usize) -> DMatrix<f64> {
    let k = positions.len();
    let mut out = identity(rank, rank);
    for (bi, &oi) in positions.iter().enumerate() {
        out[(oi, oi)] = 0.0;
        for (bj, &oj) in positions.iter().enumerate() {
            out[(oi, oj)] = block[(bi, bj)];
        }
        out[(oi, rank)] = block[(bi, k)];
    }
    out
}

/// Element-wise comparison within `tolerance`.
pub fn approx_eq(a: &DMatrix<f64>, b: &DMatrix<f64>, tolerance: f64) -> bool {
    a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tolerance)
}
