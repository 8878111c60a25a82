//! Matrix helpers over `ndarray` arrays, with inversion delegated to `nalgebra`.

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub struct MatrixHelper;

impl MatrixHelper {
    /// Multiply two 2D arrays.
    pub fn multiply(lhs: ArrayView2<f64>, rhs: ArrayView2<f64>) -> Array2<f64> {
        lhs.dot(&rhs)
    }

    pub fn apply(lhs: ArrayView2<f64>, rhs: ArrayView1<f64>) -> Array1<f64> {
        lhs.dot(&rhs)
    }

    pub fn transpose(matrix: ArrayView2<f64>) -> Array2<f64> {
        matrix.t().to_owned()
    }

    pub fn identity(size: usize) -> Array2<f64> {
        Array2::eye(size)
    }

    /// Inverts a square matrix through nalgebra's LU decomposition.
    /// Returns `None` when the matrix is not square, is singular, or the
    /// inverse is not finite.
    pub fn invert(matrix: ArrayView2<f64>) -> Option<Array2<f64>> {
        let (rows, cols) = matrix.dim();
        if rows != cols || rows == 0 {
            return None;
        }
        let dense = DMatrix::from_fn(rows, cols, |r, c| matrix[[r, c]]);
        let inverse = dense.lu().try_inverse()?;
        if inverse.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Array2::from_shape_fn((rows, cols), |(r, c)| inverse[(r, c)]))
    }

    /// First `(i, j, m[i,j] - m[j,i])` whose difference exceeds
    /// `tolerance * max(1, |m|max)`.
    pub fn first_asymmetry(matrix: ArrayView2<f64>, tolerance: f64) -> Option<(usize, usize, f64)> {
        let (rows, cols) = matrix.dim();
        let scale = matrix.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
        for i in 0..rows.min(cols) {
            for j in (i + 1)..cols.min(rows) {
                let diff = matrix[[i, j]] - matrix[[j, i]];
                if diff.is_nan() || diff.abs() > tolerance * scale {
                    return Some((i, j, diff));
                }
            }
        }
        None
    }

    pub fn is_symmetric(matrix: ArrayView2<f64>, tolerance: f64) -> bool {
        let (rows, cols) = matrix.dim();
        rows == cols && Self::first_asymmetry(matrix, tolerance).is_none()
    }

    /// First diagonal entry that is negative or non-finite, if any.
    pub fn first_invalid_diagonal(matrix: ArrayView2<f64>) -> Option<(usize, f64)> {
        matrix
            .diag()
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
            .map(|(i, v)| (i, *v))
    }
}
