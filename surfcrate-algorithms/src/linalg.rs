//! Dense linear algebra helpers

use nalgebra::DMatrix;
use surfcrate_core::{Error, Result};

/// Relative tolerance below which singular values are treated as zero
pub const PINV_RELATIVE_TOLERANCE: f32 = 1e-6;

/// Moore-Penrose pseudo-inverse via singular value decomposition
///
/// Singular values at or below `1e-6 * max(rows, cols) * sigma_max` are dropped.
/// An `m x n` input yields an `n x m` result; a zero or empty matrix yields zeros.
pub fn pseudo_inverse(matrix: &DMatrix<f32>) -> Result<DMatrix<f32>> {
    let (rows, cols) = matrix.shape();
    if rows == 0 || cols == 0 {
        return Ok(DMatrix::zeros(cols, rows));
    }

    let svd = matrix.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    let tolerance = PINV_RELATIVE_TOLERANCE * rows.max(cols) as f32 * sigma_max;

    svd.pseudo_inverse(tolerance)
        .map_err(|e| Error::Algorithm(format!("pseudo-inverse failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_invertible_matrix() {
        let m = DMatrix::from_row_slice(3, 3, &[2.0, 0.0, 1.0, 1.0, 3.0, 0.0, 0.0, 1.0, 4.0]);
        let pinv = pseudo_inverse(&m).unwrap();
        let identity = &m * &pinv;

        assert_relative_eq!(identity, DMatrix::identity(3, 3), epsilon = 1e-5);
    }

    #[test]
    fn test_rank_deficient_matrix() {
        // Two identical rows
        let m = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let pinv = pseudo_inverse(&m).unwrap();

        assert_eq!(pinv.shape(), (3, 3));
        assert_relative_eq!(&m * &pinv * &m, m, epsilon = 1e-5);
        assert_relative_eq!(&pinv * &m * &pinv, pinv, epsilon = 1e-5);
    }

    #[test]
    fn test_rectangular_shape() {
        let m = DMatrix::from_row_slice(2, 4, &[1.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        let pinv = pseudo_inverse(&m).unwrap();

        assert_eq!(pinv.shape(), (4, 2));
        assert_relative_eq!(pinv[(0, 0)], 1.0, epsilon = 1e-6);
        assert_relative_eq!(pinv[(1, 1)], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_matrix() {
        let pinv = pseudo_inverse(&DMatrix::zeros(3, 2)).unwrap();
        assert_eq!(pinv, DMatrix::zeros(2, 3));
    }
}
