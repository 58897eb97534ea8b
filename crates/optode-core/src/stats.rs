//! Column statistics for multichannel sample matrices
//!
//! Channels arrive in raw units that are not comparable across channels, so
//! aggregation normalizes each channel column first. Statistics use the
//! sample (n-1) denominator.

use nalgebra::DMatrix;

/// Mean of one column.
#[must_use]
pub fn column_mean(data: &DMatrix<f64>, col: usize) -> f64 {
    let n = data.nrows();
    if n == 0 {
        return 0.0;
    }
    data.column(col).iter().sum::<f64>() / n as f64
}

/// Sample standard deviation of one column (n-1 denominator).
///
/// Returns 0.0 for columns with fewer than two samples.
#[must_use]
pub fn column_std(data: &DMatrix<f64>, col: usize) -> f64 {
    let n = data.nrows();
    if n < 2 {
        return 0.0;
    }
    let mean = column_mean(data, col);
    let sum_sq: f64 = data.column(col).iter().map(|v| (v - mean) * (v - mean)).sum();
    (sum_sq / (n as f64 - 1.0)).sqrt()
}

/// Z-score each column: zero mean, unit sample variance.
///
/// A constant column has zero standard deviation and comes out as NaN, and a
/// single-sample matrix has no defined variance at all. Both are surfaced as
/// NaN in the output rather than rejected.
#[must_use]
pub fn zscore_columns(data: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = data.clone();
    for col in 0..data.ncols() {
        let mean = column_mean(data, col);
        let std = if data.nrows() < 2 {
            f64::NAN
        } else {
            column_std(data, col)
        };
        for v in out.column_mut(col).iter_mut() {
            *v = (*v - mean) / std;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_mean_and_std() {
        let data = DMatrix::from_column_slice(5, 1, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((column_mean(&data, 0) - 3.0).abs() < 1e-12);
        assert!((column_std(&data, 0) - 2.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zscore_zero_mean_unit_variance() {
        let data = DMatrix::from_column_slice(4, 1, &[2.0, 4.0, 6.0, 8.0]);
        let z = zscore_columns(&data);

        assert!((column_mean(&z, 0)).abs() < 1e-12);
        assert!((column_std(&z, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zscore_affine_invariance() {
        // Scaling and shifting a channel must not change its z-scores.
        let data = DMatrix::from_column_slice(4, 1, &[1.0, 3.0, 2.0, 6.0]);
        let scaled = data.map(|v| v * 17.5 - 4.0);

        let z = zscore_columns(&data);
        let z_scaled = zscore_columns(&scaled);

        for (a, b) in z.iter().zip(z_scaled.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zscore_constant_column_is_nan() {
        let data = DMatrix::from_column_slice(3, 1, &[5.0, 5.0, 5.0]);
        let z = zscore_columns(&data);
        assert!(z.iter().all(|v| v.is_nan()));
    }
}
