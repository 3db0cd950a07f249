//! Vendor sparse-BLAS comparison arm
//!
//! The harness compares the in-crate kernels against an external
//! sparse-linear-algebra library (sprs). The library is a black box behind
//! the [`SpmmKernel`] seam: we hand it the same CSR arrays and dense
//! operands and take whatever partitioning strategy it uses internally.
//! [`DisabledVendor`] substitutes for environments where the comparison arm
//! should not run; only that arm is skipped.

use ndarray::Array2;
use sprs::CsMat;

use crate::config::SpmmConfig;
use crate::dense::DenseMatrix;
use crate::error::Result;
use crate::kernels::{check_dimensions, SpmmKernel};
use crate::matrix::CsrMatrix;

/// SpMM through sprs's own CSR x dense product
pub struct SprsVendor;

/// Null vendor substitute: reports unavailable so the harness skips the arm
pub struct DisabledVendor;

// One entry point per precision, like a vendor BLAS exposes.

fn sprs_multiply_f64(
    a: &CsrMatrix<f64>,
    x: &DenseMatrix<f64>,
    y: &mut DenseMatrix<f64>,
) -> Result<()> {
    check_dimensions(a, x, y)?;

    let mat: CsMat<f64> = CsMat::new(
        (a.num_rows, a.num_cols),
        a.row_offsets.clone(),
        a.column_indices.clone(),
        a.values.clone(),
    );
    let x_nd = Array2::from_shape_fn((a.num_cols, x.num_cols()), |(r, c)| x.get(r, c));

    let y_nd = &mat * &x_nd;

    for r in 0..a.num_rows {
        for c in 0..y.num_cols() {
            y.set(r, c, y_nd[[r, c]]);
        }
    }
    Ok(())
}

fn sprs_multiply_f32(
    a: &CsrMatrix<f32>,
    x: &DenseMatrix<f32>,
    y: &mut DenseMatrix<f32>,
) -> Result<()> {
    check_dimensions(a, x, y)?;

    let mat: CsMat<f32> = CsMat::new(
        (a.num_rows, a.num_cols),
        a.row_offsets.clone(),
        a.column_indices.clone(),
        a.values.clone(),
    );
    let x_nd = Array2::from_shape_fn((a.num_cols, x.num_cols()), |(r, c)| x.get(r, c));

    let y_nd = &mat * &x_nd;

    for r in 0..a.num_rows {
        for c in 0..y.num_cols() {
            y.set(r, c, y_nd[[r, c]]);
        }
    }
    Ok(())
}

impl SpmmKernel<f64> for SprsVendor {
    fn name(&self) -> &'static str {
        "sprs"
    }

    fn multiply(
        &self,
        a: &CsrMatrix<f64>,
        x: &DenseMatrix<f64>,
        y: &mut DenseMatrix<f64>,
        _config: &SpmmConfig,
    ) -> Result<()> {
        sprs_multiply_f64(a, x, y)
    }
}

impl SpmmKernel<f32> for SprsVendor {
    fn name(&self) -> &'static str {
        "sprs"
    }

    fn multiply(
        &self,
        a: &CsrMatrix<f32>,
        x: &DenseMatrix<f32>,
        y: &mut DenseMatrix<f32>,
        _config: &SpmmConfig,
    ) -> Result<()> {
        sprs_multiply_f32(a, x, y)
    }
}

impl<T> SpmmKernel<T> for DisabledVendor {
    fn name(&self) -> &'static str {
        "vendor (disabled)"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn multiply(
        &self,
        _a: &CsrMatrix<T>,
        _x: &DenseMatrix<T>,
        _y: &mut DenseMatrix<T>,
        _config: &SpmmConfig,
    ) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::Layout;

    #[test]
    fn test_sprs_vendor_matches_hand_product() {
        // [[1, 2], [0, 3]] * [[1, 5], [10, 50]]
        let a = CsrMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1.0, 2.0, 3.0]);
        let x = DenseMatrix::from_fn(2, 2, Layout::RowMajor, |r, c| {
            [[1.0, 5.0], [10.0, 50.0]][r][c]
        });
        let mut y = DenseMatrix::zeros(2, 2, Layout::RowMajor);

        SprsVendor
            .multiply(&a, &x, &mut y, &SpmmConfig::default())
            .unwrap();

        assert_eq!(y.get(0, 0), 21.0);
        assert_eq!(y.get(0, 1), 105.0);
        assert_eq!(y.get(1, 0), 30.0);
        assert_eq!(y.get(1, 1), 150.0);
    }

    #[test]
    fn test_sprs_vendor_column_major_operands() {
        let a = CsrMatrix::new(2, 3, vec![0, 2, 3], vec![0, 2, 1], vec![1.0f32, 2.0, 3.0]);
        let x = DenseMatrix::from_fn(3, 1, Layout::ColMajor, |r, _| (r + 1) as f32);
        let mut y = DenseMatrix::zeros(2, 1, Layout::ColMajor);

        SprsVendor
            .multiply(&a, &x, &mut y, &SpmmConfig::default())
            .unwrap();

        assert_eq!(y.get(0, 0), 7.0);
        assert_eq!(y.get(1, 0), 6.0);
    }

    #[test]
    fn test_disabled_vendor_reports_unavailable() {
        let vendor = DisabledVendor;
        assert!(!SpmmKernel::<f64>::is_available(&vendor));
    }
}
