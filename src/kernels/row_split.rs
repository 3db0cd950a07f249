//! Row-split SpMM (the naive baseline)
//!
//! Rows are divided into contiguous, equal-sized blocks across the thread
//! team without looking at nonzero counts. Each thread fully owns every row
//! in its block, so there is no cross-thread coordination and no fix-up —
//! and no defense against a few heavy rows serializing the whole run. The
//! merge-path and nonzero-split kernels exist to beat this on skewed inputs.

use std::ops::AddAssign;

use num_traits::Num;
use rayon::prelude::*;

use crate::config::SpmmConfig;
use crate::dense::{DenseMatrix, Layout};
use crate::error::Result;
use crate::kernels::{check_dimensions, SendMutPtr, SpmmKernel};
use crate::matrix::CsrMatrix;
use crate::partition::row_block_partition;

/// [`SpmmKernel`] strategy wrapping [`row_split_spmm`]
pub struct RowSplitKernel;

impl<T> SpmmKernel<T> for RowSplitKernel
where
    T: AddAssign + Copy + Num + Send + Sync,
{
    fn name(&self) -> &'static str {
        "row-split"
    }

    fn multiply(
        &self,
        a: &CsrMatrix<T>,
        x: &DenseMatrix<T>,
        y: &mut DenseMatrix<T>,
        config: &SpmmConfig,
    ) -> Result<()> {
        row_split_spmm(a, x, y, config)
    }
}

/// Computes `Y = A * X` with one contiguous row block per thread
pub fn row_split_spmm<T>(
    a: &CsrMatrix<T>,
    x: &DenseMatrix<T>,
    y: &mut DenseMatrix<T>,
    config: &SpmmConfig,
) -> Result<()>
where
    T: AddAssign + Copy + Num + Send + Sync,
{
    check_dimensions(a, x, y)?;

    let num_rows = a.num_rows;
    let num_vectors = x.num_cols();
    let blocks = row_block_partition(num_rows, config.num_threads.max(1));

    // Scratch row-major copy of X, owned by this invocation
    let scratch;
    let x_row_major = match x.layout() {
        Layout::RowMajor => x,
        Layout::ColMajor => {
            scratch = x.to_layout(Layout::RowMajor);
            &scratch
        }
    };
    let xs = x_row_major.as_slice();

    let y_layout = y.layout();
    let y_out = SendMutPtr::new(y.as_mut_slice());

    blocks.par_iter().for_each(|block| {
        // SAFETY: row blocks are disjoint; this thread writes only rows in
        // its own block.
        let ys = unsafe { y_out.as_mut_slice() };

        let mut partial = vec![T::zero(); num_vectors];
        for row in block.clone() {
            for k in a.row_range(row) {
                let val = a.values[k];
                let base = a.column_indices[k] * num_vectors;
                for (i, slot) in partial.iter_mut().enumerate() {
                    *slot += val * xs[base + i];
                }
            }

            let (base, stride) = y_layout.row_span(row, num_rows, num_vectors);
            for (i, slot) in partial.iter_mut().enumerate() {
                ys[base + i * stride] = *slot;
                *slot = T::zero();
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_split_small() {
        // [[1, 0, 2], [0, 0, 0], [3, 4, 0]] * [1, 10, 100]^T
        let a = CsrMatrix::new(
            3,
            3,
            vec![0, 2, 2, 4],
            vec![0, 2, 0, 1],
            vec![1.0, 2.0, 3.0, 4.0],
        );
        let x = DenseMatrix::from_fn(3, 1, Layout::RowMajor, |r, _| [1.0, 10.0, 100.0][r]);
        let mut y = DenseMatrix::zeros(3, 1, Layout::RowMajor);

        row_split_spmm(&a, &x, &mut y, &SpmmConfig::with_threads(2)).unwrap();

        assert_eq!(y.get(0, 0), 201.0);
        assert_eq!(y.get(1, 0), 0.0);
        assert_eq!(y.get(2, 0), 43.0);
    }

    #[test]
    fn test_row_split_more_threads_than_rows() {
        let a = CsrMatrix::<f64>::identity(2);
        let x = DenseMatrix::from_fn(2, 2, Layout::RowMajor, |r, c| (r + c) as f64);
        let mut y = DenseMatrix::zeros(2, 2, Layout::RowMajor);

        row_split_spmm(&a, &x, &mut y, &SpmmConfig::with_threads(16)).unwrap();

        for r in 0..2 {
            for c in 0..2 {
                assert_eq!(y.get(r, c), (r + c) as f64);
            }
        }
    }
}
