//! Merge-path SpMM
//!
//! The total work is modeled as `num_rows + num_nonzeros` merge items — one
//! per row boundary, one per nonzero product — and divided into equal
//! diagonal spans, one per thread. The diagonal search positions each thread
//! on the path in O(log) time, after which every thread does within one item
//! of the same amount of work regardless of how nonzeros are distributed
//! across rows. Rows cut by a span boundary are completed by the successor
//! thread and patched by the predecessor's carry-out after the barrier.

use std::ops::AddAssign;

use num_traits::Num;

use crate::config::SpmmConfig;
use crate::dense::DenseMatrix;
use crate::error::Result;
use crate::kernels::{run_carry_out_kernel, SpmmKernel};
use crate::matrix::CsrMatrix;
use crate::partition::merge_path_partition;

/// [`SpmmKernel`] strategy wrapping [`merge_path_spmm`]
pub struct MergePathKernel;

impl<T> SpmmKernel<T> for MergePathKernel
where
    T: AddAssign + Copy + Num + Send + Sync,
{
    fn name(&self) -> &'static str {
        "merge-path"
    }

    fn multiply(
        &self,
        a: &CsrMatrix<T>,
        x: &DenseMatrix<T>,
        y: &mut DenseMatrix<T>,
        config: &SpmmConfig,
    ) -> Result<()> {
        merge_path_spmm(a, x, y, config)
    }
}

/// Computes `Y = A * X` with merge-path work partitioning
pub fn merge_path_spmm<T>(
    a: &CsrMatrix<T>,
    x: &DenseMatrix<T>,
    y: &mut DenseMatrix<T>,
    config: &SpmmConfig,
) -> Result<()>
where
    T: AddAssign + Copy + Num + Send + Sync,
{
    let segments = merge_path_partition(
        a.row_end_offsets(),
        a.num_rows,
        a.nnz(),
        config.num_threads.max(1),
    );
    run_carry_out_kernel(a, x, y, &segments)
}
