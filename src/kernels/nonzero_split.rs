//! Nonzero-split SpMM
//!
//! Thread boundaries come from dividing nonzero space alone into equal
//! spans, then mapping each boundary to its row with the row-position
//! search. Compared to merge-path this ignores the per-row bookkeeping cost:
//! a thread landed on many short rows does more row traffic than its peers,
//! while the floating-point work stays perfectly balanced. The consume and
//! carry-out protocol is the same as merge-path's.

use std::ops::AddAssign;

use num_traits::Num;

use crate::config::SpmmConfig;
use crate::dense::DenseMatrix;
use crate::error::Result;
use crate::kernels::{run_carry_out_kernel, SpmmKernel};
use crate::matrix::CsrMatrix;
use crate::partition::nonzero_split_partition;

/// [`SpmmKernel`] strategy wrapping [`nonzero_split_spmm`]
pub struct NonzeroSplitKernel;

impl<T> SpmmKernel<T> for NonzeroSplitKernel
where
    T: AddAssign + Copy + Num + Send + Sync,
{
    fn name(&self) -> &'static str {
        "nonzero-split"
    }

    fn multiply(
        &self,
        a: &CsrMatrix<T>,
        x: &DenseMatrix<T>,
        y: &mut DenseMatrix<T>,
        config: &SpmmConfig,
    ) -> Result<()> {
        nonzero_split_spmm(a, x, y, config)
    }
}

/// Computes `Y = A * X` with nonzero-count work partitioning
pub fn nonzero_split_spmm<T>(
    a: &CsrMatrix<T>,
    x: &DenseMatrix<T>,
    y: &mut DenseMatrix<T>,
    config: &SpmmConfig,
) -> Result<()>
where
    T: AddAssign + Copy + Num + Send + Sync,
{
    let segments = nonzero_split_partition(
        a.row_end_offsets(),
        a.num_rows,
        a.nnz(),
        config.num_threads.max(1),
    );
    run_carry_out_kernel(a, x, y, &segments)
}
