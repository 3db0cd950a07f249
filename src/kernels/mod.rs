//! Parallel SpMM kernels
//!
//! Three interchangeable strategies compute `Y = A * X` for a CSR matrix `A`
//! and a dense multi-vector `X`:
//!
//! - **row-split**: contiguous equal row blocks, no coordination; the naive
//!   baseline whose load balance collapses on skewed matrices
//! - **merge-path**: equal spans of the virtual merged list of row
//!   boundaries and nonzeros
//! - **nonzero-split**: equal spans of nonzero space alone
//!
//! The latter two may cut a row between threads; they share the carry-out
//! fix-up protocol implemented here. A serial reference oracle and a vendor
//! (sprs) arm round out the comparison set.

pub mod merge_path;
pub mod nonzero_split;
pub mod reference;
pub mod row_split;
pub mod vendor;

pub use merge_path::{merge_path_spmm, MergePathKernel};
pub use nonzero_split::{nonzero_split_spmm, NonzeroSplitKernel};
pub use reference::reference_spmv;
pub use row_split::{row_split_spmm, RowSplitKernel};
pub use vendor::{DisabledVendor, SprsVendor};

use std::ops::AddAssign;

use num_traits::Num;
use rayon::prelude::*;

use crate::config::SpmmConfig;
use crate::dense::{DenseMatrix, Layout};
use crate::error::{Result, SpmmError};
use crate::matrix::CsrMatrix;
use crate::partition::ThreadSegment;

/// A named SpMM strategy the harness can run and compare
///
/// `multiply` is the single capability: a pure, synchronous
/// `(matrix, X, Y, config) -> Result` call. Implementations must leave every
/// element of `Y` fully determined on success.
pub trait SpmmKernel<T> {
    /// Short name used in reports
    fn name(&self) -> &'static str;

    /// Whether this strategy can run in the current environment
    ///
    /// The null vendor substitute reports false so its comparison arm is
    /// skipped instead of failing the run.
    fn is_available(&self) -> bool {
        true
    }

    /// Computes `Y = A * X`
    fn multiply(
        &self,
        a: &CsrMatrix<T>,
        x: &DenseMatrix<T>,
        y: &mut DenseMatrix<T>,
        config: &SpmmConfig,
    ) -> Result<()>;
}

/// A partial row result held by a thread whose span ended mid-row
///
/// `row == num_rows` is the sentinel for "span ended on the row-space
/// boundary, nothing to carry".
#[derive(Debug, Clone)]
pub struct CarryOut<T> {
    /// Row the partial sum belongs to
    pub row: usize,
    /// Accumulated products for that row, one per vector column
    pub partial: Vec<T>,
}

/// Wrapper to send a raw mutable pointer across thread boundaries.
/// Safety: the caller must ensure non-overlapping access between threads.
#[derive(Clone, Copy)]
struct SendMutPtr<T> {
    ptr: *mut T,
    len: usize,
}

unsafe impl<T> Send for SendMutPtr<T> {}
unsafe impl<T> Sync for SendMutPtr<T> {}

impl<T> SendMutPtr<T> {
    fn new(slice: &mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
        }
    }

    /// Get a mutable slice. Safety: caller ensures no aliasing.
    #[allow(clippy::mut_from_ref)]
    unsafe fn as_mut_slice(&self) -> &mut [T] {
        std::slice::from_raw_parts_mut(self.ptr, self.len)
    }
}

/// Validates X and Y shapes against the matrix before parallel dispatch
pub fn check_dimensions<T>(
    a: &CsrMatrix<T>,
    x: &DenseMatrix<T>,
    y: &DenseMatrix<T>,
) -> Result<()> {
    let num_vectors = x.num_cols();
    if x.num_rows() != a.num_cols {
        return Err(SpmmError::DimensionMismatch {
            buffer: "X",
            expected_rows: a.num_cols,
            expected_cols: num_vectors,
            actual_rows: x.num_rows(),
            actual_cols: x.num_cols(),
        });
    }
    if y.num_rows() != a.num_rows || y.num_cols() != num_vectors {
        return Err(SpmmError::DimensionMismatch {
            buffer: "Y",
            expected_rows: a.num_rows,
            expected_cols: num_vectors,
            actual_rows: y.num_rows(),
            actual_cols: y.num_cols(),
        });
    }
    Ok(())
}

/// Runs the shared consume/carry-out protocol over a precomputed partition
///
/// Each segment walks its span of the merge path: rows that end inside the
/// span are accumulated into a running total and *overwritten* into `Y`
/// (resetting the total); the trailing partial row is only accumulated and
/// leaves the segment as a carry-out. The `collect` below is the full
/// barrier between the parallel phase and the sequential fix-up — no
/// carry-out is applied until every segment's writes are visible.
pub(crate) fn run_carry_out_kernel<T>(
    a: &CsrMatrix<T>,
    x: &DenseMatrix<T>,
    y: &mut DenseMatrix<T>,
    segments: &[ThreadSegment],
) -> Result<()>
where
    T: AddAssign + Copy + Num + Send + Sync,
{
    check_dimensions(a, x, y)?;

    let num_rows = a.num_rows;
    let num_vectors = x.num_cols();

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

    let row_end_offsets = a.row_end_offsets();
    let column_indices = &a.column_indices;
    let values = &a.values;
    let y_layout = y.layout();
    let y_out = SendMutPtr::new(y.as_mut_slice());

    let carry_outs: Vec<CarryOut<T>> = segments
        .par_iter()
        .map(|segment| {
            // SAFETY: segments partition row space; this segment overwrites
            // only rows in [start.x, end.x), disjoint from every other
            // segment's range.
            let ys = unsafe { y_out.as_mut_slice() };

            let mut running_total = vec![T::zero(); num_vectors];
            let mut coord = segment.start;

            // Consume whole rows
            while coord.x < segment.end.x {
                while coord.y < row_end_offsets[coord.x] {
                    let val = values[coord.y];
                    let base = column_indices[coord.y] * num_vectors;
                    for (i, slot) in running_total.iter_mut().enumerate() {
                        *slot += val * xs[base + i];
                    }
                    coord.y += 1;
                }

                let (base, stride) = y_layout.row_span(coord.x, num_rows, num_vectors);
                for (i, slot) in running_total.iter_mut().enumerate() {
                    ys[base + i * stride] = *slot;
                    *slot = T::zero();
                }
                coord.x += 1;
            }

            // Consume the partial portion of the segment's last row
            while coord.y < segment.end.y {
                let val = values[coord.y];
                let base = column_indices[coord.y] * num_vectors;
                for (i, slot) in running_total.iter_mut().enumerate() {
                    *slot += val * xs[base + i];
                }
                coord.y += 1;
            }

            CarryOut {
                row: segment.end.x,
                partial: running_total,
            }
        })
        .collect();

    apply_carry_outs(&carry_outs, y);
    Ok(())
}

/// Sequential carry-out fix-up for rows spanning multiple threads
///
/// Adds each thread's partial sum into `Y` at its recorded boundary row.
/// The thread owning the next span has already overwritten that row during
/// the parallel phase, so a single addition per carry-out completes it. The
/// final thread never carries work out: both partitions pin its end
/// coordinate to the row-space boundary, which is asserted here rather than
/// assumed.
pub(crate) fn apply_carry_outs<T>(carry_outs: &[CarryOut<T>], y: &mut DenseMatrix<T>)
where
    T: AddAssign + Copy + Num,
{
    let num_rows = y.num_rows();
    let num_vectors = y.num_cols();

    let last = match carry_outs.last() {
        Some(last) => last,
        None => return,
    };
    assert_eq!(
        last.row, num_rows,
        "final segment must end at the row-space boundary"
    );

    let y_layout = y.layout();
    let ys = y.as_mut_slice();
    for carry in &carry_outs[..carry_outs.len() - 1] {
        if carry.row < num_rows {
            let (base, stride) = y_layout.row_span(carry.row, num_rows, num_vectors);
            for (i, &partial) in carry.partial.iter().enumerate() {
                ys[base + i * stride] += partial;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::MergeCoordinate;

    fn carry(row: usize, partial: Vec<f64>) -> CarryOut<f64> {
        CarryOut { row, partial }
    }

    #[test]
    fn test_apply_carry_outs_adds_into_rows() {
        let mut y = DenseMatrix::from_fn(3, 2, Layout::RowMajor, |_, _| 1.0);
        let carry_outs = vec![
            carry(1, vec![0.5, 0.25]),
            carry(1, vec![0.5, 0.25]),
            carry(3, vec![9.0, 9.0]), // final sentinel, never applied
        ];

        apply_carry_outs(&carry_outs, &mut y);

        assert_eq!(y.get(0, 0), 1.0);
        assert_eq!(y.get(1, 0), 2.0);
        assert_eq!(y.get(1, 1), 1.5);
        assert_eq!(y.get(2, 1), 1.0);
    }

    #[test]
    fn test_apply_carry_outs_skips_sentinel_rows() {
        let mut y = DenseMatrix::from_fn(2, 1, Layout::ColMajor, |_, _| 0.0);
        let carry_outs = vec![
            carry(2, vec![5.0]), // sentinel from an empty segment
            carry(0, vec![1.0]),
            carry(2, vec![0.0]),
        ];

        apply_carry_outs(&carry_outs, &mut y);

        assert_eq!(y.get(0, 0), 1.0);
        assert_eq!(y.get(1, 0), 0.0);
    }

    #[test]
    #[should_panic(expected = "final segment must end at the row-space boundary")]
    fn test_apply_carry_outs_asserts_terminal_invariant() {
        let mut y = DenseMatrix::<f64>::zeros(4, 1, Layout::RowMajor);
        apply_carry_outs(&[carry(3, vec![1.0])], &mut y);
    }

    #[test]
    fn test_check_dimensions() {
        let a = CsrMatrix::<f64>::identity(3);
        let x = DenseMatrix::zeros(3, 2, Layout::RowMajor);
        let y = DenseMatrix::zeros(3, 2, Layout::RowMajor);
        assert!(check_dimensions(&a, &x, &y).is_ok());

        let y_bad = DenseMatrix::zeros(4, 2, Layout::RowMajor);
        assert!(matches!(
            check_dimensions(&a, &x, &y_bad),
            Err(SpmmError::DimensionMismatch { buffer: "Y", .. })
        ));

        let x_bad = DenseMatrix::zeros(2, 2, Layout::RowMajor);
        assert!(matches!(
            check_dimensions(&a, &x_bad, &y),
            Err(SpmmError::DimensionMismatch { buffer: "X", .. })
        ));
    }

    #[test]
    fn test_run_carry_out_kernel_single_segment() {
        // 2x2 matrix [[1, 2], [0, 3]], X = [[1], [10]]
        let a = CsrMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1.0, 2.0, 3.0]);
        let x = DenseMatrix::from_fn(2, 1, Layout::RowMajor, |r, _| if r == 0 { 1.0 } else { 10.0 });
        let mut y = DenseMatrix::zeros(2, 1, Layout::RowMajor);

        let segments = [ThreadSegment {
            start: MergeCoordinate { x: 0, y: 0 },
            end: MergeCoordinate { x: 2, y: 3 },
        }];
        run_carry_out_kernel(&a, &x, &mut y, &segments).unwrap();

        assert_eq!(y.get(0, 0), 21.0);
        assert_eq!(y.get(1, 0), 30.0);
    }
}
