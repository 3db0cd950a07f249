//! Serial reference SpMV
//!
//! The correctness oracle: a single-threaded, single-vector
//! `y = beta * y_in + alpha * A * x` that every parallel kernel is compared
//! against. It is never timed as a competitive kernel.

use std::ops::AddAssign;

use num_traits::Num;

use crate::matrix::CsrMatrix;

/// Computes `beta * y_in + alpha * A * x` row by row
///
/// # Panics
///
/// Panics if `x` or `y_in` lengths disagree with the matrix dimensions.
pub fn reference_spmv<T>(a: &CsrMatrix<T>, x: &[T], y_in: &[T], alpha: T, beta: T) -> Vec<T>
where
    T: AddAssign + Copy + Num,
{
    assert_eq!(x.len(), a.num_cols, "x length must equal num_cols");
    assert_eq!(y_in.len(), a.num_rows, "y_in length must equal num_rows");

    let mut y_out = Vec::with_capacity(a.num_rows);
    for row in 0..a.num_rows {
        let mut partial = beta * y_in[row];
        for k in a.row_range(row) {
            partial += alpha * a.values[k] * x[a.column_indices[k]];
        }
        y_out.push(partial);
    }
    y_out
}
