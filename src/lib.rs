//! # merge-spmm: load-balanced CSR SpMM on multicore CPUs
//!
//! This library benchmarks and validates competing strategies for
//! multiplying a large sparse matrix by a block of dense vectors
//! (SpMM) on a multi-core CPU. The interesting part is not the
//! multiply-add — it is how the irregular work is split across threads and
//! how the pieces are stitched back together:
//!
//! 1. **Static partitioning**: the matrix is viewed as a virtual merged
//!    list of row boundaries and nonzeros. Two binary searches
//!    ([`partition::merge_path_search`] and
//!    [`partition::row_position_search`]) give each thread a contiguous,
//!    disjoint span of that list in logarithmic time.
//!
//! 2. **Carry-out fix-up**: a thread whose span ends mid-row holds its
//!    partial sum as a carry-out; after the fork-join barrier a short
//!    sequential pass adds each carry-out into the row the successor thread
//!    already overwrote. Exactly-once accumulation falls out of the
//!    partition geometry rather than from locks.
//!
//! Three kernels share this machinery:
//!
//! - [`kernels::row_split_spmm`] — naive contiguous row blocks (the
//!   baseline the others beat on skewed matrices)
//! - [`kernels::merge_path_spmm`] — equal spans of rows + nonzeros
//! - [`kernels::nonzero_split_spmm`] — equal spans of nonzeros alone
//!
//! A serial oracle ([`kernels::reference_spmv`]) and an external
//! sparse-BLAS arm ([`kernels::SprsVendor`]) complete the comparison set;
//! the [`harness`] runs each arm, verifies it against the oracle, and times
//! it.
//!
//! ## Usage
//!
//! ```
//! use merge_spmm::{CooMatrix, CsrMatrix, DenseMatrix, Layout, SpmmConfig};
//! use merge_spmm::kernels::merge_path_spmm;
//!
//! let mut coo = CooMatrix::new(2, 2);
//! coo.push(0, 0, 1.0);
//! coo.push(0, 1, 2.0);
//! coo.push(1, 1, 3.0);
//! let a = CsrMatrix::from_coo(&coo).unwrap();
//!
//! let x = DenseMatrix::from_fn(2, 4, Layout::RowMajor, |row, _| (row + 1) as f64);
//! let mut y = DenseMatrix::zeros(2, 4, Layout::RowMajor);
//!
//! merge_path_spmm(&a, &x, &mut y, &SpmmConfig::with_threads(4)).unwrap();
//! assert_eq!(y.get(0, 0), 5.0);
//! assert_eq!(y.get(1, 3), 6.0);
//! ```

pub mod config;
pub mod dense;
pub mod error;
pub mod harness;
pub mod kernels;
pub mod matgen;
pub mod matrix;
pub mod partition;

// Re-export primary components
pub use config::SpmmConfig;
pub use dense::{DenseMatrix, Layout};
pub use error::{Result, SpmmError};
pub use harness::{
    default_timing_iterations, run_kernel, verify_against_reference, KernelOutcome, KernelReport,
    Verdict, DEFAULT_TOLERANCE,
};
pub use kernels::{
    check_dimensions, merge_path_spmm, nonzero_split_spmm, reference_spmv, row_split_spmm,
    CarryOut, DisabledVendor, MergePathKernel, NonzeroSplitKernel, RowSplitKernel, SpmmKernel,
    SprsVendor,
};
pub use matrix::{CooMatrix, CsrMatrix};
pub use partition::{
    merge_path_partition, merge_path_search, nonzero_split_partition, row_block_partition,
    row_position_search, MergeCoordinate, ThreadSegment,
};

/// Version information for the merge-spmm library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
