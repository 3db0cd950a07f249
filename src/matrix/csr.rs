//! Compressed Sparse Row (CSR) matrix format
//!
//! The CSR format stores a sparse matrix using three arrays:
//! - row_offsets: Array of size num_rows + 1 containing indices into the
//!   column_indices and values arrays
//! - column_indices: Array of size nnz containing column indices of non-zero elements
//! - values: Array of size nnz containing the non-zero values
//!
//! A `CsrMatrix` is built once from a coordinate list and never mutated
//! afterward; every kernel in this crate reads it through shared references.

use std::fmt;

use num_traits::Num;

use crate::error::{Result, SpmmError};
use crate::matrix::CooMatrix;

/// A sparse matrix in Compressed Sparse Row (CSR) format
///
/// Invariants, established at construction:
/// - `row_offsets.len() == num_rows + 1`, `row_offsets[0] == 0`, non-decreasing
/// - `row_offsets[num_rows] == values.len() == column_indices.len()`
/// - `column_indices[i] < num_cols`, sorted within each row
#[derive(Clone)]
pub struct CsrMatrix<T> {
    /// Number of rows in the matrix
    pub num_rows: usize,

    /// Number of columns in the matrix
    pub num_cols: usize,

    /// Row offsets (size: num_rows + 1)
    /// Row r's nonzeros occupy `column_indices[row_offsets[r]..row_offsets[r + 1]]`
    pub row_offsets: Vec<usize>,

    /// Column indices (size: nnz)
    pub column_indices: Vec<usize>,

    /// Non-zero values (size: nnz)
    pub values: Vec<T>,
}

impl<T> CsrMatrix<T>
where
    T: Copy + Num,
{
    /// Creates a CSR matrix from already-compressed arrays
    ///
    /// # Panics
    ///
    /// Panics if the input arrays are inconsistent:
    /// - row_offsets.len() must be num_rows + 1
    /// - column_indices.len() must equal values.len()
    /// - row_offsets[num_rows] must equal column_indices.len()
    pub fn new(
        num_rows: usize,
        num_cols: usize,
        row_offsets: Vec<usize>,
        column_indices: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        assert_eq!(
            row_offsets.len(),
            num_rows + 1,
            "row_offsets.len() must be num_rows + 1"
        );
        assert_eq!(
            column_indices.len(),
            values.len(),
            "column_indices.len() must equal values.len()"
        );
        assert_eq!(
            row_offsets[num_rows],
            column_indices.len(),
            "row_offsets[num_rows] must equal column_indices.len()"
        );

        for &col in &column_indices {
            assert!(
                col < num_cols,
                "Column index {} out of bounds (num_cols = {})",
                col,
                num_cols
            );
        }

        Self {
            num_rows,
            num_cols,
            row_offsets,
            column_indices,
            values,
        }
    }

    /// Builds a CSR matrix from an unordered coordinate list
    ///
    /// Two passes over the triples: the first counts nonzeros per row and
    /// turns the counts into `row_offsets` via a prefix sum, the second
    /// scatters (column, value) pairs through per-row write cursors derived
    /// from the same prefix sum. Each row is then sorted by column so the
    /// stored order is canonical regardless of input order.
    ///
    /// # Errors
    ///
    /// Returns [`SpmmError::MalformedInput`] for the first triple whose row
    /// or column index lies outside the declared dimensions.
    pub fn from_coo(coo: &CooMatrix<T>) -> Result<Self> {
        let num_rows = coo.num_rows;
        let num_cols = coo.num_cols;

        let mut row_counts = vec![0usize; num_rows];
        for &(row, col, _) in &coo.entries {
            if row >= num_rows || col >= num_cols {
                return Err(SpmmError::MalformedInput {
                    row,
                    col,
                    num_rows,
                    num_cols,
                });
            }
            row_counts[row] += 1;
        }

        // Prefix sum into row offsets
        let mut row_offsets = vec![0usize; num_rows + 1];
        let mut sum = 0;
        for (i, &count) in row_counts.iter().enumerate() {
            row_offsets[i] = sum;
            sum += count;
        }
        row_offsets[num_rows] = sum;

        // Scatter through per-row write cursors
        let nnz = coo.nnz();
        let mut column_indices = vec![0usize; nnz];
        let mut values = vec![T::zero(); nnz];
        let mut cursors = row_offsets.clone();

        for &(row, col, value) in &coo.entries {
            let pos = cursors[row];
            column_indices[pos] = col;
            values[pos] = value;
            cursors[row] += 1;
        }

        // Canonical within-row order (the sprs bridge requires it)
        let mut result = Self {
            num_rows,
            num_cols,
            row_offsets,
            column_indices,
            values,
        };
        result.sort_rows();
        Ok(result)
    }

    fn sort_rows(&mut self) {
        let mut scratch: Vec<(usize, T)> = Vec::new();
        for r in 0..self.num_rows {
            let start = self.row_offsets[r];
            let end = self.row_offsets[r + 1];
            let cols = &self.column_indices[start..end];
            if cols.windows(2).all(|w| w[0] <= w[1]) {
                continue;
            }

            scratch.clear();
            scratch.extend(
                cols.iter()
                    .zip(&self.values[start..end])
                    .map(|(&c, &v)| (c, v)),
            );
            scratch.sort_unstable_by_key(|&(c, _)| c);
            for (i, &(c, v)) in scratch.iter().enumerate() {
                self.column_indices[start + i] = c;
                self.values[start + i] = v;
            }
        }
    }

    /// Returns the number of non-zero elements in the matrix
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns the half-open nonzero range of row r
    pub fn row_range(&self, r: usize) -> std::ops::Range<usize> {
        self.row_offsets[r]..self.row_offsets[r + 1]
    }

    /// Returns an iterator over the non-zero elements in row r
    ///
    /// Each item is a tuple (column, value)
    pub fn row_iter(&self, r: usize) -> impl Iterator<Item = (usize, &T)> {
        assert!(r < self.num_rows, "Row index out of bounds");

        let range = self.row_range(r);
        self.column_indices[range.clone()]
            .iter()
            .zip(&self.values[range])
            .map(|(&col, val)| (col, val))
    }

    /// Returns the row end-offsets list, `&row_offsets[1..]`
    ///
    /// This is merge list A for the path searches: entry r is the position
    /// one past row r's last nonzero.
    pub fn row_end_offsets(&self) -> &[usize] {
        &self.row_offsets[1..]
    }

    /// Returns the smallest and largest per-row nonzero counts
    pub fn row_nnz_bounds(&self) -> (usize, usize) {
        if self.num_rows == 0 {
            return (0, 0);
        }
        let mut min = usize::MAX;
        let mut max = 0;
        for r in 0..self.num_rows {
            let len = self.row_offsets[r + 1] - self.row_offsets[r];
            min = min.min(len);
            max = max.max(len);
        }
        (min, max)
    }

    /// Creates an identity matrix of the given size
    pub fn identity(n: usize) -> Self {
        let row_offsets = (0..=n).collect();
        let column_indices = (0..n).collect();
        let values = vec![T::one(); n];

        Self {
            num_rows: n,
            num_cols: n,
            row_offsets,
            column_indices,
            values,
        }
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for CsrMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CsrMatrix {{")?;
        writeln!(f, "  dimensions: {} x {}", self.num_rows, self.num_cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;

        let max_rows_to_print = 5.min(self.num_rows);
        for r in 0..max_rows_to_print {
            write!(f, "  row {}: ", r)?;
            let range = self.row_range(r);
            if range.is_empty() {
                writeln!(f, "(empty)")?;
            } else {
                let shown = range.start..range.start + 5.min(range.len());
                for i in shown.clone() {
                    write!(f, "({}, {:?}) ", self.column_indices[i], self.values[i])?;
                }
                if range.len() > shown.len() {
                    write!(f, "... ({} more)", range.len() - shown.len())?;
                }
                writeln!(f)?;
            }
        }
        if self.num_rows > max_rows_to_print {
            writeln!(f, "  ... ({} more rows)", self.num_rows - max_rows_to_print)?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matrix() {
        let matrix = CsrMatrix::new(
            3,
            3,
            vec![0, 2, 3, 5],
            vec![0, 1, 1, 0, 2],
            vec![1, 2, 3, 4, 5],
        );

        assert_eq!(matrix.num_rows, 3);
        assert_eq!(matrix.num_cols, 3);
        assert_eq!(matrix.nnz(), 5);
        assert_eq!(matrix.row_end_offsets(), &[2, 3, 5]);
    }

    #[test]
    fn test_from_coo() {
        // Triples deliberately out of order, including within a row
        let mut coo = CooMatrix::new(3, 3);
        coo.push(2, 2, 5.0);
        coo.push(0, 1, 2.0);
        coo.push(2, 0, 4.0);
        coo.push(0, 0, 1.0);
        coo.push(1, 1, 3.0);

        let matrix = CsrMatrix::from_coo(&coo).unwrap();

        assert_eq!(matrix.row_offsets, vec![0, 2, 3, 5]);
        assert_eq!(matrix.column_indices, vec![0, 1, 1, 0, 2]);
        assert_eq!(matrix.values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_from_coo_empty_rows() {
        let mut coo = CooMatrix::new(4, 2);
        coo.push(3, 1, 7.0);

        let matrix = CsrMatrix::from_coo(&coo).unwrap();

        assert_eq!(matrix.row_offsets, vec![0, 0, 0, 0, 1]);
        assert_eq!(matrix.nnz(), 1);
        assert_eq!(matrix.row_nnz_bounds(), (0, 1));
    }

    #[test]
    fn test_from_coo_out_of_bounds() {
        let mut coo = CooMatrix::new(2, 2);
        coo.push(0, 0, 1.0);
        coo.push(1, 2, 1.0);

        match CsrMatrix::from_coo(&coo) {
            Err(SpmmError::MalformedInput { row, col, .. }) => {
                assert_eq!((row, col), (1, 2));
            }
            other => panic!("expected MalformedInput, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_row_iter() {
        let matrix = CsrMatrix::new(
            3,
            3,
            vec![0, 2, 3, 5],
            vec![0, 1, 1, 0, 2],
            vec![1, 2, 3, 4, 5],
        );

        let row0: Vec<_> = matrix.row_iter(0).collect();
        assert_eq!(row0, vec![(0, &1), (1, &2)]);

        let row2: Vec<_> = matrix.row_iter(2).collect();
        assert_eq!(row2, vec![(0, &4), (2, &5)]);
    }

    #[test]
    fn test_identity() {
        let identity = CsrMatrix::<i32>::identity(3);

        assert_eq!(identity.row_offsets, vec![0, 1, 2, 3]);
        assert_eq!(identity.column_indices, vec![0, 1, 2]);
        assert_eq!(identity.values, vec![1, 1, 1]);
    }

    #[test]
    #[should_panic(expected = "row_offsets.len() must be num_rows + 1")]
    fn test_invalid_row_offsets() {
        CsrMatrix::new(
            3,
            3,
            vec![0, 2, 3], // Missing last element
            vec![0, 1, 1, 0, 2],
            vec![1, 2, 3, 4, 5],
        );
    }
}
