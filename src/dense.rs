//! Dense operand and result buffers
//!
//! `X` (num_cols x num_vectors) and `Y` (num_rows x num_vectors) live in
//! flat, cache-line-aligned storage. Either buffer may be row-major (vector
//! index varies fastest) or column-major, chosen independently; the kernels
//! consume X in row-major order and materialize a scratch copy when handed
//! the other layout.

use aligned_vec::AVec;
use num_traits::Num;

/// Alignment for dense buffers (AVec provides the aligned allocation)
const BUFFER_ALIGN: usize = 64;

/// Element order of a dense buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The vector index varies fastest: element (r, c) lives at `r * num_cols + c`
    RowMajor,
    /// The row index varies fastest: element (r, c) lives at `c * num_rows + r`
    ColMajor,
}

impl Layout {
    /// Flat index of element (row, col) in a num_rows x num_cols buffer
    #[inline]
    pub fn index(self, row: usize, col: usize, num_rows: usize, num_cols: usize) -> usize {
        match self {
            Layout::RowMajor => row * num_cols + col,
            Layout::ColMajor => col * num_rows + row,
        }
    }

    /// Base index and stride for walking one logical row
    ///
    /// Row r's elements are `base, base + stride, base + 2*stride, ..`, one
    /// per vector column. This keeps the kernels' per-row write loops free of
    /// layout branches.
    #[inline]
    pub fn row_span(self, row: usize, num_rows: usize, num_cols: usize) -> (usize, usize) {
        match self {
            Layout::RowMajor => (row * num_cols, 1),
            Layout::ColMajor => (row, num_rows),
        }
    }
}

/// A dense matrix in a flat, page-aligned buffer
#[derive(Debug, Clone)]
pub struct DenseMatrix<T> {
    num_rows: usize,
    num_cols: usize,
    layout: Layout,
    data: AVec<T>,
}

impl<T> DenseMatrix<T> {
    /// Number of logical rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of logical columns (the vector count for X and Y)
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Element order of the flat buffer
    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl<T> DenseMatrix<T>
where
    T: Copy + Num,
{
    /// Creates a zero-filled buffer
    pub fn zeros(num_rows: usize, num_cols: usize, layout: Layout) -> Self {
        Self {
            num_rows,
            num_cols,
            layout,
            data: AVec::from_iter(BUFFER_ALIGN, (0..num_rows * num_cols).map(|_| T::zero())),
        }
    }

    /// Creates a buffer where element (r, c) is `f(r, c)`
    pub fn from_fn(
        num_rows: usize,
        num_cols: usize,
        layout: Layout,
        f: impl Fn(usize, usize) -> T,
    ) -> Self {
        let mut out = Self::zeros(num_rows, num_cols, layout);
        for r in 0..num_rows {
            for c in 0..num_cols {
                out.set(r, c, f(r, c));
            }
        }
        out
    }

    /// Element at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.layout.index(row, col, self.num_rows, self.num_cols)]
    }

    /// Stores `value` at (row, col)
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let idx = self.layout.index(row, col, self.num_rows, self.num_cols);
        self.data[idx] = value;
    }

    /// Overwrites every element with `value`
    pub fn fill(&mut self, value: T) {
        for slot in self.data.iter_mut() {
            *slot = value;
        }
    }

    /// The flat buffer in this matrix's layout
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The flat buffer in this matrix's layout, mutable
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Copies this buffer into the requested layout
    ///
    /// Used as the once-per-invocation scratch prepass when a kernel needs
    /// row-major X but was handed a column-major buffer.
    pub fn to_layout(&self, layout: Layout) -> Self {
        if layout == self.layout {
            return self.clone();
        }
        Self::from_fn(self.num_rows, self.num_cols, layout, |r, c| self.get(r, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_index() {
        assert_eq!(Layout::RowMajor.index(1, 2, 3, 4), 6);
        assert_eq!(Layout::ColMajor.index(1, 2, 3, 4), 7);
    }

    #[test]
    fn test_row_span_matches_index() {
        for layout in [Layout::RowMajor, Layout::ColMajor] {
            let (base, stride) = layout.row_span(2, 5, 3);
            for c in 0..3 {
                assert_eq!(base + c * stride, layout.index(2, c, 5, 3));
            }
        }
    }

    #[test]
    fn test_get_set_round_trip() {
        for layout in [Layout::RowMajor, Layout::ColMajor] {
            let m = DenseMatrix::from_fn(3, 2, layout, |r, c| (r * 10 + c) as f64);
            assert_eq!(m.get(0, 0), 0.0);
            assert_eq!(m.get(2, 1), 21.0);
        }
    }

    #[test]
    fn test_to_layout_preserves_elements() {
        let rm = DenseMatrix::from_fn(4, 3, Layout::RowMajor, |r, c| (r * 3 + c) as f32);
        let cm = rm.to_layout(Layout::ColMajor);

        assert_eq!(cm.layout(), Layout::ColMajor);
        for r in 0..4 {
            for c in 0..3 {
                assert_eq!(cm.get(r, c), rm.get(r, c));
            }
        }
        // Flat order actually changed
        assert_ne!(rm.as_slice(), cm.as_slice());
    }
}
