//! Matrix sources for the driver and benches
//!
//! Synthetic graph generators and a minimal Matrix Market reader, all
//! producing transient [`CooMatrix`] values for CSR construction. These are
//! collaborators of the benchmark core, not part of it: the kernels never
//! see anything but the finished CSR store.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use num_traits::Num;

use crate::error::{Result, SpmmError};
use crate::matrix::CooMatrix;

/// Adjacency of a width x width 2D lattice (5-point stencil, no self loops)
pub fn grid2d<T: Num + Copy>(width: usize) -> CooMatrix<T> {
    let n = width * width;
    let mut coo = CooMatrix::with_capacity(n, n, 4 * n);

    for i in 0..width {
        for j in 0..width {
            let node = i * width + j;
            if i > 0 {
                coo.push(node, node - width, T::one());
            }
            if i + 1 < width {
                coo.push(node, node + width, T::one());
            }
            if j > 0 {
                coo.push(node, node - 1, T::one());
            }
            if j + 1 < width {
                coo.push(node, node + 1, T::one());
            }
        }
    }
    coo
}

/// Adjacency of a width^3 3D lattice (7-point stencil, no self loops)
pub fn grid3d<T: Num + Copy>(width: usize) -> CooMatrix<T> {
    let n = width * width * width;
    let mut coo = CooMatrix::with_capacity(n, n, 6 * n);

    for i in 0..width {
        for j in 0..width {
            for k in 0..width {
                let node = (i * width + j) * width + k;
                if i > 0 {
                    coo.push(node, node - width * width, T::one());
                }
                if i + 1 < width {
                    coo.push(node, node + width * width, T::one());
                }
                if j > 0 {
                    coo.push(node, node - width, T::one());
                }
                if j + 1 < width {
                    coo.push(node, node + width, T::one());
                }
                if k > 0 {
                    coo.push(node, node - 1, T::one());
                }
                if k + 1 < width {
                    coo.push(node, node + 1, T::one());
                }
            }
        }
    }
    coo
}

/// Wheel graph: hub row 0 points at every rim node, each rim node points
/// back at the hub
///
/// The hub row holds half of all nonzeros while every other row holds one —
/// the skew that collapses row-split partitioning.
pub fn wheel<T: Num + Copy>(spokes: usize) -> CooMatrix<T> {
    let n = spokes + 1;
    let mut coo = CooMatrix::with_capacity(n, n, 2 * spokes);

    for rim in 1..=spokes {
        coo.push(0, rim, T::one());
    }
    for rim in 1..=spokes {
        coo.push(rim, 0, T::one());
    }
    coo
}

/// Fully dense rows x cols block
pub fn dense<T: Num + Copy>(rows: usize, cols: usize) -> CooMatrix<T> {
    let mut coo = CooMatrix::with_capacity(rows, cols, rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            coo.push(r, c, T::one());
        }
    }
    coo
}

/// Reads a coordinate-format Matrix Market file
///
/// Comment lines (leading `%`) are skipped, the size line gives
/// `rows cols nnz`, and entries are 1-indexed; pattern entries (no value
/// field) get unit values. Symmetric storage is not expanded.
pub fn read_matrix_market<P: AsRef<Path>>(path: P) -> Result<CooMatrix<f64>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    // Skip comments and read the size line
    let mut size_line = String::new();
    for line in lines.by_ref() {
        let line = line?;
        if !line.starts_with('%') && !line.trim().is_empty() {
            size_line = line;
            break;
        }
    }

    let parts: Vec<&str> = size_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(SpmmError::Parse(format!(
            "invalid size line: {:?}",
            size_line
        )));
    }
    let num_rows: usize = parts[0]
        .parse()
        .map_err(|_| SpmmError::Parse("invalid row count".to_string()))?;
    let num_cols: usize = parts[1]
        .parse()
        .map_err(|_| SpmmError::Parse("invalid column count".to_string()))?;
    let nnz: usize = parts[2]
        .parse()
        .map_err(|_| SpmmError::Parse("invalid nonzero count".to_string()))?;

    let mut coo = CooMatrix::with_capacity(num_rows, num_cols, nnz);
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let row: usize = parts[0]
            .parse::<usize>()
            .map_err(|_| SpmmError::Parse(format!("invalid row index: {}", parts[0])))?
            .saturating_sub(1); // 1-indexed to 0-indexed
        let col: usize = parts[1]
            .parse::<usize>()
            .map_err(|_| SpmmError::Parse(format!("invalid column index: {}", parts[1])))?
            .saturating_sub(1);
        let value: f64 = if parts.len() >= 3 {
            parts[2]
                .parse()
                .map_err(|_| SpmmError::Parse(format!("invalid value: {}", parts[2])))?
        } else {
            1.0 // Pattern matrix
        };

        coo.push(row, col, value);
    }

    Ok(coo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;
    use std::io::Write;

    #[test]
    fn test_grid2d_degrees() {
        let coo = grid2d::<f64>(3);
        let csr = CsrMatrix::from_coo(&coo).unwrap();

        assert_eq!(csr.num_rows, 9);
        // Corner, edge and center nodes of a 3x3 lattice
        assert_eq!(csr.row_range(0).len(), 2);
        assert_eq!(csr.row_range(1).len(), 3);
        assert_eq!(csr.row_range(4).len(), 4);
        assert_eq!(csr.nnz(), 24);
    }

    #[test]
    fn test_grid3d_center_degree() {
        let coo = grid3d::<f64>(3);
        let csr = CsrMatrix::from_coo(&coo).unwrap();

        assert_eq!(csr.num_rows, 27);
        // Center node (1,1,1) touches all six neighbors
        assert_eq!(csr.row_range(13).len(), 6);
    }

    #[test]
    fn test_wheel_hub_skew() {
        let coo = wheel::<f64>(10);
        let csr = CsrMatrix::from_coo(&coo).unwrap();

        assert_eq!(csr.num_rows, 11);
        assert_eq!(csr.nnz(), 20);
        let (min, max) = csr.row_nnz_bounds();
        assert_eq!((min, max), (1, 10));
    }

    #[test]
    fn test_dense_block() {
        let coo = dense::<f32>(4, 6);
        assert_eq!(coo.nnz(), 24);
        let csr = CsrMatrix::from_coo(&coo).unwrap();
        assert_eq!(csr.row_nnz_bounds(), (6, 6));
    }

    #[test]
    fn test_read_matrix_market() {
        let path = std::env::temp_dir().join("merge_spmm_matgen_test.mtx");
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "%%MatrixMarket matrix coordinate real general").unwrap();
            writeln!(file, "% comment").unwrap();
            writeln!(file, "2 3 3").unwrap();
            writeln!(file, "1 1 1.5").unwrap();
            writeln!(file, "2 3 -2.0").unwrap();
            writeln!(file, "2 1 4.0").unwrap();
        }

        let coo = read_matrix_market(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((coo.num_rows, coo.num_cols), (2, 3));
        assert_eq!(coo.nnz(), 3);
        assert_eq!(coo.entries[0], (0, 0, 1.5));
        assert_eq!(coo.entries[1], (1, 2, -2.0));
    }

    #[test]
    fn test_read_matrix_market_bad_header() {
        let path = std::env::temp_dir().join("merge_spmm_matgen_bad.mtx");
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "2 3").unwrap();
        }

        let result = read_matrix_market(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(SpmmError::Parse(_))));
    }
}
