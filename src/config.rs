//! Kernel invocation configuration
//!
//! Every kernel call receives an explicit `SpmmConfig` value; there is no
//! ambient process state controlling thread count or buffer layout.

use crate::dense::Layout;

/// Configuration for one SpMM kernel invocation
#[derive(Debug, Clone)]
pub struct SpmmConfig {
    /// Size of the logical thread team. The static partition is computed for
    /// exactly this many segments, which is what makes results deterministic
    /// for a fixed (num_rows, num_nonzeros, num_threads).
    pub num_threads: usize,

    /// Layout the X operand buffer is declared in
    pub input_layout: Layout,

    /// Layout the Y result buffer is declared in
    pub output_layout: Layout,
}

impl Default for SpmmConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(), // Use all available cores
            input_layout: Layout::RowMajor,
            output_layout: Layout::RowMajor,
        }
    }
}

impl SpmmConfig {
    /// Config with an explicit team size and default row-major layouts
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: num_threads.max(1),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_available_cores() {
        let config = SpmmConfig::default();
        assert!(config.num_threads >= 1);
        assert_eq!(config.input_layout, Layout::RowMajor);
    }

    #[test]
    fn test_with_threads_clamps_zero() {
        assert_eq!(SpmmConfig::with_threads(0).num_threads, 1);
        assert_eq!(SpmmConfig::with_threads(17).num_threads, 17);
    }
}
