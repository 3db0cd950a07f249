//! SpMM comparison driver
//!
//! Builds a CSR matrix from a Matrix Market file or a synthetic generator,
//! computes the reference answer once, then runs and times each kernel arm.

use std::fmt;
use std::ops::AddAssign;
use std::process;

use num_traits::Float;

use merge_spmm::kernels::{MergePathKernel, NonzeroSplitKernel, RowSplitKernel, SprsVendor};
use merge_spmm::{
    default_timing_iterations, matgen, reference_spmv, run_kernel, CooMatrix, CsrMatrix,
    DenseMatrix, Layout, Result, SpmmConfig, SpmmKernel,
};

#[derive(Debug, Clone)]
struct DriverOptions {
    mtx: Option<String>,
    grid2d: Option<usize>,
    grid3d: Option<usize>,
    wheel: Option<usize>,
    dense: Option<usize>,
    threads: Option<usize>,
    num_vectors: usize,
    timing_iterations: Option<usize>,
    alpha: f64,
    beta: f64,
    fp32: bool,
    quiet: bool,
    col_major_x: bool,
    col_major_y: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            mtx: None,
            grid2d: None,
            grid3d: None,
            wheel: None,
            dense: None,
            threads: None,
            num_vectors: 32,
            timing_iterations: None,
            alpha: 1.0,
            beta: 0.0,
            fp32: false,
            quiet: false,
            col_major_x: false,
            col_major_y: false,
        }
    }
}

fn usage(program: &str) {
    println!(
        "{} \
         [--quiet] \
         [--threads=<thread count>] \
         [--i=<timing iterations>] \
         [--fp64 (default) | --fp32] \
         [--alpha=<alpha scalar (default: 1.0)>] \
         [--beta=<beta scalar (default: 0.0)>] \
         [--num-vectors=<dense vector columns (default: 32)>] \
         [--col-major-x] [--col-major-y]\n\
         \t--mtx=<matrix market file>\n\
         \t--dense=<cols>\n\
         \t--grid2d=<width>\n\
         \t--grid3d=<width>\n\
         \t--wheel=<spokes>",
        program
    );
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("invalid value for {}: {:?}", key, value);
        process::exit(1);
    })
}

fn parse_args() -> DriverOptions {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "merge-spmm".to_string());
    let mut opts = DriverOptions::default();

    for arg in args {
        if let Some((key, value)) = arg.split_once('=') {
            match key {
                "--mtx" => opts.mtx = Some(value.to_string()),
                "--grid2d" => opts.grid2d = Some(parse_value(key, value)),
                "--grid3d" => opts.grid3d = Some(parse_value(key, value)),
                "--wheel" => opts.wheel = Some(parse_value(key, value)),
                "--dense" => opts.dense = Some(parse_value(key, value)),
                "--threads" => opts.threads = Some(parse_value(key, value)),
                "--num-vectors" => opts.num_vectors = parse_value(key, value),
                "--i" => opts.timing_iterations = Some(parse_value(key, value)),
                "--alpha" => opts.alpha = parse_value(key, value),
                "--beta" => opts.beta = parse_value(key, value),
                _ => {
                    eprintln!("unrecognized option: {}", arg);
                    usage(&program);
                    process::exit(1);
                }
            }
        } else {
            match arg.as_str() {
                "--fp32" => opts.fp32 = true,
                "--fp64" => opts.fp32 = false,
                "--quiet" => opts.quiet = true,
                "--col-major-x" => opts.col_major_x = true,
                "--col-major-y" => opts.col_major_y = true,
                "--help" => {
                    usage(&program);
                    process::exit(0);
                }
                _ => {
                    eprintln!("unrecognized option: {}", arg);
                    usage(&program);
                    process::exit(1);
                }
            }
        }
    }

    opts
}

/// Builds the requested matrix source as f64 triples plus a display name
fn build_coo(opts: &DriverOptions) -> Result<(String, CooMatrix<f64>)> {
    if let Some(path) = &opts.mtx {
        let coo = matgen::read_matrix_market(path)?;
        if coo.num_rows == 1 || coo.num_cols == 1 || coo.nnz() == 1 {
            println!("Trivial dataset");
            process::exit(0);
        }
        Ok((path.clone(), coo))
    } else if let Some(width) = opts.grid2d {
        Ok((format!("grid2d_{}", width), matgen::grid2d(width)))
    } else if let Some(width) = opts.grid3d {
        Ok((format!("grid3d_{}", width), matgen::grid3d(width)))
    } else if let Some(spokes) = opts.wheel {
        Ok((format!("wheel_{}", spokes), matgen::wheel(spokes)))
    } else if let Some(cols) = opts.dense {
        // Aim for ~16M nonzeros total
        let rows = ((1usize << 24) / cols.max(1)).max(1);
        Ok((format!("dense_{}_x_{}", rows, cols), matgen::dense(rows, cols)))
    } else {
        eprintln!("No matrix source specified.");
        process::exit(1);
    }
}

fn run<T>(opts: &DriverOptions, vendor: &dyn SpmmKernel<T>) -> Result<()>
where
    T: Float + AddAssign + Send + Sync + fmt::Display + fmt::Debug,
{
    let (name, coo_f64) = build_coo(opts)?;

    // Convert triples to the requested precision
    let mut coo = CooMatrix::with_capacity(coo_f64.num_rows, coo_f64.num_cols, coo_f64.nnz());
    for &(row, col, value) in &coo_f64.entries {
        coo.push(row, col, T::from(value).unwrap());
    }
    drop(coo_f64);

    let a = CsrMatrix::from_coo(&coo)?;
    drop(coo);

    println!("{}, {} x {}, {} nonzeros", name, a.num_rows, a.num_cols, a.nnz());
    if !opts.quiet {
        println!("{:?}", a);
        let (min, max) = a.row_nnz_bounds();
        println!("row nnz: min {}, max {}", min, max);
    }

    let num_vectors = opts.num_vectors.max(1);
    let timing_iterations = opts
        .timing_iterations
        .unwrap_or_else(|| default_timing_iterations(a.nnz(), num_vectors));
    if !opts.quiet {
        println!("\t{} timing iterations", timing_iterations);
    }

    let config = SpmmConfig {
        num_threads: opts.threads.unwrap_or_else(num_cpus::get).max(1),
        input_layout: if opts.col_major_x {
            Layout::ColMajor
        } else {
            Layout::RowMajor
        },
        output_layout: if opts.col_major_y {
            Layout::ColMajor
        } else {
            Layout::RowMajor
        },
    };
    if !opts.quiet {
        println!(
            "\tUsing {} threads on {} procs",
            config.num_threads,
            num_cpus::get()
        );
    }

    // Every vector column of X carries the same data, so the single-vector
    // oracle stands in for all columns during verification
    let x_value = |row: usize| T::from(1.0 + (row % 8) as f64 * 0.25).unwrap();
    let x = DenseMatrix::from_fn(a.num_cols, num_vectors, config.input_layout, |row, _| {
        x_value(row)
    });
    let mut y = DenseMatrix::zeros(a.num_rows, num_vectors, config.output_layout);

    let x_oracle: Vec<T> = (0..a.num_cols).map(x_value).collect();
    let y_in = vec![T::one(); a.num_rows];
    let alpha = T::from(opts.alpha).unwrap();
    let beta = T::from(opts.beta).unwrap();
    let reference = reference_spmv(&a, &x_oracle, &y_in, alpha, beta);

    let tolerance = T::from(merge_spmm::DEFAULT_TOLERANCE).unwrap();
    let arms: [&dyn SpmmKernel<T>; 4] = [
        &RowSplitKernel,
        &MergePathKernel,
        &NonzeroSplitKernel,
        vendor,
    ];
    for kernel in arms {
        let report = run_kernel(
            kernel,
            &a,
            &x,
            &mut y,
            &reference,
            &config,
            timing_iterations,
            tolerance,
        )?;
        report.print(opts.quiet);
    }

    Ok(())
}

fn main() {
    let opts = parse_args();

    let outcome = if opts.fp32 {
        run::<f32>(&opts, &SprsVendor)
    } else {
        run::<f64>(&opts, &SprsVendor)
    };

    if let Err(err) = outcome {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
