//! Benchmark runner: times two multiplication methods on the same operands.

use std::fmt;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use matmul::{Engine, EngineConfig, Fill, Grid, Matrix, Variant};

#[derive(Parser, Debug)]
#[command(name = "matmul", version, about = "Compare two matrix multiplication methods")]
struct Cli {
    /// First method to run
    #[arg(long, value_enum, env = "MATMUL_FIRST", default_value_t = Method::Classic)]
    first: Method,

    /// Second method to run
    #[arg(long, value_enum, env = "MATMUL_SECOND", default_value_t = Method::ClassicParallel)]
    second: Method,

    #[arg(long, env = "MATMUL_M1_ROWS", default_value_t = 512)]
    m1_rows: usize,

    #[arg(long, env = "MATMUL_M1_COLS", default_value_t = 512)]
    m1_cols: usize,

    #[arg(long, env = "MATMUL_M2_ROWS", default_value_t = 512)]
    m2_rows: usize,

    #[arg(long, env = "MATMUL_M2_COLS", default_value_t = 512)]
    m2_cols: usize,

    /// Fill every element of m1 with this value (default: 0, 1, 2, ...)
    #[arg(long, env = "MATMUL_M1_FILL")]
    m1_fill: Option<f32>,

    /// Fill every element of m2 with this value (default: 0, 1, 2, ...)
    #[arg(long, env = "MATMUL_M2_FILL")]
    m2_fill: Option<f32>,

    /// Units each parallel product is split into (even, >= 2)
    #[arg(long, env = "MATMUL_TASKS", default_value_t = 8)]
    tasks: usize,

    /// Worker threads for the parallel methods (default: one per CPU)
    #[arg(long, env = "MATMUL_THREADS")]
    threads: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Double index, single thread
    Grid,
    /// Double index, multithread
    GridParallel,
    /// Linear classic, single thread
    Classic,
    /// Linear classic, multithread
    ClassicParallel,
    /// Linear transposed, single thread
    Transposed,
    /// Linear transposed, multithread
    TransposedParallel,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Grid => "Double Index [Single Thread]",
            Method::GridParallel => "Double Index [Multithread]",
            Method::Classic => "Linear Classic [Single Thread]",
            Method::ClassicParallel => "Linear Classic [Multithread]",
            Method::Transposed => "Linear Transposed [Single Thread]",
            Method::TransposedParallel => "Linear Transposed [Multithread]",
        };
        f.write_str(name)
    }
}

/// Operands prepared once, before any timing starts.
struct Operands {
    m1: Matrix,
    m2: Matrix,
    m2t: Matrix,
    m1_grid: Grid,
    m2_grid: Grid,
}

impl Operands {
    fn build(cli: &Cli) -> anyhow::Result<Self> {
        let m1_fill = Fill::from_option(cli.m1_fill);
        let m2_fill = Fill::from_option(cli.m2_fill);

        let m1 = Matrix::try_new(cli.m1_rows, cli.m1_cols, m1_fill).context("building m1")?;
        let m2 = Matrix::try_new(cli.m2_rows, cli.m2_cols, m2_fill).context("building m2")?;
        let m2t = m2.transpose();

        Ok(Self {
            m1,
            m2,
            m2t,
            m1_grid: Grid::new(cli.m1_rows, cli.m1_cols, m1_fill),
            m2_grid: Grid::new(cli.m2_rows, cli.m2_cols, m2_fill),
        })
    }
}

/// Result of one method, in whichever layout it produced.
enum Product {
    Linear(Matrix),
    Grid(Grid),
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::Linear(m) => fmt::Display::fmt(m, f),
            Product::Grid(g) => fmt::Display::fmt(g, f),
        }
    }
}

/// Run `method` once and return its product and elapsed milliseconds.
fn run(method: Method, ops: &Operands, engine: &Engine) -> (Product, f64) {
    let start = Instant::now();

    let product = match method {
        Method::Grid => Product::Grid(ops.m1_grid.multiply(&ops.m2_grid)),
        Method::GridParallel => Product::Grid(
            ops.m1_grid
                .try_multiply_with(engine, &ops.m2_grid)
                .unwrap_or_else(|e| {
                    log::warn!("{e}");
                    Grid::new(ops.m1_grid.rows(), ops.m2_grid.cols(), Fill::Zero)
                }),
        ),
        Method::Classic => Product::Linear(matmul::multiply_classic(&ops.m1, &ops.m2)),
        Method::ClassicParallel => {
            Product::Linear(engine.multiply(&ops.m1, &ops.m2, Variant::Classic))
        }
        Method::Transposed => Product::Linear(matmul::multiply_transposed(&ops.m1, &ops.m2t)),
        Method::TransposedParallel => {
            Product::Linear(engine.multiply(&ops.m1, &ops.m2t, Variant::Transposed))
        }
    };

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    (product, elapsed_ms)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.first == cli.second {
        bail!("Selected methods are the same! Please choose different methods.");
    }

    let engine = Engine::new(EngineConfig {
        threads: cli.threads,
        task_count: cli.tasks,
    })
    .context("configuring the parallel engine")?;

    log::info!(
        "m1 {}x{}, m2 {}x{}, {} tasks on {} threads",
        cli.m1_rows,
        cli.m1_cols,
        cli.m2_rows,
        cli.m2_cols,
        engine.task_count(),
        engine.num_threads()
    );

    let ops = Operands::build(&cli)?;
    let methods = [cli.first, cli.second];
    let mut times = [0.0f64; 2];

    for (i, &method) in methods.iter().enumerate() {
        println!("---------- {} ----------\n", method);
        println!("Calculating...\n");

        let (product, elapsed_ms) = run(method, &ops, &engine);
        times[i] = elapsed_ms;

        println!("{}", product);
        println!("Time: {:.3} ms\n", elapsed_ms);
        println!("{}\n", "-".repeat(52));
    }

    match speedup(times) {
        Some((fast, ratio)) => println!(
            "{} was {:.2}x faster than {}!",
            methods[fast],
            ratio,
            methods[1 - fast]
        ),
        None => println!(
            "{} and {} both finished below the timer resolution.",
            methods[0], methods[1]
        ),
    }

    Ok(())
}

/// Index of the faster of two timings and how many times faster it was.
///
/// `None` when the faster one measured zero, as no ratio is meaningful then.
fn speedup(times: [f64; 2]) -> Option<(usize, f64)> {
    let fast = if times[0] > times[1] { 1 } else { 0 };
    let (fast_ms, slow_ms) = (times[fast], times[1 - fast]);
    if fast_ms <= 0.0 {
        return None;
    }
    Some((fast, slow_ms / fast_ms))
}
