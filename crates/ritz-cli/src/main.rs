//! Ritz command-line interface.

mod mtx;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ritz_backend_cpu::CsrOperator;
use ritz_solver::{
    LinearOperator, PowerMethodConfig, PowerMethodResult, ShiftedOperator, StartVector,
    solve_power_method,
};

#[derive(Parser)]
#[command(name = "ritz")]
#[command(about = "Dominant eigenpair estimation by power iteration", long_about = None)]
#[command(version)]
struct Cli {
    /// Input matrix in Matrix Market coordinate format
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Maximum number of power iterations
    #[arg(short = 'n', long, default_value_t = 1000)]
    max_iterations: usize,

    /// Convergence tolerance on the Ritz residual norm
    #[arg(short, long, default_value_t = 1e-8)]
    tol: f64,

    /// Seed for the random starting vector (entropy-seeded if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run on A + SHIFT * I and report the unshifted eigenvalue
    #[arg(long, value_name = "SHIFT", allow_hyphen_values = true)]
    shift: Option<f64>,

    /// Print the eigenvector
    #[arg(long)]
    print_vector: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Solve and report. Returns whether the solver converged.
fn run(cli: &Cli) -> Result<bool> {
    let op = mtx::read_matrix_market_file(&cli.input)?;
    if cli.verbose {
        println!(
            "Matrix: {} ({}x{}, {} stored entries)",
            cli.input.display(),
            op.dim(),
            op.dim(),
            op.nnz()
        );
        if !op.is_symmetric(0.0) {
            println!("Warning: matrix is not symmetric; convergence is not guaranteed");
        }
    }

    let config = PowerMethodConfig::default()
        .with_max_iterations(cli.max_iterations)
        .with_tol(cli.tol);
    let start = match cli.seed {
        Some(seed) => StartVector::Seeded(seed),
        None => StartVector::Random,
    };

    let (result, eigenvalue) = solve(&op, cli.shift, start, &config)
        .with_context(|| format!("power method failed on {}", cli.input.display()))?;

    println!("Eigenvalue: {:.12e}", eigenvalue);
    if let Some(shift) = cli.shift {
        println!("Shifted eigenvalue: {:.12e} (shift {})", result.eigenvalue, shift);
    }
    println!("Iterations: {}", result.iterations);
    println!("Residual: {:.3e}", result.residual);
    println!(
        "Status: {}",
        if result.converged {
            "converged"
        } else {
            "not converged"
        }
    );

    if cli.print_vector {
        println!();
        println!("Eigenvector:");
        for (i, v) in result.eigenvector.iter().enumerate() {
            println!("  {:>6}  {:>20.12e}", i + 1, v);
        }
    }

    Ok(result.converged)
}

/// Run the power method, optionally on a shifted operator.
///
/// Returns the raw result together with the eigenvalue of the unshifted matrix.
fn solve(
    op: &CsrOperator,
    shift: Option<f64>,
    start: StartVector,
    config: &PowerMethodConfig,
) -> Result<(PowerMethodResult, f64)> {
    match shift {
        Some(sigma) => {
            let shifted = ShiftedOperator::new(op, sigma);
            let result = solve_power_method(&shifted, start, config)?;
            let eigenvalue = shifted.unshift(result.eigenvalue);
            Ok((result, eigenvalue))
        }
        None => {
            let result = solve_power_method(op, start, config)?;
            let eigenvalue = result.eigenvalue;
            Ok((result, eigenvalue))
        }
    }
}
