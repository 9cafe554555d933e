//! Cgp CLI - Command-line interface for building and fitting expressions.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// Cgp - Cartesian genetic programming expressions
#[derive(Parser, Debug)]
#[command(name = "cgp")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Construct an expression and print its equations
    Show {
        /// Number of program inputs
        #[arg(short, long, default_value = "2")]
        inputs: u32,

        /// Number of program outputs
        #[arg(short, long, default_value = "1")]
        outputs: u32,

        /// Grid rows
        #[arg(short, long, default_value = "1")]
        rows: u32,

        /// Grid columns
        #[arg(short, long, default_value = "10")]
        columns: u32,

        /// Levels-back constraint (default: columns)
        #[arg(short, long)]
        levels_back: Option<u32>,

        /// Connections per node
        #[arg(short, long, default_value = "2")]
        arity: u32,

        /// Kernel names, in order
        #[arg(short, long, num_args = 1.., default_values_t = [
            "sum".to_string(), "diff".to_string(), "mul".to_string(), "div".to_string(),
        ])]
        kernels: Vec<String>,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Chromosome to load, as a JSON array of genes
        #[arg(long)]
        chromosome: Option<String>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Fit an expression to a JSON dataset
    Fit {
        /// Dataset file with "inputs" and "labels" matrices
        data: std::path::PathBuf,

        /// Grid columns
        #[arg(short, long, default_value = "20")]
        columns: u32,

        /// Connections per node
        #[arg(short, long, default_value = "2")]
        arity: u32,

        /// Kernel names, in order
        #[arg(short, long, num_args = 1.., default_values_t = [
            "sum".to_string(), "diff".to_string(), "mul".to_string(), "div".to_string(),
        ])]
        kernels: Vec<String>,

        /// Ephemeral constants used as extra inputs
        #[arg(long, num_args = 0..)]
        constants: Vec<f64>,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Hill-climb generations
        #[arg(short, long, default_value = "500")]
        generations: u32,

        /// Gradient-descent steps over the constants
        #[arg(short, long, default_value = "100")]
        descent_steps: u32,

        /// Save the fitted expression to this file
        #[arg(long)]
        save: Option<std::path::PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Commands::Show {
            inputs,
            outputs,
            rows,
            columns,
            levels_back,
            arity,
            kernels,
            seed,
            chromosome,
            format,
        } => cli::show::execute(
            inputs,
            outputs,
            rows,
            columns,
            levels_back.unwrap_or(columns),
            arity,
            &kernels,
            seed,
            chromosome.as_deref(),
            format,
        ),
        Commands::Fit {
            data,
            columns,
            arity,
            kernels,
            constants,
            seed,
            generations,
            descent_steps,
            save,
            format,
        } => cli::fit::execute(
            &data,
            columns,
            arity,
            &kernels,
            &constants,
            seed,
            generations,
            descent_steps,
            save.as_deref(),
            format,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
