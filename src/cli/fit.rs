//! Fit command implementation.
//!
//! Symbolic regression: a hill climb finds a program shape, then gradient
//! descent tunes the ephemeral constants against the same dataset.

use super::{CliError, OutputFormat};
use cgp::algorithms::{ClimbConfig, gradient_descent, hill_climb};
use cgp::expression::save_expression;
use cgp::{Expression, KernelSet};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Generations run per progress tick.
const CHUNK_GENERATIONS: u32 = 10;

/// On-disk dataset: variable-major input and label matrices.
#[derive(Debug, Deserialize)]
struct Dataset {
    /// One row per input variable, one column per point.
    inputs: Vec<Vec<f64>>,
    /// One row per output, one column per point.
    labels: Vec<Vec<f64>>,
}

/// JSON payload for the fit command.
#[derive(Debug, Serialize)]
struct FitReport {
    equations: Vec<String>,
    chromosome: Vec<u32>,
    constants: Vec<f64>,
    loss: f64,
}

/// Execute the fit command.
///
/// # Errors
///
/// Returns an error if the dataset cannot be read or does not fit the
/// requested expression structure.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    data: &Path,
    columns: u32,
    arity: u32,
    kernels: &[String],
    constants: &[f64],
    seed: u64,
    generations: u32,
    descent_steps: u32,
    save: Option<&Path>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let raw = fs::read_to_string(data)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", data.display())))?;
    let dataset: Dataset = serde_json::from_str(&raw)?;

    if dataset.inputs.is_empty() || dataset.labels.is_empty() {
        return Err(CliError::new("dataset needs at least one input and label row"));
    }

    let inputs = u32::try_from(dataset.inputs.len() + constants.len())
        .map_err(|_| CliError::new("dataset has too many input rows"))?;
    let outputs = u32::try_from(dataset.labels.len())
        .map_err(|_| CliError::new("dataset has too many label rows"))?;

    let kernel_set = KernelSet::new(kernels)?;
    let mut expression =
        Expression::new(inputs, outputs, 1, columns, columns, arity, kernel_set, seed)?;

    // Hill climb in chunks so the progress bar ticks.
    let bar = ProgressBar::new(u64::from(generations));
    if let Ok(style) =
        ProgressStyle::with_template("{bar:40} {pos}/{len} generations, loss {msg}")
    {
        bar.set_style(style);
    }

    let mut loss = f64::INFINITY;
    let mut done = 0;
    while done < generations {
        let chunk = CHUNK_GENERATIONS.min(generations - done);
        let config = ClimbConfig {
            generations: chunk,
            seed: seed.wrapping_add(u64::from(done)),
            ..ClimbConfig::default()
        };
        loss = hill_climb(
            &mut expression,
            &config,
            &dataset.inputs,
            &dataset.labels,
            constants,
        )?;
        done += chunk;
        bar.set_position(u64::from(done));
        bar.set_message(format!("{loss:.6}"));
    }
    bar.finish();

    let descent = gradient_descent(
        &expression,
        descent_steps,
        &dataset.inputs,
        &dataset.labels,
        constants,
    )?;

    if let Some(path) = save {
        save_expression(&expression, path)?;
    }

    let mut symbols: Vec<String> =
        (0..dataset.inputs.len()).map(|i| format!("x{i}")).collect();
    symbols.extend(descent.constants.iter().map(|c| format!("{c:.6}")));
    let borrowed: Vec<&str> = symbols.iter().map(String::as_str).collect();
    let equations = expression.equation(&borrowed)?;

    match format {
        OutputFormat::Text => {
            println!("loss: {:.6} (after climb: {loss:.6})", descent.loss);
            println!("constants: {:?}", descent.constants);
            for (i, equation) in equations.iter().enumerate() {
                println!("y{i} = {equation}");
            }
        }
        OutputFormat::Json => {
            let report = FitReport {
                equations,
                chromosome: expression.chromosome().to_vec(),
                constants: descent.constants,
                loss: descent.loss,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
