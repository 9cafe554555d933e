//! Show command implementation.

use super::{CliError, OutputFormat};
use cgp::{Expression, KernelSet};
use serde::Serialize;

/// JSON payload for the show command.
#[derive(Debug, Serialize)]
struct ShowReport {
    equations: Vec<String>,
    chromosome: Vec<u32>,
    active_nodes: Vec<u32>,
    kernels: Vec<&'static str>,
}

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the structure, kernel names or chromosome are
/// rejected by the engine.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    inputs: u32,
    outputs: u32,
    rows: u32,
    columns: u32,
    levels_back: u32,
    arity: u32,
    kernels: &[String],
    seed: u64,
    chromosome: Option<&str>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let kernel_set = KernelSet::new(kernels)?;
    let mut expression = Expression::new(
        inputs,
        outputs,
        rows,
        columns,
        levels_back,
        arity,
        kernel_set,
        seed,
    )?;

    if let Some(raw) = chromosome {
        let genes: Vec<u32> = serde_json::from_str(raw)?;
        expression.set_chromosome(&genes)?;
    }

    let symbols: Vec<String> = (0..inputs).map(|i| format!("x{i}")).collect();
    let borrowed: Vec<&str> = symbols.iter().map(String::as_str).collect();
    let equations = expression.equation(&borrowed)?;

    match format {
        OutputFormat::Text => {
            for (i, equation) in equations.iter().enumerate() {
                println!("y{i} = {equation}");
            }
            println!();
            println!("chromosome: {:?}", expression.chromosome());
            println!("active nodes: {:?}", expression.active_nodes());
        }
        OutputFormat::Json => {
            let report = ShowReport {
                equations,
                chromosome: expression.chromosome().to_vec(),
                active_nodes: expression.active_nodes().to_vec(),
                kernels: expression.kernels().names(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
