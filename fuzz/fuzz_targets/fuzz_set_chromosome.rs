#![no_main]

use arbitrary::Arbitrary;
use cgp::{Expression, KernelSet};
use libfuzzer_sys::fuzz_target;

/// Structured input for chromosome fuzzing.
#[derive(Arbitrary, Debug)]
struct ChromosomeInput {
    /// Program inputs (capped).
    inputs: u8,
    /// Program outputs (capped).
    outputs: u8,
    /// Grid rows (capped).
    rows: u8,
    /// Grid columns (capped).
    columns: u8,
    /// Levels-back constraint (capped).
    levels_back: u8,
    /// Connections per node (capped).
    arity: u8,
    /// Construction seed.
    seed: u64,
    /// Candidate chromosome genes.
    genes: Vec<u32>,
}

fuzz_target!(|input: ChromosomeInput| {
    // Cap the structure to keep chromosomes small
    let inputs = u32::from(input.inputs % 8) + 1;
    let outputs = u32::from(input.outputs % 4) + 1;
    let rows = u32::from(input.rows % 4) + 1;
    let columns = u32::from(input.columns % 16) + 1;
    let levels_back = u32::from(input.levels_back % 16) + 1;
    let arity = u32::from(input.arity % 4) + 1;

    let kernels = match KernelSet::new(&["sum", "diff", "mul", "div", "log", "exp"]) {
        Ok(k) => k,
        Err(_) => return,
    };
    let mut expr = match Expression::new(
        inputs, outputs, rows, columns, levels_back, arity, kernels, input.seed,
    ) {
        Ok(e) => e,
        Err(_) => return,
    };

    let before = expr.chromosome().to_vec();

    // Arbitrary genes either validate cleanly or leave the program intact
    match expr.set_chromosome(&input.genes) {
        Ok(()) => {
            assert_eq!(expr.chromosome(), input.genes);
            // Accepted chromosomes must evaluate without panicking
            let point: Vec<f64> = (0..inputs).map(f64::from).collect();
            let out = expr.eval(&point).expect("arity is correct by construction");
            assert_eq!(out.len(), outputs as usize);
        }
        Err(_) => {
            assert_eq!(expr.chromosome(), before);
        }
    }
});
