//! Program representation: chromosome, gene bounds and active structures.

// Gene arithmetic uses intentional narrowing casts
#![allow(clippy::cast_possible_truncation)]

use crate::kernel::KernelSet;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// A Cartesian genetic programming expression.
///
/// Construction draws a random chromosome within the structural bounds
/// from a seeded generator, so identical arguments always produce
/// identical programs. The chromosome can then be inspected, replaced
/// through the validating setter, mutated in place, and evaluated
/// numerically or symbolically.
#[derive(Clone)]
pub struct Expression {
    /// Number of program inputs.
    pub(crate) inputs: u32,
    /// Number of program outputs.
    pub(crate) outputs: u32,
    /// Grid rows.
    pub(crate) rows: u32,
    /// Grid columns.
    pub(crate) columns: u32,
    /// How many columns back a connection may reach.
    pub(crate) levels_back: u32,
    /// Connections per node.
    pub(crate) arity: u32,
    /// Kernels addressed by function genes.
    pub(crate) kernels: KernelSet,
    /// The encoded program.
    pub(crate) chromosome: Vec<u32>,
    /// Per-gene lower bounds.
    pub(crate) lower: Vec<u32>,
    /// Per-gene upper bounds.
    pub(crate) upper: Vec<u32>,
    /// Addresses (inputs included) reachable from the output genes, ascending.
    pub(crate) active_nodes: Vec<u32>,
    /// Chromosome indices that influence the outputs, ascending.
    pub(crate) active_genes: Vec<usize>,
    /// Seed the generator was created from.
    pub(crate) seed: u64,
    /// Generator driving the mutation operators.
    pub(crate) rng: SmallRng,
}

impl Expression {
    /// Create a random expression over the given structure.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::InvalidStructure`] if any structural
    /// argument is zero and [`ExpressionError::EmptyKernelSet`] if there
    /// are no kernels to draw function genes from.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inputs: u32,
        outputs: u32,
        rows: u32,
        columns: u32,
        levels_back: u32,
        arity: u32,
        kernels: KernelSet,
        seed: u64,
    ) -> Result<Self, ExpressionError> {
        for (field, value) in [
            ("inputs", inputs),
            ("outputs", outputs),
            ("rows", rows),
            ("columns", columns),
            ("levels_back", levels_back),
            ("arity", arity),
        ] {
            if value == 0 {
                return Err(ExpressionError::InvalidStructure { field });
            }
        }
        if kernels.is_empty() {
            return Err(ExpressionError::EmptyKernelSet);
        }

        let (lower, upper) =
            gene_bounds(inputs, outputs, rows, columns, levels_back, arity, kernels.len() as u32);

        let mut rng = SmallRng::seed_from_u64(seed);
        let chromosome = lower
            .iter()
            .zip(&upper)
            .map(|(&lb, &ub)| rng.gen_range(lb..=ub))
            .collect();

        let mut expr = Self {
            inputs,
            outputs,
            rows,
            columns,
            levels_back,
            arity,
            kernels,
            chromosome,
            lower,
            upper,
            active_nodes: Vec::new(),
            active_genes: Vec::new(),
            seed,
            rng,
        };
        expr.update_active();
        Ok(expr)
    }

    /// The current chromosome.
    #[must_use]
    pub fn chromosome(&self) -> &[u32] {
        &self.chromosome
    }

    /// Replace the chromosome.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::ChromosomeLength`] on a length mismatch
    /// and [`ExpressionError::GeneOutOfBounds`] for the first gene outside
    /// its structural bounds. The expression is unchanged on error.
    pub fn set_chromosome(&mut self, chromosome: &[u32]) -> Result<(), ExpressionError> {
        if chromosome.len() != self.chromosome.len() {
            return Err(ExpressionError::ChromosomeLength {
                expected: self.chromosome.len(),
                got: chromosome.len(),
            });
        }
        for (index, ((&gene, &lb), &ub)) in
            chromosome.iter().zip(&self.lower).zip(&self.upper).enumerate()
        {
            if gene < lb || gene > ub {
                return Err(ExpressionError::GeneOutOfBounds {
                    index,
                    value: gene,
                    lower: lb,
                    upper: ub,
                });
            }
        }
        self.chromosome.copy_from_slice(chromosome);
        self.update_active();
        Ok(())
    }

    /// Per-gene lower bounds.
    #[must_use]
    pub fn lower_bounds(&self) -> &[u32] {
        &self.lower
    }

    /// Per-gene upper bounds.
    #[must_use]
    pub fn upper_bounds(&self) -> &[u32] {
        &self.upper
    }

    /// Addresses reachable from the output genes, inputs included, ascending.
    #[must_use]
    pub fn active_nodes(&self) -> &[u32] {
        &self.active_nodes
    }

    /// Chromosome indices that influence the outputs, ascending.
    ///
    /// Output genes are always active.
    #[must_use]
    pub fn active_genes(&self) -> &[usize] {
        &self.active_genes
    }

    /// Chromosome index of the first gene of every node, in node order.
    #[must_use]
    pub fn gene_indices(&self) -> Vec<usize> {
        let block = self.arity as usize + 1;
        (0..(self.rows * self.columns) as usize).map(|b| b * block).collect()
    }

    /// Number of program inputs.
    #[must_use]
    pub fn inputs(&self) -> u32 {
        self.inputs
    }

    /// Number of program outputs.
    #[must_use]
    pub fn outputs(&self) -> u32 {
        self.outputs
    }

    /// Grid rows.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Grid columns.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Levels-back constraint.
    #[must_use]
    pub fn levels_back(&self) -> u32 {
        self.levels_back
    }

    /// Connections per node.
    #[must_use]
    pub fn arity(&self) -> u32 {
        self.arity
    }

    /// The kernel set function genes index into.
    #[must_use]
    pub fn kernels(&self) -> &KernelSet {
        &self.kernels
    }

    /// Seed the expression was constructed with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Reseed the generator driving the mutation operators.
    ///
    /// The chromosome is untouched; only future mutations change.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Recompute `active_nodes` and `active_genes` from the chromosome.
    ///
    /// Walks backwards from the output genes; connection genes always point
    /// at strictly earlier addresses, so a single ascending pass over the
    /// result is a valid evaluation order.
    pub(crate) fn update_active(&mut self) {
        let block = self.arity as usize + 1;
        let node_count = (self.rows * self.columns) as usize;
        let total = self.inputs as usize + node_count;
        let node_gene_count = node_count * block;

        let mut needed = vec![false; total];
        let mut stack: Vec<u32> = self.chromosome[node_gene_count..].to_vec();

        while let Some(addr) = stack.pop() {
            let slot = addr as usize;
            if needed[slot] {
                continue;
            }
            needed[slot] = true;
            if addr >= self.inputs {
                let start = (addr - self.inputs) as usize * block;
                for k in 1..block {
                    stack.push(self.chromosome[start + k]);
                }
            }
        }

        self.active_nodes = (0..total as u32).filter(|&a| needed[a as usize]).collect();

        self.active_genes.clear();
        for &addr in &self.active_nodes {
            if addr >= self.inputs {
                let start = (addr - self.inputs) as usize * block;
                self.active_genes.extend(start..start + block);
            }
        }
        self.active_genes.extend(node_gene_count..self.chromosome.len());
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .field("levels_back", &self.levels_back)
            .field("arity", &self.arity)
            .field("kernels", &self.kernels.names())
            .field("chromosome", &self.chromosome)
            .finish_non_exhaustive()
    }
}

/// Compute per-gene bounds for the given structure.
///
/// Node addresses start after the inputs and grow column-major. A
/// connection gene in column `i` may address the inputs (while within
/// `levels_back` of the first column) and any node up to the end of
/// column `i - 1`; output genes follow the same rule at column `columns`.
fn gene_bounds(
    inputs: u32,
    outputs: u32,
    rows: u32,
    columns: u32,
    levels_back: u32,
    arity: u32,
    kernel_count: u32,
) -> (Vec<u32>, Vec<u32>) {
    let glen = (rows * columns * (arity + 1) + outputs) as usize;
    let mut lower = Vec::with_capacity(glen);
    let mut upper = Vec::with_capacity(glen);

    for col in 0..columns {
        let conn_lb = if col >= levels_back {
            inputs + rows * (col - levels_back)
        } else {
            0
        };
        let conn_ub = inputs + rows * col - 1;
        for _row in 0..rows {
            lower.push(0);
            upper.push(kernel_count - 1);
            for _ in 0..arity {
                lower.push(conn_lb);
                upper.push(conn_ub);
            }
        }
    }

    let out_lb = if columns >= levels_back {
        inputs + rows * (columns - levels_back)
    } else {
        0
    };
    let out_ub = inputs + rows * columns - 1;
    for _ in 0..outputs {
        lower.push(out_lb);
        upper.push(out_ub);
    }

    (lower, upper)
}

/// Errors raised by expression construction, mutation and evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// A structural argument was zero.
    InvalidStructure {
        /// Name of the offending argument.
        field: &'static str,
    },
    /// The kernel set holds no kernels.
    EmptyKernelSet,
    /// A chromosome of the wrong length was supplied.
    ChromosomeLength {
        /// Required gene count.
        expected: usize,
        /// Supplied gene count.
        got: usize,
    },
    /// A gene fell outside its structural bounds.
    GeneOutOfBounds {
        /// Chromosome index of the gene.
        index: usize,
        /// Supplied value.
        value: u32,
        /// Lower bound at that index.
        lower: u32,
        /// Upper bound at that index.
        upper: u32,
    },
    /// Evaluation input count did not match the program's input arity.
    InputArity {
        /// The program's input count.
        expected: usize,
        /// Supplied value count.
        got: usize,
    },
    /// Label row count did not match the program's output arity.
    LabelArity {
        /// The program's output count.
        expected: usize,
        /// Supplied row count.
        got: usize,
    },
    /// Dataset rows disagree on the number of points.
    PointCount {
        /// Points in the first row.
        expected: usize,
        /// Points in the offending row.
        got: usize,
    },
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionError::InvalidStructure { field } => {
                write!(f, "structural argument {field} must be non-zero")
            }
            ExpressionError::EmptyKernelSet => write!(f, "kernel set is empty"),
            ExpressionError::ChromosomeLength { expected, got } => {
                write!(f, "chromosome length mismatch: expected {expected}, got {got}")
            }
            ExpressionError::GeneOutOfBounds { index, value, lower, upper } => {
                write!(
                    f,
                    "gene {index} = {value} outside bounds [{lower}, {upper}]"
                )
            }
            ExpressionError::InputArity { expected, got } => {
                write!(f, "expected {expected} inputs, got {got}")
            }
            ExpressionError::LabelArity { expected, got } => {
                write!(f, "expected {expected} label rows, got {got}")
            }
            ExpressionError::PointCount { expected, got } => {
                write!(f, "dataset rows disagree on point count: {expected} vs {got}")
            }
        }
    }
}

impl std::error::Error for ExpressionError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelSet;

    fn six_kernels() -> KernelSet {
        KernelSet::new(&["sum", "diff", "mul", "div", "log", "exp"]).unwrap()
    }

    #[test]
    fn test_chromosome_length_matches_structure() {
        let expr = Expression::new(2, 1, 1, 5, 5, 2, six_kernels(), 42).unwrap();
        assert_eq!(expr.chromosome().len(), 5 * 3 + 1);
    }

    #[test]
    fn test_construction_is_deterministic() {
        let a = Expression::new(2, 1, 1, 5, 5, 2, six_kernels(), 7).unwrap();
        let b = Expression::new(2, 1, 1, 5, 5, 2, six_kernels(), 7).unwrap();
        assert_eq!(a.chromosome(), b.chromosome());
    }

    #[test]
    fn test_random_chromosome_is_within_bounds() {
        let expr = Expression::new(3, 2, 2, 6, 3, 3, six_kernels(), 99).unwrap();
        for ((&g, &lb), &ub) in
            expr.chromosome().iter().zip(expr.lower_bounds()).zip(expr.upper_bounds())
        {
            assert!(g >= lb && g <= ub);
        }
    }

    #[test]
    fn test_zero_structure_is_rejected() {
        let err = Expression::new(0, 1, 1, 5, 5, 2, six_kernels(), 1).unwrap_err();
        assert_eq!(err, ExpressionError::InvalidStructure { field: "inputs" });
    }

    #[test]
    fn test_empty_kernel_set_is_rejected() {
        let err = Expression::new(2, 1, 1, 5, 5, 2, KernelSet::default(), 1).unwrap_err();
        assert_eq!(err, ExpressionError::EmptyKernelSet);
    }

    #[test]
    fn test_set_round_trips() {
        let mut expr = Expression::new(2, 1, 1, 5, 5, 2, six_kernels(), 42).unwrap();
        let original = expr.chromosome().to_vec();
        let other = Expression::new(2, 1, 1, 5, 5, 2, six_kernels(), 43).unwrap();
        expr.set_chromosome(other.chromosome()).unwrap();
        assert_eq!(expr.chromosome(), other.chromosome());
        expr.set_chromosome(&original).unwrap();
        assert_eq!(expr.chromosome(), original);
    }

    #[test]
    fn test_set_rejects_wrong_length() {
        let mut expr = Expression::new(2, 1, 1, 5, 5, 2, six_kernels(), 42).unwrap();
        let err = expr.set_chromosome(&[0, 0, 0]).unwrap_err();
        assert_eq!(err, ExpressionError::ChromosomeLength { expected: 16, got: 3 });
    }

    #[test]
    fn test_set_rejects_out_of_bounds_gene() {
        let mut expr = Expression::new(2, 1, 1, 5, 5, 2, six_kernels(), 42).unwrap();
        let before = expr.chromosome().to_vec();
        let mut bad = before.clone();
        bad[0] = 6; // only six kernels
        let err = expr.set_chromosome(&bad).unwrap_err();
        assert!(matches!(err, ExpressionError::GeneOutOfBounds { index: 0, value: 6, .. }));
        assert_eq!(expr.chromosome(), before);
    }

    #[test]
    fn test_reference_chromosome_is_accepted() {
        // 5 inputs, 1 output, 1x20 grid, levels-back 4, arity 2, six kernels.
        let mut expr = Expression::new(5, 1, 1, 20, 4, 2, six_kernels(), 1).unwrap();
        let chromosome = [
            4, 3, 0, 0, 1, 1, 2, 0, 6, 2, 5, 5, 5, 8, 6, 5, 6, 8, 1, 7, 9, 1, 9, 11, 3, 9,
            11, 3, 12, 10, 2, 13, 13, 4, 12, 14, 5, 14, 15, 5, 14, 14, 3, 18, 15, 1, 18, 17,
            3, 19, 20, 5, 18, 19, 0, 22, 22, 2, 23, 22, 24,
        ];
        expr.set_chromosome(&chromosome).unwrap();
        assert_eq!(expr.chromosome(), chromosome);
    }

    #[test]
    fn test_active_genes_include_outputs() {
        let expr = Expression::new(2, 2, 1, 4, 4, 2, six_kernels(), 5).unwrap();
        let glen = expr.chromosome().len();
        assert!(expr.active_genes().contains(&(glen - 1)));
        assert!(expr.active_genes().contains(&(glen - 2)));
    }

    #[test]
    fn test_active_nodes_are_sorted_and_reachable() {
        let expr = Expression::new(3, 1, 2, 5, 2, 2, six_kernels(), 11).unwrap();
        let nodes = expr.active_nodes();
        assert!(nodes.windows(2).all(|w| w[0] < w[1]));
        // The output gene's address is always active.
        let out_addr = *expr.chromosome().last().unwrap();
        assert!(nodes.contains(&out_addr));
    }
}
