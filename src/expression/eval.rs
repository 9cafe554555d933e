//! Numeric and symbolic evaluation.
//!
//! Both walks decode only the active nodes, in ascending address order.
//! Connection genes always reference earlier addresses, so one pass
//! suffices. The symbolic walk produces the same graph with kernel
//! printers instead of kernel arithmetic.

use crate::expression::program::{Expression, ExpressionError};

impl Expression {
    /// Evaluate the expression on one input point.
    ///
    /// Returns one value per program output.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::InputArity`] if the input length does
    /// not match the program's input count.
    pub fn eval(&self, inputs: &[f64]) -> Result<Vec<f64>, ExpressionError> {
        let n = self.inputs as usize;
        if inputs.len() != n {
            return Err(ExpressionError::InputArity { expected: n, got: inputs.len() });
        }

        let block = self.arity as usize + 1;
        let total = n + (self.rows * self.columns) as usize;
        let mut values = vec![0.0_f64; total];
        values[..n].copy_from_slice(inputs);

        let mut operands = Vec::with_capacity(self.arity as usize);
        for &addr in &self.active_nodes {
            if addr < self.inputs {
                continue;
            }
            let start = (addr - self.inputs) as usize * block;
            let kernel = self.kernels.kernels()[self.chromosome[start] as usize];
            operands.clear();
            for k in 1..block {
                operands.push(values[self.chromosome[start + k] as usize]);
            }
            values[addr as usize] = kernel.eval(&operands);
        }

        let out_start = self.chromosome.len() - self.outputs as usize;
        Ok(self.chromosome[out_start..]
            .iter()
            .map(|&gene| values[gene as usize])
            .collect())
    }

    /// Render the expression as one equation string per program output.
    ///
    /// `symbols` names the program inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::InputArity`] if the symbol count does
    /// not match the program's input count.
    pub fn equation(&self, symbols: &[&str]) -> Result<Vec<String>, ExpressionError> {
        let n = self.inputs as usize;
        if symbols.len() != n {
            return Err(ExpressionError::InputArity { expected: n, got: symbols.len() });
        }

        let block = self.arity as usize + 1;
        let total = n + (self.rows * self.columns) as usize;
        let mut values = vec![String::new(); total];
        for (slot, symbol) in values.iter_mut().zip(symbols) {
            (*symbol).clone_into(slot);
        }

        let mut operands = Vec::with_capacity(self.arity as usize);
        for &addr in &self.active_nodes {
            if addr < self.inputs {
                continue;
            }
            let start = (addr - self.inputs) as usize * block;
            let kernel = self.kernels.kernels()[self.chromosome[start] as usize];
            operands.clear();
            for k in 1..block {
                operands.push(values[self.chromosome[start + k] as usize].clone());
            }
            values[addr as usize] = kernel.print(&operands);
        }

        let out_start = self.chromosome.len() - self.outputs as usize;
        Ok(self.chromosome[out_start..]
            .iter()
            .map(|&gene| values[gene as usize].clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelSet;

    fn expr_2in_1out() -> Expression {
        let kernels = KernelSet::new(&["sum", "diff", "mul", "div"]).unwrap();
        Expression::new(2, 1, 1, 2, 2, 2, kernels, 3).unwrap()
    }

    #[test]
    fn test_eval_output_count() {
        let kernels = KernelSet::new(&["sum", "mul"]).unwrap();
        let expr = Expression::new(3, 4, 2, 3, 3, 2, kernels, 17).unwrap();
        let out = expr.eval(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_eval_rejects_wrong_arity() {
        let expr = expr_2in_1out();
        let err = expr.eval(&[1.0]).unwrap_err();
        assert_eq!(err, ExpressionError::InputArity { expected: 2, got: 1 });
    }

    #[test]
    fn test_pinned_program_evaluates_and_prints() {
        // Two nodes: node 2 = x0 + x1, node 3 = node2 * x0; output = node 3.
        let mut expr = expr_2in_1out();
        expr.set_chromosome(&[0, 0, 1, 2, 2, 0, 3]).unwrap();

        let out = expr.eval(&[3.0, 4.0]).unwrap();
        assert!((out[0] - 21.0).abs() < 1e-12);

        let eq = expr.equation(&["x", "y"]).unwrap();
        assert_eq!(eq, vec!["((x+y)*x)".to_string()]);
    }

    #[test]
    fn test_output_wired_to_input_passes_through() {
        // Output gene may address an input directly when levels_back
        // covers the whole grid.
        let kernels = KernelSet::new(&["sum"]).unwrap();
        let mut expr = Expression::new(2, 1, 1, 2, 3, 2, kernels, 9).unwrap();
        expr.set_chromosome(&[0, 0, 0, 0, 1, 1, 1]).unwrap();
        let out = expr.eval(&[5.0, 8.0]).unwrap();
        assert!((out[0] - 8.0).abs() < 1e-12);
        let eq = expr.equation(&["a", "b"]).unwrap();
        assert_eq!(eq, vec!["b".to_string()]);
    }

    #[test]
    fn test_same_seed_same_outputs() {
        let kernels = KernelSet::new(&["sum", "diff", "mul", "div", "log", "exp"]).unwrap();
        let a = Expression::new(2, 1, 1, 5, 5, 2, kernels.clone(), 123).unwrap();
        let b = Expression::new(2, 1, 1, 5, 5, 2, kernels, 123).unwrap();
        let xa = a.eval(&[0.5, -1.5]).unwrap();
        let xb = b.eval(&[0.5, -1.5]).unwrap();
        assert_eq!(xa.len(), xb.len());
        for (va, vb) in xa.iter().zip(&xb) {
            assert!((va - vb).abs() < 1e-15 || (va.is_nan() && vb.is_nan()));
        }
    }
}
