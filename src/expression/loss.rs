//! Mean-squared-error loss over datasets.
//!
//! Datasets are variable-major: `inputs[i]` holds the i-th input variable
//! across all points, `labels[j]` the j-th output across all points.
//! Ephemeral constants are appended to every point, so an expression with
//! `n` inputs can be fit with `n - constants.len()` data variables.

#![allow(clippy::cast_precision_loss)]

use crate::expression::program::{Expression, ExpressionError};
use rayon::prelude::*;

impl Expression {
    /// Mean over points of the summed squared output error.
    ///
    /// Points are evaluated in parallel. A point whose evaluation is not
    /// representable contributes a non-finite term, which surfaces in the
    /// returned loss rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::InputArity`] when variable rows plus
    /// constants do not cover the program inputs,
    /// [`ExpressionError::LabelArity`] when the label row count differs
    /// from the program outputs, and [`ExpressionError::PointCount`] when
    /// rows disagree on the number of points.
    pub fn loss(
        &self,
        inputs: &[Vec<f64>],
        labels: &[Vec<f64>],
        constants: &[f64],
    ) -> Result<f64, ExpressionError> {
        let n = self.inputs as usize;
        if inputs.len() + constants.len() != n {
            return Err(ExpressionError::InputArity {
                expected: n,
                got: inputs.len() + constants.len(),
            });
        }
        if labels.len() != self.outputs as usize {
            return Err(ExpressionError::LabelArity {
                expected: self.outputs as usize,
                got: labels.len(),
            });
        }

        let points = inputs
            .first()
            .or_else(|| labels.first())
            .map_or(0, Vec::len);
        for row in inputs.iter().chain(labels) {
            if row.len() != points {
                return Err(ExpressionError::PointCount { expected: points, got: row.len() });
            }
        }
        if points == 0 {
            return Ok(0.0);
        }

        // Per-point terms are computed in parallel but reduced in point
        // order, so the same data always yields bit-identical losses.
        let terms: Vec<f64> = (0..points)
            .into_par_iter()
            .map(|p| {
                let mut x = Vec::with_capacity(n);
                for row in inputs {
                    x.push(row[p]);
                }
                x.extend_from_slice(constants);
                // x.len() == n by the arity check above.
                self.eval(&x).map_or(f64::NAN, |out| {
                    labels
                        .iter()
                        .zip(&out)
                        .map(|(row, o)| {
                            let e = o - row[p];
                            e * e
                        })
                        .sum()
                })
            })
            .collect();

        Ok(terms.iter().sum::<f64>() / points as f64)
    }
}
