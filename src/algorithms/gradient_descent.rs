//! Gradient descent over ephemeral constants.
//!
//! The loss is not analytically differentiable through arbitrary kernel
//! graphs, so the gradient is estimated with central finite differences.
//! Steps are only accepted when they lower the loss, which makes the
//! returned loss monotonically non-increasing over iterations.

use crate::expression::{Expression, ExpressionError};

/// Relative perturbation for the finite-difference gradient.
const DIFF_SCALE: f64 = 1e-6;

/// Smallest step length tried before a direction is abandoned.
const MIN_STEP: f64 = 1e-12;

/// Initial step length.
const INITIAL_STEP: f64 = 0.05;

/// Outcome of a gradient descent run.
#[derive(Debug, Clone, PartialEq)]
pub struct DescentResult {
    /// Fitted constants.
    pub constants: Vec<f64>,
    /// Loss of the expression with the fitted constants.
    pub loss: f64,
}

/// Fit the ephemeral constants of `expression` against a dataset.
///
/// Runs at most `steps` descent iterations. Each iteration estimates the
/// gradient of the loss with respect to the constants and backtracks the
/// step length until the loss improves; if no step length improves, the
/// search stops early. The result's loss never exceeds the starting loss.
///
/// # Errors
///
/// Returns an error if the dataset does not fit the expression (see
/// [`Expression::loss`]).
pub fn gradient_descent(
    expression: &Expression,
    steps: u32,
    inputs: &[Vec<f64>],
    labels: &[Vec<f64>],
    constants: &[f64],
) -> Result<DescentResult, ExpressionError> {
    let mut current = constants.to_vec();
    let mut best = expression.loss(inputs, labels, &current)?;
    let mut step = INITIAL_STEP;

    for _ in 0..steps {
        if current.is_empty() || !best.is_finite() {
            break;
        }

        let mut gradient = Vec::with_capacity(current.len());
        for i in 0..current.len() {
            let h = DIFF_SCALE * (1.0 + current[i].abs());
            let mut plus = current.clone();
            plus[i] += h;
            let mut minus = current.clone();
            minus[i] -= h;
            let loss_plus = expression.loss(inputs, labels, &plus)?;
            let loss_minus = expression.loss(inputs, labels, &minus)?;
            gradient.push((loss_plus - loss_minus) / (2.0 * h));
        }
        if !gradient.iter().all(|g| g.is_finite()) {
            break;
        }

        let mut trial = step;
        let mut accepted = false;
        while trial > MIN_STEP {
            let candidate: Vec<f64> = current
                .iter()
                .zip(&gradient)
                .map(|(c, g)| c - trial * g)
                .collect();
            let loss = expression.loss(inputs, labels, &candidate)?;
            if loss.is_finite() && loss < best {
                current = candidate;
                best = loss;
                // A productive direction earns a slightly longer next step.
                step = trial * 1.5;
                accepted = true;
                break;
            }
            trial /= 2.0;
        }
        if !accepted {
            break;
        }
    }

    Ok(DescentResult { constants: current, loss: best })
}
