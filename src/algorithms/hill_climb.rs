//! (1+λ) evolutionary hill climb over active genes.
//!
//! Each generation clones the parent λ times, mutates a few active genes
//! in every clone, and keeps the best offspring unless it is worse than
//! the parent. Offspring equal to the parent's loss are accepted, which
//! lets the search drift across the many neutral encodings of the same
//! program.

use crate::expression::{Expression, ExpressionError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for the hill climb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimbConfig {
    /// Number of generations to run.
    pub generations: u32,
    /// Offspring per generation (the λ in 1+λ).
    pub offspring: u32,
    /// Upper bound on active-gene mutations per offspring.
    pub max_mutations: u32,
    /// Seed for the offspring generator streams.
    pub seed: u64,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            generations: 100,
            offspring: 4,
            max_mutations: 2,
            seed: 42,
        }
    }
}

/// Evolve `expression` in place against a dataset.
///
/// Returns the loss of the surviving chromosome. The expression's
/// chromosome is replaced whenever an offspring matches or improves on
/// the parent's loss; a non-finite parent loss is treated as worse than
/// any finite offspring.
///
/// # Errors
///
/// Returns an error if the dataset does not fit the expression (see
/// [`Expression::loss`]).
pub fn hill_climb(
    expression: &mut Expression,
    config: &ClimbConfig,
    inputs: &[Vec<f64>],
    labels: &[Vec<f64>],
    constants: &[f64],
) -> Result<f64, ExpressionError> {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut best_loss = expression.loss(inputs, labels, constants)?;
    let max_mutations = config.max_mutations.max(1);

    for _ in 0..config.generations {
        let mut survivor: Option<(Vec<u32>, f64)> = None;

        for _ in 0..config.offspring {
            let mut child = expression.clone();
            child.reseed(rng.r#gen());
            child.mutate_active(rng.gen_range(1..=max_mutations));
            let loss = child.loss(inputs, labels, constants)?;

            let beats_parent = !best_loss.is_finite() || loss <= best_loss;
            let beats_siblings = survivor.as_ref().is_none_or(|&(_, l)| loss < l);
            if loss.is_finite() && beats_parent && beats_siblings {
                survivor = Some((child.chromosome().to_vec(), loss));
            }
        }

        if let Some((chromosome, loss)) = survivor {
            expression.set_chromosome(&chromosome)?;
            best_loss = loss;
        }
    }

    Ok(best_loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelSet;

    #[test]
    fn test_climb_never_regresses() {
        let kernels = KernelSet::new(&["sum", "diff", "mul", "div"]).unwrap();
        let mut expr = Expression::new(1, 1, 1, 8, 8, 2, kernels, 5).unwrap();

        // Target: y = x * x.
        let xs: Vec<f64> = (0..20).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x * x).collect();
        let inputs = vec![xs];
        let labels = vec![ys];

        let start = expr.loss(&inputs, &labels, &[]).unwrap();
        let config = ClimbConfig { generations: 30, ..ClimbConfig::default() };
        let end = hill_climb(&mut expr, &config, &inputs, &labels, &[]).unwrap();

        if start.is_finite() {
            assert!(end <= start);
        }
        // The surviving chromosome is valid and matches the reported loss.
        let check = expr.loss(&inputs, &labels, &[]).unwrap();
        assert!((check - end).abs() < 1e-12 || (check.is_nan() && end.is_nan()));
    }

    #[test]
    fn test_climb_is_deterministic() {
        let kernels = KernelSet::new(&["sum", "diff", "mul"]).unwrap();
        let inputs = vec![vec![1.0, 2.0, 3.0]];
        let labels = vec![vec![2.0, 4.0, 6.0]];
        let config = ClimbConfig { generations: 10, ..ClimbConfig::default() };

        let mut a = Expression::new(1, 1, 1, 6, 6, 2, kernels.clone(), 9).unwrap();
        let mut b = Expression::new(1, 1, 1, 6, 6, 2, kernels, 9).unwrap();
        let la = hill_climb(&mut a, &config, &inputs, &labels, &[]).unwrap();
        let lb = hill_climb(&mut b, &config, &inputs, &labels, &[]).unwrap();

        assert_eq!(a.chromosome(), b.chromosome());
        assert!((la - lb).abs() < 1e-15 || (la.is_nan() && lb.is_nan()));
    }
}
