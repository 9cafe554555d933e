//! Property-based tests for expression construction and mutation.
//!
//! These verify structural invariants over random grid shapes.
//! Run with: cargo test --release prop_expression

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use cgp::{Expression, KernelSet};

/// Random structural arguments within sane limits.
fn structure() -> impl Strategy<Value = (u32, u32, u32, u32, u32, u32)> {
    (1u32..5, 1u32..4, 1u32..4, 1u32..7, 1u32..7, 1u32..4)
}

fn kernels() -> KernelSet {
    KernelSet::new(&["sum", "diff", "mul", "div", "log", "exp"]).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Freshly drawn chromosomes always satisfy their own bounds.
    #[test]
    fn prop_random_chromosome_in_bounds(
        (inputs, outputs, rows, columns, levels_back, arity) in structure(),
        seed in any::<u64>()
    ) {
        let expr = Expression::new(
            inputs, outputs, rows, columns, levels_back, arity, kernels(), seed,
        ).unwrap();

        let expected =
            (rows * columns * (arity + 1) + outputs) as usize;
        prop_assert_eq!(expr.chromosome().len(), expected);

        for ((&g, &lb), &ub) in expr
            .chromosome()
            .iter()
            .zip(expr.lower_bounds())
            .zip(expr.upper_bounds())
        {
            prop_assert!(g >= lb && g <= ub);
        }
    }

    /// Setting a chromosome back returns exactly the same genes.
    #[test]
    fn prop_set_get_round_trip(
        (inputs, outputs, rows, columns, levels_back, arity) in structure(),
        seed_a in any::<u64>(),
        seed_b in any::<u64>()
    ) {
        let mut expr = Expression::new(
            inputs, outputs, rows, columns, levels_back, arity, kernels(), seed_a,
        ).unwrap();
        let donor = Expression::new(
            inputs, outputs, rows, columns, levels_back, arity, kernels(), seed_b,
        ).unwrap();

        expr.set_chromosome(donor.chromosome()).unwrap();
        prop_assert_eq!(expr.chromosome(), donor.chromosome());
    }

    /// Evaluation returns one value per declared output.
    #[test]
    fn prop_eval_length_matches_outputs(
        (inputs, outputs, rows, columns, levels_back, arity) in structure(),
        seed in any::<u64>(),
        point in proptest::collection::vec(-100.0f64..100.0, 0..8)
    ) {
        let expr = Expression::new(
            inputs, outputs, rows, columns, levels_back, arity, kernels(), seed,
        ).unwrap();

        let mut values = point;
        values.resize(inputs as usize, 1.0);
        let out = expr.eval(&values).unwrap();
        prop_assert_eq!(out.len(), outputs as usize);
    }

    /// Identical arguments always produce identical programs.
    #[test]
    fn prop_construction_is_deterministic(
        (inputs, outputs, rows, columns, levels_back, arity) in structure(),
        seed in any::<u64>()
    ) {
        let a = Expression::new(
            inputs, outputs, rows, columns, levels_back, arity, kernels(), seed,
        ).unwrap();
        let b = Expression::new(
            inputs, outputs, rows, columns, levels_back, arity, kernels(), seed,
        ).unwrap();
        prop_assert_eq!(a.chromosome(), b.chromosome());
    }

    /// Every mutation operator preserves chromosome validity.
    #[test]
    fn prop_mutation_preserves_validity(
        (inputs, outputs, rows, columns, levels_back, arity) in structure(),
        seed in any::<u64>(),
        rounds in 1u32..20
    ) {
        let mut expr = Expression::new(
            inputs, outputs, rows, columns, levels_back, arity, kernels(), seed,
        ).unwrap();

        for i in 0..rounds {
            match i % 5 {
                0 => expr.mutate_random(2),
                1 => expr.mutate_active(2),
                2 => expr.mutate_active_connections(1),
                3 => expr.mutate_active_functions(1),
                _ => expr.mutate_outputs(1),
            }
        }

        let chromosome = expr.chromosome().to_vec();
        prop_assert!(expr.set_chromosome(&chromosome).is_ok());
    }

    /// Active nodes stay sorted and within the address space.
    #[test]
    fn prop_active_nodes_well_formed(
        (inputs, outputs, rows, columns, levels_back, arity) in structure(),
        seed in any::<u64>()
    ) {
        let expr = Expression::new(
            inputs, outputs, rows, columns, levels_back, arity, kernels(), seed,
        ).unwrap();

        let limit = inputs + rows * columns;
        let nodes = expr.active_nodes();
        prop_assert!(nodes.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(nodes.iter().all(|&a| a < limit));
        // Output genes are always active, so there is always something here.
        prop_assert!(!expr.active_genes().is_empty());
    }
}
