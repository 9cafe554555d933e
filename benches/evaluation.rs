//! Benchmarks for expression evaluation.

#![allow(missing_docs)] // Benchmark macros generate undocumented functions
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use cgp::{Expression, KernelSet};
use criterion::{Criterion, criterion_group, criterion_main};

fn wide_expression() -> Expression {
    let kernels =
        KernelSet::new(&["sum", "diff", "mul", "div", "sin", "cos", "log", "exp"]).unwrap();
    Expression::new(4, 2, 4, 40, 10, 2, kernels, 12345).unwrap()
}

fn bench_eval(c: &mut Criterion) {
    let expr = wide_expression();
    let point = [0.5, -1.25, 3.0, 0.125];

    c.bench_function("eval_4x40_grid", |b| {
        b.iter(|| {
            let _ = black_box(expr.eval(black_box(&point)));
        });
    });
}

fn bench_equation(c: &mut Criterion) {
    let expr = wide_expression();
    let symbols = ["a", "b", "c", "d"];

    c.bench_function("equation_4x40_grid", |b| {
        b.iter(|| {
            let _ = black_box(expr.equation(black_box(&symbols)));
        });
    });
}

fn bench_loss(c: &mut Criterion) {
    let expr = wide_expression();
    let points = 256;
    let inputs: Vec<Vec<f64>> = (0..3)
        .map(|v| (0..points).map(|p| f64::from(p) * 0.1 + f64::from(v)).collect())
        .collect();
    let labels: Vec<Vec<f64>> = (0..2)
        .map(|o| (0..points).map(|p| f64::from(p + o)).collect())
        .collect();

    c.bench_function("loss_256_points", |b| {
        b.iter(|| {
            let _ = black_box(expr.loss(black_box(&inputs), black_box(&labels), &[2.5]));
        });
    });
}

fn bench_mutation(c: &mut Criterion) {
    c.bench_function("mutate_active_1000", |b| {
        b.iter_batched(
            wide_expression,
            |mut expr| {
                for _ in 0..1000 {
                    expr.mutate_active(2);
                }
                expr
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_eval, bench_equation, bench_loss, bench_mutation);
criterion_main!(benches);
