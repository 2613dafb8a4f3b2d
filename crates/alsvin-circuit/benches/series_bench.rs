//! Benchmarks for circuit composition laws
//!
//! Run with: cargo bench -p alsvin-circuit

use alsvin_circuit::{library, Component};
use alsvin_expr::ScalarExpr;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn numeric_cavity(label: &str) -> Component {
    library::cavity(label, label, ScalarExpr::from(0.5), &[ScalarExpr::from(2.0)])
        .expect("valid cavity")
}

/// Benchmark fusing a chain of series products.
fn bench_series_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_chain");

    for len in &[2usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("cavity_chain", len), len, |b, &n| {
            let cavities: Vec<Component> = (0..n)
                .map(|i| numeric_cavity(&format!("cav{i}")))
                .collect();
            b.iter(|| {
                let mut acc = cavities[0].clone();
                for cavity in &cavities[1..] {
                    acc = acc.series(black_box(cavity)).unwrap();
                }
                black_box(acc)
            });
        });
    }

    group.finish();
}

/// Benchmark the feedback elimination law.
fn bench_feedback(c: &mut Criterion) {
    let mut group = c.benchmark_group("feedback");

    group.bench_function("cavity_beamsplitter_loop", |b| {
        let cavity = numeric_cavity("cav");
        let bs = library::beam_splitter("BS", ScalarExpr::from(0.5)).unwrap();
        let open = cavity.concat(&Component::identity(1)).unwrap();
        let through = open.series(&bs).unwrap();
        b.iter(|| black_box(&through).feedback(0, 0).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_series_chain, bench_feedback);
criterion_main!(benches);
