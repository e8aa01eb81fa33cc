//! Criterion benchmarks for the enumeration hot path in `bn-core`.
//!
//! Networks are built in memory so the numbers do not include file I/O.

use bn_config::CyclePolicy;
use bn_core::bif::{parse_bif, GRADIENT_BIF};
use bn_core::evidence::Evidence;
use bn_core::graph::prepare;
use bn_core::inference::{infer, InferenceOptions};
use bn_core::network::{Network, NetworkBuilder};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Binary chain `x0 -> x1 -> ... -> x{n-1}` declared leaf-first.
fn chain(n: usize) -> Network {
    let mut builder = NetworkBuilder::new(Some(format!("chain{n}")));
    for k in (0..n).rev() {
        builder
            .add_variable(format!("x{k}"), ["on", "off"])
            .expect("fresh variable");
    }
    for k in 0..n {
        let (parents, rows) = if k == 0 {
            (vec![], vec![vec![0.3, 0.7]])
        } else {
            (
                vec![format!("x{}", k - 1)],
                vec![vec![0.8, 0.2], vec![0.25, 0.75]],
            )
        };
        builder
            .set_distribution(&format!("x{k}"), parents, rows)
            .expect("valid table");
    }
    builder.build().expect("complete network")
}

fn bench_gradient(c: &mut Criterion) {
    let raw = parse_bif(GRADIENT_BIF).expect("built-in network parses");
    let network = prepare(&raw, CyclePolicy::Reject).expect("built-in network is acyclic");
    let options = InferenceOptions::default();

    let mut group = c.benchmark_group("gradient");
    for (name, evidence) in [("prior", ""), ("d_true", "d=true"), ("e_false_b_true", "e=false,b=true")] {
        let evidence: Evidence = evidence.parse().expect("evidence parses");
        group.bench_with_input(BenchmarkId::new("infer", name), &evidence, |b, ev| {
            b.iter(|| {
                let result = infer(black_box(&network), black_box(ev), &options)
                    .expect("inference should succeed");
                black_box(result.evidence_probability);
            })
        });
    }

    group.bench_function("parse_and_prepare", |b| {
        b.iter(|| {
            let raw = parse_bif(black_box(GRADIENT_BIF)).expect("parses");
            black_box(prepare(&raw, CyclePolicy::Reject).expect("acyclic"));
        })
    });
    group.finish();
}

fn bench_chain(c: &mut Criterion) {
    let options = InferenceOptions::default();
    let mut group = c.benchmark_group("chain");
    // Joint size doubles per step; 16 variables is 65k configurations.
    for n in [8usize, 12, 16] {
        let network = prepare(&chain(n), CyclePolicy::Reject).expect("chain is acyclic");
        let evidence: Evidence = format!("x{}=on", n - 1).parse().expect("evidence parses");
        group.bench_with_input(BenchmarkId::new("infer", n), &network, |b, net| {
            b.iter(|| {
                let result = infer(black_box(net), &evidence, &options)
                    .expect("inference should succeed");
                black_box(result.joint_states);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_gradient, bench_chain);
criterion_main!(benches);
