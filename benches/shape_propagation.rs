//! Benchmarks for shape propagation
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use thoth_studio::pipeline::{
    linear, registry, templates, BlockId, BlockInstance, ConfigValue, Connection, DataType,
    GraphStore, Position, ShapePropagator,
};

const STAGES: &[&str] = &["normalize", "windowing", "fft", "flatten", "pca"];

/// One loader feeding `branches` parallel chains that meet in a concat.
fn fan_in_graph(branches: usize) -> (Vec<BlockInstance>, Vec<Connection>) {
    let block = |id: String, type_id: &str| {
        BlockInstance::new(
            BlockId::new(id),
            registry::lookup(type_id).unwrap(),
            Position::default(),
        )
    };

    let mut blocks = vec![block("loader".into(), "csi_loader")];
    let mut connections = Vec::new();
    let concat = BlockId::from("concat");

    for b in 0..branches {
        let mut previous = blocks[0].id.clone();
        for (s, type_id) in STAGES.iter().enumerate() {
            let instance = block(format!("b{b}_s{s}"), type_id);
            connections.push(Connection::new(previous, instance.id.clone()));
            previous = instance.id.clone();
            blocks.push(instance);
        }
        connections.push(Connection::new(previous, concat.clone()));
    }
    blocks.push(block("concat".into(), "feature_concat"));

    (blocks, connections)
}

fn bench_graph_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_propagation");
    let propagator = ShapePropagator::new(DataType::Csi);

    for branches in [1, 8, 64] {
        let (blocks, connections) = fan_in_graph(branches);
        group.throughput(Throughput::Elements(blocks.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("fan_in", branches),
            &(blocks, connections),
            |b, (blocks, connections)| {
                b.iter(|| propagator.propagate(black_box(blocks), black_box(connections)))
            },
        );
    }

    group.finish();
}

fn bench_linear_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_chain");

    for len in [10, 100] {
        let (blocks, _) = fan_in_graph(len / STAGES.len());
        let chain: Vec<BlockInstance> = blocks.into_iter().take(len).collect();
        group.bench_with_input(BenchmarkId::from_parameter(len), &chain, |b, chain| {
            b.iter(|| {
                let out = linear::propagate_chain(black_box(chain), DataType::Csi);
                linear::validate_chain(&out)
            })
        });
    }

    group.finish();
}

fn bench_store_edit(c: &mut Criterion) {
    let template = templates::find("CSI amplitude + phase fusion").unwrap();
    let mut store = GraphStore::new(DataType::Csi);
    store.apply_template(template).unwrap();
    let loader = BlockId::from("block_0");
    let mut samples = 1000;

    c.bench_function("store_config_edit", |b| {
        b.iter(|| {
            samples = if samples == 1000 { 2000 } else { 1000 };
            store
                .set_config_value(&loader, "samples", ConfigValue::Int(samples))
                .unwrap();
            black_box(store.shape_errors().len())
        })
    });
}

criterion_group!(
    benches,
    bench_graph_propagation,
    bench_linear_chain,
    bench_store_edit
);
criterion_main!(benches);
