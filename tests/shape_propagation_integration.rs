//! Integration tests for shape propagation
//!
//! These tests drive the graph store the way the editor does:
//! - Building chains and branches through the public API
//! - Loading documents and templates
//! - Properties of the propagator over random acyclic graphs

mod common;

use common::builders::{chain, PipelineBuilder};
use proptest::prelude::*;
use std::collections::HashMap;
use thoth_studio::pipeline::{
    registry, templates, BlockId, BlockInstance, ConfigValue, Connection, DataType, GraphStore,
    Position, Shape, ShapeConvention, ShapePropagator,
};

fn shape_of(store: &GraphStore, id: &BlockId) -> (Shape, Shape) {
    let block = store.block(id).unwrap();
    (block.input_shape.clone(), block.output_shape.clone())
}

#[test]
fn test_csi_chain_shapes() {
    let (store, ids) = chain(
        DataType::Csi,
        &[
            "csi_loader",
            "amplitude_extractor",
            "subcarrier_filter",
            "windowing",
            "flatten",
        ],
    );

    assert_eq!(shape_of(&store, &ids[0]).1, Shape::from([1000, 128]));
    assert_eq!(shape_of(&store, &ids[1]).1, Shape::from([1000, 64]));
    assert_eq!(shape_of(&store, &ids[2]).1, Shape::from([1000, 54]));
    assert_eq!(shape_of(&store, &ids[3]).1, Shape::from([19, 100, 54]));
    assert_eq!(shape_of(&store, &ids[4]).1, Shape::from([19, 5400]));
    assert!(store.shape_errors().is_empty());
}

#[test]
fn test_config_change_flows_downstream() {
    let (mut store, ids) = chain(DataType::Csi, &["csi_loader", "windowing", "flatten"]);

    store
        .set_config_value(&ids[0], "samples", ConfigValue::Int(500))
        .unwrap();
    assert_eq!(shape_of(&store, &ids[1]).1, Shape::from([9, 100, 128]));

    store
        .set_config_value(&ids[1], "window_size", ConfigValue::Int(50))
        .unwrap();
    assert_eq!(shape_of(&store, &ids[2]).1, Shape::from([19, 6400]));
}

#[test]
fn test_concat_branches_sum_features() {
    let doc = PipelineBuilder::new("fusion")
        .block("src", "csi_loader")
        .block("amp", "amplitude_extractor")
        .block("phase", "phase_extractor")
        .block("cat", "feature_concat")
        .connect("src", "amp")
        .connect("src", "phase")
        .connect("amp", "cat")
        .connect("phase", "cat")
        .build();

    let mut store = GraphStore::new(DataType::Csi);
    store.load_document(&doc).unwrap();

    let cat = BlockId::from("cat");
    assert_eq!(shape_of(&store, &cat).0, Shape::from([1000, 128]));
    assert!(store.shape_errors().is_empty());
}

#[test]
fn test_rank_mismatch_is_advisory() {
    let (mut store, ids) = chain(DataType::Csi, &["csi_loader", "subcarrier_filter"]);
    let window = store.add_block("windowing").unwrap();
    let concat = store.add_block("feature_concat").unwrap();
    assert!(store.add_connection(&ids[0], &window));
    assert!(store.add_connection(&window, &concat));
    assert!(store.add_connection(&ids[1], &concat));

    let message = store.shape_errors().get(&concat).unwrap();
    assert_eq!(message, "Shape mismatch: 2D → 3D");
    // Shapes are still computed for every block
    assert_eq!(shape_of(&store, &concat).0.rank(), 3);
    assert_eq!(store.blocks().len(), 4);
}

#[test]
fn test_delete_block_reverts_to_default_input() {
    let (mut store, ids) = chain(DataType::Imu, &["imu_loader", "windowing"]);
    assert_eq!(shape_of(&store, &ids[1]).0, Shape::from([1000, 6]));

    store.set_config_value(&ids[0], "samples", ConfigValue::Int(400)).unwrap();
    assert_eq!(shape_of(&store, &ids[1]).0, Shape::from([400, 6]));

    store.delete_block(&ids[0]).unwrap();
    assert!(store.connections().is_empty());
    assert_eq!(shape_of(&store, &ids[1]).0, DataType::Imu.default_input_shape());
}

#[test]
fn test_cycle_is_reported_not_fatal() {
    let doc = PipelineBuilder::new("loop")
        .block("a", "standardize")
        .block("b", "normalize")
        .connect("a", "b")
        .connect("b", "a")
        .build();

    let mut store = GraphStore::new(DataType::Imu);
    store.load_document(&doc).unwrap();
    assert!(!store.cycles().is_empty());
    assert_eq!(store.blocks().len(), 2);

    let strict = ShapePropagator::new(DataType::Imu).try_propagate(&doc.blocks, &doc.connections);
    assert!(strict.is_err());
}

#[test]
fn test_linear_convention_until_first_connection() {
    let mut store = GraphStore::new(DataType::Csi).with_convention(ShapeConvention::Linear);
    let loader = store.add_block("csi_loader").unwrap();
    store
        .set_config_value(&loader, "samples", ConfigValue::Int(500))
        .unwrap();
    let amp = store.add_block("amplitude_extractor").unwrap();
    assert_eq!(shape_of(&store, &amp).0, Shape::from([500, 128]));

    // A connection switches to graph propagation; the unconnected block falls
    // back to the data type default.
    let flatten = store.add_block("flatten").unwrap();
    assert!(store.add_connection(&loader, &flatten));
    assert_eq!(shape_of(&store, &amp).0, DataType::Csi.default_input_shape());
}

#[test]
fn test_every_template_propagates_cleanly() {
    for template in templates::all() {
        let mut store = GraphStore::new(template.data_type);
        store.apply_template(template).unwrap();
        assert!(
            store.shape_errors().is_empty(),
            "{}: {:?}",
            template.name,
            store.shape_errors()
        );
        assert!(store.cycles().is_empty(), "{}", template.name);
        assert_eq!(store.data_type(), template.data_type);
    }
}

#[test]
fn test_document_round_trip_keeps_shapes() {
    let mut store = GraphStore::new(DataType::Csi);
    store
        .apply_template(templates::find("CSI amplitude + phase fusion").unwrap())
        .unwrap();
    let json = store.to_document("fusion", "").to_json_pretty().unwrap();

    let doc = thoth_studio::pipeline::PipelineDocument::from_json(&json).unwrap();
    let mut loaded = GraphStore::new(DataType::Csi);
    loaded.load_document(&doc).unwrap();
    assert_eq!(loaded.blocks(), store.blocks());
}

// ==================== Properties ====================

const CSI_TYPES: &[&str] = &[
    "amplitude_extractor",
    "subcarrier_filter",
    "normalize",
    "standardize",
    "windowing",
    "flatten",
    "fft",
    "downsample",
    "feature_extraction",
    "pca",
    "feature_concat",
    "average_fusion",
];

fn instance(i: usize, type_id: &str) -> BlockInstance {
    let descriptor = registry::lookup(type_id).unwrap();
    BlockInstance::new(
        BlockId::new(format!("block_{i}")),
        descriptor,
        Position::new(i as f32 * 200.0, 0.0),
    )
}

/// A loader followed by random transforms with forward-only edges.
fn arb_dag() -> impl Strategy<Value = (Vec<BlockInstance>, Vec<Connection>)> {
    (1usize..8).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::sample::select(CSI_TYPES), n),
            prop::collection::vec((0..=n, 0..=n), 0..n * 2),
        )
            .prop_map(|(types, raw_edges)| {
                let mut blocks = vec![instance(0, "csi_loader")];
                blocks.extend(types.iter().enumerate().map(|(i, t)| instance(i + 1, t)));

                let mut connections: Vec<Connection> = Vec::new();
                for (a, b) in raw_edges {
                    let (from, to) = (a.min(b), a.max(b));
                    if from == to || to == 0 {
                        continue;
                    }
                    let conn = Connection::new(blocks[from].id.clone(), blocks[to].id.clone());
                    if !connections.contains(&conn) {
                        connections.push(conn);
                    }
                }
                (blocks, connections)
            })
    })
}

fn shapes_by_id(blocks: &[BlockInstance]) -> HashMap<BlockId, (Shape, Shape)> {
    blocks
        .iter()
        .map(|b| (b.id.clone(), (b.input_shape.clone(), b.output_shape.clone())))
        .collect()
}

proptest! {
    #[test]
    fn prop_propagation_is_idempotent((blocks, connections) in arb_dag()) {
        let propagator = ShapePropagator::new(DataType::Csi);
        let first = propagator.propagate(&blocks, &connections);
        let second = propagator.propagate(&first.blocks, &connections);
        prop_assert_eq!(&first.blocks, &second.blocks);
        prop_assert_eq!(&first.shape_errors, &second.shape_errors);
        prop_assert!(first.cycles.is_empty());
    }

    #[test]
    fn prop_block_order_does_not_matter((blocks, connections) in arb_dag()) {
        let propagator = ShapePropagator::new(DataType::Csi);
        let forward = propagator.propagate(&blocks, &connections);

        let reversed: Vec<BlockInstance> = blocks.iter().rev().cloned().collect();
        let backward = propagator.propagate(&reversed, &connections);

        prop_assert_eq!(shapes_by_id(&forward.blocks), shapes_by_id(&backward.blocks));
        prop_assert_eq!(&forward.shape_errors, &backward.shape_errors);
    }

    #[test]
    fn prop_every_block_gets_an_output((blocks, connections) in arb_dag()) {
        let report = ShapePropagator::new(DataType::Csi).propagate(&blocks, &connections);
        prop_assert_eq!(report.blocks.len(), blocks.len());
        prop_assert_eq!(report.order.len(), blocks.len());
        for block in &report.blocks {
            prop_assert!(block.output_shape.rank() > 0, "{} has no output", block.id);
        }
    }
}
