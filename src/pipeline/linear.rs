//! Legacy linear-chain shape calculator.
//!
//! Treats blocks as a sequence in stored order: each block consumes the
//! output of the block before it. Used only while a pipeline has no
//! connections and the linear convention is selected; once any connection
//! exists the graph propagator takes over.

use crate::pipeline::block::BlockInstance;
use crate::pipeline::data_type::DataType;
use crate::pipeline::id::BlockId;
use crate::pipeline::propagate::rank_mismatch_message;
use crate::pipeline::shape::Shape;
use std::collections::BTreeMap;

/// Recompute shapes assuming blocks were appended in sequence.
pub fn propagate_chain(blocks: &[BlockInstance], data_type: DataType) -> Vec<BlockInstance> {
    let mut out = blocks.to_vec();
    let mut previous: Option<Shape> = None;

    for block in &mut out {
        block.input_shape = if block.is_source() {
            Shape::source()
        } else {
            previous
                .take()
                .unwrap_or_else(|| data_type.default_input_shape())
        };
        if let Some(descriptor) = block.descriptor() {
            block.output_shape = descriptor.transform_shape(&block.input_shape, &block.config);
        }
        previous = Some(block.output_shape.clone());
    }

    out
}

/// Check each consecutive pair for rank and per-dimension mismatches.
pub fn validate_chain(blocks: &[BlockInstance]) -> BTreeMap<BlockId, String> {
    let mut errors = BTreeMap::new();

    for pair in blocks.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.is_source() {
            continue;
        }
        let expected = prev.output_shape.dims();
        let got = cur.input_shape.dims();

        if expected.len() != got.len() {
            errors.insert(cur.id.clone(), rank_mismatch_message(expected.len(), got.len()));
            continue;
        }
        if let Some((i, (e, g))) = expected
            .iter()
            .zip(got)
            .enumerate()
            .find(|(_, (e, g))| e != g)
        {
            errors.insert(
                cur.id.clone(),
                format!("Shape mismatch at dim {}: expected {}, got {}", i, e, g),
            );
        }
    }

    errors
}
