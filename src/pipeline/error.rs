//! Pipeline-specific error types.

use crate::pipeline::id::BlockId;
use thiserror::Error;

/// Errors that can occur within the pipeline graph.
///
/// Shape mismatches are not errors: they are reported as data in
/// [`ShapeReport`](crate::pipeline::propagate::ShapeReport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),

    #[error("Invalid connection: {0}")]
    InvalidConnection(String),

    #[error("Cycle detected in pipeline graph at {}", format_ids(.blocks))]
    CyclicGraph { blocks: Vec<BlockId> },

    #[error("Invalid pipeline document: {0}")]
    Document(String),
}

fn format_ids(ids: &[BlockId]) -> String {
    ids.iter()
        .map(BlockId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
