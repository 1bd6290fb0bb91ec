//! Test data builders for pipelines

use thoth_studio::pipeline::{
    registry, BlockId, BlockInstance, Connection, DataType, GraphStore, PipelineDocument, Position,
};

/// Builder for hand-written pipeline documents
pub struct PipelineBuilder {
    doc: PipelineDocument,
}

impl PipelineBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            doc: PipelineDocument::new(name, ""),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.doc.id = Some(id.to_string());
        self
    }

    /// Add a block of `type_id` laid out left to right.
    pub fn block(mut self, id: &str, type_id: &str) -> Self {
        let descriptor = registry::lookup(type_id)
            .unwrap_or_else(|| panic!("unknown block type {type_id}"));
        let x = 40.0 + 220.0 * self.doc.blocks.len() as f32;
        self.doc
            .blocks
            .push(BlockInstance::new(BlockId::from(id), descriptor, Position::new(x, 40.0)));
        self
    }

    pub fn connect(mut self, from: &str, to: &str) -> Self {
        self.doc.connections.push(Connection::new(from, to));
        self
    }

    pub fn build(self) -> PipelineDocument {
        self.doc
    }
}

/// Build a store and wire `type_ids` into a chain through the public API.
pub fn chain(data_type: DataType, type_ids: &[&str]) -> (GraphStore, Vec<BlockId>) {
    let mut store = GraphStore::new(data_type);
    let ids: Vec<BlockId> = type_ids
        .iter()
        .map(|t| store.add_block(t).expect("add block"))
        .collect();
    for pair in ids.windows(2) {
        assert!(store.add_connection(&pair[0], &pair[1]), "connect {:?}", pair);
    }
    (store, ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_builder() {
        let doc = PipelineBuilder::new("p")
            .id("p-1")
            .block("a", "imu_loader")
            .block("b", "standardize")
            .connect("a", "b")
            .build();

        assert_eq!(doc.id.as_deref(), Some("p-1"));
        assert_eq!(doc.blocks[1].position, Position::new(260.0, 40.0));
        assert_eq!(doc.connections.len(), 1);
    }
}
