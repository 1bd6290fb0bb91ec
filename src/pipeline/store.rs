//! The in-memory pipeline graph edited by the UI.
//!
//! Every structural mutation bumps `generation` and recomputes all shapes
//! before returning, so `blocks()` and `shape_errors()` always describe the
//! current graph. Moves only change geometry; they recompute but keep the
//! generation.

use crate::pipeline::block::{BlockInstance, Connection, Position};
use crate::pipeline::config::{BlockConfig, ConfigValue};
use crate::pipeline::data_type::DataType;
use crate::pipeline::document::{CreatePipelineRequest, PipelineDocument, UpdatePipelineRequest};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::{BlockId, BlockIdGenerator};
use crate::pipeline::linear;
use crate::pipeline::propagate::ShapePropagator;
use crate::pipeline::registry;
use crate::pipeline::templates::Template;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Gap between automatically placed blocks.
const LAYOUT_GAP: f32 = 40.0;

/// Which shape calculator drives the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeConvention {
    /// Shapes follow the explicit connections.
    #[default]
    Graph,
    /// Blocks form a chain in insertion order until the first connection
    /// is drawn.
    Linear,
}

/// Canvas size and the fixed block footprint used for layout and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    pub width: f32,
    pub height: f32,
    pub block_width: f32,
    pub block_height: f32,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 1200.0,
            block_width: 180.0,
            block_height: 90.0,
        }
    }
}

impl CanvasBounds {
    pub fn max_x(&self) -> f32 {
        (self.width - self.block_width).max(0.0)
    }

    pub fn max_y(&self) -> f32 {
        (self.height - self.block_height).max(0.0)
    }

    /// Keep a block fully inside the canvas.
    pub fn clamp(&self, pos: Position) -> Position {
        let x = if pos.x.is_finite() { pos.x } else { 0.0 };
        let y = if pos.y.is_finite() { pos.y } else { 0.0 };
        Position::new(x.clamp(0.0, self.max_x()), y.clamp(0.0, self.max_y()))
    }

    pub fn block_size(&self) -> egui::Vec2 {
        egui::vec2(self.block_width, self.block_height)
    }
}

/// Blocks, connections and the derived shape state.
#[derive(Debug, Clone)]
pub struct GraphStore {
    blocks: Vec<BlockInstance>,
    connections: Vec<Connection>,
    data_type: DataType,
    convention: ShapeConvention,
    bounds: CanvasBounds,
    ids: BlockIdGenerator,
    shape_errors: BTreeMap<BlockId, String>,
    cycles: Vec<BlockId>,
    generation: u64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(DataType::default())
    }
}

impl GraphStore {
    pub fn new(data_type: DataType) -> Self {
        Self {
            blocks: Vec::new(),
            connections: Vec::new(),
            data_type,
            convention: ShapeConvention::default(),
            bounds: CanvasBounds::default(),
            ids: BlockIdGenerator::new(),
            shape_errors: BTreeMap::new(),
            cycles: Vec::new(),
            generation: 0,
        }
    }

    pub fn with_bounds(mut self, bounds: CanvasBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_convention(mut self, convention: ShapeConvention) -> Self {
        self.convention = convention;
        self.recompute();
        self
    }

    // ── Accessors ──

    pub fn blocks(&self) -> &[BlockInstance] {
        &self.blocks
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn block(&self, id: &BlockId) -> Option<&BlockInstance> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.block(id).is_some()
    }

    pub fn shape_errors(&self) -> &BTreeMap<BlockId, String> {
        &self.shape_errors
    }

    pub fn cycles(&self) -> &[BlockId] {
        &self.cycles
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn convention(&self) -> ShapeConvention {
        self.convention
    }

    pub fn bounds(&self) -> &CanvasBounds {
        &self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Incoming connection count per block, used to draw combiner hints.
    pub fn incoming_count(&self, id: &BlockId) -> usize {
        self.connections.iter().filter(|c| &c.to == id).count()
    }

    // ── Mutations ──

    /// Place a new block of `type_id` next to the existing ones.
    pub fn add_block(&mut self, type_id: &str) -> PipelineResult<BlockId> {
        let descriptor = registry::lookup(type_id)
            .ok_or_else(|| PipelineError::UnknownBlockType(type_id.to_string()))?;

        let id = self.ids.next_id(self.blocks.iter().map(|b| &b.id));
        let position = self.next_position();
        self.blocks
            .push(BlockInstance::new(id.clone(), descriptor, position));
        self.touch();

        tracing::info!(
            "Added block {} ({}) at ({:.0}, {:.0})",
            id,
            type_id,
            position.x,
            position.y
        );
        Ok(id)
    }

    /// Remove a block and every connection touching it.
    pub fn delete_block(&mut self, id: &BlockId) -> PipelineResult<()> {
        let idx = self.index_of(id)?;
        self.blocks.remove(idx);
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        self.touch();

        tracing::info!(
            "Deleted block {} and {} connection(s)",
            id,
            before - self.connections.len()
        );
        Ok(())
    }

    /// Connect `from`'s output to `to`'s input. Invalid requests are
    /// rejected silently and return `false`.
    pub fn add_connection(&mut self, from: &BlockId, to: &BlockId) -> bool {
        if let Err(reason) = self.check_connection(from, to) {
            tracing::debug!("Rejected connection {} -> {}: {}", from, to, reason);
            return false;
        }
        self.connections.push(Connection::new(from.clone(), to.clone()));
        self.touch();
        tracing::info!("Connected {} -> {}", from, to);
        true
    }

    pub fn delete_connection(&mut self, from: &BlockId, to: &BlockId) -> bool {
        let before = self.connections.len();
        self.connections
            .retain(|c| !(&c.from == from && &c.to == to));
        if self.connections.len() == before {
            return false;
        }
        self.touch();
        tracing::info!("Disconnected {} -> {}", from, to);
        true
    }

    /// Replace a block's configuration.
    pub fn update_block_config(&mut self, id: &BlockId, config: BlockConfig) -> PipelineResult<()> {
        let idx = self.index_of(id)?;
        self.blocks[idx].config = config;
        self.touch();
        tracing::info!("Updated config of {}", id);
        Ok(())
    }

    /// Edit a single configuration key.
    pub fn set_config_value(
        &mut self,
        id: &BlockId,
        key: &str,
        value: ConfigValue,
    ) -> PipelineResult<()> {
        let idx = self.index_of(id)?;
        tracing::info!("Set {}.{} = {}", id, key, value.display_text());
        self.blocks[idx].set_config_value(key, value);
        self.touch();
        Ok(())
    }

    /// Move a block, clamped to the canvas.
    pub fn move_block(&mut self, id: &BlockId, position: Position) -> PipelineResult<()> {
        let idx = self.index_of(id)?;
        self.blocks[idx].position = self.bounds.clamp(position);
        self.recompute();
        Ok(())
    }

    pub fn set_data_type(&mut self, data_type: DataType) {
        if self.data_type == data_type {
            return;
        }
        tracing::info!("Data type changed: {} -> {}", self.data_type, data_type);
        self.data_type = data_type;
        self.touch();
    }

    pub fn set_convention(&mut self, convention: ShapeConvention) {
        if self.convention != convention {
            self.convention = convention;
            self.touch();
        }
    }

    pub fn set_bounds(&mut self, bounds: CanvasBounds) {
        self.bounds = bounds;
    }

    /// Replace the whole graph with a stored document.
    ///
    /// Connections that are dangling, self-loops or duplicates are dropped.
    /// Blocks of unknown type are kept with their stored shapes.
    pub fn load_document(&mut self, doc: &PipelineDocument) -> PipelineResult<()> {
        doc.check_unique_ids()?;

        let ids: HashSet<&BlockId> = doc.blocks.iter().map(|b| &b.id).collect();
        let mut seen = HashSet::new();
        let mut connections = Vec::with_capacity(doc.connections.len());
        for conn in &doc.connections {
            if conn.is_self_loop() {
                tracing::warn!("Dropping self-loop connection {}", conn);
            } else if !ids.contains(&conn.from) || !ids.contains(&conn.to) {
                tracing::warn!("Dropping dangling connection {}", conn);
            } else if !seen.insert(conn) {
                tracing::warn!("Dropping duplicate connection {}", conn);
            } else {
                connections.push(conn.clone());
            }
        }

        for block in doc.blocks.iter().filter(|b| b.descriptor().is_none()) {
            tracing::warn!("Block {} has unknown type '{}'", block.id, block.type_id);
        }

        self.blocks = doc.blocks.clone();
        self.connections = connections;
        self.ids = BlockIdGenerator::new();
        self.ids.observe(self.blocks.iter().map(|b| &b.id));
        self.touch();

        tracing::info!(
            "Loaded pipeline '{}' ({} blocks, {} connections)",
            doc.name,
            self.blocks.len(),
            self.connections.len()
        );
        Ok(())
    }

    pub fn apply_template(&mut self, template: &Template) -> PipelineResult<()> {
        self.data_type = template.data_type;
        self.load_document(&template.document())
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.connections.clear();
        self.ids = BlockIdGenerator::new();
        self.touch();
    }

    // ── Persistence views ──

    pub fn to_document(&self, name: &str, description: &str) -> PipelineDocument {
        PipelineDocument {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
            blocks: self.blocks.clone(),
            connections: self.connections.clone(),
        }
    }

    pub fn create_request(&self, name: &str, description: &str) -> CreatePipelineRequest {
        CreatePipelineRequest {
            name: name.to_string(),
            description: description.to_string(),
            blocks: self.blocks.clone(),
            connections: self.connections.clone(),
        }
    }

    pub fn update_request(&self) -> UpdatePipelineRequest {
        UpdatePipelineRequest {
            blocks: self.blocks.clone(),
            connections: self.connections.clone(),
        }
    }

    // ── Internals ──

    fn index_of(&self, id: &BlockId) -> PipelineResult<usize> {
        self.blocks
            .iter()
            .position(|b| &b.id == id)
            .ok_or_else(|| PipelineError::UnknownBlock(id.clone()))
    }

    fn check_connection(&self, from: &BlockId, to: &BlockId) -> Result<(), &'static str> {
        if from == to {
            return Err("self-loop");
        }
        if !self.contains(from) {
            return Err("unknown source block");
        }
        let target = self.block(to).ok_or("unknown target block")?;
        if target.is_source() {
            return Err("target has no input port");
        }
        if self
            .connections
            .iter()
            .any(|c| &c.from == from && &c.to == to)
        {
            return Err("duplicate");
        }
        Ok(())
    }

    /// Right of the right-most block, wrapping to a new row at the canvas edge.
    fn next_position(&self) -> Position {
        let Some(rightmost) = self
            .blocks
            .iter()
            .max_by(|a, b| a.position.x.total_cmp(&b.position.x))
        else {
            return self.bounds.clamp(Position::new(LAYOUT_GAP, LAYOUT_GAP));
        };

        let x = rightmost.position.x + self.bounds.block_width + LAYOUT_GAP;
        let candidate = if x > self.bounds.max_x() {
            let lowest = self
                .blocks
                .iter()
                .map(|b| b.position.y)
                .fold(0.0_f32, f32::max);
            Position::new(LAYOUT_GAP, lowest + self.bounds.block_height + LAYOUT_GAP)
        } else {
            Position::new(x, rightmost.position.y)
        };
        let candidate = self.bounds.clamp(candidate);
        if !self.overlaps_block(candidate) {
            return candidate;
        }

        // Canvas is full along the preferred path: take the first free grid slot.
        let step_x = self.bounds.block_width + LAYOUT_GAP;
        let step_y = self.bounds.block_height + LAYOUT_GAP;
        let mut y = LAYOUT_GAP.min(self.bounds.max_y());
        while y <= self.bounds.max_y() {
            let mut x = LAYOUT_GAP.min(self.bounds.max_x());
            while x <= self.bounds.max_x() {
                let slot = Position::new(x, y);
                if !self.overlaps_block(slot) {
                    return slot;
                }
                x += step_x;
            }
            y += step_y;
        }
        candidate
    }

    fn overlaps_block(&self, pos: Position) -> bool {
        self.blocks.iter().any(|b| {
            (b.position.x - pos.x).abs() < self.bounds.block_width
                && (b.position.y - pos.y).abs() < self.bounds.block_height
        })
    }

    /// Structural change: bump the generation and recompute.
    fn touch(&mut self) {
        self.generation += 1;
        self.recompute();
    }

    /// Full shape recomputation with the active convention.
    fn recompute(&mut self) {
        if self.convention == ShapeConvention::Linear && self.connections.is_empty() {
            self.blocks = linear::propagate_chain(&self.blocks, self.data_type);
            self.shape_errors = linear::validate_chain(&self.blocks);
            self.cycles.clear();
        } else {
            let report = ShapePropagator::new(self.data_type).propagate(&self.blocks, &self.connections);
            if report.has_cycles() && report.cycles != self.cycles {
                tracing::warn!("Pipeline graph has a cycle through {:?}", report.cycles);
            }
            self.blocks = report.blocks;
            self.shape_errors = report.shape_errors;
            self.cycles = report.cycles;
        }

        tracing::debug!(
            "Recomputed shapes: {} blocks, {} error(s) (gen {})",
            self.blocks.len(),
            self.shape_errors.len(),
            self.generation
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::shape::Shape;
    use crate::pipeline::templates;

    fn id(s: &str) -> BlockId {
        BlockId::from(s)
    }

    fn csi_chain(store: &mut GraphStore) -> (BlockId, BlockId, BlockId) {
        let a = store.add_block("csi_loader").unwrap();
        let b = store.add_block("amplitude_extractor").unwrap();
        let c = store.add_block("subcarrier_filter").unwrap();
        assert!(store.add_connection(&a, &b));
        assert!(store.add_connection(&b, &c));
        (a, b, c)
    }

    #[test]
    fn test_add_block_defaults() {
        let mut store = GraphStore::new(DataType::Csi);
        let a = store.add_block("csi_loader").unwrap();
        let block = store.block(&a).unwrap();
        assert_eq!(block.input_shape, Shape::source());
        assert_eq!(block.output_shape, Shape::from([1000, 128]));
        assert_eq!(block.config.get_usize("subcarriers"), Some(128));
        assert_eq!(block.position, Position::new(40.0, 40.0));
    }

    #[test]
    fn test_add_unknown_type() {
        let mut store = GraphStore::default();
        assert_eq!(
            store.add_block("nope"),
            Err(PipelineError::UnknownBlockType("nope".into()))
        );
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_layout_places_right_then_wraps() {
        let bounds = CanvasBounds {
            width: 700.0,
            ..CanvasBounds::default()
        };
        let mut store = GraphStore::new(DataType::Csi).with_bounds(bounds);
        let ids: Vec<_> = (0..4).map(|_| store.add_block("normalize").unwrap()).collect();
        let pos = |i: usize| store.block(&ids[i]).unwrap().position;

        assert_eq!(pos(0), Position::new(40.0, 40.0));
        assert_eq!(pos(1), Position::new(260.0, 40.0));
        assert_eq!(pos(2), Position::new(480.0, 40.0));
        // 700 is past the last column (520): wraps below.
        assert_eq!(pos(3), Position::new(40.0, 170.0));
    }

    #[test]
    fn test_layout_never_stacks_when_canvas_fills() {
        // Room for two columns and three rows.
        let bounds = CanvasBounds {
            width: 480.0,
            height: 400.0,
            ..CanvasBounds::default()
        };
        let mut store = GraphStore::new(DataType::Csi).with_bounds(bounds);
        let ids: Vec<_> = (0..6).map(|_| store.add_block("normalize").unwrap()).collect();
        let positions: Vec<Position> = ids
            .iter()
            .map(|i| store.block(i).unwrap().position)
            .collect();

        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(
                    (a.x - b.x).abs() >= bounds.block_width
                        || (a.y - b.y).abs() >= bounds.block_height,
                    "{:?} overlaps {:?}",
                    a,
                    b
                );
            }
        }
        assert_eq!(positions[4], Position::new(260.0, 170.0));
        assert_eq!(positions[5], Position::new(260.0, 300.0));

        // A full canvas still places the block inside the bounds.
        let extra = store.add_block("normalize").unwrap();
        let pos = store.block(&extra).unwrap().position;
        assert!(pos.x <= bounds.max_x() && pos.y <= bounds.max_y());
    }

    #[test]
    fn test_huge_copies_saturate_through_store() {
        let mut store = GraphStore::new(DataType::Csi);
        let a = store.add_block("csi_loader").unwrap();
        let b = store.add_block("data_augmentation").unwrap();
        assert!(store.add_connection(&a, &b));
        store
            .set_config_value(&b, "copies", ConfigValue::Int(i64::MAX))
            .unwrap();
        assert_eq!(
            store.block(&b).unwrap().output_shape,
            Shape::from([usize::MAX, 128])
        );
    }

    #[test]
    fn test_connection_rejections() {
        let mut store = GraphStore::new(DataType::Csi);
        let (a, b, _) = csi_chain(&mut store);
        let generation = store.generation();

        assert!(!store.add_connection(&a, &a));
        assert!(!store.add_connection(&a, &b));
        assert!(!store.add_connection(&b, &a)); // into a loader
        assert!(!store.add_connection(&a, &id("block_99")));
        assert_eq!(store.connections().len(), 2);
        assert_eq!(store.generation(), generation);
    }

    #[test]
    fn test_shapes_recomputed_on_config_edit() {
        let mut store = GraphStore::new(DataType::Csi);
        let (_, _, c) = csi_chain(&mut store);
        assert_eq!(store.block(&c).unwrap().output_shape, Shape::from([1000, 54]));

        store
            .set_config_value(&c, "end2", ConfigValue::Int(40))
            .unwrap();
        assert_eq!(store.block(&c).unwrap().output_shape, Shape::from([1000, 34]));
    }

    #[test]
    fn test_delete_block_cleans_connections() {
        let mut store = GraphStore::new(DataType::Csi);
        let (_, b, c) = csi_chain(&mut store);
        store.delete_block(&b).unwrap();

        assert!(store.connections().is_empty());
        assert!(!store.shape_errors().contains_key(&b));
        // Orphaned filter falls back to the data-type default.
        assert_eq!(store.block(&c).unwrap().input_shape, Shape::from([1000, 128]));
        assert_eq!(store.delete_block(&b), Err(PipelineError::UnknownBlock(b.clone())));
    }

    #[test]
    fn test_ids_never_reused() {
        let mut store = GraphStore::default();
        let a = store.add_block("flatten").unwrap();
        store.delete_block(&a).unwrap();
        let b = store.add_block("flatten").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_move_clamps_without_generation_bump() {
        let mut store = GraphStore::default();
        let a = store.add_block("pca").unwrap();
        let generation = store.generation();
        store.move_block(&a, Position::new(-50.0, 5000.0)).unwrap();

        assert_eq!(store.block(&a).unwrap().position, Position::new(0.0, 1110.0));
        assert_eq!(store.generation(), generation);
    }

    #[test]
    fn test_data_type_changes_inputless_default() {
        let mut store = GraphStore::new(DataType::Csi);
        let n = store.add_block("normalize").unwrap();
        store.set_data_type(DataType::Mfcw);
        assert_eq!(store.block(&n).unwrap().input_shape, Shape::from([1000, 256]));
    }

    #[test]
    fn test_linear_convention_until_first_connection() {
        let mut store = GraphStore::new(DataType::Csi).with_convention(ShapeConvention::Linear);
        let a = store.add_block("csi_loader").unwrap();
        let b = store.add_block("amplitude_extractor").unwrap();
        let c = store.add_block("flatten").unwrap();
        assert_eq!(store.block(&b).unwrap().input_shape, Shape::from([1000, 128]));

        // Once wired, the graph decides: `b` is now unconnected upstream.
        assert!(store.add_connection(&a, &c));
        assert_eq!(store.block(&b).unwrap().input_shape, Shape::from([1000, 128]));
        assert_eq!(store.block(&c).unwrap().input_shape, Shape::from([1000, 128]));
    }

    #[test]
    fn test_load_document_drops_bad_connections() {
        let doc: PipelineDocument = serde_json::from_str(
            r#"{"name": "stale", "blocks": [
                {"id": "block_4", "typeId": "csi_loader"},
                {"id": "block_7", "typeId": "wavelet_denoise", "outputShape": [1000, 32]}
            ], "connections": [
                {"from": "block_4", "to": "block_7"},
                {"from": "block_4", "to": "block_7"},
                {"from": "block_7", "to": "block_7"},
                {"from": "block_4", "to": "block_1"}
            ]}"#,
        )
        .unwrap();

        let mut store = GraphStore::new(DataType::Csi);
        store.load_document(&doc).unwrap();
        assert_eq!(store.connections(), &[Connection::new("block_4", "block_7")]);
        assert_eq!(
            store.block(&id("block_7")).unwrap().output_shape,
            Shape::from([1000, 32])
        );

        let next = store.add_block("flatten").unwrap();
        assert_eq!(next, id("block_8"));
    }

    #[test]
    fn test_apply_template_and_requests() {
        let mut store = GraphStore::new(DataType::Imu);
        let template = templates::find("CSI basic").unwrap();
        store.apply_template(template).unwrap();

        assert_eq!(store.data_type(), DataType::Csi);
        assert!(store.shape_errors().is_empty());
        let req = store.create_request("gestures", "first try");
        assert_eq!(req.blocks.len(), 5);
        assert_eq!(store.update_request().connections.len(), 4);

        store.clear();
        assert!(store.is_empty());
        assert!(store.connections().is_empty());
    }
}
