//! Block instances and connections placed on the canvas.

use crate::pipeline::config::{BlockConfig, ConfigValue};
use crate::pipeline::id::BlockId;
use crate::pipeline::registry::{self, BlockTypeDescriptor};
use crate::pipeline::shape::Shape;
use serde::{Deserialize, Serialize};

/// Canvas coordinates of a block's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_pos2(self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }
}

impl From<egui::Pos2> for Position {
    fn from(p: egui::Pos2) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// One node of the pipeline graph.
///
/// Shapes are derived data: they are overwritten by every propagation and
/// only kept here so documents can be stored and rendered as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInstance {
    pub id: BlockId,
    pub type_id: String,
    #[serde(default)]
    pub config: BlockConfig,
    #[serde(default)]
    pub input_shape: Shape,
    #[serde(default)]
    pub output_shape: Shape,
    #[serde(default)]
    pub position: Position,
}

impl BlockInstance {
    /// Create an instance with the descriptor's default configuration.
    pub fn new(id: BlockId, descriptor: &BlockTypeDescriptor, position: Position) -> Self {
        let input_shape = if descriptor.is_source {
            Shape::source()
        } else {
            Shape::default()
        };
        Self {
            id,
            type_id: descriptor.type_id.to_string(),
            config: descriptor.default_config(),
            input_shape,
            output_shape: Shape::default(),
            position,
        }
    }

    /// Registry entry for this block, `None` for removed types.
    pub fn descriptor(&self) -> Option<&'static BlockTypeDescriptor> {
        registry::lookup(&self.type_id)
    }

    pub fn is_source(&self) -> bool {
        self.descriptor().is_some_and(|d| d.is_source)
    }

    /// Human label: the descriptor name or the raw type id.
    pub fn display_name(&self) -> &str {
        match self.descriptor() {
            Some(d) => d.name,
            None => &self.type_id,
        }
    }

    pub fn set_config_value(&mut self, key: &str, value: ConfigValue) {
        self.config.insert(key, value);
    }
}

/// Directed edge from one block's output port to another block's input port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: BlockId,
    pub to: BlockId,
}

impl Connection {
    pub fn new(from: impl Into<BlockId>, to: impl Into<BlockId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn touches(&self, id: &BlockId) -> bool {
        &self.from == id || &self.to == id
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
