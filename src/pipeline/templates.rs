//! Built-in starting pipelines offered from the File menu.

use crate::pipeline::block::{BlockInstance, Connection, Position};
use crate::pipeline::data_type::DataType;
use crate::pipeline::document::PipelineDocument;
use crate::pipeline::id::BlockId;
use crate::pipeline::registry;
use crate::pipeline::shape::Shape;

/// A template pipeline. Pure data; never fetched from the backend.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub data_type: DataType,
    blocks: &'static [TemplateBlock],
    connections: &'static [(&'static str, &'static str)],
}

#[derive(Debug, Clone, Copy)]
struct TemplateBlock {
    id: &'static str,
    type_id: &'static str,
    x: f32,
    y: f32,
}

const fn tb(id: &'static str, type_id: &'static str, x: f32, y: f32) -> TemplateBlock {
    TemplateBlock { id, type_id, x, y }
}

impl Template {
    /// Materialize the template as an unsaved document with default configs.
    pub fn document(&self) -> PipelineDocument {
        let blocks = self
            .blocks
            .iter()
            .map(|b| {
                let descriptor = registry::lookup(b.type_id);
                BlockInstance {
                    id: BlockId::from(b.id),
                    type_id: b.type_id.to_string(),
                    config: descriptor.map(|d| d.default_config()).unwrap_or_default(),
                    input_shape: Shape::default(),
                    output_shape: Shape::default(),
                    position: Position::new(b.x, b.y),
                }
            })
            .collect();
        let connections = self
            .connections
            .iter()
            .map(|(from, to)| Connection::new(*from, *to))
            .collect();

        PipelineDocument {
            id: None,
            name: self.name.to_string(),
            description: self.description.to_string(),
            blocks,
            connections,
        }
    }
}

static TEMPLATES: &[Template] = &[
    Template {
        name: "CSI basic",
        description: "Amplitude, guard-band removal, windows and a flat feature vector.",
        data_type: DataType::Csi,
        blocks: &[
            tb("block_0", "csi_loader", 40.0, 40.0),
            tb("block_1", "amplitude_extractor", 260.0, 40.0),
            tb("block_2", "subcarrier_filter", 480.0, 40.0),
            tb("block_3", "windowing", 700.0, 40.0),
            tb("block_4", "flatten", 920.0, 40.0),
        ],
        connections: &[
            ("block_0", "block_1"),
            ("block_1", "block_2"),
            ("block_2", "block_3"),
            ("block_3", "block_4"),
        ],
    },
    Template {
        name: "IMU activity windows",
        description: "Filtered, standardized IMU streams cut into windows with statistics.",
        data_type: DataType::Imu,
        blocks: &[
            tb("block_0", "imu_loader", 40.0, 40.0),
            tb("block_1", "lowpass_filter", 260.0, 40.0),
            tb("block_2", "standardize", 480.0, 40.0),
            tb("block_3", "windowing", 700.0, 40.0),
            tb("block_4", "feature_extraction", 920.0, 40.0),
        ],
        connections: &[
            ("block_0", "block_1"),
            ("block_1", "block_2"),
            ("block_2", "block_3"),
            ("block_3", "block_4"),
        ],
    },
    Template {
        name: "CSI amplitude + phase fusion",
        description: "Amplitude and phase branches joined by feature concatenation.",
        data_type: DataType::Csi,
        blocks: &[
            tb("block_0", "csi_loader", 40.0, 160.0),
            tb("block_1", "amplitude_extractor", 260.0, 40.0),
            tb("block_2", "phase_extractor", 260.0, 280.0),
            tb("block_3", "normalize", 480.0, 40.0),
            tb("block_4", "standardize", 480.0, 280.0),
            tb("block_5", "feature_concat", 700.0, 160.0),
            tb("block_6", "windowing", 920.0, 160.0),
        ],
        connections: &[
            ("block_0", "block_1"),
            ("block_0", "block_2"),
            ("block_1", "block_3"),
            ("block_2", "block_4"),
            ("block_3", "block_5"),
            ("block_4", "block_5"),
            ("block_5", "block_6"),
        ],
    },
];

pub fn all() -> &'static [Template] {
    TEMPLATES
}

pub fn find(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.name == name)
}
