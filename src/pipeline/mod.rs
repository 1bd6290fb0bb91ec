//! Block-graph model and shape inference.
//!
//! Blocks (loaders, extractors, filters, transforms, combiners) are placed
//! on a canvas and wired output → input. After every edit the graph store
//! recomputes every block's input and output shape:
//!
//! ```text
//! [csi_loader] ──► [amplitude_extractor] ──► [subcarrier_filter] ──► [windowing]
//!   [1000,128]         [1000,64]                [1000,54]            [19,100,54]
//! ```
//!
//! - `registry` is a static catalogue of block types and their shape functions.
//! - `store` owns the editable graph (`GraphStore`).
//! - `propagate` is the graph-driven shape calculator; `linear` is the legacy
//!   chain calculator kept for the optional linear convention.

pub mod block;
pub mod config;
pub mod data_type;
pub mod document;
pub mod error;
pub mod id;
pub mod linear;
pub mod port;
pub mod propagate;
pub mod registry;
pub mod shape;
pub mod store;
pub mod templates;
pub mod transforms;

pub use block::{BlockInstance, Connection, Position};
pub use config::{BlockConfig, ConfigValue};
pub use data_type::DataType;
pub use document::{CreatePipelineRequest, PipelineDocument, PipelineSummary, UpdatePipelineRequest};
pub use error::{PipelineError, PipelineResult};
pub use id::{BlockId, BlockIdGenerator};
pub use port::PortKind;
pub use propagate::{ShapePropagator, ShapeReport};
pub use registry::{BlockCategory, BlockTypeDescriptor, InputMerge};
pub use shape::Shape;
pub use store::{CanvasBounds, GraphStore, ShapeConvention};
pub use templates::Template;
