//! # Thoth Studio: visual pipeline editor
//!
//! Users compose data-processing pipelines for Thoth sensor data (IMU, WiFi
//! CSI, radar, image, video) by dropping typed blocks on a canvas and wiring
//! them together. Every edit re-runs shape propagation so each block shows the
//! tensor shape it receives and produces, and mismatches are flagged inline.
//!
//! ## Architecture
//!
//! - **Pipeline**: block registry, graph store and shape propagation (no UI)
//! - **Editor**: canvas viewport and hit testing
//! - **Backend**: Brain HTTP client behind a persistence worker thread
//! - **Frontend**: eframe/egui application
//! - **Communication**: Crossbeam channels between the UI and the worker
//!
//! ## Configuration
//!
//! `config.toml` and `app_state.json` live in the platform data directory
//! under `dev.thoth.studio`. `THOTH_BRAIN_URL` overrides the Brain base URL.
//!
//! ## Example
//!
//! ```
//! use thoth_studio::pipeline::{DataType, GraphStore, Shape};
//!
//! let mut store = GraphStore::new(DataType::Csi);
//! let loader = store.add_block("csi_loader").unwrap();
//! let amplitude = store.add_block("amplitude_extractor").unwrap();
//! assert!(store.add_connection(&loader, &amplitude));
//!
//! let block = store.block(&amplitude).unwrap();
//! assert_eq!(block.input_shape, Shape::new(vec![1000, 128]));
//! assert_eq!(block.output_shape, Shape::new(vec![1000, 64]));
//! ```

pub mod backend;
pub mod config;
pub mod editor;
pub mod error;
pub mod frontend;
pub mod pipeline;

// Re-export commonly used types
pub use backend::{BrainClient, PersistenceBridge, PipelineStore};
pub use config::{AppConfig, AppState, PipelineFile};
pub use error::{Result, ResultExt, ThothError};
pub use frontend::ThothApp;
pub use pipeline::{BlockId, DataType, GraphStore, PipelineDocument, Shape};
