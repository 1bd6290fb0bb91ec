//! Persistence adapter for the Brain pipeline API.
//!
//! All network I/O happens on a dedicated worker thread so the UI never
//! blocks on the server. The UI talks to it through channels:
//!
//! - [`PersistenceCommand`] - Messages sent from UI to the worker (list, open, create, update)
//! - [`PersistenceMessage`] - Messages sent from the worker to the UI (results, errors)
//! - [`PersistenceBridge`] - UI-side handle for sending commands and draining messages
//! - [`PersistenceWorker`] - Worker loop that owns a [`PipelineStore`]
//!
//! # Example
//!
//! ```ignore
//! use thoth_studio::backend::{spawn_worker, BrainClient};
//! use thoth_studio::config::AppConfig;
//!
//! let config = AppConfig::default();
//! let client = BrainClient::new(&config.backend)?;
//! let (bridge, _handle) = spawn_worker(Box::new(client))?;
//!
//! bridge.list_pipelines();
//! for msg in bridge.drain() {
//!     if let PersistenceMessage::PipelineList(list) = msg {
//!         // Show the pipeline picker
//!     }
//! }
//! ```

pub mod bridge;
pub mod client;
pub mod worker;

pub use bridge::{Operation, PersistenceBridge, PersistenceCommand, PersistenceMessage};
pub use client::BrainClient;
pub use worker::{spawn_worker, PersistenceWorker};

use crate::error::Result;
use crate::pipeline::{
    CreatePipelineRequest, PipelineDocument, PipelineSummary, UpdatePipelineRequest,
};

/// Storage for pipeline documents.
///
/// Implemented over HTTP by [`BrainClient`]. Calls block the calling thread,
/// so implementations are driven from the persistence worker.
#[cfg_attr(test, mockall::automock)]
pub trait PipelineStore: Send {
    fn list_pipelines(&self) -> Result<Vec<PipelineSummary>>;

    fn get_pipeline(&self, id: &str) -> Result<PipelineDocument>;

    /// Create a pipeline. The returned document carries the assigned id.
    fn create_pipeline(&self, request: &CreatePipelineRequest) -> Result<PipelineDocument>;

    fn update_pipeline(&self, id: &str, request: &UpdatePipelineRequest) -> Result<PipelineDocument>;
}
