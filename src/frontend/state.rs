//! Action and session types for the frontend
//!
//! Panels return `AppAction`s instead of mutating the graph directly; the
//! app applies them in one place after the frame's widgets are laid out.

use std::path::PathBuf;

use crate::pipeline::{BlockId, ConfigValue, DataType, GraphStore, PipelineDocument, Position};

/// Everything a panel or menu can ask the app to do
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    // Graph edits
    AddBlock(&'static str),
    DeleteBlock(BlockId),
    Connect { from: BlockId, to: BlockId },
    Disconnect { from: BlockId, to: BlockId },
    MoveBlock { id: BlockId, position: Position },
    SetConfigValue {
        id: BlockId,
        key: String,
        value: ConfigValue,
    },
    SetDataType(DataType),

    // Pipeline lifecycle
    NewPipeline,
    ApplyTemplate(&'static str),
    /// Open the Brain list dialog and request a fresh list
    BrowseBrain,
    RefreshPipelineList,
    OpenFromBrain(String),
    /// Update if already persisted, otherwise ask for a name
    Save,
    SaveAs { name: String, description: String },
    ImportJson(PathBuf),
    ExportJson(PathBuf),

    // View
    FitToContent,
    ResetView,
    SetDarkMode(bool),
    SetShowGrid(bool),

    DismissError,
}

/// Identity and save state of the pipeline being edited
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSession {
    /// Server id once the pipeline has been created on the Brain
    pub pipeline_id: Option<String>,
    pub name: String,
    pub description: String,
    /// Store generation at the last confirmed save or load
    saved_generation: Option<u64>,
    /// Generation sent with the create/update request in flight
    pending_save: Option<u64>,
}

impl Default for PipelineSession {
    fn default() -> Self {
        Self {
            pipeline_id: None,
            name: "Untitled pipeline".to_string(),
            description: String::new(),
            saved_generation: None,
            pending_save: None,
        }
    }
}

impl PipelineSession {
    /// Session for a document just loaded into `store`.
    pub fn opened(doc: &PipelineDocument, store: &GraphStore) -> Self {
        Self {
            pipeline_id: doc.id.clone(),
            name: doc.name.clone(),
            description: doc.description.clone(),
            saved_generation: doc.id.as_ref().map(|_| store.generation()),
            pending_save: None,
        }
    }

    /// Imported or templated graph: named, never saved to the Brain.
    pub fn unsaved(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ..Self::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.pipeline_id.is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    /// Remember which graph state a create/update request carries.
    pub fn begin_save(&mut self, store: &GraphStore) {
        self.pending_save = Some(store.generation());
    }

    pub fn save_failed(&mut self) {
        self.pending_save = None;
    }

    /// Changes since the last confirmed save. An empty, never-saved graph
    /// is clean.
    pub fn is_dirty(&self, store: &GraphStore) -> bool {
        match self.saved_generation {
            Some(generation) => generation != store.generation(),
            None => !store.is_empty(),
        }
    }

    /// Record a confirmed create/update from the server. Edits made while
    /// the request was in flight stay dirty.
    pub fn mark_saved(&mut self, doc: &PipelineDocument, store: &GraphStore) {
        if doc.id.is_some() {
            self.pipeline_id = doc.id.clone();
        }
        if !doc.name.is_empty() {
            self.name = doc.name.clone();
        }
        self.saved_generation = Some(self.pending_save.take().unwrap_or(store.generation()));
    }

    pub fn title(&self, store: &GraphStore) -> String {
        let marker = if self.is_dirty(store) { " *" } else { "" };
        format!("{}{}", self.name, marker)
    }
}

/// Dismissible error shown above the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBanner {
    pub message: String,
}

impl ErrorBanner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
