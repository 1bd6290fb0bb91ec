//! In-memory Brain stand-in

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thoth_studio::backend::PipelineStore;
use thoth_studio::pipeline::{
    CreatePipelineRequest, PipelineDocument, PipelineSummary, UpdatePipelineRequest,
};
use thoth_studio::{Result, ThothError};

#[derive(Default)]
struct Inner {
    pipelines: BTreeMap<String, PipelineDocument>,
    next_id: u32,
    fail_next: Option<(u16, String)>,
}

/// Shared-state store; clones see the same pipelines.
#[derive(Clone, Default)]
pub struct FakeBrain {
    inner: Arc<Mutex<Inner>>,
}

impl FakeBrain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next request fail with `status`.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.inner.lock().unwrap().fail_next = Some((status, message.to_string()));
    }

    pub fn get(&self, id: &str) -> Option<PipelineDocument> {
        self.inner.lock().unwrap().pipelines.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().pipelines.len()
    }

    fn check_failure(inner: &mut Inner) -> Result<()> {
        match inner.fail_next.take() {
            Some((status, message)) => Err(ThothError::Backend { status, message }),
            None => Ok(()),
        }
    }
}

impl PipelineStore for FakeBrain {
    fn list_pipelines(&self) -> Result<Vec<PipelineSummary>> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        Ok(inner
            .pipelines
            .values()
            .map(|doc| PipelineSummary {
                id: doc.id.clone().unwrap_or_default(),
                name: doc.name.clone(),
                description: doc.description.clone(),
                updated_at: None,
            })
            .collect())
    }

    fn get_pipeline(&self, id: &str) -> Result<PipelineDocument> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        inner.pipelines.get(id).cloned().ok_or(ThothError::Backend {
            status: 404,
            message: "pipeline not found".to_string(),
        })
    }

    fn create_pipeline(&self, request: &CreatePipelineRequest) -> Result<PipelineDocument> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        inner.next_id += 1;
        let id = format!("p-{}", inner.next_id);
        let doc = PipelineDocument {
            id: Some(id.clone()),
            name: request.name.clone(),
            description: request.description.clone(),
            blocks: request.blocks.clone(),
            connections: request.connections.clone(),
        };
        inner.pipelines.insert(id, doc.clone());
        Ok(doc)
    }

    fn update_pipeline(&self, id: &str, request: &UpdatePipelineRequest) -> Result<PipelineDocument> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        let doc = inner.pipelines.get_mut(id).ok_or(ThothError::Backend {
            status: 404,
            message: "pipeline not found".to_string(),
        })?;
        doc.blocks = request.blocks.clone();
        doc.connections = request.connections.clone();
        Ok(doc.clone())
    }
}
