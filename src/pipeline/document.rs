//! Persisted pipeline documents and the request bodies of the Brain API.

use crate::pipeline::block::{BlockInstance, Connection};
use crate::pipeline::data_type::DataType;
use crate::pipeline::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A stored pipeline: metadata plus the full graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineDocument {
    /// Assigned by the backend on create; `None` for unsaved pipelines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub blocks: Vec<BlockInstance>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl PipelineDocument {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Data type implied by the first loader block that supports exactly one.
    pub fn source_data_type(&self) -> Option<DataType> {
        self.blocks
            .iter()
            .filter_map(|b| b.descriptor())
            .filter(|d| d.is_source)
            .find_map(|d| match d.compatible_data_types {
                [only] => Some(*only),
                _ => None,
            })
    }

    /// Reject documents whose block ids collide. Dangling connections are
    /// tolerated here and dropped when the document is loaded.
    pub fn check_unique_ids(&self) -> PipelineResult<()> {
        let mut seen = HashSet::with_capacity(self.blocks.len());
        for block in &self.blocks {
            if !seen.insert(&block.id) {
                return Err(PipelineError::Document(format!(
                    "duplicate block id '{}'",
                    block.id
                )));
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> PipelineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PipelineError::Document(e.to_string()))
    }

    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let doc: Self =
            serde_json::from_str(json).map_err(|e| PipelineError::Document(e.to_string()))?;
        doc.check_unique_ids()?;
        Ok(doc)
    }
}

/// Entry of the pipeline list returned by `GET /pipelines`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl PipelineSummary {
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Body of `POST /pipelines`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePipelineRequest {
    pub name: String,
    pub description: String,
    pub blocks: Vec<BlockInstance>,
    pub connections: Vec<Connection>,
}

/// Body of `PUT /pipelines/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePipelineRequest {
    pub blocks: Vec<BlockInstance>,
    pub connections: Vec<Connection>,
}
