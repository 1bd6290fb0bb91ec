//! HTTP client for the Brain pipeline endpoints.

use crate::backend::PipelineStore;
use crate::config::BackendConfig;
use crate::error::{Result, ThothError};
use crate::pipeline::{
    CreatePipelineRequest, PipelineDocument, PipelineSummary, UpdatePipelineRequest,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Blocking client over `reqwest`, driven by a private current-thread
/// tokio runtime. Meant to live on the persistence worker thread.
pub struct BrainClient {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl std::fmt::Debug for BrainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrainClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.auth_token.is_some())
            .finish()
    }
}

impl BrainClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        tracing::info!("Brain client targeting {}", config.base_url);
        Ok(Self {
            runtime,
            client,
            base_url: config.base_url.clone(),
            auth_token: config.auth_token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.endpoint(path));
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode, accepting either a bare body or `{ envelope: body }`.
    fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        envelope: &str,
    ) -> Result<T> {
        self.runtime.block_on(async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            if !status.is_success() {
                return Err(ThothError::Backend {
                    status: status.as_u16(),
                    message: error_message(&text, status),
                });
            }
            decode_body(&text, envelope)
        })
    }
}

impl PipelineStore for BrainClient {
    fn list_pipelines(&self) -> Result<Vec<PipelineSummary>> {
        tracing::info!("GET /pipelines");
        self.execute(self.request(reqwest::Method::GET, "/pipelines"), "pipelines")
    }

    fn get_pipeline(&self, id: &str) -> Result<PipelineDocument> {
        tracing::info!("GET /pipelines/{}", id);
        self.execute(
            self.request(reqwest::Method::GET, &format!("/pipelines/{id}")),
            "pipeline",
        )
    }

    fn create_pipeline(&self, request: &CreatePipelineRequest) -> Result<PipelineDocument> {
        tracing::info!(
            "POST /pipelines '{}' ({} blocks)",
            request.name,
            request.blocks.len()
        );
        self.execute(
            self.request(reqwest::Method::POST, "/pipelines").json(request),
            "pipeline",
        )
    }

    fn update_pipeline(&self, id: &str, request: &UpdatePipelineRequest) -> Result<PipelineDocument> {
        tracing::info!("PUT /pipelines/{} ({} blocks)", id, request.blocks.len());
        self.execute(
            self.request(reqwest::Method::PUT, &format!("/pipelines/{id}"))
                .json(request),
            "pipeline",
        )
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn decode_body<T: DeserializeOwned>(text: &str, envelope: &str) -> Result<T> {
    let mut value: Value = serde_json::from_str(text)?;
    if let Some(inner) = value.get_mut(envelope) {
        let inner = inner.take();
        return Ok(serde_json::from_value(inner)?);
    }
    Ok(serde_json::from_value(value)?)
}

/// Best human-readable message from an error body.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8000/api/", "/pipelines"),
            "http://localhost:8000/api/pipelines"
        );
        assert_eq!(join_url("http://brain", "pipelines/7"), "http://brain/pipelines/7");
    }

    #[test]
    fn test_decode_bare_and_enveloped() {
        let bare: Vec<PipelineSummary> = decode_body(r#"[{"id": "p-1", "name": "a"}]"#, "pipelines").unwrap();
        assert_eq!(bare[0].id, "p-1");

        let wrapped: PipelineDocument = decode_body(
            r#"{"success": true, "pipeline": {"id": "p-2", "name": "b", "blocks": [], "connections": []}}"#,
            "pipeline",
        )
        .unwrap();
        assert_eq!(wrapped.id.as_deref(), Some("p-2"));
    }

    #[test]
    fn test_decode_garbage() {
        let result: Result<PipelineDocument> = decode_body("<html>", "pipeline");
        assert!(matches!(result, Err(ThothError::Serialization(_))));
    }

    #[test]
    fn test_error_message_prefers_json_detail() {
        let status = reqwest::StatusCode::UNPROCESSABLE_ENTITY;
        assert_eq!(error_message(r#"{"detail": "name required"}"#, status), "name required");
        assert_eq!(error_message("upstream down", status), "upstream down");
        assert_eq!(error_message("", reqwest::StatusCode::NOT_FOUND), "Not Found");
    }

    #[test]
    fn test_client_builds_without_network() {
        let config = BackendConfig {
            auth_token: Some("  ".to_string()),
            ..BackendConfig::default()
        };
        let client = BrainClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert!(client.auth_token.is_none());
    }
}
