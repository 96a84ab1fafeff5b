//! # Embedding Service Client
//!
//! Turns free text into a fixed-length vector via an external embedding
//! model. [`HttpEmbedder`] speaks the OpenAI-compatible `/v1/embeddings`
//! shape served by Ollama and friends.
//!
//! No retry policy lives here beyond transport-level resends — whether an
//! embedding failure aborts the run is the pipeline's decision.

use std::time::Duration;

use serde::Deserialize;

use crate::error::EmbeddingError;
use crate::retry::retry_send;

/// Anything that can embed text. The pipeline depends on this seam, never
/// on a concrete adapter.
#[async_trait::async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed `text`, returning the model's vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Configuration for the HTTP embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding API (e.g., `http://localhost:11434`).
    pub base_url: String,
    /// Model name to request (e.g., `nomic-embed-text`).
    pub model: String,
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    /// Create a new configuration with the default timeout.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout_secs: 30,
        }
    }
}

/// HTTP client for an OpenAI-compatible embeddings endpoint.
#[derive(Debug)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    /// Create a new embedding adapter from configuration.
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Http {
                endpoint: config.base_url.clone(),
                source: e,
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingService for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let resp = retry_send("embeddings", || self.client.post(&url).json(&body).send())
            .await
            .map_err(|e| EmbeddingError::Http {
                endpoint: url.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                endpoint: url,
                status,
                body,
            });
        }

        let decoded: EmbeddingsResponse =
            resp.json().await.map_err(|e| EmbeddingError::Deserialization {
                endpoint: url.clone(),
                source: e,
            })?;

        let vector = decoded
            .data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .unwrap_or_default();

        if vector.is_empty() {
            return Err(EmbeddingError::EmptyVector { endpoint: url });
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_timeout() {
        let cfg = EmbeddingConfig::new("http://localhost:11434", "nomic-embed-text");
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn embedder_strips_trailing_slash() {
        let embedder =
            HttpEmbedder::new(EmbeddingConfig::new("http://localhost:11434/", "m")).unwrap();
        assert_eq!(embedder.base_url, "http://localhost:11434");
    }

    #[test]
    fn response_shape_decodes() {
        let decoded: EmbeddingsResponse =
            serde_json::from_str(r#"{"data": [{"embedding": [0.1, -0.2, 0.3]}]}"#).unwrap();
        assert_eq!(decoded.data[0].embedding.len(), 3);
    }
}
