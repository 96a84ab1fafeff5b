//! # Document Store Client
//!
//! Nearest-neighbor retrieval over the per-jurisdiction legal corpora,
//! and ingestion of new corpus documents. [`HttpVectorStore`] speaks a
//! PostgREST-style surface: a `match_documents` RPC for similarity search
//! and a plain table insert for ingestion.
//!
//! ## Empty results are not failures
//!
//! A reachable store with no matches for a knowledge base returns an empty
//! vector. [`RetrievalError`] is reserved for transport and backend
//! failure — and even then the pipeline degrades that KB to "no evidence"
//! rather than aborting the run.

use std::time::Duration;

use serde::Deserialize;

use geolex_core::{CorpusDocument, DocumentMetadata, KnowledgeBase, RetrievedDocument};

use crate::error::RetrievalError;
use crate::retry::retry_send;

/// Nearest-neighbor document store seam.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return the top-`k` documents nearest to `vector` within `kb`.
    ///
    /// `k` must be at least 1. An empty result is a normal outcome.
    async fn retrieve(
        &self,
        vector: &[f32],
        k: usize,
        kb: KnowledgeBase,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError>;

    /// Insert one embedded corpus document.
    async fn insert(&self, doc: &CorpusDocument, vector: &[f32]) -> Result<(), RetrievalError>;
}

/// Configuration for the HTTP document store adapter.
#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    /// Base URL of the store (e.g., `https://xyz.supabase.co`).
    pub base_url: String,
    /// API key sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl VectorStoreConfig {
    /// Create a new configuration with the default timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: 30,
        }
    }
}

/// HTTP client for a PostgREST-style vector store.
#[derive(Debug)]
pub struct HttpVectorStore {
    client: reqwest::Client,
    base_url: String,
}

/// Raw row shape returned by the `match_documents` RPC. Metadata arrives
/// as loose JSON and is validated row by row — one corrupt row must not
/// sink the whole result set.
#[derive(Debug, Deserialize)]
struct MatchRow {
    text: String,
    #[serde(default)]
    similarity: Option<f32>,
    metadata: serde_json::Value,
}

impl HttpVectorStore {
    /// Create a new store adapter from configuration.
    pub fn new(config: VectorStoreConfig) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let key = reqwest::header::HeaderValue::from_str(&config.api_key).map_err(
                    |_| RetrievalError::NotConfigured {
                        reason: "invalid API key characters".into(),
                    },
                )?;
                headers.insert("apikey", key);
                let bearer = reqwest::header::HeaderValue::from_str(&format!(
                    "Bearer {}",
                    config.api_key
                ))
                .map_err(|_| RetrievalError::NotConfigured {
                    reason: "invalid API key characters".into(),
                })?;
                headers.insert(reqwest::header::AUTHORIZATION, bearer);
                headers
            })
            .build()
            .map_err(|e| RetrievalError::Http {
                endpoint: config.base_url.clone(),
                source: e,
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn convert_row(row: MatchRow) -> Option<RetrievedDocument> {
        match serde_json::from_value::<DocumentMetadata>(row.metadata) {
            Ok(metadata) => Some(RetrievedDocument {
                text: row.text,
                similarity: row.similarity,
                metadata,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "skipping retrieved row with invalid metadata");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for HttpVectorStore {
    async fn retrieve(
        &self,
        vector: &[f32],
        k: usize,
        kb: KnowledgeBase,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        if k < 1 {
            return Err(RetrievalError::InvalidMatchCount { k });
        }

        let url = format!("{}/rest/v1/rpc/match_documents", self.base_url);
        let body = serde_json::json!({
            "query_embedding": vector,
            "match_count": k,
            "kb": kb.as_str(),
        });

        let resp = retry_send("match_documents", || {
            self.client.post(&url).json(&body).send()
        })
        .await
        .map_err(|e| RetrievalError::Http {
            endpoint: url.clone(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RetrievalError::Api {
                endpoint: url,
                status,
                body,
            });
        }

        let rows: Vec<MatchRow> =
            resp.json().await.map_err(|e| RetrievalError::Deserialization {
                endpoint: url.clone(),
                source: e,
            })?;

        Ok(rows.into_iter().filter_map(Self::convert_row).collect())
    }

    async fn insert(&self, doc: &CorpusDocument, vector: &[f32]) -> Result<(), RetrievalError> {
        let url = format!("{}/rest/v1/documents", self.base_url);
        let body = serde_json::json!([{
            "text": doc.text,
            "embedding": vector,
            "metadata": doc.metadata,
        }]);

        let resp = retry_send("insert_document", || {
            self.client
                .post(&url)
                .header("Prefer", "return=minimal")
                .json(&body)
                .send()
        })
        .await
        .map_err(|e| RetrievalError::Http {
            endpoint: url.clone(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RetrievalError::Api {
                endpoint: url,
                status,
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_row_accepts_valid_metadata() {
        let row = MatchRow {
            text: "Section 13-63-102 ...".to_string(),
            similarity: Some(0.91),
            metadata: serde_json::json!({"kb": "Utah_Social_Media_Regulation_Act"}),
        };
        let doc = HttpVectorStore::convert_row(row).unwrap();
        assert_eq!(doc.metadata.kb, KnowledgeBase::UtahSocialMediaAct);
        assert_eq!(doc.similarity, Some(0.91));
    }

    #[test]
    fn convert_row_skips_unknown_kb() {
        let row = MatchRow {
            text: "…".to_string(),
            similarity: None,
            metadata: serde_json::json!({"kb": "Not_A_Corpus"}),
        };
        assert!(HttpVectorStore::convert_row(row).is_none());
    }

    #[tokio::test]
    async fn retrieve_rejects_zero_match_count() {
        let store =
            HttpVectorStore::new(VectorStoreConfig::new("http://localhost:54321", "key")).unwrap();
        let err = store
            .retrieve(&[0.0], 0, KnowledgeBase::FloridaSenate)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidMatchCount { k: 0 }));
    }
}
