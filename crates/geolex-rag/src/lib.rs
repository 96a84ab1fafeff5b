//! # geolex-rag — External Service Clients
//!
//! HTTP adapters for the three services the evaluation pipeline depends on:
//!
//! - [`EmbeddingService`] — turns free text into a fixed-length vector
//!   ([`HttpEmbedder`] speaks the OpenAI-compatible `/v1/embeddings` shape).
//! - [`DocumentStore`] — nearest-neighbor retrieval over per-jurisdiction
//!   legal corpora ([`HttpVectorStore`] speaks a PostgREST-style RPC).
//! - [`JudgmentService`] — LLM adjudication ([`HttpChatJudge`] speaks the
//!   chat-completions shape and carries the two-phase response decoder).
//!
//! ## Architecture
//!
//! Each adapter wraps a `reqwest::Client` with the service-specific base
//! URL and request/response mapping. All adapters are `Send + Sync` and
//! designed to be shared via `Arc` across async tasks. The trait seams
//! exist so the pipeline can be driven by fakes in tests — no adapter is
//! ever reached through a global handle.
//!
//! ## Timeout & Retry
//!
//! Each adapter uses a per-request timeout (configurable, default 30s).
//! Transport-level retries live in the [`retry`] module; response status
//! handling stays with each adapter.

pub mod decode;
pub mod embedding;
pub mod error;
pub mod judgment;
pub mod retry;
pub mod store;

pub use embedding::{EmbeddingConfig, EmbeddingService, HttpEmbedder};
pub use error::{EmbeddingError, JudgmentError, RetrievalError};
pub use judgment::{HttpChatJudge, JudgeConfig, JudgmentService, ModelVerdict};
pub use store::{DocumentStore, HttpVectorStore, VectorStoreConfig};
