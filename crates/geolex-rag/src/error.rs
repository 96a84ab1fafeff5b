//! Service client error types.
//!
//! One enum per backing service, each carrying the endpoint for operator
//! diagnosis. None of these reach API clients directly — `geolex-api`
//! collapses them into generic 4xx/5xx bodies.

/// Errors from the embedding service.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service returned a non-2xx status.
    #[error("embedding service {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize embedding response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The response decoded but carried no usable vector.
    #[error("embedding response from {endpoint} carried no vector")]
    EmptyVector { endpoint: String },
}

/// Errors from the document store.
///
/// A reachable store that finds no matches is NOT an error — retrieval
/// returns an empty sequence for that. These variants cover transport and
/// backend failure only.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The store returned a non-2xx status.
    #[error("document store {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize document store response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The caller asked for fewer than one document.
    #[error("match count must be at least 1, got {k}")]
    InvalidMatchCount { k: usize },
    /// The adapter could not be constructed from its configuration.
    #[error("document store not configured: {reason}")]
    NotConfigured { reason: String },
}

/// Errors from the judgment service.
#[derive(Debug, thiserror::Error)]
pub enum JudgmentError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service returned a non-2xx status.
    #[error("judgment service {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response envelope deserialization failed.
    #[error("failed to deserialize judgment response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The envelope decoded but carried no message content.
    #[error("judgment response from {endpoint} carried no content")]
    EmptyResponse { endpoint: String },
    /// Neither strict decoding nor balanced-payload extraction produced a
    /// verdict. Carries the raw model text for diagnostics.
    #[error("judgment output could not be decoded as a verdict")]
    MalformedOutput { raw: String },
}
