//! Pipeline failure taxonomy.
//!
//! Client-class failures (bad input, failed feature validation) map to
//! 4xx at the API boundary; everything else is a 5xx. Single-KB retrieval
//! failures never appear here — they are absorbed into `Unknown` verdicts
//! inside the pipeline.

use thiserror::Error;

use geolex_core::ValidationError;
use geolex_rag::{EmbeddingError, JudgmentError};

use crate::store::StoreError;

/// Terminal failure of one pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Submission fields failed validation before any external call.
    #[error("invalid submission: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The validator did not say "yes" — including when the validation
    /// call itself errored. Fail-closed by design.
    #[error("input does not appear to be a meaningful feature")]
    InvalidFeature,

    /// The embedding service failed.
    #[error("embedding service unavailable: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The embedding service answered with an empty vector.
    #[error("embedding service returned an empty vector")]
    EmptyEmbedding,

    /// The judgment service failed at the transport or envelope level.
    #[error("judgment service unavailable: {0}")]
    Judgment(JudgmentError),

    /// The judgment output could not be decoded even after balanced-payload
    /// extraction. Raw model text is retained for diagnostics.
    #[error("judgment output could not be decoded as a verdict")]
    MalformedJudgment { raw: String },

    /// The judgment output decoded but asserted no compliance map.
    #[error("judgment service returned no compliance map")]
    MissingComplianceMap,

    /// The feature store rejected the finalized record.
    #[error("failed to persist feature: {0}")]
    Persistence(#[from] StoreError),
}

impl PipelineError {
    /// Whether this failure is the caller's fault (4xx) rather than a
    /// service fault (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidFeature)
    }
}

impl From<JudgmentError> for PipelineError {
    fn from(err: JudgmentError) -> Self {
        match err {
            JudgmentError::MalformedOutput { raw } => Self::MalformedJudgment { raw },
            other => Self::Judgment(other),
        }
    }
}
