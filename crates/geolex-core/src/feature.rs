//! # Feature Submissions and Evaluation Documents
//!
//! [`FeatureSubmission`] is the validated user input one pipeline run
//! consumes; [`RetrievedDocument`] is the evidence the document store
//! returns for it. Both are transient — created per request, dropped when
//! the run ends. Only the reconciled [`ComplianceVerdict`] outlives a run,
//! as part of the stored feature record.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::knowledge_base::KnowledgeBase;
use crate::region::ComplianceMap;

/// A product feature submitted for compliance evaluation.
///
/// Both fields are validated non-empty at construction; the pipeline never
/// re-checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSubmission {
    title: String,
    description: String,
}

impl FeatureSubmission {
    /// Create a submission, rejecting empty or whitespace-only fields.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into().trim().to_string();
        let description = description.into().trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(Self { title, description })
    }

    /// The feature title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The feature description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The text handed to the embedding service: title and description
    /// joined by a single space.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// Metadata attached to a stored legal-corpus document.
///
/// All fields except `kb` are optional — corpora differ in how their
/// source documents were sectioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// The knowledge base this document belongs to.
    pub kb: KnowledgeBase,
    /// Section heading within the source statute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Article number, for corpora sectioned by article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_number: Option<String>,
    /// Document type tag assigned at ingestion.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    /// Word count of the source chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
}

impl DocumentMetadata {
    /// Metadata carrying only the knowledge base.
    pub fn for_kb(kb: KnowledgeBase) -> Self {
        Self {
            kb,
            section: None,
            article_number: None,
            doc_type: None,
            word_count: None,
        }
    }
}

/// A document returned by a nearest-neighbor query against one knowledge
/// base. Ephemeral — lives only within one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// The document text, as ingested.
    pub text: String,
    /// Cosine similarity to the query vector, when the store reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    /// Source metadata.
    pub metadata: DocumentMetadata,
}

/// A legal-corpus document prepared for ingestion into the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusDocument {
    /// The document text to embed and store.
    pub text: String,
    /// Source metadata, including the target knowledge base.
    pub metadata: DocumentMetadata,
}

/// The reconciled output of one pipeline run: a total compliance map plus
/// the model's (or the short-circuit path's) reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    /// Per-region verdicts, total over the five regions.
    pub compliance: ComplianceMap,
    /// Human-readable explanation of the verdicts.
    pub reason: String,
}
