//! # Compliance Evaluator
//!
//! Orchestrates one evaluation run over the four injected collaborators:
//! judgment service (validation + adjudication), embedding service,
//! document store, and feature store. All collaborators arrive as trait
//! objects at construction — nothing here reaches for a global handle, so
//! tests drive the whole pipeline with fakes.
//!
//! ## Failure policy
//!
//! - A validation-service error means "not a valid feature", never a 5xx.
//! - A single knowledge base failing to retrieve degrades that region to
//!   `Unknown`; the run continues.
//! - Embedding, judgment, and persistence failures abort the run. No
//!   record is written for an aborted run.

use std::sync::Arc;

use geolex_core::{ComplianceMap, FeatureSubmission, KnowledgeBase, RetrievedDocument};
use geolex_rag::{DocumentStore, EmbeddingService, JudgmentService};

use crate::error::PipelineError;
use crate::store::{FeatureStore, NewFeature, StoredFeature};

/// Documents requested per knowledge base.
pub const RETRIEVAL_TOP_K: usize = 3;

/// Reason stored when no knowledge base yields any evidence and the
/// judgment call is skipped.
pub const NO_EVIDENCE_REASON: &str = "No related documents found for any law";

/// The compliance evaluation pipeline.
///
/// Stateless across invocations — clone-cheap via the shared `Arc`s, and
/// safe to drive concurrently for different submissions.
#[derive(Clone)]
pub struct ComplianceEvaluator {
    judge: Arc<dyn JudgmentService>,
    embedder: Arc<dyn EmbeddingService>,
    documents: Arc<dyn DocumentStore>,
    features: Arc<dyn FeatureStore>,
}

impl ComplianceEvaluator {
    /// Build an evaluator from its four collaborators.
    pub fn new(
        judge: Arc<dyn JudgmentService>,
        embedder: Arc<dyn EmbeddingService>,
        documents: Arc<dyn DocumentStore>,
        features: Arc<dyn FeatureStore>,
    ) -> Self {
        Self {
            judge,
            embedder,
            documents,
            features,
        }
    }

    /// Run one full evaluation: validate, embed, retrieve, judge,
    /// reconcile, persist.
    ///
    /// Returns the stored record on success. A record exists if and only
    /// if this returns `Ok`.
    pub async fn evaluate(
        &self,
        submission: &FeatureSubmission,
    ) -> Result<StoredFeature, PipelineError> {
        // Step 1: validate. A validator error is "not a valid feature",
        // never a server error — fail-closed.
        let valid = match self.judge.validate_feature(submission).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "feature validation call failed, treating as invalid");
                false
            }
        };
        if !valid {
            return Err(PipelineError::InvalidFeature);
        }

        // Step 2: embed title + description.
        let vector = self.embedder.embed(&submission.embedding_text()).await?;
        if vector.is_empty() {
            return Err(PipelineError::EmptyEmbedding);
        }

        // Step 3: retrieve evidence from all five knowledge bases
        // concurrently. Accumulation is a KB-keyed union, so completion
        // order cannot affect the outcome.
        let (evidence, working_map) = self.retrieve_evidence(&vector).await;

        // Step 4: with zero evidence anywhere, skip the model entirely.
        if evidence.is_empty() {
            tracing::info!(
                feature = submission.title(),
                "no evidence in any knowledge base, storing all-unknown verdict"
            );
            return self
                .persist(submission, working_map, NO_EVIDENCE_REASON.to_string())
                .await;
        }

        // Step 5: judge against the full evidence pool.
        let verdict = self.judge.evaluate_compliance(submission, &evidence).await?;
        let partial = verdict
            .compliance
            .ok_or(PipelineError::MissingComplianceMap)?;

        // Step 6: reconcile — model output overlays the retrieval-derived
        // defaults; regions the model never mentioned stay Unknown.
        let mut final_map = working_map;
        final_map.overlay(&partial);

        // Step 7: persist.
        self.persist(submission, final_map, verdict.reason.unwrap_or_default())
            .await
    }

    /// Fan out one retrieval per knowledge base and fold the results into
    /// an evidence pool plus the working verdict map.
    ///
    /// A KB that fails or returns nothing leaves its region `Unknown` in
    /// the working map; retrieval failure is logged and absorbed, never
    /// propagated.
    async fn retrieve_evidence(
        &self,
        vector: &[f32],
    ) -> (Vec<RetrievedDocument>, ComplianceMap) {
        let lookups = KnowledgeBase::all().iter().map(|&kb| {
            let documents = Arc::clone(&self.documents);
            async move { (kb, documents.retrieve(vector, RETRIEVAL_TOP_K, kb).await) }
        });

        let mut evidence = Vec::new();
        let working_map = ComplianceMap::unknown();
        for (kb, outcome) in futures::future::join_all(lookups).await {
            match outcome {
                Ok(docs) if docs.is_empty() => {
                    tracing::warn!(kb = %kb, "no related documents found");
                }
                Ok(docs) => evidence.extend(docs),
                Err(e) => {
                    tracing::warn!(kb = %kb, error = %e, "retrieval degraded, treating as no evidence");
                }
            }
        }
        (evidence, working_map)
    }

    async fn persist(
        &self,
        submission: &FeatureSubmission,
        is_compliant: ComplianceMap,
        reason: String,
    ) -> Result<StoredFeature, PipelineError> {
        let record = NewFeature {
            feature: submission.title().to_string(),
            description: submission.description().to_string(),
            is_compliant,
            reason,
        };
        Ok(self.features.insert(record).await?)
    }
}
