//! # geolex-pipeline — Compliance Evaluation Pipeline
//!
//! One pipeline invocation takes a validated [`FeatureSubmission`] through
//! a strictly linear run:
//!
//! ```text
//! Validate → Embed → Retrieve (×5 KBs, concurrent) → ┬→ Judge → Reconcile ┬→ Persist
//!                                                    └──── short-circuit ─┘
//! ```
//!
//! with one conditional branch: when no knowledge base yields evidence,
//! the judgment call is skipped entirely and the feature is stored with
//! every region unknown. A stored record exists if and only if the run
//! reached the persist step and it succeeded — partial runs never write.
//!
//! Each invocation is an independent, stateless unit of work; concurrent
//! runs share only the (internally synchronized) service clients.
//!
//! [`FeatureSubmission`]: geolex_core::FeatureSubmission

pub mod error;
pub mod evaluator;
pub mod store;

pub use error::PipelineError;
pub use evaluator::{ComplianceEvaluator, NO_EVIDENCE_REASON, RETRIEVAL_TOP_K};
pub use store::{FeatureStore, MemoryFeatureStore, NewFeature, StoreError, StoredFeature};
