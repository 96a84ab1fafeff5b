//! # geolex-core — Foundational Types for GeoLex
//!
//! Domain primitives shared by every other crate in the workspace:
//!
//! - [`Region`] — the closed set of jurisdictions a feature is evaluated
//!   against, and [`RegionVerdict`] / [`ComplianceMap`] for the per-region
//!   outcome of an evaluation.
//! - [`KnowledgeBase`] — identifiers for the per-jurisdiction legal corpora,
//!   with the static KB → region table consumed by retrieval and ingestion.
//! - [`FeatureSubmission`] — validated user input, plus the document and
//!   verdict types flowing through the evaluation pipeline.
//!
//! ## Crate Policy
//!
//! - No I/O and no async — pure data types and validation.
//! - Newtypes validate at construction time; downstream code never re-checks.
//! - The five-region set and the KB → region mapping live here and nowhere
//!   else.

pub mod error;
pub mod feature;
pub mod knowledge_base;
pub mod region;

pub use error::ValidationError;
pub use feature::{
    ComplianceVerdict, CorpusDocument, DocumentMetadata, FeatureSubmission, RetrievedDocument,
};
pub use knowledge_base::KnowledgeBase;
pub use region::{ComplianceMap, PartialComplianceMap, Region, RegionVerdict};
