//! # Knowledge Base Identifiers
//!
//! One legal corpus per jurisdiction, named after the source statute or
//! body the corpus was ingested from. The KB → region table here is the
//! single source of truth — retrieval, ingestion, and reconciliation all
//! consume it, never their own copy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::region::Region;

/// A named corpus of legal-text documents for one jurisdiction.
///
/// The `us` region maps to a federal corpus distinct from the three state
/// corpora. Identifiers match the corpus names under which the documents
/// were ingested, so they appear verbatim in document metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KnowledgeBase {
    /// US federal reporting requirements of providers.
    #[serde(rename = "US_reporting_requirements_of_providers")]
    UsReportingRequirements,
    /// Utah Social Media Regulation Act.
    #[serde(rename = "Utah_Social_Media_Regulation_Act")]
    UtahSocialMediaAct,
    /// Florida Senate online protections for minors.
    #[serde(rename = "The_Florida_Senate")]
    FloridaSenate,
    /// California state law corpus.
    #[serde(rename = "California_state_law")]
    CaliforniaStateLaw,
    /// EU Digital Services Act.
    #[serde(rename = "EU_Digital_Service_Act")]
    EuDigitalServicesAct,
}

impl KnowledgeBase {
    /// All knowledge bases, in the same order as [`Region::all`].
    pub fn all() -> &'static [KnowledgeBase] {
        &[
            Self::UsReportingRequirements,
            Self::UtahSocialMediaAct,
            Self::FloridaSenate,
            Self::CaliforniaStateLaw,
            Self::EuDigitalServicesAct,
        ]
    }

    /// The region whose law this corpus covers.
    pub fn region(&self) -> Region {
        match self {
            Self::UsReportingRequirements => Region::Us,
            Self::UtahSocialMediaAct => Region::Utah,
            Self::FloridaSenate => Region::Florida,
            Self::CaliforniaStateLaw => Region::California,
            Self::EuDigitalServicesAct => Region::Eu,
        }
    }

    /// The corpus identifier as stored in document metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsReportingRequirements => "US_reporting_requirements_of_providers",
            Self::UtahSocialMediaAct => "Utah_Social_Media_Regulation_Act",
            Self::FloridaSenate => "The_Florida_Senate",
            Self::CaliforniaStateLaw => "California_state_law",
            Self::EuDigitalServicesAct => "EU_Digital_Service_Act",
        }
    }
}

impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KnowledgeBase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|kb| kb.as_str() == s)
            .copied()
            .ok_or_else(|| ValidationError::UnknownKnowledgeBase(s.to_string()))
    }
}
