//! # Validation Errors
//!
//! Structured errors for domain-type construction. These map to 4xx
//! responses at the API boundary — see `AppError` in `geolex-api`.

use thiserror::Error;

/// Errors raised when constructing domain types from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The feature title is empty or whitespace-only.
    #[error("feature title must not be empty")]
    EmptyTitle,

    /// The feature description is empty or whitespace-only.
    #[error("feature description must not be empty")]
    EmptyDescription,

    /// A string did not name a known region.
    #[error("unknown region: {0}")]
    UnknownRegion(String),

    /// A string did not name a known knowledge base.
    #[error("unknown knowledge base: {0}")]
    UnknownKnowledgeBase(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ValidationError::EmptyTitle.to_string(),
            "feature title must not be empty"
        );
        assert!(ValidationError::UnknownRegion("mars".into())
            .to_string()
            .contains("mars"));
    }
}
