//! # Feature Store
//!
//! Persistence seam for finalized feature records. A record is written
//! exactly once per successful pipeline run and is immutable afterwards —
//! the trait deliberately has no update or delete operation.
//!
//! [`MemoryFeatureStore`] backs DB-less deployments and tests; the
//! Postgres implementation lives in `geolex-api` next to the connection
//! pool it needs.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use geolex_core::ComplianceMap;

/// A finalized record ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeature {
    /// The feature title.
    pub feature: String,
    /// The feature description.
    pub description: String,
    /// Total per-region verdict map.
    pub is_compliant: ComplianceMap,
    /// Reasoning text from the model or the short-circuit path.
    pub reason: String,
}

/// A persisted feature record, as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFeature {
    /// Store-generated identifier.
    pub id: Uuid,
    /// The feature title.
    pub feature: String,
    /// The feature description.
    pub description: String,
    /// Total per-region verdict map.
    #[serde(rename = "isCompliant")]
    pub is_compliant: ComplianceMap,
    /// Reasoning text.
    pub reason: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Errors from the feature store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("feature store backend failure: {0}")]
    Backend(String),
}

/// Persistence seam for finalized feature records.
#[async_trait::async_trait]
pub trait FeatureStore: Send + Sync {
    /// Insert a finalized record, returning it with its generated id.
    async fn insert(&self, feature: NewFeature) -> Result<StoredFeature, StoreError>;

    /// List stored records, newest first.
    async fn list(&self) -> Result<Vec<StoredFeature>, StoreError>;
}

/// In-memory feature store for DB-less mode and tests.
#[derive(Debug, Default)]
pub struct MemoryFeatureStore {
    records: RwLock<Vec<StoredFeature>>,
}

impl MemoryFeatureStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait::async_trait]
impl FeatureStore for MemoryFeatureStore {
    async fn insert(&self, feature: NewFeature) -> Result<StoredFeature, StoreError> {
        let stored = StoredFeature {
            id: Uuid::new_v4(),
            feature: feature.feature,
            description: feature.description,
            is_compliant: feature.is_compliant,
            reason: feature.reason,
            created_at: Utc::now(),
        };
        self.records.write().push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredFeature>, StoreError> {
        let mut records = self.records.read().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolex_core::{Region, RegionVerdict};

    fn new_feature(title: &str) -> NewFeature {
        NewFeature {
            feature: title.to_string(),
            description: "desc".to_string(),
            is_compliant: ComplianceMap::unknown(),
            reason: "r".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_unique_ids() {
        let store = MemoryFeatureStore::new();
        let a = store.insert(new_feature("a")).await.unwrap();
        let b = store.insert(new_feature("b")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let store = MemoryFeatureStore::new();
        store.insert(new_feature("first")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store.insert(new_feature("second")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].feature, "second");
        assert_eq!(listed[1].feature, "first");
    }

    #[test]
    fn stored_feature_serializes_compliance_under_camel_case_key() {
        let mut map = ComplianceMap::unknown();
        map.set(Region::Utah, RegionVerdict::NonCompliant);
        let stored = StoredFeature {
            id: Uuid::nil(),
            feature: "f".to_string(),
            description: "d".to_string(),
            is_compliant: map,
            reason: "r".to_string(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert!(value.get("isCompliant").is_some());
        assert_eq!(value["isCompliant"]["utah"], serde_json::json!(false));
        assert_eq!(value["isCompliant"]["eu"], serde_json::json!("unknown"));
    }
}
