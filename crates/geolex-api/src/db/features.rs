//! Feature record persistence operations.
//!
//! [`PgFeatureStore`] implements the pipeline's `FeatureStore` seam over
//! the `features` table. The compliance map is stored as JSONB in the
//! shape the UI consumes (five region keys, `true`/`false`/`"unknown"`).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use geolex_core::ComplianceMap;
use geolex_pipeline::{FeatureStore, NewFeature, StoreError, StoredFeature};

/// Postgres-backed feature store.
#[derive(Debug, Clone)]
pub struct PgFeatureStore {
    pool: PgPool,
}

impl PgFeatureStore {
    /// Create a store over an initialized pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FeatureStore for PgFeatureStore {
    async fn insert(&self, feature: NewFeature) -> Result<StoredFeature, StoreError> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let compliance = serde_json::to_value(&feature.is_compliant)
            .map_err(|e| StoreError::Backend(format!("compliance map serialization: {e}")))?;

        sqlx::query(
            "INSERT INTO features (id, feature, description, is_compliant, reason, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&feature.feature)
        .bind(&feature.description)
        .bind(&compliance)
        .bind(&feature.reason)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(StoredFeature {
            id,
            feature: feature.feature,
            description: feature.description,
            is_compliant: feature.is_compliant,
            reason: feature.reason,
            created_at,
        })
    }

    async fn list(&self) -> Result<Vec<StoredFeature>, StoreError> {
        let rows = sqlx::query_as::<_, FeatureRow>(
            "SELECT id, feature, description, is_compliant, reason, created_at
             FROM features ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match row.into_record() {
                Some(record) => records.push(record),
                None => {
                    // into_record() already logs a warning; escalate for visibility.
                    tracing::error!("skipping feature row with invalid compliance map during list");
                }
            }
        }
        Ok(records)
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct FeatureRow {
    id: Uuid,
    feature: String,
    description: String,
    is_compliant: serde_json::Value,
    reason: String,
    created_at: DateTime<Utc>,
}

impl FeatureRow {
    fn into_record(self) -> Option<StoredFeature> {
        let is_compliant = match serde_json::from_value::<ComplianceMap>(self.is_compliant) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(
                    id = %self.id,
                    error = %e,
                    "skipping feature row with invalid compliance map"
                );
                return None;
            }
        };
        Some(StoredFeature {
            id: self.id,
            feature: self.feature,
            description: self.description,
            is_compliant,
            reason: self.reason,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolex_core::{Region, RegionVerdict};

    #[test]
    fn row_with_valid_map_converts() {
        let mut map = ComplianceMap::unknown();
        map.set(Region::Utah, RegionVerdict::NonCompliant);
        let row = FeatureRow {
            id: Uuid::new_v4(),
            feature: "f".to_string(),
            description: "d".to_string(),
            is_compliant: serde_json::to_value(&map).unwrap(),
            reason: "r".to_string(),
            created_at: Utc::now(),
        };
        let record = row.into_record().unwrap();
        assert_eq!(
            record.is_compliant.get(Region::Utah),
            RegionVerdict::NonCompliant
        );
    }

    #[test]
    fn row_with_invalid_map_is_skipped() {
        let row = FeatureRow {
            id: Uuid::new_v4(),
            feature: "f".to_string(),
            description: "d".to_string(),
            is_compliant: serde_json::json!("not a map"),
            reason: "r".to_string(),
            created_at: Utc::now(),
        };
        assert!(row.into_record().is_none());
    }
}
