//! Downstream HR system sync.
//!
//! `sync_applications` resolves every requested application (all or nothing),
//! hands the batch to the `HrSync` collaborator, and only then marks the batch
//! synced in one transaction. `synced` is the final status, so every
//! application may move there.

pub mod handlers;
pub mod successfactors;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::store::{RecruitmentStore, StoreError, SyncRecord};

#[derive(Debug, Clone, Serialize)]
pub struct SyncReceipt {
    pub success: bool,
    pub synced_count: usize,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// What was (or would have been) sent downstream.
    pub payload: Value,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("application_ids must contain at least one id")]
    Empty,

    #[error("Some applications not found. Requested: {requested}, Found: {found}")]
    SomeApplicationsNotFound {
        requested: usize,
        found: usize,
        missing: Vec<Uuid>,
    },

    #[error("HR system rejected the sync: {0}")]
    Downstream(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait HrSync: Send + Sync {
    async fn sync(&self, records: &[SyncRecord]) -> Result<SyncReceipt, SyncError>;
}

pub async fn sync_applications(
    store: &dyn RecruitmentStore,
    hr: &dyn HrSync,
    application_ids: &[Uuid],
) -> Result<SyncReceipt, SyncError> {
    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = application_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();
    if ids.is_empty() {
        return Err(SyncError::Empty);
    }

    let records = store.sync_records(&ids).await?;
    if records.len() != ids.len() {
        let found: HashSet<Uuid> = records.iter().map(|r| r.application.id).collect();
        return Err(SyncError::SomeApplicationsNotFound {
            requested: ids.len(),
            found: records.len(),
            missing: ids.into_iter().filter(|id| !found.contains(id)).collect(),
        });
    }

    let receipt = hr.sync(&records).await?;
    store.mark_synced(&ids).await?;

    info!("Synced {} application(s) downstream", ids.len());
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::successfactors::MockSuccessFactors;
    use crate::models::ApplicationStatus;
    use crate::testing::{sample_job, sample_scores, MemoryStore, RejectingHrSync};

    fn seeded(store: &MemoryStore, count: usize) -> Vec<Uuid> {
        let job = store.seed_job(sample_job());
        (0..count)
            .map(|i| {
                let candidate = store.seed_candidate(&format!("sync{i}@example.com"));
                store
                    .seed_application(
                        job.id,
                        candidate.id,
                        ApplicationStatus::Shortlisted,
                        Some(sample_scores()),
                    )
                    .id
            })
            .collect()
    }

    #[tokio::test]
    async fn test_sync_marks_every_application_synced() {
        let store = MemoryStore::default();
        let ids = seeded(&store, 2);

        let receipt = sync_applications(&store, &MockSuccessFactors, &ids)
            .await
            .unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.synced_count, 2);
        for id in ids {
            assert_eq!(store.application_status(id), Some(ApplicationStatus::Synced));
        }
    }

    #[tokio::test]
    async fn test_duplicate_ids_collapse() {
        let store = MemoryStore::default();
        let ids = seeded(&store, 1);

        let receipt = sync_applications(&store, &MockSuccessFactors, &[ids[0], ids[0]])
            .await
            .unwrap();

        assert_eq!(receipt.synced_count, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_changes_nothing() {
        let store = MemoryStore::default();
        let ids = seeded(&store, 1);
        let missing = Uuid::new_v4();

        let err = sync_applications(&store, &MockSuccessFactors, &[ids[0], missing])
            .await
            .unwrap_err();

        match err {
            SyncError::SomeApplicationsNotFound {
                requested,
                found,
                missing: absent,
            } => {
                assert_eq!((requested, found), (2, 1));
                assert_eq!(absent, vec![missing]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            store.application_status(ids[0]),
            Some(ApplicationStatus::Shortlisted)
        );
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected() {
        let store = MemoryStore::default();
        let err = sync_applications(&store, &MockSuccessFactors, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Empty));
    }

    #[tokio::test]
    async fn test_downstream_failure_leaves_status_untouched() {
        let store = MemoryStore::default();
        let ids = seeded(&store, 1);

        let err = sync_applications(&store, &RejectingHrSync, &ids)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Downstream(_)));
        assert_eq!(
            store.application_status(ids[0]),
            Some(ApplicationStatus::Shortlisted)
        );
    }

    #[tokio::test]
    async fn test_sync_accepts_every_pipeline_status() {
        let store = MemoryStore::default();
        let job = store.seed_job(sample_job());
        let ids: Vec<Uuid> = [
            (ApplicationStatus::Parsed, None),
            (ApplicationStatus::Scored, Some(sample_scores())),
            (ApplicationStatus::Shortlisted, Some(sample_scores())),
            (ApplicationStatus::Synced, Some(sample_scores())),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (status, scores))| {
            let candidate = store.seed_candidate(&format!("status{i}@example.com"));
            store.seed_application(job.id, candidate.id, status, scores).id
        })
        .collect();

        let receipt = sync_applications(&store, &MockSuccessFactors, &ids)
            .await
            .unwrap();

        assert_eq!(receipt.synced_count, 4);
        for id in ids {
            assert_eq!(store.application_status(id), Some(ApplicationStatus::Synced));
        }
    }

    #[tokio::test]
    async fn test_resync_is_allowed() {
        let store = MemoryStore::default();
        let ids = seeded(&store, 1);
        sync_applications(&store, &MockSuccessFactors, &ids)
            .await
            .unwrap();

        let again = sync_applications(&store, &MockSuccessFactors, &ids)
            .await
            .unwrap();
        assert_eq!(again.synced_count, 1);
    }
}
