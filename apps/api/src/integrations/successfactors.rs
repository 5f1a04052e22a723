//! Mock SAP SuccessFactors recruiting client.
//!
//! Builds the payload a real `JobApplication` push would carry, logs it, and
//! reports success without any network call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{HrSync, SyncError, SyncReceipt};
use crate::models::ScoreVector;
use crate::store::SyncRecord;

const SOURCE: &str = "TALENT_ACQUISITION";
const SYNCED_STATUS: &str = "SHORTLISTED";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessFactorsPayload {
    pub sync_timestamp: DateTime<Utc>,
    pub applications: Vec<SuccessFactorsApplication>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessFactorsApplication {
    pub candidate_id: Uuid,
    pub job_requisition_id: Uuid,
    pub job_title: String,
    pub application_date: DateTime<Utc>,
    pub status: &'static str,
    pub source: &'static str,
    pub candidate_profile: CandidateProfile,
    pub scores: Option<ScoreVector>,
    pub resume_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

/// First whitespace-separated token, and everything after it.
fn split_name(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

pub fn build_payload(records: &[SyncRecord], now: DateTime<Utc>) -> SuccessFactorsPayload {
    let applications = records
        .iter()
        .map(|record| {
            let (first_name, last_name) = split_name(&record.candidate.name);
            SuccessFactorsApplication {
                candidate_id: record.candidate.id,
                job_requisition_id: record.job.id,
                job_title: record.job.title.clone(),
                application_date: record.application.created_at,
                status: SYNCED_STATUS,
                source: SOURCE,
                candidate_profile: CandidateProfile {
                    first_name,
                    last_name,
                    email: record.candidate.email.clone(),
                    phone_number: record.candidate.phone.clone().unwrap_or_default(),
                },
                scores: record.application.scores.as_ref().map(|s| s.0),
                resume_url: record.candidate.resume_url.clone(),
            }
        })
        .collect();

    SuccessFactorsPayload {
        sync_timestamp: now,
        applications,
    }
}

pub struct MockSuccessFactors;

#[async_trait]
impl HrSync for MockSuccessFactors {
    async fn sync(&self, records: &[SyncRecord]) -> Result<SyncReceipt, SyncError> {
        let now = Utc::now();
        let payload = serde_json::to_value(build_payload(records, now))
            .map_err(|e| SyncError::Downstream(format!("payload encoding failed: {e}")))?;

        info!("Mock SuccessFactors sync payload: {payload}");

        let message = format!(
            "Successfully synced {} application(s) to SuccessFactors",
            records.len()
        );
        info!("Mock sync completed: {message}");

        Ok(SyncReceipt {
            success: true,
            synced_count: records.len(),
            message,
            timestamp: now,
            payload,
        })
    }
}
