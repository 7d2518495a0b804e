//! API response types

use serde::Serialize;
use uuid::Uuid;

use super::job::{AnalysisJob, JobOutcome};

/// Response from queueing an analysis job
#[derive(Debug, Serialize)]
pub struct AnalyzeAccepted {
    pub job_id: Uuid,
    pub document_id: Uuid,
    pub message: String,
}

/// Job status as reported to callers.
///
/// Unknown job ids yield a `not_found` state rather than an error.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl JobStatusResponse {
    pub fn from_job(job: &AnalysisJob) -> Self {
        Self {
            job_id: job.job_id,
            state: job.state.as_str().to_string(),
            document_id: Some(job.document_id),
            force: Some(job.force),
            result: job.result.clone(),
            failure_reason: job.failure_reason.clone(),
            created_at: Some(job.created_at.to_rfc3339()),
            updated_at: Some(job.updated_at.to_rfc3339()),
        }
    }

    pub fn not_found(job_id: Uuid) -> Self {
        Self {
            job_id,
            state: "not_found".to_string(),
            document_id: None,
            force: None,
            result: None,
            failure_reason: None,
            created_at: None,
            updated_at: None,
        }
    }
}
