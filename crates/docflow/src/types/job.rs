//! Analysis job types
//!
//! Job state is owned by the queue; the worker drives transitions through
//! queue methods only. Jobs are retained after completion for status queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an analysis job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Waiting,
    Active,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(Self::Waiting),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Outcome attached to a completed job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    /// Document was already analyzed and force was not set
    Skipped { message: String },
    /// Analysis ran and the document was updated
    Analyzed { document_id: Uuid },
}

/// An analysis job tracked by the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    /// Queue-assigned identifier
    pub job_id: Uuid,
    /// Document under analysis (back-reference only)
    pub document_id: Uuid,
    /// Re-analysis flag, captured at enqueue time
    pub force: bool,
    pub state: JobState,
    /// Set exactly once, on the completed transition
    pub result: Option<JobOutcome>,
    /// Set exactly once, on the failed transition
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisJob {
    /// Create a new waiting job.
    pub fn new(document_id: Uuid, force: bool) -> Self {
        let now = Utc::now();
        Self {
            job_id: Uuid::new_v4(),
            document_id,
            force,
            state: JobState::Waiting,
            result: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Message handed from the queue to the worker pool.
///
/// Carries only the identifiers; the worker reloads the document fresh and
/// never trusts payload data beyond id and force.
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub job_id: Uuid,
    pub document_id: Uuid,
    pub force: bool,
}
