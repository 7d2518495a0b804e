//! Analysis request and job status endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AnalyzeAccepted, JobStatusResponse};

/// Query parameters for the analyze endpoint
#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    /// Re-run analysis even when the document already has a summary
    #[serde(default)]
    pub force: bool,
}

/// POST /api/documents/:id/analyze - Queue analysis for a document
pub async fn request_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Json<AnalyzeAccepted>> {
    let handle = state.service().request_analysis(id, params.force).await?;

    Ok(Json(AnalyzeAccepted {
        job_id: handle.job_id,
        document_id: id,
        message: format!(
            "Analysis queued. Use /api/jobs/{} to check progress.",
            handle.job_id
        ),
    }))
}

/// GET /api/jobs/:id - Get analysis job status
///
/// Unknown ids report a `not_found` state with HTTP 200; absence is a valid
/// answer, not an error.
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Json<JobStatusResponse> {
    Json(state.service().job_status(job_id))
}
