//! API routes for the document server

pub mod documents;
pub mod jobs;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes.
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Ingestion - with body limit for multipart uploads
        .route(
            "/documents",
            post(documents::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Document lookup
        .route("/documents/:id", get(documents::get_document))
        // Analysis
        .route("/documents/:id/analyze", post(jobs::request_analysis))
        .route("/jobs/:id", get(jobs::job_status))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(state: axum::extract::State<AppState>) -> axum::Json<serde_json::Value> {
    let stats = state.queue_stats();
    axum::Json(serde_json::json!({
        "name": "docflow",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document ingestion with asynchronous LLM analysis",
        "endpoints": {
            "POST /api/documents": "Upload a PDF or DOCX document",
            "GET /api/documents/:id": "Get document details and analysis",
            "POST /api/documents/:id/analyze": "Queue analysis (force=true to re-run)",
            "GET /api/jobs/:id": "Get analysis job status"
        },
        "queue": stats,
    }))
}
