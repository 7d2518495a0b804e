//! Document upload and lookup endpoints

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::Document;

/// POST /api/documents - Upload a single PDF or DOCX file
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Document>> {
    let mut uploaded: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        Error::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        // Only fields carrying a file are considered
        let Some(original_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        if uploaded.is_some() {
            return Err(Error::BadRequest(
                "Please upload only one file at a time".to_string(),
            ));
        }

        let content_type = field.content_type().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::BadRequest(format!("Failed to read file: {}", e)))?;

        // Fall back to extension-based detection when the part has no
        // declared content type
        let mime_type = content_type.unwrap_or_else(|| {
            mime_guess::from_path(&original_name)
                .first_or_octet_stream()
                .to_string()
        });

        uploaded = Some((original_name, mime_type, data.to_vec()));
    }

    let (original_name, mime_type, data) =
        uploaded.ok_or_else(|| Error::BadRequest("No file provided".to_string()))?;

    tracing::info!(
        "Received upload: {} ({}, {} bytes)",
        original_name,
        mime_type,
        data.len()
    );

    let document = state.service().ingest(&data, &original_name, &mime_type).await?;
    Ok(Json(document))
}

/// GET /api/documents/:id - Get document details and analysis
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>> {
    let document = state.service().get_document(id).await?;
    Ok(Json(document))
}
