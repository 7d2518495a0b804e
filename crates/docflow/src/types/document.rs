//! Document model
//!
//! A document is created once at ingestion with its extracted text and is
//! mutated only by the analysis worker's completion step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A document that has been ingested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID, assigned at creation
    pub id: Uuid,
    /// Original filename as uploaded
    pub original_name: String,
    /// Declared MIME type
    pub mime_type: String,
    /// File size in bytes
    pub file_size: u64,
    /// Key of the raw bytes in the blob store
    pub blob_key: String,
    /// Plain text extracted once at ingestion (never re-extracted)
    pub extracted_text: String,
    /// LLM-generated summary; None until the first successful analysis
    pub summary: Option<String>,
    /// LLM-classified document type (e.g. Invoice, Resume, Report)
    pub doc_type: Option<String>,
    /// Structured attributes extracted by analysis; overwritten on re-analysis
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    /// Ingestion timestamp
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent successful analysis
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Create a document from ingestion fields, assigning id and timestamp.
    pub fn new(fields: NewDocument) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_name: fields.original_name,
            mime_type: fields.mime_type,
            file_size: fields.file_size,
            blob_key: fields.blob_key,
            extracted_text: fields.extracted_text,
            summary: None,
            doc_type: None,
            metadata: None,
            created_at: Utc::now(),
            analyzed_at: None,
        }
    }

    /// Whether this document has completed at least one analysis.
    pub fn is_analyzed(&self) -> bool {
        self.summary.is_some()
    }
}

/// Fields captured at ingestion time
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub original_name: String,
    pub mime_type: String,
    pub file_size: u64,
    pub blob_key: String,
    pub extracted_text: String,
}

/// Partial update applied by a successful analysis.
///
/// The analysis fields are replaced wholesale; attributes are never merged
/// with a previous run's.
#[derive(Debug, Clone)]
pub struct DocumentUpdate {
    pub summary: String,
    pub doc_type: Option<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}
