//! Document repository abstraction
//!
//! The pipeline only ever needs create, lookup, and partial update; the
//! trait keeps the orchestrator and worker independent of the concrete
//! persistence backend.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::DocumentDb;
use crate::types::{Document, DocumentUpdate, NewDocument};

/// CRUD surface over persisted documents
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Create a document from ingestion fields.
    async fn create(&self, fields: NewDocument) -> Result<Document>;

    /// Load a document by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>>;

    /// Apply a partial update and return the updated document.
    async fn update_by_id(&self, id: Uuid, update: DocumentUpdate) -> Result<Document>;
}

#[async_trait]
impl DocumentRepository for DocumentDb {
    async fn create(&self, fields: NewDocument) -> Result<Document> {
        let document = Document::new(fields);
        self.insert_document(&document)?;
        Ok(document)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        self.get_document(&id)
    }

    async fn update_by_id(&self, id: Uuid, update: DocumentUpdate) -> Result<Document> {
        self.update_document_analysis(&id, &update, Utc::now())?
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))
    }
}
