//! Document service: the pipeline-facing API
//!
//! Composes the repository, blob store and analysis queue. Ingestion is
//! fully synchronous from the caller's perspective; analysis is queued and
//! runs on the worker pool.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::analysis::AnalysisQueue;
use crate::error::{Error, Result};
use crate::extraction::TextExtractor;
use crate::providers::BlobStore;
use crate::repository::DocumentRepository;
use crate::types::{Document, JobStatusResponse, NewDocument};

/// Handle returned from an accepted analysis request
#[derive(Debug, Clone, Serialize)]
pub struct JobHandle {
    pub job_id: Uuid,
}

/// Service composing ingestion, analysis requests and status queries
pub struct DocumentService {
    repository: Arc<dyn DocumentRepository>,
    blob_store: Arc<dyn BlobStore>,
    queue: Arc<AnalysisQueue>,
}

impl DocumentService {
    /// Create a new service from injected collaborators.
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        blob_store: Arc<dyn BlobStore>,
        queue: Arc<AnalysisQueue>,
    ) -> Self {
        Self {
            repository,
            blob_store,
            queue,
        }
    }

    /// Ingest an uploaded document.
    ///
    /// Validates the MIME type before any extraction or storage work, then
    /// extracts text, uploads the raw bytes and creates the document record.
    /// Any failure aborts the whole operation; no partial document is
    /// created. No analysis happens here.
    pub async fn ingest(
        &self,
        data: &[u8],
        original_name: &str,
        mime_type: &str,
    ) -> Result<Document> {
        if !TextExtractor::is_supported(mime_type) {
            return Err(Error::UnsupportedType(mime_type.to_string()));
        }

        let extracted_text = TextExtractor::extract(data, mime_type)?;

        let blob_key = blob_key_for(original_name);
        self.blob_store.put(&blob_key, data, mime_type).await?;

        let document = self
            .repository
            .create(NewDocument {
                original_name: original_name.to_string(),
                mime_type: mime_type.to_string(),
                file_size: data.len() as u64,
                blob_key,
                extracted_text,
            })
            .await?;

        tracing::info!(
            "Ingested document {} ({}, {} bytes)",
            document.id,
            document.original_name,
            document.file_size
        );

        Ok(document)
    }

    /// Queue an analysis job for a document.
    ///
    /// Never blocks on the LLM: the returned handle is available immediately
    /// and the job runs on the worker pool.
    pub async fn request_analysis(&self, document_id: Uuid, force: bool) -> Result<JobHandle> {
        let document = self
            .repository
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| Error::DocumentNotFound(document_id.to_string()))?;

        if document.is_analyzed() && !force {
            return Err(Error::AlreadyAnalyzed(document_id.to_string()));
        }

        // The ingestion invariant guarantees text is present; this guards
        // against data corruption.
        if document.extracted_text.trim().is_empty() {
            return Err(Error::EmptyExtraction);
        }

        let job_id = self.queue.enqueue(document_id, force).await?;
        tracing::info!(
            "Queued analysis job {} for document {} (force: {})",
            job_id,
            document_id,
            force
        );

        Ok(JobHandle { job_id })
    }

    /// Report the state of an analysis job.
    ///
    /// An unknown id is a valid absent state, not an error.
    pub fn job_status(&self, job_id: Uuid) -> JobStatusResponse {
        match self.queue.get_job(job_id) {
            Some(job) => JobStatusResponse::from_job(&job),
            None => JobStatusResponse::not_found(job_id),
        }
    }

    /// Load a document by id.
    pub async fn get_document(&self, document_id: Uuid) -> Result<Document> {
        self.repository
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| Error::DocumentNotFound(document_id.to_string()))
    }
}

/// Generate a time-ordered, collision-resistant blob key.
fn blob_key_for(original_name: &str) -> String {
    format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        sanitize_name(original_name)
    )
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::extraction::testutil::pdf_with_pages;
    use crate::extraction::MIME_PDF;
    use crate::storage::DocumentDb;
    use crate::types::DocumentUpdate;

    /// Blob store stub recording every put.
    #[derive(Default)]
    struct RecordingBlobStore {
        puts: Mutex<Vec<(String, usize, String)>>,
        fail_puts: bool,
    }

    impl RecordingBlobStore {
        fn failing() -> Self {
            Self {
                puts: Mutex::new(Vec::new()),
                fail_puts: true,
            }
        }

        fn put_count(&self) -> usize {
            self.puts.lock().len()
        }
    }

    #[async_trait]
    impl BlobStore for RecordingBlobStore {
        async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
            if self.fail_puts {
                return Err(Error::blob_store("upload rejected"));
            }
            self.puts
                .lock()
                .push((key.to_string(), data.len(), content_type.to_string()));
            Ok(())
        }

        async fn get(&self, _key: &str) -> Result<Vec<u8>> {
            Err(Error::blob_store("not implemented"))
        }

        async fn exists(&self, _key: &str) -> Result<bool> {
            Ok(false)
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct Harness {
        db: Arc<DocumentDb>,
        blob_store: Arc<RecordingBlobStore>,
        service: DocumentService,
        // Keeps the channel open so enqueues succeed without a worker
        _receiver: tokio::sync::mpsc::Receiver<crate::types::QueuedJob>,
    }

    fn harness_with_store(blob_store: RecordingBlobStore) -> Harness {
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        let blob_store = Arc::new(blob_store);
        let (queue, receiver) = AnalysisQueue::new(Arc::clone(&db));
        let repository: Arc<dyn DocumentRepository> = db.clone();
        let store: Arc<dyn BlobStore> = blob_store.clone();
        let service = DocumentService::new(repository, store, Arc::new(queue));
        Harness {
            db,
            blob_store,
            service,
            _receiver: receiver,
        }
    }

    fn harness() -> Harness {
        harness_with_store(RecordingBlobStore::default())
    }

    fn sample_pdf(text: &str) -> Vec<u8> {
        pdf_with_pages(&[text])
    }

    #[tokio::test]
    async fn test_ingest_creates_document() {
        let h = harness();
        let pdf = sample_pdf("Signed purchase order");

        let document = h
            .service
            .ingest(&pdf, "order.pdf", MIME_PDF)
            .await
            .unwrap();

        assert_eq!(document.original_name, "order.pdf");
        assert_eq!(document.mime_type, MIME_PDF);
        assert_eq!(document.file_size, pdf.len() as u64);
        assert!(document.extracted_text.contains("Signed purchase order"));
        assert!(document.blob_key.ends_with("-order.pdf"));
        assert!(!document.is_analyzed());

        // One blob write, one repository insert
        assert_eq!(h.blob_store.put_count(), 1);
        assert!(h.db.get_document(&document.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unsupported_type_rejected_before_any_work() {
        let h = harness();

        let result = h.service.ingest(b"bytes", "notes.txt", "text/plain").await;
        assert!(matches!(result, Err(Error::UnsupportedType(_))));

        // Fail fast: no blob upload, no document
        assert_eq!(h.blob_store.put_count(), 0);
        assert_eq!(h.db.document_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_blob_upload() {
        let h = harness();

        let result = h.service.ingest(b"garbage", "broken.pdf", MIME_PDF).await;
        assert!(matches!(result, Err(Error::Extraction { .. })));
        assert_eq!(h.blob_store.put_count(), 0);
        assert_eq!(h.db.document_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blob_failure_creates_no_document() {
        let h = harness_with_store(RecordingBlobStore::failing());
        let pdf = sample_pdf("content");

        let result = h.service.ingest(&pdf, "doc.pdf", MIME_PDF).await;
        assert!(matches!(result, Err(Error::BlobStore(_))));
        assert_eq!(h.db.document_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_request_analysis_enqueues_job() {
        let h = harness();
        let pdf = sample_pdf("content to analyze");
        let document = h.service.ingest(&pdf, "doc.pdf", MIME_PDF).await.unwrap();

        let handle = h.service.request_analysis(document.id, false).await.unwrap();

        let status = h.service.job_status(handle.job_id);
        assert_eq!(status.state, "waiting");
        assert_eq!(status.document_id, Some(document.id));
        assert_eq!(status.force, Some(false));
    }

    #[tokio::test]
    async fn test_request_analysis_missing_document() {
        let h = harness();
        let result = h.service.request_analysis(Uuid::new_v4(), false).await;
        assert!(matches!(result, Err(Error::DocumentNotFound(_))));
    }

    #[tokio::test]
    async fn test_second_request_without_force_is_rejected() {
        let h = harness();
        let pdf = sample_pdf("content");
        let document = h.service.ingest(&pdf, "doc.pdf", MIME_PDF).await.unwrap();

        // Simulate a completed analysis
        let repository: Arc<dyn DocumentRepository> = h.db.clone();
        repository
            .update_by_id(
                document.id,
                DocumentUpdate {
                    summary: "done".to_string(),
                    doc_type: None,
                    metadata: serde_json::Map::new(),
                },
            )
            .await
            .unwrap();

        let result = h.service.request_analysis(document.id, false).await;
        assert!(matches!(result, Err(Error::AlreadyAnalyzed(_))));

        // force=true passes the gate
        let handle = h.service.request_analysis(document.id, true).await.unwrap();
        assert_eq!(h.service.job_status(handle.job_id).state, "waiting");
    }

    #[tokio::test]
    async fn test_job_status_unknown_id_is_not_found() {
        let h = harness();
        let status = h.service.job_status(Uuid::new_v4());
        assert_eq!(status.state, "not_found");
    }

    #[tokio::test]
    async fn test_get_document() {
        let h = harness();
        let pdf = sample_pdf("content");
        let created = h.service.ingest(&pdf, "doc.pdf", MIME_PDF).await.unwrap();

        let loaded = h.service.get_document(created.id).await.unwrap();
        assert_eq!(loaded.id, created.id);

        let missing = h.service.get_document(Uuid::new_v4()).await;
        assert!(matches!(missing, Err(Error::DocumentNotFound(_))));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("simple.pdf"), "simple.pdf");
        assert_eq!(sanitize_name("with space.pdf"), "with_space.pdf");
        assert_eq!(sanitize_name("../../etc/passwd"), ".._.._etc_passwd");
    }
}
