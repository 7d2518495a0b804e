//! SQLite database for documents and analysis job bookkeeping
//!
//! The document row is the durable source of truth for analysis results; job
//! rows record queue delivery state so unfinished jobs can be re-delivered
//! after a restart.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{AnalysisJob, Document, DocumentUpdate, JobOutcome, JobState};

/// SQLite-backed document and job database
pub struct DocumentDb {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentDb {
    /// Create or open the database at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| Error::database(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::database(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run database migrations.
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        // WAL mode for better concurrency between request handlers and workers
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA cache_size=10000;
            PRAGMA temp_store=MEMORY;
        "#,
        )
        .map_err(|e| Error::database(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                original_name TEXT NOT NULL,
                mime_type TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                blob_key TEXT NOT NULL,
                extracted_text TEXT NOT NULL,
                summary TEXT,
                doc_type TEXT,
                metadata TEXT,
                created_at TEXT NOT NULL,
                analyzed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS analysis_jobs (
                job_id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                force INTEGER NOT NULL DEFAULT 0,
                state TEXT NOT NULL,
                result TEXT,
                failure_reason TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_state ON analysis_jobs(state);
            CREATE INDEX IF NOT EXISTS idx_jobs_document ON analysis_jobs(document_id);
        "#,
        )
        .map_err(|e| Error::database(format!("Failed to create tables: {}", e)))?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Insert a freshly ingested document.
    pub fn insert_document(&self, document: &Document) -> Result<()> {
        let conn = self.conn.lock();
        let metadata_json = document
            .metadata
            .as_ref()
            .map(|m| serde_json::to_string(m))
            .transpose()?;

        conn.execute(
            r#"
            INSERT INTO documents
                (id, original_name, mime_type, file_size, blob_key, extracted_text,
                 summary, doc_type, metadata, created_at, analyzed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
            params![
                document.id.to_string(),
                document.original_name,
                document.mime_type,
                document.file_size as i64,
                document.blob_key,
                document.extracted_text,
                document.summary,
                document.doc_type,
                metadata_json,
                document.created_at,
                document.analyzed_at,
            ],
        )
        .map_err(|e| Error::database(format!("Failed to insert document: {}", e)))?;

        Ok(())
    }

    /// Load a document by id.
    pub fn get_document(&self, id: &Uuid) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        conn.query_row(
            r#"
            SELECT id, original_name, mime_type, file_size, blob_key, extracted_text,
                   summary, doc_type, metadata, created_at, analyzed_at
            FROM documents WHERE id = ?1
        "#,
            params![id.to_string()],
            row_to_document,
        )
        .optional()
        .map_err(|e| Error::database(format!("Failed to load document: {}", e)))
    }

    /// Overwrite the analysis fields of a document in a single write.
    ///
    /// Returns the updated document, or None when no such row exists.
    pub fn update_document_analysis(
        &self,
        id: &Uuid,
        update: &DocumentUpdate,
        analyzed_at: DateTime<Utc>,
    ) -> Result<Option<Document>> {
        let metadata_json = serde_json::to_string(&update.metadata)?;

        {
            let conn = self.conn.lock();
            let changed = conn
                .execute(
                    r#"
                UPDATE documents
                SET summary = ?2, doc_type = ?3, metadata = ?4, analyzed_at = ?5
                WHERE id = ?1
            "#,
                    params![
                        id.to_string(),
                        update.summary,
                        update.doc_type,
                        metadata_json,
                        analyzed_at,
                    ],
                )
                .map_err(|e| Error::database(format!("Failed to update document: {}", e)))?;

            if changed == 0 {
                return Ok(None);
            }
        }

        self.get_document(id)
    }

    /// Count stored documents.
    #[cfg(test)]
    pub fn document_count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM documents", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|n| n as usize)
        .map_err(|e| Error::database(format!("Failed to count documents: {}", e)))
    }

    // ------------------------------------------------------------------
    // Analysis jobs
    // ------------------------------------------------------------------

    /// Persist a newly enqueued job.
    pub fn insert_job(&self, job: &AnalysisJob) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO analysis_jobs
                (job_id, document_id, force, state, result, failure_reason, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
            params![
                job.job_id.to_string(),
                job.document_id.to_string(),
                job.force,
                job.state.as_str(),
                job.result.as_ref().map(serde_json::to_string).transpose()?,
                job.failure_reason,
                job.created_at,
                job.updated_at,
            ],
        )
        .map_err(|e| Error::database(format!("Failed to insert job: {}", e)))?;

        Ok(())
    }

    /// Persist a job state transition.
    pub fn update_job(&self, job: &AnalysisJob) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            UPDATE analysis_jobs
            SET state = ?2, result = ?3, failure_reason = ?4, updated_at = ?5
            WHERE job_id = ?1
        "#,
            params![
                job.job_id.to_string(),
                job.state.as_str(),
                job.result.as_ref().map(serde_json::to_string).transpose()?,
                job.failure_reason,
                job.updated_at,
            ],
        )
        .map_err(|e| Error::database(format!("Failed to update job: {}", e)))?;

        Ok(())
    }

    /// Load a job by id.
    pub fn get_job(&self, job_id: &Uuid) -> Result<Option<AnalysisJob>> {
        let conn = self.conn.lock();
        conn.query_row(
            r#"
            SELECT job_id, document_id, force, state, result, failure_reason, created_at, updated_at
            FROM analysis_jobs WHERE job_id = ?1
        "#,
            params![job_id.to_string()],
            row_to_job,
        )
        .optional()
        .map_err(|e| Error::database(format!("Failed to load job: {}", e)))
    }

    /// Load all jobs that have not reached a terminal state.
    pub fn incomplete_jobs(&self) -> Result<Vec<AnalysisJob>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                r#"
            SELECT job_id, document_id, force, state, result, failure_reason, created_at, updated_at
            FROM analysis_jobs
            WHERE state IN ('waiting', 'active')
            ORDER BY created_at ASC
        "#,
            )
            .map_err(|e| Error::database(format!("Failed to prepare query: {}", e)))?;

        let jobs = stmt
            .query_map([], row_to_job)
            .map_err(|e| Error::database(format!("Failed to query jobs: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::database(format!("Failed to read job row: {}", e)))?;

        Ok(jobs)
    }
}

fn parse_uuid(value: String, index: usize) -> std::result::Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

fn row_to_document(row: &Row<'_>) -> std::result::Result<Document, rusqlite::Error> {
    let metadata: Option<String> = row.get(8)?;
    let metadata = metadata
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Document {
        id: parse_uuid(row.get(0)?, 0)?,
        original_name: row.get(1)?,
        mime_type: row.get(2)?,
        file_size: row.get::<_, i64>(3)? as u64,
        blob_key: row.get(4)?,
        extracted_text: row.get(5)?,
        summary: row.get(6)?,
        doc_type: row.get(7)?,
        metadata,
        created_at: row.get(9)?,
        analyzed_at: row.get(10)?,
    })
}

fn row_to_job(row: &Row<'_>) -> std::result::Result<AnalysisJob, rusqlite::Error> {
    let state: String = row.get(3)?;
    let state = JobState::from_str(&state).unwrap_or(JobState::Failed);

    let result: Option<String> = row.get(4)?;
    let result: Option<JobOutcome> = result
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(AnalysisJob {
        job_id: parse_uuid(row.get(0)?, 0)?,
        document_id: parse_uuid(row.get(1)?, 1)?,
        force: row.get(2)?,
        state,
        result,
        failure_reason: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
