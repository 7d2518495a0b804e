//! docflow: document ingestion with asynchronous LLM-powered analysis
//!
//! Uploaded PDF/DOCX documents are converted to plain text, stored (raw
//! bytes in a blob store, the record in SQLite) and enriched asynchronously
//! with an LLM-derived summary, document type and structured attributes.
//! Analysis runs on a background worker pool fed by a durable job queue;
//! duplicate and redelivered jobs are harmless thanks to an idempotency gate
//! on the persisted document state.

pub mod analysis;
pub mod config;
pub mod error;
pub mod extraction;
pub mod providers;
pub mod repository;
pub mod server;
pub mod service;
pub mod storage;
pub mod types;

pub use config::DocflowConfig;
pub use error::{Error, Result};
pub use service::{DocumentService, JobHandle};
pub use types::{Document, JobOutcome, JobState};
