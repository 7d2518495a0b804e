//! Core types for the document pipeline

pub mod document;
pub mod job;
pub mod response;

pub use document::{Document, DocumentUpdate, NewDocument};
pub use job::{AnalysisJob, JobOutcome, JobState, QueuedJob};
pub use response::{AnalyzeAccepted, JobStatusResponse};
