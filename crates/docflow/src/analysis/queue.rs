//! Durable analysis job queue
//!
//! Jobs live in an in-memory map for fast status queries and are mirrored to
//! SQLite so unfinished work survives a restart. Delivery is at-least-once:
//! a job interrupted mid-flight is re-queued on startup, and the worker's
//! idempotency gate makes the redelivery harmless.

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::Result;
use crate::storage::DocumentDb;
use crate::types::{AnalysisJob, JobOutcome, JobState, QueuedJob};

/// Queue for analysis jobs with database persistence
pub struct AnalysisQueue {
    /// Jobs by id, including completed ones (retained for status queries)
    jobs: Arc<DashMap<Uuid, AnalysisJob>>,
    /// Channel for handing jobs to workers
    sender: mpsc::Sender<QueuedJob>,
    /// Jobs currently waiting or active
    queue_depth: Arc<AtomicUsize>,
    /// Database for persistence
    db: Arc<DocumentDb>,
}

impl AnalysisQueue {
    /// Create a new queue with database persistence.
    pub fn new(db: Arc<DocumentDb>) -> (Self, mpsc::Receiver<QueuedJob>) {
        let (sender, receiver) = mpsc::channel(1024);

        let queue = Self {
            jobs: Arc::new(DashMap::new()),
            sender,
            queue_depth: Arc::new(AtomicUsize::new(0)),
            db,
        };

        (queue, receiver)
    }

    /// Enqueue an analysis job for a document.
    ///
    /// Returns the queue-assigned job id immediately; processing happens on
    /// the worker pool.
    pub async fn enqueue(&self, document_id: Uuid, force: bool) -> Result<Uuid> {
        let job = AnalysisJob::new(document_id, force);
        let job_id = job.job_id;

        self.jobs.insert(job_id, job.clone());
        self.queue_depth.fetch_add(1, Ordering::SeqCst);

        if let Err(e) = self.db.insert_job(&job) {
            tracing::error!("Failed to persist job {}: {}", job_id, e);
        }

        let message = QueuedJob {
            job_id,
            document_id,
            force,
        };
        if let Err(e) = self.sender.send(message).await {
            tracing::error!("Failed to hand job {} to workers: {}", job_id, e);
            self.fail(job_id, format!("Queue handoff failed: {}", e));
        }

        Ok(job_id)
    }

    /// Look up a job by id.
    ///
    /// Falls back to the database so terminal jobs remain queryable after a
    /// restart.
    pub fn get_job(&self, job_id: Uuid) -> Option<AnalysisJob> {
        if let Some(job) = self.jobs.get(&job_id) {
            return Some(job.clone());
        }

        match self.db.get_job(&job_id) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!("Failed to load job {}: {}", job_id, e);
                None
            }
        }
    }

    /// Mark a job as picked up by a worker.
    pub fn mark_active(&self, job_id: Uuid) {
        self.transition(job_id, JobState::Active, None, None);
    }

    /// Mark a job completed with its outcome.
    pub fn complete(&self, job_id: Uuid, outcome: JobOutcome) {
        self.transition(job_id, JobState::Completed, Some(outcome), None);
    }

    /// Mark a job failed with the captured reason.
    pub fn fail(&self, job_id: Uuid, reason: String) {
        self.transition(job_id, JobState::Failed, None, Some(reason));
    }

    fn transition(
        &self,
        job_id: Uuid,
        state: JobState,
        result: Option<JobOutcome>,
        failure_reason: Option<String>,
    ) {
        let snapshot = if let Some(mut job) = self.jobs.get_mut(&job_id) {
            job.state = state;
            if job.result.is_none() {
                job.result = result;
            }
            if job.failure_reason.is_none() {
                job.failure_reason = failure_reason;
            }
            job.updated_at = Utc::now();
            job.clone()
            // Entry guard dropped here, before the database write
        } else {
            tracing::warn!("State transition for unknown job {}", job_id);
            return;
        };

        if state.is_terminal() {
            self.queue_depth.fetch_sub(1, Ordering::SeqCst);
        }

        if let Err(e) = self.db.update_job(&snapshot) {
            tracing::error!("Failed to persist job {} state: {}", job_id, e);
        }
    }

    /// Re-enqueue persisted jobs that never reached a terminal state.
    ///
    /// Jobs that were `active` when the process died are reset to waiting and
    /// redelivered. Returns the number of jobs re-queued.
    pub async fn resume_pending(&self) -> usize {
        let pending = match self.db.incomplete_jobs() {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!("Failed to load unfinished jobs: {}", e);
                return 0;
            }
        };

        let mut resumed = 0;
        for mut job in pending {
            job.state = JobState::Waiting;
            job.updated_at = Utc::now();

            let message = QueuedJob {
                job_id: job.job_id,
                document_id: job.document_id,
                force: job.force,
            };

            self.jobs.insert(job.job_id, job.clone());
            self.queue_depth.fetch_add(1, Ordering::SeqCst);

            if let Err(e) = self.db.update_job(&job) {
                tracing::error!("Failed to persist resumed job {}: {}", job.job_id, e);
            }

            if let Err(e) = self.sender.send(message).await {
                tracing::error!("Failed to re-queue job {}: {}", job.job_id, e);
                self.fail(job.job_id, format!("Queue handoff failed: {}", e));
                continue;
            }

            tracing::info!(
                "Re-queued analysis job {} for document {}",
                job.job_id,
                job.document_id
            );
            resumed += 1;
        }

        resumed
    }

    /// Get queue statistics.
    pub fn stats(&self) -> QueueStats {
        let mut stats = QueueStats {
            total_jobs: self.jobs.len(),
            ..Default::default()
        };

        for entry in self.jobs.iter() {
            match entry.state {
                JobState::Waiting => stats.waiting += 1,
                JobState::Active => stats.active += 1,
                JobState::Completed => stats.completed += 1,
                JobState::Failed => stats.failed += 1,
            }
        }

        stats.depth = self.queue_depth.load(Ordering::SeqCst);
        stats
    }
}

/// Queue statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueStats {
    pub total_jobs: usize,
    pub waiting: usize,
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
    /// Jobs not yet in a terminal state
    pub depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_with_db() -> (Arc<DocumentDb>, AnalysisQueue, mpsc::Receiver<QueuedJob>) {
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        let (queue, receiver) = AnalysisQueue::new(Arc::clone(&db));
        (db, queue, receiver)
    }

    #[tokio::test]
    async fn test_enqueue_creates_waiting_job() {
        let (_db, queue, mut receiver) = queue_with_db();
        let document_id = Uuid::new_v4();

        let job_id = queue.enqueue(document_id, false).await.unwrap();

        let job = queue.get_job(job_id).unwrap();
        assert_eq!(job.state, JobState::Waiting);
        assert_eq!(job.document_id, document_id);
        assert!(!job.force);

        // The worker channel received the handoff message
        let message = receiver.recv().await.unwrap();
        assert_eq!(message.job_id, job_id);
        assert_eq!(message.document_id, document_id);
    }

    #[tokio::test]
    async fn test_transitions_and_stats() {
        let (_db, queue, _receiver) = queue_with_db();

        let job_id = queue.enqueue(Uuid::new_v4(), false).await.unwrap();
        assert_eq!(queue.stats().waiting, 1);
        assert_eq!(queue.stats().depth, 1);

        queue.mark_active(job_id);
        assert_eq!(queue.get_job(job_id).unwrap().state, JobState::Active);

        queue.complete(
            job_id,
            JobOutcome::Skipped {
                message: "Already analyzed".to_string(),
            },
        );

        let job = queue.get_job(job_id).unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert!(matches!(job.result, Some(JobOutcome::Skipped { .. })));
        assert_eq!(queue.stats().depth, 0);
        assert_eq!(queue.stats().completed, 1);
    }

    #[tokio::test]
    async fn test_failed_job_records_reason() {
        let (_db, queue, _receiver) = queue_with_db();

        let job_id = queue.enqueue(Uuid::new_v4(), true).await.unwrap();
        queue.mark_active(job_id);
        queue.fail(job_id, "LLM unreachable".to_string());

        let job = queue.get_job(job_id).unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.failure_reason.as_deref(), Some("LLM unreachable"));
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_job_is_none() {
        let (_db, queue, _receiver) = queue_with_db();
        assert!(queue.get_job(Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn test_resume_pending_redelivers_unfinished_jobs() {
        let db = Arc::new(DocumentDb::in_memory().unwrap());

        // Simulate jobs left behind by a previous process
        let waiting = AnalysisJob::new(Uuid::new_v4(), false);
        db.insert_job(&waiting).unwrap();

        let mut interrupted = AnalysisJob::new(Uuid::new_v4(), true);
        interrupted.state = JobState::Active;
        db.insert_job(&interrupted).unwrap();

        let mut done = AnalysisJob::new(Uuid::new_v4(), false);
        done.state = JobState::Completed;
        done.result = Some(JobOutcome::Analyzed {
            document_id: done.document_id,
        });
        db.insert_job(&done).unwrap();

        let (queue, mut receiver) = AnalysisQueue::new(Arc::clone(&db));
        let resumed = queue.resume_pending().await;
        assert_eq!(resumed, 2);

        // Both unfinished jobs are redelivered, reset to waiting
        let first = receiver.recv().await.unwrap();
        let second = receiver.recv().await.unwrap();
        let redelivered = [first.job_id, second.job_id];
        assert!(redelivered.contains(&waiting.job_id));
        assert!(redelivered.contains(&interrupted.job_id));
        assert_eq!(
            queue.get_job(interrupted.job_id).unwrap().state,
            JobState::Waiting
        );

        // Completed jobs are left alone but remain queryable
        assert_eq!(queue.get_job(done.job_id).unwrap().state, JobState::Completed);
    }
}
