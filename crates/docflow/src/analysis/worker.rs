//! Background worker for analysis jobs
//!
//! Pulls jobs from the queue channel and processes each one under a
//! concurrency bound. A job failure is terminal for that job only; the
//! process keeps serving.

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::providers::LlmProvider;
use crate::repository::DocumentRepository;
use crate::types::{DocumentUpdate, JobOutcome, QueuedJob};

use super::prompt::build_analysis_prompt;
use super::queue::AnalysisQueue;
use super::result::parse_analysis;

/// Worker pool for processing analysis jobs
pub struct AnalysisWorker {
    repository: Arc<dyn DocumentRepository>,
    llm: Arc<dyn LlmProvider>,
    queue: Arc<AnalysisQueue>,
    max_prompt_chars: usize,
    concurrency: usize,
}

impl AnalysisWorker {
    /// Create a new worker pool.
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        llm: Arc<dyn LlmProvider>,
        queue: Arc<AnalysisQueue>,
        config: &AnalysisConfig,
    ) -> Self {
        let concurrency = config
            .worker_count
            .unwrap_or_else(|| num_cpus::get().min(4))
            .max(1);

        tracing::info!(
            "Analysis worker configured: {} concurrent jobs, {} max prompt chars",
            concurrency,
            config.max_prompt_chars
        );

        Self {
            repository,
            llm,
            queue,
            max_prompt_chars: config.max_prompt_chars,
            concurrency,
        }
    }

    /// Consume jobs from the queue channel until it closes.
    pub async fn run(self, mut receiver: mpsc::Receiver<QueuedJob>) {
        tracing::info!("Analysis worker started (model: {})", self.llm.model());

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let worker = Arc::new(self);

        while let Some(job) = receiver.recv().await {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let worker = Arc::clone(&worker);

            tokio::spawn(async move {
                let _permit = permit;
                worker.process_job(job).await;
            });
        }

        tracing::info!("Analysis worker stopped: queue channel closed");
    }

    /// Process one job end to end, recording the terminal state on the queue.
    async fn process_job(&self, job: QueuedJob) {
        tracing::info!(
            "Processing job {} for document {} (force: {})",
            job.job_id,
            job.document_id,
            job.force
        );
        self.queue.mark_active(job.job_id);

        match self.handle_analyze(job.document_id, job.force).await {
            Ok(outcome) => {
                tracing::info!("Job {} completed: {:?}", job.job_id, outcome);
                self.queue.complete(job.job_id, outcome);
            }
            Err(e) => {
                tracing::error!("Job {} failed: {}", job.job_id, e);
                self.queue.fail(job.job_id, e.to_string());
            }
        }
    }

    /// Analyze one document.
    ///
    /// The document is reloaded fresh on every attempt: a concurrent request
    /// may have analyzed it between enqueue and processing, and redelivered
    /// jobs must observe the current state, not the enqueue-time one.
    async fn handle_analyze(&self, document_id: Uuid, force: bool) -> Result<JobOutcome> {
        let document = self
            .repository
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| Error::DocumentNotFound(document_id.to_string()))?;

        if document.is_analyzed() && !force {
            tracing::info!("Document {} already analyzed, skipping", document_id);
            return Ok(JobOutcome::Skipped {
                message: "Already analyzed".to_string(),
            });
        }

        if document.extracted_text.trim().is_empty() {
            return Err(Error::EmptyExtraction);
        }

        let prompt = build_analysis_prompt(&document.extracted_text, self.max_prompt_chars);

        let raw = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| Error::AnalysisFailed(e.to_string()))?;

        let result = parse_analysis(&raw);

        self.repository
            .update_by_id(
                document_id,
                DocumentUpdate {
                    summary: result.summary,
                    doc_type: result.doc_type,
                    metadata: result.attributes,
                },
            )
            .await?;

        Ok(JobOutcome::Analyzed { document_id })
    }
}
