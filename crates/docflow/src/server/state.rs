//! Application state for the HTTP server
//!
//! Providers are built once at startup from configuration and injected into
//! the service and worker. The worker pool is spawned here and consumes the
//! queue channel for the life of the process.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::analysis::{AnalysisQueue, AnalysisWorker, QueueStats};
use crate::config::DocflowConfig;
use crate::error::Result;
use crate::providers::{BlobStore, LlmProvider, LocalBlobStore, OllamaLlm};
use crate::repository::DocumentRepository;
use crate::service::DocumentService;
use crate::storage::DocumentDb;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DocflowConfig,
    service: DocumentService,
    queue: Arc<AnalysisQueue>,
    llm: Arc<dyn LlmProvider>,
    ready: RwLock<bool>,
}

impl AppState {
    /// Create new application state and start the worker pool.
    pub async fn new(config: DocflowConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let db = Arc::new(DocumentDb::new(config.storage.database_path())?);
        tracing::info!(
            "Document database ready at {}",
            config.storage.database_path().display()
        );

        let blob_store: Arc<dyn BlobStore> =
            Arc::new(LocalBlobStore::new(config.storage.blob_dir())?);
        tracing::info!("Blob store ready at {}", config.storage.blob_dir().display());

        let llm: Arc<dyn LlmProvider> = Arc::new(OllamaLlm::new(&config.llm));
        tracing::info!("LLM provider initialized (model: {})", llm.model());

        let (queue, receiver) = AnalysisQueue::new(Arc::clone(&db));
        let queue = Arc::new(queue);

        let repository: Arc<dyn DocumentRepository> = db.clone();
        let service = DocumentService::new(
            Arc::clone(&repository),
            blob_store,
            Arc::clone(&queue),
        );

        let worker = AnalysisWorker::new(
            repository,
            Arc::clone(&llm),
            Arc::clone(&queue),
            &config.analysis,
        );
        tokio::spawn(worker.run(receiver));

        // Redeliver jobs interrupted by the previous shutdown
        let resumed = queue.resume_pending().await;
        if resumed > 0 {
            tracing::info!("Re-queued {} unfinished analysis jobs", resumed);
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                service,
                queue,
                llm,
                ready: RwLock::new(true),
            }),
        })
    }

    /// Get the document service.
    pub fn service(&self) -> &DocumentService {
        &self.inner.service
    }

    /// Get configuration.
    pub fn config(&self) -> &DocflowConfig {
        &self.inner.config
    }

    /// Get queue statistics.
    pub fn queue_stats(&self) -> QueueStats {
        self.inner.queue.stats()
    }

    /// Get the LLM provider.
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Check if the server is ready.
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
