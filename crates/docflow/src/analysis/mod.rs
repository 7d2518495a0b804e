//! Asynchronous document analysis: queue, worker, prompt and result parsing

pub mod prompt;
pub mod queue;
pub mod result;
pub mod worker;

pub use queue::{AnalysisQueue, QueueStats};
pub use result::{parse_analysis, AnalysisResult};
pub use worker::AnalysisWorker;
