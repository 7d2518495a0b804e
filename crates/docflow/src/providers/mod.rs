//! Provider abstractions for blob storage and LLM completion
//!
//! Trait-based seams so the pipeline can be wired against the local
//! filesystem and Ollama in production, and against stubs in tests. Provider
//! handles are constructed once at startup and injected; nothing here is a
//! global singleton.

pub mod blob_store;
pub mod llm;
pub mod local;
pub mod ollama;

pub use blob_store::BlobStore;
pub use llm::LlmProvider;
pub use local::LocalBlobStore;
pub use ollama::OllamaLlm;
