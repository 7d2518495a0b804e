//! Plain-text extraction from uploaded documents

pub mod extractor;

#[cfg(test)]
pub mod testutil;

pub use extractor::{TextExtractor, MIME_DOCX, MIME_PDF};
