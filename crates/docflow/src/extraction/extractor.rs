//! MIME-dispatched text extraction
//!
//! Pure functions over raw bytes: no filesystem or network access. Exactly
//! two formats are accepted (PDF and DOCX); everything else is rejected
//! before any parsing work happens.

use crate::error::{Error, Result};

/// MIME type for PDF documents
pub const MIME_PDF: &str = "application/pdf";

/// MIME type for Office Open XML word-processing documents
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Multi-format text extractor
pub struct TextExtractor;

impl TextExtractor {
    /// Check whether a MIME type is accepted for ingestion.
    pub fn is_supported(mime_type: &str) -> bool {
        matches!(mime_type, MIME_PDF | MIME_DOCX)
    }

    /// Extract plain text from raw file bytes.
    ///
    /// Fails with `EmptyExtraction` when the document parses but contains no
    /// usable text (scanned-image PDFs, empty files).
    pub fn extract(data: &[u8], mime_type: &str) -> Result<String> {
        let text = match mime_type {
            MIME_PDF => Self::extract_pdf(data)?,
            MIME_DOCX => Self::extract_docx(data)?,
            other => return Err(Error::UnsupportedType(other.to_string())),
        };

        if text.trim().is_empty() {
            return Err(Error::EmptyExtraction);
        }

        Ok(text)
    }

    /// Extract PDF text page by page, in page order.
    ///
    /// Page texts are joined with a blank line. Pages whose content stream
    /// cannot be decoded contribute nothing; a document where every page
    /// comes up empty is reported as `EmptyExtraction` by the caller.
    fn extract_pdf(data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::extraction(format!("Failed to load PDF: {}", e)))?;

        let mut pages = Vec::new();
        for (page_number, _) in doc.get_pages() {
            match doc.extract_text(&[page_number]) {
                Ok(page_text) => pages.push(page_text.trim_end().to_string()),
                Err(e) => {
                    tracing::debug!("Could not extract text from page {}: {}", page_number, e);
                }
            }
        }

        Ok(pages.join("\n\n"))
    }

    /// Extract DOCX text, discarding formatting.
    fn extract_docx(data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::extraction(format!("Failed to read DOCX: {}", e)))?;

        let mut text = String::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
                for child in paragraph.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                text.push('\n');
            }
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::testutil::{blank_pdf, docx_with_text, pdf_with_pages};

    #[test]
    fn test_supported_mime_types() {
        assert!(TextExtractor::is_supported(MIME_PDF));
        assert!(TextExtractor::is_supported(MIME_DOCX));
        assert!(!TextExtractor::is_supported("text/plain"));
        assert!(!TextExtractor::is_supported("image/png"));
        assert!(!TextExtractor::is_supported("application/msword"));
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let result = TextExtractor::extract(b"anything", "text/plain");
        assert!(matches!(result, Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn test_extract_pdf_with_text() {
        let pdf = pdf_with_pages(&["Invoice number 42 for consulting services"]);
        let text = TextExtractor::extract(&pdf, MIME_PDF).unwrap();
        assert!(text.contains("Invoice number 42"));
    }

    #[test]
    fn test_extract_pdf_preserves_page_order() {
        let pdf = pdf_with_pages(&["First page content", "Second page content"]);
        let text = TextExtractor::extract(&pdf, MIME_PDF).unwrap();

        let first = text.find("First page content").unwrap();
        let second = text.find("Second page content").unwrap();
        assert!(first < second);
        // Pages are separated by a blank line
        assert!(text[first..second].contains("\n\n"));
    }

    #[test]
    fn test_blank_pdf_is_empty_extraction() {
        let pdf = blank_pdf();
        let result = TextExtractor::extract(&pdf, MIME_PDF);
        assert!(matches!(result, Err(Error::EmptyExtraction)));
    }

    #[test]
    fn test_garbage_pdf_is_extraction_error() {
        let result = TextExtractor::extract(b"not a valid pdf at all", MIME_PDF);
        match result {
            Err(Error::Extraction { message }) => {
                assert!(message.contains("Failed to load PDF"), "got: {}", message);
            }
            other => panic!("Expected extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_docx() {
        let docx = docx_with_text("Employment agreement between parties");
        let text = TextExtractor::extract(&docx, MIME_DOCX).unwrap();
        assert!(text.contains("Employment agreement between parties"));
    }

    #[test]
    fn test_garbage_docx_is_extraction_error() {
        let result = TextExtractor::extract(b"definitely not a zip archive", MIME_DOCX);
        assert!(matches!(result, Err(Error::Extraction { .. })));
    }

    #[test]
    fn test_blank_docx_is_empty_extraction() {
        let docx = docx_with_text("   ");
        let result = TextExtractor::extract(&docx, MIME_DOCX);
        assert!(matches!(result, Err(Error::EmptyExtraction)));
    }
}
