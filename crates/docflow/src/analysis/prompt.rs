//! Analysis prompt construction

/// Prompt template for document analysis. `{content}` is replaced with the
/// (truncated) extracted text.
pub const ANALYSIS_PROMPT: &str = r#"Analyze the following document text and return a JSON object with:
- summary: A concise summary of the content.
- type: The type of document (e.g., Invoice, Resume, Report).
- attributes: Key-value pairs of extracted metadata (e.g., dates, names, amounts).

Text:
{content}"#;

/// Build the analysis prompt, truncating the text to `max_chars`.
///
/// Truncation is silent: it bounds cost and latency, it is not an error.
pub fn build_analysis_prompt(text: &str, max_chars: usize) -> String {
    ANALYSIS_PROMPT.replace("{content}", truncate_content(text, max_chars))
}

/// Truncate content to a maximum byte length (UTF-8 safe).
fn truncate_content(text: &str, max_chars: usize) -> &str {
    if text.len() <= max_chars {
        return text;
    }
    // Find a valid UTF-8 boundary at or before max_chars
    let mut end = max_chars;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
