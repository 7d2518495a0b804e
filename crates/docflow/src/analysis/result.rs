//! Lenient parsing of LLM analysis output
//!
//! Provider output is untrusted text. Parsing never fails: when no JSON
//! object can be recovered, the whole response becomes the summary.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Structured result of one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Always present; falls back to the raw response text
    pub summary: String,
    /// Document classification, when the model provided one
    pub doc_type: Option<String>,
    /// Extracted key-value attributes; empty when absent, never null
    pub attributes: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawAnalysis {
    summary: Option<String>,
    #[serde(rename = "type")]
    doc_type: Option<String>,
    attributes: Option<Map<String, Value>>,
}

/// Parse a raw LLM response into an `AnalysisResult`.
pub fn parse_analysis(raw: &str) -> AnalysisResult {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return AnalysisResult {
            summary: "No analysis generated".to_string(),
            doc_type: None,
            attributes: Map::new(),
        };
    }

    if let Some(object) = extract_json_object(trimmed) {
        if let Ok(parsed) = serde_json::from_str::<RawAnalysis>(object) {
            return AnalysisResult {
                summary: parsed.summary.unwrap_or_else(|| trimmed.to_string()),
                doc_type: parsed.doc_type,
                attributes: parsed.attributes.unwrap_or_default(),
            };
        }
    }

    AnalysisResult {
        summary: trimmed.to_string(),
        doc_type: None,
        attributes: Map::new(),
    }
}

/// Find the first balanced `{...}` substring.
///
/// Tracks JSON string literals and escapes so braces inside strings do not
/// affect the depth count.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_becomes_summary() {
        let result = parse_analysis("This document is an invoice for office supplies.");
        assert_eq!(
            result.summary,
            "This document is an invoice for office supplies."
        );
        assert!(result.doc_type.is_none());
        assert!(result.attributes.is_empty());
    }

    #[test]
    fn test_embedded_json_is_extracted() {
        let raw = r#"Sure! Here is the analysis:
{"summary":"S","type":"Invoice","attributes":{"amount":"100"}}
Let me know if you need anything else."#;

        let result = parse_analysis(raw);
        assert_eq!(result.summary, "S");
        assert_eq!(result.doc_type.as_deref(), Some("Invoice"));
        assert_eq!(result.attributes.get("amount"), Some(&serde_json::json!("100")));
    }

    #[test]
    fn test_bare_json() {
        let raw = r#"{"summary":"Quarterly report","type":"Report","attributes":{}}"#;
        let result = parse_analysis(raw);
        assert_eq!(result.summary, "Quarterly report");
        assert_eq!(result.doc_type.as_deref(), Some("Report"));
        assert!(result.attributes.is_empty());
    }

    #[test]
    fn test_missing_attributes_is_empty_map() {
        let raw = r#"{"summary":"A memo","type":"Memo"}"#;
        let result = parse_analysis(raw);
        assert_eq!(result.summary, "A memo");
        assert!(result.attributes.is_empty());
    }

    #[test]
    fn test_missing_summary_falls_back_to_raw() {
        let raw = r#"{"type":"Letter"}"#;
        let result = parse_analysis(raw);
        assert_eq!(result.summary, raw);
        assert_eq!(result.doc_type.as_deref(), Some("Letter"));
    }

    #[test]
    fn test_empty_response() {
        let result = parse_analysis("   \n  ");
        assert_eq!(result.summary, "No analysis generated");
        assert!(result.attributes.is_empty());
    }

    #[test]
    fn test_unbalanced_braces_fall_back() {
        let raw = r#"The result is {"summary": "broken"#;
        let result = parse_analysis(raw);
        assert_eq!(result.summary, raw.trim());
        assert!(result.attributes.is_empty());
    }

    #[test]
    fn test_invalid_json_falls_back() {
        let raw = "{not json at all}";
        let result = parse_analysis(raw);
        assert_eq!(result.summary, raw);
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let raw = r#"{"summary":"uses {braces} inside","attributes":{"note":"}{"}}"#;
        let result = parse_analysis(raw);
        assert_eq!(result.summary, "uses {braces} inside");
        assert_eq!(result.attributes.get("note"), Some(&serde_json::json!("}{")));
    }

    #[test]
    fn test_nested_objects() {
        let raw = r#"{"summary":"nested","attributes":{"inner":{"a":1}}}"#;
        let result = parse_analysis(raw);
        assert_eq!(result.summary, "nested");
        assert_eq!(
            result.attributes.get("inner"),
            Some(&serde_json::json!({"a": 1}))
        );
    }

    #[test]
    fn test_extract_json_object_finds_first_balanced() {
        assert_eq!(extract_json_object("abc {\"x\":1} def"), Some("{\"x\":1}"));
        assert_eq!(extract_json_object("no object here"), None);
        assert_eq!(extract_json_object("{\"a\":{\"b\":2}}"), Some("{\"a\":{\"b\":2}}"));
    }
}
