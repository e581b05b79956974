//! Response interpretation
//!
//! Turns an `Outcome` into a `Report`: pretty-printed body, the list of values
//! for one named field, store carousels and experiment assignments. Rendering
//! lives in `render` and only ever reads a `Report`.

pub mod carousel;
pub mod experiments;
pub mod render;

use std::time::Duration;

use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::executor::Outcome;

pub use carousel::Carousel;
pub use experiments::ExperimentsAnalysis;
pub use render::{render_carousels, render_experiments, render_extracted, render_raw, render_summary};

/// Which pass produced `extracted_items`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPath {
    Structured,
    TextPattern,
}

fn as_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub status: u16,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    pub size_bytes: usize,
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub received_at: DateTime<Local>,

    pub extract_field: String,
    pub extraction: ExtractionPath,
    pub extracted_items: Vec<String>,

    pub body_is_json: bool,
    pub raw_body: String,
    pub raw_pretty: Option<String>,

    pub top_level_keys: Vec<String>,
    pub carousels: Vec<Carousel>,
    pub experiments: Option<ExperimentsAnalysis>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Pretty body when the response was JSON, raw text otherwise
    pub fn display_body(&self) -> &str {
        self.raw_pretty.as_deref().unwrap_or(&self.raw_body)
    }
}

/// String values of every `field` key in `doc`, in traversal order
pub fn extract_structured(doc: &Value, field: &str) -> Vec<String> {
    let mut items = Vec::new();
    collect_field(doc, field, &mut items);
    items
}

fn collect_field(value: &Value, field: &str, items: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == field {
                    if let Some(s) = child.as_str() {
                        items.push(s.to_string());
                    }
                }
                collect_field(child, field, items);
            }
        }
        Value::Array(children) => {
            for child in children {
                collect_field(child, field, items);
            }
        }
        _ => {}
    }
}

/// Line-by-line scan for `"field": "value"` pairs, for bodies that are not JSON
pub fn extract_text(body: &str, field: &str) -> Vec<String> {
    let pattern = format!(r#""{}"\s*:\s*"((?:[^"\\]|\\.)*)""#, regex::escape(field));
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    body.lines()
        .flat_map(|line| {
            re.captures_iter(line)
                .filter_map(|c| c.get(1))
                .map(|m| unescape(m.as_str()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Decode JSON string escapes, keeping the raw text if they are malformed
fn unescape(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_string())
}

/// Build a `Report` for `outcome`, collecting values of `field`.
///
/// The structured pass runs when the body is JSON; the text scan runs when it
/// is not, or when the structured pass finds nothing.
pub fn interpret(outcome: &Outcome, field: &str) -> Report {
    let raw_body = outcome.body_text();
    let parsed: Option<Value> = serde_json::from_slice(&outcome.body).ok();

    let structured = parsed
        .as_ref()
        .map(|doc| extract_structured(doc, field))
        .unwrap_or_default();
    let (extraction, extracted_items) = if structured.is_empty() {
        (ExtractionPath::TextPattern, extract_text(&raw_body, field))
    } else {
        (ExtractionPath::Structured, structured)
    };
    debug!(field, ?extraction, items = extracted_items.len(), "extracted items");

    let raw_pretty = parsed
        .as_ref()
        .and_then(|doc| serde_json::to_string_pretty(doc).ok());
    let top_level_keys = parsed
        .as_ref()
        .and_then(Value::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    let carousels = parsed.as_ref().map(carousel::find_carousels).unwrap_or_default();
    let experiments = parsed.as_ref().and_then(experiments::analyze);

    Report {
        status: outcome.status,
        elapsed: outcome.elapsed,
        size_bytes: outcome.size_bytes,
        method: outcome.method.to_string(),
        url: outcome.url.clone(),
        content_type: outcome.header("content-type").map(str::to_string),
        received_at: outcome.received_at,
        extract_field: field.to_string(),
        extraction,
        extracted_items,
        body_is_json: parsed.is_some(),
        raw_body,
        raw_pretty,
        top_level_keys,
        carousels,
        experiments,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::request::Method;
    use pretty_assertions::assert_eq;

    pub(crate) fn outcome(status: u16, body: &str) -> Outcome {
        Outcome {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.as_bytes().to_vec(),
            elapsed: Duration::from_millis(420),
            size_bytes: body.len(),
            method: Method::Get,
            url: "https://api.example.com/cx/v3/feed/realtime_recommendation".to_string(),
            received_at: Local::now(),
        }
    }

    #[test]
    fn test_interpret_two_items_example() {
        let body = r#"{"data":[{"container_name":"Deals"},{"container_name":"Popular"}]}"#;
        let report = interpret(&outcome(200, body), "container_name");
        assert_eq!(report.extracted_items, vec!["Deals", "Popular"]);
        assert_eq!(report.extraction, ExtractionPath::Structured);
        assert!(report.body_is_json);
        assert_eq!(report.top_level_keys, vec!["data"]);
    }

    #[test]
    fn test_interpret_structured_any_depth_document_order() {
        let body = r#"{
            "container_name": "First",
            "body": [
                {"deep": {"deeper": [{"container_name": "Second"}]}},
                {"container_name": "Third", "other": 1}
            ]
        }"#;
        let report = interpret(&outcome(200, body), "container_name");
        assert_eq!(report.extracted_items, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_interpret_text_fallback_matches_structured() {
        let json_body = r#"{"items":[{"container_name":"Deals"},{"container_name":"Popular"}]}"#;
        let text_body = "<html>\n  \"container_name\": \"Deals\",\n  \"container_name\" : \"Popular\"\n</html>";

        let structured = interpret(&outcome(200, json_body), "container_name");
        let fallback = interpret(&outcome(200, text_body), "container_name");

        assert!(!fallback.body_is_json);
        assert_eq!(fallback.extraction, ExtractionPath::TextPattern);
        assert_eq!(fallback.extracted_items, structured.extracted_items);

        let numbered = |report: &Report| -> Vec<String> {
            render_extracted(report)
                .lines()
                .filter(|l| l.trim_start().starts_with(|c: char| c.is_ascii_digit()))
                .map(str::to_string)
                .collect()
        };
        assert_eq!(numbered(&fallback), vec!["  1. Deals", "  2. Popular"]);
        assert_eq!(numbered(&fallback), numbered(&structured));
    }

    #[test]
    fn test_interpret_text_fallback_unescapes() {
        let body = r#"not json "title": "Tom \"Fast\" Food", "title":"Café""#;
        let report = interpret(&outcome(200, body), "title");
        assert_eq!(report.extracted_items, vec![r#"Tom "Fast" Food"#, "Café"]);
    }

    #[test]
    fn test_interpret_no_items_is_not_an_error() {
        let report = interpret(&outcome(200, r#"{"data":{}}"#), "container_name");
        assert!(report.extracted_items.is_empty());
        assert!(report.raw_pretty.is_some());
    }

    #[test]
    fn test_interpret_non_success_keeps_body() {
        let report = interpret(&outcome(404, "Not Found"), "container_name");
        assert_eq!(report.status, 404);
        assert!(!report.is_success());
        assert_eq!(report.raw_body, "Not Found");
        assert_eq!(report.display_body(), "Not Found");
        assert!(report.raw_pretty.is_none());
    }

    #[test]
    fn test_interpret_field_is_regex_escaped() {
        let body = r#"text "a.b": "dot" "axb": "nope""#;
        let report = interpret(&outcome(200, body), "a.b");
        assert_eq!(report.extracted_items, vec!["dot"]);
    }

    #[test]
    fn test_report_serializes_elapsed_ms() {
        let report = interpret(&outcome(200, "{}"), "container_name");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["elapsed_ms"], 420);
        assert_eq!(json["extraction"], "text_pattern");
    }
}
