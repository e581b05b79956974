//! Text views of a `Report`, shared by the CLI and the GUI tabs

use std::fmt::Write as _;

use super::{ExtractionPath, Report};
use crate::constants::{display::RULE_WIDTH, interpret::SUMMARY_MAX_KEYS};

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn render_summary(report: &Report, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "API REQUEST SUMMARY\n{}\n", rule());
    let _ = writeln!(out, "Response:");
    let _ = writeln!(out, "  Status Code: {}", report.status);
    let _ = writeln!(out, "  Response Size: {} bytes", report.size_bytes);
    let _ = writeln!(
        out,
        "  Content Type: {}",
        report.content_type.as_deref().unwrap_or("Unknown")
    );
    let _ = writeln!(out, "  Timestamp: {}", report.received_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "\nRequest:");
    let _ = writeln!(out, "  URL: {}", report.url);
    let _ = writeln!(out, "  Method: {}", report.method);
    let _ = writeln!(out, "\nPerformance:");
    let _ = writeln!(out, "  Response Time: {:.2} seconds\n", report.elapsed.as_secs_f64());

    if report.is_success() {
        let _ = writeln!(out, "Request Status: SUCCESS");
        if !report.top_level_keys.is_empty() {
            let keys: Vec<&str> = report
                .top_level_keys
                .iter()
                .take(SUMMARY_MAX_KEYS)
                .map(String::as_str)
                .collect();
            let _ = writeln!(out, "Response Keys: {}", keys.join(", "));
            if verbose {
                let _ = writeln!(out, "Total Response Keys: {}", report.top_level_keys.len());
                for (section, label) in [("data", "Data"), ("meta", "Meta"), ("errors", "Errors")] {
                    if report.top_level_keys.iter().any(|k| k == section) {
                        let _ = writeln!(out, "{label} section present");
                    }
                }
            }
        }
    } else {
        let _ = writeln!(out, "Request Status: FAILED (HTTP {})", report.status);
        if verbose {
            let _ = writeln!(out, "Error Details: see the raw response for the full body");
        }
    }

    let _ = writeln!(
        out,
        "Extracted '{}' values: {}",
        report.extract_field,
        report.extracted_items.len()
    );
    let _ = writeln!(out, "Store carousels: {}", report.carousels.len());
    if let Some(analysis) = &report.experiments {
        let _ = writeln!(out, "Experiments: {}", analysis.experiments.len());
    }
    let _ = writeln!(out, "\n{}", rule());
    out
}

/// Numbered list of extracted values, starting at 1
pub fn render_extracted(report: &Report) -> String {
    let mut out = String::new();
    if report.extracted_items.is_empty() {
        let _ = writeln!(
            out,
            "No '{}' values found in response (0 items)",
            report.extract_field
        );
        return out;
    }

    let via = match report.extraction {
        ExtractionPath::Structured => "structured lookup",
        ExtractionPath::TextPattern => "text scan",
    };
    let _ = writeln!(
        out,
        "Found {} '{}' values ({via}):",
        report.extracted_items.len(),
        report.extract_field
    );
    for (i, item) in report.extracted_items.iter().enumerate() {
        let _ = writeln!(out, "  {}. {item}", i + 1);
    }
    out
}

pub fn render_carousels(report: &Report) -> String {
    let mut out = String::new();
    if report.carousels.is_empty() {
        let _ = writeln!(out, "STORE CAROUSEL COMPONENTS\n{}\n", rule());
        let _ = writeln!(out, "No store carousel components found in response\n");
        let _ = writeln!(out, "Looking for components matching:");
        let _ = writeln!(out, "  - ID pattern: 'carousel.standard:store_carousel*'");
        let _ = writeln!(out, "  - Component ID: 'carousel.standard'");
        let _ = writeln!(out, "  - Component Category: 'carousel'");
        let _ = writeln!(out, "  - With text fields containing content");
        return out;
    }

    let _ = writeln!(
        out,
        "STORE CAROUSEL COMPONENTS FOUND ({} items)\n{}\n",
        report.carousels.len(),
        rule()
    );
    for (i, carousel) in report.carousels.iter().enumerate() {
        match carousel.title() {
            Some(title) => {
                let _ = writeln!(out, "CAROUSEL #{}: {title}", i + 1);
            }
            None => {
                let _ = writeln!(out, "CAROUSEL #{}", i + 1);
            }
        }
        let _ = writeln!(out, "   ID: {}", carousel.id);
        let _ = writeln!(
            out,
            "   Component: {} ({})",
            carousel.component_id, carousel.component_category
        );
        let _ = writeln!(out, "   Text Fields:");
        for (name, value) in &carousel.text_fields {
            let _ = writeln!(out, "     - {name}: {value}");
        }
        out.push('\n');
    }
    out
}

pub fn render_experiments(report: &Report) -> String {
    let mut out = format!("EXPERIMENTS ANALYSIS\n{}\n\n", rule());
    let Some(analysis) = report.experiments.as_ref().filter(|a| !a.experiments.is_empty()) else {
        out.push_str("No experiments found in this response\n\n");
        out.push_str("Select the experiments endpoint to request assignments.\n");
        out.push_str("Expected structure: {\"experiments\": [...]}\n");
        return out;
    };

    let _ = writeln!(out, "Total Experiments: {}\n", analysis.experiments.len());
    for (i, exp) in analysis.experiments.iter().enumerate() {
        let _ = writeln!(out, "Experiment #{}: {}", i + 1, exp.name);
        let _ = writeln!(out, "   Value: {}", exp.value);
        let _ = writeln!(out, "   Exposure Enabled: {}", exp.exposure_enabled);
        match &exp.tag {
            Some(tag) => {
                let _ = writeln!(out, "   Assignment: {tag}");
                let fields = [
                    ("Distribution", &exp.distribution),
                    ("Segment", &exp.segment),
                    ("Bucket Key", &exp.bucket_key),
                ];
                for (label, value) in fields {
                    if let Some(value) = value {
                        let _ = writeln!(out, "   {label}: {value}");
                    }
                }
            }
            None => {
                let _ = writeln!(out, "   Assignment: {:?} (inferred from value)", exp.assignment);
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "ASSIGNMENT SUMMARY\n{}", "=".repeat(25));
    let _ = writeln!(out, "Treatment Variants: {}", analysis.treatment);
    let _ = writeln!(out, "Control Variants: {}", analysis.control);
    let _ = writeln!(out, "Other Assignments: {}\n", analysis.other);
    let _ = writeln!(
        out,
        "Treatment Rate: {}/{} ({:.1}%)",
        analysis.treatment,
        analysis.experiments.len(),
        analysis.treatment_rate()
    );
    out
}

/// Body text, limited to `max_lines` when given
pub fn render_raw(report: &Report, max_lines: Option<usize>) -> String {
    let body = report.display_body();
    let Some(max) = max_lines else {
        return body.to_string();
    };

    let total = body.lines().count();
    if total <= max {
        return body.to_string();
    }
    let mut out: String = body.lines().take(max).collect::<Vec<_>>().join("\n");
    let _ = write!(
        out,
        "\n... ({} more lines; raise MAX_VERBOSE_LINES to see more)",
        total - max
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::interpret;
    use crate::interpret::tests::outcome;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_extracted_numbers_from_one() {
        let body = r#"{"a":[{"container_name":"Deals"},{"container_name":"Popular"}]}"#;
        let report = interpret(&outcome(200, body), "container_name");
        assert_eq!(
            render_extracted(&report),
            "Found 2 'container_name' values (structured lookup):\n  1. Deals\n  2. Popular\n"
        );
    }

    #[test]
    fn test_render_extracted_empty() {
        let report = interpret(&outcome(200, "{}"), "container_name");
        assert_eq!(
            render_extracted(&report),
            "No 'container_name' values found in response (0 items)\n"
        );
    }

    #[test]
    fn test_render_summary_success_verbose() {
        let report = interpret(&outcome(200, r#"{"data":{},"meta":{},"page":1}"#), "container_name");
        let summary = render_summary(&report, true);
        assert!(summary.contains("Status Code: 200"));
        assert!(summary.contains("Request Status: SUCCESS"));
        assert!(summary.contains("Response Keys: data, meta, page"));
        assert!(summary.contains("Total Response Keys: 3"));
        assert!(summary.contains("Data section present"));
        assert!(!summary.contains("Errors section present"));
        assert!(summary.contains("Response Time: 0.42 seconds"));

        let terse = render_summary(&report, false);
        assert!(!terse.contains("Total Response Keys"));
    }

    #[test]
    fn test_render_summary_limits_keys() {
        let keys: Vec<String> = (0..15).map(|i| format!("\"k{i:02}\":0")).collect();
        let report = interpret(&outcome(200, &format!("{{{}}}", keys.join(","))), "x");
        let summary = render_summary(&report, false);
        assert!(summary.contains("k09"));
        assert!(!summary.contains("k10"));
    }

    #[test]
    fn test_render_summary_failure() {
        let report = interpret(&outcome(500, "boom"), "container_name");
        let summary = render_summary(&report, true);
        assert!(summary.contains("Request Status: FAILED (HTTP 500)"));
        assert!(summary.contains("Error Details"));
    }

    #[test]
    fn test_render_raw_truncates() {
        let body = (1..=5).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        let report = interpret(&outcome(200, &body), "x");
        assert_eq!(
            render_raw(&report, Some(2)),
            "line1\nline2\n... (3 more lines; raise MAX_VERBOSE_LINES to see more)"
        );
        assert_eq!(render_raw(&report, Some(10)), body);
        assert_eq!(render_raw(&report, None), body);
    }

    #[test]
    fn test_render_raw_prefers_pretty_json() {
        let report = interpret(&outcome(200, r#"{"a":1}"#), "x");
        assert_eq!(render_raw(&report, None), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_render_experiments() {
        let body = r#"{"experiments":[{"name":"exp_a","value":"treatment","exposure_context":{"tag":"treatment"}},{"name":"exp_b","value":"false"}]}"#;
        let report = interpret(&outcome(200, body), "x");
        let text = render_experiments(&report);
        assert!(text.contains("Total Experiments: 2"));
        assert!(text.contains("Experiment #1: exp_a"));
        assert!(text.contains("Assignment: Control (inferred from value)"));
        assert!(text.contains("Treatment Rate: 1/2 (50.0%)"));

        let none = render_experiments(&interpret(&outcome(200, "{}"), "x"));
        assert!(none.contains("No experiments found"));
    }

    #[test]
    fn test_render_carousels() {
        let body = r#"{"rows":[{"id":"carousel.standard:store_carousel:1","component":{"id":"carousel.standard","category":"carousel"},"text":{"title":"Deals"}}]}"#;
        let report = interpret(&outcome(200, body), "x");
        let text = render_carousels(&report);
        assert!(text.contains("FOUND (1 items)"));
        assert!(text.contains("CAROUSEL #1: Deals"));
        assert!(text.contains("     - title: Deals"));
    }
}
