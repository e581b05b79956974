//! Experiment assignment analysis for dynamic-values responses

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    Treatment,
    Control,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Experiment {
    pub name: String,
    pub value: String,
    pub exposure_enabled: bool,
    pub assignment: Assignment,
    /// Raw `exposure_context.tag`, absent when the assignment was inferred from the value
    pub tag: Option<String>,
    pub distribution: Option<String>,
    pub segment: Option<String>,
    pub bucket_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperimentsAnalysis {
    pub experiments: Vec<Experiment>,
    pub treatment: usize,
    pub control: usize,
    pub other: usize,
}

impl ExperimentsAnalysis {
    /// Share of treatment assignments in percent
    pub fn treatment_rate(&self) -> f64 {
        if self.experiments.is_empty() {
            return 0.0;
        }
        self.treatment as f64 * 100.0 / self.experiments.len() as f64
    }
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn classify_tag(tag: &str) -> Assignment {
    let tag = tag.to_lowercase();
    if tag.contains("treatment") {
        Assignment::Treatment
    } else if tag.contains("control") {
        Assignment::Control
    } else {
        Assignment::Other
    }
}

fn classify_value(value: &str) -> Assignment {
    match value.to_lowercase().as_str() {
        "true" | "treatment" | "treatment1" | "treatment2" | "treatment3" => Assignment::Treatment,
        "false" | "control" => Assignment::Control,
        _ => Assignment::Other,
    }
}

fn experiment_from(entry: &Value) -> Experiment {
    let value = display_value(entry.get("value"));
    let context = entry
        .get("exposure_context")
        .and_then(Value::as_object)
        .filter(|c| !c.is_empty());
    let context_field = |name: &str| {
        context.map(|c| {
            c.get(name)
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string()
        })
    };

    let tag = context_field("tag");
    let assignment = match &tag {
        Some(tag) => classify_tag(tag),
        None => classify_value(&value),
    };

    Experiment {
        name: entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        exposure_enabled: entry
            .get("exposure_enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        value,
        assignment,
        tag,
        distribution: context_field("distribution"),
        segment: context_field("segment"),
        bucket_key: context_field("bucket_key"),
    }
}

/// Analyse a top-level `experiments` array; `None` when the document has none
pub fn analyze(doc: &Value) -> Option<ExperimentsAnalysis> {
    let entries = doc.as_object()?.get("experiments")?.as_array()?;
    let experiments: Vec<Experiment> = entries.iter().map(experiment_from).collect();
    let count = |a: Assignment| experiments.iter().filter(|e| e.assignment == a).count();

    Some(ExperimentsAnalysis {
        treatment: count(Assignment::Treatment),
        control: count(Assignment::Control),
        other: count(Assignment::Other),
        experiments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analyze_counts_assignments() {
        let doc = json!({
            "experiments": [
                {"name": "a", "value": "treatment2", "exposure_enabled": true},
                {"name": "b", "value": false},
                {"name": "c", "value": "x", "exposure_context": {"tag": "Treatment_A", "segment": "all"}},
                {"name": "d", "value": 3},
                {"name": "e", "value": "treatment", "exposure_context": {"tag": "control"}}
            ]
        });

        let analysis = analyze(&doc).unwrap();
        assert_eq!((analysis.treatment, analysis.control, analysis.other), (2, 2, 1));
        assert_eq!(analysis.experiments[1].value, "false");
        assert_eq!(analysis.experiments[2].segment.as_deref(), Some("all"));
        assert_eq!(analysis.experiments[2].bucket_key.as_deref(), Some("unknown"));
        assert_eq!(analysis.experiments[0].tag, None);
        assert!(analysis.experiments[0].exposure_enabled);
        assert!((analysis.treatment_rate() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_analyze_without_experiments() {
        assert!(analyze(&json!({"data": []})).is_none());
        assert!(analyze(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_analyze_empty_list() {
        let analysis = analyze(&json!({"experiments": []})).unwrap();
        assert!(analysis.experiments.is_empty());
        assert_eq!(analysis.treatment_rate(), 0.0);
    }
}
