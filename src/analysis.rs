//! Scene-analysis report returned alongside a staged image.
//!
//! The backend's analysis object is free-form. Every known field is optional
//! and unknown fields are kept in `extra`, so a partial or unexpected report
//! never fails a generation; missing values render as `N/A`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder for absent report values.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneAnalysis {
    pub room_type: Option<String>,
    pub room_state: Option<String>,
    pub dimensions: Option<Value>,
    pub depth_zones: Option<Value>,
    pub doorway_count: Option<u32>,
    pub window_count: Option<u32>,
    pub spatial_shape: Option<String>,
    pub focal_point: Option<String>,
    pub perspective: Option<String>,
    pub lighting: Option<Value>,
    pub staging_recommendations: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SceneAnalysis {
    /// Interpret an arbitrary JSON value. Non-object values yield an empty
    /// report holding the raw value under `raw`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value.clone()).unwrap_or_else(|_| {
                // Right keys, wrong types: keep everything as extra.
                let mut extra = BTreeMap::new();
                if let Value::Object(map) = value {
                    extra.extend(map);
                }
                Self {
                    extra,
                    ..Self::default()
                }
            }),
            Value::Null => Self::default(),
            other => {
                let mut extra = BTreeMap::new();
                extra.insert("raw".to_string(), other);
                Self {
                    extra,
                    ..Self::default()
                }
            }
        }
    }

    /// Plain-text report for the terminal.
    pub fn report(&self) -> String {
        let mut out = String::new();
        let rows: [(&str, String); 11] = [
            ("Room type", text(&self.room_type)),
            ("Room state", text(&self.room_state)),
            ("Dimensions", json(&self.dimensions)),
            ("Depth zones", json(&self.depth_zones)),
            ("Doorways", count(self.doorway_count)),
            ("Windows", count(self.window_count)),
            ("Spatial shape", text(&self.spatial_shape)),
            ("Focal point", text(&self.focal_point)),
            ("Perspective", text(&self.perspective)),
            ("Lighting", json(&self.lighting)),
            ("Recommendations", json(&self.staging_recommendations)),
        ];
        let _ = writeln!(out, "Scene analysis");
        for (label, value) in rows {
            let _ = writeln!(out, "  {:<16} {}", format!("{}:", label), value);
        }
        for (key, value) in &self.extra {
            let _ = writeln!(out, "  {:<16} {}", format!("{}:", key), render(value));
        }
        out
    }
}

fn text(v: &Option<String>) -> String {
    match v.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn count(v: Option<u32>) -> String {
    v.map(|n| n.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn json(v: &Option<Value>) -> String {
    v.as_ref()
        .map(render)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::String(s) if s.trim().is_empty() => NOT_AVAILABLE.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.is_empty() => NOT_AVAILABLE.to_string(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join("; "),
        Value::Object(map) if map.is_empty() => NOT_AVAILABLE.to_string(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, render(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_report_renders_every_field() {
        let analysis = SceneAnalysis::from_value(json!({
            "room_type": "kitchen",
            "room_state": "empty",
            "dimensions": {"width_ft": 12, "depth_ft": 14},
            "doorway_count": 1,
            "window_count": 2,
            "lighting": "north-facing daylight",
            "staging_recommendations": ["island stools", "pendant lights"],
            "ceiling": "vaulted"
        }));
        let report = analysis.report();
        assert!(report.contains("kitchen"));
        assert!(report.contains("width_ft=12"));
        assert!(report.contains("island stools; pendant lights"));
        assert!(report.contains("ceiling:"));
        assert_eq!(analysis.window_count, Some(2));
    }

    #[test]
    fn missing_fields_render_placeholder() {
        let report = SceneAnalysis::from_value(json!({})).report();
        assert!(report.contains("Windows:"));
        assert!(report.lines().skip(1).all(|l| l.ends_with(NOT_AVAILABLE)));
    }

    #[test]
    fn wrong_types_do_not_fail() {
        let analysis = SceneAnalysis::from_value(json!({"window_count": "several"}));
        assert_eq!(analysis.window_count, None);
        assert_eq!(analysis.extra.get("window_count"), Some(&json!("several")));
    }

    #[test]
    fn non_object_kept_as_raw() {
        let analysis = SceneAnalysis::from_value(json!("two windows, one door"));
        assert!(analysis.report().contains("two windows, one door"));
        assert_eq!(SceneAnalysis::from_value(Value::Null), SceneAnalysis::default());
    }
}
