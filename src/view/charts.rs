use super::tree::{Document, Element, NodeId};
use crate::dashboard::aggregate::Series;
use serde::Serialize;
use serde_json::{json, Value};

pub const BLUE: &str = "#3b82f6";
pub const GREEN: &str = "#10b981";
pub const RED: &str = "#ef4444";
pub const YELLOW: &str = "#f59e0b";
pub const GRAY: &str = "#9ca3af";

pub const CANVAS_CLASS: &str = "ff-chart-canvas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Doughnut,
    Bar,
    Line,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Doughnut => "doughnut",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Colors {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<u64>,
    pub background_color: Colors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Chart widget configuration, serialized in the shape the charting library reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: Value,
}

fn palette(colors: &[&str]) -> Colors {
    Colors::Many(colors.iter().map(|c| c.to_string()).collect())
}

fn chart_data(label: &str, series: &Series, dataset: impl FnOnce(Vec<u64>) -> Dataset) -> ChartData {
    let mut ds = dataset(series.values());
    ds.label = label.to_string();
    ChartData {
        labels: series.labels().into_iter().map(String::from).collect(),
        datasets: vec![ds],
    }
}

impl ChartSpec {
    /// Share of the whole per category.
    pub fn proportion(label: &str, series: &Series) -> Self {
        Self {
            kind: ChartKind::Doughnut,
            data: chart_data(label, series, |data| Dataset {
                label: String::new(),
                data,
                background_color: palette(&[BLUE, GREEN, YELLOW, RED, GRAY]),
                border_color: None,
                tension: None,
                fill: None,
            }),
            options: json!({ "plugins": { "legend": { "position": "bottom" } } }),
        }
    }

    /// Side-by-side counts on a zero-based axis.
    pub fn magnitude(label: &str, series: &Series) -> Self {
        Self {
            kind: ChartKind::Bar,
            data: chart_data(label, series, |data| Dataset {
                label: String::new(),
                data,
                background_color: palette(&[RED, YELLOW, BLUE, GRAY]),
                border_color: None,
                tension: None,
                fill: None,
            }),
            options: json!({ "scales": { "y": { "beginAtZero": true } } }),
        }
    }

    /// Filled area across categories.
    pub fn trend(label: &str, series: &Series) -> Self {
        Self {
            kind: ChartKind::Line,
            data: chart_data(label, series, |data| Dataset {
                label: String::new(),
                data,
                background_color: Colors::One(format!("{BLUE}33")),
                border_color: Some(BLUE.to_string()),
                tension: Some(0.4),
                fill: Some(true),
            }),
            options: json!({ "scales": { "y": { "beginAtZero": true } } }),
        }
    }
}

/// Bind `spec` to the chart anchor, replacing whatever chart it held before.
/// A missing anchor is not an error; the chart is simply skipped.
pub fn render_chart(doc: &mut Document, anchor: &str, spec: &ChartSpec) -> Option<NodeId> {
    let Some(anchor_id) = doc.by_key(anchor) else {
        log::debug!("Chart anchor {} not present, skipping", anchor);
        return None;
    };

    let config = match serde_json::to_string(spec) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Failed to encode chart {}: {}", anchor, e);
            return None;
        }
    };

    doc.clear_children(anchor_id);
    doc.append(
        anchor_id,
        Element::new("canvas")
            .class(CANVAS_CLASS)
            .attr("data-chart-type", spec.kind.as_str())
            .attr("data-chart", config),
    )
}

/// Decoded configuration of the chart currently bound to `anchor`.
pub fn bound_chart(doc: &Document, anchor: &str) -> Option<Value> {
    let anchor_id = doc.by_key(anchor)?;
    doc.children(anchor_id)
        .iter()
        .filter_map(|id| doc.get(*id))
        .find(|e| e.has_class(CANVAS_CLASS))
        .and_then(|e| e.attrs.get("data-chart"))
        .and_then(|raw| serde_json::from_str(raw).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_with_anchor(key: &str) -> Document {
        let mut doc = Document::new();
        doc.append(doc.root(), Element::new("div").key(key));
        doc
    }

    #[test]
    fn labels_follow_series_order() {
        let series = Series::from([("urgent", 2), ("action", 0), ("fyi", 1), ("spam", 0)]);
        let spec = ChartSpec::magnitude("Conversations", &series);

        assert_eq!(spec.data.labels, vec!["urgent", "action", "fyi", "spam"]);
        assert_eq!(spec.data.datasets[0].data, vec![2, 0, 1, 0]);
        assert_eq!(spec.data.datasets[0].label, "Conversations");
    }

    #[test]
    fn trend_serializes_fill_settings() {
        let series = Series::from([("todo", 3), ("doing", 1), ("done", 0), ("dismissed", 0)]);
        let value = serde_json::to_value(ChartSpec::trend("Tasks", &series)).unwrap();

        assert_eq!(value["type"], "line");
        assert_eq!(value["data"]["datasets"][0]["fill"], true);
        assert_eq!(value["data"]["datasets"][0]["tension"], 0.4);
        assert_eq!(value["data"]["datasets"][0]["backgroundColor"], "#3b82f633");
        assert_eq!(value["options"]["scales"]["y"]["beginAtZero"], true);
    }

    #[test]
    fn proportion_omits_line_fields() {
        let series = Series::from([("Inbox", 4)]);
        let value = serde_json::to_value(ChartSpec::proportion("Messages", &series)).unwrap();
        let dataset = &value["data"]["datasets"][0];

        assert_eq!(value["type"], "doughnut");
        assert!(dataset.get("fill").is_none());
        assert!(dataset["backgroundColor"].is_array());
    }

    #[test]
    fn rerender_replaces_instead_of_duplicating() {
        let mut doc = doc_with_anchor("chartTasksCompletion");
        let first = Series::from([("todo", 1)]);
        let second = Series::from([("todo", 5)]);

        let old = render_chart(&mut doc, "chartTasksCompletion", &ChartSpec::trend("Tasks", &first))
            .unwrap();
        let new = render_chart(&mut doc, "chartTasksCompletion", &ChartSpec::trend("Tasks", &second))
            .unwrap();

        let anchor = doc.by_key("chartTasksCompletion").unwrap();
        assert_eq!(doc.children(anchor), &[new]);
        assert!(!doc.contains(old));
        let bound = bound_chart(&doc, "chartTasksCompletion").unwrap();
        assert_eq!(bound["data"]["datasets"][0]["data"][0], 5);
    }

    #[test]
    fn missing_anchor_is_a_no_op() {
        let mut doc = Document::new();
        let before = doc.len();
        let spec = ChartSpec::proportion("Messages", &Series::default());

        assert!(render_chart(&mut doc, "chartMessagesBySource", &spec).is_none());
        assert_eq!(doc.len(), before);
    }
}
