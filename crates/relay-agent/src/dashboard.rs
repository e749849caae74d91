//! Dashboard schema carried in `dashboardView`.
//!
//! Decoding is best effort: a section of the wrong JSON type is treated as
//! absent and entries that fail to decode are dropped, so a partially broken
//! dashboard still renders what it can.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
/// Public struct `DashboardContent` used across relay components.
pub struct DashboardContent {
    #[serde(
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary_cards: Option<Vec<SummaryCard>>,
    #[serde(
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub tables: Option<Vec<TableSpec>>,
    #[serde(
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub charts: Option<Vec<ChartSpec>>,
    #[serde(
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub alerts: Option<Vec<AlertSpec>>,
    #[serde(
        default,
        deserialize_with = "lenient_text_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub recommendations: Option<Vec<String>>,
}

impl DashboardContent {
    /// True when no section is present at all (an empty array still counts as present).
    pub fn is_empty(&self) -> bool {
        self.summary_cards.is_none()
            && self.tables.is_none()
            && self.charts.is_none()
            && self.alerts.is_none()
            && self.recommendations.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `CardStatus` values.
pub enum CardStatus {
    Positive,
    Negative,
    Neutral,
}

impl CardStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `SummaryCard` used across relay components.
pub struct SummaryCard {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default)]
    pub value: Value,
    #[serde(
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SummaryCard {
    /// Unknown or missing statuses read as neutral.
    pub fn status(&self) -> CardStatus {
        match self.status.as_deref().map(str::trim) {
            Some(status) if status.eq_ignore_ascii_case("positive") => CardStatus::Positive,
            Some(status) if status.eq_ignore_ascii_case("negative") => CardStatus::Negative,
            _ => CardStatus::Neutral,
        }
    }

    pub fn display_value(&self) -> String {
        display_cell(&self.value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `TableSpec` used across relay components.
pub struct TableSpec {
    #[serde(
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_labels")]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ChartKind` values.
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `ChartSpec` used across relay components.
pub struct ChartSpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ChartData>,
}

impl ChartSpec {
    /// Missing or unrecognized chart types fall back to bar.
    pub fn chart_kind(&self) -> ChartKind {
        match self.kind.as_deref().map(str::trim) {
            Some(kind) if kind.eq_ignore_ascii_case("pie") => ChartKind::Pie,
            Some(kind) if kind.eq_ignore_ascii_case("line") => ChartKind::Line,
            _ => ChartKind::Bar,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
/// Public struct `ChartData` used across relay components.
pub struct ChartData {
    #[serde(default, deserialize_with = "lenient_labels")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "lenient_values")]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
/// Alert entry: a bare legacy string or a typed message.
pub enum AlertSpec {
    Text(String),
    Detailed {
        #[serde(deserialize_with = "lenient_text")]
        message: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
    },
}

/// Render a JSON cell the way a user expects to read it.
pub fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Any scalar reads as its display text; `null` reads as empty.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(display_cell).unwrap_or_default())
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|value| !value.is_null()).map(|value| display_cell(&value)))
}

fn lenient_text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(display_cell)
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().map(display_cell).collect(),
        _ => Vec::new(),
    })
}

fn lenient_values<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().map(numeric_or_zero).collect(),
        _ => Vec::new(),
    })
}

fn numeric_or_zero(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::{AlertSpec, CardStatus, ChartKind, DashboardContent};
    use serde_json::json;

    #[test]
    fn unit_missing_sections_stay_absent() {
        let dashboard: DashboardContent =
            serde_json::from_value(json!({ "alerts": ["a"] })).expect("decode");
        assert!(dashboard.summary_cards.is_none());
        assert!(dashboard.charts.is_none());
        assert_eq!(dashboard.alerts, Some(vec![AlertSpec::Text("a".to_string())]));
    }

    #[test]
    fn unit_wrong_section_type_is_treated_as_absent() {
        let dashboard: DashboardContent =
            serde_json::from_value(json!({ "tables": "nope", "recommendations": 3 }))
                .expect("decode");
        assert!(dashboard.tables.is_none());
        assert!(dashboard.recommendations.is_none());
        assert!(dashboard.is_empty());
    }

    #[test]
    fn functional_undecodable_entries_are_dropped() {
        let dashboard: DashboardContent = serde_json::from_value(json!({
            "alerts": ["⚠️ spend", 42, { "message": "disk", "type": "error" }],
            "summaryCards": [{ "title": "Revenue", "value": 12 }, "junk"]
        }))
        .expect("decode");
        let alerts = dashboard.alerts.expect("alerts");
        assert_eq!(alerts.len(), 2);
        assert_eq!(
            alerts[1],
            AlertSpec::Detailed {
                message: "disk".to_string(),
                kind: Some("error".to_string()),
            }
        );
        let cards = dashboard.summary_cards.expect("cards");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].display_value(), "12");
        assert_eq!(cards[0].status(), CardStatus::Neutral);
    }

    #[test]
    fn unit_chart_kind_defaults_to_bar() {
        let dashboard: DashboardContent = serde_json::from_value(json!({
            "charts": [
                { "type": "pie" },
                { "type": "line" },
                { "type": "radar" },
                {}
            ]
        }))
        .expect("decode");
        let kinds = dashboard
            .charts
            .expect("charts")
            .iter()
            .map(|chart| chart.chart_kind())
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![ChartKind::Pie, ChartKind::Line, ChartKind::Bar, ChartKind::Bar]
        );
    }

    #[test]
    fn regression_non_numeric_chart_values_decode_as_zero() {
        let dashboard: DashboardContent = serde_json::from_value(json!({
            "charts": [{ "data": { "labels": ["a", 2, "c"], "values": [1, "2.5", null] } }]
        }))
        .expect("decode");
        let data = dashboard.charts.expect("charts")[0]
            .data
            .clone()
            .expect("data");
        assert_eq!(data.labels, vec!["a", "2", "c"]);
        assert_eq!(data.values, vec![1.0, 2.5, 0.0]);
    }

    #[test]
    fn regression_numeric_titles_and_headers_decode_as_text() {
        let dashboard: DashboardContent = serde_json::from_value(json!({
            "summaryCards": [{ "title": 2024, "value": "$10", "description": 7 }],
            "tables": [{ "title": 2025, "headers": ["Service", 2024, null], "rows": [] }],
            "charts": [{ "title": 3, "data": { "labels": ["a"], "values": [1] } }],
            "alerts": [{ "message": 404, "type": "error" }],
            "recommendations": ["Trim idle nodes", 42, null]
        }))
        .expect("decode");
        let card = &dashboard.summary_cards.expect("cards")[0];
        assert_eq!(card.title, "2024");
        assert_eq!(card.description.as_deref(), Some("7"));
        let table = &dashboard.tables.expect("tables")[0];
        assert_eq!(table.title.as_deref(), Some("2025"));
        assert_eq!(table.headers, vec!["Service", "2024", ""]);
        assert_eq!(
            dashboard.charts.expect("charts")[0].title.as_deref(),
            Some("3")
        );
        assert_eq!(
            dashboard.alerts,
            Some(vec![AlertSpec::Detailed {
                message: "404".to_string(),
                kind: Some("error".to_string()),
            }])
        );
        assert_eq!(
            dashboard.recommendations,
            Some(vec!["Trim idle nodes".to_string(), "42".to_string()])
        );
    }
}
