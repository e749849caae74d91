//! Leptos SSR rendering for the reply dashboard.
use leptos::prelude::*;
use relay_agent::{
    display_cell, AlertSpec, ChartKind, ChartSpec, DashboardContent, SummaryCard, TableSpec,
};

/// Pie segment colors, cycled by point index.
pub const CHART_PALETTE: [&str; 8] = [
    "#2563eb", "#16a34a", "#f59e0b", "#dc2626", "#7c3aed", "#db2777", "#0d9488", "#ea580c",
];

const BAR_GRID_FRACTIONS: [f64; 4] = [1.0, 0.75, 0.5, 0.25];

#[derive(Debug, Clone, PartialEq)]
/// Public struct `ChartPoint` in `relay-render`.
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Zip labels with values by position; a missing value reads as 0.
pub fn chart_points(chart: &ChartSpec) -> Vec<ChartPoint> {
    let Some(data) = chart.data.as_ref() else {
        return Vec::new();
    };
    data.labels
        .iter()
        .enumerate()
        .map(|(index, label)| ChartPoint {
            label: label.clone(),
            value: data.values.get(index).copied().unwrap_or(0.0),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Public enum `AlertSeverity` in `relay-render`.
pub enum AlertSeverity {
    Destructive,
    Default,
}

impl AlertSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Destructive => "destructive",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `DisplayAlert` in `relay-render`.
pub struct DisplayAlert {
    pub severity: AlertSeverity,
    pub message: String,
}

const WARNING_GLYPH: &str = "⚠️";
const SUCCESS_GLYPH: &str = "✅";

pub fn display_alert(alert: &AlertSpec) -> DisplayAlert {
    match alert {
        AlertSpec::Text(text) => {
            let severity = if text.trim_start().starts_with(WARNING_GLYPH) {
                AlertSeverity::Destructive
            } else {
                AlertSeverity::Default
            };
            let message = text
                .replacen(WARNING_GLYPH, "", 1)
                .replacen(SUCCESS_GLYPH, "", 1)
                .trim()
                .to_string();
            DisplayAlert { severity, message }
        }
        AlertSpec::Detailed { message, kind } => {
            let severity = match kind.as_deref().map(str::trim) {
                Some(kind)
                    if kind.eq_ignore_ascii_case("error")
                        || kind.eq_ignore_ascii_case("warning") =>
                {
                    AlertSeverity::Destructive
                }
                _ => AlertSeverity::Default,
            };
            DisplayAlert {
                severity,
                message: message.clone(),
            }
        }
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Render a dashboard to an HTML fragment.
pub fn render_dashboard(dashboard: &DashboardContent) -> String {
    dashboard_view(dashboard.clone()).to_html()
}

pub(crate) fn dashboard_view(dashboard: DashboardContent) -> impl IntoView {
    let cards = dashboard.summary_cards.unwrap_or_default();
    let charts = dashboard
        .charts
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chart| {
            let points = chart_points(&chart);
            (!points.is_empty()).then_some((chart, points))
        })
        .collect::<Vec<_>>();
    let tables = dashboard.tables.unwrap_or_default();
    let alerts = dashboard
        .alerts
        .unwrap_or_default()
        .iter()
        .map(display_alert)
        .collect::<Vec<_>>();
    let recommendations = dashboard.recommendations.unwrap_or_default();

    let is_blank = cards.is_empty()
        && charts.is_empty()
        && tables.is_empty()
        && alerts.is_empty()
        && recommendations.is_empty();

    let cards_section = (!cards.is_empty()).then(move || {
        let card_count = cards.len().to_string();
        view! {
            <section class="relay-summary-cards" data-component="SummaryCards" data-card-count=card_count>
                {cards
                    .into_iter()
                    .enumerate()
                    .map(|(index, card)| summary_card_view(index, card))
                    .collect_view()}
            </section>
        }
    });

    let charts_section = (!charts.is_empty()).then(move || {
        let chart_count = charts.len().to_string();
        view! {
            <section class="relay-charts" data-component="Charts" data-chart-count=chart_count>
                {charts
                    .into_iter()
                    .enumerate()
                    .map(|(index, (chart, points))| chart_view(index, chart, points))
                    .collect_view()}
            </section>
        }
    });

    let tables_section = (!tables.is_empty()).then(move || {
        let table_count = tables.len().to_string();
        view! {
            <section class="relay-tables" data-component="Tables" data-table-count=table_count>
                {tables
                    .into_iter()
                    .enumerate()
                    .map(|(index, table)| table_view(index, table))
                    .collect_view()}
            </section>
        }
    });

    let alerts_section = (!alerts.is_empty()).then(move || {
        let alert_count = alerts.len().to_string();
        view! {
            <section class="relay-alerts" data-component="Alerts" data-alert-count=alert_count>
                {alerts
                    .into_iter()
                    .enumerate()
                    .map(|(index, alert)| {
                        let alert_index = index.to_string();
                        view! {
                            <div
                                class="relay-alert"
                                role="alert"
                                data-alert-index=alert_index
                                data-severity=alert.severity.as_str()
                            >
                                {alert.message}
                            </div>
                        }
                    })
                    .collect_view()}
            </section>
        }
    });

    let recommendations_section = (!recommendations.is_empty()).then(move || {
        let recommendation_count = recommendations.len().to_string();
        view! {
            <section
                class="relay-recommendations"
                data-component="Recommendations"
                data-recommendation-count=recommendation_count
            >
                <h3>"Recommendations"</h3>
                <ul>
                    {recommendations
                        .into_iter()
                        .map(|recommendation| {
                            view! {
                                <li data-checked="true">
                                    <span class="relay-check" aria-hidden="true">"✓"</span>
                                    <span>{recommendation}</span>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            </section>
        }
    });

    let empty_hint = is_blank.then(|| {
        view! { <p class="relay-dashboard-empty">"This reply has no dashboard data."</p> }
    });

    view! {
        <section class="relay-dashboard" data-component="Dashboard">
            {cards_section}
            {charts_section}
            {tables_section}
            {alerts_section}
            {recommendations_section}
            {empty_hint}
        </section>
    }
}

fn summary_card_view(index: usize, card: SummaryCard) -> impl IntoView {
    let card_index = index.to_string();
    let status = card.status().as_str();
    let value = card.display_value();
    let description = card
        .description
        .clone()
        .filter(|description| !description.trim().is_empty());
    view! {
        <article class="relay-summary-card" data-card-index=card_index data-status=status>
            <h3>{card.title}</h3>
            <p class="relay-summary-card-value">{value}</p>
            {description
                .map(|description| {
                    view! { <p class="relay-summary-card-description">{description}</p> }
                })}
        </article>
    }
}

fn chart_view(index: usize, chart: ChartSpec, points: Vec<ChartPoint>) -> impl IntoView {
    let kind = chart.chart_kind();
    let chart_index = index.to_string();
    let point_count = points.len().to_string();
    let title = chart.title.filter(|title| !title.trim().is_empty());
    let body = match kind {
        ChartKind::Pie => pie_chart_view(points).into_any(),
        ChartKind::Bar | ChartKind::Line => bar_chart_view(points).into_any(),
    };
    view! {
        <article
            class="relay-chart-card"
            data-chart-index=chart_index
            data-chart-type=kind.as_str()
            data-point-count=point_count
        >
            {title.map(|title| view! { <h3>{title}</h3> })}
            {body}
        </article>
    }
}

fn bar_chart_view(points: Vec<ChartPoint>) -> impl IntoView {
    let max_value = points
        .iter()
        .map(|point| point.value)
        .fold(0.0_f64, f64::max);

    let grid_lines = BAR_GRID_FRACTIONS
        .iter()
        .map(|fraction| {
            let style = format!("bottom: {:.2}%;", fraction * 100.0);
            let tick = format_number(max_value * fraction);
            view! {
                <div class="relay-bar-grid-line" style=style>
                    <span class="relay-bar-grid-tick">{tick}</span>
                </div>
            }
        })
        .collect_view();

    let bars = points
        .into_iter()
        .enumerate()
        .map(|(index, point)| {
            let height = if max_value > 0.0 {
                point.value.max(0.0) / max_value * 100.0
            } else {
                0.0
            };
            let point_index = index.to_string();
            let value_text = format_number(point.value);
            let tooltip = format!("{}: {}", point.label, value_text);
            let fill_style = format!("height: {height:.2}%;");
            let label = point.label;
            let data_label = label.clone();
            view! {
                <div
                    class="relay-bar"
                    data-point-index=point_index
                    data-label=data_label
                    data-value=value_text
                    title=tooltip
                >
                    <div class="relay-bar-fill" style=fill_style></div>
                    <span class="relay-bar-label">{label}</span>
                </div>
            }
        })
        .collect_view();

    view! {
        <div class="relay-bar-chart" data-chart-renderer="bar" role="img">
            <div class="relay-bar-chart-plot">{grid_lines} {bars}</div>
        </div>
    }
}

fn pie_chart_view(points: Vec<ChartPoint>) -> impl IntoView {
    let total = points
        .iter()
        .map(|point| point.value.max(0.0))
        .sum::<f64>();

    let mut cursor = 0.0_f64;
    let mut stops = Vec::with_capacity(points.len());
    let mut segments = Vec::with_capacity(points.len());
    for (index, point) in points.into_iter().enumerate() {
        let share = if total > 0.0 {
            point.value.max(0.0) / total * 100.0
        } else {
            0.0
        };
        let color = CHART_PALETTE[index % CHART_PALETTE.len()];
        let end = cursor + share;
        stops.push(format!("{color} {cursor:.2}% {end:.2}%"));
        cursor = end;
        segments.push((index, point, share, color));
    }

    let background = if total > 0.0 {
        format!("background: conic-gradient({});", stops.join(", "))
    } else {
        "background: #e5e7eb;".to_string()
    };

    let legend = segments
        .into_iter()
        .map(|(index, point, share, color)| {
            let segment_index = index.to_string();
            let share_text = format!("{}%", format_number(share));
            let data_share = share_text.clone();
            let tooltip = format!("{}: {}", point.label, format_number(point.value));
            let swatch_style = format!("background-color: {color};");
            view! {
                <li
                    class="relay-pie-segment"
                    data-segment-index=segment_index
                    data-color=color
                    data-share=data_share
                    title=tooltip
                >
                    <span class="relay-pie-swatch" style=swatch_style></span>
                    <span class="relay-pie-label">{point.label}</span>
                    <span class="relay-pie-share">{share_text}</span>
                </li>
            }
        })
        .collect_view();

    view! {
        <div class="relay-pie-chart" data-chart-renderer="pie">
            <div class="relay-pie" role="img" style=background></div>
            <ul class="relay-pie-legend">{legend}</ul>
        </div>
    }
}

fn table_view(index: usize, table: TableSpec) -> impl IntoView {
    let table_index = index.to_string();
    let row_count = table.rows.len().to_string();
    let title = table.title.filter(|title| !title.trim().is_empty());
    let header_cells = table
        .headers
        .into_iter()
        .map(|header| view! { <th scope="col">{header}</th> })
        .collect_view();
    let body_rows = table
        .rows
        .into_iter()
        .map(|row| {
            let cells = row
                .iter()
                .map(|cell| view! { <td>{display_cell(cell)}</td> })
                .collect_view();
            view! { <tr>{cells}</tr> }
        })
        .collect_view();

    view! {
        <div class="relay-table" data-table-index=table_index data-row-count=row_count>
            {title.map(|title| view! { <h3>{title}</h3> })}
            <table>
                <thead>
                    <tr>{header_cells}</tr>
                </thead>
                <tbody>{body_rows}</tbody>
            </table>
        </div>
    }
}
