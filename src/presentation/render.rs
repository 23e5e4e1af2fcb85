// Text renderer for the dashboard screen
use crate::domain::panel::{PanelState, PanelStatus};
use crate::domain::refresh::RefreshInterval;
use crate::domain::view::{Breakdown, Chart, ChartKind, ReportView, Table, percentage};
use std::fmt::Display;

const DASHBOARD_TITLE: &str = "Game Analytics Dashboard";
const BAR_WIDTH: usize = 40;

/// Render the whole screen: header, every panel, footer.
pub fn render_dashboard(panels: &[PanelState], interval: RefreshInterval) -> String {
    let mut out = String::new();
    out.push_str(DASHBOARD_TITLE);
    out.push('\n');
    out.push_str(&"=".repeat(DASHBOARD_TITLE.len()));
    out.push('\n');

    let options: Vec<String> = RefreshInterval::ALL
        .iter()
        .map(|option| {
            let mark = if *option == interval { '*' } else { ' ' };
            format!("({mark}) {}", option.label())
        })
        .collect();
    push_line(&mut out, format_args!("Refresh Interval: {}\n", options.join("  ")));

    for panel in panels {
        out.push_str(&render_panel(panel));
        out.push('\n');
    }

    let seconds = interval.as_secs();
    push_line(&mut out, format_args!("Data refreshes every {seconds} seconds"));
    out
}

pub fn render_panel(state: &PanelState) -> String {
    let mut out = String::new();
    let title = state.kind.title();
    match state.last_updated {
        Some(at) => {
            let at = at.format("%H:%M:%S");
            push_line(&mut out, format_args!("## {title}  (Last updated: {at} UTC)"));
        }
        None => {
            push_line(&mut out, format_args!("## {title}"));
        }
    }

    let never_loaded =
        state.rows.is_empty() && state.last_updated.is_none() && state.error.is_none();
    if never_loaded && matches!(state.status, PanelStatus::Idle | PanelStatus::Loading) {
        push_line(&mut out, state.kind.loading_message());
        return out;
    }

    if let Some(error) = &state.error {
        push_line(&mut out, format_args!("[!] {error}"));
    }

    out.push_str(&render_view(&state.view()));
    out
}

pub fn render_view(view: &ReportView) -> String {
    let mut out = String::new();
    if let Some(chart) = &view.chart {
        out.push_str(&render_chart(chart));
    }
    if let Some(breakdown) = &view.breakdown {
        out.push_str(&render_breakdown(breakdown));
    }
    out.push_str(&render_table(&view.table));
    out
}

pub fn render_table(table: &Table) -> String {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };
    let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();

    let mut out = line(&table.columns[..]);
    push_line(&mut out, format_args!("|-{}-|", separator.join("-+-")));
    if table.rows.is_empty() {
        out.push_str("(no rows)\n");
    }
    for row in &table.rows {
        out.push_str(&line(&row[..]));
    }
    out
}

pub fn render_chart(chart: &Chart) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format_args!(
            "{} chart",
            match chart.kind {
                ChartKind::Bar => "Bar",
                ChartKind::Pie => "Pie",
            }
        ),
    );
    if chart.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let label_width = chart
        .series
        .iter()
        .flat_map(|series| series.points.iter())
        .map(|point| point.label.chars().count())
        .max()
        .unwrap_or(0);

    match chart.kind {
        ChartKind::Bar => {
            let max = chart
                .series
                .iter()
                .flat_map(|series| series.points.iter())
                .map(|point| point.value)
                .fold(0.0, f64::max);
            for series in &chart.series {
                push_line(&mut out, format_args!("  {}", series.name));
                for point in &series.points {
                    push_line(
                        &mut out,
                        format_args!(
                            "    {:<label_width$} {:<bar_width$} {}",
                            point.label,
                            bar(point.value, max),
                            point.value,
                            bar_width = BAR_WIDTH
                        ),
                    );
                }
            }
        }
        ChartKind::Pie => {
            for series in &chart.series {
                let total: f64 = series.points.iter().map(|point| point.value).sum();
                for point in &series.points {
                    let pct = percentage(point.value, total);
                    push_line(
                        &mut out,
                        format_args!(
                            "    {:<label_width$} {:<bar_width$} {:.0}%",
                            point.label,
                            bar(pct, 100.0),
                            pct,
                            bar_width = BAR_WIDTH
                        ),
                    );
                }
            }
        }
    }
    out
}

pub fn render_breakdown(breakdown: &Breakdown) -> String {
    let mut out = String::new();
    push_line(&mut out, &breakdown.title);
    match &breakdown.total_label {
        Some(label) => {
            push_line(&mut out, format_args!("  {label}: {}", breakdown.total));
            for share in &breakdown.shares {
                push_line(
                    &mut out,
                    format_args!("  {}: {} ({:.1}%)", share.name, share.value, share.pct),
                );
            }
        }
        None => {
            for share in &breakdown.shares {
                push_line(&mut out, format_args!("  {}: {}", share.name, share.value));
            }
        }
    }
    out
}

fn push_line(out: &mut String, line: impl Display) {
    out.push_str(&line.to_string());
    out.push('\n');
}

fn bar(value: f64, max: f64) -> String {
    let filled = if max > 0.0 {
        ((value / max) * BAR_WIDTH as f64).round() as usize
    } else {
        0
    };
    "#".repeat(filled.min(BAR_WIDTH))
}
