// Derived views - display-ready projections of report rows
use super::report::{ActivityRow, GamePassRow, PlayerRow, ReportPayload, SignupSourceRow};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of players shown in the activity bar chart.
pub const ACTIVITY_CHART_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub series: Vec<ChartSeries>,
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub name: String,
    pub value: f64,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub title: String,
    /// Label of the total line, if the summary shows one.
    pub total_label: Option<String>,
    pub total: f64,
    pub shares: Vec<Share>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub table: Table,
    pub chart: Option<Chart>,
    pub breakdown: Option<Breakdown>,
}

/// Percentage of `value` in `total`; 0 when the total is 0.
pub fn percentage(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total * 100.0
    }
}

/// Each value's share of their sum.
pub fn shares(items: Vec<(String, f64)>) -> (f64, Vec<Share>) {
    let total: f64 = items.iter().map(|(_, value)| value).sum();
    let shares = items
        .into_iter()
        .map(|(name, value)| Share {
            pct: percentage(value, total),
            name,
            value,
        })
        .collect();
    (total, shares)
}

impl ReportView {
    pub fn derive(payload: &ReportPayload) -> Self {
        match payload {
            ReportPayload::Players(rows) => players_view(rows),
            ReportPayload::Activity(rows) => activity_view(rows),
            ReportPayload::GamePass(rows) => game_pass_view(rows),
            ReportPayload::SignupSource(rows) => signup_source_view(rows),
        }
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn format_datetime(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn format_date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn players_view(rows: &[PlayerRow]) -> ReportView {
    let table = Table {
        columns: columns(&[
            "Player ID",
            "Parent",
            "Device",
            "Signup On",
            "Games Played",
            "Games Won",
            "Questions Played",
            "Total Prize Won",
        ]),
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    row.player_id.clone(),
                    row.parent.clone(),
                    row.device.clone(),
                    format_datetime(row.signup_on),
                    row.game_played_count.to_string(),
                    row.won_game_count.to_string(),
                    row.question_played_count.to_string(),
                    row.total_prize_won.to_string(),
                ]
            })
            .collect(),
    };

    ReportView {
        table,
        chart: None,
        breakdown: None,
    }
}

fn activity_view(rows: &[ActivityRow]) -> ReportView {
    let charted = &rows[..rows.len().min(ACTIVITY_CHART_LIMIT)];
    let chart = Chart {
        kind: ChartKind::Bar,
        series: vec![
            activity_series(charted, "Games Played", |row| row.game_played_count as f64),
            activity_series(charted, "Questions Played", |row| {
                row.question_played_count as f64
            }),
            activity_series(charted, "Skipped", |row| row.skipped_count as f64),
        ],
    };

    let table = Table {
        columns: columns(&[
            "Player ID",
            "Games Played",
            "Questions Played",
            "Skipped Count",
            "Response Time (ms)",
            "Playtime",
            "Prize Won",
        ]),
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    row.player_id.clone(),
                    row.game_played_count.to_string(),
                    row.question_played_count.to_string(),
                    row.skipped_count.to_string(),
                    format!("{}ms", row.total_response_time),
                    format!("{}s", row.total_playtime),
                    row.prize_won.to_string(),
                ]
            })
            .collect(),
    };

    ReportView {
        table,
        chart: Some(chart),
        breakdown: None,
    }
}

fn activity_series(
    rows: &[ActivityRow],
    name: &str,
    value: fn(&ActivityRow) -> f64,
) -> ChartSeries {
    ChartSeries {
        name: name.to_string(),
        points: rows
            .iter()
            .map(|row| ChartPoint {
                label: row.player_id.clone(),
                value: value(row),
            })
            .collect(),
    }
}

fn game_pass_view(rows: &[GamePassRow]) -> ReportView {
    let (purchased, from_referral, used) =
        rows.iter().fold((0u64, 0u64, 0u64), |(p, r, u), row| {
            (
                p.saturating_add(row.game_pass_purchased),
                r.saturating_add(row.game_pass_from_referral),
                u.saturating_add(row.game_pass_used),
            )
        });
    let (total, shares) = shares(vec![
        ("Purchased".to_string(), purchased as f64),
        ("From Referral".to_string(), from_referral as f64),
        ("Used".to_string(), used as f64),
    ]);

    let table = Table {
        columns: columns(&[
            "Player ID",
            "Game Pass Purchased",
            "Game Pass From Referral",
            "Game Pass Used",
            "Date",
        ]),
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    row.player_id.clone(),
                    row.game_pass_purchased.to_string(),
                    row.game_pass_from_referral.to_string(),
                    row.game_pass_used.to_string(),
                    format_date(row.date),
                ]
            })
            .collect(),
    };

    ReportView {
        table,
        chart: Some(pie_chart("Count", &shares)),
        breakdown: Some(Breakdown {
            title: "Game Pass Summary".to_string(),
            total_label: None,
            total,
            shares,
        }),
    }
}

fn signup_source_view(rows: &[SignupSourceRow]) -> ReportView {
    let (total, shares) = shares(
        rows.iter()
            .map(|row| (row.source.clone(), row.count as f64))
            .collect(),
    );

    let table = Table {
        columns: columns(&["Source", "Count", "Percentage"]),
        rows: shares
            .iter()
            .map(|share| {
                vec![
                    share.name.clone(),
                    share.value.to_string(),
                    format!("{:.1}%", share.pct),
                ]
            })
            .collect(),
    };

    ReportView {
        table,
        chart: Some(pie_chart("Count", &shares)),
        breakdown: Some(Breakdown {
            title: "Signup Summary".to_string(),
            total_label: Some("Total Signups".to_string()),
            total,
            shares,
        }),
    }
}

fn pie_chart(name: &str, shares: &[Share]) -> Chart {
    Chart {
        kind: ChartKind::Pie,
        series: vec![ChartSeries {
            name: name.to_string(),
            points: shares
                .iter()
                .map(|share| ChartPoint {
                    label: share.name.clone(),
                    value: share.value,
                })
                .collect(),
        }],
    }
}
