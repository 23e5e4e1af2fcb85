// HTTP request handlers
use crate::domain::panel::PanelState;
use crate::domain::refresh::RefreshInterval;
use crate::domain::report::ReportKind;
use crate::domain::view::ReportView;
use crate::presentation::app_state::AppState;
use crate::presentation::render::render_dashboard;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelResponse {
    pub title: &'static str,
    pub refreshing: bool,
    #[serde(flatten)]
    pub state: PanelState,
    pub view: ReportView,
}

impl From<PanelState> for PanelResponse {
    fn from(state: PanelState) -> Self {
        Self {
            title: state.kind.title(),
            refreshing: state.is_refreshing(),
            view: state.view(),
            state,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct IntervalOption {
    pub seconds: u64,
    pub label: &'static str,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RefreshIntervalResponse {
    pub seconds: u64,
    pub label: &'static str,
    pub options: Vec<IntervalOption>,
}

impl From<RefreshInterval> for RefreshIntervalResponse {
    fn from(interval: RefreshInterval) -> Self {
        Self {
            seconds: interval.as_secs(),
            label: interval.label(),
            options: RefreshInterval::ALL
                .into_iter()
                .map(|option| IntervalOption {
                    seconds: option.as_secs(),
                    label: option.label(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetRefreshInterval {
    pub seconds: u64,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// The full dashboard as text
pub async fn dashboard_page(State(state): State<Arc<AppState>>) -> String {
    render_dashboard(&state.shell.snapshots(), state.shell.refresh_interval())
}

pub async fn list_panels(State(state): State<Arc<AppState>>) -> Json<Vec<PanelResponse>> {
    Json(
        state
            .shell
            .snapshots()
            .into_iter()
            .map(PanelResponse::from)
            .collect(),
    )
}

pub async fn get_panel(
    Path(kind): Path<ReportKind>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PanelResponse>, StatusCode> {
    state
        .shell
        .snapshot(kind)
        .map(|snapshot| Json(snapshot.into()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Trigger a fetch of one panel now
pub async fn refresh_panel(
    Path(kind): Path<ReportKind>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    if state.shell.refresh(kind) {
        StatusCode::ACCEPTED
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Trigger a fetch of every panel now
pub async fn refresh_all(State(state): State<Arc<AppState>>) -> StatusCode {
    state.shell.refresh_all();
    StatusCode::ACCEPTED
}

pub async fn get_refresh_interval(
    State(state): State<Arc<AppState>>,
) -> Json<RefreshIntervalResponse> {
    Json(state.shell.refresh_interval().into())
}

pub async fn set_refresh_interval(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetRefreshInterval>,
) -> Result<Json<RefreshIntervalResponse>, (StatusCode, String)> {
    let interval = RefreshInterval::try_from(body.seconds)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    state.shell.set_refresh_interval(interval);
    Ok(Json(interval.into()))
}
