// Panel state - polling lifecycle of one report panel
use super::error::FetchError;
use super::report::{ReportKind, ReportPayload};
use super::view::ReportView;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

/// State of one panel. Every fetch gets a sequence number when it is issued;
/// a result is only applied if its number is above every result applied so
/// far, so a slow response never overwrites a newer one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelState {
    pub kind: ReportKind,
    pub status: PanelStatus,
    pub rows: ReportPayload,
    /// Message of the last failed fetch. Kept while later fetches are
    /// loading and only cleared by the next success.
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    issued: u64,
    #[serde(skip)]
    settled: u64,
}

impl PanelState {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            status: PanelStatus::Idle,
            rows: ReportPayload::empty(kind),
            error: None,
            last_updated: None,
            issued: 0,
            settled: 0,
        }
    }

    /// Enter `Loading` and return the sequence number of the new fetch.
    pub fn begin_fetch(&mut self) -> u64 {
        self.issued += 1;
        self.status = PanelStatus::Loading;
        self.issued
    }

    /// Apply the result of fetch `seq`. Returns false when the result is
    /// older than one already applied and was discarded.
    pub fn apply(
        &mut self,
        seq: u64,
        result: Result<ReportPayload, FetchError>,
        now: DateTime<Utc>,
    ) -> bool {
        if seq <= self.settled || seq > self.issued {
            return false;
        }
        self.settled = seq;

        match result {
            Ok(payload) if payload.kind() == self.kind => {
                self.rows = payload;
                self.last_updated = Some(now);
                self.error = None;
                self.status = PanelStatus::Ready;
            }
            _ => {
                self.error = Some(self.kind.failure_message());
                self.status = PanelStatus::Error;
            }
        }
        true
    }

    /// Whether a fetch newer than the displayed result is still outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.issued > self.settled
    }

    pub fn view(&self) -> ReportView {
        ReportView::derive(&self.rows)
    }
}
