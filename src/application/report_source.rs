// Source trait for report data access
use crate::domain::error::FetchError;
use crate::domain::report::{ReportKind, ReportPayload};
use async_trait::async_trait;

#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Fetch the current rows of one report. Failures are returned, never
    /// raised, and are not retried.
    async fn fetch(&self, kind: ReportKind) -> Result<ReportPayload, FetchError>;
}
