// HTTP report client - reads the backend's reporting endpoints
use crate::application::report_source::ReportSource;
use crate::domain::error::FetchError;
use crate::domain::report::{ReportKind, ReportPayload};
use crate::infrastructure::config::{BackendSettings, HttpSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpReportClient {
    client: reqwest::Client,
    base_url: String,
    players_start_date: i64,
}

/// Header set sent with every report request.
fn report_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("accept-version"),
        HeaderValue::from_static("V1"),
    );
    headers.insert(
        HeaderName::from_static("device-type"),
        HeaderValue::from_static("WEB"),
    );

    let mut token =
        HeaderValue::from_str(token).context("Backend token is not a valid header value")?;
    token.set_sensitive(true);
    headers.insert(HeaderName::from_static("token"), token);

    Ok(headers)
}

impl HttpReportClient {
    pub fn new(backend: &BackendSettings, http: &HttpSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(report_headers(&backend.token)?)
            .timeout(Duration::from_millis(http.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: backend.base_url.trim_end_matches('/').to_string(),
            players_start_date: backend.players_start_date,
        })
    }

    fn url(&self, kind: ReportKind) -> String {
        match kind {
            ReportKind::Players => format!(
                "{}{}?startDate={}",
                self.base_url,
                kind.path(),
                urlencoding::encode(&self.players_start_date.to_string())
            ),
            _ => format!("{}{}", self.base_url, kind.path()),
        }
    }

    async fn request(&self, kind: ReportKind) -> Result<ReportPayload, FetchError> {
        let url = self.url(kind);
        tracing::trace!("Going to make a request to {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Server {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        ReportPayload::from_envelope(kind, &body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ReportSource for HttpReportClient {
    async fn fetch(&self, kind: ReportKind) -> Result<ReportPayload, FetchError> {
        self.request(kind)
            .await
            .inspect(|payload| tracing::trace!(report = %kind, rows = payload.len(), "Loaded"))
            .inspect_err(|err| {
                tracing::warn!(report = %kind, reason = err.reason(), "Report fetch failed: {}", err)
            })
    }
}
