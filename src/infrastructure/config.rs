use crate::domain::refresh::{InvalidRefreshInterval, RefreshInterval};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub backend: BackendSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub token: String,
    /// `startDate` sent with the players report. Epoch millis.
    #[serde(default = "default_players_start_date")]
    pub players_start_date: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    /// Request timeout. In millis
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_players_start_date() -> i64 {
    1_740_045_840_574
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_refresh_interval_secs() -> u64 {
    RefreshInterval::default().as_secs()
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl DashboardSettings {
    pub fn refresh_interval(&self) -> Result<RefreshInterval, InvalidRefreshInterval> {
        RefreshInterval::try_from(self.refresh_interval_secs)
    }
}

/// Load settings from `config/dashboard.toml` (optional), then from the
/// environment. E.g. `GAME_DASHBOARD__BACKEND__TOKEN=... ./target/app`
/// sets the backend token.
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = Config::builder()
        .add_source(File::with_name("config/dashboard").required(false))
        .add_source(
            Environment::with_prefix("GAME_DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
