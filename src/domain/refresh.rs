// Refresh interval shared by every panel
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum RefreshInterval {
    ThirtySeconds,
    #[default]
    OneMinute,
    FiveMinutes,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported refresh interval {0}s (expected 30, 60 or 300)")]
pub struct InvalidRefreshInterval(pub u64);

impl RefreshInterval {
    pub const ALL: [RefreshInterval; 3] = [
        RefreshInterval::ThirtySeconds,
        RefreshInterval::OneMinute,
        RefreshInterval::FiveMinutes,
    ];

    pub fn as_secs(&self) -> u64 {
        match self {
            RefreshInterval::ThirtySeconds => 30,
            RefreshInterval::OneMinute => 60,
            RefreshInterval::FiveMinutes => 300,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.as_secs())
    }

    pub fn label(&self) -> &'static str {
        match self {
            RefreshInterval::ThirtySeconds => "30 seconds",
            RefreshInterval::OneMinute => "1 minute",
            RefreshInterval::FiveMinutes => "5 minutes",
        }
    }
}

impl TryFrom<u64> for RefreshInterval {
    type Error = InvalidRefreshInterval;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.as_secs() == secs)
            .ok_or(InvalidRefreshInterval(secs))
    }
}

impl From<RefreshInterval> for u64 {
    fn from(interval: RefreshInterval) -> Self {
        interval.as_secs()
    }
}
