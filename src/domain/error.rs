// Report fetch failures
use thiserror::Error;

/// Why a report fetch failed. Panels only distinguish success from failure;
/// the variant is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request did not complete: {0}")]
    Network(String),
    #[error("response could not be decoded: {0}")]
    Decode(String),
    #[error("server responded with status {status}")]
    Server { status: u16 },
}

impl FetchError {
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Decode(_) => "decode",
            FetchError::Server { .. } => "server",
        }
    }
}
