// Report domain models - the four backend reports and their row schemas
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NOT_AVAILABLE: &str = "N/A";
const UNKNOWN_SOURCE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Players,
    Activity,
    GamePass,
    SignupSource,
}

impl ReportKind {
    /// Display order of the panels on the dashboard.
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Players,
        ReportKind::Activity,
        ReportKind::GamePass,
        ReportKind::SignupSource,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            ReportKind::Players => "/gamereaderapi/api/getAllPlayersData",
            ReportKind::Activity => "/gamereaderapi/api/getActivityStats",
            ReportKind::GamePass => "/gamereaderapi/api/getPlayerGamePassStats",
            ReportKind::SignupSource => "/reader/user/signup-source-count",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::Players => "players",
            ReportKind::Activity => "activity",
            ReportKind::GamePass => "game-pass",
            ReportKind::SignupSource => "signup-source",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Players => "All Players Data",
            ReportKind::Activity => "Game Activity Stats",
            ReportKind::GamePass => "Game Pass Statistics",
            ReportKind::SignupSource => "Signup Sources",
        }
    }

    /// What the panel is called in loading and failure messages.
    fn subject(&self) -> &'static str {
        match self {
            ReportKind::Players => "players data",
            ReportKind::Activity => "activity stats",
            ReportKind::GamePass => "game pass stats",
            ReportKind::SignupSource => "signup source data",
        }
    }

    pub fn loading_message(&self) -> String {
        format!("Loading {}...", self.subject())
    }

    pub fn failure_message(&self) -> String {
        format!("Failed to fetch {}", self.subject())
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerRow {
    #[serde(deserialize_with = "lenient::text_or_na")]
    pub player_id: String,
    #[serde(deserialize_with = "lenient::text_or_na")]
    pub parent: String,
    #[serde(deserialize_with = "lenient::text_or_na")]
    pub device: String,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub signup_on: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::count")]
    pub game_played_count: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub won_game_count: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub question_played_count: u64,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_prize_won: f64,
}

impl Default for PlayerRow {
    fn default() -> Self {
        Self {
            player_id: NOT_AVAILABLE.to_string(),
            parent: NOT_AVAILABLE.to_string(),
            device: NOT_AVAILABLE.to_string(),
            signup_on: None,
            game_played_count: 0,
            won_game_count: 0,
            question_played_count: 0,
            total_prize_won: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityRow {
    #[serde(deserialize_with = "lenient::text_or_na")]
    pub player_id: String,
    #[serde(deserialize_with = "lenient::count")]
    pub game_played_count: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub question_played_count: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub skipped_count: u64,
    /// Milliseconds.
    #[serde(deserialize_with = "lenient::amount")]
    pub total_response_time: f64,
    /// Seconds.
    #[serde(deserialize_with = "lenient::amount")]
    pub total_playtime: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub prize_won: f64,
}

impl Default for ActivityRow {
    fn default() -> Self {
        Self {
            player_id: NOT_AVAILABLE.to_string(),
            game_played_count: 0,
            question_played_count: 0,
            skipped_count: 0,
            total_response_time: 0.0,
            total_playtime: 0.0,
            prize_won: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GamePassRow {
    #[serde(deserialize_with = "lenient::text_or_na")]
    pub player_id: String,
    #[serde(deserialize_with = "lenient::count")]
    pub game_pass_purchased: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub game_pass_from_referral: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub game_pass_used: u64,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub date: Option<DateTime<Utc>>,
}

impl Default for GamePassRow {
    fn default() -> Self {
        Self {
            player_id: NOT_AVAILABLE.to_string(),
            game_pass_purchased: 0,
            game_pass_from_referral: 0,
            game_pass_used: 0,
            date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupSourceRow {
    #[serde(deserialize_with = "lenient::text_or_unknown")]
    pub source: String,
    #[serde(deserialize_with = "lenient::count")]
    pub count: u64,
}

impl Default for SignupSourceRow {
    fn default() -> Self {
        Self {
            source: UNKNOWN_SOURCE.to_string(),
            count: 0,
        }
    }
}

/// Decoded `data` rows of one report response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportPayload {
    Players(Vec<PlayerRow>),
    Activity(Vec<ActivityRow>),
    GamePass(Vec<GamePassRow>),
    SignupSource(Vec<SignupSourceRow>),
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Vec<T>,
}

impl ReportPayload {
    pub fn empty(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Players => ReportPayload::Players(Vec::new()),
            ReportKind::Activity => ReportPayload::Activity(Vec::new()),
            ReportKind::GamePass => ReportPayload::GamePass(Vec::new()),
            ReportKind::SignupSource => ReportPayload::SignupSource(Vec::new()),
        }
    }

    /// Decode a `{ "data": [...] }` response body for the given report.
    pub fn from_envelope(kind: ReportKind, body: &[u8]) -> serde_json::Result<Self> {
        Ok(match kind {
            ReportKind::Players => {
                ReportPayload::Players(serde_json::from_slice::<Envelope<PlayerRow>>(body)?.data)
            }
            ReportKind::Activity => {
                ReportPayload::Activity(serde_json::from_slice::<Envelope<ActivityRow>>(body)?.data)
            }
            ReportKind::GamePass => {
                ReportPayload::GamePass(serde_json::from_slice::<Envelope<GamePassRow>>(body)?.data)
            }
            ReportKind::SignupSource => {
                ReportPayload::SignupSource(serde_json::from_slice::<Envelope<SignupSourceRow>>(body)?.data)
            }
        })
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            ReportPayload::Players(_) => ReportKind::Players,
            ReportPayload::Activity(_) => ReportKind::Activity,
            ReportPayload::GamePass(_) => ReportKind::GamePass,
            ReportPayload::SignupSource(_) => ReportKind::SignupSource,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ReportPayload::Players(rows) => rows.len(),
            ReportPayload::Activity(rows) => rows.len(),
            ReportPayload::GamePass(rows) => rows.len(),
            ReportPayload::SignupSource(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Field deserializers that accept the loose JSON the backend produces:
/// nulls, numbers sent as strings, ids sent as numbers.
mod lenient {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn text_or<'de, D>(deserializer: D, placeholder: &str) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => placeholder.to_string(),
        };
        Ok(text)
    }

    pub fn text_or_na<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        text_or(deserializer, super::NOT_AVAILABLE)
    }

    pub fn text_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        text_or(deserializer, super::UNKNOWN_SOURCE)
    }

    pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        Ok(if value.is_finite() { value } else { 0.0 })
    }

    pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = amount(deserializer)?;
        Ok(if value > 0.0 { value.round() as u64 } else { 0 })
    }

    /// Epoch milliseconds, a numeric string of them, or an RFC 3339 string.
    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
            Some(Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(millis) => DateTime::from_timestamp_millis(millis),
                Err(_) => DateTime::parse_from_rfc3339(s.trim())
                    .ok()
                    .map(|t| t.with_timezone(&Utc)),
            },
            _ => None,
        };
        Ok(parsed)
    }
}
