// Runtime configuration for the assistant.
//
// Everything is read from the environment once at startup (after `.env` is
// loaded). Only the Discord token is required up front; the Google settings
// are checked when an adapter actually needs them so that a half-configured
// bot can still answer the commands that do work.

use chrono_tz::Tz;
use thiserror::Error;

pub const CREDENTIALS_VAR: &str = "GOOGLE_CREDENTIALS_JSON";
pub const SHEET_ID_VAR: &str = "GOOGLE_SHEET_ID";
pub const CALENDAR_ID_VAR: &str = "CALENDAR_ID";

const DEFAULT_AUTHOR: &str = "V.P.";
const DEFAULT_TZ: Tz = chrono_tz::Europe::Moscow;
const DEFAULT_PORT: u16 = 8080;

/// Configuration problems. These fail the one operation that needs the
/// value, never the whole process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing credential source: GOOGLE_CREDENTIALS_JSON is not set")]
    MissingCredentialSource,
    #[error(
        "GOOGLE_CREDENTIALS_JSON is neither a valid path, inline JSON, nor base64-encoded JSON: {0}"
    )]
    InvalidCredentialSource(String),
    #[error("{0} is not set")]
    MissingSetting(&'static str),
}

/// Worksheet (tab) names inside the backlog spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetNames {
    pub inbox: String,
    pub operations: String,
    pub kpi: String,
    pub effectiveness: String,
}

impl Default for WorksheetNames {
    fn default() -> Self {
        Self {
            inbox: "Inbox".to_string(),
            operations: "Operations".to_string(),
            kpi: "KPI".to_string(),
            effectiveness: "Effectiveness".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: Option<String>,
    pub sheet_id: Option<String>,
    pub calendar_id: Option<String>,
    pub credential_source: Option<String>,
    pub author_name: String,
    pub timezone: Tz,
    pub base_url: Option<String>,
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: Option<String>,
    pub yandex_api_key: Option<String>,
    pub yandex_folder_id: Option<String>,
    pub yandex_language: Option<String>,
    pub worksheets: WorksheetNames,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            discord_token: None,
            sheet_id: None,
            calendar_id: None,
            credential_source: None,
            author_name: DEFAULT_AUTHOR.to_string(),
            timezone: DEFAULT_TZ,
            base_url: None,
            port: DEFAULT_PORT,
            openai_api_key: None,
            openai_model: None,
            openrouter_api_key: None,
            openrouter_model: None,
            yandex_api_key: None,
            yandex_folder_id: None,
            yandex_language: None,
            worksheets: WorksheetNames::default(),
        }
    }
}

impl Settings {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timezone = match get("TZ") {
            Some(raw) => raw.parse::<Tz>().unwrap_or_else(|_| {
                tracing::warn!(tz = %raw, default = %DEFAULT_TZ, "Unknown time zone, using default");
                DEFAULT_TZ
            }),
            None => DEFAULT_TZ,
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!(port = %raw, "PORT is not a valid port number, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let defaults = WorksheetNames::default();
        let worksheets = WorksheetNames {
            inbox: get("SHEET_INBOX").unwrap_or(defaults.inbox),
            operations: get("SHEET_OPERATIONS").unwrap_or(defaults.operations),
            kpi: get("SHEET_KPI").unwrap_or(defaults.kpi),
            effectiveness: get("SHEET_EFFECTIVENESS").unwrap_or(defaults.effectiveness),
        };

        Self {
            discord_token: get("DISCORD_TOKEN"),
            sheet_id: get(SHEET_ID_VAR),
            calendar_id: get(CALENDAR_ID_VAR),
            credential_source: get(CREDENTIALS_VAR),
            author_name: get("AUTHOR_NAME").unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            timezone,
            base_url: get("BASE_URL"),
            port,
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL"),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_model: get("OPENROUTER_MODEL"),
            yandex_api_key: get("YANDEX_API_KEY"),
            yandex_folder_id: get("YANDEX_FOLDER_ID"),
            yandex_language: get("YANDEX_STT_LANG"),
            worksheets,
        }
    }

    /// Today's date in the configured time zone.
    pub fn today(&self) -> chrono::NaiveDate {
        chrono::Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

/// Returns the value or a `MissingSetting` error naming the variable.
pub fn require<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingSetting(name)),
    }
}
