pub mod auth;
pub mod calendar_client;
pub mod credentials;
pub mod sheets_client;

pub use auth::ServiceAccountAuth;
pub use calendar_client::GoogleCalendarClient;
pub use sheets_client::GoogleSheetsClient;

use thiserror::Error;

use crate::core::backlog::BacklogError;
use crate::core::calendar::CalendarError;
use crate::core::config::ConfigError;

#[derive(Debug, Error)]
pub enum GoogleApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("Token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl GoogleApiError {
    /// Reads the body of a failed response into an `ApiError`.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        GoogleApiError::ApiError { status, message }
    }
}

impl From<GoogleApiError> for BacklogError {
    fn from(err: GoogleApiError) -> Self {
        match err {
            GoogleApiError::Config(config) => BacklogError::Config(config),
            other => BacklogError::Remote(other.to_string()),
        }
    }
}

impl From<GoogleApiError> for CalendarError {
    fn from(err: GoogleApiError) -> Self {
        match err {
            GoogleApiError::Config(config) => CalendarError::Config(config),
            other => CalendarError::Remote(other.to_string()),
        }
    }
}
