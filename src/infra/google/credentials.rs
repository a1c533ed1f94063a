// Service account credential loading.
//
// `GOOGLE_CREDENTIALS_JSON` may hold the key as inline JSON, as a path to the
// downloaded key file, or as base64-encoded JSON (handy for hosting panels
// that mangle newlines). The checks run in that order.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::config::ConfigError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccountCredentials {
    #[serde(rename = "type", default)]
    pub account_type: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,

    /// The service account email (used as issuer in JWT).
    pub client_email: String,

    /// The private key in PEM format.
    pub private_key: String,

    /// The token URI (where to exchange JWT for access token).
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Where the credential JSON comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    InlineJson(String),
    FilePath(PathBuf),
    Base64Json(String),
}

impl CredentialSource {
    pub fn classify(source: &str) -> Result<Self, ConfigError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(ConfigError::MissingCredentialSource);
        }
        if source.starts_with('{') {
            return Ok(Self::InlineJson(source.to_string()));
        }
        let path = Path::new(source);
        if path.is_file() {
            return Ok(Self::FilePath(path.to_path_buf()));
        }
        Ok(Self::Base64Json(source.to_string()))
    }
}

/// Parses the credential source. Called on every adapter call so that a
/// fixed configuration takes effect without a restart.
pub fn load_credentials(source: Option<&str>) -> Result<ServiceAccountCredentials, ConfigError> {
    let raw = source.unwrap_or_default();

    match CredentialSource::classify(raw)? {
        CredentialSource::InlineJson(json) => parse(&json),
        CredentialSource::FilePath(path) => {
            let from_file = std::fs::read_to_string(&path)
                .ok()
                .and_then(|content| parse(&content).ok());
            match from_file {
                Some(credentials) => Ok(credentials),
                None => {
                    tracing::debug!(path = %path.display(), "Credential file is not valid JSON, trying base64");
                    decode_base64(raw.trim())
                }
            }
        }
        CredentialSource::Base64Json(encoded) => decode_base64(&encoded),
    }
}

fn parse(json: &str) -> Result<ServiceAccountCredentials, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::InvalidCredentialSource(e.to_string()))
}

fn decode_base64(encoded: &str) -> Result<ServiceAccountCredentials, ConfigError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConfigError::InvalidCredentialSource(e.to_string()))?;
    let json =
        String::from_utf8(bytes).map_err(|e| ConfigError::InvalidCredentialSource(e.to_string()))?;
    parse(&json)
}
