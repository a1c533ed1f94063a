// =============================================================================
// SERVICE ACCOUNT AUTHENTICATION
// =============================================================================
//
// OAuth2 "JWT bearer" flow for a Google service account:
//
// 1. Sign a JWT with the account's private key (RS256).
// 2. Exchange it at the token endpoint for an access token.
// 3. Send the access token as `Authorization: Bearer ...`.
//
// The credential source is re-read on every call, but the access token is
// cached until shortly before it expires. Share the spreadsheet and the
// calendar with the service account email or every call will 403.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use super::credentials::{load_credentials, ServiceAccountCredentials};
use super::GoogleApiError;

/// Lifetime requested for every token.
const TOKEN_LIFETIME_SECS: u64 = 3600;

/// Tokens closer than this to expiry are refreshed.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    /// Issuer (service account email).
    iss: String,

    /// Scope (what APIs we want access to).
    scope: String,

    /// Audience (token endpoint).
    aud: String,

    /// Issued at (Unix timestamp).
    iat: u64,

    /// Expiration (Unix timestamp, max 1 hour from iat).
    exp: u64,
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Cached access token with expiration.
struct CachedToken {
    client_email: String,
    token: String,
    expires_at: SystemTime,
}

impl CachedToken {
    fn usable_for(&self, client_email: &str, now: SystemTime) -> bool {
        self.client_email == client_email && self.expires_at > now + REFRESH_MARGIN
    }
}

/// Authenticator that handles OAuth2 with service account credentials.
pub struct ServiceAccountAuth {
    source: Option<String>,
    scope: &'static str,
    client: Client,
    cached_token: RwLock<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(source: Option<String>, scope: &'static str) -> Self {
        Self {
            source,
            scope,
            client: Client::new(),
            cached_token: RwLock::new(None),
        }
    }

    /// Parses the credential source without touching the network.
    pub fn credentials(&self) -> Result<ServiceAccountCredentials, GoogleApiError> {
        Ok(load_credentials(self.source.as_deref())?)
    }

    /// Gets a valid access token, refreshing if necessary.
    pub async fn access_token(&self) -> Result<String, GoogleApiError> {
        let credentials = self.credentials()?;

        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.usable_for(&credentials.client_email, SystemTime::now()) {
                    return Ok(token.token.clone());
                }
            }
        }

        let response = self.fetch_new_token(&credentials).await?;
        let lifetime = response.expires_in.unwrap_or(TOKEN_LIFETIME_SECS);

        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(CachedToken {
                client_email: credentials.client_email.clone(),
                token: response.access_token.clone(),
                expires_at: SystemTime::now() + Duration::from_secs(lifetime),
            });
        }

        tracing::debug!(client_email = %credentials.client_email, scope = self.scope, "Fetched Google access token");
        Ok(response.access_token)
    }

    /// Fetches a new access token from Google.
    async fn fetch_new_token(
        &self,
        credentials: &ServiceAccountCredentials,
    ) -> Result<TokenResponse, GoogleApiError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let claims = JwtClaims {
            iss: credentials.client_email.clone(),
            scope: self.scope.to_string(),
            aud: credentials.token_uri.clone(),
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())?;
        let jwt = encode(&header, &claims, &key)?;

        let response = self
            .client
            .post(&credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleApiError::from_response(response).await);
        }

        Ok(response.json().await?)
    }
}
