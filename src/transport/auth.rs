//! OAuth2 client-credentials token handling.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use super::scrub::sanitize_api_error;
use crate::error::ApiError;

const TOKEN_LABEL: &str = "token";

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Client id and secret used for the client-credentials grant.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Zeroizing::new(client_secret.into()),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Cached access token.
struct CachedToken {
    access_token: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Lazily refreshed access token for one run.
pub struct TokenCache {
    http_client: reqwest::Client,
    token_url: String,
    credentials: ClientCredentials,
    cached_token: Mutex<Option<CachedToken>>,
    /// Refresh this long before the reported expiry.
    grace_period: Duration,
}

impl TokenCache {
    pub fn new(
        http_client: reqwest::Client,
        token_url: impl Into<String>,
        credentials: ClientCredentials,
    ) -> Self {
        Self {
            http_client,
            token_url: token_url.into(),
            credentials,
            cached_token: Mutex::new(None),
            grace_period: Duration::seconds(30),
        }
    }

    /// Gets a valid access token, refreshing if absent or expired.
    #[instrument(skip(self), fields(client_id = %self.credentials.client_id))]
    pub async fn get_token(&self) -> Result<Zeroizing<String>, ApiError> {
        let mut cache = self.cached_token.lock().await;
        if let Some(token) = cache.as_ref()
            && !token.is_expired(self.grace_period)
        {
            return Ok(token.access_token.clone());
        }

        debug!("refreshing access token");
        let fresh = self.acquire_token().await?;
        let access_token = fresh.access_token.clone();
        *cache = Some(fresh);
        Ok(access_token)
    }

    /// Invalidates the cached token, forcing a refresh on next use.
    pub async fn invalidate(&self) {
        *self.cached_token.lock().await = None;
    }

    async fn acquire_token(&self) -> Result<CachedToken, ApiError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ApiError::transport(TOKEN_LABEL, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Transport {
                endpoint: TOKEN_LABEL.into(),
                status: Some(status.as_u16()),
                message: sanitize_api_error(&body),
            });
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::decode(TOKEN_LABEL, e.to_string()))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        debug!(
            "acquired new token, expires at {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        Ok(CachedToken {
            access_token: Zeroizing::new(token_response.access_token),
            expires_at,
        })
    }
}
