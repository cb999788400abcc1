use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::auth::{ClientCredentials, TokenCache};
use super::http_client::build_api_client_with_timeout;
use super::scrub::sanitize_api_error;
use super::traits::{ApiRequest, ApiTransport, Method};
use crate::config::Config;
use crate::error::ApiError;

/// Names the API uses for the update-plan capability in error bodies.
const PLAN_FEATURE_NAMES: [&str; 3] = [
    "managed software update",
    "software update plan",
    "software updates feature",
];

/// Body fragments the API uses when a capability is switched off.
const FEATURE_DISABLED_MARKERS: [&str; 4] =
    ["not enabled", "is disabled", "are disabled", "is turned off"];

/// HTTP implementation of [`ApiTransport`] with bearer-token injection.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenCache,
}

impl ApiClient {
    pub fn new(base_url: &str, token_path: &str, credentials: ClientCredentials, timeout_secs: u64) -> Self {
        let http = build_api_client_with_timeout(timeout_secs);
        let base_url = base_url.trim_end_matches('/').to_string();
        let token_url = join_url(&base_url, token_path);
        Self {
            tokens: TokenCache::new(http.clone(), token_url, credentials),
            http,
            base_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let connection = &config.connection;
        Self::new(
            &connection.base_url,
            &config.endpoints.token,
            ClientCredentials::new(
                connection.client_id.clone(),
                connection.client_secret.as_str(),
            ),
            connection.timeout_secs,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Acquire (or reuse) an access token without calling any API endpoint.
    pub async fn authenticate(&self) -> Result<(), ApiError> {
        self.tokens.get_token().await.map(drop)
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<reqwest::Response, ApiError> {
        let token = self.tokens.get_token().await?;
        let url = join_url(&self.base_url, &request.path);

        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Patch => self.http.patch(&url),
        }
        .bearer_auth(token.as_str())
        .header("accept", "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder
            .send()
            .await
            .map_err(|e| ApiError::transport(&request.label, e.to_string()))
    }
}

#[async_trait]
impl ApiTransport for ApiClient {
    #[instrument(skip(self, request), fields(endpoint = %request.label, method = %request.method, path = %request.path))]
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut response = self.send_once(&request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("access token rejected, refreshing and retrying once");
            self.tokens.invalidate().await;
            response = self.send_once(&request).await?;
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(&request.label, e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(&request.label, status, &body));
        }

        debug!(status = status.as_u16(), bytes = body.len(), "request complete");
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::decode(&request.label, e.to_string()))
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Map a non-success response to the error kind callers branch on.
///
/// Only a body that names the update-plan feature *and* says it is switched
/// off is `FeatureUnavailable`. A bare 503 is an outage and stays fatal.
pub fn classify_failure(label: &str, status: StatusCode, body: &str) -> ApiError {
    let message = sanitize_api_error(body);
    let lowered = body.to_ascii_lowercase();
    let names_feature = PLAN_FEATURE_NAMES
        .iter()
        .any(|name| lowered.contains(name));
    let says_disabled = FEATURE_DISABLED_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker));

    let feature_off = matches!(
        status,
        StatusCode::BAD_REQUEST
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND
            | StatusCode::SERVICE_UNAVAILABLE
    ) && names_feature
        && says_disabled;

    if feature_off {
        ApiError::FeatureUnavailable {
            endpoint: label.to_string(),
            message,
        }
    } else {
        ApiError::Transport {
            endpoint: label.to_string(),
            status: Some(status.as_u16()),
            message,
        }
    }
}
