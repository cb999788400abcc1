use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Patch,
}

/// One call against the device-management API, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Short name used in logs and error messages ("plans", "full devices").
    pub label: String,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(label: impl Into<String>, path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            body: Some(body),
            ..Self::get(label, path)
        }
    }

    pub fn patch(label: impl Into<String>, path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Patch,
            body: Some(body),
            ..Self::get(label, path)
        }
    }

    pub fn with_query(mut self, pairs: &[(String, String)]) -> Self {
        self.query.extend_from_slice(pairs);
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Authenticated request capability.
///
/// Implementations own credential handling; callers only see JSON or a
/// classified [`ApiError`].
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError>;
}
