use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `planwatch`.
///
/// Each stage of a run defines its own error type. The batch orchestrator
/// matches on these to decide between aborting the run and taking a fallback
/// path; command handlers continue to use `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum RunError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Upstream API ─────────────────────────────────────────────────────
    #[error("api: {0}")]
    Api(#[from] ApiError),

    // ── Annotation synchronization set-up ────────────────────────────────
    #[error("sync: {0}")]
    Sync(#[from] SyncError),

    // ── Report export ────────────────────────────────────────────────────
    #[error("export: {0}")]
    Export(#[from] ExportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Upstream API errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure or non-success HTTP status. Not retried internally.
    #[error("{endpoint} request failed{}: {message}", status_suffix(.status))]
    Transport {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// The upstream capability behind the endpoint is switched off.
    #[error("{endpoint} is unavailable, feature disabled upstream: {message}")]
    FeatureUnavailable { endpoint: String, message: String },

    /// A success response whose body could not be interpreted.
    #[error("{endpoint} returned an unexpected payload: {message}")]
    Decode { endpoint: String, message: String },
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl ApiError {
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            status: None,
            message: message.into(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn is_feature_unavailable(&self) -> bool {
        matches!(self, Self::FeatureUnavailable { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::FeatureUnavailable { .. } | Self::Decode { .. } => None,
        }
    }
}

// ─── Annotation synchronization errors ──────────────────────────────────────

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(
        "annotation definition(s) missing and creation not authorized: {}",
        .names.join(", ")
    )]
    MissingAnnotationDefinition { names: Vec<String> },

    #[error("failed to list annotation definitions: {0}")]
    DefinitionList(#[source] ApiError),

    #[error("failed to create annotation definition {name}: {source}")]
    DefinitionCreate {
        name: String,
        #[source]
        source: ApiError,
    },
}

/// A single device's annotation write failed. Never fatal for the batch.
#[derive(Debug, Error)]
#[error("annotation write for device {device} failed: {source}")]
pub struct AnnotationWriteError {
    pub device: String,
    #[source]
    pub source: ApiError,
}

// ─── Export errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, RunError>;
