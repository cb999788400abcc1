use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default = "default_level")]
    pub level: String,
    /// Optional append-mode log file; `~` is expanded
    #[serde(default)]
    pub file: Option<String>,
}

fn default_level() -> String {
    "info".into()
}

impl LoggingConfig {
    pub fn resolved_file(&self) -> Option<PathBuf> {
        self.file
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| PathBuf::from(shellexpand::tilde(f).as_ref()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}
