use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Write a CSV inventory report each run (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Report directory; `~` is expanded
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> String {
    "~/planwatch/reports".into()
}

impl ExportConfig {
    pub fn resolved_output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output_dir).as_ref())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_output_dir(),
        }
    }
}
