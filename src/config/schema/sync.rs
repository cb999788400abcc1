use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Write plan status to device annotations (default: true)
    #[serde(default = "default_true")]
    pub write_annotations: bool,
    /// Create missing annotation definitions instead of failing (default: false)
    #[serde(default)]
    pub create_missing_definitions: bool,
    /// Fetch attribute-limited devices as well (default: true)
    #[serde(default = "default_true")]
    pub include_limited_devices: bool,
    /// Items per list request (default: 100)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Pause between annotation writes (default: 250)
    #[serde(default = "default_write_delay_ms")]
    pub write_delay_ms: u64,
    /// Reconcile and export, but never write annotations (default: false)
    #[serde(default)]
    pub dry_run: bool,
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    100
}

fn default_write_delay_ms() -> u64 {
    250
}

impl SyncConfig {
    pub fn write_delay(&self) -> Duration {
        Duration::from_millis(self.write_delay_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            write_annotations: true,
            create_missing_definitions: false,
            include_limited_devices: true,
            page_size: default_page_size(),
            write_delay_ms: default_write_delay_ms(),
            dry_run: false,
        }
    }
}
