use super::Config;
use crate::error::ConfigError;

const MAX_PAGE_SIZE: usize = 2000;
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Fragments that mark a value as copied straight from the template.
const PLACEHOLDER_MARKERS: [&str; 6] = [
    "your_",
    "your-",
    "yourserver",
    "changeme",
    "replace_me",
    "replace-me",
];

pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }
    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        return true;
    }
    let lowered = trimmed.to_ascii_lowercase();
    PLACEHOLDER_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

impl Config {
    /// Fail fast on anything that would make the run pointless, before any
    /// network I/O happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let connection = &self.connection;
        for (field, value) in [
            ("connection.base_url", &connection.base_url),
            ("connection.client_id", &connection.client_id),
            ("connection.client_secret", &connection.client_secret),
        ] {
            if is_placeholder(value) {
                return Err(ConfigError::Validation(format!(
                    "{field} is missing or still a placeholder{}",
                    self.config_hint()
                )));
            }
        }

        let parsed = url::Url::parse(connection.base_url.trim()).map_err(|e| {
            ConfigError::Validation(format!("connection.base_url is not a valid URL: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "connection.base_url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::Validation(
                "connection.base_url has no host".into(),
            ));
        }

        if connection.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "connection.timeout_secs must be greater than 0".into(),
            ));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.sync.page_size) {
            return Err(ConfigError::Validation(format!(
                "sync.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.sync.page_size
            )));
        }

        if !self.endpoints.device_annotations.contains("{id}") {
            return Err(ConfigError::Validation(
                "endpoints.device_annotations must contain the {id} placeholder".into(),
            ));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }

        Ok(())
    }

    fn config_hint(&self) -> String {
        if self.config_path.as_os_str().is_empty() {
            String::new()
        } else {
            format!(" (edit {})", self.config_path.display())
        }
    }
}
