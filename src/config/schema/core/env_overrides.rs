use super::Config;

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = non_empty_env("PLANWATCH_BASE_URL") {
            self.connection.base_url = url;
        }

        if let Some(id) = non_empty_env("PLANWATCH_CLIENT_ID") {
            self.connection.client_id = id;
        }

        if let Some(secret) = non_empty_env("PLANWATCH_CLIENT_SECRET") {
            self.connection.client_secret = secret;
        }

        if let Some(dir) = non_empty_env("PLANWATCH_OUTPUT_DIR") {
            self.export.output_dir = dir;
        }

        if let Some(level) = non_empty_env("PLANWATCH_LOG_LEVEL") {
            self.logging.level = level.to_ascii_lowercase();
        }
    }
}
