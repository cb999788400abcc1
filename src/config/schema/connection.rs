use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Device-management server, e.g. `https://mdm.example.org`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// OAuth API client id
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// OAuth API client secret
    #[serde(default = "default_client_secret")]
    pub client_secret: String,
    /// Per-request timeout (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://yourserver.example.com".into()
}

fn default_client_id() -> String {
    "YOUR_CLIENT_ID".into()
}

fn default_client_secret() -> String {
    "YOUR_CLIENT_SECRET".into()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: default_client_id(),
            client_secret: default_client_secret(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
