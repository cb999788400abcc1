use serde::{Deserialize, Serialize};
use url::Url;

/// API paths, relative to `connection.base_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_token")]
    pub token: String,
    /// Paged inventory of full-featured devices
    #[serde(default = "default_full_devices")]
    pub full_devices: String,
    #[serde(default = "default_full_device_sections")]
    pub full_device_sections: Vec<String>,
    /// Paged inventory of attribute-limited devices
    #[serde(default = "default_limited_devices")]
    pub limited_devices: String,
    #[serde(default = "default_limited_device_sections")]
    pub limited_device_sections: Vec<String>,
    /// Paged list of software-update plans
    #[serde(default = "default_plans")]
    pub plans: String,
    /// Annotation definitions (list + create)
    #[serde(default = "default_definitions")]
    pub definitions: String,
    /// Per-device annotation write; `{id}` is replaced with the device identity
    #[serde(default = "default_device_annotations")]
    pub device_annotations: String,
}

fn default_token() -> String {
    "/api/oauth/token".into()
}

fn default_full_devices() -> String {
    "/api/v1/computers-inventory".into()
}

fn default_full_device_sections() -> Vec<String> {
    ["GENERAL", "HARDWARE", "OPERATING_SYSTEM", "USER_AND_LOCATION"]
        .map(String::from)
        .to_vec()
}

fn default_limited_devices() -> String {
    "/api/v2/mobile-devices/detail".into()
}

fn default_limited_device_sections() -> Vec<String> {
    ["GENERAL", "HARDWARE", "USER_AND_LOCATION"]
        .map(String::from)
        .to_vec()
}

fn default_plans() -> String {
    "/api/v1/managed-software-updates/plans".into()
}

fn default_definitions() -> String {
    "/api/v1/computer-extension-attributes".into()
}

fn default_device_annotations() -> String {
    "/api/v1/computers-inventory-detail/{id}".into()
}

/// Percent-encode `raw` as a single path segment (`/`, `?`, `#` included).
fn encode_path_segment(raw: &str) -> String {
    let Ok(mut url) = Url::parse("http://segment.invalid/") else {
        return raw.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(raw);
    }
    url.path().trim_start_matches('/').to_string()
}

impl EndpointsConfig {
    pub fn device_annotations_path(&self, id: &str) -> String {
        self.device_annotations
            .replace("{id}", &encode_path_segment(id))
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            token: default_token(),
            full_devices: default_full_devices(),
            full_device_sections: default_full_device_sections(),
            limited_devices: default_limited_devices(),
            limited_device_sections: default_limited_device_sections(),
            plans: default_plans(),
            definitions: default_definitions(),
            device_annotations: default_device_annotations(),
        }
    }
}
