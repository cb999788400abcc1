//! Canonical device identity.
//!
//! The device endpoints and the plan endpoint disagree on how they serialize
//! a device id: one returns `"42"`, another `42`. Every ingestion boundary
//! runs raw ids through [`DeviceIdentity::from_json`] so map keys and lookups
//! always compare the same canonical string form.

use serde::Serialize;
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeviceIdentity(String);

impl DeviceIdentity {
    /// Canonicalize a string id. Surrounding whitespace is not significant;
    /// an empty id is no id.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Canonicalize a JSON id of either representation.
    ///
    /// Numbers use their JSON text form, so `normalize(x) == normalize(str(x))`
    /// holds for every numeric id the API can emit.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DeviceIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
