//! Device registry: both inventory collections merged under one identity key.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use strum::Display;
use tracing::{debug, warn};

use super::identity::DeviceIdentity;

/// Placeholder for a field the payload did not carry.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum DeviceKind {
    /// Supports inventory annotations.
    #[strum(serialize = "Full Device")]
    FullDevice,
    /// Inventory only; annotations are never written.
    #[strum(serialize = "Limited Device")]
    LimitedDevice,
}

impl DeviceKind {
    pub fn supports_annotations(self) -> bool {
        matches!(self, Self::FullDevice)
    }
}

/// Normalized device. Every text field is populated, `"Unknown"` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    pub identity: DeviceIdentity,
    pub kind: DeviceKind,
    pub display_name: String,
    pub serial_number: String,
    pub model: String,
    pub os_version: String,
    pub last_contact: String,
    pub username: String,
    pub real_name: String,
    pub email: String,
    pub position: String,
}

/// JSON-pointer candidates per field, tried in order.
struct FieldPaths {
    identity: &'static [&'static str],
    display_name: &'static [&'static str],
    serial_number: &'static [&'static str],
    model: &'static [&'static str],
    os_version: &'static [&'static str],
    last_contact: &'static [&'static str],
    username: &'static [&'static str],
    real_name: &'static [&'static str],
    email: &'static [&'static str],
    position: &'static [&'static str],
}

const FULL_DEVICE_FIELDS: FieldPaths = FieldPaths {
    identity: &["/id"],
    display_name: &["/general/name"],
    serial_number: &["/hardware/serialNumber"],
    model: &["/hardware/model"],
    os_version: &["/operatingSystem/version"],
    last_contact: &["/general/lastContactTime"],
    username: &["/userAndLocation/username"],
    real_name: &["/userAndLocation/realname"],
    email: &["/userAndLocation/email"],
    position: &["/userAndLocation/position"],
};

const LIMITED_DEVICE_FIELDS: FieldPaths = FieldPaths {
    identity: &["/mobileDeviceId", "/id"],
    display_name: &["/general/displayName", "/name"],
    serial_number: &["/hardware/serialNumber", "/serialNumber"],
    model: &["/hardware/model", "/model"],
    os_version: &["/general/osVersion", "/osVersion"],
    last_contact: &["/general/lastInventoryUpdateDate", "/general/lastInventoryUpdateTimestamp"],
    username: &["/userAndLocation/username", "/username"],
    real_name: &["/userAndLocation/realName"],
    email: &["/userAndLocation/emailAddress"],
    position: &["/userAndLocation/position"],
};

/// A raw inventory item tagged with the collection it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDevice {
    Full(Value),
    Limited(Value),
}

impl RawDevice {
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Full(_) => DeviceKind::FullDevice,
            Self::Limited(_) => DeviceKind::LimitedDevice,
        }
    }

    fn payload(&self) -> &Value {
        match self {
            Self::Full(v) | Self::Limited(v) => v,
        }
    }

    fn fields(&self) -> &'static FieldPaths {
        match self {
            Self::Full(_) => &FULL_DEVICE_FIELDS,
            Self::Limited(_) => &LIMITED_DEVICE_FIELDS,
        }
    }

    pub fn identity(&self) -> Option<DeviceIdentity> {
        let payload = self.payload();
        self.fields()
            .identity
            .iter()
            .find_map(|path| payload.pointer(path).and_then(DeviceIdentity::from_json))
    }

    /// Normalize into a record; `None` only when the item has no usable id.
    pub fn to_record(&self) -> Option<DeviceRecord> {
        let identity = self.identity()?;
        let payload = self.payload();
        let fields = self.fields();
        let text = |paths: &[&str]| text_at(payload, paths);

        Some(DeviceRecord {
            identity,
            kind: self.kind(),
            display_name: text(fields.display_name),
            serial_number: text(fields.serial_number),
            model: text(fields.model),
            os_version: text(fields.os_version),
            last_contact: text(fields.last_contact),
            username: text(fields.username),
            real_name: text(fields.real_name),
            email: text(fields.email),
            position: text(fields.position),
        })
    }
}

/// First non-blank scalar at any of `paths`, rendered as text.
fn text_at(payload: &Value, paths: &[&str]) -> String {
    paths
        .iter()
        .find_map(|path| match payload.pointer(path)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Build-time counters reported for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryCounts {
    pub full: usize,
    pub limited: usize,
    pub missing_identity: usize,
    pub collisions: usize,
}

impl RegistryCounts {
    pub fn total(&self) -> usize {
        self.full + self.limited
    }
}

/// Identity-keyed device records for one run.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: HashMap<DeviceIdentity, DeviceRecord>,
    counts: RegistryCounts,
}

impl DeviceRegistry {
    /// Merge both collections. Full devices are inserted first; a limited
    /// device whose identity is already taken is dropped and counted as a
    /// collision.
    pub fn build(full: Vec<Value>, limited: Vec<Value>) -> Self {
        let mut registry = Self::default();
        let raw = full
            .into_iter()
            .map(RawDevice::Full)
            .chain(limited.into_iter().map(RawDevice::Limited));

        for item in raw {
            registry.insert(&item);
        }

        debug!(
            total = registry.counts.total(),
            full = registry.counts.full,
            limited = registry.counts.limited,
            missing_identity = registry.counts.missing_identity,
            collisions = registry.counts.collisions,
            "device registry built"
        );
        registry
    }

    fn insert(&mut self, item: &RawDevice) {
        let Some(record) = item.to_record() else {
            warn!(kind = %item.kind(), "inventory item has no device id, skipping");
            self.counts.missing_identity += 1;
            return;
        };

        if let Some(existing) = self.devices.get(&record.identity) {
            warn!(
                device = %record.identity,
                kept = %existing.kind,
                dropped = %record.kind,
                "duplicate device id, keeping the first record"
            );
            self.counts.collisions += 1;
            return;
        }

        match record.kind {
            DeviceKind::FullDevice => self.counts.full += 1,
            DeviceKind::LimitedDevice => self.counts.limited += 1,
        }
        self.devices.insert(record.identity.clone(), record);
    }

    pub fn counts(&self) -> RegistryCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, identity: &DeviceIdentity) -> Option<&DeviceRecord> {
        self.devices.get(identity)
    }

    /// Iteration order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.values()
    }
}
