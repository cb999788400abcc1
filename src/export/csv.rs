//! CSV inventory report.
//!
//! One row per device, written with a fixed header order so spreadsheets and
//! downstream scripts can rely on column positions.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::reconcile::ReconciledDevice;
use crate::error::ExportError;

/// Column order of [`InventoryRow`]; must track its serde renames.
pub const INVENTORY_HEADERS: [&str; 18] = [
    "Device ID",
    "Device Type",
    "Name",
    "Serial Number",
    "Model",
    "OS Version",
    "Last Contact",
    "Username",
    "Full Name",
    "Email",
    "Position",
    "Plan Status",
    "Plan Action",
    "Version Type",
    "Error Reasons",
    "Force Install Date",
    "Plan ID",
    "Max Deferrals",
];

/// Flat report row for one reconciled device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRow {
    #[serde(rename = "Device ID")]
    pub device_id: String,
    #[serde(rename = "Device Type")]
    pub device_type: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Serial Number")]
    pub serial_number: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "OS Version")]
    pub os_version: String,
    #[serde(rename = "Last Contact")]
    pub last_contact: String,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Full Name")]
    pub real_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Position")]
    pub position: String,
    #[serde(rename = "Plan Status")]
    pub plan_status: String,
    #[serde(rename = "Plan Action")]
    pub plan_action: String,
    #[serde(rename = "Version Type")]
    pub version_type: String,
    #[serde(rename = "Error Reasons")]
    pub error_reasons: String,
    #[serde(rename = "Force Install Date")]
    pub force_install_date: String,
    #[serde(rename = "Plan ID")]
    pub plan_id: String,
    #[serde(rename = "Max Deferrals")]
    pub max_deferrals: String,
}

impl From<&ReconciledDevice> for InventoryRow {
    fn from(entry: &ReconciledDevice) -> Self {
        let device = &entry.device;
        let status = &entry.status;
        Self {
            device_id: device.identity.to_string(),
            device_type: device.kind.to_string(),
            name: device.display_name.clone(),
            serial_number: device.serial_number.clone(),
            model: device.model.clone(),
            os_version: device.os_version.clone(),
            last_contact: device.last_contact.clone(),
            username: device.username.clone(),
            real_name: device.real_name.clone(),
            email: device.email.clone(),
            position: device.position.clone(),
            plan_status: status.plan_status.clone(),
            plan_action: status.plan_action.clone(),
            version_type: status.version_type.clone(),
            error_reasons: status.error_reasons.clone(),
            force_install_date: status.force_install_date.clone(),
            plan_id: entry.plan_id.clone().unwrap_or_default(),
            max_deferrals: entry
                .max_deferrals
                .map(|d| d.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Serialize `rows` as CSV. The header line is written even when there are
/// no rows.
pub fn export_rows<W: Write, R: Serialize>(
    header: &[&str],
    rows: &[R],
    writer: W,
) -> Result<(), ExportError> {
    let mut wtr = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// `plan_status_<YYYYMMDD_HHMMSS>.csv`
pub fn report_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("plan_status_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Numeric ids first in numeric order, then the rest by string.
fn device_sort_key(id: &str) -> ((u8, u64), &str) {
    (id.parse::<u64>().map_or((1, 0), |n| (0, n)), id)
}

/// Write the inventory report into `dir`, creating it if needed, and return
/// the file path. Rows are sorted by device id so reports diff cleanly.
pub fn write_inventory_report<Tz: TimeZone>(
    dir: &Path,
    devices: &[ReconciledDevice],
    at: &DateTime<Tz>,
) -> Result<PathBuf, ExportError>
where
    Tz::Offset: std::fmt::Display,
{
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(at));

    let mut rows: Vec<InventoryRow> = devices.iter().map(InventoryRow::from).collect();
    rows.sort_by(|a, b| device_sort_key(&a.device_id).cmp(&device_sort_key(&b.device_id)));

    let file = fs::File::create(&path)?;
    export_rows(&INVENTORY_HEADERS, &rows, file)?;
    info!(path = %path.display(), rows = rows.len(), "inventory report written");
    Ok(path)
}
