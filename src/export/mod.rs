//! Report sinks.

pub mod csv;

pub use self::csv::{INVENTORY_HEADERS, InventoryRow, export_rows, report_file_name, write_inventory_report};
