pub mod schema;

pub use schema::{
    Config, ConnectionConfig, EndpointsConfig, ExportConfig, LoggingConfig, SyncConfig,
    is_placeholder,
};
