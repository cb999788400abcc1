mod connection;
mod core;
mod endpoints;
mod export;
mod logging;
mod sync;

pub use self::core::{Config, is_placeholder};
pub use connection::ConnectionConfig;
pub use endpoints::EndpointsConfig;
pub use export::ExportConfig;
pub use logging::LoggingConfig;
pub use sync::SyncConfig;
