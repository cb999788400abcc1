use std::path::PathBuf;

use crate::config::Config;
use crate::core::stats::RunStatistics;
use crate::transport::ApiTransport;

/// Everything one run reads and accumulates.
pub struct RunContext<'a, T: ApiTransport + ?Sized> {
    pub config: &'a Config,
    pub transport: &'a T,
    pub stats: RunStatistics,
    /// Set once the CSV report has been written.
    pub report_path: Option<PathBuf>,
}

impl<'a, T: ApiTransport + ?Sized> RunContext<'a, T> {
    pub fn new(config: &'a Config, transport: &'a T) -> Self {
        Self {
            config,
            transport,
            stats: RunStatistics::default(),
            report_path: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.config.sync.page_size
    }
}
