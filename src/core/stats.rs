//! Per-run counters.

use serde::Serialize;
use std::collections::BTreeMap;

use super::plans::PlanIndexCounts;
use super::registry::RegistryCounts;
use super::sync::SyncReport;

/// Counters for one run. Created at start, filled in as stages complete,
/// then frozen by [`RunStatistics::finish`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub devices_processed: usize,
    pub full_devices: usize,
    pub limited_devices: usize,
    pub devices_missing_identity: usize,
    pub identity_collisions: usize,
    pub plans_fetched: usize,
    pub plans_indexed: usize,
    pub plans_missing_identity: usize,
    pub plans_overwritten: usize,
    /// `None` until the plan endpoint has been asked; `Some(false)` when it
    /// reported the feature as disabled.
    pub plans_available: Option<bool>,
    pub devices_updated: usize,
    pub devices_skipped: usize,
    /// Dry run only: writes that would have been issued.
    pub devices_would_update: usize,
    pub definitions_created: usize,
    pub errors: usize,
    pub status_histogram: BTreeMap<String, usize>,
}

impl RunStatistics {
    pub fn record_registry(&mut self, counts: &RegistryCounts) {
        self.full_devices = counts.full;
        self.limited_devices = counts.limited;
        self.devices_missing_identity = counts.missing_identity;
        self.identity_collisions = counts.collisions;
    }

    pub fn record_plans(&mut self, counts: &PlanIndexCounts) {
        self.plans_available = Some(true);
        self.plans_fetched = counts.received;
        self.plans_indexed = counts.indexed;
        self.plans_missing_identity = counts.missing_identity;
        self.plans_overwritten = counts.overwritten;
    }

    pub fn record_status(&mut self, plan_status: &str) {
        self.devices_processed += 1;
        *self
            .status_histogram
            .entry(plan_status.to_string())
            .or_insert(0) += 1;
    }

    pub fn status_count(&self, plan_status: &str) -> usize {
        self.status_histogram.get(plan_status).copied().unwrap_or(0)
    }

    pub fn record_definitions_created(&mut self, created: usize) {
        self.definitions_created += created;
    }

    pub fn absorb_sync(&mut self, report: &SyncReport) {
        self.devices_updated += report.updated();
        self.devices_skipped += report.skipped();
        self.devices_would_update += report.would_update();
        self.errors += report.failed();
    }

    /// A fatal error that stopped the run.
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Histogram entries, most frequent first, ties by name.
    pub fn histogram_by_count(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .status_histogram
            .iter()
            .map(|(status, count)| (status.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Freeze the counters; nothing can be recorded afterwards.
    pub fn finish(self) -> FinalStatistics {
        FinalStatistics(self)
    }
}

/// Read-only view of a completed run's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FinalStatistics(RunStatistics);

impl std::ops::Deref for FinalStatistics {
    type Target = RunStatistics;

    fn deref(&self) -> &RunStatistics {
        &self.0
    }
}
