//! Status reconciliation: one fully populated status record per device.

use serde::Serialize;
use tracing::debug;

use super::plans::{PlanIndex, UpdatePlan};
use super::registry::{DeviceRecord, DeviceRegistry, UNKNOWN};
use super::stats::RunStatistics;

/// The device has no update plan at all.
pub const NO_PLAN: &str = "No Plan";
/// The plan carries no error reasons.
pub const NO_ERRORS: &str = "No Errors";
/// The plan has no forced install date.
pub const NOT_SET: &str = "Not Set";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    pub plan_status: String,
    pub plan_action: String,
    pub version_type: String,
    pub error_reasons: String,
    pub force_install_date: String,
}

fn or_sentinel(value: Option<&str>, sentinel: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(sentinel)
        .to_string()
}

impl StatusRecord {
    pub fn no_plan() -> Self {
        Self {
            plan_status: NO_PLAN.into(),
            plan_action: NO_PLAN.into(),
            version_type: NO_PLAN.into(),
            error_reasons: NO_PLAN.into(),
            force_install_date: NO_PLAN.into(),
        }
    }

    pub fn from_plan(plan: &UpdatePlan) -> Self {
        let reasons: Vec<&str> = plan
            .error_reasons
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();

        Self {
            plan_status: or_sentinel(plan.status_state.as_deref(), UNKNOWN),
            plan_action: or_sentinel(plan.update_action.as_deref(), UNKNOWN),
            version_type: or_sentinel(plan.version_type.as_deref(), UNKNOWN),
            error_reasons: if reasons.is_empty() {
                NO_ERRORS.to_string()
            } else {
                reasons.join(", ")
            },
            force_install_date: or_sentinel(plan.force_install_timestamp.as_deref(), NOT_SET),
        }
    }

    pub fn derive(plan: Option<&UpdatePlan>) -> Self {
        plan.map_or_else(Self::no_plan, Self::from_plan)
    }
}

/// A device paired with its derived status and the plan it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledDevice {
    pub device: DeviceRecord,
    pub status: StatusRecord,
    pub plan_id: Option<String>,
    pub max_deferrals: Option<i64>,
}

/// Derive a status for every registry device and count each resulting
/// `plan_status` (after sentinel substitution) in the run histogram.
pub fn reconcile(
    registry: &DeviceRegistry,
    plans: &PlanIndex,
    stats: &mut RunStatistics,
) -> Vec<ReconciledDevice> {
    let mut reconciled = Vec::with_capacity(registry.len());
    let mut without_plan = 0usize;

    for device in registry.iter() {
        let plan = plans.lookup(&device.identity);
        if plan.is_none() {
            without_plan += 1;
        }
        let status = StatusRecord::derive(plan);
        stats.record_status(&status.plan_status);

        reconciled.push(ReconciledDevice {
            device: device.clone(),
            status,
            plan_id: plan.and_then(|p| p.plan_id.clone()),
            max_deferrals: plan.and_then(|p| p.max_deferrals),
        });
    }

    debug!(
        devices = reconciled.len(),
        without_plan, "reconciliation complete"
    );
    reconciled
}
