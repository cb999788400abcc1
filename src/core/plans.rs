//! Update plans and the identity → plan index.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::identity::DeviceIdentity;

/// One software-update plan as reported upstream. Absent fields stay absent
/// here; substitution happens during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePlan {
    pub plan_id: Option<String>,
    pub device_identity: DeviceIdentity,
    pub update_action: Option<String>,
    pub version_type: Option<String>,
    pub max_deferrals: Option<i64>,
    pub status_state: Option<String>,
    pub error_reasons: Vec<String>,
    pub force_install_timestamp: Option<String>,
}

fn string_at(payload: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match payload.pointer(path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl UpdatePlan {
    /// Parse one plan item; `None` when it names no device.
    pub fn from_json(payload: &Value) -> Option<Self> {
        let device_identity = ["/device/deviceId", "/deviceId"]
            .iter()
            .find_map(|path| payload.pointer(path).and_then(DeviceIdentity::from_json))?;

        let error_reasons = payload
            .pointer("/status/errorReasons")
            .and_then(Value::as_array)
            .map(|reasons| {
                reasons
                    .iter()
                    .filter_map(|r| match r {
                        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            plan_id: string_at(payload, &["/planUuid", "/planId", "/id"]),
            device_identity,
            update_action: string_at(payload, &["/updateAction"]),
            version_type: string_at(payload, &["/versionType"]),
            max_deferrals: payload.pointer("/maxDeferrals").and_then(Value::as_i64),
            status_state: string_at(payload, &["/status/state"]),
            error_reasons,
            force_install_timestamp: string_at(
                payload,
                &["/forceInstallLocalDateTime", "/forceInstallTimestamp"],
            ),
        })
    }
}

/// Build-time counters reported for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanIndexCounts {
    pub received: usize,
    pub indexed: usize,
    pub missing_identity: usize,
    pub overwritten: usize,
}

/// At most one plan per device; later plans replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct PlanIndex {
    plans: HashMap<DeviceIdentity, UpdatePlan>,
    counts: PlanIndexCounts,
}

impl PlanIndex {
    pub fn build(raw_plans: &[Value]) -> Self {
        let mut index = Self::default();
        index.counts.received = raw_plans.len();

        for raw in raw_plans {
            let Some(plan) = UpdatePlan::from_json(raw) else {
                warn!("update plan has no device id, skipping");
                index.counts.missing_identity += 1;
                continue;
            };
            index.insert(plan);
        }

        index.counts.indexed = index.plans.len();
        debug!(
            received = index.counts.received,
            indexed = index.counts.indexed,
            overwritten = index.counts.overwritten,
            "plan index built"
        );
        index
    }

    pub fn from_plans(plans: impl IntoIterator<Item = UpdatePlan>) -> Self {
        let mut index = Self::default();
        for plan in plans {
            index.counts.received += 1;
            index.insert(plan);
        }
        index.counts.indexed = index.plans.len();
        index
    }

    fn insert(&mut self, plan: UpdatePlan) {
        if let Some(previous) = self.plans.insert(plan.device_identity.clone(), plan) {
            debug!(
                device = %previous.device_identity,
                replaced_plan = previous.plan_id.as_deref().unwrap_or("-"),
                "multiple plans for device, keeping the last"
            );
            self.counts.overwritten += 1;
        }
    }

    pub fn counts(&self) -> PlanIndexCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Exact match on the canonical identity. Both the registry and this
    /// index key by [`DeviceIdentity::from_json`], so `42` and `"42"` meet
    /// here without any fallback matching. Case is significant.
    pub fn lookup(&self, identity: &DeviceIdentity) -> Option<&UpdatePlan> {
        self.plans.get(identity)
    }
}
