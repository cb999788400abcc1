//! Annotation synchronization: definition resolution, then one write per
//! full device.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::annotations::{AnnotationName, AnnotationStore, AnnotationValue};
use super::identity::DeviceIdentity;
use super::reconcile::{ReconciledDevice, StatusRecord};
use crate::error::{AnnotationWriteError, SyncError};

/// Definition ids for the five fixed annotation names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDefinitions {
    ids: BTreeMap<AnnotationName, String>,
    created: usize,
    missing: Vec<AnnotationName>,
}

impl ResolvedDefinitions {
    pub fn id(&self, name: AnnotationName) -> Option<&str> {
        self.ids.get(&name).map(String::as_str)
    }

    /// Definitions created during resolution.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Names left unresolved. Only ever non-empty in a dry run.
    pub fn missing(&self) -> &[AnnotationName] {
        &self.missing
    }

    /// Values for every resolved name, in fixed name order.
    pub fn values_for(&self, status: &StatusRecord) -> Vec<AnnotationValue> {
        AnnotationName::ALL
            .iter()
            .filter_map(|name| {
                self.id(*name).map(|id| AnnotationValue {
                    definition_id: id.to_string(),
                    value: name.value_of(status).to_string(),
                })
            })
            .collect()
    }
}

/// Look up all five definitions, creating absent ones only when allowed.
///
/// Creation is never attempted in a dry run; absent names are reported and
/// left unresolved instead of failing.
#[instrument(skip(store))]
pub async fn resolve_definitions<S: AnnotationStore + ?Sized>(
    store: &S,
    allow_create: bool,
    dry_run: bool,
) -> Result<ResolvedDefinitions, SyncError> {
    let existing = store
        .list_definitions()
        .await
        .map_err(SyncError::DefinitionList)?;

    let mut resolved = ResolvedDefinitions::default();
    for name in AnnotationName::ALL {
        let wanted = name.to_string();
        match existing.iter().find(|def| def.name == wanted) {
            Some(def) => {
                debug!(annotation = %name, id = %def.id, "definition found");
                resolved.ids.insert(name, def.id.clone());
            }
            None => resolved.missing.push(name),
        }
    }

    if resolved.missing.is_empty() {
        return Ok(resolved);
    }

    if dry_run {
        for name in &resolved.missing {
            warn!(annotation = %name, "definition missing, a real run would need it");
        }
        return Ok(resolved);
    }

    if !allow_create {
        return Err(SyncError::MissingAnnotationDefinition {
            names: resolved.missing.iter().map(ToString::to_string).collect(),
        });
    }

    for name in std::mem::take(&mut resolved.missing) {
        let def = store
            .create_definition(&name.to_string(), name.description())
            .await
            .map_err(|source| SyncError::DefinitionCreate {
                name: name.to_string(),
                source,
            })?;
        info!(annotation = %name, id = %def.id, "created annotation definition");
        resolved.ids.insert(name, def.id);
        resolved.created += 1;
    }
    Ok(resolved)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOptions {
    /// Pause between consecutive writes.
    pub write_delay: Duration,
    pub dry_run: bool,
}

#[derive(Debug)]
pub enum DeviceOutcome {
    Updated,
    SkippedUnsupportedKind,
    /// Dry run: the write was prepared but not sent.
    WouldUpdate,
    Failed(AnnotationWriteError),
}

/// Per-device outcomes of one synchronization pass, in processing order.
#[derive(Debug, Default)]
pub struct SyncReport {
    outcomes: Vec<(DeviceIdentity, DeviceOutcome)>,
}

impl SyncReport {
    fn count(&self, pred: impl Fn(&DeviceOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, DeviceOutcome::Updated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DeviceOutcome::SkippedUnsupportedKind))
    }

    pub fn would_update(&self) -> usize {
        self.count(|o| matches!(o, DeviceOutcome::WouldUpdate))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeviceOutcome::Failed(_)))
    }

    pub fn outcomes(&self) -> &[(DeviceIdentity, DeviceOutcome)] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &AnnotationWriteError> {
        self.outcomes.iter().filter_map(|(_, o)| match o {
            DeviceOutcome::Failed(err) => Some(err),
            _ => None,
        })
    }
}

/// Push each full device's status to the store, one device at a time.
///
/// Limited devices are skipped. A failed write is recorded and the batch
/// moves on; nothing here aborts the pass.
#[instrument(skip_all, fields(devices = devices.len(), dry_run = options.dry_run))]
pub async fn synchronize<S: AnnotationStore + ?Sized>(
    store: &S,
    definitions: &ResolvedDefinitions,
    devices: &[ReconciledDevice],
    options: SyncOptions,
) -> SyncReport {
    let mut report = SyncReport::default();
    let mut writes = 0usize;

    for entry in devices {
        let identity = entry.device.identity.clone();

        if !entry.device.kind.supports_annotations() {
            debug!(device = %identity, kind = %entry.device.kind, "skipping, annotations unsupported");
            report
                .outcomes
                .push((identity, DeviceOutcome::SkippedUnsupportedKind));
            continue;
        }

        let values = definitions.values_for(&entry.status);

        if options.dry_run {
            debug!(device = %identity, values = values.len(), status = %entry.status.plan_status, "dry run, not writing");
            report.outcomes.push((identity, DeviceOutcome::WouldUpdate));
            continue;
        }

        if writes > 0 && !options.write_delay.is_zero() {
            tokio::time::sleep(options.write_delay).await;
        }
        writes += 1;

        let outcome = match store.write_values(&identity, &values).await {
            Ok(()) => {
                debug!(device = %identity, status = %entry.status.plan_status, "annotations written");
                DeviceOutcome::Updated
            }
            Err(source) => {
                let err = AnnotationWriteError {
                    device: identity.to_string(),
                    source,
                };
                warn!(device = %identity, error = %err, "annotation write failed");
                DeviceOutcome::Failed(err)
            }
        };
        report.outcomes.push((identity, outcome));
    }

    info!(
        updated = report.updated(),
        skipped = report.skipped(),
        would_update = report.would_update(),
        failed = report.failed(),
        "annotation sync complete"
    );
    report
}
