//! The batch orchestrator: one reconciliation pass from fetch to sync.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::{error, info, warn};

use super::context::RunContext;
use crate::config::Config;
use crate::core::annotations::HttpAnnotationStore;
use crate::core::fetch::{Endpoint, PaginatedFetcher};
use crate::core::plans::PlanIndex;
use crate::core::reconcile::{ReconciledDevice, reconcile};
use crate::core::registry::DeviceRegistry;
use crate::core::stats::FinalStatistics;
use crate::core::sync::{SyncOptions, resolve_definitions, synchronize};
use crate::error::{ApiError, RunError};
use crate::export::write_inventory_report;
use crate::transport::ApiTransport;

/// What a run leaves behind, whether it succeeded or not.
#[derive(Debug)]
pub struct RunOutcome {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub stats: FinalStatistics,
    pub report_path: Option<PathBuf>,
    pub result: Result<(), RunError>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<(), RunError> {
        self.result
    }
}

/// Run one pass. Never panics on upstream failures; the outcome always
/// carries the statistics gathered up to the point of failure.
pub async fn execute<T: ApiTransport + ?Sized>(config: &Config, transport: &T) -> RunOutcome {
    let started_at = Local::now();
    let mut ctx = RunContext::new(config, transport);

    let result = run_stages(&mut ctx).await;
    if let Err(err) = &result {
        error!(error = %err, "run aborted");
        ctx.stats.record_error();
    }

    RunOutcome {
        started_at,
        finished_at: Local::now(),
        stats: ctx.stats.finish(),
        report_path: ctx.report_path,
        result,
    }
}

async fn run_stages<T: ApiTransport + ?Sized>(ctx: &mut RunContext<'_, T>) -> Result<(), RunError> {
    ctx.config.validate()?;

    let (full, limited) = fetch_devices(ctx).await?;
    let plans = fetch_plans(ctx).await?;

    let registry = DeviceRegistry::build(full, limited);
    ctx.stats.record_registry(&registry.counts());

    let reconciled = reconcile(&registry, &plans, &mut ctx.stats);
    info!(
        devices = reconciled.len(),
        plans = plans.len(),
        "reconciled device inventory with update plans"
    );

    // The report is written before any annotation work so it exists even
    // when definition resolution stops the run.
    let export_result = export_report(ctx, &reconciled);

    sync_annotations(ctx, &reconciled).await?;

    export_result
}

async fn fetch_devices<T: ApiTransport + ?Sized>(
    ctx: &RunContext<'_, T>,
) -> Result<(Vec<serde_json::Value>, Vec<serde_json::Value>), ApiError> {
    let endpoints = &ctx.config.endpoints;
    let fetcher = PaginatedFetcher::new(ctx.transport, ctx.page_size());

    let full = fetcher
        .fetch_all(
            &Endpoint::new("full devices", &endpoints.full_devices)
                .with_sections(&endpoints.full_device_sections),
        )
        .await?;
    info!(items = full.len(), "fetched full devices");

    let limited = if ctx.config.sync.include_limited_devices {
        let items = fetcher
            .fetch_all(
                &Endpoint::new("limited devices", &endpoints.limited_devices)
                    .with_sections(&endpoints.limited_device_sections),
            )
            .await?;
        info!(items = items.len(), "fetched limited devices");
        items
    } else {
        info!("limited devices disabled, not fetching");
        Vec::new()
    };

    Ok((full, limited))
}

/// An unavailable plan feature is not fatal: every device then reconciles
/// to "No Plan".
async fn fetch_plans<T: ApiTransport + ?Sized>(
    ctx: &mut RunContext<'_, T>,
) -> Result<PlanIndex, ApiError> {
    let fetcher = PaginatedFetcher::new(ctx.transport, ctx.page_size());
    match fetcher
        .fetch_all(&Endpoint::new("plans", &ctx.config.endpoints.plans))
        .await
    {
        Ok(items) => {
            let index = PlanIndex::build(&items);
            ctx.stats.record_plans(&index.counts());
            info!(items = items.len(), indexed = index.len(), "fetched update plans");
            Ok(index)
        }
        Err(err) if err.is_feature_unavailable() => {
            warn!(error = %err, "update plans unavailable, every device will report No Plan");
            ctx.stats.plans_available = Some(false);
            Ok(PlanIndex::default())
        }
        Err(err) => Err(err),
    }
}

fn export_report<T: ApiTransport + ?Sized>(
    ctx: &mut RunContext<'_, T>,
    reconciled: &[ReconciledDevice],
) -> Result<(), RunError> {
    let export = &ctx.config.export;
    if !export.enabled {
        info!("CSV export disabled");
        return Ok(());
    }
    match write_inventory_report(&export.resolved_output_dir(), reconciled, &Local::now()) {
        Ok(path) => {
            ctx.report_path = Some(path);
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "CSV export failed");
            Err(err.into())
        }
    }
}

async fn sync_annotations<T: ApiTransport + ?Sized>(
    ctx: &mut RunContext<'_, T>,
    reconciled: &[ReconciledDevice],
) -> Result<(), RunError> {
    let sync = &ctx.config.sync;
    if !sync.write_annotations {
        info!("annotation sync disabled");
        return Ok(());
    }

    let store = HttpAnnotationStore::new(ctx.transport, &ctx.config.endpoints, ctx.page_size());
    let definitions =
        resolve_definitions(&store, sync.create_missing_definitions, sync.dry_run).await?;
    ctx.stats.record_definitions_created(definitions.created());

    let options = SyncOptions {
        write_delay: sync.write_delay(),
        dry_run: sync.dry_run,
    };
    let report = synchronize(&store, &definitions, reconciled, options).await;
    ctx.stats.absorb_sync(&report);
    Ok(())
}
