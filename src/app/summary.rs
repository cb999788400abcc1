use std::fmt::Write as _;

use super::run::RunOutcome;

fn availability(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "not checked",
    }
}

/// Human-readable run summary, printed to stdout at the end of every run.
pub fn render_summary(outcome: &RunOutcome) -> String {
    let stats = &outcome.stats;
    let elapsed = outcome.finished_at - outcome.started_at;
    #[allow(clippy::cast_precision_loss)]
    let seconds = elapsed.num_milliseconds() as f64 / 1000.0;

    let mut lines = vec![
        format!("◆ planwatch {}", env!("CARGO_PKG_VERSION")),
        String::new(),
        format!(
            "Started      {}",
            outcome.started_at.format("%Y-%m-%d %H:%M:%S")
        ),
        format!(
            "Finished     {}",
            outcome.finished_at.format("%Y-%m-%d %H:%M:%S")
        ),
        format!("Duration     {seconds:.1}s"),
        format!(
            "Result       {}",
            match &outcome.result {
                Ok(()) => "success".to_string(),
                Err(err) => format!("failed: {err}"),
            }
        ),
        String::new(),
        format!("  Devices processed    {}", stats.devices_processed),
        format!("   full                {}", stats.full_devices),
        format!("   limited             {}", stats.limited_devices),
    ];

    if stats.devices_missing_identity > 0 || stats.identity_collisions > 0 {
        lines.push(format!(
            "   dropped             {} without id, {} duplicate",
            stats.devices_missing_identity, stats.identity_collisions
        ));
    }

    lines.push(format!(
        "  Plans available      {}",
        availability(stats.plans_available)
    ));
    if stats.plans_available == Some(true) {
        lines.push(format!(
            "   fetched / indexed   {} / {}",
            stats.plans_fetched, stats.plans_indexed
        ));
        if stats.plans_missing_identity > 0 || stats.plans_overwritten > 0 {
            lines.push(format!(
                "   dropped             {} without device, {} superseded",
                stats.plans_missing_identity, stats.plans_overwritten
            ));
        }
    }

    lines.push(format!("  Annotations updated  {}", stats.devices_updated));
    if stats.devices_would_update > 0 {
        lines.push(format!(
            "   would update        {} (dry run)",
            stats.devices_would_update
        ));
    }
    lines.push(format!("   skipped (limited)   {}", stats.devices_skipped));
    lines.push(format!(
        "   definitions created {}",
        stats.definitions_created
    ));
    lines.push(format!("  Errors               {}", stats.errors));

    if let Some(path) = &outcome.report_path {
        lines.push(format!("  Report               {}", path.display()));
    }

    let histogram = stats.histogram_by_count();
    if !histogram.is_empty() {
        lines.push(String::new());
        lines.push("Plan status".to_string());
        let width = histogram.iter().map(|(s, _)| s.len()).max().unwrap_or(0);
        for (status, count) in histogram {
            lines.push(format!("  {status:<width$}  {count}"));
        }
    }

    let mut out = String::new();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    out
}
