use std::path::PathBuf;
use std::sync::Arc;

use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use scour_core::{
    Cleanup, CleanupReport, CleanupScope, KindFilter, KindStatus, MemoryCloud, builtin_registry,
};

use super::load_config_with_warning;
use crate::table::ReportTable;

pub(crate) fn handle_run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let fixture = matches
        .get_one::<PathBuf>("fixture")
        .ok_or("Fixture argument is required")?;
    let tenant = matches.get_one::<String>("tenant").cloned();
    let json_output = matches.get_flag("json");

    // Neither flag means both identities
    let as_admin = matches.get_flag("admin");
    let as_user = matches.get_flag("user");
    let (with_admin, with_user) = if as_admin || as_user {
        (as_admin, as_user)
    } else {
        (true, true)
    };

    let mut filter = KindFilter::all().with_names(
        matches
            .get_many::<String>("service")
            .into_iter()
            .flatten()
            .cloned(),
    );
    if matches.get_flag("admin-only") {
        filter = filter.admin_required(true);
    } else if matches.get_flag("user-only") {
        filter = filter.admin_required(false);
    }

    info!(
        event = "cli.run_started",
        fixture = %fixture.display(),
        tenant = ?tenant,
        admin = with_admin,
        user = with_user
    );

    let cloud = MemoryCloud::load(fixture).inspect_err(|e| {
        error!(event = "cli.run_fixture_failed", error = %e);
    })?;

    let mut scope = CleanupScope::new();
    if let Some(tenant) = tenant {
        scope = scope.with_tenant(tenant);
    }
    if with_admin {
        scope = scope.with_admin(Arc::new(cloud.clone()));
    }
    if with_user {
        scope = scope.with_user(Arc::new(cloud.clone()));
    }

    let config = load_config_with_warning();
    let registry = builtin_registry()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!(event = "cli.run_interrupted");
                eprintln!("Interrupted, finishing in-flight deletions...");
                interrupt.cancel();
            }
        });

        Cleanup::new(registry, config)
            .run_with_cancel(scope, &filter, cancel)
            .await
    })?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    let totals = report.totals();
    info!(
        event = "cli.run_completed",
        deleted = totals.deleted,
        already_gone = totals.already_gone,
        failed = totals.failed,
        timed_out = totals.timed_out,
        cancelled = report.cancelled
    );

    if report.has_failures() {
        let failed_kinds = report
            .kinds
            .iter()
            .filter(|k| k.has_failures())
            .count();
        error!(event = "cli.run_failed", failed_kinds = failed_kinds);
        return Err(format!("Cleanup finished with failures in {} kind(s)", failed_kinds).into());
    }

    Ok(())
}

fn print_report(report: &CleanupReport) {
    let active: Vec<_> = report
        .kinds
        .iter()
        .filter(|k| k.counts.total() > 0 || k.undispatched > 0 || k.status != KindStatus::Completed)
        .collect();

    if active.is_empty() {
        println!("Nothing to clean up.");
    } else {
        ReportTable::new(&active).print_table(&active);
    }

    for kind in &report.kinds {
        for failure in kind.failures() {
            eprintln!("  {} {} ({}): {}", kind.key(), failure.id, failure.name, failure.outcome);
        }
    }

    let totals = report.totals();
    println!(
        "Deleted: {}  Already gone: {}  Failed: {}  Timed out: {}",
        totals.deleted, totals.already_gone, totals.failed, totals.timed_out
    );
    if report.cancelled {
        println!("Run was cancelled before completion.");
    }
}
