//! DER microgrid dashboard entry point: config, edits, remote calls, report.

use std::process;
use std::sync::Arc;

use der_microgrid::cli::parse_args;
use der_microgrid::config::DashboardConfig;
use der_microgrid::dashboard::Dashboard;
use der_microgrid::gateway::{Action, HttpGateway};
use der_microgrid::io::export::{export_dispatch, export_plan};
use der_microgrid::report::{ActionReport, InputSummary};
use der_microgrid::task::TaskPhase;
use der_microgrid::telemetry::init_tracing;
use tracing::info;

/// Exit code when any triggered action failed.
const EXIT_ACTION_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let mut config = match DashboardConfig::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(url) = cli.base_url.clone() {
        config.gateway.base_url = url;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    init_tracing(&config.logging);

    let gateway = match HttpGateway::new(&config.gateway) {
        Ok(gw) => gw,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    info!(base_url = %config.gateway.base_url, "remote function host");

    let mut dashboard = Dashboard::new(config.initial_snapshot(), Arc::new(gateway));
    for edit in cli.edits {
        dashboard.edit(edit);
    }

    println!("{}", InputSummary::new(dashboard.snapshot()));

    let handles: Vec<_> = cli
        .actions
        .iter()
        .map(|&action| dashboard.trigger(action))
        .collect();
    for handle in handles {
        if let Err(e) = handle.await {
            eprintln!("error: remote call task aborted: {e}");
        }
    }

    let mut any_failed = false;
    for &action in &cli.actions {
        let report = ActionReport::from_task(action, dashboard.task(action));
        any_failed |= dashboard.task(action).phase() != TaskPhase::Succeeded;
        println!("{report}");
    }

    if let Some(ref path) = cli.dispatch_out {
        let data = dashboard.task(Action::Simulate).data();
        if let Err(e) = export_dispatch(data.as_ref(), path) {
            eprintln!("error: failed to write dispatch CSV: {e}");
            process::exit(1);
        }
        eprintln!("Dispatch written to {}", path.display());
    }
    if let Some(ref path) = cli.plan_out {
        let data = dashboard.task(Action::OptimizeSchedule).data();
        if let Err(e) = export_plan(data.as_ref(), path) {
            eprintln!("error: failed to write plan CSV: {e}");
            process::exit(1);
        }
        eprintln!("Plan written to {}", path.display());
    }

    if any_failed {
        process::exit(EXIT_ACTION_FAILED);
    }
}
