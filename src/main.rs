//! solar-dash entry point: CLI wiring and config-driven service construction.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, warn};

use solar_dash::access::{
    ApiService, BroadcastSink, FanoutSink, SignalTally, StatusSink, TracingSink,
};
use solar_dash::auth::{AuthGate, GateState, GateView, SimulatedIdentity, TracingNavigator};
use solar_dash::config::DashboardConfig;
use solar_dash::io::export::export_csv;
use solar_dash::model::{ConsumptionSample, PanelStatusCounts};
use solar_dash::observability;
use solar_dash::report::SystemReport;

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<PathBuf>,
    preset: Option<String>,
    seed_override: Option<u64>,
    error_rate_override: Option<f64>,
    report: bool,
    export_csv: Option<PathBuf>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("solar-dash: solar monitoring dashboard backend (simulated)");
    eprintln!();
    eprintln!("Usage: solar-dash [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load configuration from a TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (demo, instant, flaky)");
    eprintln!("  --seed <u64>             Fix the network simulator seed");
    eprintln!("  --error-rate <f64>       Override the injected failure probability");
    eprintln!("  --report                 Print the system report");
    eprintln!("  --export-csv <path>      Write today's consumption series to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Serve the REST API instead of a one-shot session");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the demo preset is used.");
}

fn next_value<'a>(args: &'a [String], i: usize, flag: &str, expected: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("error: {flag} requires {expected}");
            process::exit(1);
        }
    }
}

fn parse_or_exit<T: std::str::FromStr>(value: &str, flag: &str, kind: &str) -> T {
    value.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{value}\" is not a valid {kind}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        preset: None,
        seed_override: None,
        error_rate_override: None,
        report: false,
        export_csv: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                let raw = next_value(&args, i, "--config", "a path argument");
                cli.config_path = Some(PathBuf::from(raw));
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(next_value(&args, i, "--preset", "a name argument").to_string());
            }
            "--seed" => {
                i += 1;
                let raw = next_value(&args, i, "--seed", "a u64 argument");
                cli.seed_override = Some(parse_or_exit(raw, "--seed", "u64"));
            }
            "--error-rate" => {
                i += 1;
                let raw = next_value(&args, i, "--error-rate", "a number argument");
                cli.error_rate_override = Some(parse_or_exit(raw, "--error-rate", "number"));
            }
            "--report" => cli.report = true,
            "--export-csv" => {
                i += 1;
                let raw = next_value(&args, i, "--export-csv", "a path argument");
                cli.export_csv = Some(PathBuf::from(raw));
            }
            #[cfg(feature = "api")]
            "--serve" => cli.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = next_value(&args, i, "--port", "a u16 argument");
                cli.port = parse_or_exit(raw, "--port", "u16");
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn load_config(cli: &CliArgs) -> DashboardConfig {
    // --config takes priority, then --preset, then demo
    let loaded = if let Some(ref path) = cli.config_path {
        DashboardConfig::from_toml_file(path)
    } else if let Some(ref name) = cli.preset {
        DashboardConfig::from_preset(name)
    } else {
        Ok(DashboardConfig::demo())
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed_override {
        config.network.seed = Some(seed);
    }
    if let Some(rate) = cli.error_rate_override {
        config.network.error_rate = rate;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

/// Waits for the identity provider to resolve and returns the gate state.
async fn resolve_gate(gate: &mut AuthGate, identity: &SimulatedIdentity) -> GateState {
    let mut sessions = identity.subscribe();
    loop {
        let status = *sessions.borrow_and_update();
        if gate.observe(status, &TracingNavigator) != GateState::Unknown {
            return gate.state();
        }
        if sessions.changed().await.is_err() {
            return gate.state();
        }
    }
}

/// One dashboard visit: load every widget concurrently and summarize.
async fn run_overview(service: &ApiService, cli: &CliArgs) -> anyhow::Result<()> {
    let (consumption, forecast, panels, impact, microgrid) = tokio::join!(
        service.get_consumption(),
        service.get_forecast(),
        service.get_panels(),
        service.get_environmental_impact(),
        service.get_microgrid_state(),
    );

    match &forecast {
        Ok(week) => info!(days = week.len(), "forecast ready"),
        Err(e) => warn!(error = %e, "forecast unavailable"),
    }
    match &microgrid {
        Ok(grid) => info!(
            status = ?grid.status,
            grid_kw = grid.grid_connection,
            areas = grid.areas.len(),
            "microgrid ready"
        ),
        Err(e) => warn!(error = %e, "microgrid unavailable"),
    }
    if let Ok(panels) = &panels {
        let counts = PanelStatusCounts::from_panels(panels);
        info!(
            optimal = counts.optimal,
            warning = counts.warning,
            critical = counts.critical,
            "panels ready"
        );
    }

    if let Some(path) = &cli.export_csv {
        let samples = consumption
            .as_ref()
            .map_err(Clone::clone)
            .context("consumption data unavailable for export")?;
        write_export(samples, path)?;
    }

    if cli.report {
        let consumption = consumption.context("report needs consumption data")?;
        let panels = panels.context("report needs panel data")?;
        let impact = impact.context("report needs environmental impact data")?;
        let microgrid = microgrid.context("report needs microgrid data")?;
        let report = SystemReport::build(&consumption, &panels, &impact, &microgrid);
        println!("{report}");
    }

    Ok(())
}

fn write_export(samples: &[ConsumptionSample], path: &Path) -> anyhow::Result<()> {
    export_csv(samples, path)
        .with_context(|| format!("failed to write CSV to {}", path.display()))?;
    info!(path = %path.display(), "consumption exported");
    Ok(())
}

#[tokio::main]
async fn main() {
    observability::init_tracing();

    let cli = parse_args();
    let config = load_config(&cli);

    let notifications = BroadcastSink::new(64);
    let sinks: Vec<Arc<dyn StatusSink>> =
        vec![Arc::new(TracingSink), Arc::new(notifications.clone())];
    let service = config.build_service(Arc::new(FanoutSink::new(sinks)));
    let identity = Arc::new(SimulatedIdentity::new());
    identity.resolve_after(
        Duration::from_millis(config.auth.resolve_after_ms),
        config.session_signed_in(),
    );
    let mut gate = AuthGate::new(config.auth.sign_in_path.clone());

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;

        let state = Arc::new(solar_dash::api::AppState::new(service, gate, identity.subscribe()));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        if let Err(e) = solar_dash::api::serve(state, addr).await {
            error!("server error: {e}");
            process::exit(1);
        }
        return;
    }

    let mut feed = notifications.subscribe();
    resolve_gate(&mut gate, &identity).await;
    let outcome = match gate.render(|| run_overview(&service, &cli)) {
        GateView::Content(visit) => visit.await,
        GateView::Redirected => {
            eprintln!("not signed in; sign in at {}", gate.sign_in_path());
            process::exit(2);
        }
        GateView::Loading => {
            eprintln!("session never resolved");
            process::exit(2);
        }
    };

    let tally = SignalTally::drain(&mut feed);
    info!(
        succeeded = tally.succeeded,
        failed = tally.failed,
        "dashboard visit finished"
    );

    if let Err(e) = outcome {
        error!("{e:#}");
        process::exit(1);
    }
}
