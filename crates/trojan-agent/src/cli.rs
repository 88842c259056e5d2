//! CLI entry point for the agent subcommand.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use trojan_config::{CliOverrides, LoggingConfig, load_and_validate};
use trojan_core::defaults;

use crate::error::AgentError;
use crate::runner::{AgentHandles, RunOutcome, run_with_shutdown};

/// CLI arguments for the agent subcommand.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "trojan-agent",
    version,
    about = "Node agent: traffic stats API, user directory sync and panel reporting"
)]
pub struct AgentArgs {
    /// Config file path (json/jsonc/yaml/toml)
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

/// Run the agent with the given CLI arguments.
pub async fn run(args: AgentArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_and_validate(&args.config, &args.overrides)?;

    init_tracing(&config.logging);

    info!(
        version = trojan_core::VERSION,
        config = %args.config.display(),
        "trojan agent starting"
    );

    // Set up graceful shutdown on SIGTERM/SIGINT
    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal_handler().await;
        info!("shutdown signal received");
        shutdown_signal.cancel();
    });

    match run_with_shutdown(config, AgentHandles::new(), shutdown).await? {
        RunOutcome::Shutdown => {
            info!("agent stopped");
            Ok(())
        }
        RunOutcome::Restart => Err(restart_process().into()),
    }
}

/// Replace the current process with a fresh copy started with the same
/// arguments. Only returns on failure.
#[cfg(unix)]
fn restart_process() -> AgentError {
    use std::os::unix::process::CommandExt;

    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => return e.into(),
    };
    info!(exe = %exe.display(), "re-executing agent");
    std::process::Command::new(exe)
        .args(std::env::args_os().skip(1))
        .exec()
        .into()
}

/// Spawn a fresh copy with the same arguments; the caller then exits.
#[cfg(not(unix))]
fn restart_process() -> AgentError {
    let spawned = std::env::current_exe().and_then(|exe| {
        info!(exe = %exe.display(), "restarting agent");
        std::process::Command::new(exe)
            .args(std::env::args_os().skip(1))
            .spawn()
    });
    match spawned {
        Ok(_) => std::process::exit(0),
        Err(e) => e.into(),
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Build the filter string from the base level and per-module overrides.
fn filter_directives(config: &LoggingConfig) -> String {
    let mut filter_str = config
        .level
        .as_deref()
        .unwrap_or(defaults::DEFAULT_LOG_LEVEL)
        .to_string();

    let mut modules: Vec<_> = config.filters.iter().collect();
    modules.sort();
    for (module, level) in modules {
        filter_str.push(',');
        filter_str.push_str(module);
        filter_str.push('=');
        filter_str.push_str(level);
    }
    filter_str
}

/// Initialize tracing subscriber with the given logging configuration.
///
/// Supports:
/// - `level`: Base log level (trace, debug, info, warn, error)
/// - `format`: Output format (json, pretty, compact). Default: pretty
/// - `output`: Output target (stdout, stderr). Default: stderr
/// - `filters`: Per-module log level overrides
fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(filter_directives(config))
        .unwrap_or_else(|_| EnvFilter::new(defaults::DEFAULT_LOG_LEVEL));

    let format = config.format.as_deref().unwrap_or(defaults::DEFAULT_LOG_FORMAT);
    let output = config.output.as_deref().unwrap_or(defaults::DEFAULT_LOG_OUTPUT);

    match (format, output) {
        ("json", "stdout") => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(io::stdout))
                .init();
        }
        ("json", _) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(io::stderr))
                .init();
        }
        ("compact", "stdout") => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_writer(io::stdout))
                .init();
        }
        ("compact", _) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
        (_, "stdout") => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(io::stdout))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
}
