//! Agent runtime: spawns every configured background service and waits for
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use trojan_auth::{DirectoryAuth, DirectorySync, HttpDirectorySource};
use trojan_config::Config;
use trojan_core::TrafficLogger;
use trojan_stats::{StatsApi, StatusPusher, TrafficLedger, TrafficPusher};

use crate::error::AgentError;
use crate::reporter;
use crate::watch::ConfigWatcher;

/// State shared between the agent and the proxy it serves.
#[derive(Debug, Clone, Default)]
pub struct AgentHandles {
    /// Per-user traffic, online counts and pending kicks.
    pub ledger: Arc<TrafficLedger>,
    /// Credential lookup against the synced directory.
    pub auth: Arc<DirectoryAuth>,
}

impl AgentHandles {
    /// Create an empty ledger and an authenticator with no users.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Why the agent stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Shut down on request.
    Shutdown,
    /// The remote configuration changed; the caller should restart.
    Restart,
}

/// Run every configured service until `shutdown` is cancelled.
///
/// The config watcher cancels `shutdown` itself when it sees a change, in
/// which case [`RunOutcome::Restart`] is returned.
pub async fn run_with_shutdown(
    config: Config,
    handles: AgentHandles,
    shutdown: CancellationToken,
) -> Result<RunOutcome, AgentError> {
    let AgentHandles { ledger, auth } = handles;
    let mut tasks: Vec<(&'static str, JoinHandle<()>)> = Vec::new();

    if let Some(stats) = &config.stats {
        let listener = TcpListener::bind(&stats.listen).await?;
        info!(listen = %stats.listen, auth = stats.secret.is_some(), "stats api listening");
        let router = StatsApi::new(ledger.clone(), stats.secret.clone()).router();
        let token = shutdown.clone();
        tasks.push((
            "stats api",
            tokio::spawn(async move {
                let serve = axum::serve(listener, router)
                    .with_graceful_shutdown(async move { token.cancelled().await });
                if let Err(e) = serve.await {
                    error!(error = %e, "stats api server failed");
                }
            }),
        ));
    }

    if let Some(dir) = &config.directory {
        let source = HttpDirectorySource::new(&dir.url, Duration::from_secs(dir.timeout_secs))
            .map_err(AgentError::http)?;
        let logger: Arc<dyn TrafficLogger> = ledger.clone();
        let sync = DirectorySync::new(source, auth.clone()).with_logger(logger);
        info!(url = %dir.url, interval_secs = dir.interval_secs, "directory sync enabled");
        tasks.push((
            "directory sync",
            tokio::spawn(sync.run(Duration::from_secs(dir.interval_secs), shutdown.clone())),
        ));
    }

    let export = &config.export;
    let export_timeout = Duration::from_secs(export.timeout_secs);
    if let Some(url) = &export.traffic_url {
        let pusher = TrafficPusher::new(url, export_timeout).map_err(AgentError::http)?;
        info!(url = %url, interval_secs = export.traffic_interval_secs, "traffic export enabled");
        tasks.push((
            "traffic reporter",
            tokio::spawn(reporter::run_traffic_reporter(
                pusher,
                ledger.clone(),
                Duration::from_secs(export.traffic_interval_secs),
                shutdown.clone(),
            )),
        ));
    }
    if let Some(url) = &export.status_url {
        let pusher = StatusPusher::new(url, export_timeout).map_err(AgentError::http)?;
        info!(url = %url, interval_secs = export.status_interval_secs, "status export enabled");
        tasks.push((
            "status reporter",
            tokio::spawn(reporter::run_status_reporter(
                pusher,
                Duration::from_secs(export.status_interval_secs),
                shutdown.clone(),
            )),
        ));
    }

    let watcher = match &config.remote_config {
        Some(watch) => {
            let watcher = ConfigWatcher::new(&watch.url, Duration::from_secs(watch.timeout_secs))?;
            info!(url = %watch.url, interval_secs = watch.interval_secs, "remote config watch enabled");
            Some(tokio::spawn(
                watcher.run(Duration::from_secs(watch.interval_secs), shutdown.clone()),
            ))
        }
        None => None,
    };

    if tasks.is_empty() && watcher.is_none() {
        warn!("no services configured, waiting for shutdown");
    }

    shutdown.cancelled().await;

    let restart = match watcher {
        Some(handle) => handle.await.unwrap_or_else(|e| {
            error!(error = %e, "config watcher task panicked");
            false
        }),
        None => false,
    };

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    let joined = tokio::time::timeout(drain, async {
        for (name, handle) in tasks {
            if let Err(e) = handle.await {
                error!(task = name, error = %e, "task panicked");
            }
        }
    })
    .await;
    if joined.is_err() {
        warn!(timeout_secs = drain.as_secs(), "tasks did not stop in time");
    }

    Ok(if restart {
        RunOutcome::Restart
    } else {
        RunOutcome::Shutdown
    })
}
