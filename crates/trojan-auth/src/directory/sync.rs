//! Periodic directory synchronization.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use trojan_core::TrafficLogger;

use crate::error::DirectoryError;

use super::auth::DirectoryAuth;
use super::snapshot::DirectorySnapshot;
use super::source::{DirectorySource, FetchOutcome};

/// What a single poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote reported no change; the snapshot was left alone.
    Unchanged,
    /// A new snapshot was published.
    Applied {
        /// Credentials in the new snapshot.
        users: usize,
        /// User ids that were present before and are gone now.
        removed: Vec<String>,
    },
}

/// Keeps a [`DirectoryAuth`] in step with a [`DirectorySource`].
///
/// Users that disappear are reported offline through the traffic logger
/// before the new snapshot becomes visible, so sessions belonging to them
/// can be torn down while their records are still resolvable.
pub struct DirectorySync<S> {
    source: S,
    auth: Arc<DirectoryAuth>,
    logger: Option<Arc<dyn TrafficLogger>>,
    poll_lock: Mutex<()>,
}

impl<S: DirectorySource> DirectorySync<S> {
    /// Create a sync loop publishing into `auth`.
    pub fn new(source: S, auth: Arc<DirectoryAuth>) -> Self {
        Self {
            source,
            auth,
            logger: None,
            poll_lock: Mutex::new(()),
        }
    }

    /// Report removed users offline through `logger`.
    pub fn with_logger(mut self, logger: Arc<dyn TrafficLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Fetch once and apply the result.
    ///
    /// On error the current snapshot is kept. Concurrent calls are serialized.
    pub async fn poll(&self) -> Result<SyncOutcome, DirectoryError> {
        let _guard = self.poll_lock.lock().await;

        let previous = self.auth.current();
        let (users, change_token) = match self.source.fetch(previous.change_token()).await? {
            FetchOutcome::NotModified => return Ok(SyncOutcome::Unchanged),
            FetchOutcome::Modified {
                users,
                change_token,
            } => (users, change_token),
        };

        let next = DirectorySnapshot::new(users, change_token);
        let removed = next.removed_since(&previous);

        if let Some(logger) = &self.logger {
            for id in &removed {
                logger.log_online_state(id, false);
            }
        }

        let users = next.len();
        self.auth.publish(next);
        Ok(SyncOutcome::Applied { users, removed })
    }

    /// Poll every `interval` until `shutdown` is cancelled.
    ///
    /// The first poll runs immediately. Failures are logged and retried on
    /// the next tick.
    pub async fn run(self, interval: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!("directory sync shutting down");
                    return;
                }

                _ = ticker.tick() => {
                    match self.poll().await {
                        Ok(SyncOutcome::Unchanged) => debug!("directory unchanged"),
                        Ok(SyncOutcome::Applied { users, removed }) => {
                            info!(users, removed = removed.len(), "directory updated");
                        }
                        Err(e) => {
                            warn!(error = %e, kind = e.error_type(), "directory poll failed, keeping current users");
                        }
                    }
                }
            }
        }
    }
}
