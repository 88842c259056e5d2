//! Remote configuration change watcher.
//!
//! Polls the remote config endpoint with conditional requests and asks the
//! agent to restart when its entity tag changes.

use std::time::Duration;

use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::{Client, StatusCode};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AgentError;

/// Tracks the change token of a remote configuration document.
#[derive(Debug)]
pub struct ConfigWatcher {
    client: Client,
    url: String,
    token: Option<String>,
}

impl ConfigWatcher {
    /// Create a watcher whose requests time out after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AgentError::http)?;
        Ok(Self {
            client,
            url: url.into(),
            token: None,
        })
    }

    /// Token seen on the last successful check.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Fetch once. Returns `true` when the token differs from the one
    /// recorded earlier; the first token seen is only recorded.
    pub async fn check(&mut self) -> Result<bool, AgentError> {
        let mut req = self.client.get(&self.url);
        if let Some(token) = &self.token {
            req = req.header(IF_NONE_MATCH, token);
        }
        let resp = req.send().await.map_err(AgentError::http)?;

        let status = resp.status();
        if status == StatusCode::NOT_MODIFIED {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(AgentError::Http(format!("HTTP {}", status.as_u16())));
        }

        let Some(etag) = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
        else {
            debug!(url = %self.url, "remote config sent no etag");
            return Ok(false);
        };

        match self.token.replace(etag) {
            None => Ok(false),
            Some(previous) => Ok(self.token.as_deref() != Some(previous.as_str())),
        }
    }

    /// Poll every `interval`. Cancels `shutdown` and returns `true` once a
    /// change is seen; returns `false` if shut down for another reason.
    pub async fn run(mut self, interval: Duration, shutdown: CancellationToken) -> bool {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!("config watcher shutting down");
                    return false;
                }

                _ = ticker.tick() => {
                    match self.check().await {
                        Ok(true) => {
                            info!(url = %self.url, token = ?self.token, "remote config changed, restarting");
                            shutdown.cancel();
                            return true;
                        }
                        Ok(false) => {}
                        Err(e) => warn!(error = %e, url = %self.url, "remote config check failed"),
                    }
                }
            }
        }
    }
}
