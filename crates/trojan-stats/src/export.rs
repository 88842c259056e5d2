//! Periodic export of traffic totals and system status to a remote collector.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StatsError;
use crate::ledger::{TrafficEntry, TrafficLedger};
use crate::system::SystemStatus;

/// One row of the traffic payload expected by the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficPushEntry {
    /// Numeric user id.
    pub user_id: i64,
    /// Upload bytes.
    pub u: u64,
    /// Download bytes.
    pub d: u64,
}

/// Convert ledger totals into the collector payload, ordered by user id.
///
/// The collector keys users by integer id; entries whose id is not an
/// integer are left out.
pub fn build_traffic_payload(entries: &HashMap<String, TrafficEntry>) -> Vec<TrafficPushEntry> {
    let mut payload: Vec<TrafficPushEntry> = entries
        .iter()
        .filter_map(|(id, entry)| match id.parse::<i64>() {
            Ok(user_id) => Some(TrafficPushEntry {
                user_id,
                u: entry.tx,
                d: entry.rx,
            }),
            Err(_) => {
                warn!(user_id = %id, "non-numeric user id left out of traffic export");
                None
            }
        })
        .collect();
    payload.sort_by_key(|e| e.user_id);
    payload
}

fn build_client(timeout: Duration) -> Result<Client, StatsError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| StatsError::Http(format!("failed to build HTTP client: {e}")))
}

/// Send a prepared request; only a 2xx answer counts as delivered.
async fn send(request: RequestBuilder) -> Result<(), StatsError> {
    let response = request.send().await.map_err(StatsError::http)?;
    let status = response.status();
    if !status.is_success() {
        return Err(StatsError::Status(status.as_u16()));
    }
    Ok(())
}

/// Pushes ledger totals to the collector and clears what was delivered.
#[derive(Debug, Clone)]
pub struct TrafficPusher {
    client: Client,
    url: String,
}

impl TrafficPusher {
    /// Create a pusher whose requests time out after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, StatsError> {
        Ok(Self::with_client(build_client(timeout)?, url))
    }

    /// Create with a custom reqwest [`Client`].
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Export the current totals. Returns the number of users settled.
    ///
    /// Delivery is at-least-once: if the collector applies a push but the
    /// answer is lost, the same totals are sent again next time.
    pub async fn push(&self, ledger: &TrafficLedger) -> Result<usize, StatsError> {
        ledger
            .export_and_clear(|entries| {
                let payload = build_traffic_payload(entries);
                let request = (!payload.is_empty())
                    .then(|| self.client.post(&self.url).json(&payload));
                async move {
                    match request {
                        Some(request) => send(request).await,
                        None => Ok(()),
                    }
                }
            })
            .await
    }

    /// Get the collector URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Pushes [`SystemStatus`] samples to the collector.
#[derive(Debug, Clone)]
pub struct StatusPusher {
    client: Client,
    url: String,
}

impl StatusPusher {
    /// Create a pusher whose requests time out after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, StatsError> {
        Ok(Self::with_client(build_client(timeout)?, url))
    }

    /// Create with a custom reqwest [`Client`].
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Send one status sample.
    pub async fn push(&self, status: &SystemStatus) -> Result<(), StatsError> {
        debug!(url = %self.url, cpu = %status.cpu, mem = %status.mem, "pushing system status");
        send(self.client.post(&self.url).json(status)).await
    }

    /// Get the collector URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::Router;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Clone, Default)]
    struct Sink {
        bodies: Arc<Mutex<Vec<serde_json::Value>>>,
        status: Arc<Mutex<u16>>,
    }

    async fn collect(
        State(sink): State<Sink>,
        axum::Json(body): axum::Json<serde_json::Value>,
    ) -> StatusCode {
        sink.bodies.lock().push(body);
        StatusCode::from_u16(*sink.status.lock()).unwrap()
    }

    async fn spawn_sink(status: u16) -> (SocketAddr, Sink) {
        let sink = Sink::default();
        *sink.status.lock() = status;
        let app = Router::new()
            .route("/push", post(collect))
            .with_state(sink.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, sink)
    }

    #[test]
    fn payload_skips_non_numeric_ids() {
        let mut entries = HashMap::new();
        entries.insert("42".to_string(), TrafficEntry::new(10, 20));
        entries.insert("7".to_string(), TrafficEntry::new(1, 2));
        entries.insert("alice".to_string(), TrafficEntry::new(5, 5));

        let payload = build_traffic_payload(&entries);
        assert_eq!(
            payload,
            vec![
                TrafficPushEntry { user_id: 7, u: 1, d: 2 },
                TrafficPushEntry { user_id: 42, u: 10, d: 20 },
            ]
        );
        assert_eq!(
            serde_json::to_value(&payload[0]).unwrap(),
            serde_json::json!({"user_id": 7, "u": 1, "d": 2})
        );
    }

    #[tokio::test]
    async fn push_clears_on_success() {
        let (addr, sink) = spawn_sink(200).await;
        let pusher = TrafficPusher::new(format!("http://{addr}/push"), Duration::from_secs(5)).unwrap();

        let ledger = TrafficLedger::new();
        ledger.record_traffic("1", 100, 200);

        assert_eq!(pusher.push(&ledger).await.unwrap(), 1);
        assert!(ledger.is_empty());
        assert_eq!(
            sink.bodies.lock().as_slice(),
            &[serde_json::json!([{"user_id": 1, "u": 100, "d": 200}])]
        );

        // Nothing to send: no request is made.
        assert_eq!(pusher.push(&ledger).await.unwrap(), 0);
        assert_eq!(sink.bodies.lock().len(), 1);
    }

    #[tokio::test]
    async fn push_keeps_totals_on_rejection() {
        let (addr, sink) = spawn_sink(500).await;
        let pusher = TrafficPusher::new(format!("http://{addr}/push"), Duration::from_secs(5)).unwrap();

        let ledger = TrafficLedger::new();
        ledger.record_traffic("1", 100, 200);
        let before = ledger.snapshot(false);

        let err = pusher.push(&ledger).await.unwrap_err();
        assert!(matches!(err, StatsError::Status(500)));
        assert_eq!(ledger.snapshot(false), before);

        *sink.status.lock() = 204;
        assert_eq!(pusher.push(&ledger).await.unwrap(), 1);
        assert!(ledger.is_empty());
        assert_eq!(sink.bodies.lock().len(), 2);
    }

    #[tokio::test]
    async fn push_keeps_totals_when_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let pusher = TrafficPusher::new(format!("http://{addr}/push"), Duration::from_secs(2)).unwrap();
        let ledger = TrafficLedger::new();
        ledger.record_traffic("1", 1, 1);

        let err = pusher.push(&ledger).await.unwrap_err();
        assert!(matches!(err, StatsError::Http(_)));
        assert!(!ledger.is_empty());
    }

    #[tokio::test]
    async fn status_push() {
        let (addr, sink) = spawn_sink(200).await;
        let pusher = StatusPusher::new(format!("http://{addr}/push"), Duration::from_secs(5)).unwrap();

        let status = SystemStatus {
            cpu: "12%".into(),
            mem: "40%".into(),
            disk: "71%".into(),
            uptime: 3600,
        };
        pusher.push(&status).await.unwrap();
        assert_eq!(
            sink.bodies.lock()[0],
            serde_json::json!({"cpu": "12%", "mem": "40%", "disk": "71%", "uptime": 3600})
        );
    }
}
