//! Admin HTTP API over the traffic ledger.
//!
//! Routes:
//! - `GET /`: static page identifying the service
//! - `GET /traffic?clear=<bool>`: per-user totals, optionally cleared atomically
//! - `POST /kick`: JSON array of user ids to disconnect
//! - `GET /online`: per-user online session counts
//!
//! When a secret is configured every route requires the raw secret in the
//! `Authorization` header.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{Html, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::ledger::{TrafficEntry, TrafficLedger};

const INDEX_HTML: &str = r#"<!DOCTYPE html><html lang="en"><head><meta charset="UTF-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"><title>Traffic Stats API Server</title><style>body{font-family:Arial,sans-serif;display:flex;justify-content:center;align-items:center;height:100vh;margin:0;padding:0;background-color:#f4f4f4}.container{padding:20px;background-color:#fff;box-shadow:0 4px 6px rgba(0,0,0,.1);border-radius:5px}</style></head><body><div class="container"><p>This is a traffic stats API server.</p><p>Check the documentation for usage.</p></div></body></html>"#;

/// Request/response boundary over a shared [`TrafficLedger`].
///
/// Holds no state of its own; cloning is cheap.
#[derive(Debug, Clone)]
pub struct StatsApi {
    ledger: Arc<TrafficLedger>,
    secret: Option<Arc<str>>,
}

impl StatsApi {
    /// Create the API. An empty or absent `secret` disables the check.
    pub fn new(ledger: Arc<TrafficLedger>, secret: Option<String>) -> Self {
        Self {
            ledger,
            secret: secret.filter(|s| !s.is_empty()).map(Into::into),
        }
    }

    /// Check the caller-supplied credential against the configured secret.
    pub fn authorize(&self, provided: Option<&str>) -> Result<(), ApiError> {
        match &self.secret {
            None => Ok(()),
            Some(expected) if secret_matches(provided, expected) => Ok(()),
            Some(_) => Err(ApiError::Unauthorized),
        }
    }

    /// Current per-user totals; cleared in the same critical section when `clear`.
    pub fn traffic(&self, clear: bool) -> HashMap<String, TrafficEntry> {
        self.ledger.snapshot(clear)
    }

    /// Current per-user online session counts.
    pub fn online(&self) -> HashMap<String, i64> {
        self.ledger.online_snapshot()
    }

    /// Parse a JSON array of user ids and mark each one for kicking.
    ///
    /// Returns how many ids were submitted.
    pub fn kick(&self, body: &[u8]) -> Result<usize, ApiError> {
        let ids: Vec<String> = serde_json::from_slice(body)
            .map_err(|e| ApiError::MalformedRequest(e.to_string()))?;
        let count = ids.len();
        self.ledger.kick_many(ids);
        Ok(count)
    }

    /// Build the axum router serving this API.
    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(handle_index))
            .route("/traffic", get(handle_traffic))
            .route("/kick", post(handle_kick))
            .route("/online", get(handle_online))
            .layer(middleware::from_fn_with_state(self.clone(), require_secret))
            .with_state(self)
    }
}

/// Constant-time comparison so the secret can't be guessed byte by byte.
fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    let max_len = left.len().max(right.len());
    let mut diff = left.len() ^ right.len();

    for i in 0..max_len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        diff |= usize::from(l ^ r);
    }

    diff == 0
}

fn secret_matches(provided: Option<&str>, expected: &str) -> bool {
    provided.is_some_and(|candidate| constant_time_eq(candidate.as_bytes(), expected.as_bytes()))
}

/// Boolean parsing compatible with the `clear` flag existing clients send.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`; anything
/// else is treated as false.
fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "TRUE" | "true" | "True")
}

async fn require_secret(
    State(api): State<StatsApi>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = api.authorize(provided) {
        debug!(path = %request.uri().path(), kind = e.error_type(), "rejected stats api request");
        return Err(e);
    }
    Ok(next.run(request).await)
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Deserialize)]
struct TrafficQuery {
    clear: Option<String>,
}

async fn handle_traffic(
    State(api): State<StatsApi>,
    Query(q): Query<TrafficQuery>,
) -> Json<HashMap<String, TrafficEntry>> {
    let clear = q.clear.as_deref().is_some_and(parse_bool);
    Json(api.traffic(clear))
}

async fn handle_online(State(api): State<StatsApi>) -> Json<HashMap<String, i64>> {
    Json(api.online())
}

async fn handle_kick(State(api): State<StatsApi>, body: Bytes) -> Result<StatusCode, ApiError> {
    let count = api.kick(&body)?;
    info!(count, "users marked for kick");
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn parse_bool_accepts_go_spellings() {
        for v in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["0", "f", "false", "yes", "", "tRuE"] {
            assert!(!parse_bool(v), "{v}");
        }
    }

    #[test]
    fn authorize_without_secret() {
        let api = StatsApi::new(Arc::new(TrafficLedger::new()), None);
        assert!(api.authorize(None).is_ok());

        let api = StatsApi::new(Arc::new(TrafficLedger::new()), Some(String::new()));
        assert!(api.authorize(Some("anything")).is_ok());
    }

    #[test]
    fn authorize_with_secret() {
        let api = StatsApi::new(Arc::new(TrafficLedger::new()), Some("s3cret".into()));
        assert!(api.authorize(Some("s3cret")).is_ok());
        assert!(matches!(api.authorize(None), Err(ApiError::Unauthorized)));
        assert!(matches!(api.authorize(Some("s3cre")), Err(ApiError::Unauthorized)));
        assert!(matches!(api.authorize(Some("s3cret!")), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn kick_rejects_bad_json() {
        let api = StatsApi::new(Arc::new(TrafficLedger::new()), None);
        assert!(matches!(api.kick(b"{\"id\": 1}"), Err(ApiError::MalformedRequest(_))));
        assert!(matches!(api.kick(b"not json"), Err(ApiError::MalformedRequest(_))));
    }

    #[tokio::test]
    async fn traffic_read_and_clear() {
        let ledger = Arc::new(TrafficLedger::new());
        ledger.record_traffic("u1", 100, 50);
        ledger.record_traffic("u1", 10, 5);
        let router = StatsApi::new(ledger.clone(), None).router();

        let (status, body) = call(&router, get("/traffic")).await;
        assert_eq!(status, StatusCode::OK);
        let totals: HashMap<String, TrafficEntry> = serde_json::from_slice(&body).unwrap();
        assert_eq!(totals["u1"], TrafficEntry::new(110, 55));
        assert!(!ledger.is_empty());

        let (_, body) = call(&router, get("/traffic?clear=1")).await;
        let totals: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(totals, serde_json::json!({"u1": {"tx": 110, "rx": 55}}));
        assert!(ledger.is_empty());

        let (_, body) = call(&router, get("/traffic")).await;
        assert_eq!(&body[..], b"{}");
    }

    #[tokio::test]
    async fn kick_endpoint() {
        let ledger = Arc::new(TrafficLedger::new());
        let router = StatsApi::new(ledger.clone(), None).router();

        let request = Request::builder()
            .method("POST")
            .uri("/kick")
            .body(Body::from(r#"["u1", "u2"]"#))
            .unwrap();
        let (status, _) = call(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(ledger.is_kicked("u1"));
        assert!(ledger.is_kicked("u2"));

        let request = Request::builder()
            .method("POST")
            .uri("/kick")
            .body(Body::from("[1,"))
            .unwrap();
        let (status, _) = call(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn online_endpoint() {
        let ledger = Arc::new(TrafficLedger::new());
        ledger.set_online("u1", true);
        ledger.set_online("u1", true);
        let router = StatsApi::new(ledger, None).router();

        let (status, body) = call(&router, get("/online")).await;
        assert_eq!(status, StatusCode::OK);
        let online: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(online, serde_json::json!({"u1": 2}));
    }

    #[tokio::test]
    async fn secret_guards_every_route() {
        let ledger = Arc::new(TrafficLedger::new());
        ledger.record_traffic("u1", 1, 1);
        let router = StatsApi::new(ledger.clone(), Some("s3cret".into())).router();

        for uri in ["/", "/traffic?clear=true", "/online"] {
            let (status, body) = call(&router, get(uri)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(&body[..], b"unauthorized");
        }
        assert!(!ledger.is_empty());

        let request = Request::builder()
            .uri("/traffic")
            .header("Authorization", "s3cret")
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(&router, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn index_page() {
        let router = StatsApi::new(Arc::new(TrafficLedger::new()), None).router();
        let (status, body) = call(&router, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(std::str::from_utf8(&body).unwrap().contains("traffic stats API"));
    }
}
