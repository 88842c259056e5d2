//! Directory fetch seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::DirectoryError;

use super::snapshot::{UserRecord, parse_users};

/// Result of one directory fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The remote confirmed the held change token is current.
    NotModified,
    /// A full user list, with the token the remote sent alongside it.
    Modified {
        users: Vec<UserRecord>,
        change_token: Option<String>,
    },
}

/// Where user lists come from.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Fetch the user list. `change_token` is the token of the snapshot
    /// currently held, if any.
    async fn fetch(&self, change_token: Option<&str>) -> Result<FetchOutcome, DirectoryError>;
}

#[async_trait]
impl<T: DirectorySource + ?Sized> DirectorySource for std::sync::Arc<T> {
    async fn fetch(&self, change_token: Option<&str>) -> Result<FetchOutcome, DirectoryError> {
        (**self).fetch(change_token).await
    }
}

/// Conditional `GET` against a JSON user directory.
///
/// Sends `If-None-Match` with the held token, treats `304` as unchanged and
/// reads the new token from the `ETag` response header.
#[derive(Debug, Clone)]
pub struct HttpDirectorySource {
    client: Client,
    url: String,
}

impl HttpDirectorySource {
    /// Create a source whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DirectoryError::fetch)?;
        Ok(Self::with_client(client, url))
    }

    /// Create with a custom reqwest [`Client`].
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Directory URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DirectorySource for HttpDirectorySource {
    async fn fetch(&self, change_token: Option<&str>) -> Result<FetchOutcome, DirectoryError> {
        let mut req = self.client.get(&self.url);
        if let Some(token) = change_token.filter(|t| !t.is_empty()) {
            req = req.header(IF_NONE_MATCH, token);
        }
        let resp = req.send().await.map_err(DirectoryError::fetch)?;

        let status = resp.status();
        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        if !status.is_success() {
            return Err(DirectoryError::Status(status.as_u16()));
        }

        let etag = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned);
        if etag.is_some() && etag.as_deref() == change_token {
            debug!(url = %self.url, "directory etag unchanged");
            return Ok(FetchOutcome::NotModified);
        }

        let body = resp.bytes().await.map_err(DirectoryError::fetch)?;
        let users = parse_users(&body)?;
        Ok(FetchOutcome::Modified {
            users,
            change_token: etag,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode as AxumStatus, header};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Clone)]
    struct Directory {
        etag: &'static str,
        body: &'static str,
        status: Arc<Mutex<AxumStatus>>,
        seen_if_none_match: Arc<Mutex<Vec<Option<String>>>>,
    }

    async fn serve(State(dir): State<Directory>, headers: HeaderMap) -> Response {
        let inm = headers
            .get(header::IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        dir.seen_if_none_match.lock().push(inm.clone());

        let status = *dir.status.lock();
        if status != AxumStatus::OK {
            return status.into_response();
        }
        if inm.as_deref() == Some(dir.etag) {
            return AxumStatus::NOT_MODIFIED.into_response();
        }
        ([(header::ETAG, dir.etag)], dir.body).into_response()
    }

    async fn spawn_directory(dir: Directory) -> String {
        let app = Router::new().route("/users", get(serve)).with_state(dir);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/users")
    }

    fn directory(body: &'static str) -> Directory {
        Directory {
            etag: "\"v1\"",
            body,
            status: Arc::new(Mutex::new(AxumStatus::OK)),
            seen_if_none_match: Arc::default(),
        }
    }

    #[tokio::test]
    async fn conditional_fetch() {
        let dir = directory(r#"{"users": [{"id": 1, "uuid": "aaa"}]}"#);
        let url = spawn_directory(dir.clone()).await;
        let source = HttpDirectorySource::new(url, Duration::from_secs(5)).unwrap();

        let first = source.fetch(None).await.unwrap();
        assert_eq!(
            first,
            FetchOutcome::Modified {
                users: vec![UserRecord::new("1", "aaa")],
                change_token: Some("\"v1\"".into()),
            }
        );

        let second = source.fetch(Some("\"v1\"")).await.unwrap();
        assert_eq!(second, FetchOutcome::NotModified);

        assert_eq!(
            *dir.seen_if_none_match.lock(),
            vec![None, Some("\"v1\"".to_string())]
        );
    }

    #[tokio::test]
    async fn same_etag_on_full_response_is_unchanged() {
        // Remote ignores If-None-Match but still echoes the same ETag.
        let app = Router::new().route(
            "/users",
            get(|| async { ([(header::ETAG, "\"v1\"")], r#"[{"id": 1, "uuid": "aaa"}]"#) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let source =
            HttpDirectorySource::new(format!("http://{addr}/users"), Duration::from_secs(5))
                .unwrap();

        assert_eq!(
            source.fetch(Some("\"v1\"")).await.unwrap(),
            FetchOutcome::NotModified
        );
        assert!(matches!(
            source.fetch(Some("\"v0\"")).await.unwrap(),
            FetchOutcome::Modified { .. }
        ));
    }

    #[tokio::test]
    async fn server_error_and_bad_payload() {
        let dir = directory("not json");
        let url = spawn_directory(dir.clone()).await;
        let source = HttpDirectorySource::new(url, Duration::from_secs(5)).unwrap();

        assert!(matches!(
            source.fetch(None).await,
            Err(DirectoryError::Decode(_))
        ));

        *dir.status.lock() = AxumStatus::INTERNAL_SERVER_ERROR;
        assert!(matches!(
            source.fetch(None).await,
            Err(DirectoryError::Status(500))
        ));
    }

    #[tokio::test]
    async fn unreachable_is_fetch_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source =
            HttpDirectorySource::new(format!("http://{addr}/users"), Duration::from_secs(2))
                .unwrap();
        let err = source.fetch(None).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Fetch(_)));
        assert_eq!(err.error_type(), trojan_core::ERROR_REMOTE_FETCH);
    }
}
