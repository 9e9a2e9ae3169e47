//! The Lakeshore API client.
//!
//! [`Client`] is the long-lived value shared by every resource handler. It
//! owns the HTTP transport, the [`TokenManager`] credential slot, and the
//! retry policy. Handlers never talk HTTP directly; they go through the
//! facade methods in [`crate::api`], which compose paths and delegate here.
//!
//! A single call flows through three layers in this module:
//!
//! 1. the retry loop ([`Client::request`]), which makes transient failures
//!    invisible within a bounded attempt budget;
//! 2. one authenticated attempt ([`Client::attempt`]), which attaches the
//!    bearer token, executes the exchange, and classifies the outcome;
//! 3. for collection endpoints, the cursor loop ([`Client::get_paginated`]),
//!    which concatenates pages into one logical sequence.
//!
//! Retry schedule: up to three retries (four attempts total). A 401/403
//! clears the cached token and waits `n` backoff units before retry `n`; a
//! 429 waits `n` rate-limit units. The units default to 1 s and 15 s and are
//! builder-configurable so tests can run the same schedule in milliseconds.
//! All waits are plain `tokio::time::sleep`s, so dropping the caller's
//! future cancels in-flight I/O and backoff alike.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::TokenManager;
use crate::error::Error;

/// Retries allowed per top-level call, on top of the initial attempt.
const RETRY_BUDGET: u32 = 3;

/// Default per-exchange transport deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default backoff unit after a 401/403.
const DEFAULT_AUTH_BACKOFF: Duration = Duration::from_secs(1);

/// Default backoff unit after a 429.
const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(15);

/// Outcome of a single HTTP attempt that the retry loop must inspect.
///
/// Terminal failures (404, other 4xx/5xx, transport) never reach this enum;
/// they return early as [`Error`]s.
#[derive(Debug)]
enum Attempt {
    /// Success. `None` for 204 or an empty body.
    Done(Option<Value>),
    /// The server rejected the bearer token (401/403).
    AuthStale { status: u16, body: String },
    /// The server asked us to slow down (429).
    RateLimited { status: u16, body: String },
}

/// Builder for [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    client_id: String,
    client_secret: String,
    timeout: Duration,
    auth_backoff: Duration,
    rate_limit_backoff: Duration,
}

impl ClientBuilder {
    /// Set the per-exchange transport deadline (default 30 s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the backoff unit applied after a rejected token (default 1 s).
    pub fn auth_backoff(mut self, unit: Duration) -> Self {
        self.auth_backoff = unit;
        self
    }

    /// Set the backoff unit applied after a 429 (default 15 s).
    pub fn rate_limit_backoff(mut self, unit: Duration) -> Self {
        self.rate_limit_backoff = unit;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client, Error> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let auth = TokenManager::new(
            http.clone(),
            &base_url,
            self.client_id,
            self.client_secret,
        );
        Ok(Client {
            http,
            base_url,
            auth,
            auth_backoff: self.auth_backoff,
            rate_limit_backoff: self.rate_limit_backoff,
        })
    }
}

/// An authenticated, retrying, paginating client for the Lakeshore API.
///
/// Safe to share across tasks; all operations take `&self`.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    auth: TokenManager,
    auth_backoff: Duration,
    rate_limit_backoff: Duration,
}

impl Client {
    /// Start building a client for the given endpoint and credentials.
    pub fn builder(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder {
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout: DEFAULT_TIMEOUT,
            auth_backoff: DEFAULT_AUTH_BACKOFF,
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
        }
    }

    /// Convenience constructor with default configuration.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::builder(base_url, client_id, client_secret).build()
    }

    /// The configured base URL, without a trailing separator.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one authenticated request with retry semantics.
    ///
    /// Returns the decoded JSON body, or `None` for empty (204) responses.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, Error> {
        let mut remaining = RETRY_BUDGET;
        loop {
            match self.attempt(method.clone(), path, body).await? {
                Attempt::Done(value) => return Ok(value),
                Attempt::AuthStale { status, body } => {
                    if remaining == 0 {
                        return Err(Error::remote(status, body));
                    }
                    // Let the next attempt's token check trigger a refresh;
                    // the server may consider the token expired before the
                    // local expiry instant does.
                    self.auth.invalidate().await;
                    let delay = self.auth_backoff * (RETRY_BUDGET - remaining + 1);
                    warn!(%status, path, ?delay, "bearer token rejected, retrying");
                    tokio::time::sleep(delay).await;
                }
                Attempt::RateLimited { status, body } => {
                    if remaining == 0 {
                        return Err(Error::remote(status, body));
                    }
                    let delay = self.rate_limit_backoff * (RETRY_BUDGET - remaining + 1);
                    warn!(%status, path, ?delay, "rate limited, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
            remaining -= 1;
        }
    }

    /// One authenticated exchange, classified for the retry loop.
    async fn attempt(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Attempt, Error> {
        let url = format!("{}{}", self.base_url, path);
        let bearer = self.auth.ensure_valid().await?;

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(bearer);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(%method, %url, %status, "lakeshore api exchange");

        match status.as_u16() {
            204 => Ok(Attempt::Done(None)),
            200..=299 => {
                let bytes = response.bytes().await?;
                if bytes.is_empty() {
                    Ok(Attempt::Done(None))
                } else {
                    Ok(Attempt::Done(Some(serde_json::from_slice(&bytes)?)))
                }
            }
            status_code @ (401 | 403) => Ok(Attempt::AuthStale {
                status: status_code,
                body: response.text().await?,
            }),
            404 => Err(Error::not_found(path)),
            429 => Ok(Attempt::RateLimited {
                status: 429,
                body: response.text().await?,
            }),
            status_code => Err(Error::remote(status_code, response.text().await?)),
        }
    }

    /// GET a path, returning the decoded body (`null` for empty responses).
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        Ok(self
            .request(Method::GET, path, None)
            .await?
            .unwrap_or(Value::Null))
    }

    /// POST a body to a collection path.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, Error> {
        Ok(self
            .request(Method::POST, path, Some(body))
            .await?
            .unwrap_or(Value::Null))
    }

    /// PATCH an item path.
    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, Error> {
        Ok(self
            .request(Method::PATCH, path, Some(body))
            .await?
            .unwrap_or(Value::Null))
    }

    /// DELETE an item path.
    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        self.request(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// DELETE with a request body, for endpoints that revoke by value.
    pub async fn delete_with_body(&self, path: &str, body: &Value) -> Result<(), Error> {
        self.request(Method::DELETE, path, Some(body)).await?;
        Ok(())
    }

    /// Collect every page of a collection endpoint into a single list.
    ///
    /// Follows the `nextPageToken` cursor until the server reports none.
    /// A failure on any page discards partial results.
    pub async fn get_paginated(&self, path: &str) -> Result<Vec<Value>, Error> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page_path = match &cursor {
                Some(token) => paged_path(path, token),
                None => path.to_string(),
            };
            let Some(page) = self.request(Method::GET, &page_path, None).await? else {
                break;
            };
            if let Some(result) = page.get("result").and_then(Value::as_array) {
                items.extend(result.iter().cloned());
            }
            match page.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => cursor = Some(token.to_owned()),
                _ => break,
            }
        }
        Ok(items)
    }
}

/// Append the page cursor to a path, respecting an existing query string.
fn paged_path(path: &str, token: &str) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{path}{sep}pageToken={}", urlencoding::encode(token))
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client(server: &MockServer) -> Client {
        mount_token(server).await;
        Client::builder(server.uri(), "id", "secret")
            .auth_backoff(Duration::from_millis(5))
            .rate_limit_backoff(Duration::from_millis(5))
            .build()
            .expect("client")
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth/v2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "T",
                "expires_in": 3600,
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn paged_path_uses_question_mark_for_bare_paths() {
        assert_eq!(
            paged_path("/public/api/v1/catalog", "p2"),
            "/public/api/v1/catalog?pageToken=p2"
        );
    }

    #[test]
    fn paged_path_uses_ampersand_when_query_exists() {
        assert_eq!(
            paged_path("/public/api/v1/catalog?limit=5", "p2"),
            "/public/api/v1/catalog?limit=5&pageToken=p2"
        );
    }

    #[test]
    fn paged_path_escapes_the_cursor() {
        assert_eq!(
            paged_path("/public/api/v1/catalog", "a/b=c"),
            "/public/api/v1/catalog?pageToken=a%2Fb%3Dc"
        );
    }

    #[test]
    fn builder_trims_trailing_separator() {
        let client = Client::new("https://api.example.com/", "id", "secret").expect("client");
        assert_eq!(client.base_url(), "https://api.example.com");
    }

    #[tokio::test]
    async fn http_204_returns_none_without_decoding() {
        let server = MockServer::start().await;
        let client = client(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/public/api/v1/tag/t1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client.delete("/public/api/v1/tag/t1").await.expect("delete");
    }

    #[tokio::test]
    async fn http_404_is_not_found_without_retry() {
        let server = MockServer::start().await;
        let client = client(&server).await;
        Mock::given(method("GET"))
            .and(path("/public/api/v1/role/rX"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client.get("/public/api/v1/role/rX").await.expect_err("404");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn other_4xx_is_remote_without_retry() {
        let server = MockServer::start().await;
        let client = client(&server).await;
        Mock::given(method("GET"))
            .and(path("/public/api/v1/cluster/c1"))
            .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client
            .get("/public/api/v1/cluster/c1")
            .await
            .expect_err("409");
        match err {
            Error::Remote { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body, "conflict");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }
}
