// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rate-limited, retrying client for the StatusCake REST API.
//!
//! Every call first takes a token from the shared [`RateLimiter`], then runs
//! under the [`RetryConfig`] built from the provider settings. Clones of a
//! client share the limiter, so all reconcilers built from one client are
//! throttled together.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::ProviderConfig;
use crate::error::{ErrorContext, Result, StatusCakeError};
use crate::runtime::{LoggingConfig, RateLimiter, RequestLogger, RequestMetrics, RetryConfig};

const BODY_EXCERPT_LEN: usize = 512;

/// A single HTTP call against the API, relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
        }
    }

    /// Build a `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `StatusCakeError::Decode` if the body cannot be serialized
    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self> {
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            body: Some(to_json(body)?),
        })
    }

    /// Build a `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `StatusCakeError::Decode` if the body cannot be serialized
    pub fn put<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self> {
        Ok(Self {
            method: Method::PUT,
            path: path.into(),
            body: Some(to_json(body)?),
        })
    }

    /// Non-idempotent requests whose lost response leaves the remote state unknown.
    fn is_mutation(&self) -> bool {
        self.method == Method::POST || self.method == Method::PUT
    }
}

/// Raw successful response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Decode the `{"data": ...}` envelope.
    ///
    /// # Errors
    ///
    /// Returns `StatusCakeError::Decode` if the body is not the expected shape
    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str::<Envelope<T>>(&self.body)
            .map(|envelope| envelope.data)
            .map_err(|e| decode_error(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Created {
    #[serde(deserialize_with = "string_or_number")]
    new_id: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number identifier, got {other}"
        ))),
    }
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    limiter: RateLimiter,
    retry: RetryConfig,
    logger: RequestLogger,
}

/// Client for the StatusCake API.
///
/// # Example
///
/// ```no_run
/// use statuscake_sync::config::ProviderConfig;
/// use statuscake_sync::StatusCakeClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StatusCakeClient::new(ProviderConfig::load_with_env()?)?;
/// let ids: Vec<serde_json::Value> = client.list("/uptime-locations").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StatusCakeClient {
    inner: Arc<ClientInner>,
    deadline: Option<Instant>,
}

impl std::fmt::Debug for StatusCakeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusCakeClient")
            .field("base_url", &self.inner.base_url)
            .field("rps", &self.inner.limiter.rate())
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl StatusCakeClient {
    /// Create a client from validated provider settings.
    ///
    /// # Errors
    ///
    /// Returns `StatusCakeError::Config` if the settings are invalid or the
    /// HTTP client cannot be constructed
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Self::with_logging(config, LoggingConfig::default())
    }

    /// Create a client with a custom logging configuration.
    ///
    /// # Errors
    ///
    /// Returns `StatusCakeError::Config` if the settings are invalid
    pub fn with_logging(config: ProviderConfig, logging: LoggingConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("statuscake-sync/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StatusCakeError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                api_token: config.api_token.clone(),
                limiter: RateLimiter::new(config.rps),
                retry: RetryConfig::from_provider(&config),
                logger: RequestLogger::with_config(logging),
            }),
            deadline: None,
        })
    }

    /// Return a handle whose calls give up between attempts once `deadline` passes.
    ///
    /// The handle shares the rate limiter with `self`.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            deadline: Some(deadline),
        }
    }

    /// Shorthand for `with_deadline(Instant::now() + timeout)`.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The shared limiter, for observing throttling.
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    /// Request counters.
    #[must_use]
    pub fn metrics(&self) -> &RequestMetrics {
        self.inner.logger.metrics()
    }

    /// Execute a request with throttling and retries.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` on 404, `Permanent` on other non-429 4xx responses,
    /// `Transient` once retries are exhausted, `UnknownState` if a mutation's
    /// response was lost, and `Timeout` if the deadline passed between attempts
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let start = Instant::now();
        self.inner
            .retry
            .execute(self.deadline, move |attempt| self.attempt(request, attempt, start))
            .await
    }

    /// `POST` a new resource and return the identity assigned by the API.
    ///
    /// # Errors
    ///
    /// See [`StatusCakeClient::execute`]
    pub async fn create<B: Serialize>(&self, path: &str, body: &B) -> Result<String> {
        let response = self.execute(&ApiRequest::post(path, body)?).await?;
        let created: Created = response.data()?;
        Ok(created.new_id)
    }

    /// `GET` a single resource.
    ///
    /// # Errors
    ///
    /// See [`StatusCakeClient::execute`]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(&ApiRequest::get(path)).await?.data()
    }

    /// `GET` a collection.
    ///
    /// # Errors
    ///
    /// See [`StatusCakeClient::execute`]
    pub async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        self.execute(&ApiRequest::get(path)).await?.data()
    }

    /// `PUT` changes to an existing resource.
    ///
    /// # Errors
    ///
    /// See [`StatusCakeClient::execute`]
    pub async fn update<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        self.execute(&ApiRequest::put(path, body)?).await?;
        Ok(())
    }

    /// `DELETE` a resource.
    ///
    /// # Errors
    ///
    /// See [`StatusCakeClient::execute`]
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(&ApiRequest::delete(path)).await?;
        Ok(())
    }

    async fn attempt(&self, request: &ApiRequest, attempt: u32, start: Instant) -> Result<ApiResponse> {
        let admitted = match self.deadline {
            Some(deadline) => self.inner.limiter.acquire_until(deadline).await.is_some(),
            None => {
                self.inner.limiter.acquire().await;
                true
            }
        };
        if !admitted {
            return Err(StatusCakeError::Timeout {
                context: ErrorContext::default(),
                attempts: attempt,
                elapsed: start.elapsed(),
            });
        }

        let url = format!("{}{}", self.inner.base_url, request.path);
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), &url)
            .bearer_auth(&self.inner.api_token);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let http_request = builder
            .build()
            .map_err(|e| StatusCakeError::Config(format!("Invalid request {url}: {e}")))?;

        let logger = &self.inner.logger;
        let span = logger.start(request.method.as_str(), &request.path, attempt);
        logger.log_headers(&span, http_request.headers());

        let response = match self.inner.http.execute(http_request).await {
            Ok(response) => response,
            Err(e) => {
                let error = transport_error(request, &e);
                logger.finish_error(span, None, &error);
                return Err(error);
            }
        };

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let error = transport_error(request, &e);
                logger.finish_error(span, Some(status.as_u16()), &error);
                return Err(error);
            }
        };

        match classify(status, body, retry_after) {
            Ok(response) => {
                logger.finish_success(span, response.status);
                Ok(response)
            }
            Err(error) => {
                logger.finish_error(span, Some(status.as_u16()), &error);
                Err(error)
            }
        }
    }
}

fn classify(status: StatusCode, body: String, retry_after: Option<Duration>) -> Result<ApiResponse> {
    let code = status.as_u16();
    if status.is_success() {
        return Ok(ApiResponse { status: code, body });
    }
    if status == StatusCode::NOT_FOUND {
        return Err(StatusCakeError::NotFound {
            context: ErrorContext::default(),
        });
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(StatusCakeError::Transient {
            context: ErrorContext::default(),
            status: Some(code),
            message: format!("HTTP {code}: {}", excerpt(&body)),
            attempts: 1,
            elapsed: Duration::ZERO,
            retry_after,
        });
    }
    Err(StatusCakeError::Permanent {
        context: ErrorContext::default(),
        status: code,
        body: excerpt(&body),
    })
}

fn transport_error(request: &ApiRequest, error: &reqwest::Error) -> StatusCakeError {
    if request.is_mutation() && !error.is_connect() {
        return StatusCakeError::UnknownState {
            context: ErrorContext::default(),
            message: format!("{} {}: {error}", request.method, request.path),
        };
    }
    StatusCakeError::Transient {
        context: ErrorContext::default(),
        status: None,
        message: error.to_string(),
        attempts: 1,
        elapsed: Duration::ZERO,
        retry_after: None,
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

fn to_json<B: Serialize>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| decode_error(e.to_string()))
}

fn decode_error(message: String) -> StatusCakeError {
    StatusCakeError::Decode {
        context: ErrorContext::default(),
        message,
    }
}

#[cfg(test)]
mod tests;
