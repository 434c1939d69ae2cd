// GitHub API HTTP client.
// Handles credential rotation, timeouts, retries, rate limiting, and response decoding.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{MinerError, Result};

use super::retry::{RetryPolicy, with_retry};
use super::tokens::TokenPool;
use super::types::RateLimit;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client with rotating authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    tokens: TokenPool,
    retry: RetryPolicy,
    rate_limit: Mutex<RateLimit>,
    base_url: String,
}

impl GitHubClient {
    /// Create a new GitHub client over the given credential pool.
    pub fn new(tokens: TokenPool, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("touchminer"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(MinerError::Api)?;

        Ok(Self {
            client,
            tokens,
            retry,
            rate_limit: Mutex::new(RateLimit::default()),
            base_url: GITHUB_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root (GitHub Enterprise).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the most recently observed rate limit information.
    pub fn rate_limit(&self) -> RateLimit {
        self.lock_rate_limit().clone()
    }

    /// GET an endpoint with query parameters and decode the JSON body, retrying
    /// transient failures with the next credential.
    pub async fn get_json<T, P>(&self, endpoint: &str, params: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        with_retry(&self.retry, endpoint, move |attempt| {
            self.get_json_once(endpoint, params, attempt)
        })
        .await
    }

    /// Single attempt: one credential, one request, one decode.
    async fn get_json_once<T, P>(&self, endpoint: &str, params: &P, attempt: u32) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let token = self.tokens.next_credential();
        let auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| MinerError::Configuration("token is not a valid header value".into()))?;

        debug!("GET {} (attempt {})", url, attempt);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, auth)
            .query(params)
            .send()
            .await
            .map_err(MinerError::Api)?;

        self.update_rate_limit(&response);
        let response = self.check_response(response).await?;
        let bytes = response.bytes().await.map_err(MinerError::Api)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn lock_rate_limit(&self) -> std::sync::MutexGuard<'_, RateLimit> {
        self.rate_limit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let mut rate_limit = self.lock_rate_limit();
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        let rate_limit = self.rate_limit();
        let url = response.url().to_string();

        match classify_status(status, &rate_limit, &url) {
            None => Ok(response),
            Some(StatusClass::Error(e)) => Err(e),
            Some(StatusClass::WithBody(kind)) => {
                let body = response.text().await.unwrap_or_default();
                Err(kind.with_body(status, &body))
            }
        }
    }
}

/// Status outcome that still needs the body text for its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyErrorKind {
    Transient,
    Fatal,
}

impl BodyErrorKind {
    fn with_body(self, status: StatusCode, body: &str) -> MinerError {
        let message = format!("HTTP {}: {}", status, body);
        match self {
            BodyErrorKind::Transient => MinerError::TransientFetch(message),
            BodyErrorKind::Fatal => MinerError::FatalFetch(message),
        }
    }
}

#[derive(Debug)]
pub enum StatusClass {
    Error(MinerError),
    WithBody(BodyErrorKind),
}

/// Map an HTTP status to an error class; `None` means success.
pub fn classify_status(status: StatusCode, rate_limit: &RateLimit, url: &str) -> Option<StatusClass> {
    match status {
        StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => None,
        StatusCode::UNAUTHORIZED => Some(StatusClass::Error(MinerError::Unauthorized)),
        StatusCode::NOT_FOUND => Some(StatusClass::Error(MinerError::NotFound(url.to_string()))),
        StatusCode::TOO_MANY_REQUESTS => Some(StatusClass::Error(rate_limited(rate_limit))),
        StatusCode::FORBIDDEN if rate_limit.remaining == 0 && rate_limit.limit > 0 => {
            Some(StatusClass::Error(rate_limited(rate_limit)))
        }
        StatusCode::REQUEST_TIMEOUT => Some(StatusClass::WithBody(BodyErrorKind::Transient)),
        s if s.is_server_error() => Some(StatusClass::WithBody(BodyErrorKind::Transient)),
        _ => Some(StatusClass::WithBody(BodyErrorKind::Fatal)),
    }
}

fn rate_limited(rate_limit: &RateLimit) -> MinerError {
    let reset_at = chrono::DateTime::from_timestamp(rate_limit.reset as i64, 0)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    MinerError::RateLimited { reset_at }
}
