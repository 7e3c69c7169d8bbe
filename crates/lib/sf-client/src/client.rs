//! HTTP client for the Space Frontiers search API.
//!
//! One operation per upstream capability, each taking validated parameters
//! plus the resolved [`Credential`]. Every call is bounded by the configured
//! timeout; transient failures (timeouts, connect errors, 5xx) are retried a
//! bounded number of times with linear backoff, 4xx never are.

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::Credential;
use crate::types::{
    DocumentMetadata,
    DocumentRequest,
    DocumentSnippets,
    MetadataRequest,
    ResolveRequest,
    ResolveResponse,
    SearchRequest,
    SearchResponse,
    SimpleSearchRequest,
};

pub const DEFAULT_ENDPOINT: &str = "https://api.spacefrontiers.org";

const SEARCH_PATH: &str = "/v1/search/";
const SIMPLE_SEARCH_PATH: &str = "/v1/search/simple/";
const RESOLVE_PATH: &str = "/v1/resolve/";
const DOCUMENT_SNIPPETS_PATH: &str = "/v1/documents/snippets/";
const DOCUMENT_METADATA_PATH: &str = "/v1/documents/metadata/";

/// Bounded retry schedule for transient upstream failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay; attempt `n` waits `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Configuration for [`SearchApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

/// Upstream call failures.
#[derive(Debug)]
pub enum ApiError {
    /// Non-2xx response other than an authentication rejection.
    Status { status: u16, message: String },
    /// Upstream rejected the resolved credential (401/403). Surfaced as-is,
    /// never downgraded to an unauthenticated retry.
    Authentication { status: u16, message: String },
    /// Upstream did not respond within the configured timeout.
    Timeout,
    /// Connection-level failure before a response was received.
    Transport(String),
    /// The response body did not match the expected payload shape.
    Decode(String),
}

impl ApiError {
    /// Transient failures are subject to the retry policy; everything else
    /// is surfaced immediately.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Authentication { .. } | Self::Decode(_) => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, message } => {
                write!(f, "upstream returned status {status}: {message}")
            }
            Self::Authentication { status, message } => {
                write!(f, "upstream rejected credential (status {status}): {message}")
            }
            Self::Timeout => write!(f, "upstream call timed out"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Decode(message) => write!(f, "failed to decode upstream response: {message}"),
        }
    }
}

impl Error for ApiError {}

/// The upstream operations the tool handlers dispatch to.
///
/// Handlers are generic over this trait so tests can substitute a stub
/// backend for the HTTP client.
pub trait SearchApi: Send + Sync + 'static {
    /// Semantic search over the sources named in the request.
    fn search(
        &self,
        request: SearchRequest,
        credential: &Credential,
    ) -> impl Future<Output = Result<SearchResponse, ApiError>> + Send;

    /// Simple query search over a single source.
    fn simple_search(
        &self,
        request: SimpleSearchRequest,
        credential: &Credential,
    ) -> impl Future<Output = Result<SearchResponse, ApiError>> + Send;

    /// Resolve a free-form identifier into candidate document URIs.
    fn resolve_id(
        &self,
        request: ResolveRequest,
        credential: &Credential,
    ) -> impl Future<Output = Result<ResolveResponse, ApiError>> + Send;

    /// Fetch query-filtered snippets of a document.
    fn get_document(
        &self,
        request: DocumentRequest,
        credential: &Credential,
    ) -> impl Future<Output = Result<DocumentSnippets, ApiError>> + Send;

    /// Fetch the fixed metadata record for a document.
    fn get_document_metadata(
        &self,
        request: MetadataRequest,
        credential: &Credential,
    ) -> impl Future<Output = Result<DocumentMetadata, ApiError>> + Send;
}

/// Thin typed wrapper over the upstream HTTP API.
#[derive(Debug, Clone)]
pub struct SearchApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl SearchApiClient {
    /// # Errors
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn post<B, T>(&self, path: &str, body: &B, credential: &Credential) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let retry = self.config.retry;
        let mut attempt: u32 = 1;
        loop {
            match self.execute(&url, body, credential).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < retry.max_attempts => {
                    tracing::warn!(%url, attempt, error = %err, "retrying transient upstream failure");
                    tokio::time::sleep(retry.backoff * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn execute<B, T>(&self, url: &str, body: &B, credential: &Credential) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(url).json(body);
        request = match credential {
            Credential::Bearer(token) => request.header("Authorization", format!("Bearer {token}")),
            Credential::ApiKey(key) => request.header("X-Api-Key", key),
            Credential::UserId(id) => request.header("X-User-Id", id),
            Credential::None => request,
        };
        let response = request.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            response
                .json::<T>()
                .await
                .map_err(|err| ApiError::Decode(err.to_string()))
        } else {
            let message = response.text().await.unwrap_or_default();
            if status == 401 || status == 403 {
                Err(ApiError::Authentication { status, message })
            } else {
                Err(ApiError::Status { status, message })
            }
        }
    }
}

fn map_send_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(err.to_string())
    }
}

impl SearchApi for SearchApiClient {
    async fn search(
        &self,
        request: SearchRequest,
        credential: &Credential,
    ) -> Result<SearchResponse, ApiError> {
        self.post(SEARCH_PATH, &request, credential).await
    }

    async fn simple_search(
        &self,
        request: SimpleSearchRequest,
        credential: &Credential,
    ) -> Result<SearchResponse, ApiError> {
        self.post(SIMPLE_SEARCH_PATH, &request, credential).await
    }

    async fn resolve_id(
        &self,
        request: ResolveRequest,
        credential: &Credential,
    ) -> Result<ResolveResponse, ApiError> {
        self.post(RESOLVE_PATH, &request, credential).await
    }

    async fn get_document(
        &self,
        request: DocumentRequest,
        credential: &Credential,
    ) -> Result<DocumentSnippets, ApiError> {
        self.post(DOCUMENT_SNIPPETS_PATH, &request, credential).await
    }

    async fn get_document_metadata(
        &self,
        request: MetadataRequest,
        credential: &Credential,
    ) -> Result<DocumentMetadata, ApiError> {
        self.post(DOCUMENT_METADATA_PATH, &request, credential).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ApiError::Timeout.is_transient());
        assert!(ApiError::Transport("reset".to_string()).is_transient());
        assert!(
            ApiError::Status {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !ApiError::Status {
                status: 422,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !ApiError::Authentication {
                status: 401,
                message: String::new()
            }
            .is_transient()
        );
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client =
            SearchApiClient::new(ClientConfig::new("https://api.example.org/")).unwrap();
        assert_eq!(client.url("/v1/search/"), "https://api.example.org/v1/search/");
    }
}
