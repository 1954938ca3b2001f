//! Session cookie → `Identity` via the external session-state service.
//!
//! One GET per call, no retries. The HTTP client is built once and shared by
//! every request (at most one idle connection is kept per host).
//!
//! Cancellation: the returned future owns the in-flight request. When the
//! inbound request is dropped (client went away, outer timeout fired), this
//! future is dropped with it and the outbound call is aborted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::services::session::types::{Identity, SessionCookie};

/// Hard limit for a single validation call, measured from call start.
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_millis(5000);

const IDLE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Why a session could not be validated.
///
/// Callers treat every variant the same way ("validation failed"); the variant
/// only exists for logging.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("session service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("session service did not answer within the deadline")]
    Timeout,

    #[error("session service answered with status {0}")]
    Status(u16),

    #[error("session service body is not a valid identity: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid session cookie: {0}")]
    InvalidCookie(&'static str),
}

impl ValidationError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e)
        }
    }

    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
            Self::Status(_) => "status",
            Self::Decode(_) => "decode",
            Self::InvalidCookie(_) => "invalid_cookie",
        }
    }
}

/// Resolves a session cookie into an identity.
///
/// Implementations must be cheap to share (`Arc<dyn SessionValidator>`).
#[async_trait]
pub trait SessionValidator: Send + Sync + 'static {
    async fn validate(&self, cookie: &SessionCookie) -> Result<Identity, ValidationError>;
}

/// `reqwest`-backed validator talking to `SESSION_STATE_API`.
#[derive(Clone, Debug)]
pub struct HttpSessionValidator {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSessionValidator {
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, DEFAULT_VALIDATION_TIMEOUT)
    }

    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(1)
            .pool_idle_timeout(IDLE_CONNECTION_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SessionValidator for HttpSessionValidator {
    async fn validate(&self, cookie: &SessionCookie) -> Result<Identity, ValidationError> {
        let cookie_header = HeaderValue::from_str(&cookie.to_header_pair())
            .map_err(|_| ValidationError::InvalidCookie("not a valid header value"))?;

        let res = self
            .client
            .get(self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .header(COOKIE, cookie_header)
            .send()
            .await
            .map_err(ValidationError::from_reqwest)?;

        let status = res.status();
        if !status.is_success() {
            return Err(ValidationError::Status(status.as_u16()));
        }

        // Read the whole body under the same client deadline, then decode.
        let body = res.bytes().await.map_err(ValidationError::from_reqwest)?;
        let identity = serde_json::from_slice::<Identity>(&body)?;

        Ok(identity)
    }
}
