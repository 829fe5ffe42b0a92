//! HTTP transport: the [`Transport`] trait the client calls through, the
//! reqwest-backed [`HttpTransport`], and the exchange error envelope decoder.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::{build_query_string, MarginAuth};
use crate::error::{Error, NetworkError, Result};

/// Default REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A raw HTTP response: status code plus unparsed body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Whether the response carries a 200 status.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// The request seam between [`MarginClient`](crate::client::MarginClient)
/// and the wire. `signed` appends an HMAC signature over the query string;
/// `authenticated` sends the API key header.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one HTTP request and returns the raw response.
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: HashMap<String, String>,
        signed: bool,
        authenticated: bool,
    ) -> Result<ApiResponse>;
}

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// API key. Required for authenticated endpoints.
    pub api_key: Option<String>,
    /// API secret. Required for signed endpoints.
    pub secret: Option<String>,
    /// Base URL of the REST endpoint.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent header value.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            secret: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

/// reqwest-backed [`Transport`] with gzip, timeouts and HMAC signing.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    auth: Option<MarginAuth>,
    base_url: String,
}

impl HttpTransport {
    /// Builds a transport from `config`.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .gzip(true)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::network(format!("failed to build HTTP client: {e}")))?;

        let auth = match (config.api_key, config.secret) {
            (Some(api_key), Some(secret)) => Some(MarginAuth::new(api_key, secret)),
            (None, None) => None,
            _ => {
                return Err(Error::authentication(
                    "api_key and secret must be provided together",
                ))
            }
        };

        Ok(Self {
            client,
            auth,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn auth(&self) -> Result<&MarginAuth> {
        self.auth
            .as_ref()
            .ok_or_else(|| Error::authentication("operation requires API credentials"))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: HashMap<String, String>,
        signed: bool,
        authenticated: bool,
    ) -> Result<ApiResponse> {
        let query = if signed {
            self.auth()?.signed_query(&params)?
        } else {
            build_query_string(&params)
        };

        let url = if query.is_empty() {
            format!("{}/{}", self.base_url, path)
        } else {
            format!("{}/{}?{}", self.base_url, path, query)
        };

        let mut headers = HeaderMap::new();
        if authenticated {
            self.auth()?.add_auth_headers(&mut headers)?;
        }

        debug!(%method, path, "sending request");

        let response = self
            .client
            .request(method, &url)
            .headers(headers)
            .send()
            .await
            .map_err(NetworkError::from)?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkError::BodyRead(e.to_string()))?
            .to_vec();

        if status != 200 {
            warn!(status, path, "request returned non-200 status");
        }

        Ok(ApiResponse { status, body })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    code: i64,
    msg: String,
}

/// Maps a non-200 response body to an [`Error`].
///
/// Known exchange error codes become the matching typed variant; anything
/// else becomes a generic exchange error. A body that is not the standard
/// `{"code", "msg"}` envelope is surfaced verbatim.
pub(crate) fn handle_error(body: &[u8]) -> Error {
    let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) else {
        let text = String::from_utf8_lossy(body).into_owned();
        return Error::exchange("unknown", text);
    };

    match envelope.code {
        -1003 => Error::rate_limit(envelope.msg, None),
        -1021 => Error::invalid_request(envelope.msg),
        -1022 => Error::authentication(envelope.msg),
        -2010 => Error::insufficient_balance(envelope.msg),
        -2013 => Error::order_not_found(envelope.msg),
        code => Error::exchange(code.to_string(), envelope.msg),
    }
}
