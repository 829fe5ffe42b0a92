//! Error types for the margin API client.
//!
//! The error hierarchy follows the layers a request passes through:
//!
//! ```text
//! Error
//! ├── Exchange       - non-200 API errors decoded from the error envelope
//! ├── Network        - transport layer failures (via NetworkError)
//! ├── Parse          - response decoding failures (via ParseError)
//! ├── Authentication - API key / signature problems
//! ├── RateLimit      - rate limiting with optional retry hint
//! ├── InvalidRequest - invalid parameters detected locally
//! ├── OrderNotFound  - unknown order id / client order id
//! ├── InsufficientBalance
//! ├── Timeout
//! └── Context        - any of the above with an attached context message
//! ```
//!
//! Large variants are boxed to keep the enum small; string fields use
//! `Cow<'static, str>` so static messages allocate nothing.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for all margin API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum length kept from an HTTP body when embedding it in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 1024;

fn truncate_message(mut msg: String) -> String {
    if msg.len() > MAX_ERROR_MESSAGE_LEN {
        msg.truncate(MAX_ERROR_MESSAGE_LEN);
        msg.push_str("... (truncated)");
    }
    msg
}

/// Details for errors reported by the exchange itself.
///
/// Boxed inside [`Error::Exchange`] to keep the enum size small.
#[derive(Debug)]
#[non_exhaustive]
pub struct ExchangeErrorDetails {
    /// Error code as reported by the exchange (e.g. `-1121`).
    pub code: String,
    /// Descriptive message from the exchange.
    pub message: String,
    /// Raw error body, when it was parseable JSON.
    pub data: Option<serde_json::Value>,
}

impl ExchangeErrorDetails {
    /// Creates new details with the given code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Creates new details carrying the raw response body.
    pub fn with_data(
        code: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl fmt::Display for ExchangeErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}

/// Transport-layer errors, hiding `reqwest` types from the public API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NetworkError {
    /// Request failed with an HTTP status code before reaching the API layer.
    #[error("Request failed with status {status}: {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Request timed out.
    #[error("Request timeout")]
    Timeout,

    /// Connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Reading the response body failed.
    #[error("Failed to read response body: {0}")]
    BodyRead(String),

    /// Opaque transport error preserving the source for downcasts.
    #[error("Transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

/// Errors produced while decoding an exchange response.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// Failed to deserialize JSON.
    #[error("Failed to deserialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse or convert a timestamp.
    #[error("Failed to parse timestamp: {0}")]
    Timestamp(Cow<'static, str>),

    /// Missing required field in a response.
    #[error("Missing required field: {0}")]
    MissingField(Cow<'static, str>),

    /// Invalid value for a field.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field name.
        field: Cow<'static, str>,
        /// Error message.
        message: Cow<'static, str>,
    },
}

impl ParseError {
    /// Creates a `MissingField` error.
    pub fn missing_field(field: impl Into<Cow<'static, str>>) -> Self {
        Self::MissingField(field.into())
    }

    /// Creates a `Timestamp` error.
    pub fn timestamp(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Timestamp(message.into())
    }

    /// Creates an `InvalidValue` error.
    pub fn invalid_value(
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The primary error type of the crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error reported by the exchange API (non-200 response with envelope).
    #[error("Exchange error: {0}")]
    Exchange(Box<ExchangeErrorDetails>),

    /// Network-level failure.
    #[error("Network error: {0}")]
    Network(Box<NetworkError>),

    /// Authentication failure (invalid API key or signature).
    #[error("Authentication error: {0}")]
    Authentication(Cow<'static, str>),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Error message.
        message: Cow<'static, str>,
        /// Optional duration to wait before retrying.
        retry_after: Option<Duration>,
    },

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(Cow<'static, str>),

    /// Order not found on the exchange.
    #[error("Order not found: {0}")]
    OrderNotFound(Cow<'static, str>),

    /// Insufficient balance for the requested operation.
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(Cow<'static, str>),

    /// Response decoding failure.
    #[error("Parse error: {0}")]
    Parse(Box<ParseError>),

    /// Operation timeout.
    #[error("Timeout: {0}")]
    Timeout(Cow<'static, str>),

    /// Error with an attached context message, preserving the chain.
    #[error("{context}")]
    Context {
        /// What operation failed.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Creates an exchange error from a code and message.
    pub fn exchange(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Exchange(Box::new(ExchangeErrorDetails::new(code, message)))
    }

    /// Creates an exchange error carrying the raw response body.
    pub fn exchange_with_data(
        code: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self::Exchange(Box::new(ExchangeErrorDetails::with_data(
            code, message, data,
        )))
    }

    /// Creates a network error from a message.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(Box::new(NetworkError::ConnectionFailed(msg.into())))
    }

    /// Creates an authentication error.
    pub fn authentication(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Creates a rate limit error with an optional retry duration.
    pub fn rate_limit(
        message: impl Into<Cow<'static, str>>,
        retry_after: Option<Duration>,
    ) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates an order-not-found error.
    pub fn order_not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::OrderNotFound(msg.into())
    }

    /// Creates an insufficient balance error.
    pub fn insufficient_balance(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InsufficientBalance(msg.into())
    }

    /// Creates a timeout error.
    pub fn timeout(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Attaches context to an existing error.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    fn iter_chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |err| match err {
            Error::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        })
    }

    /// Returns the root cause, skipping `Context` layers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        self.iter_chain().last().unwrap_or(self)
    }

    /// Returns the exchange error details if this is (or wraps) an exchange error.
    #[must_use]
    pub fn as_exchange(&self) -> Option<&ExchangeErrorDetails> {
        match self.root_cause() {
            Error::Exchange(details) => Some(details),
            _ => None,
        }
    }

    /// Whether retrying the operation could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.root_cause() {
            Error::Network(ne) => matches!(
                ne.as_ref(),
                NetworkError::Timeout | NetworkError::ConnectionFailed(_)
            ),
            Error::RateLimit { .. } | Error::Timeout(_) => true,
            _ => false,
        }
    }

    /// Returns the retry delay of a rate limit error, penetrating `Context` layers.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self.root_cause() {
            Error::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Generates a report containing the full error chain.
    #[must_use]
    pub fn report(&self) -> String {
        use std::fmt::Write;
        let mut report = self.to_string();
        let mut current: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = current {
            let _ = write!(report, "\nCaused by: {err}");
            current = err.source();
        }
        report
    }
}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Error::Network(Box::new(e))
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(Box::new(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(Box::new(ParseError::Json(e)))
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::Timeout
        } else if e.is_connect() {
            NetworkError::ConnectionFailed(truncate_message(e.to_string()))
        } else if let Some(status) = e.status() {
            NetworkError::RequestFailed {
                status: status.as_u16(),
                message: truncate_message(e.to_string()),
            }
        } else {
            NetworkError::Transport(Box::new(e))
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(Box::new(NetworkError::from(e)))
    }
}

/// Extension trait for ergonomic error context attachment.
///
/// `context()` takes an eagerly evaluated message; `with_context()` defers
/// message construction until an error actually occurs.
pub trait ContextExt<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds lazily evaluated context to an error.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ContextExt<T, E> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| e.into().context(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.into().context(f().to_string()))
    }
}
