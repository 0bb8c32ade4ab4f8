//! Error types for the Onyx SDK.
//!
//! Every failure is classified exactly once, at the transport boundary, into
//! one of the variants below. Sub-clients propagate these unchanged.

use thiserror::Error;

/// Errors that can occur when using the Onyx SDK.
#[derive(Error, Debug)]
pub enum OnyxError {
    /// A network or transport error occurred before an HTTP status was
    /// obtained (DNS, connection refused, timeout, TLS, body read).
    #[error("Network error: {0}")]
    Network(String),

    /// The server returned a non-2xx status other than 404.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        message: String,
    },

    /// The server answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller-supplied arguments were rejected before any request was sent.
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// A 2xx response body did not match the expected model.
    #[error("Decode error: {message}")]
    Decode {
        /// What went wrong while decoding.
        message: String,
        /// The raw body that failed to decode.
        body: String,
    },

    /// Invalid client configuration (e.g. malformed URL).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OnyxError {
    /// The HTTP status carried by this error, if the server answered at all.
    ///
    /// `NotFound` reports 404 so it can be handled alongside `Api`.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OnyxError::Api { status, .. } => Some(*status),
            OnyxError::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// The message or body text attached to an HTTP error.
    pub fn message(&self) -> Option<&str> {
        match self {
            OnyxError::Api { message, .. } | OnyxError::NotFound(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, OnyxError::NotFound(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, OnyxError::Network(_))
    }
}

impl From<reqwest::Error> for OnyxError {
    /// Keeps the whole source chain; reqwest's own message rarely names the
    /// root cause (timeout, refused, DNS).
    fn from(err: reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        OnyxError::Network(message)
    }
}

impl From<url::ParseError> for OnyxError {
    fn from(err: url::ParseError) -> Self {
        OnyxError::Config(err.to_string())
    }
}

/// Convenience type alias for SDK results.
pub type OnyxResult<T> = Result<T, OnyxError>;
