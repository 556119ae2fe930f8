//! Error types for the catalog API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers distinguish "the
//! record does not exist" from "the server returned an unexpected status".
//! Product deletion reports both 400 and 404 as `InvalidOrNotFound`, which
//! is the failure the console shows when a stale product is deleted. All
//! other non-2xx responses land in `HttpError` with the raw status code and
//! body for debugging.

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure or timeout; no response was received.
    Transport,
    /// The server rejected the request (4xx, or an unexpected success code).
    Client,
    /// The server failed (5xx).
    Server,
    /// The response payload did not match the envelope contract.
    Decode,
    /// The request payload could not be encoded.
    Encode,
}

/// Errors returned by `CatalogClient` parse methods and `CatalogApi`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server returned 404 for the requested record.
    #[error("resource not found")]
    NotFound,

    /// Deleting a product returned 400 or 404.
    #[error("Invalid product ID or product not found")]
    InvalidOrNotFound,

    /// The server returned a non-2xx status not covered above.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// A 2xx status other than the one the operation requires.
    #[error("unexpected status {status}, expected {expected}")]
    UnexpectedStatus { status: u16, expected: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// A create or update response carried an empty `value` array.
    #[error("response envelope contained no records")]
    EmptyEnvelope,

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::NotFound
            | ApiError::InvalidOrNotFound
            | ApiError::UnexpectedStatus { .. } => ErrorKind::Client,
            ApiError::HttpError { status, .. } if *status >= 500 => ErrorKind::Server,
            ApiError::HttpError { .. } => ErrorKind::Client,
            ApiError::DeserializationError(_) | ApiError::EmptyEnvelope => ErrorKind::Decode,
            ApiError::SerializationError(_) => ErrorKind::Encode,
        }
    }
}
