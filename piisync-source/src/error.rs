//! Error types for piisync-source.

use thiserror::Error;

use piisync_core::PatternName;

/// The remote file could not be retrieved.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// DNS, connect, TLS or timeout failure.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The repository or file path does not exist.
    #[error("remote file not found at {url}")]
    NotFound { url: String },

    /// Any other non-success HTTP status (rate limiting, server errors, ...).
    #[error("remote returned HTTP {status} for {url}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    /// The response body could not be read.
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The response envelope is not the JSON object the contents API returns.
    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    /// The path resolved to something other than a file (e.g. a directory).
    #[error("{url} is a {kind}, not a file")]
    NotAFile { url: String, kind: String },

    /// The API did not inline the content as base64 (files over 1 MB).
    #[error("unsupported content encoding '{encoding}' for {url}")]
    UnsupportedEncoding { url: String, encoding: String },
}

/// The retrieved payload is not a valid pattern document.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid JSON, missing `types`, or a record missing a required field.
    #[error("payload does not match the pattern file shape: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file object carries no content")]
    MissingContent,

    #[error("pattern name '{0}' appears more than once")]
    DuplicateName(PatternName),
}

/// Everything that can go wrong while producing the pattern list.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}
