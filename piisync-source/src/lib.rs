//! # piisync-source
//!
//! Retrieval and decoding of the remote pattern file.
//!
//! [`PatternSource`] is the seam the sync pipeline fetches through.
//! [`GithubContentSource`] reads the file from the GitHub contents API;
//! [`StaticSource`] serves a fixed payload for tests and local runs.

pub mod decode;
pub mod error;
pub mod github;
pub mod static_source;

use piisync_core::PatternRecord;

pub use decode::{decode_base64_payload, parse_pattern_document};
pub use error::{DecodeError, RetrievalError, SourceError};
pub use github::GithubContentSource;
pub use static_source::StaticSource;

/// Anything that can produce the current pattern list.
///
/// Implementations perform no side effects beyond reading their source.
pub trait PatternSource {
    /// Human-readable location used in log lines.
    fn describe(&self) -> String;

    /// Fetch and decode the full pattern list, in file order.
    fn fetch(&self) -> Result<Vec<PatternRecord>, SourceError>;
}

impl<T: PatternSource + ?Sized> PatternSource for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch(&self) -> Result<Vec<PatternRecord>, SourceError> {
        (**self).fetch()
    }
}
