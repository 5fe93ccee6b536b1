//! Fixed-payload source.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use piisync_core::PatternRecord;

use crate::decode::decode_base64_payload;
use crate::error::{RetrievalError, SourceError};
use crate::PatternSource;

/// A [`PatternSource`] that always answers the same way.
#[derive(Debug, Clone)]
pub enum StaticSource {
    /// Already-decoded records.
    Records(Vec<PatternRecord>),
    /// A base64 payload, decoded on every fetch like a contents response.
    Encoded(String),
    /// Every fetch fails with a transport error carrying this message.
    Unreachable(String),
}

impl StaticSource {
    /// Wrap a plain-text document as an [`StaticSource::Encoded`] payload.
    pub fn from_document(text: &str) -> Self {
        Self::Encoded(STANDARD.encode(text.as_bytes()))
    }
}

impl PatternSource for StaticSource {
    fn describe(&self) -> String {
        match self {
            Self::Records(records) => format!("static ({} records)", records.len()),
            Self::Encoded(_) => "static (encoded)".to_string(),
            Self::Unreachable(_) => "static (unreachable)".to_string(),
        }
    }

    fn fetch(&self) -> Result<Vec<PatternRecord>, SourceError> {
        match self {
            Self::Records(records) => Ok(records.clone()),
            Self::Encoded(content) => Ok(decode_base64_payload(content)?),
            Self::Unreachable(message) => Err(RetrievalError::Transport {
                url: "static://unreachable".to_string(),
                message: message.clone(),
            }
            .into()),
        }
    }
}
