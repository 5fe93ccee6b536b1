//! GitHub contents API client.
//!
//! `GET {api_base}/repos/{owner}/{repo}/contents/{path}` returns a file
//! object whose `content` is the base64-encoded file body.

use std::io::Read;

use serde::Deserialize;
use serde_json::Value;

use piisync_core::config::SourceConfig;
use piisync_core::PatternRecord;

use crate::decode::decode_base64_payload;
use crate::error::{DecodeError, RetrievalError, SourceError};
use crate::PatternSource;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Error bodies are quoted in logs; keep them short.
const MAX_ERROR_BODY: u64 = 512;

#[derive(Debug, Deserialize)]
struct ContentsWire {
    #[serde(rename = "type")]
    kind: String,
    encoding: Option<String>,
    content: Option<String>,
}

/// Reads one file from a GitHub repository.
pub struct GithubContentSource {
    agent: ureq::Agent,
    url: String,
    user_agent: String,
}

impl GithubContentSource {
    pub fn new(config: &SourceConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout())
            .timeout_read(config.read_timeout())
            .build();
        Self {
            agent,
            url: contents_url(config),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn get_body(&self) -> Result<String, RetrievalError> {
        let response = self
            .agent
            .get(&self.url)
            .set("Accept", ACCEPT)
            .set("X-GitHub-Api-Version", API_VERSION)
            .set("User-Agent", &self.user_agent)
            .call();

        match response {
            Ok(response) => response.into_string().map_err(|source| RetrievalError::Body {
                url: self.url.clone(),
                source,
            }),
            Err(ureq::Error::Status(404, _)) => Err(RetrievalError::NotFound {
                url: self.url.clone(),
            }),
            Err(ureq::Error::Status(status, response)) => Err(RetrievalError::Status {
                url: self.url.clone(),
                status,
                message: error_body_message(response.into_reader()),
            }),
            Err(ureq::Error::Transport(transport)) => Err(RetrievalError::Transport {
                url: self.url.clone(),
                message: transport.to_string(),
            }),
        }
    }
}

impl PatternSource for GithubContentSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Vec<PatternRecord>, SourceError> {
        let body = self.get_body()?;
        tracing::debug!(url = %self.url, bytes = body.len(), "fetched contents response");
        parse_contents_response(&self.url, &body)
    }
}

/// The first [`MAX_ERROR_BODY`] bytes of an error response, lossily decoded.
///
/// A read failure keeps whatever arrived before it.
fn error_body_message(reader: impl Read) -> String {
    let mut bytes = Vec::new();
    if let Err(err) = reader.take(MAX_ERROR_BODY).read_to_end(&mut bytes) {
        tracing::debug!(error = %err, read = bytes.len(), "error response body truncated");
    }
    String::from_utf8_lossy(&bytes).trim().to_string()
}

/// Build the contents endpoint for the configured file.
pub fn contents_url(config: &SourceConfig) -> String {
    format!(
        "{}/repos/{}/{}/contents/{}",
        config.api_base.trim_end_matches('/'),
        config.owner,
        config.repo,
        config.path.trim_start_matches('/'),
    )
}

/// Interpret a contents-API response body and decode the file it carries.
pub fn parse_contents_response(url: &str, body: &str) -> Result<Vec<PatternRecord>, SourceError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| RetrievalError::InvalidResponse {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

    // A directory path yields an array of entries instead of a file object.
    if value.is_array() {
        return Err(RetrievalError::NotAFile {
            url: url.to_string(),
            kind: "dir".to_string(),
        }
        .into());
    }

    let wire: ContentsWire =
        serde_json::from_value(value).map_err(|err| RetrievalError::InvalidResponse {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

    if wire.kind != "file" {
        return Err(RetrievalError::NotAFile {
            url: url.to_string(),
            kind: wire.kind,
        }
        .into());
    }

    match wire.encoding.as_deref() {
        Some("base64") => {}
        other => {
            return Err(RetrievalError::UnsupportedEncoding {
                url: url.to_string(),
                encoding: other.unwrap_or("none").to_string(),
            }
            .into())
        }
    }

    let content = wire.content.ok_or(DecodeError::MissingContent)?;
    Ok(decode_base64_payload(&content)?)
}
