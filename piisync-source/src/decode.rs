//! Payload decoding: base64 → UTF-8 → `{ "types": [...] }`.
//!
//! Decoding is all-or-nothing. A single malformed record rejects the whole
//! document so the store is never reconciled against a partial list.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

use piisync_core::PatternRecord;

use crate::error::DecodeError;

/// Top-level shape of the remote pattern file.
#[derive(Debug, Deserialize)]
struct PatternFile {
    types: Vec<PatternRecord>,
}

/// Decode the base64 `content` field of a contents-API file object.
///
/// GitHub wraps the encoded payload at 60 columns, so ASCII whitespace is
/// stripped before decoding.
pub fn decode_base64_payload(content: &str) -> Result<Vec<PatternRecord>, DecodeError> {
    let compact: String = content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact.as_bytes())?;
    let text = String::from_utf8(bytes)?;
    parse_pattern_document(&text)
}

/// Parse a plain-text pattern document.
pub fn parse_pattern_document(text: &str) -> Result<Vec<PatternRecord>, DecodeError> {
    let file: PatternFile = serde_json::from_str(text)?;

    let mut seen = HashSet::with_capacity(file.types.len());
    for record in &file.types {
        if !seen.insert(&record.name) {
            return Err(DecodeError::DuplicateName(record.name.clone()));
        }
    }

    Ok(file.types)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        STANDARD.encode(text.as_bytes())
    }

    #[test]
    fn decodes_wrapped_base64() {
        let doc = r#"{"types":[{"name":"email","regexPattern":"[^@]+@[^@]+","sensitive":true,"onKey":false}]}"#;
        let encoded = encode(doc);
        let (head, tail) = encoded.split_at(20);
        let wrapped = format!("{head}\n{tail}\n");

        let records = decode_base64_payload(&wrapped).expect("decode");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_str(), "email");
        assert!(records[0].sensitive);
        assert!(!records[0].on_key);
    }

    #[test]
    fn preserves_file_order() {
        let doc = r#"{"types":[
            {"name":"b","regexPattern":"b","sensitive":false,"onKey":false},
            {"name":"a","regexPattern":"a","sensitive":false,"onKey":true}
        ]}"#;
        let records = parse_pattern_document(doc).expect("parse");
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn ignores_unknown_fields() {
        let doc = r#"{"version":2,"types":[{"name":"a","regexPattern":"a","sensitive":false,"onKey":false,"note":"x"}]}"#;
        assert_eq!(parse_pattern_document(doc).expect("parse").len(), 1);
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_base64_payload("not*base64!").expect_err("must fail");
        assert!(matches!(err, DecodeError::Base64(_)), "got {err:?}");
    }

    #[test]
    fn rejects_non_utf8_payload() {
        let encoded = STANDARD.encode([0xff, 0xfe, 0xfd]);
        let err = decode_base64_payload(&encoded).expect_err("must fail");
        assert!(matches!(err, DecodeError::Utf8(_)), "got {err:?}");
    }

    #[test]
    fn rejects_duplicate_names() {
        let doc = r#"{"types":[
            {"name":"a","regexPattern":"1","sensitive":false,"onKey":false},
            {"name":"a","regexPattern":"2","sensitive":false,"onKey":false}
        ]}"#;
        match parse_pattern_document(doc) {
            Err(DecodeError::DuplicateName(name)) => assert_eq!(name.as_str(), "a"),
            other => panic!("expected DuplicateName, got {other:?}"),
        }
    }

    #[test]
    fn empty_types_is_a_valid_document() {
        let records = parse_pattern_document(r#"{"types":[]}"#).expect("parse");
        assert!(records.is_empty());
    }
}
