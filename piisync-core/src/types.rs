//! Domain types for the PII pattern table.
//!
//! A pattern's identity is its [`PatternName`]; every other field is payload
//! that may be replaced wholesale. Wire names follow the remote file
//! (`regexPattern`, `onKey`), Rust names are snake_case.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The unique key of a pattern, stable across sync cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternName(pub String);

impl PatternName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatternName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PatternName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PatternName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One detection pattern as published in the remote pattern file.
///
/// All four fields are required on the wire; a missing field fails
/// deserialization rather than defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRecord {
    pub name: PatternName,
    pub regex_pattern: String,
    pub sensitive: bool,
    pub on_key: bool,
}

impl PatternRecord {
    pub fn new(
        name: impl Into<PatternName>,
        regex_pattern: impl Into<String>,
        sensitive: bool,
        on_key: bool,
    ) -> Self {
        Self {
            name: name.into(),
            regex_pattern: regex_pattern.into(),
            sensitive,
            on_key,
        }
    }

    /// `true` when every non-key field matches `other`.
    pub fn same_payload(&self, other: &PatternRecord) -> bool {
        self.regex_pattern == other.regex_pattern
            && self.sensitive == other.sensitive
            && self.on_key == other.on_key
    }
}

/// A [`PatternRecord`] as persisted, carrying the store-assigned row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPattern {
    pub id: i64,
    pub record: PatternRecord,
}

impl StoredPattern {
    pub fn name(&self) -> &PatternName {
        &self.record.name
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(PatternName::from("email").to_string(), "email");
        assert_eq!(PatternName::from(String::from("ssn")).as_str(), "ssn");
    }

    #[test]
    fn record_uses_wire_field_names() {
        let record = PatternRecord::new("phone", r"\d{10}", true, false);
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["name"], "phone");
        assert_eq!(json["regexPattern"], r"\d{10}");
        assert_eq!(json["sensitive"], true);
        assert_eq!(json["onKey"], false);
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = serde_json::from_str::<PatternRecord>(
            r#"{"name":"email","regexPattern":".+@.+","sensitive":true}"#,
        )
        .expect_err("onKey is required");
        assert!(err.to_string().contains("onKey"), "error was: {err}");
    }

    #[test]
    fn same_payload_ignores_name() {
        let a = PatternRecord::new("a", "x", true, true);
        let b = PatternRecord::new("b", "x", true, true);
        let c = PatternRecord::new("a", "y", true, true);
        assert!(a.same_payload(&b));
        assert!(!a.same_payload(&c));
    }
}
