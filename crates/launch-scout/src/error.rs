// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Errors that abort a scan.
//!
//! A missing or empty target section is not an error; see
//! [`crate::outcome::ExtractionOutcome`].

/// Kind string reported for deadline expiry.
pub const TIMEOUT_KIND: &str = "TimeoutError";

/// Kind string reported for every other failure.
pub const SERVER_ERROR_KIND: &str = "ServerError";

/// All errors that can abort a reveal/extract run.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("navigation timed out after {deadline_ms}ms")]
    NavigationTimeout { deadline_ms: u64 },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    #[error("unexpected script result: {0}")]
    UnexpectedPayload(String),

    #[error("document driver error: {0}")]
    Driver(String),
}

impl ScanError {
    /// Short error kind surfaced to callers as the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::NavigationTimeout { .. } => TIMEOUT_KIND,
            _ => SERVER_ERROR_KIND,
        }
    }

    /// True when the failure was a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScanError::NavigationTimeout { .. })
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(e: serde_json::Error) -> Self {
        ScanError::UnexpectedPayload(e.to_string())
    }
}
