// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Outcome classification and response bodies.

use crate::error::ScanError;
use crate::extract::{extract, Record};
use crate::locate::Section;
use crate::reveal::HeadingObservation;
use serde_json::{json, Value};

/// Status codes used in response bodies.
pub mod status {
    pub const SUCCESS: u16 = 200;
    pub const NOT_FOUND: u16 = 404;
    pub const TIMEOUT: u16 = 408;
    pub const SERVER_ERROR: u16 = 500;
}

pub const SECTION_NOT_FOUND_ERROR: &str = "Newly-launched section not found";
pub const SECTION_EMPTY_ERROR: &str = "No games found";

/// Result of a run that completed without a propagated error.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    SectionNotFound {
        headings: HeadingObservation,
    },
    SectionEmpty {
        headings: HeadingObservation,
    },
    Success {
        records: Vec<Record>,
        headings: HeadingObservation,
    },
}

impl ExtractionOutcome {
    /// Classify the final-state locate result.
    pub fn classify(
        section: Option<Section>,
        origin: &str,
        headings: HeadingObservation,
    ) -> Self {
        let Some(section) = section else {
            return ExtractionOutcome::SectionNotFound { headings };
        };
        let records = extract(&section, origin);
        if records.is_empty() {
            ExtractionOutcome::SectionEmpty { headings }
        } else {
            ExtractionOutcome::Success { records, headings }
        }
    }

    pub fn headings(&self) -> &HeadingObservation {
        match self {
            ExtractionOutcome::SectionNotFound { headings }
            | ExtractionOutcome::SectionEmpty { headings }
            | ExtractionOutcome::Success { headings, .. } => headings,
        }
    }

    pub fn records(&self) -> &[Record] {
        match self {
            ExtractionOutcome::Success { records, .. } => records,
            _ => &[],
        }
    }

    pub fn into_response(self) -> ResponseBody {
        match self {
            ExtractionOutcome::Success { records, headings } => ResponseBody {
                status: status::SUCCESS,
                body: json!({
                    "code": status::SUCCESS,
                    "count": records.len(),
                    "games": records,
                    "sections": headings,
                }),
            },
            ExtractionOutcome::SectionNotFound { headings } => ResponseBody {
                status: status::NOT_FOUND,
                body: json!({
                    "code": status::NOT_FOUND,
                    "error": SECTION_NOT_FOUND_ERROR,
                    "message": "Could not locate the newly-launched games section",
                    "sections": headings,
                }),
            },
            ExtractionOutcome::SectionEmpty { headings } => ResponseBody {
                status: status::NOT_FOUND,
                body: json!({
                    "code": status::NOT_FOUND,
                    "error": SECTION_EMPTY_ERROR,
                    "message": "The newly-launched section was found but no games were extracted",
                    "sections": headings,
                }),
            },
        }
    }
}

/// A propagated error plus whatever headings were seen before it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFailure {
    pub error: ScanError,
    pub headings: HeadingObservation,
}

impl ScanFailure {
    pub fn new(error: ScanError, headings: HeadingObservation) -> Self {
        Self { error, headings }
    }

    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }

    pub fn into_response(self) -> ResponseBody {
        let code = if self.error.is_timeout() {
            status::TIMEOUT
        } else {
            status::SERVER_ERROR
        };
        ResponseBody {
            status: code,
            body: json!({
                "code": code,
                "error": self.error.kind(),
                "message": self.error.to_string(),
                "sections": self.headings,
            }),
        }
    }
}

impl std::fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error.kind(), self.error)
    }
}

impl std::error::Error for ScanFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Status code plus JSON body, ready for any transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseBody {
    pub status: u16,
    pub body: Value,
}

impl From<Result<ExtractionOutcome, ScanFailure>> for ResponseBody {
    fn from(result: Result<ExtractionOutcome, ScanFailure>) -> Self {
        match result {
            Ok(outcome) => outcome.into_response(),
            Err(failure) => failure.into_response(),
        }
    }
}
