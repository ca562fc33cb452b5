// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Document driver abstraction.
//!
//! Defines the `DocumentSource` and `DocumentDriver` traits that abstract over
//! the rendered page (Chromium in the server crate, a scripted document in
//! tests). The core never holds a node reference: every read is a
//! [`PageScript`] whose JSON result is a fresh snapshot.

mod script;

pub use script::PageScript;

use crate::config::ScanConfig;
use crate::error::ScanError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When navigation counts as finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitPolicy {
    /// The DOM is parsed; lazily loaded content is still missing.
    #[default]
    DomContentLoaded,
    /// The `load` event fired.
    Load,
}

/// Hands out independent drivers, one per scan.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Open a fresh document configured for this scan.
    async fn open(&self, config: &ScanConfig) -> Result<Box<dyn DocumentDriver>, ScanError>;
    /// Number of documents currently open.
    fn active_documents(&self) -> usize;
}

/// One rendered document. Not safe for two concurrent scans.
#[async_trait]
pub trait DocumentDriver: Send + Sync {
    /// Navigate, failing with [`ScanError::NavigationTimeout`] past `deadline`.
    async fn navigate(
        &mut self,
        url: &str,
        wait: WaitPolicy,
        deadline: Duration,
    ) -> Result<(), ScanError>;

    /// Evaluate a script inside the document and return its JSON result.
    async fn evaluate(&self, script: &PageScript) -> Result<serde_json::Value, ScanError>;

    /// Scroll the window vertically by `delta` CSS pixels.
    async fn scroll_by(&self, delta: f64) -> Result<(), ScanError> {
        self.evaluate(&PageScript::ScrollBy { delta }).await?;
        Ok(())
    }

    /// Current `window.innerHeight`.
    async fn viewport_height(&self) -> Result<f64, ScanError> {
        let value = self.evaluate(&PageScript::ViewportHeight).await?;
        value.as_f64().ok_or_else(|| {
            ScanError::UnexpectedPayload(format!("viewport height was {value}"))
        })
    }

    /// Let lazily loaded content materialize.
    async fn settle(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Release the document.
    async fn close(self: Box<Self>) -> Result<(), ScanError>;
}
