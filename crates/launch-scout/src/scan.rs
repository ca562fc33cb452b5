// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! One full extraction run against a freshly opened document.

use crate::config::ScanConfig;
use crate::driver::{DocumentDriver, DocumentSource};
use crate::error::ScanError;
use crate::locate::{is_newly_launched, locate, Section};
use crate::outcome::{ExtractionOutcome, ScanFailure};
use crate::reveal::{reveal, HeadingObservation};
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Open a document, reveal, locate and extract, then close the document.
///
/// The document is closed on every path once opened, including when the
/// returned future is dropped mid-run. A close failure is logged and never
/// replaces the run's own result.
pub async fn scan(
    source: &dyn DocumentSource,
    config: &ScanConfig,
) -> Result<ExtractionOutcome, ScanFailure> {
    let start = Instant::now();
    let mut headings = HeadingObservation::new();

    let driver = source
        .open(config)
        .await
        .map_err(|e| ScanFailure::new(e, HeadingObservation::new()))?;
    let mut document = OpenDocument(Some(driver));

    let result = match document.0.as_deref_mut() {
        Some(driver) => run(driver, config, &mut headings).await,
        None => Err(ScanError::Driver("document closed before use".into())),
    };

    document.close().await;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(section) => {
            let outcome =
                ExtractionOutcome::classify(section, &config.selectors.origin, headings);
            match &outcome {
                ExtractionOutcome::Success { records, .. } => {
                    info!(count = records.len(), elapsed_ms, "extracted records")
                }
                ExtractionOutcome::SectionEmpty { .. } => {
                    info!(elapsed_ms, "target section found but no records extracted")
                }
                ExtractionOutcome::SectionNotFound { headings } => {
                    info!(elapsed_ms, sections = headings.len(), "target section not found")
                }
            }
            Ok(outcome)
        }
        Err(error) => {
            warn!(kind = error.kind(), error = %error, elapsed_ms, "scan aborted");
            Err(ScanFailure::new(error, headings))
        }
    }
}

/// Owns an opened driver until it is closed.
///
/// Dropping it unclosed hands the driver to a background task that closes it.
struct OpenDocument(Option<Box<dyn DocumentDriver>>);

impl OpenDocument {
    async fn close(mut self) {
        if let Some(driver) = self.0.take() {
            close_logged(driver).await;
        }
    }
}

impl Drop for OpenDocument {
    fn drop(&mut self) {
        let Some(driver) = self.0.take() else {
            return;
        };
        match Handle::try_current() {
            Ok(handle) => {
                warn!("scan cancelled; closing document in the background");
                handle.spawn(close_logged(driver));
            }
            Err(_) => warn!("scan cancelled outside a runtime; document left open"),
        }
    }
}

async fn close_logged(driver: Box<dyn DocumentDriver>) {
    if let Err(e) = driver.close().await {
        warn!(error = %e, "failed to close document");
    }
}

async fn run(
    driver: &mut dyn DocumentDriver,
    config: &ScanConfig,
    headings: &mut HeadingObservation,
) -> Result<Option<Section>, ScanError> {
    info!(url = %config.target_url, profile = %config.profile, "navigating");
    driver
        .navigate(
            &config.target_url,
            config.wait_policy,
            config.navigation_deadline,
        )
        .await?;
    driver.settle(config.initial_settle).await;

    reveal(&*driver, config, headings).await?;
    locate(&*driver, &config.selectors, is_newly_launched).await
}
