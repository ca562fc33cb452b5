// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Incremental revealer: scroll, expand and sweep headings for a fixed number
//! of cycles.
//!
//! The loop never stops early when the target section shows up, because the
//! section keeps growing while the page lazily appends cards to it.

use crate::config::{ScanConfig, NO_HEADING};
use crate::driver::{DocumentDriver, PageScript};
use crate::error::ScanError;
use crate::locate::is_newly_launched;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// One iteration of the reveal loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCycle {
    /// 0-based.
    pub index: u32,
    pub scroll_delta: f64,
    /// An expand control was clicked this cycle.
    pub expanded: bool,
    /// Time spent in settle waits.
    pub waited: Duration,
}

/// Distinct headings seen during one run, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingObservation {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl HeadingObservation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heading. Returns false if it was already present.
    pub fn insert(&mut self, heading: impl Into<String>) -> bool {
        let heading = heading.into();
        if self.seen.contains(&heading) {
            return false;
        }
        self.seen.insert(heading.clone());
        self.order.push(heading);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl Serialize for HeadingObservation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.order.serialize(serializer)
    }
}

/// Drive `config.cycle_budget` scroll/expand/sweep cycles.
///
/// Headings are added to `headings` as they are seen, so a caller still has
/// the partial set when a cycle fails. Failures are not retried.
pub async fn reveal(
    driver: &dyn DocumentDriver,
    config: &ScanConfig,
    headings: &mut HeadingObservation,
) -> Result<(), ScanError> {
    let expand_script = PageScript::expand_control(&config.selectors);
    let sweep_script = PageScript::heading_sweep(&config.selectors);
    let mut last_expand: Option<Instant> = None;
    let mut target_seen_at: Option<u32> = None;
    let mut expansions = 0u32;

    info!(budget = config.cycle_budget, "starting reveal");

    for index in 0..config.cycle_budget {
        let viewport = driver.viewport_height().await?;
        let scroll_delta = viewport * config.scroll_multiplier;
        driver.scroll_by(scroll_delta).await?;
        driver.settle(config.settle_delay).await;
        let mut waited = config.settle_delay;

        let now = Instant::now();
        let expand_due =
            last_expand.map_or(true, |at| now.duration_since(at) >= config.expand_cooldown);
        let mut expanded = false;
        if expand_due {
            let clicked = driver.evaluate(&expand_script).await?;
            if clicked.as_bool().unwrap_or(false) {
                debug!(cycle = index, "clicked expand control");
                expanded = true;
                expansions += 1;
                last_expand = Some(now);
                driver.settle(config.expand_settle_delay).await;
                waited += config.expand_settle_delay;
            }
        }

        let swept = sweep(driver, &sweep_script).await?;
        for heading in swept {
            if target_seen_at.is_none() && is_newly_launched(&heading.to_lowercase()) {
                target_seen_at = Some(index);
                info!(cycle = index, heading = %heading, "target section visible");
            }
            headings.insert(heading);
        }

        let cycle = RenderCycle {
            index,
            scroll_delta,
            expanded,
            waited,
        };
        debug!(
            cycle = cycle.index + 1,
            budget = config.cycle_budget,
            delta = cycle.scroll_delta,
            expanded = cycle.expanded,
            waited_ms = cycle.waited.as_millis() as u64,
            "reveal cycle done"
        );
    }

    info!(
        headings = headings.len(),
        expansions,
        target_seen = target_seen_at.is_some(),
        "reveal finished"
    );
    Ok(())
}

/// Heading per section, [`NO_HEADING`] where the heading is missing.
async fn sweep(
    driver: &dyn DocumentDriver,
    script: &PageScript,
) -> Result<Vec<String>, ScanError> {
    let value = driver.evaluate(script).await?;
    let raw: Vec<Option<String>> = serde_json::from_value(value)?;
    Ok(raw
        .into_iter()
        .map(|h| match h {
            Some(h) if !h.trim().is_empty() => h.trim().to_string(),
            _ => NO_HEADING.to_string(),
        })
        .collect())
}
