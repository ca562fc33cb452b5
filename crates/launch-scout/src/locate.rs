// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Section location.
//!
//! Sections are read as one JSON snapshot per call and matched in Rust, so a
//! located [`Section`] never refers back into the live document.

use crate::config::SelectorConfig;
use crate::driver::{DocumentDriver, PageScript};
use crate::error::ScanError;
use serde::{Deserialize, Serialize};

/// One section as serialized by [`PageScript::SectionSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSnapshot {
    /// Raw heading text; `None` when the structural heading path is absent.
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub anchors: Vec<AnchorSnapshot>,
}

/// Candidate values for one item anchor.
///
/// Each field vector is positional against its [`crate::FieldChain`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSnapshot {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub name: Vec<Option<String>>,
    #[serde(default)]
    pub category: Vec<Option<String>>,
    #[serde(default)]
    pub thumbnail: Vec<Option<String>>,
}

/// A located section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading, lowercased.
    pub heading: String,
    /// Position among all sections in document order.
    pub index: usize,
    pub anchors: Vec<AnchorSnapshot>,
}

/// Heading contains both "newly" and "launch", in any order.
///
/// Expects an already lowercased heading.
pub fn is_newly_launched(heading: &str) -> bool {
    heading.contains("newly") && heading.contains("launch")
}

/// First section, in document order, whose lowercased heading matches.
pub fn locate_in<P>(snapshots: Vec<SectionSnapshot>, predicate: P) -> Option<Section>
where
    P: Fn(&str) -> bool,
{
    snapshots
        .into_iter()
        .enumerate()
        .find_map(|(index, snapshot)| {
            let heading = snapshot.heading.unwrap_or_default().to_lowercase();
            predicate(&heading).then(|| Section {
                heading,
                index,
                anchors: snapshot.anchors,
            })
        })
}

/// Snapshot the current document and locate the target section.
///
/// `Ok(None)` is the normal "not on the page" outcome, not an error.
pub async fn locate<P>(
    driver: &dyn DocumentDriver,
    selectors: &SelectorConfig,
    predicate: P,
) -> Result<Option<Section>, ScanError>
where
    P: Fn(&str) -> bool,
{
    let value = driver
        .evaluate(&PageScript::SectionSnapshot(selectors.clone()))
        .await?;
    let snapshots: Vec<SectionSnapshot> = serde_json::from_value(value)?;
    tracing::debug!(sections = snapshots.len(), "section snapshot taken");
    Ok(locate_in(snapshots, predicate))
}
