// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Record extraction with ordered fallback selector chains.
//!
//! The storefront renders the same logical field with different class names
//! depending on which internal card variant it picked. Every field therefore
//! carries a [`FieldChain`]: the in-page snapshot script evaluates every
//! selector of the chain and this module picks the first non-empty value.

use crate::locate::{AnchorSnapshot, Section};
use serde::{Deserialize, Serialize};

/// Category used when every category selector comes back empty.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// One extracted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub name: String,
    pub url: String,
    pub category: String,
    pub thumbnail_url: String,
}

/// How a matched element is turned into a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Read {
    /// `element.textContent`.
    Text,
    /// `element.getAttribute(name)`.
    Attr(String),
    /// `element[name]`, e.g. `img.src` resolved to an absolute URL.
    Prop(String),
}

/// A CSS selector relative to the anchor plus the read applied to its match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub css: String,
    pub read: Read,
}

impl FieldSelector {
    pub fn text(css: &str) -> Self {
        Self {
            css: css.to_string(),
            read: Read::Text,
        }
    }

    pub fn attr(css: &str, name: &str) -> Self {
        Self {
            css: css.to_string(),
            read: Read::Attr(name.to_string()),
        }
    }

    pub fn prop(css: &str, name: &str) -> Self {
        Self {
            css: css.to_string(),
            read: Read::Prop(name.to_string()),
        }
    }
}

/// Ordered fallback selectors for one field, most common markup first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldChain(pub Vec<FieldSelector>);

impl FieldChain {
    pub fn new(selectors: Vec<FieldSelector>) -> Self {
        Self(selectors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// First candidate that is non-empty after trimming.
///
/// Candidates are positional: index `i` is what selector `i` of the chain
/// produced, `None` when the selector matched nothing.
pub fn first_non_empty(candidates: &[Option<String>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Turn every anchor of a located section into a record.
///
/// Anchors without a name or an href are dropped: decorative links inside the
/// section share the detail-page prefix but are not items.
pub fn extract(section: &Section, origin: &str) -> Vec<Record> {
    section
        .anchors
        .iter()
        .filter_map(|anchor| record_from_anchor(anchor, origin))
        .collect()
}

fn record_from_anchor(anchor: &AnchorSnapshot, origin: &str) -> Option<Record> {
    let name = first_non_empty(&anchor.name)?;
    let href = anchor.href.as_deref().filter(|h| !h.is_empty())?;

    Some(Record {
        name,
        url: format!("{origin}{href}"),
        category: first_non_empty(&anchor.category)
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        thumbnail_url: first_non_empty(&anchor.thumbnail).unwrap_or_default(),
    })
}
