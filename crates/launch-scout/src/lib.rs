// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Launch Scout core: reveal, locate and extract newly-launched items from a
//! lazily-rendered storefront page.
//!
//! The crate is browser-agnostic: everything it knows about the rendered page
//! goes through the [`DocumentDriver`] trait. A scan is one strictly
//! sequential pass:
//!
//! 1. navigate and let the initial render settle,
//! 2. [`reveal::reveal`] scrolls and expands for a fixed cycle budget while
//!    recording every section heading it sees,
//! 3. [`locate::locate`] finds the "newly launched" section in the final
//!    document state,
//! 4. [`extract::extract`] turns its anchors into [`Record`]s through ordered
//!    fallback selector chains.
//!
//! [`scan::scan`] ties the steps together and guarantees the driver is closed
//! on every exit path.

pub mod config;
pub mod driver;
pub mod error;
pub mod extract;
pub mod locate;
pub mod outcome;
pub mod reveal;
pub mod scan;

pub use config::{Profile, ResourceKind, ScanConfig, SelectorConfig};
pub use driver::{DocumentDriver, DocumentSource, PageScript, WaitPolicy};
pub use error::ScanError;
pub use extract::{extract, FieldChain, FieldSelector, Read, Record};
pub use locate::{is_newly_launched, locate, locate_in, AnchorSnapshot, Section, SectionSnapshot};
pub use outcome::{ExtractionOutcome, ResponseBody, ScanFailure};
pub use reveal::{reveal, HeadingObservation, RenderCycle};
pub use scan::scan;
