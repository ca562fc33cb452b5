// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Scan configuration.
//!
//! The reveal loop is a single algorithm; what varied between deployments was
//! timing, viewport and a couple of selectors. Those live here, grouped into
//! named [`Profile`]s.

use crate::driver::WaitPolicy;
use crate::extract::{FieldChain, FieldSelector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Storefront page that lists the newly-launched section.
pub const DEFAULT_TARGET_URL: &str = "https://play.google.com/store/games?device=phone";

/// Origin prepended to item hrefs.
pub const DEFAULT_ORIGIN: &str = "https://play.google.com";

/// Desktop Chrome user agent; the storefront serves a degraded page to
/// unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Sentinel recorded for sections without a resolvable heading.
pub const NO_HEADING: &str = "No heading";

/// Browser viewport in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Selectors describing the page structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Top-level content sections.
    pub section: String,
    /// Heading element, relative to a section.
    pub heading: String,
    /// Elements scanned for an expand control, in order.
    pub expand_controls: Vec<String>,
    /// Lowercase phrases that identify an expand control.
    pub expand_phrases: Vec<String>,
    /// Item anchors are `a[href^=<prefix>]` inside the section.
    pub item_href_prefix: String,
    pub origin: String,
    pub name: FieldChain,
    pub category: FieldChain,
    pub thumbnail: FieldChain,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            section: "section".into(),
            heading: "div.kcen6d span".into(),
            expand_controls: vec![
                "button".into(),
                "[role=\"button\"]".into(),
                ".VfPpkd-LhBDec".into(),
            ],
            expand_phrases: vec!["show more".into(), "see more".into()],
            item_href_prefix: "/store/apps/details".into(),
            origin: DEFAULT_ORIGIN.into(),
            name: FieldChain::new(vec![
                FieldSelector::text("div.Epkrse"),
                FieldSelector::text("div.sT93pb.DdYX5"),
                FieldSelector::text("div.ubGTjb span.sT93pb.DdYX5"),
            ]),
            category: FieldChain::new(vec![
                FieldSelector::text("div.ubGTjb span.sT93pb.w2kbF"),
                FieldSelector::text("div.vlGucd span.w2kbF"),
            ]),
            thumbnail: FieldChain::new(vec![
                FieldSelector::prop("img", "src"),
                FieldSelector::attr("img", "data-src"),
            ]),
        }
    }
}

/// Subresource classes a driver can refuse to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Stylesheet,
    Font,
    Media,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Image,
        ResourceKind::Stylesheet,
        ResourceKind::Font,
        ResourceKind::Media,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Stylesheet => "stylesheet",
            ResourceKind::Font => "font",
            ResourceKind::Media => "media",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| {
                format!("unknown resource kind '{s}' (expected image, stylesheet, font or media)")
            })
    }
}

/// Named timing presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// One viewport per cycle, long settle.
    #[default]
    Standard,
    /// More, shorter cycles with larger scroll steps.
    Brisk,
    /// Between the two, with a longer navigation deadline for slow hosts.
    Patient,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Standard, Profile::Brisk, Profile::Patient];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Standard => "standard",
            Profile::Brisk => "brisk",
            Profile::Patient => "patient",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Profile::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                format!("unknown profile '{s}' (expected standard, brisk or patient)")
            })
    }
}

/// Everything one scan needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub profile: Profile,
    pub target_url: String,
    pub wait_policy: WaitPolicy,
    pub navigation_deadline: Duration,
    /// Wait after navigation before the first cycle.
    pub initial_settle: Duration,
    pub cycle_budget: u32,
    pub scroll_multiplier: f64,
    pub settle_delay: Duration,
    pub expand_cooldown: Duration,
    /// Wait after an expand control was clicked.
    pub expand_settle_delay: Duration,
    pub viewport: Viewport,
    pub user_agent: String,
    /// Requests of these kinds are failed before they leave the browser.
    pub blocked_resources: Vec<ResourceKind>,
    pub selectors: SelectorConfig,
}

impl ScanConfig {
    pub fn for_profile(profile: Profile) -> Self {
        let base = Self {
            profile,
            target_url: DEFAULT_TARGET_URL.into(),
            wait_policy: WaitPolicy::DomContentLoaded,
            navigation_deadline: Duration::from_secs(90),
            initial_settle: Duration::from_millis(3000),
            cycle_budget: 20,
            scroll_multiplier: 1.0,
            settle_delay: Duration::from_millis(1000),
            expand_cooldown: Duration::from_millis(3000),
            expand_settle_delay: Duration::from_millis(3000),
            viewport: Viewport::default(),
            user_agent: DEFAULT_USER_AGENT.into(),
            blocked_resources: ResourceKind::ALL.to_vec(),
            selectors: SelectorConfig::default(),
        };

        match profile {
            Profile::Standard => base,
            Profile::Brisk => Self {
                navigation_deadline: Duration::from_secs(60),
                initial_settle: Duration::from_millis(2000),
                cycle_budget: 30,
                scroll_multiplier: 1.5,
                settle_delay: Duration::from_millis(300),
                expand_cooldown: Duration::from_millis(2000),
                expand_settle_delay: Duration::from_millis(2000),
                ..base
            },
            Profile::Patient => Self {
                navigation_deadline: Duration::from_secs(120),
                cycle_budget: 25,
                scroll_multiplier: 1.2,
                settle_delay: Duration::from_millis(800),
                expand_cooldown: Duration::from_millis(2500),
                viewport: Viewport {
                    width: 1366,
                    height: 900,
                },
                ..base
            },
        }
    }

    pub fn with_cycle_budget(mut self, budget: u32) -> Self {
        self.cycle_budget = budget;
        self
    }

    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = url.into();
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_expand_cooldown(mut self, cooldown: Duration) -> Self {
        self.expand_cooldown = cooldown;
        self
    }

    pub fn with_navigation_deadline(mut self, deadline: Duration) -> Self {
        self.navigation_deadline = deadline;
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::for_profile(Profile::default())
    }
}
