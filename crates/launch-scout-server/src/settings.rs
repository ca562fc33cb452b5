// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Configuration loading and resolution.
//!
//! Precedence: explicit CLI flag, then `LAUNCH_SCOUT_*` environment variable,
//! then the selected profile's preset.

use launch_scout::{Profile, ResourceKind, ScanConfig};
use std::time::Duration;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

pub const ENV_PROFILE: &str = "LAUNCH_SCOUT_PROFILE";
pub const ENV_CYCLE_BUDGET: &str = "LAUNCH_SCOUT_CYCLE_BUDGET";
pub const ENV_SCROLL_MULTIPLIER: &str = "LAUNCH_SCOUT_SCROLL_MULTIPLIER";
pub const ENV_SETTLE_DELAY_MS: &str = "LAUNCH_SCOUT_SETTLE_DELAY_MS";
pub const ENV_EXPAND_COOLDOWN_MS: &str = "LAUNCH_SCOUT_EXPAND_COOLDOWN_MS";
pub const ENV_NAVIGATION_DEADLINE_MS: &str = "LAUNCH_SCOUT_NAVIGATION_DEADLINE_MS";
pub const ENV_TARGET_URL: &str = "LAUNCH_SCOUT_TARGET_URL";
pub const ENV_USER_AGENT: &str = "LAUNCH_SCOUT_USER_AGENT";
/// Comma-separated resource kinds, or `none`.
pub const ENV_BLOCKED_RESOURCES: &str = "LAUNCH_SCOUT_BLOCKED_RESOURCES";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> SettingsError {
    SettingsError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Resolve the scan configuration from the process environment.
pub fn resolve_scan_config(explicit: Option<Profile>) -> Result<ScanConfig, SettingsError> {
    resolve_scan_config_with(explicit, |key| std::env::var(key).ok())
}

/// Resolve the scan configuration from an arbitrary variable lookup.
pub fn resolve_scan_config_with<F>(
    explicit: Option<Profile>,
    lookup: F,
) -> Result<ScanConfig, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let profile = match explicit {
        Some(p) => p,
        None => match get(ENV_PROFILE) {
            Some(v) => v
                .parse::<Profile>()
                .map_err(|reason| invalid(ENV_PROFILE, &v, reason))?,
            None => Profile::default(),
        },
    };
    let mut config = ScanConfig::for_profile(profile);

    if let Some(v) = get(ENV_CYCLE_BUDGET) {
        let budget: u32 = v
            .trim()
            .parse()
            .map_err(|e| invalid(ENV_CYCLE_BUDGET, &v, e))?;
        if budget == 0 {
            return Err(invalid(ENV_CYCLE_BUDGET, &v, "must be at least 1"));
        }
        config.cycle_budget = budget;
    }
    if let Some(v) = get(ENV_SCROLL_MULTIPLIER) {
        let m: f64 = v
            .trim()
            .parse()
            .map_err(|e| invalid(ENV_SCROLL_MULTIPLIER, &v, e))?;
        if !m.is_finite() || m <= 0.0 {
            return Err(invalid(ENV_SCROLL_MULTIPLIER, &v, "must be a positive number"));
        }
        config.scroll_multiplier = m;
    }
    if let Some(ms) = millis(&get, ENV_SETTLE_DELAY_MS)? {
        config.settle_delay = ms;
    }
    if let Some(ms) = millis(&get, ENV_EXPAND_COOLDOWN_MS)? {
        config.expand_cooldown = ms;
    }
    if let Some(ms) = millis(&get, ENV_NAVIGATION_DEADLINE_MS)? {
        config.navigation_deadline = ms;
    }
    if let Some(url) = get(ENV_TARGET_URL) {
        config.target_url = url.trim().to_string();
    }
    if let Some(ua) = get(ENV_USER_AGENT) {
        config.user_agent = ua;
    }
    if let Some(v) = get(ENV_BLOCKED_RESOURCES) {
        config.blocked_resources = if v.trim().eq_ignore_ascii_case("none") {
            Vec::new()
        } else {
            v.split(',')
                .filter(|part| !part.trim().is_empty())
                .map(|part| part.parse::<ResourceKind>())
                .collect::<Result<_, _>>()
                .map_err(|reason| invalid(ENV_BLOCKED_RESOURCES, &v, reason))?
        };
    }

    Ok(config)
}

fn millis<G>(get: &G, var: &'static str) -> Result<Option<Duration>, SettingsError>
where
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| invalid(var, &v, e))
        })
        .transpose()
}

/// Resolve the listening port: flag, then `PORT`, then [`DEFAULT_PORT`].
pub fn resolve_port(explicit: Option<u16>) -> Result<u16, SettingsError> {
    resolve_port_with(explicit, |key| std::env::var(key).ok())
}

pub fn resolve_port_with<F>(explicit: Option<u16>, lookup: F) -> Result<u16, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = explicit {
        return Ok(port);
    }
    match lookup("PORT").filter(|v| !v.trim().is_empty()) {
        Some(v) => v.trim().parse().map_err(|e| invalid("PORT", &v, e)),
        None => Ok(DEFAULT_PORT),
    }
}
