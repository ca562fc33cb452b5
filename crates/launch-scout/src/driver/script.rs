// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! In-page scripts.
//!
//! Each script is a self-contained expression; configuration is inlined as a
//! JSON literal so the page never sees Rust-side state.

use crate::config::SelectorConfig;
use serde_json::json;

/// A read or command evaluated inside the document.
#[derive(Debug, Clone, PartialEq)]
pub enum PageScript {
    /// `window.innerHeight`, as a number.
    ViewportHeight,
    /// Scroll the window; returns `null`.
    ScrollBy { delta: f64 },
    /// Click the first control whose text contains one of `phrases`.
    /// Returns whether a control was clicked.
    ExpandControl {
        controls: Vec<String>,
        phrases: Vec<String>,
    },
    /// Trimmed heading text per section, `null` where absent.
    HeadingSweep { section: String, heading: String },
    /// Full section snapshot with per-anchor candidate values, deserializable
    /// into `Vec<SectionSnapshot>`.
    SectionSnapshot(SelectorConfig),
}

impl PageScript {
    pub fn expand_control(selectors: &SelectorConfig) -> Self {
        PageScript::ExpandControl {
            controls: selectors.expand_controls.clone(),
            phrases: selectors.expand_phrases.clone(),
        }
    }

    pub fn heading_sweep(selectors: &SelectorConfig) -> Self {
        PageScript::HeadingSweep {
            section: selectors.section.clone(),
            heading: selectors.heading.clone(),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            PageScript::ViewportHeight => "viewport_height",
            PageScript::ScrollBy { .. } => "scroll_by",
            PageScript::ExpandControl { .. } => "expand_control",
            PageScript::HeadingSweep { .. } => "heading_sweep",
            PageScript::SectionSnapshot(_) => "section_snapshot",
        }
    }

    /// JavaScript source, evaluated as an expression.
    pub fn source(&self) -> String {
        match self {
            PageScript::ViewportHeight => "window.innerHeight".to_string(),
            PageScript::ScrollBy { delta } => {
                let delta = if delta.is_finite() { *delta } else { 0.0 };
                format!("(() => {{ window.scrollBy(0, {delta}); return null; }})()")
            }
            PageScript::ExpandControl { controls, phrases } => {
                let cfg = json!({ "controls": controls, "phrases": phrases });
                format!("(() => {{ const cfg = {cfg};{EXPAND_BODY}}})()")
            }
            PageScript::HeadingSweep { section, heading } => {
                let cfg = json!({ "section": section, "heading": heading });
                format!("(() => {{ const cfg = {cfg};{SWEEP_BODY}}})()")
            }
            PageScript::SectionSnapshot(selectors) => {
                let cfg = json!({
                    "section": selectors.section,
                    "heading": selectors.heading,
                    "prefix": selectors.item_href_prefix,
                    "name": selectors.name,
                    "category": selectors.category,
                    "thumbnail": selectors.thumbnail,
                });
                format!("(() => {{ const cfg = {cfg};{SNAPSHOT_BODY}}})()")
            }
        }
    }
}

const EXPAND_BODY: &str = r#"
  const candidates = cfg.controls.flatMap(sel => Array.from(document.querySelectorAll(sel)));
  const control = candidates.find(el => {
    const text = (el.textContent || '').toLowerCase();
    return cfg.phrases.some(p => text.includes(p));
  });
  if (!control) return false;
  control.click();
  return true;
"#;

const SWEEP_BODY: &str = r#"
  return Array.from(document.querySelectorAll(cfg.section)).map(section => {
    const el = section.querySelector(cfg.heading);
    const text = el && el.textContent ? el.textContent.trim() : '';
    return text || null;
  });
"#;

const SNAPSHOT_BODY: &str = r#"
  const read = (root, sel) => {
    const el = root.querySelector(sel.css);
    if (!el) return null;
    let v;
    if (sel.read.kind === 'attr') v = el.getAttribute(sel.read.name);
    else if (sel.read.kind === 'prop') v = el[sel.read.name];
    else v = el.textContent;
    return v == null ? null : String(v);
  };
  const chain = (root, selectors) => selectors.map(sel => read(root, sel));
  const anchorSel = 'a[href^=' + JSON.stringify(cfg.prefix) + ']';
  return Array.from(document.querySelectorAll(cfg.section)).map(section => {
    const h = section.querySelector(cfg.heading);
    return {
      heading: h ? h.textContent : null,
      anchors: Array.from(section.querySelectorAll(anchorSel)).map(a => ({
        href: a.getAttribute('href'),
        name: chain(a, cfg.name),
        category: chain(a, cfg.category),
        thumbnail: chain(a, cfg.thumbnail),
      })),
    };
  });
"#;
