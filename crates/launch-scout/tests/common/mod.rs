//! Scripted in-memory document used by the integration tests.
//!
//! Sections become visible as the page is scrolled or expanded, mimicking a
//! lazily rendered storefront.

#![allow(dead_code)]

use async_trait::async_trait;
use launch_scout::{
    AnchorSnapshot, DocumentDriver, DocumentSource, PageScript, ScanConfig, ScanError,
    SectionSnapshot, WaitPolicy,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const VIEWPORT_HEIGHT: f64 = 720.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavBehavior {
    #[default]
    Ok,
    Timeout,
    Fail,
}

/// Static description of the page.
#[derive(Debug, Clone, Default)]
pub struct PageModel {
    pub sections: Vec<SectionSnapshot>,
    /// Sections visible right after navigation.
    pub initially_visible: usize,
    /// Sections appended per scroll.
    pub reveal_per_scroll: usize,
    /// Sections appended per expand click.
    pub reveal_per_expand: usize,
    /// Number of times an expand control can be clicked.
    pub expand_clicks: usize,
    pub nav: NavBehavior,
    /// Fail the n-th evaluation (0-based).
    pub fail_evaluation_at: Option<usize>,
    pub fail_close: bool,
    pub fail_open: bool,
}

impl PageModel {
    pub fn with_sections(sections: Vec<SectionSnapshot>) -> Self {
        let n = sections.len();
        Self {
            sections,
            initially_visible: n,
            ..Default::default()
        }
    }
}

/// Everything the document observed, shared with the test.
#[derive(Debug, Default)]
pub struct Journal {
    pub navigations: Vec<String>,
    pub scrolls: Vec<f64>,
    pub expand_attempts: usize,
    pub expand_clicks: usize,
    pub sweeps: usize,
    pub snapshots: usize,
    pub evaluations: usize,
    pub closed: usize,
    pub opened: usize,
}

struct DocState {
    visible: usize,
    clicks_left: usize,
}

pub struct ScriptedDocument {
    page: PageModel,
    state: Mutex<DocState>,
    journal: Arc<Mutex<Journal>>,
    active: Arc<AtomicUsize>,
}

impl ScriptedDocument {
    fn visible_sections(&self) -> Vec<SectionSnapshot> {
        let visible = self.state.lock().unwrap().visible;
        self.page.sections.iter().take(visible).cloned().collect()
    }

    fn reveal(&self, n: usize) {
        let mut state = self.state.lock().unwrap();
        state.visible = (state.visible + n).min(self.page.sections.len());
    }
}

#[async_trait]
impl DocumentDriver for ScriptedDocument {
    async fn navigate(
        &mut self,
        url: &str,
        _wait: WaitPolicy,
        deadline: Duration,
    ) -> Result<(), ScanError> {
        self.journal.lock().unwrap().navigations.push(url.to_string());
        match self.page.nav {
            NavBehavior::Ok => Ok(()),
            NavBehavior::Timeout => {
                tokio::time::sleep(deadline).await;
                Err(ScanError::NavigationTimeout {
                    deadline_ms: deadline.as_millis() as u64,
                })
            }
            NavBehavior::Fail => Err(ScanError::Navigation("net::ERR_CONNECTION_RESET".into())),
        }
    }

    async fn evaluate(&self, script: &PageScript) -> Result<Value, ScanError> {
        let n = {
            let mut journal = self.journal.lock().unwrap();
            journal.evaluations += 1;
            journal.evaluations - 1
        };
        if self.page.fail_evaluation_at == Some(n) {
            return Err(ScanError::Evaluation(
                "Execution context was destroyed".into(),
            ));
        }

        match script {
            PageScript::ViewportHeight => Ok(json!(VIEWPORT_HEIGHT)),
            PageScript::ScrollBy { delta } => {
                self.journal.lock().unwrap().scrolls.push(*delta);
                self.reveal(self.page.reveal_per_scroll);
                Ok(Value::Null)
            }
            PageScript::ExpandControl { .. } => {
                self.journal.lock().unwrap().expand_attempts += 1;
                let clicked = {
                    let mut state = self.state.lock().unwrap();
                    if state.clicks_left > 0 {
                        state.clicks_left -= 1;
                        true
                    } else {
                        false
                    }
                };
                if clicked {
                    self.journal.lock().unwrap().expand_clicks += 1;
                    self.reveal(self.page.reveal_per_expand);
                }
                Ok(json!(clicked))
            }
            PageScript::HeadingSweep { .. } => {
                self.journal.lock().unwrap().sweeps += 1;
                let headings: Vec<Option<String>> = self
                    .visible_sections()
                    .into_iter()
                    .map(|s| s.heading.map(|h| h.trim().to_string()).filter(|h| !h.is_empty()))
                    .collect();
                Ok(json!(headings))
            }
            PageScript::SectionSnapshot(_) => {
                self.journal.lock().unwrap().snapshots += 1;
                Ok(serde_json::to_value(self.visible_sections()).unwrap())
            }
        }
    }

    async fn close(self: Box<Self>) -> Result<(), ScanError> {
        self.journal.lock().unwrap().closed += 1;
        self.active.fetch_sub(1, Ordering::Relaxed);
        if self.page.fail_close {
            return Err(ScanError::Driver("target already closed".into()));
        }
        Ok(())
    }
}

/// Opens a [`ScriptedDocument`] per scan.
pub struct ScriptedSource {
    pub page: PageModel,
    pub journal: Arc<Mutex<Journal>>,
    active: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(page: PageModel) -> Self {
        Self {
            page,
            journal: Arc::new(Mutex::new(Journal::default())),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn journal(&self) -> std::sync::MutexGuard<'_, Journal> {
        self.journal.lock().unwrap()
    }
}

#[async_trait]
impl DocumentSource for ScriptedSource {
    async fn open(&self, _config: &ScanConfig) -> Result<Box<dyn DocumentDriver>, ScanError> {
        if self.page.fail_open {
            return Err(ScanError::Driver("browser disconnected".into()));
        }
        self.journal.lock().unwrap().opened += 1;
        self.active.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(ScriptedDocument {
            state: Mutex::new(DocState {
                visible: self.page.initially_visible.min(self.page.sections.len()),
                clicks_left: self.page.expand_clicks,
            }),
            page: self.page.clone(),
            journal: Arc::clone(&self.journal),
            active: Arc::clone(&self.active),
        }))
    }

    fn active_documents(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }
}

// ── Page builders ──

pub fn section(heading: Option<&str>, anchors: Vec<AnchorSnapshot>) -> SectionSnapshot {
    SectionSnapshot {
        heading: heading.map(str::to_string),
        anchors,
    }
}

pub fn item(id: &str, name: &str, category: Option<&str>) -> AnchorSnapshot {
    AnchorSnapshot {
        href: Some(format!("/store/apps/details?id={id}")),
        name: vec![Some(name.to_string()), None, None],
        category: vec![category.map(str::to_string), None],
        thumbnail: vec![Some(format!("https://cdn.example/{id}.png")), None],
    }
}

/// An anchor with the item href prefix but no name markup.
pub fn decorative(id: &str) -> AnchorSnapshot {
    AnchorSnapshot {
        href: Some(format!("/store/apps/details?id={id}")),
        name: vec![None, None, None],
        category: vec![None, None],
        thumbnail: vec![None, None],
    }
}

/// Fast config: no initial settle, short waits, small budget.
pub fn test_config(budget: u32) -> ScanConfig {
    let mut config = ScanConfig::default()
        .with_cycle_budget(budget)
        .with_target_url("https://play.google.com/store/games?device=phone");
    config.initial_settle = Duration::from_millis(0);
    config
}
