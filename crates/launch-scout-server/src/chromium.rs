// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! Chromium-backed document driver using chromiumoxide.
//!
//! One headless browser process is shared; every scan gets its own page and
//! closes it when done.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::fetch::{
    EnableParams, EventRequestPaused, FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::{
    EventDomContentEventFired, EventLoadEventFired, NavigateParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use launch_scout::{
    DocumentDriver, DocumentSource, PageScript, ResourceKind, ScanConfig, ScanError, WaitPolicy,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. Explicit env overrides
    for var in ["LAUNCH_SCOUT_CHROMIUM_PATH", "PUPPETEER_EXECUTABLE_PATH"] {
        if let Ok(p) = std::env::var(var) {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }
    }

    // 2. ~/.launch-scout/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".launch-scout/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".launch-scout/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".launch-scout/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".launch-scout/chromium/chrome-linux64/chrome"),
                home.join(".launch-scout/chromium/chrome"),
            ]
        };
        if let Some(c) = candidates.into_iter().find(|c| c.exists()) {
            return Some(c);
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Shared headless Chromium that opens one page per scan.
pub struct ChromiumSource {
    browser: Browser,
    handler: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumSource {
    /// Launch headless Chromium with flags derived from `config`.
    pub async fn launch(config: &ScanConfig) -> Result<Self> {
        let chrome_path = find_chromium().context(
            "Chromium not found. Set LAUNCH_SCOUT_CHROMIUM_PATH or install google-chrome.",
        )?;
        info!(path = %chrome_path.display(), "launching Chromium");

        let builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-accelerated-2d-canvas")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .arg(format!(
                "--window-size={},{}",
                config.viewport.width, config.viewport.height
            ))
            .arg(format!("--user-agent={}", config.user_agent));
        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "browser handler event error");
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Close the browser process.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "failed to close Chromium");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "failed to reap Chromium process");
        }
        self.handler.abort();
    }
}

#[async_trait]
impl DocumentSource for ChromiumSource {
    async fn open(&self, config: &ScanConfig) -> Result<Box<dyn DocumentDriver>, ScanError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScanError::Driver(format!("failed to create page: {e}")))?;

        // Counted before setup so a failed setup still balances on close.
        self.active_count.fetch_add(1, Ordering::Relaxed);
        let mut document = ChromiumDocument {
            page,
            active_count: Arc::clone(&self.active_count),
            interceptor: None,
        };

        if let Err(e) = document.prepare(config).await {
            let _ = Box::new(document).close().await;
            return Err(e);
        }
        Ok(Box::new(document))
    }

    fn active_documents(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium page.
pub struct ChromiumDocument {
    page: Page,
    active_count: Arc<AtomicUsize>,
    /// Fails paused requests for blocked resource kinds.
    interceptor: Option<JoinHandle<()>>,
}

impl ChromiumDocument {
    async fn prepare(&mut self, config: &ScanConfig) -> Result<(), ScanError> {
        self.emulate(config).await?;
        self.interceptor = block_resources(&self.page, &config.blocked_resources).await?;
        Ok(())
    }

    async fn emulate(&self, config: &ScanConfig) -> Result<(), ScanError> {
        let metrics = SetDeviceMetricsOverrideParams::new(
            i64::from(config.viewport.width),
            i64::from(config.viewport.height),
            1.0,
            false,
        );
        self.page
            .execute(metrics)
            .await
            .map_err(|e| ScanError::Driver(format!("failed to set viewport: {e}")))?;
        self.page
            .execute(SetUserAgentOverrideParams::new(config.user_agent.clone()))
            .await
            .map_err(|e| ScanError::Driver(format!("failed to set user agent: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentDriver for ChromiumDocument {
    async fn navigate(
        &mut self,
        url: &str,
        wait: WaitPolicy,
        deadline: Duration,
    ) -> Result<(), ScanError> {
        let page = &self.page;
        let started = Instant::now();
        let load = async {
            // Subscribe before navigating so a fast page cannot fire first.
            let mut dom_ready = page
                .event_listener::<EventDomContentEventFired>()
                .await
                .map_err(|e| navigation_error(e, started))?;
            let mut loaded = page
                .event_listener::<EventLoadEventFired>()
                .await
                .map_err(|e| navigation_error(e, started))?;

            let nav = page
                .execute(NavigateParams::new(url))
                .await
                .map_err(|e| navigation_error(e, started))?;
            if let Some(text) = nav.result.error_text.as_ref() {
                return Err(ScanError::Navigation(text.clone()));
            }

            let fired = match wait {
                WaitPolicy::DomContentLoaded => dom_ready.next().await.is_some(),
                WaitPolicy::Load => loaded.next().await.is_some(),
            };
            if !fired {
                return Err(ScanError::Navigation(
                    "page closed before navigation finished".into(),
                ));
            }
            Ok(())
        };

        match tokio::time::timeout(deadline, load).await {
            Ok(result) => {
                if result.is_ok() {
                    debug!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        ?wait,
                        "navigation finished"
                    );
                }
                result
            }
            Err(_) => Err(ScanError::NavigationTimeout {
                deadline_ms: deadline.as_millis() as u64,
            }),
        }
    }

    async fn evaluate(&self, script: &PageScript) -> Result<serde_json::Value, ScanError> {
        let params = EvaluateParams::builder()
            .expression(script.source())
            .return_by_value(true)
            .build()
            .map_err(ScanError::Driver)?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| ScanError::Evaluation(format!("{}: {e}", script.name())))?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn close(self: Box<Self>) -> Result<(), ScanError> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        if let Some(interceptor) = &self.interceptor {
            interceptor.abort();
        }
        self.page
            .close()
            .await
            .map_err(|e| ScanError::Driver(format!("failed to close page: {e}")))
    }
}

/// A CDP command that timed out on Chromium's side counts as a navigation
/// timeout, reported with the time actually spent.
fn navigation_error(e: CdpError, started: Instant) -> ScanError {
    match e {
        CdpError::Timeout => ScanError::NavigationTimeout {
            deadline_ms: started.elapsed().as_millis() as u64,
        },
        e => ScanError::Navigation(e.to_string()),
    }
}

fn resource_type(kind: ResourceKind) -> ResourceType {
    match kind {
        ResourceKind::Image => ResourceType::Image,
        ResourceKind::Stylesheet => ResourceType::Stylesheet,
        ResourceKind::Font => ResourceType::Font,
        ResourceKind::Media => ResourceType::Media,
    }
}

/// Pause requests of the given kinds and fail every one of them.
///
/// Only matching requests are paused, so everything the listener sees is
/// blocked.
async fn block_resources(
    page: &Page,
    kinds: &[ResourceKind],
) -> Result<Option<JoinHandle<()>>, ScanError> {
    if kinds.is_empty() {
        return Ok(None);
    }

    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| ScanError::Driver(format!("failed to listen for requests: {e}")))?;
    let intercept_page = page.clone();
    let interceptor = tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let fail =
                FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
            if let Err(e) = intercept_page.execute(fail).await {
                debug!(error = %e, url = %event.request.url, "failed to block request");
            }
        }
    });

    let patterns: Vec<RequestPattern> = kinds
        .iter()
        .map(|kind| {
            RequestPattern::builder()
                .url_pattern("*")
                .resource_type(resource_type(*kind))
                .request_stage(RequestStage::Request)
                .build()
        })
        .collect();
    if let Err(e) = page
        .execute(EnableParams::builder().patterns(patterns).build())
        .await
    {
        interceptor.abort();
        return Err(ScanError::Driver(format!(
            "failed to enable request interception: {e}"
        )));
    }

    debug!(blocked = ?kinds, "request interception enabled");
    Ok(Some(interceptor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Html;
    use axum::routing::get;
    use axum::Router;
    use launch_scout::SelectorConfig;
    use serde_json::json;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_snapshot_of_static_page() {
        let config = ScanConfig::default();
        let selectors = SelectorConfig::default();
        let source = ChromiumSource::launch(&config)
            .await
            .expect("failed to launch Chromium");
        let mut doc = source.open(&config).await.expect("failed to open page");

        let html = concat!(
            "data:text/html,",
            "<section><div class='kcen6d'><span>Top charts</span></div></section>",
            "<section><p>untitled shelf</p></section>",
            "<section><div class='kcen6d'><span> Newly launched games </span></div>",
            "<a href='/store/apps/details?id=a'><div class='Epkrse'>Alpha</div>",
            "<img src='https://cdn.example/a.png'></a>",
            "<a href='/store/apps/details?id=b'><div class='Epkrse'>  </div>",
            "<div class='sT93pb DdYX5'>Beta</div>",
            "<img data-src='https://cdn.example/b.png'></a>",
            "<a href='/store/search?q=alpha'><div class='Epkrse'>Search</div></a>",
            "</section>",
            "<button>Show more</button>"
        );
        doc.navigate(html, WaitPolicy::Load, Duration::from_secs(10))
            .await
            .expect("navigation failed");

        let height = doc.viewport_height().await.expect("viewport");
        assert!(height > 0.0);

        let clicked = doc
            .evaluate(&PageScript::expand_control(&selectors))
            .await
            .expect("expand");
        assert_eq!(clicked, json!(true));

        let headings = doc
            .evaluate(&PageScript::heading_sweep(&selectors))
            .await
            .expect("sweep");
        assert_eq!(headings, json!(["Top charts", null, "Newly launched games"]));

        let section =
            launch_scout::locate(doc.as_ref(), &selectors, launch_scout::is_newly_launched)
                .await
                .expect("locate")
                .expect("section present");
        // The search link lacks the detail-page prefix.
        assert_eq!(section.anchors.len(), 2);

        let records = launch_scout::extract(&section, "https://play.google.com");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Alpha");
        assert_eq!(records[0].thumbnail_url, "https://cdn.example/a.png");
        assert_eq!(records[0].category, "Unknown");
        assert_eq!(records[1].name, "Beta");
        assert_eq!(
            records[1].url,
            "https://play.google.com/store/apps/details?id=b"
        );
        assert_eq!(records[1].thumbnail_url, "https://cdn.example/b.png");

        doc.close().await.expect("close failed");
        assert_eq!(source.active_documents(), 0);
        source.shutdown().await;
    }

    /// Serves a page whose `load` event waits on a slow iframe.
    async fn serve_slow_page() -> String {
        let app = Router::new()
            .route(
                "/",
                get(|| async {
                    Html("<html><body><p>ready</p><iframe src='/slow'></iframe></body></html>")
                }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Html("late")
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_dom_content_loaded_does_not_wait_for_load() {
        let url = serve_slow_page().await;
        let config = ScanConfig::default();
        let source = ChromiumSource::launch(&config)
            .await
            .expect("failed to launch Chromium");
        let mut doc = source.open(&config).await.expect("failed to open page");

        let started = Instant::now();
        doc.navigate(&url, WaitPolicy::DomContentLoaded, Duration::from_secs(5))
            .await
            .expect("DOMContentLoaded navigation failed");
        assert!(started.elapsed() < Duration::from_secs(5));

        let err = doc
            .navigate(&url, WaitPolicy::Load, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err, ScanError::NavigationTimeout { deadline_ms: 1000 });

        doc.close().await.expect("close failed");
        source.shutdown().await;
    }
}
