//! Reveal loop timing and budget behaviour.

mod common;

use common::*;
use launch_scout::{reveal, DocumentDriver, DocumentSource, HeadingObservation, Profile, ScanConfig};
use std::time::Duration;
use tokio::time::Instant;

async fn open(source: &ScriptedSource, config: &ScanConfig) -> Box<dyn DocumentDriver> {
    source.open(config).await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_runs_exactly_budget_cycles_even_after_target_found() {
    let page = PageModel::with_sections(vec![section(
        Some("Newly launched"),
        vec![item("a", "Alpha", None)],
    )]);
    let source = ScriptedSource::new(page);
    let config = test_config(7);
    let driver = open(&source, &config).await;
    let mut headings = HeadingObservation::new();

    reveal(driver.as_ref(), &config, &mut headings).await.unwrap();

    let journal = source.journal();
    assert_eq!(journal.scrolls.len(), 7);
    assert_eq!(journal.sweeps, 7);
    assert_eq!(journal.snapshots, 0);
    assert_eq!(headings.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_scroll_delta_scales_viewport() {
    let source = ScriptedSource::new(PageModel::default());
    let config = ScanConfig::for_profile(Profile::Brisk).with_cycle_budget(2);
    let driver = open(&source, &config).await;

    reveal(driver.as_ref(), &config, &mut HeadingObservation::new())
        .await
        .unwrap();

    assert_eq!(source.journal().scrolls, vec![1080.0, 1080.0]);
}

#[tokio::test(start_paused = true)]
async fn test_zero_budget_touches_nothing() {
    let source = ScriptedSource::new(PageModel::default());
    let config = test_config(0);
    let driver = open(&source, &config).await;

    reveal(driver.as_ref(), &config, &mut HeadingObservation::new())
        .await
        .unwrap();

    assert_eq!(source.journal().evaluations, 0);
}

#[tokio::test(start_paused = true)]
async fn test_expand_attempts_respect_cooldown_after_click() {
    let page = PageModel {
        expand_clicks: 100,
        ..Default::default()
    };
    let source = ScriptedSource::new(page);
    let mut config = test_config(10)
        .with_settle_delay(Duration::from_millis(1000))
        .with_expand_cooldown(Duration::from_millis(3000));
    config.expand_settle_delay = Duration::from_millis(0);
    let driver = open(&source, &config).await;

    reveal(driver.as_ref(), &config, &mut HeadingObservation::new())
        .await
        .unwrap();

    // Clicks land on cycles 0, 3, 6 and 9.
    let journal = source.journal();
    assert_eq!(journal.expand_attempts, 4);
    assert_eq!(journal.expand_clicks, 4);
}

#[tokio::test(start_paused = true)]
async fn test_expand_retried_every_cycle_until_first_click() {
    let source = ScriptedSource::new(PageModel::default());
    let config = test_config(6);
    let driver = open(&source, &config).await;

    reveal(driver.as_ref(), &config, &mut HeadingObservation::new())
        .await
        .unwrap();

    assert_eq!(source.journal().expand_attempts, 6);
    assert_eq!(source.journal().expand_clicks, 0);
}

#[tokio::test(start_paused = true)]
async fn test_expand_reveals_sections_and_waits_for_render() {
    let page = PageModel {
        initially_visible: 1,
        reveal_per_expand: 1,
        expand_clicks: 1,
        ..PageModel::with_sections(vec![
            section(Some("Top charts"), vec![]),
            section(Some("Newly launched"), vec![]),
        ])
    };
    let source = ScriptedSource::new(page);
    let config = test_config(2);
    let driver = open(&source, &config).await;
    let mut headings = HeadingObservation::new();

    let start = Instant::now();
    reveal(driver.as_ref(), &config, &mut headings).await.unwrap();
    let elapsed = start.elapsed();

    // Two settles plus one post-click wait.
    assert_eq!(
        elapsed,
        config.settle_delay * 2 + config.expand_settle_delay
    );
    assert!(headings.iter().any(|h| h == "Newly launched"));
    assert_eq!(source.journal().expand_clicks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failure_propagates_without_retry() {
    let page = PageModel {
        fail_evaluation_at: Some(1),
        ..Default::default()
    };
    let source = ScriptedSource::new(page);
    let config = test_config(5);
    let driver = open(&source, &config).await;

    let err = reveal(driver.as_ref(), &config, &mut HeadingObservation::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "ServerError");
    assert_eq!(source.journal().evaluations, 2);
    assert!(source.journal().scrolls.is_empty());
}
