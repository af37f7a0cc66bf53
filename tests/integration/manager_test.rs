// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{pipeline, read, target_dir, test_settings, Behavior, FixtureCollector};
use std::sync::Arc;
use std::time::Duration;
use wlmaker::domain::models::report::{TargetPhase, TargetStatus};
use wlmaker::engines::traits::CorpusSource;
use wlmaker::workers::WorkerManager;

#[tokio::test]
async fn test_batch_completes_despite_invalid_target() {
    let base = tempfile::tempdir().unwrap();
    let pipeline = Arc::new(pipeline(
        test_settings(base.path()),
        FixtureCollector::lines(CorpusSource::Crawl, &["https://a.example.com/x?id=1"]),
        FixtureCollector::lines(CorpusSource::Archive, &[]),
        None,
    ));

    let reports = WorkerManager::new(pipeline, 2)
        .run(vec![
            "https://a.example.com".to_string(),
            "https://bad host".to_string(),
            "https://b.example.com".to_string(),
        ])
        .await;

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].input, "https://a.example.com");
    assert!(reports[0].is_done());
    assert!(matches!(
        reports[1].status,
        TargetStatus::Failed {
            phase: TargetPhase::Validating,
            ..
        }
    ));
    assert!(reports[2].is_done());
    assert_eq!(
        read(&target_dir(base.path(), "b_example_com"), "params_wordlist.txt"),
        "id"
    );
}

#[tokio::test]
async fn test_panicking_target_is_isolated() {
    let base = tempfile::tempdir().unwrap();
    let pipeline = Arc::new(pipeline(
        test_settings(base.path()),
        FixtureCollector::new(CorpusSource::Crawl, Behavior::Panic),
        FixtureCollector::lines(CorpusSource::Archive, &["https://example.com/a?q=1"]),
        None,
    ));

    let reports = WorkerManager::new(pipeline, 1)
        .run(vec![
            "https://example.com".to_string(),
            "https://bad host".to_string(),
        ])
        .await;

    assert_eq!(reports.len(), 2);
    assert!(!reports[0].is_done());
    assert_eq!(reports[0].input, "https://example.com");
    assert!(!reports[1].is_done());
}

#[tokio::test]
async fn test_pool_runs_many_targets_with_one_worker() {
    let base = tempfile::tempdir().unwrap();
    let crawl = FixtureCollector::lines(CorpusSource::Crawl, &["https://example.com/a?q=1"]);
    let pipeline = Arc::new(pipeline(
        test_settings(base.path()),
        crawl.clone(),
        FixtureCollector::lines(CorpusSource::Archive, &[]),
        None,
    ));

    let inputs: Vec<String> = (0..5).map(|i| format!("https://t{}.example.com", i)).collect();
    let reports = WorkerManager::new(pipeline, 1).run(inputs).await;

    assert!(reports.iter().all(|r| r.is_done()));
    assert_eq!(crawl.calls(), 5);
}

#[tokio::test]
async fn test_inputs_sharing_a_directory_run_one_at_a_time() {
    let base = tempfile::tempdir().unwrap();
    let crawl = FixtureCollector::with_delay(
        CorpusSource::Crawl,
        Behavior::Lines(vec!["https://example.com/login?user=1".to_string()]),
        Duration::from_millis(300),
    );
    let pipeline = Arc::new(pipeline(
        test_settings(base.path()),
        crawl.clone(),
        FixtureCollector::lines(CorpusSource::Archive, &[]),
        None,
    ));

    let reports = WorkerManager::new(pipeline, 5)
        .run(vec![
            "https://example.com".to_string(),
            "https://example.com/login".to_string(),
        ])
        .await;

    assert!(reports.iter().all(|r| r.is_done()));
    assert_eq!(reports[0].key.as_deref(), Some("example_com"));
    assert_eq!(reports[1].key.as_deref(), Some("example_com"));
    // The second input finds the first one's corpus and reuses it
    assert_eq!(crawl.calls(), 1);
    assert_eq!(crawl.max_in_flight(), 1);
    assert_eq!(
        read(&target_dir(base.path(), "example_com"), "params_wordlist.txt"),
        "user"
    );
}

#[tokio::test]
async fn test_distinct_directories_still_run_in_parallel() {
    let base = tempfile::tempdir().unwrap();
    let crawl = FixtureCollector::with_delay(
        CorpusSource::Crawl,
        Behavior::Lines(vec!["https://example.com/a?q=1".to_string()]),
        Duration::from_millis(200),
    );
    let pipeline = Arc::new(pipeline(
        test_settings(base.path()),
        crawl.clone(),
        FixtureCollector::lines(CorpusSource::Archive, &[]),
        None,
    ));

    let reports = WorkerManager::new(pipeline, 2)
        .run(vec![
            "https://a.example.com".to_string(),
            "https://b.example.com".to_string(),
        ])
        .await;

    assert!(reports.iter().all(|r| r.is_done()));
    assert_eq!(crawl.calls(), 2);
    assert_eq!(crawl.max_in_flight(), 2);
}
