// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{pipeline, read, target_dir, test_settings, Behavior, FixtureCollector};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wlmaker::domain::models::category::Category;
use wlmaker::domain::models::output::OutputFormat;
use wlmaker::domain::models::report::{TargetPhase, TargetStatus};
use wlmaker::engines::reqwest_engine::ReqwestFetcher;
use wlmaker::engines::traits::{CorpusSource, PageFetcher};

const CRAWL_LINES: &[&str] = &[
    "https://example.com/api/v1/users?id=1&sort=asc#top",
    "https://example.com/static/app.js",
];
const ARCHIVE_LINES: &[&str] = &["https://old.example.com/login.php?next=/home"];

#[tokio::test]
async fn test_target_runs_through_every_phase() {
    let base = tempfile::tempdir().unwrap();
    let crawl = FixtureCollector::lines(CorpusSource::Crawl, CRAWL_LINES);
    let archive = FixtureCollector::lines(CorpusSource::Archive, ARCHIVE_LINES);
    let pipeline = pipeline(test_settings(base.path()), crawl.clone(), archive.clone(), None);

    let report = pipeline.run("https://example.com").await;

    assert_eq!(report.status, TargetStatus::Done);
    assert_eq!(report.key.as_deref(), Some("example_com"));
    assert_eq!(report.counts[&Category::QueryParameter], 3);
    assert_eq!(report.artifacts_failed, 0);
    assert_eq!(crawl.calls(), 1);
    assert_eq!(archive.calls(), 1);

    let dir = target_dir(base.path(), "example_com");
    assert_eq!(read(&dir, "params_wordlist.txt"), "id\nnext\nsort");
    assert_eq!(
        read(&dir, "subdomains_wordlist.txt"),
        "example.com\nold.example.com"
    );
    assert_eq!(read(&dir, "api_endpoints.txt"), "users");
    assert_eq!(read(&dir, "fragments.txt"), "top");
    assert_eq!(
        read(&dir, "static_files.txt"),
        "https://example.com/static/app.js"
    );
    assert!(read(&dir, "summary.txt").contains("Parameters found: 3"));
    assert!(dir.join("crawl_output.txt").exists());
    assert!(dir.join("archive_output.txt").exists());
}

#[tokio::test]
async fn test_existing_corpora_are_reused() {
    let base = tempfile::tempdir().unwrap();
    let dir = target_dir(base.path(), "example_com");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("crawl_output.txt"), CRAWL_LINES.join("\n")).unwrap();
    std::fs::write(dir.join("archive_output.txt"), ARCHIVE_LINES.join("\n")).unwrap();

    let crawl = FixtureCollector::lines(CorpusSource::Crawl, &["https://example.com/other?x=1"]);
    let archive = FixtureCollector::lines(CorpusSource::Archive, &[]);
    let pipeline = pipeline(test_settings(base.path()), crawl.clone(), archive.clone(), None);

    let report = pipeline.run("https://example.com").await;

    assert!(report.is_done());
    assert_eq!(crawl.calls(), 0);
    assert_eq!(archive.calls(), 0);
    assert_eq!(read(&dir, "params_wordlist.txt"), "id\nnext\nsort");
}

#[tokio::test]
async fn test_invalid_target_fails_validation_without_output() {
    let base = tempfile::tempdir().unwrap();
    let crawl = FixtureCollector::lines(CorpusSource::Crawl, CRAWL_LINES);
    let archive = FixtureCollector::lines(CorpusSource::Archive, ARCHIVE_LINES);
    let pipeline = pipeline(test_settings(base.path()), crawl.clone(), archive, None);

    let report = pipeline.run("https://not a host").await;

    match &report.status {
        TargetStatus::Failed { phase, .. } => assert_eq!(*phase, TargetPhase::Validating),
        other => panic!("expected validation failure, got {:?}", other),
    }
    assert!(report.key.is_none());
    assert_eq!(crawl.calls(), 0);
    assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_failed_source_is_treated_as_empty() {
    let base = tempfile::tempdir().unwrap();
    let crawl = FixtureCollector::new(CorpusSource::Crawl, Behavior::Fail);
    let archive = FixtureCollector::lines(CorpusSource::Archive, ARCHIVE_LINES);
    let pipeline = pipeline(test_settings(base.path()), crawl.clone(), archive, None);

    let report = pipeline.run("https://example.com").await;

    assert!(report.is_done());
    assert_eq!(crawl.calls(), 1);
    let dir = target_dir(base.path(), "example_com");
    assert!(!dir.join("crawl_output.txt").exists());
    assert_eq!(read(&dir, "params_wordlist.txt"), "next");
}

#[tokio::test]
async fn test_all_formats_are_written() {
    let base = tempfile::tempdir().unwrap();
    let mut settings = test_settings(base.path());
    settings.output.format = OutputFormat::All;
    let pipeline = pipeline(
        settings,
        FixtureCollector::lines(CorpusSource::Crawl, CRAWL_LINES),
        FixtureCollector::lines(CorpusSource::Archive, ARCHIVE_LINES),
        None,
    );

    let report = pipeline.run("https://example.com").await;

    // 3 classification-time lists + 7 categories x 3 encodings + summary
    assert_eq!(report.artifacts_written, 25);
    let dir = target_dir(base.path(), "example_com");
    let params: Vec<String> =
        serde_json::from_str(&read(&dir, "params_wordlist.json")).unwrap();
    assert_eq!(params, vec!["id", "next", "sort"]);
    assert!(read(&dir, "api_endpoints.xml").contains("<item>users</item>"));
}

#[tokio::test]
async fn test_rerun_produces_identical_output() {
    let base = tempfile::tempdir().unwrap();
    let make = || {
        pipeline(
            test_settings(base.path()),
            FixtureCollector::lines(CorpusSource::Crawl, CRAWL_LINES),
            FixtureCollector::lines(CorpusSource::Archive, ARCHIVE_LINES),
            None,
        )
    };
    let dir = target_dir(base.path(), "example_com");

    make().run("https://example.com").await;
    let first = read(&dir, "directories_wordlist.txt");
    make().run("https://example.com").await;

    assert_eq!(first, read(&dir, "directories_wordlist.txt"));
}

#[tokio::test]
async fn test_enrichment_adds_post_params_and_script_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<form method="post"><input name="username"><input name="password"></form>
               <script>fetch('/api/session')</script>"#,
        ))
        .mount(&server)
        .await;

    let base = tempfile::tempdir().unwrap();
    let mut settings = test_settings(base.path());
    settings.enrichment.enabled = true;
    let fetcher: Arc<dyn PageFetcher> =
        Arc::new(ReqwestFetcher::new(&settings.request, &settings.enrichment).unwrap());

    let login = format!("{}/login", server.uri());
    let pipeline = pipeline(
        settings,
        FixtureCollector::lines(CorpusSource::Crawl, &[login.as_str(), "# comment", ""]),
        FixtureCollector::lines(CorpusSource::Archive, &[]),
        Some(fetcher),
    );

    let report = pipeline.run(&server.uri()).await;

    assert!(report.is_done());
    let key = report.key.clone().unwrap();
    let dir = target_dir(base.path(), &key);
    assert_eq!(read(&dir, "post_params_wordlist.txt"), "password\nusername");
    assert_eq!(
        read(&dir, "discovered_endpoints.txt"),
        format!("{}/api/session", server.uri())
    );
}
