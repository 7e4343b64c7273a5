//! Integration tests for the watcher
//!
//! These tests use wiremock to serve listing pages and a Slack webhook and
//! run full watch cycles against a temporary database.

use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use workana_watch::config::{Config, SelectorConfig};
use workana_watch::notify::{Notifier, NotifyError, SlackNotifier};
use workana_watch::scrape::{run_watch, HttpPageFetcher, ListingSelectors, WatchOptions};
use workana_watch::storage::{JobStore, SqliteStorage};
use workana_watch::{FetchError, JobRecord, PageFetcher, StopReason};

/// Builds one listing page with the given `(id, client, title)` jobs
fn listing_page(jobs: &[(&str, &str, &str)], total_pages: u32) -> String {
    let items: String = jobs
        .iter()
        .map(|(id, client, title)| {
            format!(
                r#"<div class="project-item" data-project-id="{id}">
                    <h2 class="project-title"><a href="/job/{id}">{title}</a></h2>
                    <div class="budget"><span class="values">USD 100 - 250</span></div>
                    <span class="author-info"><a href="/client/{id}">{client}</a></span>
                    <span class="country-name">Brazil</span>
                    <span class="payment-verified"></span>
                </div>"#
            )
        })
        .collect();

    let pages: String = (1..=total_pages)
        .map(|n| format!(r#"<li><a href="?page={n}">{n}</a></li>"#))
        .collect();

    format!(
        r#"<html><body>
            <div id="projects">{items}</div>
            <ul class="pagination">{pages}<li><a href="?page=2">Next</a></li></ul>
        </body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(server_uri: &str, db_path: &str, per_job: bool) -> Config {
    toml::from_str(&format!(
        r#"
        [scraper]
        base-url = '{server_uri}'
        delay-between-requests-ms = 0
        random-delay-max-ms = 0
        page-load-timeout-secs = 5

        [storage]
        database-path = '{db_path}'

        [notify]
        slack-webhook-url = '{server_uri}/services/hook'
        per-job = {per_job}
        "#
    ))
    .expect("test config parses")
}

#[tokio::test]
async fn test_first_run_then_incremental_run() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jobs.db");

    // Page 2 is mounted first so it takes precedence over the page 1 catch-all
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("page", "2"))
        .respond_with(html(listing_page(&[("J1", "Acme", "Fix a bug")], 2)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("category", "it-programming"))
        .respond_with(html(listing_page(
            &[("J3", "Gamma", "Build an API"), ("J2", "Beta", "Design a logo")],
            2,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/services/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &db_path.display().to_string(), true);

    // First run walks both pages
    let first = run_watch(&config, "hash", &WatchOptions::default())
        .await
        .expect("first run succeeds");

    assert_eq!(first.inserted, 3);
    assert!(first.notified);
    assert_eq!(first.result.pages_scraped, 2);
    assert_eq!(first.result.stop_reason, StopReason::LastPage);

    let job = &first.result.jobs[0];
    assert_eq!(job.id, "J3");
    assert_eq!(job.client_name, "Gamma");
    assert_eq!(job.title, "Build an API");
    assert_eq!(job.url, format!("{}/job/J3", mock_server.uri()));
    assert_eq!(job.budget, "USD 100 - 250");
    assert_eq!(job.client_country, "Brazil");
    assert!(job.client_payment_verified);

    // Second run stops at the first listing, which is now known
    let second = run_watch(&config, "hash", &WatchOptions::default())
        .await
        .expect("second run succeeds");

    assert!(second.result.found_known_job);
    assert_eq!(second.result.stop_reason, StopReason::FoundKnownJob { page: 1 });
    assert_eq!(second.inserted, 0);
    assert!(!second.notified);

    let listing_requests = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/jobs")
        .count();
    assert_eq!(listing_requests, 3);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_jobs().unwrap(), 3);
    assert_eq!(storage.count_runs().unwrap(), 2);
}

#[tokio::test]
async fn test_backfill_without_notifications() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jobs.db");

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(html(listing_page(&[("J1", "Acme", "Fix a bug")], 1)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/services/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &db_path.display().to_string(), true);
    let options = WatchOptions {
        backfill: true,
        max_pages: None,
        notify: false,
    };

    let report = run_watch(&config, "hash", &options).await.unwrap();
    assert_eq!(report.inserted, 1);

    // A backfill run does not stop at known jobs
    let again = run_watch(&config, "hash", &options).await.unwrap();
    assert!(!again.result.found_known_job);
    assert_eq!(again.result.scraped_count, 1);
    assert_eq!(again.inserted, 0);
}

#[tokio::test]
async fn test_unreachable_listing_records_empty_run() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jobs.db");

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &db_path.display().to_string(), false);
    let report = run_watch(&config, "hash", &WatchOptions::default())
        .await
        .unwrap();

    assert!(report.result.is_empty());
    assert!(!report.result.found_known_job);
    match &report.result.stop_reason {
        StopReason::Aborted { page, error } => {
            assert_eq!(*page, 1);
            assert!(matches!(error, FetchError::Status { status: 503, .. }));
        }
        other => panic!("unexpected stop reason: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetcher_classifies_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(html(listing_page(&[], 1)).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let selectors = ListingSelectors::from_config(&SelectorConfig::default()).unwrap();
    let fetcher = HttpPageFetcher::new(client, selectors);

    let url = format!("{}/jobs", mock_server.uri());
    let err = fetcher.fetch(&url).await.unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
    assert_eq!(err.url(), url);
}

#[tokio::test]
async fn test_fetcher_reports_missing_container() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(html("<html><body>Please verify you are human</body></html>".to_string()))
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new(
        reqwest::Client::new(),
        ListingSelectors::from_config(&SelectorConfig::default()).unwrap(),
    );

    let err = fetcher
        .fetch(&format!("{}/jobs", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::ContainerMissing { .. }));
}

fn sample_jobs(count: usize) -> Vec<JobRecord> {
    (1..=count)
        .map(|i| JobRecord {
            id: format!("J{}", i),
            client_name: "Acme".to_string(),
            title: format!("Job {}", i),
            url: format!("https://www.workana.com/job/job-{}", i),
            budget: "USD 1,000".to_string(),
            client_country: "Chile".to_string(),
            client_payment_verified: i % 2 == 0,
        })
        .collect()
}

#[tokio::test]
async fn test_slack_digest_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let notifier = SlackNotifier::new(format!("{}/hook", mock_server.uri()), false).unwrap();
    notifier.notify_new_jobs(&sample_jobs(12), 40).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(body["text"], "Found 12 new job(s) on Workana");
    let blocks = body["blocks"].as_array().unwrap();
    assert_eq!(blocks[0]["type"], "header");
    assert_eq!(blocks[blocks.len() - 1]["type"], "context");
}

#[tokio::test]
async fn test_slack_per_job_messages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let notifier = SlackNotifier::new(format!("{}/hook", mock_server.uri()), true).unwrap();
    notifier.notify_new_jobs(&sample_jobs(2), 2).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    let block = &body["blocks"][0];

    let text = block["text"]["text"].as_str().unwrap();
    assert!(text.contains("Job 2"));
    assert!(text.contains("Budget: USD *1,000* : ✅"));
    assert_eq!(block["accessory"]["text"]["text"], "Open Job");
}

#[tokio::test]
async fn test_slack_rejection_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(403).set_body_string("invalid_token"))
        .mount(&mock_server)
        .await;

    let webhook = format!("{}/hook", mock_server.uri());

    let digest = SlackNotifier::new(webhook.clone(), false).unwrap();
    match digest.notify_new_jobs(&sample_jobs(1), 1).await {
        Err(NotifyError::Rejected { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "invalid_token");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let per_job = SlackNotifier::new(webhook, true).unwrap();
    assert!(matches!(
        per_job.notify_new_jobs(&sample_jobs(3), 3).await,
        Err(NotifyError::Partial { failed: 3, total: 3 })
    ));
}
