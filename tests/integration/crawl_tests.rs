//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full fetch, parse and download cycle end-to-end.

use link_harvester::config::{CrawlerConfig, HttpConfig};
use link_harvester::crawler::{fetch_and_save, CrawlTarget, Crawler, DownloadOutcome};
use link_harvester::{Config, HarvestError, TransferError};
use reqwest::Client;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, extension: &str, download_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            file_extension: extension.to_string(),
            download_dir: download_dir.to_path_buf(),
            max_concurrent_downloads: 4,
        },
        http: HttpConfig {
            user_agent: "TestHarvester/1.0".to_string(),
            timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        archive: None,
    }
}

async fn mount_page(server: &MockServer, page_path: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, file_path: &str, body: &[u8], expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_downloads_matching_files() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let download_dir = temp_dir.path().join("downloads");

    mount_page(
        &mock_server,
        "/files.html",
        r#"<html><body>
            <a href="/files/game1.pgn">Game 1</a>
            <a href="/files/notes.txt">Notes</a>
            <a href="archive.zip">Archive</a>
            <a href="game2.pgn">Game 2</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_file(&mock_server, "/files/game1.pgn", b"1. e4 e5 2. Nf3", 1).await;
    mount_file(&mock_server, "/game2.pgn", b"1. d4 d5", 1).await;
    mount_file(&mock_server, "/files/notes.txt", b"notes", 0).await;
    mount_file(&mock_server, "/archive.zip", b"PK", 0).await;

    let config = create_test_config(
        &format!("{}/files.html", mock_server.uri()),
        ".pgn",
        &download_dir,
    );
    let report = Crawler::new(&config).unwrap().run().await.unwrap();

    assert_eq!(report.links_found, 2);
    assert_eq!(report.downloaded.len(), 2);
    assert!(report.failures.is_empty());
    assert_eq!(
        std::fs::read(download_dir.join("game1.pgn")).unwrap(),
        b"1. e4 e5 2. Nf3"
    );
    assert_eq!(
        std::fs::read(download_dir.join("game2.pgn")).unwrap(),
        b"1. d4 d5"
    );
    assert!(!download_dir.join("notes.txt").exists());
}

#[tokio::test]
async fn test_second_run_transfers_nothing() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/a.pgn">A</a><a href="/b.pgn">B</a>"#.to_string(),
    )
    .await;
    // Each file is fetched once across both runs
    mount_file(&mock_server, "/a.pgn", b"a", 1).await;
    mount_file(&mock_server, "/b.pgn", b"b", 1).await;

    let config = create_test_config(&mock_server.uri(), ".pgn", temp_dir.path());
    let crawler = Crawler::new(&config).unwrap();

    let first = crawler.run().await.unwrap();
    assert_eq!(first.downloaded.len(), 2);

    let second = crawler.run().await.unwrap();
    assert!(second.downloaded.is_empty());
    assert_eq!(second.skipped, 2);
}

#[tokio::test]
async fn test_failed_download_does_not_affect_siblings() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/list",
        r#"<a href="/ok1.pgn">1</a><a href="/missing.pgn">x</a><a href="/ok2.pgn">2</a>"#
            .to_string(),
    )
    .await;
    mount_file(&mock_server, "/ok1.pgn", b"one", 1).await;
    mount_file(&mock_server, "/ok2.pgn", b"two", 1).await;
    Mock::given(method("GET"))
        .and(path("/missing.pgn"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        &format!("{}/list", mock_server.uri()),
        ".pgn",
        temp_dir.path(),
    );
    let report = Crawler::new(&config).unwrap().run().await.unwrap();

    assert_eq!(report.downloaded.len(), 2);
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert_eq!(
        failure.requested_url,
        format!("{}/missing.pgn", mock_server.uri())
    );
    assert_eq!(failure.desired_path, temp_dir.path().join("missing.pgn"));
    assert!(!temp_dir.path().join("missing.pgn").exists());
    assert!(temp_dir.path().join("ok1.pgn").exists());
    assert!(temp_dir.path().join("ok2.pgn").exists());
}

#[tokio::test]
async fn test_duplicate_links_write_once() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/dup.pgn">1</a><a href="/dup.pgn">2</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/dup.pgn"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"same".to_vec()))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), ".pgn", temp_dir.path());
    let report = Crawler::new(&config).unwrap().run().await.unwrap();

    assert_eq!(report.links_found, 2);
    assert_eq!(report.downloaded.len() + report.skipped, 2);
    assert_eq!(report.downloaded.len(), 1);
    assert!(report.failures.is_empty());
    assert_eq!(std::fs::read(temp_dir.path().join("dup.pgn")).unwrap(), b"same");
}

#[tokio::test]
async fn test_empty_base_page_downloads_nothing() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", String::new()).await;

    let config = create_test_config(&mock_server.uri(), ".pgn", temp_dir.path());
    let report = Crawler::new(&config).unwrap().run().await.unwrap();

    assert_eq!(report.links_found, 0);
    assert!(report.downloaded.is_empty());
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_base_page_error_is_fatal() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/files.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let base_url = format!("{}/files.html", mock_server.uri());
    let config = create_test_config(&base_url, ".pgn", temp_dir.path());
    let result = Crawler::new(&config).unwrap().run().await;

    match result {
        Err(HarvestError::Fetch(e)) => assert_eq!(e.requested_url, base_url),
        other => panic!("expected fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_and_save_is_idempotent() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    mount_file(&mock_server, "/games/game1.pgn", b"1. c4", 1).await;

    let client = Client::new();
    let url = Url::parse(&format!("{}/games/game1.pgn", mock_server.uri())).unwrap();

    let first = fetch_and_save(&client, &url, temp_dir.path(), ".pgn")
        .await
        .unwrap();
    assert_eq!(
        first,
        DownloadOutcome::Downloaded {
            path: temp_dir.path().join("game1.pgn"),
            bytes: 5
        }
    );

    let second = fetch_and_save(&client, &url, temp_dir.path(), ".pgn")
        .await
        .unwrap();
    assert_eq!(
        second,
        DownloadOutcome::AlreadyPresent {
            path: temp_dir.path().join("game1.pgn")
        }
    );
}

#[tokio::test]
async fn test_fetch_and_save_unfiltered_url_makes_no_request() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    mount_file(&mock_server, "/notes.txt", b"notes", 0).await;

    let client = Client::new();
    let url = Url::parse(&format!("{}/notes.txt", mock_server.uri())).unwrap();

    let outcome = fetch_and_save(&client, &url, temp_dir.path(), ".pgn")
        .await
        .unwrap();

    assert!(matches!(outcome, DownloadOutcome::SuffixMismatch { .. }));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_fetch_and_save_write_failure() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    mount_file(&mock_server, "/game.pgn", b"1. e4", 1).await;

    let client = Client::new();
    let url = Url::parse(&format!("{}/game.pgn", mock_server.uri())).unwrap();
    let missing_dir = temp_dir.path().join("does-not-exist");

    let err = fetch_and_save(&client, &url, &missing_dir, ".pgn")
        .await
        .unwrap_err();

    assert_eq!(err.desired_path, missing_dir.join("game.pgn"));
    assert!(matches!(err.source, TransferError::Io(_)));
    assert!(err.to_string().contains("Path:"));
}

#[tokio::test]
async fn test_fetch_and_save_unusable_target_dir() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    mount_file(&mock_server, "/game.pgn", b"1. e4", 1).await;

    // A regular file where the directory should be: the existence check
    // cannot answer, and the write must still fail with the full context
    let not_a_dir = temp_dir.path().join("downloads");
    std::fs::write(&not_a_dir, b"").unwrap();

    let client = Client::new();
    let url = Url::parse(&format!("{}/game.pgn", mock_server.uri())).unwrap();

    let err = fetch_and_save(&client, &url, &not_a_dir, ".pgn")
        .await
        .unwrap_err();

    assert_eq!(err.requested_url, url.as_str());
    assert_eq!(err.desired_path, not_a_dir.join("game.pgn"));
    assert!(matches!(err.source, TransferError::Io(_)));
}

#[tokio::test]
async fn test_crawler_with_shared_client() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        (1..=10)
            .map(|i| format!(r#"<a href="/g{}.pgn">{}</a>"#, i, i))
            .collect::<String>(),
    )
    .await;
    for i in 1..=10 {
        mount_file(&mock_server, &format!("/g{}.pgn", i), b"game", 1).await;
    }

    let target = CrawlTarget {
        base_url: Url::parse(&mock_server.uri()).unwrap(),
        file_extension: ".pgn".to_string(),
        download_dir: temp_dir.path().to_path_buf(),
    };
    let crawler = Crawler::with_client(target, Client::new(), 2);
    let report = crawler.run().await.unwrap();

    assert_eq!(report.downloaded.len(), 10);
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 10);
}

/// Responds after a fixed delay and records when each request arrived
struct DelayedRecorder {
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for DelayedRecorder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_bytes(b"game".to_vec())
            .set_delay(self.delay)
    }
}

#[tokio::test]
async fn test_download_concurrency_is_capped() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let delay = Duration::from_millis(200);
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    mount_page(
        &mock_server,
        "/",
        (1..=6)
            .map(|i| format!(r#"<a href="/g{}.pgn">{}</a>"#, i, i))
            .collect::<String>(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/g\d+\.pgn$"))
        .respond_with(DelayedRecorder {
            delay,
            arrivals: Arc::clone(&arrivals),
        })
        .expect(6)
        .mount(&mock_server)
        .await;

    let target = CrawlTarget {
        base_url: Url::parse(&mock_server.uri()).unwrap(),
        file_extension: ".pgn".to_string(),
        download_dir: temp_dir.path().to_path_buf(),
    };
    let report = Crawler::with_client(target, Client::new(), 2)
        .run()
        .await
        .unwrap();
    assert_eq!(report.downloaded.len(), 6);

    // With at most two requests in flight, a third can only start once one of
    // the two before it has been answered, so any three consecutive arrivals
    // span at least one response delay
    let mut arrivals = arrivals.lock().unwrap().clone();
    arrivals.sort();
    assert_eq!(arrivals.len(), 6);
    let tolerance = Duration::from_millis(20);
    for window in arrivals.windows(3) {
        assert!(
            window[2].duration_since(window[0]) + tolerance >= delay,
            "three downloads overlapped: {:?}",
            window[2].duration_since(window[0])
        );
    }
}
