//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end through the HTTP engine.

use linkwalk::config::{parse_config, Config};
use linkwalk::crawler::run_crawl;
use linkwalk::output::{load_statistics, RunStatus};
use linkwalk::{LinkState, LinkwalkError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration from extra TOML appended to the crawler table
fn create_test_config(seeds: &[String], max_links: usize, extra: &str) -> Config {
    let seeds = seeds
        .iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ");
    let toml = format!(
        r#"
[crawler]
seeds = [{}]
max-links = {}
navigation-timeout = 5000
wait-until = "load"

{}
"#,
        seeds, max_links, extra
    );
    parse_config(&toml).expect("test config should be valid")
}

/// Mounts an HTML page at `route`
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

fn links_page(hrefs: &[String]) -> String {
    let anchors: String = hrefs
        .iter()
        .enumerate()
        .map(|(i, href)| format!(r#"<a href="{}">Link {}</a>"#, href, i))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

#[tokio::test]
async fn test_end_to_end_with_broken_link() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><body>
            <a href="{0}/a">About</a>
            <a href="/missing">Missing page</a>
            </body></html>"#,
            base
        ),
    )
    .await;
    mount_page(&server, "/a", "<html><body>About</body></html>".to_string()).await;
    // "/missing" is not mounted: wiremock answers 404

    let config = create_test_config(&[format!("{}/", base)], 5, "");
    let outcome = run_crawl(config, "test").await.unwrap();

    assert_eq!(outcome.verdict.total_checked, 3);
    assert_eq!(outcome.verdict.total_broken, 1);

    let entries = outcome.report.entries();
    assert_eq!(entries[0].state(), LinkState::Succeeded);
    assert_eq!(entries[1].url(), format!("{}/a", base));
    assert_eq!(entries[2].url(), format!("{}/missing", base));
    assert_eq!(entries[2].status_code(), Some(404));
    assert_eq!(entries[2].anchor_text(), Some("Missing page"));
    assert_eq!(
        entries[2].failure_reason(),
        Some("Status code: 404 Not Found")
    );

    let err = outcome.verdict.into_result().unwrap_err();
    assert!(matches!(err, LinkwalkError::BrokenLinks { count: 1, .. }));
}

#[tokio::test]
async fn test_breadth_first_across_seeds() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/a", links_page(&[format!("{}/a1", base)])).await;
    mount_page(&server, "/b", links_page(&[format!("{}/b1", base)])).await;
    mount_page(&server, "/a1", links_page(&[])).await;
    mount_page(&server, "/b1", links_page(&[])).await;

    let config = create_test_config(&[format!("{}/a", base), format!("{}/b", base)], 10, "");
    let outcome = run_crawl(config, "test").await.unwrap();

    let urls: Vec<String> = outcome
        .report
        .entries()
        .iter()
        .map(|l| l.url().trim_start_matches(&base).to_string())
        .collect();
    assert_eq!(urls, vec!["/a", "/b", "/a1", "/b1"]);
    assert!(outcome.verdict.passed());
}

#[tokio::test]
async fn test_discovery_cap_limits_checked_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    let hrefs: Vec<String> = (0..10).map(|i| format!("{}/p{}", base, i)).collect();
    mount_page(&server, "/", links_page(&hrefs)).await;
    for i in 0..10 {
        mount_page(&server, &format!("/p{}", i), links_page(&[])).await;
    }

    let config = create_test_config(&[format!("{}/", base)], 3, "");
    let outcome = run_crawl(config, "test").await.unwrap();

    assert_eq!(outcome.verdict.total_checked, 3);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_self_links_are_checked_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        links_page(&[
            format!("{}/", base),
            format!("{}/#top", base),
            "/".to_string(),
            format!("{}/a", base),
        ]),
    )
    .await;
    mount_page(&server, "/a", links_page(&[format!("{}/", base)])).await;

    let config = create_test_config(&[format!("{}/", base)], 50, "");
    let outcome = run_crawl(config, "test").await.unwrap();

    assert_eq!(outcome.verdict.total_checked, 2);
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    mount_page(&server, "/new", links_page(&[])).await;

    let config = create_test_config(&[format!("{}/old", base)], 5, "");
    let outcome = run_crawl(config, "test").await.unwrap();

    let entry = &outcome.report.entries()[0];
    assert_eq!(entry.url(), format!("{}/old", base));
    assert_eq!(entry.status_code(), Some(200));
    assert!(outcome.verdict.passed());
}

#[tokio::test]
async fn test_domain_enforcement_rejects_off_domain_documents() {
    let server = MockServer::start().await;
    let port = server.address().port();
    let base = format!("http://127.0.0.1:{}", port);
    let off_domain = format!("http://localhost:{}/elsewhere", port);

    mount_page(&server, "/", links_page(&[off_domain.clone()])).await;
    mount_page(&server, "/elsewhere", links_page(&[])).await;

    let config = create_test_config(
        &[format!("{}/", base)],
        5,
        "[domain]\nenforce = true\nallow = \"127.0.0.1\"\nmode = \"reject\"\n",
    );
    let outcome = run_crawl(config, "test").await.unwrap();

    assert_eq!(outcome.verdict.total_checked, 2);
    assert_eq!(outcome.verdict.total_broken, 1);
    let rejected = &outcome.report.entries()[1];
    assert_eq!(rejected.url(), off_domain);
    assert_eq!(rejected.state(), LinkState::Errored);
    assert!(rejected
        .failure_reason()
        .unwrap()
        .contains("aborted by the request policy"));
}

#[tokio::test]
async fn test_domain_observe_mode_lets_documents_through() {
    let server = MockServer::start().await;
    let port = server.address().port();
    let base = format!("http://127.0.0.1:{}", port);

    mount_page(
        &server,
        "/",
        links_page(&[format!("http://localhost:{}/elsewhere", port)]),
    )
    .await;
    mount_page(&server, "/elsewhere", links_page(&[])).await;

    let config = create_test_config(
        &[format!("{}/", base)],
        5,
        "[domain]\nenforce = true\nallow = \"127.0.0.1\"\nmode = \"observe\"\n",
    );
    let outcome = run_crawl(config, "test").await.unwrap();

    assert_eq!(outcome.verdict.total_checked, 2);
    assert!(outcome.verdict.passed());
}

#[tokio::test]
async fn test_unreachable_link_is_errored() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", links_page(&["http://127.0.0.1:1/".to_string()])).await;

    let config = create_test_config(&[format!("{}/", base)], 5, "");
    let outcome = run_crawl(config, "test").await.unwrap();

    let unreachable = &outcome.report.entries()[1];
    assert_eq!(unreachable.state(), LinkState::Errored);
    assert_eq!(unreachable.status_code(), None);
    assert_eq!(outcome.verdict.total_broken, 1);
}

#[tokio::test]
async fn test_reports_written_to_configured_outputs() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let summary = dir.path().join("report.md");
    let database = dir.path().join("linkwalk.db");

    mount_page(&server, "/", links_page(&["/gone".to_string()])).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let config = create_test_config(
        &[format!("{}/", base)],
        5,
        &format!(
            "[output]\nsummary-path = \"{}\"\ndatabase-path = \"{}\"\n",
            summary.display(),
            database.display()
        ),
    );
    let outcome = run_crawl(config, "hash-123").await.unwrap();
    assert_eq!(outcome.verdict.total_broken, 1);

    let markdown = std::fs::read_to_string(&summary).unwrap();
    assert!(markdown.contains("- **Links Checked**: 2"));
    assert!(markdown.contains("Status code: 410 Gone"));
    assert!(markdown.contains("**FAIL**"));

    let stats = load_statistics(&database).unwrap();
    assert_eq!(stats.config_hash, "hash-123");
    assert_eq!(stats.status, RunStatus::Failed);
    assert_eq!(stats.total_checked, 2);
    assert_eq!(stats.failures.len(), 1);
}

#[tokio::test]
async fn test_destination_screenshots_stored() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let shots = dir.path().join("shots");

    mount_page(&server, "/", links_page(&[])).await;

    let config = create_test_config(
        &[format!("{}/", base)],
        5,
        &format!(
            "[screenshots]\ndestination-success = true\ndirectory = \"{}\"\n",
            shots.display()
        ),
    );
    let outcome = run_crawl(config, "test").await.unwrap();

    let entry = &outcome.report.entries()[0];
    assert_eq!(entry.screenshots().len(), 1);
    let stored = std::fs::read_to_string(entry.screenshots()[0].as_str()).unwrap();
    assert!(stored.contains("<html>"));
}
