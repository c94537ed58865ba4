//! Integration tests for the crawler
//!
//! The HTTP path runs against wiremock servers. The example.org scenarios
//! use an in-memory site behind the same fetcher traits.

use async_trait::async_trait;
use corpus_crawler::config::Config;
use corpus_crawler::crawler::{run_pipeline, AssetFetcher, Coordinator, HttpFetcher, PageFetcher};
use corpus_crawler::{CrawlStatus, DomainStateStore, EventRecord, FetchError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted in `dir`
///
/// No delays, and a keyword without digits so the mock server's port can
/// never make a URL relevant by accident.
fn create_test_config(dir: &Path) -> Config {
    let mut config: Config = toml::from_str(&format!(
        r#"
[crawler]
politeness-delay = 0
render-settle-delay = 0
fetch-timeout = 5
renderer = "http"

[relevance]
keywords = ["congress"]

[output]
input-path = "{root}/congres_enrichis.json"
directory = "{root}/corpus"
aggregate-path = "{root}/congres_enrichis_avec_pages.json"
error-log = "{root}/erreurs.log"
"#,
        root = dir.display()
    ))
    .expect("Failed to parse test config");
    config.crawler.max_pages = 50;
    config
}

fn html_page(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">{}</a>"#, l, l))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><p>{}</p>{}</body></html>",
        title, body, anchors
    )
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("Failed to read JSON file");
    serde_json::from_str(&content).expect("Invalid JSON")
}

fn read_visited(config: &Config, domain: &str) -> Vec<String> {
    let path = PathBuf::from(&config.output.directory)
        .join(domain)
        .join("pages_visitées.json");
    serde_json::from_value(read_json(&path)).expect("Visited set is not a list of strings")
}

/// In-memory web: known pages and assets, everything else times out
#[derive(Default)]
struct FakeWeb {
    pages: HashMap<String, String>,
    assets: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeWeb {
    fn page(mut self, url: &str, title: &str, links: &[&str]) -> Self {
        self.pages
            .insert(url.to_string(), html_page(title, title, links));
        self
    }

    fn raw_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    fn asset(mut self, url: &str, bytes: &[u8]) -> Self {
        self.assets.insert(url.to_string(), bytes.to_vec());
        self
    }

    fn requested(&self, url: &str) -> bool {
        self.requests.lock().unwrap().iter().any(|r| r == url)
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for FakeWeb {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Timeout {
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl AssetFetcher for FakeWeb {
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.assets.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

#[tokio::test]
async fn test_full_pipeline_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let domain = base_url.trim_start_matches("http://").to_string();

    Mock::given(method("GET"))
        .and(path("/congress"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page(
                    "Annual Congress",
                    "Welcome to the annual congress",
                    &[
                        "/team",
                        "/congress/programme.pdf",
                        "/congress-poster.png",
                        "https://other.org/x",
                    ],
                ))
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/team"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Our team", "People", &["/congress/venue"]))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/congress/venue"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Venue", "Lyon", &["/congress"]))
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/congress/programme.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.7 programme".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // Images are never fetched
    Mock::given(method("GET"))
        .and(path("/congress-poster.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 16]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path());
    std::fs::write(
        &config.output.input_path,
        format!(
            r#"[{{"nom": "Annual Congress", "ville": "Lyon", "lien": "{}/congress"}}]"#,
            base_url
        ),
    )
    .unwrap();

    let http = HttpFetcher::new(&config.crawler).expect("Failed to build client");
    let summary = run_pipeline(&config, &http, &http, false)
        .await
        .expect("Pipeline failed");

    assert_eq!(summary.events_crawled, 1);
    assert_eq!(summary.exhausted, 1);
    assert_eq!(summary.totals.pages_kept, 2);
    assert_eq!(summary.totals.pages_filtered, 1);
    assert_eq!(summary.totals.assets_downloaded, 1);

    // Aggregate keeps upstream fields and lists kept pages in fetch order
    let aggregate = read_json(Path::new(&config.output.aggregate_path));
    let event = &aggregate[0];
    assert_eq!(event["nom"], "Annual Congress");
    assert_eq!(event["ville"], "Lyon");
    let pages = event["pages_liées"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["url"], format!("{}/congress", base_url));
    assert_eq!(pages[0]["titre"], "Annual Congress");
    assert!(pages[0]["contenu"]
        .as_str()
        .unwrap()
        .contains("Welcome to the annual congress"));
    // Reached only through the filtered-out /team page
    assert_eq!(pages[1]["url"], format!("{}/congress/venue", base_url));

    let domain_dir = PathBuf::from(&config.output.directory).join(&domain);
    assert!(domain_dir.join("pages_html").join("congress.html").exists());
    assert!(domain_dir.join("pages_html").join("congress_venue.html").exists());
    assert!(!domain_dir.join("pages_html").join("team.html").exists());
    assert_eq!(
        std::fs::read(domain_dir.join("fichiers").join("programme.pdf")).unwrap(),
        b"%PDF-1.7 programme"
    );
    assert!(!domain_dir.join("fichiers").join("congress-poster.png").exists());

    let visited = read_visited(&config, &domain);
    assert_eq!(visited.len(), 3);
    assert!(visited.iter().all(|u| u.starts_with(&base_url)));
}

#[tokio::test]
async fn test_http_errors_are_logged_and_abandoned() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let domain = base_url.trim_start_matches("http://").to_string();

    Mock::given(method("GET"))
        .and(path("/congress"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            "Congress",
            "Home",
            &["/congress/missing", "/congress/broken.pdf"],
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/congress/missing"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/congress/broken.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());
    let http = HttpFetcher::new(&config.crawler).unwrap();
    let coordinator = Coordinator::new(&config, &http, &http);

    let crawl = coordinator
        .crawl(&format!("{}/congress", base_url))
        .await
        .expect("Crawl should start");

    assert_eq!(crawl.status, CrawlStatus::Exhausted);
    assert_eq!(crawl.pages.len(), 1);
    assert_eq!(crawl.stats.fetch_failures, 1);
    assert_eq!(crawl.stats.asset_failures, 1);

    let log = std::fs::read_to_string(&config.output.error_log).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(&format!("{}/congress/broken.pdf", base_url)));
    assert!(lines[1].contains(&format!("{}/congress/missing", base_url)));
    assert!(lines[1].contains("500"));

    // The failed page is marked visited, the failed asset is not a page
    let visited = read_visited(&config, &domain);
    assert!(visited.contains(&format!("{}/congress/missing", base_url)));
    assert!(!visited.iter().any(|u| u.ends_with(".pdf")));
}

#[tokio::test]
async fn test_example_org_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(temp_dir.path());
    config.relevance.keywords = vec!["congress".to_string(), "2025".to_string()];
    config.crawler.mark_visited_on_filter_reject = false;

    let web = FakeWeb::default()
        .page(
            "https://example.org/congress",
            "Congress 2025",
            &[
                "https://example.org/team",
                "https://other.org/x",
                "https://example.org/congress/programme.pdf",
            ],
        )
        .page("https://example.org/team", "Our team", &[])
        .asset("https://example.org/congress/programme.pdf", b"%PDF programme");

    let coordinator = Coordinator::new(&config, &web, &web);
    let crawl = coordinator
        .crawl("https://example.org/congress")
        .await
        .unwrap();

    // Homepage kept and snapshotted
    assert_eq!(crawl.pages.len(), 1);
    assert_eq!(crawl.pages[0].url, "https://example.org/congress");
    assert_eq!(crawl.pages[0].title, "Congress 2025");
    let domain_dir = PathBuf::from(&config.output.directory).join("example.org");
    assert!(domain_dir.join("pages_html").join("congress.html").exists());

    // /team fetched, not recorded, not marked visited
    assert!(web.requested("https://example.org/team"));
    let visited = read_visited(&config, "example.org");
    assert_eq!(visited, vec!["https://example.org/congress".to_string()]);

    // other.org never enqueued
    assert!(!web.requested("https://other.org/x"));

    // programme.pdf downloaded
    assert_eq!(
        std::fs::read(domain_dir.join("fichiers").join("programme.pdf")).unwrap(),
        b"%PDF programme"
    );
    assert!(!PathBuf::from(&config.output.directory).join("other.org").exists());
}

#[tokio::test]
async fn test_homepage_timeout_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());
    let web = FakeWeb::default();

    let coordinator = Coordinator::new(&config, &web, &web);
    let crawl = coordinator
        .crawl("https://example.org/congress")
        .await
        .unwrap();

    assert!(crawl.pages.is_empty());
    assert_eq!(crawl.status, CrawlStatus::Exhausted);
    assert_eq!(crawl.stats.fetch_failures, 1);

    let log = std::fs::read_to_string(&config.output.error_log).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("https://example.org/congress"));

    assert_eq!(
        read_visited(&config, "example.org"),
        vec!["https://example.org/congress".to_string()]
    );
}

#[tokio::test]
async fn test_bound_limits_kept_pages_not_fetches() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(temp_dir.path());
    config.crawler.max_pages = 3;

    // Filtered pages in between do not count towards the bound
    let mut web = FakeWeb::default().page(
        "https://example.org/congress",
        "Congress",
        &["/about", "/congress/1"],
    );
    web = web.page("https://example.org/about", "About", &["/contact"]);
    web = web.page("https://example.org/contact", "Contact", &[]);
    for i in 1..10 {
        let next = format!("/congress/{}", i + 1);
        web = web.page(
            &format!("https://example.org/congress/{}", i),
            "Congress day",
            &[next.as_str()],
        );
    }

    let coordinator = Coordinator::new(&config, &web, &web);
    let crawl = coordinator
        .crawl("https://example.org/congress")
        .await
        .unwrap();

    assert_eq!(crawl.status, CrawlStatus::BoundReached);
    assert_eq!(crawl.pages.len(), 3);
    assert_eq!(crawl.stats.pages_filtered, 2);
    assert!(crawl.stats.pages_fetched > 3);
}

#[tokio::test]
async fn test_content_truncated_but_snapshot_complete() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(temp_dir.path());
    config.crawler.max_content_length = 40;

    let long_text = "congrès ".repeat(200);
    let web = FakeWeb::default().raw_page(
        "https://example.org/congress",
        html_page("Congress", &long_text, &[]),
    );

    let coordinator = Coordinator::new(&config, &web, &web);
    let crawl = coordinator
        .crawl("https://example.org/congress")
        .await
        .unwrap();

    let content = &crawl.pages[0].content;
    assert_eq!(content.chars().count(), 40);

    let snapshot = PathBuf::from(&config.output.directory)
        .join("example.org")
        .join("pages_html")
        .join("congress.html");
    let html = std::fs::read_to_string(snapshot).unwrap();
    assert!(html.contains(long_text.trim()));
}

#[tokio::test]
async fn test_images_never_reach_the_asset_directory() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());

    let web = FakeWeb::default()
        .raw_page(
            "https://example.org/congress",
            r#"<html><head><title>Congress</title></head><body>
                <img src="/congress-banner.jpg">
                <a href="/congress-photo.JPG">photo</a>
                <a href="/congress-logo.svg">logo</a>
                <a href="/congress-map.webp">map</a>
            </body></html>"#
                .to_string(),
        )
        .asset("https://example.org/congress-photo.JPG", b"jpeg")
        .asset("https://example.org/congress-logo.svg", b"svg")
        .asset("https://example.org/congress-map.webp", b"webp");

    let coordinator = Coordinator::new(&config, &web, &web);
    let crawl = coordinator
        .crawl("https://example.org/congress")
        .await
        .unwrap();

    assert_eq!(crawl.pages.len(), 1);
    assert_eq!(web.request_count(), 1);

    let domain_dir = PathBuf::from(&config.output.directory).join("example.org");
    assert_eq!(std::fs::read_dir(domain_dir.join("fichiers")).unwrap().count(), 0);
    let snapshot = std::fs::read_to_string(domain_dir.join("pages_html").join("congress.html")).unwrap();
    assert!(!snapshot.contains("congress-banner.jpg"));
}

#[tokio::test]
async fn test_second_run_resumes_from_visited_set() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());

    let web = FakeWeb::default()
        .page("https://example.org/congress", "Congress", &["/congress/venue"])
        .page("https://example.org/congress/venue", "Venue", &[]);

    let first = Coordinator::new(&config, &web, &web)
        .crawl("https://example.org/congress")
        .await
        .unwrap();
    assert_eq!(first.pages.len(), 2);
    assert_eq!(web.request_count(), 2);

    let second = Coordinator::new(&config, &web, &web)
        .crawl("https://example.org/congress")
        .await
        .unwrap();
    assert!(second.pages.is_empty());
    assert_eq!(web.request_count(), 2);
}

#[tokio::test]
async fn test_malformed_visited_set_only_fails_its_event() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());

    let broken_dir = PathBuf::from(&config.output.directory).join("a.org");
    std::fs::create_dir_all(&broken_dir).unwrap();
    std::fs::write(broken_dir.join("pages_visitées.json"), "{not json").unwrap();

    std::fs::write(
        &config.output.input_path,
        r#"[{"lien": "https://a.org/congress"}, {"lien": "https://b.org/congress"}]"#,
    )
    .unwrap();

    let web = FakeWeb::default()
        .page("https://a.org/congress", "Congress A", &[])
        .page("https://b.org/congress", "Congress B", &[]);

    let summary = run_pipeline(&config, &web, &web, false).await.unwrap();
    assert_eq!(summary.events_failed, 1);
    assert_eq!(summary.events_crawled, 1);
    assert!(!web.requested("https://a.org/congress"));

    let events: Vec<EventRecord> =
        serde_json::from_value(read_json(Path::new(&config.output.aggregate_path))).unwrap();
    assert_eq!(events[0].pages, Some(vec![]));
    assert_eq!(events[1].pages.as_ref().map(Vec::len), Some(1));

    let log = std::fs::read_to_string(&config.output.error_log).unwrap();
    assert!(log.contains("https://a.org/congress"));
    assert!(log.contains("malformed visited set"));

    // The broken file is left for a human to inspect
    assert_eq!(
        std::fs::read_to_string(broken_dir.join("pages_visitées.json")).unwrap(),
        "{not json"
    );

    // --fresh ignores it
    let summary = run_pipeline(&config, &web, &web, true).await.unwrap();
    assert_eq!(summary.events_failed, 0);
    assert!(web.requested("https://a.org/congress"));
}

#[tokio::test]
async fn test_visited_set_only_holds_the_crawled_domain() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path());

    let web = FakeWeb::default()
        .page(
            "https://example.org/congress",
            "Congress",
            &["https://www.example.org/congress", "http://example.org:8080/congress", "/congress/a"],
        )
        .page("https://example.org/congress/a", "Congress A", &[]);

    Coordinator::new(&config, &web, &web)
        .crawl("https://example.org/congress")
        .await
        .unwrap();

    let visited = read_visited(&config, "example.org");
    assert_eq!(visited.len(), 2);
    assert!(visited.iter().all(|u| u.starts_with("https://example.org/")));
    assert!(!web.requested("https://www.example.org/congress"));

    let store = DomainStateStore::new(&config.output.directory);
    let state = store.load("example.org").unwrap();
    assert_eq!(state.len(), 2);
}
