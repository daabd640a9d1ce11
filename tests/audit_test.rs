//! Orchestrator: aggregation math, page content auditing, exit codes, and a
//! wiremock-backed end-to-end site audit.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aeolint::discovery::normalize_url;
use aeolint::tools::audit::{
    aggregate_page_scores, audit_page_content, audit_site, audit_url, exit_code, page_weight,
};
use aeolint::types::{
    BotAccess, ContentReport, LlmsTxtReport, PageAudit, RobotsReport, SchemaReport,
};

fn make_page(
    url: &str,
    schema_score: f64,
    content_score: f64,
    word_count: usize,
    errors: Vec<String>,
) -> PageAudit {
    PageAudit {
        url: url.to_string(),
        schema_org: SchemaReport {
            blocks_found: 0,
            schemas: vec![],
            score: schema_score,
            detail: String::new(),
        },
        content: ContentReport {
            word_count,
            char_count: word_count * 5,
            has_headings: true,
            score: content_score,
            ..Default::default()
        },
        errors,
    }
}

fn robots_scored(score: f64) -> RobotsReport {
    RobotsReport {
        found: true,
        score,
        ..Default::default()
    }
}

fn llms_scored(found: bool, score: f64) -> LlmsTxtReport {
    LlmsTxtReport {
        found,
        score,
        ..Default::default()
    }
}

// ── page_weight ─────────────────────────────────────────────────────────────

#[test]
fn weights_step_down_with_depth() {
    assert_eq!(page_weight("https://example.com/"), 3);
    assert_eq!(page_weight("https://example.com/about"), 3);
    assert_eq!(page_weight("https://example.com/blog/post"), 2);
    assert_eq!(page_weight("https://example.com/a/b/c"), 1);
    assert_eq!(page_weight("https://example.com/a/b/c/d"), 1);
}

// ── aggregate_page_scores ───────────────────────────────────────────────────

#[test]
fn equal_weight_pages_average_plainly() {
    // Both URLs are depth <= 1, so both carry weight 3.
    let pages = vec![
        make_page("https://example.com/", 18.0, 30.0, 1000, vec![]),
        make_page("https://example.com/about", 8.0, 20.0, 400, vec![]),
    ];
    let robots = robots_scored(20.0);
    let llms = llms_scored(true, 10.0);

    let (schema, content, overall) = aggregate_page_scores(&pages, &robots, &llms).unwrap();

    assert_eq!(schema.score, 13.0);
    assert_eq!(content.score, 25.0);
    assert_eq!(content.word_count, 700);
    assert_eq!(overall, 20.0 + 10.0 + 13.0 + 25.0);
}

#[test]
fn single_page_passes_through() {
    let pages = vec![make_page("https://example.com/", 18.0, 37.0, 1500, vec![])];
    let robots = robots_scored(25.0);
    let llms = llms_scored(false, 0.0);

    let (schema, content, overall) = aggregate_page_scores(&pages, &robots, &llms).unwrap();

    assert_eq!(schema.score, 18.0);
    assert_eq!(content.score, 37.0);
    assert_eq!(overall, 25.0 + 18.0 + 37.0);
}

#[test]
fn no_pages_leaves_only_site_wide_scores() {
    let robots = robots_scored(25.0);
    let llms = llms_scored(true, 10.0);

    let (schema, content, overall) = aggregate_page_scores(&[], &robots, &llms).unwrap();

    assert_eq!(schema.score, 0.0);
    assert_eq!(content.score, 0.0);
    assert_eq!(overall, 35.0);
}

#[test]
fn failed_pages_are_excluded_from_the_average() {
    let pages = vec![
        make_page("https://example.com/", 20.0, 30.0, 1000, vec![]),
        make_page(
            "https://example.com/broken",
            0.0,
            0.0,
            0,
            vec!["Crawl failed".to_string()],
        ),
    ];
    let robots = robots_scored(25.0);
    let llms = llms_scored(false, 0.0);

    let (schema, content, _) = aggregate_page_scores(&pages, &robots, &llms).unwrap();

    assert_eq!(schema.score, 20.0);
    assert_eq!(content.score, 30.0);
}

#[test]
fn deeper_pages_weigh_less() {
    // Weights: "/" -> 3, "/a/b" -> 2, "/a/b/c" -> 1.
    let pages = vec![
        make_page("https://example.com/", 10.0, 30.0, 900, vec![]),
        make_page("https://example.com/a/b", 20.0, 20.0, 600, vec![]),
        make_page("https://example.com/a/b/c", 30.0, 10.0, 300, vec![]),
    ];
    let robots = robots_scored(0.0);
    let llms = llms_scored(false, 0.0);

    let (schema, content, overall) = aggregate_page_scores(&pages, &robots, &llms).unwrap();

    // schema: (3*10 + 2*20 + 1*30) / 6 = 100/6 = 16.7
    assert_eq!(schema.score, 16.7);
    // content: (3*30 + 2*20 + 1*10) / 6 = 140/6 = 23.3
    assert_eq!(content.score, 23.3);
    // words: (3*900 + 2*600 + 1*300) / 6 = 4200/6 = 700
    assert_eq!(content.word_count, 700);
    assert_eq!(overall, 16.7 + 23.3);
}

// ── audit_page_content ──────────────────────────────────────────────────────

#[test]
fn page_content_produces_both_reports() {
    let html = r#"
    <html><head>
    <script type="application/ld+json">{"@type": "Article", "headline": "Test Article"}</script>
    </head><body></body></html>
    "#;
    let md = "# Test Article\n\nThis is the body of the article with several words.";

    let (schema, content) = audit_page_content(html, md);

    assert_eq!(schema.blocks_found, 1);
    assert_eq!(schema.schemas[0].schema_type, "Article");
    assert!(content.word_count > 0);
    assert!(content.has_headings);
}

#[test]
fn empty_page_content_yields_default_reports() {
    let (schema, content) = audit_page_content("", "");
    assert_eq!(schema.blocks_found, 0);
    assert_eq!(content.word_count, 0);
}

// ── exit_code ───────────────────────────────────────────────────────────────

#[test]
fn exit_code_policy() {
    let mut robots = RobotsReport {
        found: true,
        bots: vec![BotAccess {
            bot: "GPTBot".to_string(),
            allowed: false,
            detail: "Blocked".to_string(),
        }],
        score: 0.0,
        detail: String::new(),
    };

    // Blocked bots beat fail-under when both trip.
    assert_eq!(exit_code(10.0, &robots, Some(50.0), true), 2);
    // Without the flag, only fail-under applies.
    assert_eq!(exit_code(10.0, &robots, Some(50.0), false), 1);
    // Score at threshold passes (strictly below fails).
    assert_eq!(exit_code(50.0, &robots, Some(50.0), false), 0);

    robots.bots[0].allowed = true;
    assert_eq!(exit_code(80.0, &robots, None, true), 0);
}

// ── end-to-end over HTTP ────────────────────────────────────────────────────

fn seed_page_html(server_uri: &str) -> String {
    format!(
        r#"<html><head>
        <script type="application/ld+json">{{"@type": "Article", "headline": "Home"}}</script>
        </head><body>
        <h1>Welcome</h1>
        <p>This homepage has a reasonable amount of body text for the audit to
        chew on, spread over a couple of sentences.</p>
        <a href="{server_uri}/about">About</a>
        <a href="{server_uri}/docs/guide">Guide</a>
        </body></html>"#
    )
}

async fn mount_common(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /\n"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/llms.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# About this site"))
        .mount(server)
        .await;
    // No sitemap: force spider fallback through the seed links.
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h1>About us</h1><p>Some words about the team.</p></body></html>",
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn site_audit_end_to_end() {
    let server = MockServer::start().await;
    mount_common(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(seed_page_html(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/guide"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h2>Guide</h2><p>Step one is simple.</p></body></html>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let report = audit_site(&server.uri(), 3, 2, 10.0, None, None)
        .await
        .unwrap();

    // Seed first, sampled within bounds, no normalized duplicates.
    assert_eq!(
        normalize_url(&report.discovery.urls_sampled[0]),
        normalize_url(&server.uri())
    );
    assert!(report.discovery.urls_sampled.len() <= 3);
    assert_eq!(report.discovery.method, "spider");

    assert!(report.robots.found);
    assert_eq!(report.robots.score, 25.0);
    assert!(report.llms_txt.found);
    assert_eq!(report.llms_txt.score, 10.0);

    assert_eq!(report.pages.len(), report.discovery.urls_sampled.len());
    assert_eq!(report.pages_failed, 0);
    assert_eq!(report.pages_audited, report.pages.len());

    assert_eq!(
        report.overall_score,
        report.robots.score
            + report.llms_txt.score
            + report.schema_org.score
            + report.content.score
    );
}

#[tokio::test]
async fn site_audit_isolates_a_failing_page() {
    let server = MockServer::start().await;
    mount_common(&server).await;
    let seed_html = format!(
        r#"<html><body><h1>Home</h1><p>Body text here.</p>
        <a href="{0}/about">About</a>
        <a href="{0}/broken">Broken</a>
        </body></html>"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(seed_html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let report = audit_site(&server.uri(), 3, 2, 10.0, None, None)
        .await
        .unwrap();

    assert_eq!(report.pages_failed, 1);
    assert!(report.errors.iter().any(|e| e.contains("HTTP 500")));
    // The failed page is present in the page list with its error recorded.
    let broken = report
        .pages
        .iter()
        .find(|p| p.url.contains("/broken"))
        .unwrap();
    assert!(!broken.errors.is_empty());
    // The audit as a whole still succeeded.
    assert!(report.overall_score > 0.0);
}

#[tokio::test]
async fn single_page_audit_survives_a_dead_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = audit_url(&server.uri(), 10.0, None).await.unwrap();

    assert!(report.robots.found);
    assert!(!report.errors.is_empty());
    assert_eq!(report.schema_org.blocks_found, 0);
    assert_eq!(report.content.word_count, 0);
    // robots is the only scoring pillar left standing.
    assert_eq!(report.overall_score, report.robots.score);
}

#[tokio::test]
async fn progress_callback_is_best_effort_status() {
    use std::sync::Mutex;

    let server = MockServer::start().await;
    mount_common(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h1>Home</h1><p>Hello.</p></body></html>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let messages: Mutex<Vec<String>> = Mutex::new(Vec::new());
    let progress = |message: &str| {
        messages.lock().unwrap().push(message.to_string());
    };

    let report = audit_site(&server.uri(), 2, 1, 10.0, None, Some(&progress))
        .await
        .unwrap();

    assert!(report.overall_score >= 0.0);
    let seen = messages.lock().unwrap();
    assert!(!seen.is_empty());
}
