//! Audit orchestrator: drives the single-page and site-wide flows —
//! concurrent site probes, discovery, bounded page fan-out, per-page checks,
//! depth-weighted aggregation, and scoring.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use crate::checks::{check_content, check_llms_txt, check_robots, check_schema_org, default_ai_bots};
use crate::core::error::AuditError;
use crate::core::scoring::{self, compute_scores, round1};
use crate::core::types::{
    AuditReport, ContentReport, LlmsTxtReport, PageAudit, RobotsReport, SchemaOrgResult,
    SchemaReport, SiteAuditReport,
};
use crate::core::USER_AGENT;
use crate::crawler::{fetch_pages, HttpPageFetcher, PageFetcher};
use crate::discovery::{discover_pages, path_depth};

pub const DEFAULT_CONCURRENCY: usize = 3;
pub const DEFAULT_STAGGER_DELAY: f64 = 1.0;

/// Best-effort status callback; never load-bearing.
pub type ProgressFn<'a> = &'a (dyn Fn(&str) + Sync);

fn report_progress(progress: Option<ProgressFn<'_>>, message: &str) {
    if let Some(callback) = progress {
        callback(message);
    }
}

/// Prepend `https://` when the input has no scheme. Callers are expected to
/// do this before invoking an audit; the helper makes the rule explicit.
pub fn ensure_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn build_client(timeout_secs: f64) -> Result<Client, AuditError> {
    let client = Client::builder()
        .timeout(Duration::from_secs_f64(timeout_secs))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

fn validate_seed(url: &str) -> Result<Url, AuditError> {
    Url::parse(url).map_err(|source| AuditError::InvalidSeed {
        url: url.to_string(),
        source,
    })
}

/// Run the per-page content checks: JSON-LD extraction over the HTML and
/// density analysis over the markdown.
pub fn audit_page_content(html: &str, markdown: &str) -> (SchemaReport, ContentReport) {
    (check_schema_org(html), check_content(markdown))
}

/// Depth weight for aggregation: shallow pages describe the site better.
/// Depth <= 1 weighs 3, depth 2 weighs 2, deeper pages weigh 1.
pub fn page_weight(url: &str) -> u32 {
    match path_depth(url) {
        0 | 1 => 3,
        2 => 2,
        _ => 1,
    }
}

/// Aggregate per-page schema/content scores into site-level reports, weighted
/// by URL depth, and combine with the site-wide robots and llms.txt scores
/// into the overall score.
///
/// Pages that produced nothing (no words and a recorded error) are excluded.
/// Returns `AuditError::Invariant` when a weight comes back broken — that is
/// a bug, not a crawl failure.
pub fn aggregate_page_scores(
    pages: &[PageAudit],
    robots: &RobotsReport,
    llms_txt: &LlmsTxtReport,
) -> Result<(SchemaReport, ContentReport, f64), AuditError> {
    let mut total_weight = 0.0f64;
    let mut weighted_schema = 0.0f64;
    let mut weighted_content = 0.0f64;
    let mut weighted_words = 0.0f64;
    let mut blocks_found = 0usize;
    let mut seen_types: Vec<SchemaOrgResult> = Vec::new();
    let mut counted_pages = 0usize;

    for page in pages {
        let qualifies = page.content.word_count > 0 || page.errors.is_empty();
        if !qualifies {
            continue;
        }
        let weight = f64::from(page_weight(&page.url));
        if weight < 1.0 {
            return Err(AuditError::Invariant(format!(
                "non-positive page weight for {}",
                page.url
            )));
        }
        total_weight += weight;
        weighted_schema += weight * page.schema_org.score;
        weighted_content += weight * page.content.score;
        weighted_words += weight * page.content.word_count as f64;
        blocks_found += page.schema_org.blocks_found;
        for schema in &page.schema_org.schemas {
            if !seen_types.iter().any(|s| s.schema_type == schema.schema_type) {
                seen_types.push(schema.clone());
            }
        }
        counted_pages += 1;
    }

    let (schema_score, content_score, avg_words) = if total_weight > 0.0 {
        (
            round1(weighted_schema / total_weight),
            round1(weighted_content / total_weight),
            (weighted_words / total_weight) as usize,
        )
    } else {
        (0.0, 0.0, 0)
    };

    let schema_org = SchemaReport {
        blocks_found,
        schemas: seen_types,
        score: schema_score,
        detail: format!("Aggregated across {counted_pages} page(s)"),
    };
    let content = ContentReport {
        word_count: avg_words,
        score: content_score,
        heading_hierarchy_valid: true,
        detail: format!("{avg_words} avg words across {counted_pages} page(s)"),
        ..Default::default()
    };

    let overall = robots.score + llms_txt.score + schema_score + content_score;
    Ok((schema_org, content, overall))
}

/// Audit a single URL: robots and llms.txt probes in parallel, one page
/// fetch, per-page checks, scoring.
pub async fn audit_url(
    url: &str,
    timeout_secs: f64,
    bots: Option<&[String]>,
) -> Result<AuditReport, AuditError> {
    let url = ensure_scheme(url);
    validate_seed(&url)?;
    let client = build_client(timeout_secs)?;
    let bots = bots.map_or_else(default_ai_bots, <[String]>::to_vec);

    info!(%url, "starting single-page audit");

    let fetcher = HttpPageFetcher::new(client.clone());
    let ((robots, _robots_raw), llms_txt) = tokio::join!(
        check_robots(&url, &client, &bots),
        check_llms_txt(&url, &client),
    );

    let page = fetcher.fetch_page(&url, timeout_secs).await;
    let mut errors: Vec<String> = Vec::new();
    let (schema_org, content) = if page.success {
        audit_page_content(&page.html, &page.markdown)
    } else {
        errors.push(
            page.error
                .unwrap_or_else(|| "Page fetch failed".to_string()),
        );
        (SchemaReport::default(), ContentReport::default())
    };

    let (robots, llms_txt, schema_org, content, overall) =
        compute_scores(robots, llms_txt, schema_org, content);

    Ok(AuditReport {
        url,
        overall_score: overall,
        robots,
        llms_txt,
        schema_org,
        content,
        errors,
    })
}

/// Audit a whole site: site-wide probes and the seed fetch run concurrently,
/// discovery picks a diverse page sample, pages fan out with bounded
/// concurrency, and per-page scores aggregate depth-weighted into the site
/// report. One bad page never fails the audit.
pub async fn audit_site(
    url: &str,
    max_pages: usize,
    concurrency: usize,
    timeout_secs: f64,
    bots: Option<&[String]>,
    progress: Option<ProgressFn<'_>>,
) -> Result<SiteAuditReport, AuditError> {
    let seed = ensure_scheme(url);
    let parsed = validate_seed(&seed)?;
    let domain = parsed.host_str().unwrap_or_default().to_string();
    let client = build_client(timeout_secs)?;
    let bots = bots.map_or_else(default_ai_bots, <[String]>::to_vec);

    info!(url = %seed, max_pages, concurrency, "starting site audit");
    report_progress(progress, "Checking site-wide signals");

    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(client.clone()));
    let ((robots, robots_raw), llms_txt, seed_page) = tokio::join!(
        check_robots(&seed, &client, &bots),
        check_llms_txt(&seed, &client),
        fetcher.fetch_page(&seed, timeout_secs),
    );

    report_progress(progress, "Discovering pages");
    let seed_links = seed_page.internal_links.clone();
    let discovery = discover_pages(
        &seed,
        &client,
        max_pages,
        robots_raw.as_deref(),
        seed_links.as_deref(),
    )
    .await;

    // The seed body is already in hand; only the rest of the sample is fetched.
    let remaining: Vec<String> = discovery.urls_sampled.iter().skip(1).cloned().collect();
    report_progress(progress, &format!("Crawling {} page(s)", remaining.len()));
    let fetched = fetch_pages(
        Arc::clone(&fetcher),
        &remaining,
        concurrency,
        DEFAULT_STAGGER_DELAY,
        timeout_secs,
    )
    .await;

    let mut pages: Vec<PageAudit> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut pages_failed = 0usize;

    for page in std::iter::once(seed_page).chain(fetched) {
        if page.success {
            let (mut schema_org, mut content) = audit_page_content(&page.html, &page.markdown);
            schema_org.score = scoring::score_schema_org(&schema_org);
            content.score = scoring::score_content(&content);
            pages.push(PageAudit {
                url: page.url,
                schema_org,
                content,
                errors: Vec::new(),
            });
        } else {
            pages_failed += 1;
            let error = page
                .error
                .unwrap_or_else(|| "Page fetch failed".to_string());
            warn!(url = %page.url, %error, "page failed during site audit");
            errors.push(format!("{}: {}", page.url, error));
            pages.push(PageAudit {
                url: page.url,
                schema_org: SchemaReport::default(),
                content: ContentReport::default(),
                errors: vec![error],
            });
        }
    }

    report_progress(progress, "Aggregating scores");

    let mut robots = robots;
    let mut llms_txt = llms_txt;
    robots.score = scoring::score_robots(&robots);
    llms_txt.score = scoring::score_llms_txt(&llms_txt);
    let (schema_org, content, overall) = aggregate_page_scores(&pages, &robots, &llms_txt)?;

    let pages_audited = pages.len() - pages_failed;
    info!(
        url = %seed,
        overall, pages_audited, pages_failed, "site audit complete"
    );

    Ok(SiteAuditReport {
        url: seed,
        domain,
        overall_score: overall,
        robots,
        llms_txt,
        schema_org,
        content,
        discovery,
        pages,
        pages_audited,
        pages_failed,
        errors,
    })
}

/// Audit several seed URLs with shared settings. Each seed is isolated: one
/// failing audit is reported in its slot and the rest continue.
pub async fn audit_urls(
    urls: &[String],
    max_pages: usize,
    concurrency: usize,
    timeout_secs: f64,
    bots: Option<&[String]>,
) -> Vec<(String, Result<SiteAuditReport, AuditError>)> {
    let mut results = Vec::with_capacity(urls.len());
    for url in urls {
        let outcome = audit_site(url, max_pages, concurrency, timeout_secs, bots, None).await;
        if let Err(e) = &outcome {
            warn!(%url, error = %e, "batch audit entry failed");
        }
        results.push((url.clone(), outcome));
    }
    results
}

/// Exit-code policy for CLI callers: 2 when `fail_on_blocked_bots` is set and
/// at least one AI bot is blocked, else 1 when the score is under
/// `fail_under`, else 0. When both conditions hold, 2 wins.
pub fn exit_code(
    overall_score: f64,
    robots: &RobotsReport,
    fail_under: Option<f64>,
    fail_on_blocked_bots: bool,
) -> i32 {
    let any_blocked = robots.found && robots.bots.iter().any(|b| !b.allowed);
    if fail_on_blocked_bots && any_blocked {
        return 2;
    }
    if fail_under.is_some_and(|threshold| overall_score < threshold) {
        return 1;
    }
    0
}
