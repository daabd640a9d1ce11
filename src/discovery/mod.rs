//! Page discovery for site audits — sitemap-first, spider-fallback, with
//! robots filtering and diversity sampling.

use std::collections::{BTreeMap, HashSet, VecDeque};

use quick_xml::events::Event;
use quick_xml::Reader;
use rand::seq::SliceRandom;
use reqwest::Client;
use texting_robots::Robot;
use tracing::{debug, warn};
use url::Url;

use crate::core::types::DiscoveryResult;

const MAX_CHILD_SITEMAPS: usize = 10;
const MAX_SITEMAP_URLS: usize = 500;

/// The user-agent used when filtering discovered URLs through robots.txt.
const FILTER_BOT: &str = "GPTBot";

// ── URL normalization ────────────────────────────────────────────────────────

/// Normalize a URL for deduplication.
///
/// Lowercases scheme and host, strips the fragment, and right-trims the
/// trailing slash (the bare root stays `/`). The query string is preserved
/// verbatim. Unparseable input is lowercased wholesale.
pub fn normalize_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_lowercase();
    };
    let scheme = parsed.scheme();
    let host = parsed.host_str().unwrap_or_default();
    let port = match parsed.port() {
        Some(p) => format!(":{p}"),
        None => String::new(),
    };
    let trimmed = parsed.path().trim_end_matches('/');
    let path = if trimmed.is_empty() { "/" } else { trimmed };
    match parsed.query() {
        Some(query) => format!("{scheme}://{host}{port}{path}?{query}"),
        None => format!("{scheme}://{host}{port}{path}"),
    }
}

/// First non-empty path segment, or `""` for the root.
pub fn first_path_segment(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    parsed
        .path()
        .trim_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Number of non-empty path segments.
pub fn path_depth(url: &str) -> usize {
    let Ok(parsed) = Url::parse(url) else {
        return 0;
    };
    parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .count()
}

// ── Sitemap parsing ──────────────────────────────────────────────────────────

/// Parse one sitemap document into `(page_urls, child_sitemap_urls)`.
///
/// Handles both `<urlset>` and `<sitemapindex>` in a single pass. Matching is
/// on local element names, so documents that omit the standard namespace
/// still parse. Malformed XML yields whatever was collected up to the error.
pub fn parse_sitemap_xml(xml: &str) -> (Vec<String>, Vec<String>) {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page_urls: Vec<String> = Vec::new();
    let mut child_urls: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    // Which container we are inside, and whether the cursor is on its <loc>.
    let mut in_url = false;
    let mut in_sitemap = false;
    let mut in_loc = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                match e.local_name().as_ref() {
                    b"url" => in_url = true,
                    b"sitemap" => in_sitemap = true,
                    b"loc" if in_url || in_sitemap => in_loc = true,
                    _ => {}
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"url" => in_url = false,
                b"sitemap" => in_sitemap = false,
                b"loc" => in_loc = false,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_loc {
                    if let Ok(text) = e.unescape() {
                        let loc = text.trim().to_string();
                        if loc.is_empty() {
                            // skip blank <loc>
                        } else if in_url {
                            page_urls.push(loc);
                        } else if in_sitemap {
                            child_urls.push(loc);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!("sitemap XML parse error: {e}");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    (page_urls, child_urls)
}

/// Fetch and parse sitemap(s) for the seed's origin, returning up to
/// `max_urls` page URLs.
///
/// Tries `/sitemap.xml` first, then `/sitemap_index.xml`. A sitemap index
/// fans out to its children (capped at [`MAX_CHILD_SITEMAPS`]); a failing
/// child is skipped, not fatal. The first candidate that yields any page
/// URLs wins.
pub async fn fetch_sitemap_urls(base_url: &str, client: &Client, max_urls: usize) -> Vec<String> {
    let Ok(parsed) = Url::parse(base_url) else {
        return Vec::new();
    };
    let origin = parsed.origin().ascii_serialization();
    let candidates = [
        format!("{origin}/sitemap.xml"),
        format!("{origin}/sitemap_index.xml"),
    ];

    let mut all_page_urls: Vec<String> = Vec::new();

    for sitemap_url in &candidates {
        let xml = match client.get(sitemap_url).send().await {
            Ok(resp) if resp.status().as_u16() == 200 => match resp.text().await {
                Ok(body) => body,
                Err(_) => continue,
            },
            Ok(_) | Err(_) => continue,
        };

        let (page_urls, child_urls) = parse_sitemap_xml(&xml);
        all_page_urls.extend(page_urls);

        for child_url in child_urls.iter().take(MAX_CHILD_SITEMAPS) {
            let child_xml = match client.get(child_url).send().await {
                Ok(resp) if resp.status().as_u16() == 200 => match resp.text().await {
                    Ok(body) => body,
                    Err(_) => continue,
                },
                Ok(_) | Err(_) => continue,
            };
            let (child_pages, _) = parse_sitemap_xml(&child_xml);
            all_page_urls.extend(child_pages);

            if all_page_urls.len() >= max_urls {
                break;
            }
        }

        // Any URLs from this candidate means the second one is not tried.
        if !all_page_urls.is_empty() {
            break;
        }
    }

    all_page_urls.truncate(max_urls);
    all_page_urls
}

// ── Robots.txt filter ────────────────────────────────────────────────────────

/// Drop URLs that robots.txt blocks for the filter bot. An unparseable file
/// filters nothing.
fn filter_by_robots(urls: Vec<String>, robots_txt: &str) -> Vec<String> {
    match Robot::new(FILTER_BOT, robots_txt.as_bytes()) {
        Ok(robot) => urls.into_iter().filter(|u| robot.allowed(u)).collect(),
        Err(e) => {
            warn!("robots.txt unparseable for discovery filter: {e}");
            urls
        }
    }
}

// ── Diverse page selection ───────────────────────────────────────────────────

/// Pick up to `max_pages` URLs, always placing `seed_url` first.
///
/// Remaining candidates are grouped by first path segment, shuffled within
/// each group, then drawn round-robin across groups in alphabetical key
/// order (depleted groups drop out) so the sample spans different sections
/// of the site.
pub fn select_diverse_pages(urls: &[String], seed_url: &str, max_pages: usize) -> Vec<String> {
    let seed_norm = normalize_url(seed_url);
    let mut selected: Vec<String> = vec![seed_url.to_string()];
    let mut seen: HashSet<String> = HashSet::from([seed_norm]);

    if max_pages <= 1 {
        return selected;
    }

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for url in urls {
        let norm = normalize_url(url);
        if seen.contains(&norm) {
            continue;
        }
        groups.entry(first_path_segment(url)).or_default().push(url.clone());
    }

    let mut rng = rand::rng();
    let mut keys: Vec<String> = groups.keys().cloned().collect();
    let mut queues: BTreeMap<String, VecDeque<String>> = groups
        .into_iter()
        .map(|(key, mut group)| {
            group.shuffle(&mut rng);
            (key, group.into())
        })
        .collect();

    let mut idx = 0usize;
    while selected.len() < max_pages && !keys.is_empty() {
        let key = keys[idx % keys.len()].clone();
        let Some(queue) = queues.get_mut(&key) else {
            break;
        };
        if let Some(url) = queue.pop_front() {
            let norm = normalize_url(&url);
            if seen.insert(norm) {
                selected.push(url);
            }
        }
        if queue.is_empty() {
            keys.retain(|k| k != &key);
            if keys.is_empty() {
                break;
            }
            idx %= keys.len();
        } else {
            idx += 1;
        }
    }

    selected
}

// ── Main discovery entrypoint ────────────────────────────────────────────────

/// Discover pages to audit starting from `seed_url`.
///
/// Sitemap URLs win when any exist; otherwise the internal links collected
/// during the seed crawl serve as the spider corpus. Supplying the raw
/// robots.txt filters candidates for [`FILTER_BOT`] before sampling. The
/// sample is normalized, deduplicated (first occurrence kept), and
/// diversity-selected with the seed always first.
pub async fn discover_pages(
    seed_url: &str,
    client: &Client,
    max_pages: usize,
    robots_txt: Option<&str>,
    seed_links: Option<&[String]>,
) -> DiscoveryResult {
    let mut method = "sitemap";
    let mut urls = fetch_sitemap_urls(seed_url, client, MAX_SITEMAP_URLS).await;

    if urls.is_empty() {
        method = "spider";
        urls = seed_links.map(<[String]>::to_vec).unwrap_or_default();
    }

    let urls_found = urls.len();

    if let Some(robots_txt) = robots_txt {
        if !urls.is_empty() {
            urls = filter_by_robots(urls, robots_txt);
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut unique_urls: Vec<String> = Vec::new();
    for url in urls {
        if seen.insert(normalize_url(&url)) {
            unique_urls.push(url);
        }
    }

    let sampled = select_diverse_pages(&unique_urls, seed_url, max_pages);

    let detail = format!(
        "method={method}, found={urls_found}, sampled={}",
        sampled.len()
    );
    debug!("{detail}");

    DiscoveryResult {
        method: method.to_string(),
        urls_found,
        urls_sampled: sampled,
        detail,
    }
}
