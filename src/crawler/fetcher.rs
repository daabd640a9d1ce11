//! Plain-HTTP implementation of the page fetcher: retried GET, HTML to
//! markdown conversion, and same-host link extraction. Sites that require
//! JavaScript rendering need a different `PageFetcher` implementation.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::{Client, Method};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::PageFetcher;
use crate::core::retry::{request_with_retry, RetryConfig};
use crate::core::types::PageCrawl;

pub struct HttpPageFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(client: Client, retry: RetryConfig) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str, _per_page_timeout: f64) -> PageCrawl {
        let response = match request_with_retry(&self.client, Method::GET, url, &self.retry).await {
            Ok(r) => r,
            Err(e) => return PageCrawl::failure(url, e.to_string()),
        };
        let status = response.status();
        if !status.is_success() {
            return PageCrawl::failure(url, format!("HTTP {}", status.as_u16()));
        }
        let html = match response.text().await {
            Ok(t) => t,
            Err(e) => return PageCrawl::failure(url, e.to_string()),
        };

        let markdown = html2md::parse_html(&html);
        let internal_links = extract_internal_links(&html, url);
        debug!(url, links = internal_links.len(), "page fetched");

        PageCrawl {
            url: url.to_string(),
            html,
            markdown,
            success: true,
            error: None,
            internal_links: Some(internal_links),
        }
    }
}

/// Resolve a potentially relative `href` against `base`, skipping non-page
/// schemes and bare fragments.
fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
        || href.starts_with("data:")
    {
        return None;
    }
    let mut resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved)
}

/// Extract same-host links from `html`, absolute, fragment-stripped, first
/// occurrence kept.
pub fn extract_internal_links(html: &str, base_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base_host = base.host_str().unwrap_or_default().to_string();

    let document = Html::parse_document(html);
    let mut seen: HashSet<String> = HashSet::new();
    let mut links: Vec<String> = Vec::new();

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_href(&base, href) else {
            continue;
        };
        if resolved.host_str().unwrap_or_default() != base_host {
            continue;
        }
        let absolute = resolved.to_string();
        if seen.insert(absolute.clone()) {
            links.push(absolute);
        }
    }
    links
}
