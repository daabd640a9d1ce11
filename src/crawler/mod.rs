//! The page-fetch collaborator: single-page fetch behind a trait, plus the
//! bounded, staggered, order-preserving multi-page helper.

mod fetcher;

pub use fetcher::{extract_internal_links, HttpPageFetcher};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::core::types::PageCrawl;

/// Fetches one page and returns its HTML, markdown rendering, and internal
/// links. Implementations must never fail: errors are reported through
/// `PageCrawl { success: false, error }`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str, per_page_timeout: f64) -> PageCrawl;
}

/// Fetch `urls` concurrently with a staggered start.
///
/// Task `i` sleeps `stagger_delay * i` seconds before competing for one of
/// `max_concurrent` semaphore permits, so launches are rate-limited without a
/// sleeping task occupying a fetch slot. Each fetch is wrapped in
/// `per_page_timeout`; a timeout degrades to a per-page error, never an
/// aborted batch.
///
/// Results come back in input order regardless of completion order: each task
/// carries its index and fills a dedicated slot. Dropping the returned future
/// aborts every in-flight fetch (the JoinSet owns the tasks), which is what
/// propagates audit-level cancellation.
pub async fn fetch_pages(
    fetcher: Arc<dyn PageFetcher>,
    urls: &[String],
    max_concurrent: usize,
    stagger_delay: f64,
    per_page_timeout: f64,
) -> Vec<PageCrawl> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks: JoinSet<(usize, PageCrawl)> = JoinSet::new();

    for (index, url) in urls.iter().cloned().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            tokio::time::sleep(Duration::from_secs_f64(stagger_delay * index as f64)).await;
            let _permit = semaphore.acquire_owned().await.ok();
            let result = match tokio::time::timeout(
                Duration::from_secs_f64(per_page_timeout),
                fetcher.fetch_page(&url, per_page_timeout),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => PageCrawl::failure(&url, format!("Timed out after {per_page_timeout}s")),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<PageCrawl>> = vec![None; urls.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!("page fetch task failed: {e}"),
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| slot.unwrap_or_else(|| PageCrawl::failure(&urls[i], "Fetch task aborted")))
        .collect()
}
