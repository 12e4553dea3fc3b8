//! Catalog scraping.
//!
//! Reads the page count from the first listing page, then fetches every
//! page and extracts its products. Pages are fetched one at a time unless
//! `workers` is above one, in which case a bounded pool of scoped threads
//! fetches them and results are put back into page order.
//!
//! A page that still fails after retries aborts the run. Pages are never
//! skipped. A listing claiming more than `max_pages` pages is refused
//! before any page is fetched.

pub mod extract;
pub mod http;
pub mod pagination;
pub mod price;
pub mod product;
pub mod progress;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use scraper::Html;
use url::Url;

use crate::config::Config;
use crate::error::{FieldExtractionFailed, ScrapeError};
use http::{retry_with_backoff, RetryConfig};
use product::{PageResult, PageSource, ProductRecord};
use progress::Progress;

#[derive(Debug)]
pub struct ScrapeResult {
    pub records: Vec<ProductRecord>,
    pub diagnostics: Vec<FieldExtractionFailed>,
    pub pages: u32,
    pub duration_ms: u128,
}

impl ScrapeResult {
    fn from_pages(pages: Vec<PageResult>) -> Self {
        let mut result = ScrapeResult {
            records: Vec::new(),
            diagnostics: Vec::new(),
            pages: u32::try_from(pages.len()).unwrap_or(u32::MAX),
            duration_ms: 0,
        };
        for page in pages {
            result.records.extend(page.records);
            result.diagnostics.extend(page.diagnostics);
        }
        result
    }
}

/// Scrape every listing page reachable from `config.url`.
pub fn run(
    source: &dyn PageSource,
    config: &Config,
    progress: &mut dyn Progress,
) -> Result<ScrapeResult, ScrapeError> {
    let start = Instant::now();

    let first = fetch_body(source, &config.url, 1, config.retry)?;
    let total = pagination::total_pages(&Html::parse_document(&first)).ok_or_else(|| {
        ScrapeError::PaginationNotFound { url: config.url.to_string() }
    })?;
    tracing::info!("{} lists {total} page(s)", config.url);
    if total > config.max_pages {
        return Err(ScrapeError::TooManyPages {
            url: config.url.to_string(),
            pages: total,
            max: config.max_pages,
        });
    }

    progress.begin(total);
    let pages = fetch_pages(source, config, total, progress);
    progress.finish();

    let mut result = ScrapeResult::from_pages(pages?);
    result.duration_ms = start.elapsed().as_millis();

    if result.records.is_empty() {
        return Err(ScrapeError::EmptyResult { url: config.url.to_string() });
    }

    tracing::debug!("scrape finished in {}ms", result.duration_ms);
    Ok(result)
}

fn fetch_pages(
    source: &dyn PageSource,
    config: &Config,
    total: u32,
    progress: &mut dyn Progress,
) -> Result<Vec<PageResult>, ScrapeError> {
    if config.workers <= 1 || total <= 1 {
        let mut pages = Vec::new();
        for page in 1..=total {
            let result = fetch_page(source, &config.url, page, config.retry)?;
            progress.page_done(page, total, result.records.len());
            pages.push(result);
        }
        return Ok(pages);
    }

    let workers = config.workers.min(total as usize);
    let next = AtomicU64::new(1);
    let stop = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let (next, stop) = (&next, &stop);
            scope.spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let page = match u32::try_from(next.fetch_add(1, Ordering::Relaxed)) {
                        Ok(page) if page <= total => page,
                        _ => break,
                    };
                    let result = fetch_page(source, &config.url, page, config.retry);
                    if tx.send((page, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut pages = BTreeMap::new();
        let mut failure = None;
        for (page, result) in rx {
            match result {
                Ok(page_result) => {
                    progress.page_done(page, total, page_result.records.len());
                    pages.insert(page, page_result);
                }
                Err(e) => {
                    stop.store(true, Ordering::Relaxed);
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(pages.into_values().collect()),
        }
    })
}

fn fetch_page(
    source: &dyn PageSource,
    base: &Url,
    page: u32,
    retry: RetryConfig,
) -> Result<PageResult, ScrapeError> {
    let url = pagination::page_url(base, page);
    let body = fetch_body(source, &url, page, retry)?;
    let result = extract::extract(&Html::parse_document(&body), &url, page);
    tracing::debug!("page {page}: {} products", result.records.len());
    Ok(result)
}

fn fetch_body(
    source: &dyn PageSource,
    url: &Url,
    page: u32,
    retry: RetryConfig,
) -> Result<String, ScrapeError> {
    let (body, attempts) = retry_with_backoff(
        retry,
        || source.fetch(url),
        |err| {
            tracing::warn!("page {page}: {err}");
            err.is_retryable()
        },
    );
    body.map_err(|err| ScrapeError::PageFetchFailed { page, attempts, source: err })
}
