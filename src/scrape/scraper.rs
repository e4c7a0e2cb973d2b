//! Two-phase scrape orchestration across the source catalog.
//!
//! The listing phase visits every source root and collects candidate
//! article URLs; the article phase visits every surviving candidate and
//! produces normalized [`NewsItem`]s. Failures are local: a bad source
//! root, a failed fetch, or a rejected article never aborts the run.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use itertools::Itertools;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::fetch::PageFetcher;
use crate::models::NewsItem;
use crate::scrape::catalog::SourceCatalog;
use crate::scrape::extract;
use crate::scrape::normalize::{self, NormalizeError};

/// Catalog-driven scraper for one run.
pub struct Scraper<'a> {
    fetcher: &'a PageFetcher,
    catalog: &'a SourceCatalog,
}

impl<'a> Scraper<'a> {
    pub fn new(fetcher: &'a PageFetcher, catalog: &'a SourceCatalog) -> Self {
        Self { fetcher, catalog }
    }

    /// Listing phase: fetch every source root once and run all of that
    /// source's listing selectors against the one document.
    ///
    /// A source whose root URL does not parse is skipped with a log. The
    /// combined candidate list is deduplicated preserving first-seen order,
    /// with empty strings and the configured source roots themselves
    /// excluded — a site's own root page is never an article.
    #[instrument(level = "info", skip_all)]
    pub async fn collect_listing_urls(&self) -> Vec<String> {
        let mut candidates = Vec::new();

        for entry in self.catalog.entries() {
            let base = match Url::parse(&entry.source_url) {
                Ok(base) => base,
                Err(e) => {
                    warn!(
                        source = %entry.source_url,
                        error = %e,
                        "Source root URL does not parse; proceeding without it"
                    );
                    continue;
                }
            };
            match self.fetcher.fetch_page(&entry.source_url).await {
                Ok(html) => {
                    let urls = extract::listing_urls(&html, &base, &entry.listing_selectors);
                    info!(source = %entry.source_url, count = urls.len(), "Indexed listing URLs");
                    candidates.extend(urls);
                }
                Err(e) => {
                    warn!(
                        source = %entry.source_url,
                        error = %e,
                        "Listing fetch failed; source yields no URLs this run"
                    );
                }
            }
        }

        let roots = self.root_urls();
        let urls: Vec<String> = dedupe_candidates(candidates, &roots);
        debug!(?urls, "Candidate article URLs after dedup");
        urls
    }

    /// Article phase: fetch each candidate, extract with its owning
    /// source's rules, and normalize. Candidates whose host matches no
    /// catalog entry are skipped; per-article errors drop only that
    /// article.
    #[instrument(level = "info", skip_all)]
    pub async fn fetch_articles(&self, urls: Vec<String>) -> Vec<NewsItem> {
        let items: Vec<NewsItem> = stream::iter(urls)
            .then(|url| async move { self.scrape_article(url).await })
            .filter_map(std::future::ready)
            .collect()
            .await;

        info!(count = items.len(), "Fetched article contents");
        items
    }

    async fn scrape_article(&self, url: String) -> Option<NewsItem> {
        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(%url, error = %e, "Candidate URL does not parse; skipping");
                return None;
            }
        };
        let Some(entry) = self.catalog.entry_for(&parsed) else {
            warn!(%url, "No catalog entry matches this URL's host; skipping");
            return None;
        };

        let html = match self.fetcher.fetch_page(&url).await {
            Ok(html) => html,
            Err(e) => {
                error!(%url, error = %e, "Article fetch failed");
                return None;
            }
        };

        let raw = extract::article_fields(&url, &html, &entry.article);
        match normalize::normalize(raw) {
            Ok(item) => {
                debug!(%url, title = %item.title, posted = %item.posted, "Scraped article");
                Some(item)
            }
            Err(NormalizeError::EmptyBody) => {
                warn!(%url, "Article produced no body text; dropping");
                None
            }
            Err(e) => {
                error!(%url, error = %e, "Article rejected");
                None
            }
        }
    }

    /// Normalized root URLs of every configured source, in both raw and
    /// parsed forms so that either spelling is excluded from candidates.
    fn root_urls(&self) -> HashSet<String> {
        let mut roots = HashSet::new();
        for entry in self.catalog.entries() {
            roots.insert(entry.source_url.clone());
            if let Ok(parsed) = Url::parse(&entry.source_url) {
                roots.insert(parsed.to_string());
            }
        }
        roots
    }
}

/// Deduplicate candidates preserving first-seen order, dropping empty
/// strings and any URL equal to a configured source root.
fn dedupe_candidates(candidates: Vec<String>, roots: &HashSet<String>) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|url| !url.is_empty() && !roots.contains(url))
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_preserves_first_seen_order() {
        let candidates = vec![
            "https://a.example/1".to_string(),
            "https://a.example/2".to_string(),
            "https://a.example/1".to_string(),
            "https://a.example/3".to_string(),
            "https://a.example/2".to_string(),
        ];
        let urls = dedupe_candidates(candidates, &HashSet::new());
        assert_eq!(
            urls,
            vec![
                "https://a.example/1".to_string(),
                "https://a.example/2".to_string(),
                "https://a.example/3".to_string(),
            ]
        );
    }

    #[test]
    fn test_dedupe_drops_roots_and_empties() {
        let mut roots = HashSet::new();
        roots.insert("https://a.example/".to_string());
        let candidates = vec![
            "".to_string(),
            "https://a.example/".to_string(),
            "https://a.example/story".to_string(),
        ];
        let urls = dedupe_candidates(candidates, &roots);
        assert_eq!(urls, vec!["https://a.example/story".to_string()]);
    }
}
