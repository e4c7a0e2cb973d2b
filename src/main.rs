//! # Good News Bot
//!
//! A news pipeline that scrapes articles from a fixed catalog of good-news
//! sources, stores newly seen articles in a local SQLite database, and
//! forwards unsent articles to a Telegram channel in chronological order.
//!
//! ## Usage
//!
//! ```sh
//! API_KEY=... CHAT_ID=... good_news_bot
//! good_news_bot --dry-run
//! ```
//!
//! ## Architecture
//!
//! One run walks the pipeline once and exits:
//! 1. **Listing phase**: Discover candidate article URLs from each source root
//! 2. **Article phase**: Fetch each candidate and normalize it into a `NewsItem`
//! 3. **Admission**: Dedup by URL and drop articles outside the recency window
//! 4. **Delivery**: Send stored-but-unsent articles to Telegram, oldest first
//!
//! Per-item failures are logged and isolated; only a failure to open the
//! store aborts the run.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod delivery;
mod fetch;
mod models;
mod scrape;
mod store;
mod telegram;
mod timefmt;

use cli::Cli;
use config::RunConfig;
use fetch::PageFetcher;
use scrape::catalog::SourceCatalog;
use scrape::scraper::Scraper;
use store::{Admission, NewsStore};
use telegram::TelegramTransport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let default_filter = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(dry_run = args.dry_run, "good_news_bot starting up");

    let cfg = RunConfig::from_cli(args.dry_run);
    let catalog = SourceCatalog::default_catalog();

    // The store opens first; nothing may proceed without it. Dry runs skip
    // the schema bootstrap so a rehearsal leaves no table behind.
    let news_store = NewsStore::open(&cfg.db_path, !cfg.dry_run).await?;

    // ---- Scrape ----
    let user_agent = fetch::pick_user_agent(&mut rand::rng());
    debug!(%user_agent, "Selected user agent");
    let fetcher = PageFetcher::new(user_agent, cfg.request_timeout, cfg.request_delay)?;
    let news_scraper = Scraper::new(&fetcher, &catalog);

    let candidate_urls = news_scraper.collect_listing_urls().await;
    info!(
        count = candidate_urls.len(),
        "Total number of news received. Processing the news..."
    );
    let items = news_scraper.fetch_articles(candidate_urls).await;

    // ---- Admission ----
    let now = chrono::Local::now().naive_local();
    for item in &items {
        debug!(
            url = %item.url,
            category = %item.category,
            posted = %item.posted,
            title = %item.title,
            paragraphs = item.paragraphs.len(),
            "Scraped item"
        );
        if cfg.dry_run {
            info!(url = %item.url, "DRY-RUN: item would be checked and inserted");
            continue;
        }
        let window = catalog.window_for(&item.url);
        match news_store.admit(item, now, window).await {
            Ok(Admission::Inserted) => {
                info!(url = %item.url, "Item inserted into the database")
            }
            Ok(Admission::Duplicate) => {
                info!(url = %item.url, "Item already exists in the database")
            }
            Ok(Admission::Stale) => {
                info!(
                    url = %item.url,
                    posted = %item.posted,
                    window_days = window,
                    "Item is outside the recency window; not inserted"
                )
            }
            Err(e) => error!(url = %item.url, error = %e, "Error processing item"),
        }
    }

    // ---- Delivery ----
    info!("Running delivery of unsent items...");
    match TelegramTransport::from_env(cfg.request_timeout) {
        Ok(transport) => {
            if let Err(e) = delivery::process_unsent(&news_store, &transport, cfg.dry_run).await {
                error!(error = %e, "Error processing unsent items");
            }
        }
        Err(e) => {
            warn!(
                error = %e,
                "Telegram transport not configured; leaving unsent items for a future run"
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );

    Ok(())
}
