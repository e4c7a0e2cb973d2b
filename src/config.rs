//! Run configuration threaded through every component.
//!
//! The scraper, the store, and the delivery queue all receive a [`RunConfig`]
//! from `main` instead of consulting process-wide flags. `--dry-run` lives
//! here; `--debug` only affects the tracing filter and never needs to travel.

use std::time::Duration;

/// Configuration for a single run of the pipeline.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Skip every write and every outbound Telegram call; scraping and
    /// logging still happen.
    pub dry_run: bool,
    /// Delay slept after each outbound page fetch, to rate-limit the
    /// scraped sites.
    pub request_delay: Duration,
    /// Bound on any single HTTP request, so one hung site cannot stall the
    /// whole batch.
    pub request_timeout: Duration,
    /// Path of the SQLite database file.
    pub db_path: String,
}

impl RunConfig {
    /// Build a config from the parsed CLI flags, with the stock defaults
    /// for everything the CLI does not expose.
    pub fn from_cli(dry_run: bool) -> Self {
        Self {
            dry_run,
            request_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(15),
            db_path: "data/news_items.db".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RunConfig::from_cli(false);
        assert!(!cfg.dry_run);
        assert_eq!(cfg.request_delay, Duration::from_millis(500));
        assert_eq!(cfg.request_timeout, Duration::from_secs(15));
        assert_eq!(cfg.db_path, "data/news_items.db");
    }

    #[test]
    fn test_dry_run_flag_carried() {
        assert!(RunConfig::from_cli(true).dry_run);
    }
}
