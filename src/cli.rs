//! Command-line interface definitions for Good News Bot.
//!
//! This module defines the CLI arguments using the `clap` crate. The surface
//! is intentionally tiny: one flag to rehearse a run without side effects,
//! one flag to turn up logging.

use clap::Parser;

/// Command-line arguments for the Good News Bot application.
///
/// # Examples
///
/// ```sh
/// # Normal run: scrape, store, deliver
/// good_news_bot
///
/// # Scrape only; no table creation, no inserts, no Telegram calls
/// good_news_bot --dry-run
///
/// # Verbose logging
/// good_news_bot --debug
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Perform a dry run: sources are still scraped, but nothing is written
    /// to the database and nothing is sent to Telegram
    #[arg(long)]
    pub dry_run: bool,

    /// Output more information during the run
    #[arg(long)]
    pub debug: bool,
}
