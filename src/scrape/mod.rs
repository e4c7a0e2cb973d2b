//! Catalog-driven scraping pipeline.
//!
//! Scraping is split into small stages that each do one thing:
//!
//! | Stage | Module | Responsibility |
//! |-------|--------|----------------|
//! | Catalog | [`catalog`] | Per-site selectors, timestamp layouts, recency windows |
//! | Extract | [`extract`] | Run selector queries over fetched pages |
//! | Normalize | [`normalize`] | Validate and shape raw fields into a `NewsItem` |
//! | Orchestrate | [`scraper`] | Listing phase, article phase, failure isolation |
//!
//! New sites are added by appending a catalog entry — the extraction logic
//! itself never changes per site.

pub mod catalog;
pub mod extract;
pub mod normalize;
pub mod scraper;
