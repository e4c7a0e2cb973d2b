//! Data models for scraped and stored news items.
//!
//! This module defines the two shapes an article takes on its way through
//! the pipeline:
//! - [`NewsItem`]: a normalized article as produced by the scraper, before
//!   it is persisted
//! - [`QueuedItem`]: the projection of a stored row that the delivery queue
//!   works with
//!
//! The full paragraph list only exists on [`NewsItem`]; once a row is read
//! back for delivery, the lead excerpt is all the caption needs.

use serde::{Deserialize, Serialize};

/// A normalized news article produced by the scraper.
///
/// Born in the article phase, validated by the normalizer (at least one
/// non-empty paragraph, a parseable timestamp), and persisted by the
/// dedup/freshness gate with `item_was_sent = false`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewsItem {
    /// Canonical article URL; globally unique in storage.
    pub url: String,
    /// Section or category label scraped from the article page.
    pub category: String,
    /// Publish timestamp in canonical `DD-MM-YYYY HH:MM:SS` form.
    pub posted: String,
    /// The article headline.
    pub title: String,
    /// URL of the lead image.
    pub image: String,
    /// Ordered, trimmed, non-empty body paragraphs. Never empty once
    /// normalized.
    pub paragraphs: Vec<String>,
    /// Short summary derived from the first one or two paragraphs.
    pub excerpt: String,
}

/// A stored article as seen by the delivery queue.
///
/// Only the fields a Telegram caption needs survive the projection; the
/// paragraph list stays behind in the `text` column.
#[derive(Debug, Clone)]
pub struct QueuedItem {
    /// Row id in the `news_items` table.
    pub id: i64,
    /// Section or category label.
    pub category: String,
    /// Publish timestamp in canonical form; drives delivery order.
    pub posted: String,
    /// The article headline.
    pub title: String,
    /// URL of the lead image, sent as the photo.
    pub image: String,
    /// Lead excerpt used as the caption body.
    pub excerpt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_item_serialization() {
        let item = NewsItem {
            url: "https://example.com/story".to_string(),
            category: "World".to_string(),
            posted: "01-03-2024 10:15:30".to_string(),
            title: "Test headline".to_string(),
            image: "https://example.com/lead.jpg".to_string(),
            paragraphs: vec!["First.".to_string(), "Second.".to_string()],
            excerpt: "First. Second.".to_string(),
        };

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("https://example.com/story"));
        assert!(json.contains("01-03-2024 10:15:30"));

        let back: NewsItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.paragraphs.len(), 2);
        assert_eq!(back.excerpt, "First. Second.");
    }

    #[test]
    fn test_queued_item_fields() {
        let item = QueuedItem {
            id: 7,
            category: "World".to_string(),
            posted: "01-03-2024 10:15:30".to_string(),
            title: "Test headline".to_string(),
            image: "https://example.com/lead.jpg".to_string(),
            excerpt: "First. Second.".to_string(),
        };
        assert_eq!(item.id, 7);
        assert_eq!(item.excerpt, "First. Second.");
    }
}
