//! Raw extraction output → normalized [`NewsItem`].
//!
//! The normalizer is where an article earns the right to be persisted: it
//! must have at least one non-empty body paragraph and a canonical publish
//! timestamp. Everything else (empty category, empty image) is tolerated.

use thiserror::Error;

use crate::models::NewsItem;
use crate::scrape::extract::RawArticle;

/// Why an article was rejected during normalization.
///
/// Both variants are local to the one article; the scraper logs them and
/// moves on to the next candidate.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// No non-empty body text survived extraction; there is nothing to
    /// deliver.
    #[error("article has no body text")]
    EmptyBody,
    /// Neither the attribute path nor the prose fallback produced a
    /// parseable timestamp. An undatable article cannot be
    /// freshness-filtered, so it never reaches storage.
    #[error("article has no parseable publish timestamp")]
    MissingTimestamp,
}

/// Normalize raw extracted fields into a [`NewsItem`].
///
/// A single captured text blob is split on internal newlines first — legacy
/// layouts emit the whole body as one element with embedded line breaks.
/// Paragraphs are trimmed and empties dropped; the lead excerpt is the
/// first paragraph, or the first two joined by a space when the body has at
/// least two.
pub fn normalize(raw: RawArticle) -> Result<NewsItem, NormalizeError> {
    let paragraphs: Vec<String> = if raw.paragraphs.len() == 1 {
        raw.paragraphs[0]
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        raw.paragraphs
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    };

    if paragraphs.is_empty() {
        return Err(NormalizeError::EmptyBody);
    }
    if raw.posted.is_empty() {
        return Err(NormalizeError::MissingTimestamp);
    }

    let excerpt = if paragraphs.len() >= 2 {
        format!("{} {}", paragraphs[0], paragraphs[1])
    } else {
        paragraphs[0].clone()
    };

    Ok(NewsItem {
        url: raw.url,
        category: raw.category.trim().to_string(),
        posted: raw.posted,
        title: raw.title.trim().to_string(),
        image: raw.image,
        paragraphs,
        excerpt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(paragraphs: Vec<&str>) -> RawArticle {
        RawArticle {
            url: "https://news.example.org/a/1".to_string(),
            paragraphs: paragraphs.into_iter().map(str::to_string).collect(),
            category: "Science".to_string(),
            title: "Headline".to_string(),
            posted: "01-03-2024 10:15:30".to_string(),
            image: "https://cdn.example/lead.jpg".to_string(),
        }
    }

    #[test]
    fn test_single_blob_splits_on_newlines() {
        let item = normalize(raw(vec!["Para one.\nPara two."])).unwrap();
        assert_eq!(item.paragraphs, vec!["Para one.", "Para two."]);
    }

    #[test]
    fn test_already_split_input_unchanged() {
        let item = normalize(raw(vec!["Para one.", "Para two."])).unwrap();
        assert_eq!(item.paragraphs, vec!["Para one.", "Para two."]);
    }

    #[test]
    fn test_empty_body_rejected_despite_other_fields() {
        assert!(matches!(normalize(raw(vec![])), Err(NormalizeError::EmptyBody)));
        assert!(matches!(
            normalize(raw(vec!["   ", "\n"])),
            Err(NormalizeError::EmptyBody)
        ));
    }

    #[test]
    fn test_missing_timestamp_is_hard_failure() {
        let mut input = raw(vec!["Para one."]);
        input.posted = String::new();
        assert!(matches!(
            normalize(input),
            Err(NormalizeError::MissingTimestamp)
        ));
    }

    #[test]
    fn test_excerpt_single_paragraph() {
        let item = normalize(raw(vec!["Only paragraph."])).unwrap();
        assert_eq!(item.excerpt, "Only paragraph.");
    }

    #[test]
    fn test_excerpt_joins_first_two_paragraphs() {
        let item = normalize(raw(vec!["One.", "Two.", "Three."])).unwrap();
        assert_eq!(item.excerpt, "One. Two.");
    }

    #[test]
    fn test_title_and_category_trimmed() {
        let mut input = raw(vec!["Para."]);
        input.title = "  Headline \n".to_string();
        input.category = " Science ".to_string();
        let item = normalize(input).unwrap();
        assert_eq!(item.title, "Headline");
        assert_eq!(item.category, "Science");
    }
}
