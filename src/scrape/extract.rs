//! Selector-driven field extraction from fetched pages.
//!
//! Pages are fetched once and parsed once; every configured selector then
//! runs as an independent query against the parsed document. Extraction
//! never fails a run: a selector that matches nothing simply yields an
//! empty field, and the normalizer decides what is fatal for the article.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

use crate::scrape::catalog::{ArticleRules, PostedRule};
use crate::timefmt;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Raw field values pulled from one article page, before normalization.
///
/// `posted` is already canonicalized (`DD-MM-YYYY HH:MM:SS`) or empty when
/// neither the attribute path nor the prose fallback produced a parseable
/// timestamp.
#[derive(Debug, Clone)]
pub struct RawArticle {
    pub url: String,
    pub paragraphs: Vec<String>,
    pub category: String,
    pub title: String,
    pub posted: String,
    pub image: String,
}

/// Collect candidate article URLs from a listing page.
///
/// For every selector in order, takes the `href` of the first anchor
/// descendant of each matched element and resolves it against `base`.
/// Unresolvable hrefs and selectors that fail to parse are skipped with a
/// log; order of discovery is preserved and nothing is deduplicated here.
pub fn listing_urls(html: &str, base: &Url, selectors: &[String]) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut urls = Vec::new();

    for raw_selector in selectors {
        let selector = match Selector::parse(raw_selector) {
            Ok(s) => s,
            Err(e) => {
                warn!(selector = %raw_selector, error = %e, "Skipping unparsable listing selector");
                continue;
            }
        };
        for element in document.select(&selector) {
            let Some(anchor) = element.select(&ANCHOR).next() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            match base.join(href) {
                Ok(resolved) => urls.push(resolved.to_string()),
                Err(e) => warn!(%href, error = %e, "Skipping unresolvable listing href"),
            }
        }
    }

    urls
}

/// Run one pass of selector matching per field over an article page.
///
/// The body selector captures every match, trimmed, in document order, with
/// empty-after-trim matches discarded. Category, title, and image take the
/// first match. See [`extract_posted`] for the timestamp paths.
pub fn article_fields(url: &str, html: &str, rules: &ArticleRules) -> RawArticle {
    let document = Html::parse_document(html);

    let paragraphs = match parse_selector(&rules.text_selector) {
        Some(selector) => document
            .select(&selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect(),
        None => Vec::new(),
    };

    let category = first_text(&document, &rules.category_selector);
    let title = first_text(&document, &rules.title_selector);
    let posted = extract_posted(&document, &rules.posted);
    let image = first_attr(&document, &rules.image.selector, &rules.image.attribute);

    RawArticle {
        url: url.to_string(),
        paragraphs,
        category,
        title,
        posted,
        image,
    }
}

/// Extract and canonicalize the publish timestamp.
///
/// Primary path: the configured attribute of the first matched element,
/// parsed under the source's declared layout. Fallback path: when the
/// attribute yields nothing and the element has visible text, the
/// configured regex pulls a date substring out of the prose and the
/// secondary layout parses it. Both paths failing leaves `posted` empty.
fn extract_posted(document: &Html, rule: &PostedRule) -> String {
    let Some(selector) = parse_selector(&rule.selector) else {
        return String::new();
    };
    let Some(element) = document.select(&selector).next() else {
        return String::new();
    };

    let attr_value = element.value().attr(&rule.attribute).unwrap_or_default();
    if let Some(canonical) = timefmt::to_canonical(attr_value, &rule.layout) {
        return canonical;
    }

    let text = element_text(element);
    if text.is_empty() {
        return String::new();
    }
    let Some(fallback) = &rule.fallback else {
        return String::new();
    };
    let re = match Regex::new(&fallback.regex) {
        Ok(re) => re,
        Err(e) => {
            warn!(regex = %fallback.regex, error = %e, "Unparsable posted fallback regex");
            return String::new();
        }
    };
    re.find(&text)
        .and_then(|m| timefmt::to_canonical(m.as_str(), &fallback.layout))
        .unwrap_or_default()
}

fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = %raw, error = %e, "Skipping unparsable selector");
            None
        }
    }
}

fn element_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(document: &Html, raw_selector: &str) -> String {
    parse_selector(raw_selector)
        .and_then(|selector| document.select(&selector).next().map(element_text))
        .unwrap_or_default()
}

fn first_attr(document: &Html, raw_selector: &str, attribute: &str) -> String {
    parse_selector(raw_selector)
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr(attribute))
                .map(str::to_string)
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::catalog::{ImageRule, TextFallback};

    fn rules() -> ArticleRules {
        ArticleRules {
            text_selector: ".entry-content p".to_string(),
            category_selector: ".post-categories a".to_string(),
            title_selector: ".entry-title".to_string(),
            posted: PostedRule {
                selector: "time.updated".to_string(),
                attribute: "datetime".to_string(),
                layout: "%Y-%m-%dT%H:%M:%S%:z".to_string(),
                fallback: None,
            },
            image: ImageRule {
                selector: "img.wp-post-image".to_string(),
                attribute: "src".to_string(),
            },
        }
    }

    #[test]
    fn test_listing_urls_first_anchor_per_match() {
        let html = r#"
            <div class="teaser"><a href="/a/1">one</a><a href="/a/other">ignored</a></div>
            <div class="teaser"><span><a href="https://other.example/b/2">two</a></span></div>
            <div class="teaser"><p>no link here</p></div>
        "#;
        let base = Url::parse("https://news.example.org/").unwrap();
        let urls = listing_urls(html, &base, &["div.teaser".to_string()]);
        assert_eq!(
            urls,
            vec![
                "https://news.example.org/a/1".to_string(),
                "https://other.example/b/2".to_string(),
            ]
        );
    }

    #[test]
    fn test_listing_urls_runs_selectors_in_order() {
        let html = r#"
            <article class="post"><a href="/second">s</a></article>
            <div class="featured"><a href="/first">f</a></div>
        "#;
        let base = Url::parse("https://news.example.org/").unwrap();
        let urls = listing_urls(
            html,
            &base,
            &["div.featured".to_string(), "article.post".to_string()],
        );
        assert_eq!(
            urls,
            vec![
                "https://news.example.org/first".to_string(),
                "https://news.example.org/second".to_string(),
            ]
        );
    }

    #[test]
    fn test_article_fields_body_in_document_order() {
        let html = r#"
            <h1 class="entry-title"> Headline </h1>
            <div class="post-categories"><a>Science</a></div>
            <time class="updated" datetime="2024-03-01T10:15:30+03:00">1 March</time>
            <img class="wp-post-image" src="https://cdn.example/lead.jpg">
            <div class="entry-content">
                <p>First paragraph.</p>
                <p>   </p>
                <p>Second paragraph.</p>
            </div>
        "#;
        let raw = article_fields("https://news.example.org/a/1", html, &rules());
        assert_eq!(raw.paragraphs, vec!["First paragraph.", "Second paragraph."]);
        assert_eq!(raw.title, "Headline");
        assert_eq!(raw.category, "Science");
        assert_eq!(raw.posted, "01-03-2024 10:15:30");
        assert_eq!(raw.image, "https://cdn.example/lead.jpg");
    }

    #[test]
    fn test_article_fields_missing_everything() {
        let raw = article_fields("https://news.example.org/a/2", "<html></html>", &rules());
        assert!(raw.paragraphs.is_empty());
        assert!(raw.title.is_empty());
        assert!(raw.category.is_empty());
        assert!(raw.posted.is_empty());
        assert!(raw.image.is_empty());
    }

    #[test]
    fn test_posted_fallback_parses_date_from_prose() {
        let mut rules = rules();
        rules.posted.fallback = Some(TextFallback {
            regex: r"\d{2}\.\d{2}\.\d{4}".to_string(),
            layout: "%d.%m.%Y".to_string(),
        });
        let html = r#"<time class="updated">Опубликовано 05.03.2024 редакцией</time>"#;
        let raw = article_fields("https://news.example.org/a/3", html, &rules);
        assert_eq!(raw.posted, "05-03-2024 00:00:00");
    }

    #[test]
    fn test_posted_attribute_wins_over_fallback() {
        let mut rules = rules();
        rules.posted.fallback = Some(TextFallback {
            regex: r"\d{2}\.\d{2}\.\d{4}".to_string(),
            layout: "%d.%m.%Y".to_string(),
        });
        let html =
            r#"<time class="updated" datetime="2024-03-01T10:15:30+03:00">05.03.2024</time>"#;
        let raw = article_fields("https://news.example.org/a/4", html, &rules);
        assert_eq!(raw.posted, "01-03-2024 10:15:30");
    }

    #[test]
    fn test_posted_empty_when_both_paths_fail() {
        let html = r#"<time class="updated" datetime="not-a-date">no date here</time>"#;
        let raw = article_fields("https://news.example.org/a/5", html, &rules());
        assert_eq!(raw.posted, "");
    }
}
