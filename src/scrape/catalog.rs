//! Source catalog: per-site extraction rules keyed by scheme+host.
//!
//! Every supported site is one [`SourceEntry`] — data, not code. Adding a
//! site means appending an entry with its selectors and timestamp layout;
//! the extractor and scraper never branch on hostnames themselves.
//!
//! The catalog ships with a built-in default covering the production
//! sources and can also be loaded from YAML, which is how new deployments
//! override selectors without a rebuild.

use serde::{Deserialize, Serialize};
use url::Url;

/// Recency window applied when an entry does not declare its own.
pub const DEFAULT_RECENCY_WINDOW_DAYS: i64 = 14;

/// Regex-based fallback for sites that render the publish date only inside
/// prose rather than in a machine-readable attribute.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextFallback {
    /// Regular expression whose whole match is the date substring.
    pub regex: String,
    /// Chrono layout the matched substring parses under.
    pub layout: String,
}

/// Where and how to read the publish timestamp from an article page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostedRule {
    /// Selector of the element carrying the timestamp.
    pub selector: String,
    /// Attribute holding the machine-readable value.
    pub attribute: String,
    /// Chrono layout of the attribute value.
    pub layout: String,
    /// Optional prose fallback when the attribute yields nothing.
    #[serde(default)]
    pub fallback: Option<TextFallback>,
}

/// Where to read the lead image URL from an article page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageRule {
    pub selector: String,
    pub attribute: String,
}

/// Field-extraction rules for one site's article pages.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArticleRules {
    /// Selector matching every body-text element, in document order.
    pub text_selector: String,
    /// Selector for the category label.
    pub category_selector: String,
    /// Selector for the headline.
    pub title_selector: String,
    pub posted: PostedRule,
    pub image: ImageRule,
}

/// One site in the catalog: its root URL, the selectors that yield article
/// links from the root page, and the rules for article pages.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceEntry {
    /// Root URL; identifies the site and anchors host attribution.
    pub source_url: String,
    /// Maximum article age, in days, admitted at insert time.
    #[serde(default = "default_window")]
    pub recency_window_days: i64,
    /// Selectors whose matches contain anchor elements linking to articles.
    pub listing_selectors: Vec<String>,
    /// Extraction rules for this site's article pages.
    pub article: ArticleRules,
}

fn default_window() -> i64 {
    DEFAULT_RECENCY_WINDOW_DAYS
}

/// The full set of configured sources for a run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceCatalog {
    pub sources: Vec<SourceEntry>,
}

impl SourceCatalog {
    /// Load a catalog from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.sources
    }

    /// Find the entry owning `url` by scheme+host equality with the entry's
    /// root URL. Entries whose root does not parse never match.
    pub fn entry_for(&self, url: &Url) -> Option<&SourceEntry> {
        self.sources.iter().find(|entry| {
            Url::parse(&entry.source_url)
                .map(|root| root.scheme() == url.scheme() && root.host_str() == url.host_str())
                .unwrap_or(false)
        })
    }

    /// The recency window for the source owning `url`, or the default when
    /// the URL belongs to no configured source.
    pub fn window_for(&self, url: &str) -> i64 {
        Url::parse(url)
            .ok()
            .and_then(|u| self.entry_for(&u))
            .map(|entry| entry.recency_window_days)
            .unwrap_or(DEFAULT_RECENCY_WINDOW_DAYS)
    }

    /// The built-in production catalog.
    pub fn default_catalog() -> Self {
        Self {
            sources: vec![
                SourceEntry {
                    source_url: "https://positivnews.ru/".to_string(),
                    recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
                    listing_selectors: vec![
                        "div.digital-newspaper-container".to_string(),
                        "article.post".to_string(),
                    ],
                    article: ArticleRules {
                        text_selector: ".entry-content p".to_string(),
                        category_selector: ".post-categories a".to_string(),
                        title_selector: ".entry-title".to_string(),
                        posted: PostedRule {
                            selector: ".entry-meta time.updated".to_string(),
                            attribute: "datetime".to_string(),
                            layout: "%Y-%m-%dT%H:%M:%S%:z".to_string(),
                            fallback: None,
                        },
                        image: ImageRule {
                            selector: "div.post-inner div.post-thumbnail img.wp-post-image"
                                .to_string(),
                            attribute: "src".to_string(),
                        },
                    },
                },
                SourceEntry {
                    source_url: "https://ntdtv.ru/c/pozitivnye-novosti".to_string(),
                    recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
                    listing_selectors: vec!["div.entry-image".to_string()],
                    article: ArticleRules {
                        text_selector: "div#cont_post p".to_string(),
                        category_selector: "span.entry-category a".to_string(),
                        title_selector: "header.entry-header h1".to_string(),
                        posted: PostedRule {
                            selector: "span.entry-date time".to_string(),
                            attribute: "datetime".to_string(),
                            layout: "%Y-%m-%d %H:%M:%S".to_string(),
                            // Some article layouts only carry the date in the
                            // visible text, e.g. "Опубликовано 05.03.2024".
                            fallback: Some(TextFallback {
                                regex: r"\d{2}\.\d{2}\.\d{4}".to_string(),
                                layout: "%d.%m.%Y".to_string(),
                            }),
                        },
                        image: ImageRule {
                            selector: "link[itemprop=thumbnailUrl]".to_string(),
                            attribute: "href".to_string(),
                        },
                    },
                },
            ],
        }
    }
}
