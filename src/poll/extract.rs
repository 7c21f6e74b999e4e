//! Candidate listing extraction
//!
//! Deliberately thin: rows and title links are located with configurable
//! CSS selectors, and any row missing either piece is skipped.

use dom_query::Document;

/// A candidate posting found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Title text as shown on the page
    pub title: String,

    /// Link target as found in the markup (may be relative)
    pub href: String,
}

impl Listing {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
        }
    }
}

/// Turns a listing page into candidate postings, in page order
pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> Vec<Listing>;
}

/// CSS-selector based extractor
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    item_selector: String,
    title_selector: String,
}

impl SelectorExtractor {
    pub fn new(item_selector: impl Into<String>, title_selector: impl Into<String>) -> Self {
        Self {
            item_selector: item_selector.into(),
            title_selector: title_selector.into(),
        }
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, html: &str) -> Vec<Listing> {
        let doc = Document::from(html);
        let Some(items) = doc.try_select(&self.item_selector) else {
            return vec![];
        };

        let mut listings = vec![];
        for item in items.iter() {
            let Some(link) = item.try_select(&self.title_selector) else {
                continue;
            };
            let link = link.first();

            let title = link.text().trim().to_string();
            let href = link
                .attr("href")
                .map(|h| h.trim().to_string())
                .unwrap_or_default();

            if title.is_empty() || href.is_empty() {
                continue;
            }
            listings.push(Listing { title, href });
        }

        listings
    }
}
