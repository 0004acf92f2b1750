use crate::types::{AggregatorError, FeedItem, Result};
use feed_rs::parser;
use std::collections::HashSet;
use tracing::debug;

pub struct FeedParser {
    max_entries: usize,
}

impl FeedParser {
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }

    /// Parse an RSS/Atom document into `(title, link)` pairs, in feed order.
    ///
    /// Only the first `max_entries` entries of the document are considered.
    /// Entries without a title or link, and repeats of a link already seen in
    /// this document, are skipped.
    pub fn parse_feed(&self, content: &str) -> Result<Vec<FeedItem>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let mut seen_urls = HashSet::new();
        let mut items = Vec::new();

        for entry in feed.entries.into_iter().take(self.max_entries) {
            let Some(item) = Self::parse_entry(entry) else {
                continue;
            };

            if !seen_urls.insert(item.link.clone()) {
                debug!("Skipping duplicate entry with URL: {}", item.link);
                continue;
            }
            items.push(item);
        }

        debug!("Parsed feed with {} usable entries", items.len());
        Ok(items)
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> Option<FeedItem> {
        let title = entry
            .title
            .map(|t| t.content.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|t| !t.is_empty())?;

        let link = entry.links.first()?.href.trim().to_string();
        if link.is_empty() {
            return None;
        }

        Some(FeedItem { title, link })
    }

    pub fn is_valid_feed_content(content: &str) -> bool {
        let content_lower = content.to_lowercase();

        content_lower.contains("<rss")
            || content_lower.contains("<feed")
            || content_lower.contains("<channel")
            || content_lower.contains("<rdf:rdf")
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new(5)
    }
}
