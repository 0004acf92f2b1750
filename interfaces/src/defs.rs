use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column order of the persisted record table.
pub const STORE_COLUMNS: [&str; 5] = ["Title", "Link", "Source", "Published", "Summary"];

/// A configured news site and the feed it publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A `(title, link)` pair as read from a feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
}

/// A feed entry that passed keyword filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    pub title: String,
    pub link: String,
    pub source: String,
}

impl CandidateEntry {
    pub fn from_item(item: FeedItem, source: &FeedSource) -> Self {
        Self {
            title: item.title,
            link: item.link,
            source: source.name.clone(),
        }
    }
}

/// One row of the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Published")]
    pub published: DateTime<Utc>,
    #[serde(rename = "Summary")]
    pub summary: String,
}

impl ArticleRecord {
    pub fn from_candidate(candidate: CandidateEntry, published: DateTime<Utc>, summary: String) -> Self {
        Self {
            title: candidate.title,
            link: candidate.link,
            source: candidate.source,
            published,
            summary,
        }
    }
}

// Lifecycle note:
// FeedItem and CandidateEntry live only for the duration of one pipeline pass.
// ArticleRecord is written once and never updated; the store is the only state
// that survives between invocations.
