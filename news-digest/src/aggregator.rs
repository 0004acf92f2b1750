use crate::parser::FeedParser;
use crate::relevance::KeywordSet;
use crate::traits::ContentFetch;
use crate::types::{AggregatorError, CandidateEntry, FailureKind, FeedItem, FeedSource, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Candidates gathered from every configured feed, plus what went wrong.
#[derive(Debug, Clone, Default)]
pub struct CandidateBatch {
    pub candidates: Vec<CandidateEntry>,
    pub feeds_attempted: usize,
    pub feeds_failed: usize,
    pub entries_seen: usize,
    pub failures: Vec<(String, FailureKind)>,
}

pub struct RssAggregator {
    fetcher: Arc<dyn ContentFetch>,
    parser: FeedParser,
    keywords: KeywordSet,
}

impl RssAggregator {
    pub fn new(fetcher: Arc<dyn ContentFetch>, parser: FeedParser, keywords: KeywordSet) -> Self {
        Self {
            fetcher,
            parser,
            keywords,
        }
    }

    /// Fetch and parse one feed.
    pub async fn pull_feed(&self, source: &FeedSource) -> Result<Vec<FeedItem>> {
        let content = self.fetcher.fetch_feed(&source.url).await?;

        if !FeedParser::is_valid_feed_content(&content) {
            return Err(AggregatorError::Parse(format!(
                "Response from {} does not look like RSS or Atom",
                source.url
            )));
        }

        self.parser.parse_feed(&content)
    }

    /// Pull every site in order and keep the entries whose titles match a keyword.
    ///
    /// A failing site contributes no entries and is counted in the batch; the
    /// remaining sites are still read.
    pub async fn collect_candidates(&self, sites: &[FeedSource]) -> CandidateBatch {
        let mut batch = CandidateBatch::default();

        info!("Fetching {} feeds", sites.len());

        for source in sites {
            batch.feeds_attempted += 1;

            let items = match self.pull_feed(source).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Skipping feed {} ({}): {}", source.name, source.url, e);
                    batch.feeds_failed += 1;
                    batch.failures.push((source.url.clone(), e.kind()));
                    continue;
                }
            };

            batch.entries_seen += items.len();
            let before = batch.candidates.len();

            for item in items {
                if self.keywords.matches(&item.title) {
                    batch.candidates.push(CandidateEntry::from_item(item, source));
                } else {
                    debug!("Not relevant: {:?}", item.title);
                }
            }

            info!(
                "Feed {}: {} relevant entries",
                source.name,
                batch.candidates.len() - before
            );
        }

        info!(
            "Collected {} candidates from {}/{} feeds",
            batch.candidates.len(),
            batch.feeds_attempted - batch.feeds_failed,
            batch.feeds_attempted
        );
        batch
    }
}
