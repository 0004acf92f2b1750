pub mod defs;

pub use defs::{ArticleRecord, CandidateEntry, FeedItem, FeedSource, STORE_COLUMNS};
