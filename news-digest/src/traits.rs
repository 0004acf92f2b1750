use crate::types::Result;
use async_trait::async_trait;

/// Trait for retrieving raw documents over the network
#[async_trait]
pub trait ContentFetch: Send + Sync {
    /// Fetch a feed document (RSS/Atom XML) as text
    async fn fetch_feed(&self, url: &str) -> Result<String>;

    /// Fetch an article page as HTML
    async fn fetch_article(&self, url: &str) -> Result<String>;
}
