// src/ingest/types.rs
use anyhow::Result;

/// One entry of the polled feed, as delivered by a provider.
///
/// Every field is optional: feeds in the wild omit any of them, and the
/// job decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub iso_date: Option<String>, // RFC 3339 (Atom published/updated, dc:date)
    pub pub_date: Option<String>, // RFC 2822 (RSS pubDate)
    pub creator: Option<String>,
    pub author: Option<String>,
    pub content_snippet: Option<String>, // plain text
    pub content: Option<String>,         // raw, may contain markup
}

#[async_trait::async_trait]
pub trait FeedProvider {
    async fn fetch_latest(&self) -> Result<Vec<FeedItem>>;
    fn name(&self) -> &'static str;
}
