use crate::error::Result;
use crate::types::{RawItem, SourceDescriptor, SourceType};
use async_trait::async_trait;

pub mod api;
pub mod feed;
pub mod scrape;

/// Common capability all source fetchers implement: retrieve the raw
/// per-source items for one configured source. Errors surface to the
/// orchestrator, which converts them into the zero-items-plus-warning path.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(
        &self,
        client: &reqwest::Client,
        source: &SourceDescriptor,
    ) -> Result<Vec<RawItem>>;
}

/// Pick the fetcher for a source's configured type.
pub fn fetcher_for(source_type: SourceType) -> &'static dyn SourceFetcher {
    match source_type {
        SourceType::Feed => &feed::FeedFetcher,
        SourceType::Api => &api::ApiFetcher,
        SourceType::Scrape => &scrape::ScrapeFetcher,
    }
}
