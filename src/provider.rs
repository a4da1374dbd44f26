//! Seams between the pipeline and the services it talks to.
//!
//! [`crate::GitHubSearcher`] implements both traits against the GitHub REST
//! and GraphQL APIs; tests substitute fixed fixtures.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ResultSet;

#[async_trait]
pub trait SearchProvider {
    /// Fetch pages 1..=`max_pages` of `query`, stopping early at the first
    /// page holding fewer than `per_page` results, and group the matches by
    /// repository.
    async fn search(&self, query: &str, per_page: u32, max_pages: u32) -> Result<ResultSet>;
}

#[async_trait]
pub trait MetadataProvider {
    /// Attach star counts and descriptions to the repositories in `repos`.
    /// Entries the provider cannot resolve come back unchanged.
    async fn enrich(&self, repos: ResultSet) -> Result<ResultSet>;
}
