use tracing::info;

use crate::error::Result;
use crate::models::Repository;
use crate::provider::{MetadataProvider, SearchProvider};
use crate::report::rank;

/// Search, enrich, then rank. Stages run one after another and the first
/// failure aborts the run; no partial results are returned.
pub async fn run_pipeline<S, M>(
    search: &S,
    metadata: &M,
    query: &str,
    per_page: u32,
    max_pages: u32,
) -> Result<Vec<Repository>>
where
    S: SearchProvider + Sync + ?Sized,
    M: MetadataProvider + Sync + ?Sized,
{
    info!("Searching code for '{}' (up to {} pages)", query, max_pages);
    let found = search.search(query, per_page, max_pages).await?;
    info!(
        "Found {} files across {} repositories",
        found.file_count(),
        found.len()
    );

    let enriched = metadata.enrich(found).await?;
    Ok(rank(enriched))
}
