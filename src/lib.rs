//! # GitHub Repo Ranker
//!
//! A Rust library for searching code on GitHub and ranking the repositories
//! that contain it by popularity.
//!
//! ## Main Components
//!
//! - [`build_query`]: turns a pattern and optional qualifiers into one search query
//! - [`GitHubSearcher`]: paginated code search plus batched GraphQL metadata lookups
//! - [`run_pipeline`]: search, enrich and rank in one call
//! - [`render_report`] / [`save_results`]: console summary and JSON output
//! - [`Args`]: Command line argument structure for configuring a search
//!
//! ## Example
//!
//! ```no_run
//! use github_repo_ranker_lib::{run_pipeline, GitHubSearcher, SearchConfig, Args};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = SearchConfig::from_args(&Args::parse())?;
//!     let searcher = GitHubSearcher::from_config(&config)?;
//!
//!     let ranked = run_pipeline(
//!         &searcher,
//!         &searcher,
//!         &config.query,
//!         config.per_page,
//!         config.max_pages,
//!     )
//!     .await?;
//!     println!("{} repositories", ranked.len());
//!
//!     Ok(())
//! }
//! ```

mod args;
mod config;
mod error;
mod github_searcher;
mod models;
mod pipeline;
mod provider;
mod query;
mod report;

// Re-export main components for documentation and external use
pub use crate::args::Args;
pub use crate::config::{resolve_token, SearchConfig, PER_PAGE, TOKEN_ENV_VAR};
pub use crate::error::{Result, SearchError};
pub use crate::github_searcher::{GitHubSearcher, DEFAULT_API_BASE, ENRICH_BATCH_SIZE};
pub use crate::models::{FileMatch, RepoMetadata, Repository, ResultSet};
pub use crate::pipeline::run_pipeline;
pub use crate::provider::{MetadataProvider, SearchProvider};
pub use crate::query::build_query;
pub use crate::report::{rank, render_report, save_results, FILES_SHOWN, REPORT_LIMIT};
