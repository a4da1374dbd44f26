use std::env;
use std::path::PathBuf;

use crate::error::{Result, SearchError};
use crate::query::build_query;
use crate::Args;

/// Environment variable consulted when `--github-token` is not given.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// GitHub code search caps a page at 100 results.
pub const PER_PAGE: u32 = 100;

/// Everything a run needs, resolved from the command line and environment.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub query: String,
    pub token: String,
    pub per_page: u32,
    pub max_pages: u32,
    pub output: PathBuf,
    pub verbose: bool,
}

impl SearchConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let token = resolve_token(args.github_token.as_deref(), env::var(TOKEN_ENV_VAR).ok())?;

        Ok(SearchConfig {
            query: build_query(
                &args.query,
                &args.language,
                &args.extension,
                &args.additional_params,
            ),
            token,
            per_page: PER_PAGE,
            max_pages: args.pages,
            output: PathBuf::from(&args.output),
            verbose: args.verbose,
        })
    }
}

/// Pick the token from the flag, then the environment. Blank values count as
/// missing.
pub fn resolve_token(flag: Option<&str>, env_value: Option<String>) -> Result<String> {
    match flag {
        Some(t) if !t.trim().is_empty() => Ok(t.to_string()),
        _ => match env_value {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(SearchError::MissingToken),
        },
    }
}
