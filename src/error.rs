use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("GitHub token is required. Pass --github-token or set the GITHUB_TOKEN environment variable.")]
    MissingToken,

    #[error("GitHub rejected the token (401 Unauthorized)")]
    Unauthorized,

    #[error("GitHub API rate limit exhausted{}", format_reset(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("API error: {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_reset(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!("; resets at {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rate_limit_message_includes_reset() {
        let reset_at = Utc.timestamp_opt(1_700_000_000, 0).single();
        let err = SearchError::RateLimited { reset_at };
        assert_eq!(
            err.to_string(),
            "GitHub API rate limit exhausted; resets at 2023-11-14 22:13:20 UTC"
        );
    }

    #[test]
    fn rate_limit_message_without_reset() {
        let err = SearchError::RateLimited { reset_at: None };
        assert_eq!(err.to_string(), "GitHub API rate limit exhausted");
    }
}
