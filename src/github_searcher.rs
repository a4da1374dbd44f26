use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::models::{FileMatch, RepoMetadata, Repository, ResultSet};
use crate::provider::{MetadataProvider, SearchProvider};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repositories looked up per GraphQL request.
pub const ENRICH_BATCH_SIZE: usize = 50;

/// GitHub client for both passes: REST code search, then GraphQL metadata.
pub struct GitHubSearcher {
    client: Client,
    token: String,
    api_base: String,
    show_progress: bool,
}

impl GitHubSearcher {
    /// Create a new GitHubSearcher instance
    pub fn new(token: impl Into<String>, show_progress: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("github-repo-ranker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(GitHubSearcher {
            client,
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            show_progress,
        })
    }

    /// Spinner is hidden in verbose mode so it does not fight with the logs.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        Self::new(config.token.clone(), !config.verbose)
    }

    /// Point both the REST and GraphQL endpoints at another host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn spinner(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn search_pages(
        &self,
        query: &str,
        per_page: u32,
        max_pages: u32,
        pb: &ProgressBar,
    ) -> Result<ResultSet> {
        let mut results = ResultSet::new();

        for page in 1..=max_pages {
            pb.set_message(format!("Searching '{}' - page {}", query, page));

            let Some(items) = self.search_page(query, page, per_page).await? else {
                break;
            };

            for item in &items {
                match parse_search_item(item) {
                    Some((repo, file)) => results.add_match(repo, file),
                    None => warn!("Skipping search result without a repository on page {}", page),
                }
            }

            info!(
                "Page {} returned {} results for '{}'",
                page,
                items.len(),
                query
            );

            if items.len() < per_page as usize {
                debug!("No more results for '{}'", query);
                break;
            }
            if page == max_pages {
                info!(
                    "Max page limit reached for '{}' (limit: {})",
                    query, max_pages
                );
            }
        }

        Ok(results)
    }

    /// Fetch one page of code search results. `None` means GitHub will not
    /// serve any more pages for this query.
    async fn search_page(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Option<Vec<Value>>> {
        let url = format!("{}/search/code", self.api_base);
        debug!("Requesting {} q='{}' page={} per_page={}", url, query, page, per_page);

        let response = self
            .authorized(self.client.get(&url))
            .header("Accept", "application/vnd.github.text-match+json")
            .query(&[
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await?;

        log_rate_limit(response.headers());

        // Past the 1000-result window GitHub answers 422 instead of an empty page.
        if response.status() == StatusCode::UNPROCESSABLE_ENTITY && page > 1 {
            warn!("Reached search limit for '{}' at page {}", query, page);
            return Ok(None);
        }

        let response = check_status(response).await?;
        let mut json = read_json(response, "code search").await?;

        match json.get_mut("items").map(Value::take) {
            Some(Value::Array(items)) => Ok(Some(items)),
            _ => Err(SearchError::MalformedResponse(format!(
                "no 'items' array in code search page {}",
                page
            ))),
        }
    }

    async fn fetch_metadata(&self, batch: &[(&str, &str)]) -> Result<Vec<Option<RepoMetadata>>> {
        let url = format!("{}/graphql", self.api_base);
        debug!("Requesting metadata for {} repositories", batch.len());

        let response = self
            .authorized(self.client.post(&url))
            .json(&build_metadata_query(batch))
            .send()
            .await?;

        log_rate_limit(response.headers());
        let response = check_status(response).await?;
        let body = read_json(response, "GraphQL").await?;

        parse_metadata_response(&body, batch.len())
    }

    async fn enrich_batches(&self, mut repos: ResultSet, pb: &ProgressBar) -> Result<ResultSet> {
        let ids: Vec<String> = repos.keys().map(str::to_string).collect();
        let mut targets = Vec::with_capacity(ids.len());
        for id in &ids {
            match split_full_name(id) {
                Some((owner, name)) => targets.push((id.as_str(), owner, name)),
                None => warn!("Cannot look up '{}': not an owner/name identifier", id),
            }
        }

        let total_batches = targets.len().div_ceil(ENRICH_BATCH_SIZE);
        let mut resolved = 0;

        for (i, chunk) in targets.chunks(ENRICH_BATCH_SIZE).enumerate() {
            pb.set_message(format!(
                "Fetching metadata batch {}/{}",
                i + 1,
                total_batches
            ));

            let pairs: Vec<(&str, &str)> = chunk.iter().map(|(_, o, n)| (*o, *n)).collect();
            let metadata = self.fetch_metadata(&pairs).await?;

            for ((id, _, _), meta) in chunk.iter().zip(metadata) {
                match meta {
                    Some(meta) => {
                        repos.augment(id, meta);
                        resolved += 1;
                    }
                    None => debug!("No metadata for '{}', keeping search fields", id),
                }
            }
        }

        info!("Resolved metadata for {}/{} repositories", resolved, ids.len());
        Ok(repos)
    }
}

#[async_trait]
impl SearchProvider for GitHubSearcher {
    async fn search(&self, query: &str, per_page: u32, max_pages: u32) -> Result<ResultSet> {
        let pb = self.spinner();
        let result = self.search_pages(query, per_page, max_pages, &pb).await;
        pb.finish_and_clear();
        result
    }
}

#[async_trait]
impl MetadataProvider for GitHubSearcher {
    async fn enrich(&self, repos: ResultSet) -> Result<ResultSet> {
        if repos.is_empty() {
            return Ok(repos);
        }
        let pb = self.spinner();
        let result = self.enrich_batches(repos, &pb).await;
        pb.finish_and_clear();
        result
    }
}

/// Map a non-success response onto the error taxonomy.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(SearchError::Unauthorized);
    }

    let headers = response.headers();
    let exhausted = header_u64(headers, "X-RateLimit-Remaining") == Some(0);
    if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && exhausted) {
        return Err(SearchError::RateLimited {
            reset_at: rate_limit_reset(headers),
        });
    }

    let message = match response.text().await {
        Ok(body) => error_message(&body),
        Err(e) => {
            warn!("Could not read {} response body: {}", status, e);
            String::new()
        }
    };
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("no response body").to_string()
    } else {
        message
    };

    Err(SearchError::Api { status, message })
}

/// GitHub error bodies carry a `message` field; anything else is kept as is.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

async fn read_json(response: Response, what: &str) -> Result<Value> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        SearchError::MalformedResponse(format!("{} response is not JSON: {}", what, e))
    })
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let reset = header_u64(headers, "X-RateLimit-Reset")?;
    Utc.timestamp_opt(i64::try_from(reset).ok()?, 0).single()
}

fn log_rate_limit(headers: &HeaderMap) {
    if let (Some(remaining), Some(limit)) = (
        header_u64(headers, "X-RateLimit-Remaining"),
        header_u64(headers, "X-RateLimit-Limit"),
    ) {
        debug!("Rate limit: {}/{}", remaining, limit);
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

/// Split a code search item into its repository seed and the matched file.
fn parse_search_item(item: &Value) -> Option<(Repository, FileMatch)> {
    let repo = item.get("repository")?;
    let full_name = repo.get("full_name").and_then(Value::as_str)?;

    let mut repository = Repository::new(full_name, str_field(repo, "html_url"));
    repository.owner = repo
        .get("owner")
        .map(|o| str_field(o, "login"))
        .unwrap_or_default();
    repository.description = repo
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    let fragments = item
        .get("text_matches")
        .and_then(Value::as_array)
        .map(|matches| {
            matches
                .iter()
                .filter_map(|m| m.get("fragment").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let file = FileMatch {
        path: str_field(item, "path"),
        name: str_field(item, "name"),
        sha: str_field(item, "sha"),
        html_url: str_field(item, "html_url"),
        fragments,
    };

    Some((repository, file))
}

fn split_full_name(full_name: &str) -> Option<(&str, &str)> {
    let (owner, name) = full_name.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}

/// One aliased `repository` field per entry, owner/name bound as variables.
fn build_metadata_query(batch: &[(&str, &str)]) -> Value {
    let mut params = Vec::with_capacity(batch.len());
    let mut fields = Vec::with_capacity(batch.len());
    let mut variables = Map::new();

    for (i, (owner, name)) in batch.iter().enumerate() {
        params.push(format!("$o{i}: String!, $n{i}: String!"));
        fields.push(format!(
            "r{i}: repository(owner: $o{i}, name: $n{i}) {{ stargazerCount description url }}"
        ));
        variables.insert(format!("o{i}"), json!(owner));
        variables.insert(format!("n{i}"), json!(name));
    }

    json!({
        "query": format!("query({}) {{ {} }}", params.join(", "), fields.join(" ")),
        "variables": variables,
    })
}

/// Read alias `r{i}` for each entry of the batch. A `null` alias means the
/// repository could not be resolved.
fn parse_metadata_response(body: &Value, batch_len: usize) -> Result<Vec<Option<RepoMetadata>>> {
    let errors = body
        .get("errors")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for err in errors {
        let message = str_field(err, "message");
        if err.get("type").and_then(Value::as_str) == Some("NOT_FOUND") {
            debug!("GraphQL: {}", message);
        } else {
            warn!("GraphQL: {}", message);
        }
    }

    let data = match body.get("data") {
        Some(Value::Object(data)) => data,
        _ if !errors.is_empty() => {
            let messages: Vec<String> = errors.iter().map(|e| str_field(e, "message")).collect();
            return Err(SearchError::GraphQl(messages.join("; ")));
        }
        _ => {
            return Err(SearchError::MalformedResponse(
                "GraphQL response has no data".to_string(),
            ))
        }
    };

    Ok((0..batch_len)
        .map(|i| match data.get(&format!("r{i}")) {
            Some(repo @ Value::Object(_)) => Some(RepoMetadata {
                stars: repo.get("stargazerCount").and_then(Value::as_u64),
                description: repo
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                url: repo.get("url").and_then(Value::as_str).map(str::to_string),
            }),
            _ => None,
        })
        .collect())
}
