use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A file inside a repository that matched the search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileMatch {
    pub path: String,
    pub name: String,
    pub sha: String,
    pub html_url: String,
    /// Matched snippets returned with the text-match media type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fragments: Vec<String>,
}

/// A repository with every file that matched, plus metadata once enriched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name`, the key shared by the search and metadata passes.
    pub full_name: String,
    pub html_url: String,
    pub owner: String,
    pub stars: Option<u64>,
    pub description: Option<String>,
    pub files: Vec<FileMatch>,
}

impl Repository {
    pub fn new(full_name: impl Into<String>, html_url: impl Into<String>) -> Self {
        Repository {
            full_name: full_name.into(),
            html_url: html_url.into(),
            ..Default::default()
        }
    }

    /// Star count used for ranking; unknown popularity ranks as zero.
    pub fn popularity(&self) -> u64 {
        self.stars.unwrap_or(0)
    }
}

/// Attributes the metadata pass can attach to a repository.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepoMetadata {
    pub stars: Option<u64>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Repositories keyed by `full_name`, kept in first-seen order.
///
/// Keys are only introduced by [`ResultSet::add_match`] during the search
/// pass. [`ResultSet::augment`] can extend an existing entry but never adds or
/// removes one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    repos: Vec<Repository>,
    index: HashMap<String, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a matched file, merging it into the entry for its repository.
    /// `repo` only seeds the entry the first time its key is seen.
    pub fn add_match(&mut self, repo: Repository, file: FileMatch) {
        match self.index.get(&repo.full_name) {
            Some(&i) => self.repos[i].files.push(file),
            None => {
                let mut repo = repo;
                repo.files.push(file);
                self.index.insert(repo.full_name.clone(), self.repos.len());
                self.repos.push(repo);
            }
        }
    }

    /// Attach metadata to an existing entry. Returns `false` when the key is
    /// unknown, in which case nothing changes.
    pub fn augment(&mut self, full_name: &str, metadata: RepoMetadata) -> bool {
        let Some(&i) = self.index.get(full_name) else {
            return false;
        };
        let repo = &mut self.repos[i];

        if let Some(stars) = metadata.stars {
            repo.stars = Some(stars);
        }
        if let Some(description) = metadata.description {
            repo.description = Some(description);
        }
        if repo.html_url.is_empty() {
            if let Some(url) = metadata.url {
                repo.html_url = url;
            }
        }
        true
    }

    pub fn get(&self, full_name: &str) -> Option<&Repository> {
        self.index.get(full_name).map(|&i| &self.repos[i])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.repos.iter().map(|r| r.full_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Repository> {
        self.repos.iter()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.repos.iter().map(|r| r.files.len()).sum()
    }

    /// Entries in insertion order.
    pub fn into_repositories(self) -> Vec<Repository> {
        self.repos
    }
}
