use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::json;
use tokio::fs;
use tracing::info;

use crate::error::Result;
use crate::models::{Repository, ResultSet};

/// Number of repositories shown in the console report.
pub const REPORT_LIMIT: usize = 20;

/// Matched file paths listed per repository before eliding the rest.
pub const FILES_SHOWN: usize = 3;

/// Order repositories by stars, most popular first. The sort is stable, so
/// ties (including repositories with unknown stars) keep search order.
pub fn rank(repos: ResultSet) -> Vec<Repository> {
    let mut ranked = repos.into_repositories();
    ranked.sort_by(|a, b| b.popularity().cmp(&a.popularity()));
    ranked
}

/// Write the top `limit` repositories as a numbered, human-readable list.
pub fn render_report<W: Write>(
    out: &mut W,
    ranked: &[Repository],
    query: &str,
    limit: usize,
) -> std::io::Result<()> {
    writeln!(out, "Query: {}", query)?;
    writeln!(out, "Found {} repositories", ranked.len())?;
    writeln!(out)?;
    writeln!(out, "Top {} repositories by stars:", limit.min(ranked.len()))?;

    for (i, repo) in ranked.iter().take(limit).enumerate() {
        writeln!(out)?;
        writeln!(out, "{}. {}", i + 1, repo.full_name)?;
        match repo.stars {
            Some(stars) => writeln!(out, "   Stars: {}", stars)?,
            None => writeln!(out, "   Stars: N/A")?,
        }
        if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(out, "   Description: {}", description)?;
        }
        writeln!(out, "   Matched files: {}", repo.files.len())?;
        for file in repo.files.iter().take(FILES_SHOWN) {
            writeln!(out, "     - {}", file.path)?;
        }
        if repo.files.len() > FILES_SHOWN {
            writeln!(out, "     ... and {} more", repo.files.len() - FILES_SHOWN)?;
        }
        writeln!(out, "   URL: {}", repo.html_url)?;
    }

    Ok(())
}

/// Save the full ranked list, not just the reported top entries.
pub async fn save_results(path: &Path, query: &str, ranked: &[Repository]) -> Result<()> {
    let document = json!({
        "query": query,
        "generated_at": Utc::now().to_rfc3339(),
        "total_repositories": ranked.len(),
        "repositories": ranked,
    });

    let mut bytes = serde_json::to_vec_pretty(&document)?;
    bytes.push(b'\n');
    fs::write(path, bytes).await?;

    info!("Saved {} repositories to '{}'", ranked.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileMatch;
    use pretty_assertions::assert_eq;

    fn file(path: &str) -> FileMatch {
        FileMatch {
            path: path.to_string(),
            ..Default::default()
        }
    }

    fn repo(name: &str, stars: Option<u64>) -> Repository {
        let mut repo = Repository::new(name, format!("https://github.com/{name}"));
        repo.stars = stars;
        repo
    }

    fn set_of(repos: Vec<Repository>) -> ResultSet {
        let mut set = ResultSet::new();
        for repo in repos {
            let path = format!("{}/file", repo.full_name);
            set.add_match(repo, file(&path));
        }
        set
    }

    fn names(ranked: &[Repository]) -> Vec<&str> {
        ranked.iter().map(|r| r.full_name.as_str()).collect()
    }

    #[test]
    fn ranks_by_stars_with_unknown_last() {
        let set = set_of(vec![
            repo("o/a", Some(50)),
            repo("o/b", Some(200)),
            repo("o/c", None),
        ]);
        assert_eq!(names(&rank(set)), vec!["o/b", "o/a", "o/c"]);
    }

    #[test]
    fn ties_keep_search_order() {
        let set = set_of(vec![
            repo("o/none1", None),
            repo("o/ten1", Some(10)),
            repo("o/zero", Some(0)),
            repo("o/ten2", Some(10)),
            repo("o/none2", None),
        ]);
        assert_eq!(
            names(&rank(set)),
            vec!["o/ten1", "o/ten2", "o/none1", "o/zero", "o/none2"]
        );
    }

    #[test]
    fn report_elides_files_past_three() {
        let mut r = repo("o/big", Some(7));
        r.description = Some("Big repo".into());
        r.files = ["a.rs", "b.rs", "c.rs", "d.rs", "e.rs"]
            .iter()
            .map(|p| file(p))
            .collect();

        let mut out = Vec::new();
        render_report(&mut out, &[r], "fn main", REPORT_LIMIT).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Query: fn main\n\
             Found 1 repositories\n\
             \n\
             Top 1 repositories by stars:\n\
             \n\
             1. o/big\n   \
             Stars: 7\n   \
             Description: Big repo\n   \
             Matched files: 5\n     \
             - a.rs\n     \
             - b.rs\n     \
             - c.rs\n     \
             ... and 2 more\n   \
             URL: https://github.com/o/big\n"
        );
    }

    #[test]
    fn report_marks_missing_stars_and_skips_missing_description() {
        let mut r = repo("o/quiet", None);
        r.files = vec![file("x.py")];

        let mut out = Vec::new();
        render_report(&mut out, &[r], "q", REPORT_LIMIT).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("   Stars: N/A\n"));
        assert!(!text.contains("Description"));
        assert!(!text.contains("more"));
    }

    #[test]
    fn report_is_capped_at_limit() {
        let ranked: Vec<_> = (0..25)
            .map(|i| repo(&format!("o/r{i}"), Some(100 - i)))
            .collect();

        let mut out = Vec::new();
        render_report(&mut out, &ranked, "q", REPORT_LIMIT).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Found 25 repositories"));
        assert!(text.contains("\n20. o/r19\n"));
        assert!(!text.contains("21. "));
    }

    #[test]
    fn empty_report_shows_no_entries() {
        let mut out = Vec::new();
        render_report(&mut out, &[], "nothing", REPORT_LIMIT).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Query: nothing\nFound 0 repositories\n\nTop 0 repositories by stars:\n"
        );
    }

    #[tokio::test]
    async fn saves_full_ranked_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.json");

        let ranked: Vec<_> = (0..30)
            .map(|i| repo(&format!("o/r{i}"), Some(i)))
            .collect();
        save_results(&path, "needle", &ranked).await.unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["query"], "needle");
        assert_eq!(saved["total_repositories"], 30);
        assert_eq!(saved["repositories"].as_array().unwrap().len(), 30);
        assert_eq!(saved["repositories"][3]["full_name"], "o/r3");
        assert_eq!(saved["repositories"][3]["stars"], 3);
        assert!(saved["generated_at"].as_str().is_some());
    }
}
