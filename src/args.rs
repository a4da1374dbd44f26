use clap::Parser;

/// Search GitHub code for a pattern and rank the repositories that contain it
/// by star count.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Searches GitHub code for a pattern, looks up star counts and descriptions for every matching repository in batch, and prints the most popular ones."
)]
pub struct Args {
    /// Code pattern to search for.
    #[clap(short, long)]
    pub query: String,

    /// Restrict matches to a programming language.
    #[clap(short, long, default_value = "")]
    pub language: String,

    /// Restrict matches to a file extension (without the dot).
    #[clap(short, long, default_value = "")]
    pub extension: String,

    /// Extra search qualifiers appended verbatim, e.g. "path:src size:>1000".
    #[clap(long, default_value = "")]
    pub additional_params: String,

    /// Maximum number of result pages to fetch.
    /// Each page contains up to 100 results.
    #[clap(
        short,
        long,
        default_value = "5",
        value_name = "NUM",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub pages: u32,

    /// GitHub API token. Falls back to the GITHUB_TOKEN environment variable.
    #[clap(long)]
    pub github_token: Option<String>,

    /// Output file path for the ranked results in JSON format.
    #[clap(short, long, default_value = "repos.json")]
    pub output: String,

    /// Log requests and per-page details.
    #[clap(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let args = Args::parse_from(["github-repo-ranker", "-q", "fn main"]);
        assert_eq!(args.query, "fn main");
        assert_eq!(args.language, "");
        assert_eq!(args.extension, "");
        assert_eq!(args.additional_params, "");
        assert_eq!(args.pages, 5);
        assert_eq!(args.github_token, None);
        assert_eq!(args.output, "repos.json");
        assert!(!args.verbose);
    }

    #[test]
    fn short_and_long_flags() {
        let args = Args::parse_from([
            "github-repo-ranker",
            "--query",
            "tokio::select!",
            "-l",
            "rust",
            "-e",
            "rs",
            "--additional-params",
            "path:src",
            "-p",
            "2",
            "--github-token",
            "abc",
            "-o",
            "out.json",
            "-v",
        ]);
        assert_eq!(args.language, "rust");
        assert_eq!(args.extension, "rs");
        assert_eq!(args.additional_params, "path:src");
        assert_eq!(args.pages, 2);
        assert_eq!(args.github_token.as_deref(), Some("abc"));
        assert_eq!(args.output, "out.json");
        assert!(args.verbose);
    }

    #[test]
    fn query_is_required() {
        assert!(Args::try_parse_from(["github-repo-ranker"]).is_err());
    }

    #[test]
    fn zero_pages_rejected() {
        assert!(Args::try_parse_from(["github-repo-ranker", "-q", "x", "-p", "0"]).is_err());
    }
}
