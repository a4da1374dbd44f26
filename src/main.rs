use std::error::Error;
use std::io::{self, Write};
use std::process;

use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info, Level};

use github_repo_ranker_lib::{
    render_report, run_pipeline, save_results, Args, GitHubSearcher, SearchConfig, SearchError,
    REPORT_LIMIT,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let args = Args::parse();

    // Logs go to stderr so the report on stdout stays clean.
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    // Resolved before any client exists, so a missing token means no requests.
    let config = match SearchConfig::from_args(&args) {
        Ok(config) => config,
        Err(e @ SearchError::MissingToken) => {
            error!("GitHub token not provided or found in environment");
            println!("Error: {}", e);
            process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let searcher = GitHubSearcher::from_config(&config)?;
    let ranked = run_pipeline(
        &searcher,
        &searcher,
        &config.query,
        config.per_page,
        config.max_pages,
    )
    .await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_report(&mut out, &ranked, &config.query, REPORT_LIMIT)?;
    out.flush()?;
    drop(out);

    save_results(&config.output, &config.query, &ranked).await?;
    println!();
    println!("Full results saved to {}", config.output.display());

    info!("Finished");
    Ok(())
}
