//! labelgate - changelog label check for CI
//!
//! Fails when a pull request merged since the latest release does not carry
//! exactly one label from the changelog categories in `.github/release.yml`.
//!
//! ## Exit codes
//!
//! - `0`: every PR merged since the release has exactly one pool label
//! - `1`: at least one PR has zero or several pool labels
//! - `2`: the check could not run (config, network, or API error)

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use labelgate_core::{
    init_tracing, run_check, write_report, ExitStatus, GitHubClient, GitHubConfig, LabelPool,
    Paging, Repository, DEFAULT_API_URL, DEFAULT_CONFIG_PATH, MAX_PER_PAGE,
};
use tracing::{debug, Level};

const ERROR_EXIT_CODE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "labelgate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Check that PRs merged since the latest release carry exactly one changelog label",
    long_about = None
)]
struct Cli {
    /// Repository to check, as owner/name
    #[arg(short, long, env = "GITHUB_REPOSITORY")]
    repo: String,

    /// Release config listing the changelog label categories
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// GitHub token (requests are unauthenticated when empty)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Timeout for each API request, in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Closed pull requests requested per page (1-100)
    #[arg(long, default_value_t = MAX_PER_PAGE)]
    per_page: u32,

    /// Maximum number of pull request pages to read
    #[arg(long, default_value = "10")]
    max_pages: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let outcome = run(cli).await;
    if let Err(err) = &outcome {
        eprintln!("Error: {:#}", err);
    }
    ExitCode::from(exit_code(&outcome))
}

/// Map a run outcome to the process exit code.
fn exit_code(outcome: &Result<ExitStatus>) -> u8 {
    match outcome {
        Ok(status) => status.code(),
        Err(_) => ERROR_EXIT_CODE,
    }
}

async fn run(cli: Cli) -> Result<ExitStatus> {
    let repo: Repository = cli.repo.parse()?;
    let pool = LabelPool::load(&cli.config)
        .with_context(|| format!("Failed to load label pool from {:?}", cli.config))?;
    debug!(labels = ?pool.iter().collect::<Vec<_>>(), "label pool");

    let github = GitHubClient::new(github_config(&cli)).context("Failed to create GitHub client")?;
    let paging = Paging {
        per_page: cli.per_page,
        max_pages: cli.max_pages,
    };

    let report = run_check(&github, &pool, &repo, paging)
        .await
        .with_context(|| format!("Label check failed for {}", repo))?;

    let mut stdout = std::io::stdout().lock();
    write_report(&mut stdout, &report.classification).context("Failed to write report")?;

    Ok(report.classification.exit_status())
}

fn github_config(cli: &Cli) -> GitHubConfig {
    let config =
        GitHubConfig::new(&cli.api_url).with_timeout(Duration::from_secs(cli.timeout_secs));
    match cli.token.as_deref() {
        Some(token) => config.with_token(token),
        None => config,
    }
}
