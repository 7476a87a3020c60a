//! labelgate core library
//!
//! Checks that every pull request merged since the latest release of a
//! GitHub repository carries exactly one label from the repository's
//! changelog label pool (`.github/release.yml`).
//!
//! The pipeline is: [`LabelPool::load`] → [`run_check`] (latest release,
//! closed PRs, [`classify_since`]) → [`render_report`] and
//! [`Classification::exit_status`].

pub mod check;
pub mod classify;
pub mod config;
pub mod error;
pub mod fakes;
pub mod github;
pub mod report;
pub mod telemetry;

pub use check::{run_check, CheckReport};
pub use classify::{
    classify, classify_since, matching_labels, merged_since, Classification, ExitStatus,
    InvalidPr,
};
pub use config::{Category, ChangelogConfig, LabelPool, ReleaseConfig, DEFAULT_CONFIG_PATH};
pub use error::{LabelGateError, Result};
pub use github::{
    fetch_closed_pulls_since, GitHubApi, GitHubClient, GitHubConfig, Label, Paging, PullRequest,
    Release, Repository, DEFAULT_API_URL, MAX_PER_PAGE,
};
pub use report::{render_report, write_report};
pub use telemetry::init_tracing;
