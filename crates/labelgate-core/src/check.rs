//! End-to-end label check: latest release, closed PRs, classification.

use tracing::{info, instrument, warn};

use crate::classify::{classify, merged_since, Classification};
use crate::config::LabelPool;
use crate::error::Result;
use crate::github::{fetch_closed_pulls_since, GitHubApi, Paging, Release, Repository};

/// Outcome of one check run.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub release: Release,
    /// Closed PRs read from the API
    pub fetched: usize,
    /// PRs merged after the release
    pub considered: usize,
    pub classification: Classification,
}

/// Run the label check against `repo`.
///
/// Any API failure aborts the run. Label problems are reported through the
/// returned [`Classification`], not as errors.
#[instrument(skip(api, pool), fields(repo = %repo, pool_size = pool.len()))]
pub async fn run_check(
    api: &dyn GitHubApi,
    pool: &LabelPool,
    repo: &Repository,
    paging: Paging,
) -> Result<CheckReport> {
    let release = api.latest_release(repo).await?;
    let since = release.created_at;

    let pulls = fetch_closed_pulls_since(api, repo, since, paging).await?;
    let merged = merged_since(&pulls, since);
    let considered = merged.len();
    let classification = classify(merged, pool);

    for pr in &classification.invalid {
        if pr.matched.is_empty() {
            warn!(pr = pr.number, url = %pr.html_url, "no changelog label");
        } else {
            warn!(pr = pr.number, url = %pr.html_url, labels = ?pr.matched, "multiple changelog labels");
        }
    }

    info!(
        fetched = pulls.len(),
        considered,
        valid = classification.valid.len(),
        invalid = classification.invalid.len(),
        "label check finished"
    );

    Ok(CheckReport {
        release,
        fetched: pulls.len(),
        considered,
        classification,
    })
}
