//! GitHub REST API access.
//!
//! [`GitHubApi`] is the seam the check pipeline depends on; [`GitHubClient`]
//! implements it over `reqwest`, and [`crate::fakes::FakeGitHub`] implements
//! it in memory for tests. Pagination of the closed-PR listing is handled by
//! [`fetch_closed_pulls_since`] on top of the single-page trait method.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{LabelGateError, Result};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest page size the pulls endpoint accepts.
pub const MAX_PER_PAGE: u32 = 100;

const API_VERSION: &str = "2022-11-28";

// ---------------------------------------------------------------------------
// Repository identifier
// ---------------------------------------------------------------------------

/// An `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = LabelGateError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || LabelGateError::InvalidRepository(s.to_string());
        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        let valid_part =
            |p: &str| !p.is_empty() && !p.contains('/') && !p.chars().any(char::is_whitespace);
        if !valid_part(owner) || !valid_part(name) {
            return Err(invalid());
        }
        Ok(Repository {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// API records
// ---------------------------------------------------------------------------

/// The fields of a release this tool reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Release {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// A label attached to a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub name: String,
}

/// The fields of a pull request this tool reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    /// `None` for PRs closed without merging.
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    /// Only used to stop pagination early.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl PullRequest {
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.name.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// API seam
// ---------------------------------------------------------------------------

/// Read-only GitHub operations needed by the label check.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// `GET /repos/{repo}/releases/latest`
    async fn latest_release(&self, repo: &Repository) -> Result<Release>;

    /// One page of `GET /repos/{repo}/pulls?state=closed&sort=updated&direction=desc`.
    ///
    /// Pages are 1-based.
    async fn closed_pulls_page(
        &self,
        repo: &Repository,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequest>>;
}

/// Page traversal limits for the closed-PR listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub per_page: u32,
    pub max_pages: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Paging {
            per_page: MAX_PER_PAGE,
            max_pages: 10,
        }
    }
}

/// Fetch closed PRs, most recently updated first, until nothing newer than
/// `since` can remain.
///
/// Traversal stops on a short page, or once the last PR of a page was updated
/// at or before `since` (a PR merged after `since` was necessarily updated
/// after it, and the listing is ordered by update time).
///
/// # Errors
///
/// Returns [`LabelGateError::PageLimitExceeded`] when `paging.max_pages` full
/// pages were read and the last one still reaches past `since`; checking the
/// partial list could pass a run with unchecked PRs.
pub async fn fetch_closed_pulls_since(
    api: &dyn GitHubApi,
    repo: &Repository,
    since: DateTime<Utc>,
    paging: Paging,
) -> Result<Vec<PullRequest>> {
    let per_page = paging.per_page.clamp(1, MAX_PER_PAGE);
    let max_pages = paging.max_pages.max(1);
    let mut pulls = Vec::new();

    for page in 1..=max_pages {
        let batch = api.closed_pulls_page(repo, page, per_page).await?;
        let fetched = batch.len();
        let past_boundary = batch
            .last()
            .and_then(|pr| pr.updated_at)
            .is_some_and(|updated| updated <= since);
        pulls.extend(batch);

        debug!(page, fetched, total = pulls.len(), "fetched closed pull requests");

        if fetched < per_page as usize || past_boundary {
            return Ok(pulls);
        }
    }

    warn!(
        max_pages,
        fetched = pulls.len(),
        "page limit reached before the release boundary"
    );
    Err(LabelGateError::PageLimitExceeded { max_pages })
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL, without trailing slash
    pub api_url: String,
    /// Bearer token; requests are unauthenticated when absent
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl GitHubConfig {
    /// Create config for a specific API endpoint
    pub fn new(api_url: &str) -> Self {
        GitHubConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Set the bearer token. An empty token is treated as no token.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `reqwest`-backed GitHub client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("labelgate/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| LabelGateError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(GitHubClient {
            config,
            http_client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GitHubErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(LabelGateError::Api {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|source| LabelGateError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    #[instrument(skip(self), fields(repo = %repo))]
    async fn latest_release(&self, repo: &Repository) -> Result<Release> {
        let url = format!("{}/repos/{}/releases/latest", self.config.api_url, repo);
        let release: Release = self.get_json(&url).await?;
        info!(
            tag = release.tag_name.as_deref().unwrap_or("<untagged>"),
            created_at = %release.created_at,
            "found latest release"
        );
        Ok(release)
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn closed_pulls_page(
        &self,
        repo: &Repository,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequest>> {
        let url = format!(
            "{}/repos/{}/pulls?state=closed&sort=updated&direction=desc&per_page={}&page={}",
            self.config.api_url, repo, per_page, page
        );
        self.get_json(&url).await
    }
}
