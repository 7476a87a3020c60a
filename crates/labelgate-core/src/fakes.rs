//! In-memory [`GitHubApi`] implementation (testing only)
//!
//! `FakeGitHub` serves a fixed release and a fixed list of closed PRs, slicing
//! the list into pages the way the real endpoint does, and records which
//! pages were requested.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{LabelGateError, Result};
use crate::github::{GitHubApi, PullRequest, Release, Repository};

/// Fake GitHub backed by fixtures.
#[derive(Debug)]
pub struct FakeGitHub {
    release: Option<Release>,
    pulls: Vec<PullRequest>,
    pulls_status: Option<u16>,
    requested_pages: Mutex<Vec<u32>>,
}

impl FakeGitHub {
    /// Serve `release` as the latest release and `pulls` as the closed-PR
    /// listing, already in API order.
    pub fn new(release: Release, pulls: Vec<PullRequest>) -> Self {
        FakeGitHub {
            release: Some(release),
            pulls,
            pulls_status: None,
            requested_pages: Mutex::new(Vec::new()),
        }
    }

    /// A repository with no published release: the release lookup answers 404.
    pub fn without_release() -> Self {
        FakeGitHub {
            release: None,
            pulls: Vec::new(),
            pulls_status: None,
            requested_pages: Mutex::new(Vec::new()),
        }
    }

    /// Make the pulls listing answer with `status`.
    pub fn with_pulls_status(mut self, status: u16) -> Self {
        self.pulls_status = Some(status);
        self
    }

    /// Pages requested so far, in request order.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested_pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn latest_release(&self, repo: &Repository) -> Result<Release> {
        self.release.clone().ok_or_else(|| LabelGateError::Api {
            status: 404,
            url: format!("fake://repos/{repo}/releases/latest"),
            message: "Not Found".to_string(),
        })
    }

    async fn closed_pulls_page(
        &self,
        repo: &Repository,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequest>> {
        self.requested_pages.lock().unwrap().push(page);

        if let Some(status) = self.pulls_status {
            return Err(LabelGateError::Api {
                status,
                url: format!("fake://repos/{repo}/pulls?page={page}"),
                message: "Bad credentials".to_string(),
            });
        }

        let per_page = per_page as usize;
        let start = (page.saturating_sub(1) as usize).saturating_mul(per_page);
        Ok(self
            .pulls
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect())
    }
}
