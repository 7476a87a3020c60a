//! Filtering and classification of merged pull requests.
//!
//! A PR is considered when it was merged strictly after the release boundary.
//! It is valid when exactly one of its labels is in the [`LabelPool`]; zero
//! or several matches make it invalid. Output order follows input order.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::config::LabelPool;
use crate::github::PullRequest;

/// Process exit status derived from a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }
}

/// A PR that does not carry exactly one pool label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPr {
    pub number: u64,
    pub html_url: String,
    /// Pool labels found on the PR (empty when none matched).
    pub matched: Vec<String>,
}

/// Valid and invalid PRs, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub valid: Vec<u64>,
    pub invalid: Vec<InvalidPr>,
}

impl Classification {
    /// Whether every considered PR is valid.
    pub fn passed(&self) -> bool {
        self.invalid.is_empty()
    }

    pub fn exit_status(&self) -> ExitStatus {
        if self.passed() {
            ExitStatus::Success
        } else {
            ExitStatus::Failure
        }
    }

    /// Number of PRs classified either way.
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }
}

/// PRs merged strictly after `since`, in input order.
pub fn merged_since(prs: &[PullRequest], since: DateTime<Utc>) -> Vec<&PullRequest> {
    prs.iter()
        .filter(|pr| pr.merged_at.is_some_and(|merged| merged > since))
        .collect()
}

/// Pool labels carried by `pr`, deduplicated and sorted.
pub fn matching_labels(pr: &PullRequest, pool: &LabelPool) -> Vec<String> {
    pr.label_names()
        .filter(|name| pool.contains(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Partition `prs` by label-pool intersection cardinality.
pub fn classify<'a, I>(prs: I, pool: &LabelPool) -> Classification
where
    I: IntoIterator<Item = &'a PullRequest>,
{
    let mut classification = Classification::default();

    for pr in prs {
        let matched = matching_labels(pr, pool);
        if matched.len() == 1 {
            classification.valid.push(pr.number);
        } else {
            classification.invalid.push(InvalidPr {
                number: pr.number,
                html_url: pr.html_url.clone(),
                matched,
            });
        }
    }

    classification
}

/// Filter to PRs merged after `since`, then classify them.
pub fn classify_since(
    prs: &[PullRequest],
    since: DateTime<Utc>,
    pool: &LabelPool,
) -> Classification {
    classify(merged_since(prs, since), pool)
}
