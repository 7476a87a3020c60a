//! Release configuration and the changelog label pool.
//!
//! Reads the `changelog.categories[].labels` entries from a GitHub
//! release-notes config (`.github/release.yml`) and flattens them into a
//! [`LabelPool`]. A config that cannot be read, does not parse, or yields no
//! labels is a hard error.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LabelGateError, Result};

/// Default location of the release config inside a repository checkout.
pub const DEFAULT_CONFIG_PATH: &str = ".github/release.yml";

// ---------------------------------------------------------------------------
// YAML document
// ---------------------------------------------------------------------------

/// Top-level release config document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReleaseConfig {
    pub changelog: ChangelogConfig,
}

/// The `changelog` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangelogConfig {
    pub categories: Vec<Category>,
}

/// A changelog category grouping one or more labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(default)]
    pub title: Option<String>,
    pub labels: Vec<String>,
    /// Parsed so real-world configs load; does not affect the pool.
    #[serde(default)]
    pub exclude: Option<Exclude>,
}

/// Per-category exclusions (GitHub release-notes format).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Exclude {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl ReleaseConfig {
    /// Parse a release config from YAML text.
    ///
    /// `origin` is only used to label errors.
    pub fn from_yaml_str(yaml: &str, origin: &Path) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|source| LabelGateError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read and parse a release config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| LabelGateError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml_str(&content, path)
    }

    /// Union of the labels of every category.
    pub fn label_pool(&self) -> LabelPool {
        LabelPool::from_labels(
            self.changelog
                .categories
                .iter()
                .flat_map(|c| c.labels.iter().cloned()),
        )
    }
}

// ---------------------------------------------------------------------------
// Label pool
// ---------------------------------------------------------------------------

/// Set of label names accepted for changelog categorisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelPool {
    labels: BTreeSet<String>,
}

impl LabelPool {
    /// Build a pool from any list of label names; duplicates collapse.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Load the pool from a release config file.
    ///
    /// Fails with [`LabelGateError::EmptyLabelPool`] when the config parses
    /// but names no labels, since every PR would then be rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let pool = ReleaseConfig::load(path)?.label_pool();
        if pool.is_empty() {
            return Err(LabelGateError::EmptyLabelPool {
                path: PathBuf::from(path),
            });
        }
        debug!(path = %path.display(), labels = pool.len(), "loaded label pool");
        Ok(pool)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
