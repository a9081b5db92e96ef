//! Run configuration

use crate::error::{MockError, MockResult};
use std::path::{Path, PathBuf};

/// Environment variable overriding the queried remote URL
pub const REMOTE_URL_ENV: &str = "MOCK_TEMPLATES_REMOTE_URL";

/// Environment variable overriding the queried branch
pub const BRANCH_ENV: &str = "MOCK_TEMPLATES_BRANCH";

/// Settings for one invocation
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Canonical repository root; workspaces and output folders resolve against it
    pub root: PathBuf,
    pub remote_url: Option<String>,
    pub branch: Option<String>,
    /// Templates in flight at once in full-suite mode, `None` for all of them
    pub jobs: Option<usize>,
}

impl MockConfig {
    pub fn new(root: &Path) -> MockResult<Self> {
        let root = std::fs::canonicalize(root).map_err(|source| MockError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self {
            root,
            remote_url: None,
            branch: None,
            jobs: None,
        })
    }

    /// Build a config rooted at `root`, picking up overrides from the environment
    pub fn from_env(root: &Path) -> MockResult<Self> {
        let mut config = Self::new(root)?;
        config.remote_url = non_empty_var(REMOTE_URL_ENV);
        config.branch = non_empty_var(BRANCH_ENV);
        Ok(config)
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs.filter(|j| *j > 0);
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
