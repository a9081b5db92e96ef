//! Remote URL, branch and commit of the current checkout

use crate::config::MockConfig;
use crate::error::{MockError, MockResult};
use crate::runtime::process::{CommandLine, CommandRunner};
use std::path::Path;
use url::Url;

/// Where the templates live remotely, fixed for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    /// Browsable https base of the origin remote
    pub remote_url: String,
    pub current_branch: String,
    /// Short commit hash of `HEAD`
    pub commit_hash: String,
}

impl RepositoryIdentity {
    pub fn new(
        remote_url: impl AsRef<str>,
        current_branch: impl Into<String>,
        commit_hash: impl Into<String>,
    ) -> Self {
        Self {
            remote_url: normalize_remote_url(remote_url.as_ref()),
            current_branch: current_branch.into(),
            commit_hash: commit_hash.into(),
        }
    }

    /// Reference to a subdirectory of the remote on the current branch
    ///
    /// The branch is used rather than the commit hash: hash-addressed fetches
    /// of subdirectories are broken in the archive downloader.
    pub fn tree_reference(&self, subdir: &str) -> String {
        format!(
            "{}/{}#{}",
            self.remote_url,
            subdir.trim_matches('/'),
            self.current_branch
        )
    }
}

/// Turn any git remote form into an https base without credentials or `.git`
pub fn normalize_remote_url(raw: &str) -> String {
    let raw = raw.trim();

    let normalized = if raw.contains("://") {
        match Url::parse(raw) {
            Ok(url) => match (url.scheme(), url.host_str()) {
                ("http" | "https", Some(host)) => {
                    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
                    format!("{}://{}{}{}", url.scheme(), host, port, url.path())
                }
                ("ssh" | "git" | "git+ssh", Some(host)) => {
                    format!("https://{}{}", host, url.path())
                }
                _ => raw.to_string(),
            },
            Err(_) => raw.to_string(),
        }
    } else if let Some((user_host, path)) = scp_like(raw) {
        let host = user_host.rsplit('@').next().unwrap_or(user_host);
        format!("https://{}/{}", host, path.trim_start_matches('/'))
    } else {
        raw.to_string()
    };

    let trimmed = normalized.trim_end_matches('/');
    trimmed
        .strip_suffix(".git")
        .unwrap_or(trimmed)
        .to_string()
}

/// Split `git@github.com:owner/repo` into its host and path halves
///
/// A single-letter head is a Windows drive (`C:\srv\repo`), not a host.
fn scp_like(raw: &str) -> Option<(&str, &str)> {
    let (head, tail) = raw.split_once(':')?;
    let drive_letter = head.len() == 1 && head.chars().all(|c| c.is_ascii_alphabetic());
    if head.is_empty()
        || drive_letter
        || head.contains(['/', '\\'])
        || tail.is_empty()
        || tail.starts_with('\\')
    {
        return None;
    }
    Some((head, tail))
}

async fn git_query<R: CommandRunner>(
    runner: &R,
    root: &Path,
    args: &[&str],
    what: &str,
) -> MockResult<String> {
    let command = CommandLine::new("git").args(args.iter().copied()).resolved(root);
    let out = runner.run(&command).await.map_err(|e| {
        MockError::repository_state_with_source(format!("could not run `{}`", command), e)
    })?;

    if !out.success {
        return Err(MockError::repository_state(format!(
            "{} unavailable: `{}` {}: {}",
            what,
            command,
            out.describe_exit(),
            out.output.trim()
        )));
    }

    let value = out.output.trim().to_string();
    if value.is_empty() {
        return Err(MockError::repository_state(format!("{} unavailable", what)));
    }
    Ok(value)
}

/// Query the checkout at `config.root`; configured overrides skip their query
pub async fn locate_repository<R: CommandRunner>(
    runner: &R,
    config: &MockConfig,
) -> MockResult<RepositoryIdentity> {
    let root = config.root.as_path();

    let remote = async {
        match &config.remote_url {
            Some(url) => Ok(url.clone()),
            None => git_query(runner, root, &["remote", "get-url", "origin"], "remote URL").await,
        }
    };
    let branch = async {
        match &config.branch {
            Some(branch) => Ok(branch.clone()),
            None => {
                git_query(
                    runner,
                    root,
                    &["branch", "--show-current"],
                    "current branch (detached HEAD?)",
                )
                .await
            }
        }
    };
    let commit = git_query(runner, root, &["rev-parse", "--short", "HEAD"], "commit hash");

    let (remote_url, current_branch, commit_hash) = tokio::try_join!(remote, branch, commit)?;

    Ok(RepositoryIdentity::new(
        remote_url,
        current_branch,
        commit_hash,
    ))
}
