//! Monorepo workspace enumeration via `yarn workspaces list --json`

use crate::error::{MockError, MockResult};
use crate::runtime::process::{CommandLine, CommandRunner};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Workspace name to absolute directory
pub type WorkspaceMap = BTreeMap<String, PathBuf>;

/// One record of the listing; `location` is relative to the repository root
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceRecord {
    pub name: String,
    pub location: String,
}

impl WorkspaceRecord {
    pub fn is_root(&self) -> bool {
        self.location == "."
    }
}

/// The command whose output [`parse_workspace_listing`] understands
pub fn listing_command() -> CommandLine {
    CommandLine::new("yarn").args(["workspaces", "list", "--json"])
}

/// Parse newline-delimited JSON records, skipping log noise and the root workspace
pub fn parse_workspace_listing(stdout: &str, root: &Path) -> WorkspaceMap {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<WorkspaceRecord>(line.trim()).ok())
        .filter(|record| !record.is_root())
        .map(|record| {
            let path = root.join(&record.location);
            (record.name, path)
        })
        .collect()
}

/// List every non-root workspace of the repository at `root`
pub async fn resolve_workspaces<R: CommandRunner>(
    runner: &R,
    root: &Path,
) -> MockResult<WorkspaceMap> {
    let command = listing_command().resolved(root);
    let out = runner.run(&command).await.map_err(|e| {
        MockError::workspace_listing_with_source(format!("could not run `{}`", command), e)
    })?;

    if !out.success {
        return Err(MockError::workspace_listing(format!(
            "`{}` {}:\n{}",
            command,
            out.describe_exit(),
            out.output.trim()
        )));
    }

    Ok(parse_workspace_listing(&out.output, root))
}
