//! Repository state: monorepo workspaces and the current checkout

pub mod identity;
pub mod workspace;

pub use identity::{locate_repository, normalize_remote_url, RepositoryIdentity};
pub use workspace::{parse_workspace_listing, resolve_workspaces, WorkspaceMap, WorkspaceRecord};
