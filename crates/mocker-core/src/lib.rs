//! Mocker Core - scaffold starter templates through their official generators
//!
//! Each supported template is materialized with its generator CLI (or fetched
//! from the remote repository), tested, built, and removed again. The
//! workflow is a straight pipeline:
//!
//! 1. [`repo::resolve_workspaces`] lists the monorepo workspaces
//! 2. [`repo::locate_repository`] reads the remote URL, branch and commit
//! 3. [`templates::CommandTable::build`] resolves every template's commands
//! 4. [`templates::TemplateMocker`] runs one template (smoke mode) or all of them
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based session in [`tui`]
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use mocker_core::{repo, runtime::SystemRunner, templates, MockConfig};
//!
//! let config = MockConfig::from_env(Path::new("."))?;
//! let runner = SystemRunner::new();
//! let workspaces = repo::resolve_workspaces(&runner, &config.root).await?;
//! let identity = repo::locate_repository(&runner, &config).await?;
//! let table = templates::CommandTable::build(&workspaces, &identity);
//! let report = templates::TemplateMocker::new(&runner, &table, &config.root)
//!     .mock_all(config.jobs)
//!     .await;
//! ```

pub mod config;
pub mod error;
pub mod repo;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::MockConfig;
pub use error::{MockError, MockResult, Step};
pub use repo::{RepositoryIdentity, WorkspaceMap};
pub use runtime::{CommandLine, CommandRunner, SystemRunner};
pub use templates::{CommandTable, SuiteReport, TemplateMocker};

#[cfg(feature = "tui")]
pub use tui::run;
