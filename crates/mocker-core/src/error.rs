//! Error types shared by every stage of a mocking run

use std::path::PathBuf;
use thiserror::Error;

/// One step of a template run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Scaffold,
    Test,
    Build,
}

impl Step {
    pub fn display_name(&self) -> &'static str {
        match self {
            Step::Scaffold => "scaffold",
            Step::Test => "test",
            Step::Build => "build",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Error, Debug)]
pub enum MockError {
    #[error("Failed to list workspaces: {message}")]
    WorkspaceListing {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Repository state unavailable: {message}")]
    RepositoryState {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Unknown template '{name}'. Available templates: {available}")]
    UnknownTemplate { name: String, available: String },

    #[error("Template '{template}' has no matching workspace in the repository")]
    MissingWorkspace { template: String },

    #[error("Failed to create {template}: {message}")]
    GeneratorFailure {
        template: String,
        message: String,
        output: String,
    },

    #[error("Tests failed for {template}: {message}")]
    TestFailure {
        template: String,
        message: String,
        output: String,
    },

    #[error("Build failed for {template}: {message}")]
    BuildFailure {
        template: String,
        message: String,
        output: String,
    },

    #[error("Invalid repository root {}: {source}", .path.display())]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MockError {
    pub fn workspace_listing(message: impl Into<String>) -> Self {
        Self::WorkspaceListing {
            message: message.into(),
            source: None,
        }
    }

    pub fn workspace_listing_with_source(
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::WorkspaceListing {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn repository_state(message: impl Into<String>) -> Self {
        Self::RepositoryState {
            message: message.into(),
            source: None,
        }
    }

    pub fn repository_state_with_source(
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::RepositoryState {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Build the failure for a step that exited non-zero or could not start
    pub fn step_failure(
        step: Step,
        template: impl Into<String>,
        message: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        let template = template.into();
        let message = message.into();
        let output = output.into();
        match step {
            Step::Scaffold => Self::GeneratorFailure {
                template,
                message,
                output,
            },
            Step::Test => Self::TestFailure {
                template,
                message,
                output,
            },
            Step::Build => Self::BuildFailure {
                template,
                message,
                output,
            },
        }
    }

    /// The step this error was raised from, if it came from a template run
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::GeneratorFailure { .. } => Some(Step::Scaffold),
            Self::TestFailure { .. } => Some(Step::Test),
            Self::BuildFailure { .. } => Some(Step::Build),
            _ => None,
        }
    }

    /// Captured subprocess output attached to a step failure
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::GeneratorFailure { output, .. }
            | Self::TestFailure { output, .. }
            | Self::BuildFailure { output, .. } => Some(output.as_str()),
            _ => None,
        }
    }
}

pub type MockResult<T> = Result<T, MockError>;
