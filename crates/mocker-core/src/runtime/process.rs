//! Subprocess execution for generator, test and build commands
//!
//! Commands are argument vectors, never shell strings. Every invocation goes
//! through the [`CommandRunner`] trait so runs can be scripted in tests.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// A single external command: program, arguments, working directory, extra env
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory, relative to the repository root unless absolute
    pub cwd: Option<PathBuf>,
    pub envs: Vec<(String, String)>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Anchor a relative working directory at `root`
    pub fn resolved(&self, root: &Path) -> Self {
        let mut cmd = self.clone();
        cmd.cwd = Some(match &self.cwd {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => root.join(dir),
            None => root.to_path_buf(),
        });
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.envs {
            write!(f, "{}={} ", key, value)?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of a finished subprocess
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub success: bool,
    /// Standard output followed by standard error
    pub output: String,
}

impl CommandOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(code: i32, output: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            success: false,
            output: output.into(),
        }
    }

    /// Short description of how the process ended
    pub fn describe_exit(&self) -> String {
        match self.code {
            Some(code) => format!("exited with code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Executes external commands and captures their output
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        command: &CommandLine,
    ) -> impl Future<Output = std::io::Result<CommandOutput>> + Send;
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Node tooling ships as `.cmd` shims on Windows
fn program_name(program: &str) -> String {
    if cfg!(windows) && matches!(program, "npm" | "npx" | "yarn") {
        format!("{}.cmd", program)
    } else {
        program.to_string()
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandLine) -> std::io::Result<CommandOutput> {
        let mut cmd = TokioCommand::new(program_name(&command.program));
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &command.envs {
            cmd.env(key, value);
        }

        let out = cmd.output().await?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&out.stderr);
        if !stderr.trim().is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&stderr);
        }

        Ok(CommandOutput {
            code: out.status.code(),
            success: out.status.success(),
            output,
        })
    }
}
