//! Scaffold, test, build and clean up templates
//!
//! A template run owns its output directory from before the scaffold step
//! until the run ends. The directory is removed exactly once on every exit
//! path: explicitly when the run settles, or from `Drop` if the run future is
//! cancelled part way.

use super::commands::{CommandTable, TemplateCommand};
use crate::error::{MockError, MockResult, Step};
use crate::runtime::process::{CommandLine, CommandOutput, CommandRunner};
use colored::Colorize;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// What happened to an output directory during cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    Removed,
    /// Nothing to remove; the generator never created it
    Absent,
    Failed(String),
}

/// Remove a generated directory; a missing directory is not an error
pub async fn remove_output_dir(path: &Path) -> Cleanup {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Cleanup::Removed,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Cleanup::Absent,
        Err(e) => Cleanup::Failed(e.to_string()),
    }
}

/// Generated output directory owned by one template run
///
/// Every release (explicit removal or the `Drop` fallback) bumps `releases`.
#[derive(Debug)]
pub struct OutputDir<'a> {
    path: PathBuf,
    armed: bool,
    releases: &'a AtomicUsize,
}

impl<'a> OutputDir<'a> {
    pub fn acquire(path: PathBuf, releases: &'a AtomicUsize) -> Self {
        Self {
            path,
            armed: true,
            releases,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now
    pub async fn remove(mut self) -> Cleanup {
        self.armed = false;
        self.releases.fetch_add(1, Ordering::SeqCst);
        remove_output_dir(&self.path).await
    }

    /// Leave the directory in place and hand back its path
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for OutputDir<'_> {
    fn drop(&mut self) {
        // Only reached when the run future is dropped mid-run (e.g. Ctrl+C)
        if self.armed {
            self.releases.fetch_add(1, Ordering::SeqCst);
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

/// Outcome of one template in a full-suite run
#[derive(Debug)]
pub struct TemplateResult {
    pub template: &'static str,
    pub result: MockResult<()>,
}

/// Every template's outcome, in catalog order
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub results: Vec<TemplateResult>,
}

impl SuiteReport {
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &TemplateResult> {
        self.results.iter().filter(|r| r.result.is_err())
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_ok()).count()
    }
}

/// Runs templates from a [`CommandTable`] against a repository root
pub struct TemplateMocker<'a, R: CommandRunner> {
    runner: &'a R,
    table: &'a CommandTable,
    root: PathBuf,
    verbose: bool,
    releases: AtomicUsize,
}

impl<'a, R: CommandRunner> TemplateMocker<'a, R> {
    pub fn new(runner: &'a R, table: &'a CommandTable, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            table,
            root: root.into(),
            verbose: false,
            releases: AtomicUsize::new(0),
        }
    }

    /// Replay captured output of successful steps too
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn output_path(&self, entry: &TemplateCommand) -> PathBuf {
        self.root.join(entry.output_dir())
    }

    /// Output directories released so far, one per run that reached scaffolding
    pub fn released_dirs(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Smoke mode: scaffold one template and leave the result in place
    ///
    /// On failure the output directory is removed before returning.
    pub async fn scaffold(&self, name: &str) -> MockResult<PathBuf> {
        let entry = self.table.get(name)?;
        let output = OutputDir::acquire(self.output_path(entry), &self.releases);

        self.log(entry.name(), format!("Mocking {}...", entry.name()));
        match self.run_scaffold(entry).await {
            Ok(()) => Ok(output.keep()),
            Err(e) => {
                self.report_failure(&e);
                self.cleanup(entry.name(), output).await;
                Err(e)
            }
        }
    }

    /// Full mode: scaffold, test and build one template, then always clean up
    pub async fn mock(&self, name: &str) -> MockResult<()> {
        let entry = self.table.get(name)?;
        let output = OutputDir::acquire(self.output_path(entry), &self.releases);

        self.log(entry.name(), format!("Mocking {}...", entry.name()));
        let result = self.run_steps(entry).await;
        if let Err(e) = &result {
            self.report_failure(e);
        }
        self.cleanup(entry.name(), output).await;
        result
    }

    /// Full-suite mode: attempt every template, then report them all
    ///
    /// At most `jobs` templates are in flight at once (all of them when `None`).
    pub async fn mock_all(&self, jobs: Option<usize>) -> SuiteReport {
        let limit = jobs.unwrap_or(self.table.len()).max(1);

        let names = self.table.names();
        let mut results: Vec<(usize, TemplateResult)> = stream::iter(names.into_iter().enumerate())
            .map(|(idx, template)| async move {
                let result = self.mock(template).await;
                if let Err(e @ MockError::MissingWorkspace { .. }) = &result {
                    self.report_failure(e);
                }
                (idx, TemplateResult { template, result })
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        results.sort_by_key(|(idx, _)| *idx);
        SuiteReport {
            results: results.into_iter().map(|(_, r)| r).collect(),
        }
    }

    async fn run_steps(&self, entry: &TemplateCommand) -> MockResult<()> {
        self.run_scaffold(entry).await?;

        self.log(entry.name(), "Running tests...");
        self.run_step(Step::Test, entry.name(), &entry.test).await?;

        match &entry.build {
            Some(build) => {
                self.log(entry.name(), "Building...");
                self.run_step(Step::Build, entry.name(), build).await?;
            }
            None => self.log(entry.name(), "No build script, skipping build"),
        }

        self.log(entry.name(), format!("{}", "passed".green()));
        Ok(())
    }

    async fn run_scaffold(&self, entry: &TemplateCommand) -> MockResult<()> {
        for command in &entry.scaffold {
            self.run_step(Step::Scaffold, entry.name(), command).await?;
        }
        Ok(())
    }

    async fn run_step(
        &self,
        step: Step,
        template: &str,
        command: &CommandLine,
    ) -> MockResult<CommandOutput> {
        self.log(template, format!("{} {}", "$".dimmed(), command));

        let out = self
            .runner
            .run(&command.resolved(&self.root))
            .await
            .map_err(|e| {
                MockError::step_failure(
                    step,
                    template,
                    format!("could not run `{}`: {}", command, e),
                    "",
                )
            })?;

        if !out.success {
            return Err(MockError::step_failure(
                step,
                template,
                format!("`{}` {}", command, out.describe_exit()),
                out.output,
            ));
        }

        if self.verbose {
            print_output(&out.output);
        }
        Ok(out)
    }

    async fn cleanup(&self, template: &str, output: OutputDir<'_>) {
        self.log(template, "Cleaning up...");
        let path = output.path().to_path_buf();
        if let Cleanup::Failed(reason) = output.remove().await {
            eprintln!(
                "{} {} could not remove {}: {}",
                "Warning:".yellow(),
                format!("[{}]", template).bold(),
                path.display(),
                reason
            );
        }
    }

    fn report_failure(&self, error: &MockError) {
        let step = error
            .step()
            .map(|s| format!(" ({} step)", s))
            .unwrap_or_default();
        eprintln!("{} {}{}", "Error:".red().bold(), error, step);
        if let Some(output) = error.output() {
            print_output(output);
        }
    }

    fn log(&self, template: &str, message: impl AsRef<str>) {
        println!(
            "{} {}",
            format!("[{}]", template).cyan().bold(),
            message.as_ref()
        );
    }
}

fn print_output(output: &str) {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        return;
    }
    let block = trimmed
        .lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n");
    println!("{}", block.dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{RepositoryIdentity, WorkspaceMap};
    use crate::runtime::process::fake::FakeRunner;
    use crate::templates::catalog::TEMPLATES;
    use std::time::Duration;

    fn table(root: &Path) -> CommandTable {
        let workspaces: WorkspaceMap = TEMPLATES
            .iter()
            .map(|t| (t.name.to_string(), root.join("packages").join(t.name)))
            .collect();
        let identity = RepositoryIdentity::new("https://github.com/example/repo", "main", "abc1234");
        CommandTable::build(&workspaces, &identity)
    }

    /// Generators create their output directory; `fail` picks which command fails
    fn generator_runner<F>(fail: F) -> FakeRunner
    where
        F: Fn(&CommandLine) -> bool + Send + Sync + 'static,
    {
        FakeRunner::new(move |cmd| {
            if cmd.program == "npx" {
                if let Some(cwd) = &cmd.cwd {
                    for t in TEMPLATES {
                        if cmd.args.iter().any(|a| a == t.output_dir) {
                            std::fs::create_dir_all(cwd.join(t.output_dir))?;
                        }
                    }
                }
            }
            if fail(cmd) {
                Ok(CommandOutput::failure(1, "npm ERR! failed"))
            } else {
                Ok(CommandOutput::success("ok"))
            }
        })
    }

    fn is_script(cmd: &CommandLine, script: &str) -> bool {
        cmd.program == "npm" && cmd.args.iter().any(|a| a == script)
    }

    #[tokio::test]
    async fn test_unknown_template_runs_nothing() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = FakeRunner::succeeding();
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        let err = mocker.mock("angular-template").await.unwrap_err();
        assert!(matches!(err, MockError::UnknownTemplate { .. }));
        let err = mocker.scaffold("angular-template").await.unwrap_err();
        assert!(matches!(err, MockError::UnknownTemplate { .. }));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_full_run_cleans_up_on_success() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = generator_runner(|_| false);
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        mocker.mock("vite-template-redux").await.unwrap();

        let programs: Vec<String> = runner.calls().iter().map(|c| c.to_string()).collect();
        assert_eq!(programs.len(), 4);
        assert!(programs[0].starts_with("npx tiged"));
        assert_eq!(programs[1], "npm install");
        assert_eq!(programs[2], "CI=true npm run test");
        assert_eq!(programs[3], "npm run build");
        assert!(!root.path().join("vite-ts-app").exists());
    }

    #[tokio::test]
    async fn test_test_and_build_run_inside_output_dir() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = generator_runner(|_| false);
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        mocker.mock("cra-template-redux").await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].cwd.as_deref(), Some(root.path()));
        let expected = root.path().join("cra-js-app");
        assert_eq!(calls[1].cwd.as_deref(), Some(expected.as_path()));
        assert_eq!(calls[2].cwd.as_deref(), Some(expected.as_path()));
    }

    #[tokio::test]
    async fn test_generator_failure_skips_test_and_build() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = generator_runner(|cmd| cmd.program == "npx");
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        let err = mocker.mock("cra-template-redux").await.unwrap_err();
        assert!(matches!(err, MockError::GeneratorFailure { .. }));
        assert_eq!(err.output(), Some("npm ERR! failed"));
        assert_eq!(runner.calls().len(), 1);
        assert!(!root.path().join("cra-js-app").exists());
    }

    #[tokio::test]
    async fn test_generator_failure_without_output_dir() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = FakeRunner::new(|_| Ok(CommandOutput::failure(127, "npx: not found")));
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        let err = mocker.scaffold("expo-template-redux-typescript").await.unwrap_err();
        assert!(matches!(err, MockError::GeneratorFailure { .. }));
        assert!(err.to_string().contains("exited with code 127"));
    }

    #[tokio::test]
    async fn test_test_failure_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = generator_runner(|cmd| is_script(cmd, "test"));
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        let err = mocker.mock("cra-template-redux-typescript").await.unwrap_err();
        assert!(matches!(err, MockError::TestFailure { .. }));
        assert_eq!(runner.calls().len(), 2);
        assert!(!root.path().join("cra-ts-app").exists());
    }

    #[tokio::test]
    async fn test_build_failure_still_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = generator_runner(|cmd| is_script(cmd, "build"));
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        let err = mocker.mock("vite-template-redux").await.unwrap_err();
        assert!(matches!(err, MockError::BuildFailure { .. }));

        let calls = runner.calls();
        assert_eq!(calls.len(), 4);
        assert!(is_script(&calls[2], "test"));
        assert!(is_script(&calls[3], "build"));
        assert!(!root.path().join("vite-ts-app").exists());
        assert_eq!(mocker.released_dirs(), 1);
    }

    #[tokio::test]
    async fn test_each_run_releases_its_dir_once() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = generator_runner(|cmd| is_script(cmd, "test"));
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        mocker.mock("cra-template-redux").await.unwrap_err();
        mocker.mock("vite-template-redux").await.unwrap_err();
        mocker.mock("angular-template").await.unwrap_err();
        assert_eq!(mocker.released_dirs(), 2);
    }

    /// Scaffolds normally, then never finishes the test step
    struct StalledTests {
        calls: AtomicUsize,
    }

    impl CommandRunner for StalledTests {
        async fn run(&self, command: &CommandLine) -> std::io::Result<CommandOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if command.program == "npx" {
                if let Some(cwd) = &command.cwd {
                    std::fs::create_dir_all(cwd.join("cra-js-app"))?;
                }
            }
            if is_script(command, "test") {
                std::future::pending::<()>().await;
            }
            Ok(CommandOutput::success("ok"))
        }
    }

    #[tokio::test]
    async fn test_cancelled_run_still_removes_output() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = StalledTests {
            calls: AtomicUsize::new(0),
        };
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        let outcome =
            tokio::time::timeout(Duration::from_millis(100), mocker.mock("cra-template-redux")).await;
        assert!(outcome.is_err());
        assert_eq!(runner.calls.load(Ordering::SeqCst), 2);
        assert!(!root.path().join("cra-js-app").exists());
        assert_eq!(mocker.released_dirs(), 1);
    }

    #[tokio::test]
    async fn test_missing_build_script_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = generator_runner(|_| false);
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        mocker.mock("react-native-template-redux-typescript").await.unwrap();
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(!calls.iter().any(|c| is_script(c, "build")));
    }

    #[tokio::test]
    async fn test_smoke_mode_keeps_output() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = generator_runner(|_| false);
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        let path = mocker.scaffold("cra-template-redux").await.unwrap();
        assert_eq!(path, root.path().join("cra-js-app"));
        assert!(path.exists());
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_suite_attempts_every_template() {
        let root = tempfile::tempdir().unwrap();
        let table = table(root.path());
        let runner = generator_runner(|cmd| cmd.args.iter().any(|a| a == "create-expo@latest"));
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        let report = mocker.mock_all(Some(2)).await;
        assert!(!report.is_success());
        assert_eq!(report.results.len(), TEMPLATES.len());
        assert_eq!(report.passed(), TEMPLATES.len() - 1);

        let names: Vec<_> = report.results.iter().map(|r| r.template).collect();
        assert_eq!(names, TEMPLATES.iter().map(|t| t.name).collect::<Vec<_>>());

        let failed: Vec<_> = report.failures().map(|r| r.template).collect();
        assert_eq!(failed, vec!["expo-template-redux-typescript"]);

        for t in TEMPLATES {
            assert!(!root.path().join(t.output_dir).exists(), "{}", t.output_dir);
        }
        assert_eq!(mocker.released_dirs(), TEMPLATES.len());
    }

    #[tokio::test]
    async fn test_suite_reports_missing_workspaces_per_template() {
        let root = tempfile::tempdir().unwrap();
        let mut workspaces = WorkspaceMap::new();
        workspaces.insert(
            "cra-template-redux".to_string(),
            root.path().join("packages/cra-template-redux"),
        );
        let identity = RepositoryIdentity::new("https://github.com/example/repo", "main", "abc1234");
        let table = CommandTable::build(&workspaces, &identity);
        let runner = generator_runner(|_| false);
        let mocker = TemplateMocker::new(&runner, &table, root.path());

        let report = mocker.mock_all(None).await;
        assert_eq!(report.results.len(), TEMPLATES.len());
        assert_eq!(report.passed(), 2);
        for r in report.failures() {
            assert!(
                matches!(r.result, Err(MockError::MissingWorkspace { .. })),
                "{}",
                r.template
            );
        }

        let calls = runner.calls();
        assert!(calls.iter().all(|c| {
            c.args.iter().any(|a| a.contains("cra-js-app") || a.contains("vite-ts-app"))
                || c.cwd.as_ref().is_some_and(|d| d.ends_with("cra-js-app") || d.ends_with("vite-ts-app"))
        }));
        assert_eq!(mocker.released_dirs(), 2);
    }

    #[test]
    fn test_output_dir_drop_removes_unless_kept() {
        let root = tempfile::tempdir().unwrap();

        let releases = AtomicUsize::new(0);

        let dropped = root.path().join("dropped");
        std::fs::create_dir(&dropped).unwrap();
        drop(OutputDir::acquire(dropped.clone(), &releases));
        assert!(!dropped.exists());

        let kept = root.path().join("kept");
        std::fs::create_dir(&kept).unwrap();
        let path = OutputDir::acquire(kept.clone(), &releases).keep();
        assert_eq!(path, kept);
        assert!(kept.exists());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explicit_remove_disarms_drop() {
        let root = tempfile::tempdir().unwrap();
        let releases = AtomicUsize::new(0);
        let dir = root.path().join("app");
        std::fs::create_dir(&dir).unwrap();

        let output = OutputDir::acquire(dir.clone(), &releases);
        assert_eq!(output.remove().await, Cleanup::Removed);
        assert!(!dir.exists());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_dir_is_absent() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(
            remove_output_dir(&root.path().join("never-created")).await,
            Cleanup::Absent
        );
    }
}
