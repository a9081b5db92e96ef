//! Charm-style console session using cliclack

use crate::config::MockConfig;
use crate::repo;
use crate::runtime::{check, CommandRunner, SystemRunner};
use crate::templates::{find_template, CommandTable, Matrix, TemplateMocker, TEMPLATES};
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// CLI arguments for a mocking run
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Template to scaffold in smoke mode; every template when `None`
    pub template: Option<String>,

    /// Repository root
    pub root: PathBuf,

    /// Maximum templates in flight in full-suite mode
    pub jobs: Option<usize>,

    /// Print the template table and exit
    pub list: bool,

    /// Print the CI matrix JSON and exit
    pub matrix: bool,

    /// Skip the toolchain preflight
    pub skip_checks: bool,

    /// Replay output of successful steps
    pub verbose: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            template: None,
            root: PathBuf::from("."),
            jobs: None,
            list: false,
            matrix: false,
            skip_checks: false,
            verbose: false,
        }
    }
}

/// Run the CLI session
pub async fn run(args: RunArgs) -> Result<()> {
    if args.list {
        print_templates();
        return Ok(());
    }

    // Reject unknown names before anything is spawned
    if let Some(name) = &args.template {
        find_template(name)?;
    }

    let config = MockConfig::from_env(&args.root)?.with_jobs(args.jobs);
    let runner = SystemRunner::new();

    if args.matrix {
        let table = resolve_table(&runner, &config).await?;
        println!("{}", Matrix::from_table(&table).to_json()?);
        return Ok(());
    }

    cliclack::intro("mock-templates")?;
    cliclack::log::info(format!("Repository root: {}", config.root.display()))?;

    if args.skip_checks {
        cliclack::log::info("Skipping toolchain check")?;
    } else {
        check_toolchain(&runner).await?;
    }

    let spinner = cliclack::spinner();
    spinner.start("Resolving workspaces and repository state...");
    let table = match resolve_table(&runner, &config).await {
        Ok(table) => {
            spinner.stop(format!("Resolved {} templates", table.iter().count()));
            for name in table.missing() {
                cliclack::log::warning(format!("{}: no matching workspace in the repository", name))?;
            }
            table
        }
        Err(e) => {
            spinner.stop("Failed to resolve templates");
            cliclack::log::error(format!("{:#}", e))?;
            return Err(e);
        }
    };

    let mocker = TemplateMocker::new(&runner, &table, &config.root).verbose(args.verbose);

    match &args.template {
        Some(name) => run_smoke(&mocker, name).await,
        None => run_suite(&mocker, config.jobs).await,
    }
}

async fn check_toolchain<R: CommandRunner>(runner: &R) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Checking toolchain...");

    match check::check_tools(runner).await {
        Ok(tools) => {
            let info: Vec<String> = tools
                .iter()
                .map(|t| format!("{} ({})", t.name, t.version.as_deref().unwrap_or("unknown")))
                .collect();
            spinner.stop(format!("Detected tools: {}", info.join(", ")));
            Ok(())
        }
        Err(e) => {
            spinner.stop("Missing tools");
            cliclack::log::error(format!("{}", e))?;
            anyhow::bail!("Please install the missing tools and try again.");
        }
    }
}

/// Workspaces, then repository identity, then the command table
async fn resolve_table<R: CommandRunner>(runner: &R, config: &MockConfig) -> Result<CommandTable> {
    let workspaces = repo::resolve_workspaces(runner, &config.root).await?;
    let identity = repo::locate_repository(runner, config).await?;
    Ok(CommandTable::build(&workspaces, &identity))
}

async fn run_smoke<R: CommandRunner>(mocker: &TemplateMocker<'_, R>, name: &str) -> Result<()> {
    match mocker.scaffold(name).await {
        Ok(path) => {
            cliclack::outro(format!("Created {} in {}", name, path.display()))?;
            Ok(())
        }
        Err(e) => {
            cliclack::outro_cancel(format!("Failed to create {}", name))?;
            Err(e.into())
        }
    }
}

async fn run_suite<R: CommandRunner>(
    mocker: &TemplateMocker<'_, R>,
    jobs: Option<usize>,
) -> Result<()> {
    let report = mocker.mock_all(jobs).await;

    println!();
    for result in &report.results {
        match &result.result {
            Ok(()) => cliclack::log::success(result.template)?,
            Err(e) => cliclack::log::error(format!("{}: {}", result.template, e))?,
        }
    }

    cliclack::log::info(format!("Cleaned up {} output folders", mocker.released_dirs()))?;

    let total = report.results.len();
    if report.is_success() {
        cliclack::outro(format!("All {} templates passed", total))?;
        Ok(())
    } else {
        let failed = total - report.passed();
        cliclack::outro_cancel(format!("{} of {} templates failed", failed, total))?;
        anyhow::bail!("{} of {} templates failed", failed, total);
    }
}

fn print_templates() {
    println!("{}", "Supported templates".cyan().bold());
    println!();
    for t in TEMPLATES {
        let source = if t.generator.is_local() { "local" } else { "remote" };
        println!(
            "  {} {:<40} {} {:<12} {}",
            "->".blue(),
            t.name,
            "dir".dimmed(),
            t.output_dir,
            format!("({}, {})", t.generator.display_name(), source).dimmed()
        );
    }
}
