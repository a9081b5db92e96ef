//! mock-templates - scaffold, test and build every starter template

use anyhow::Result;
use clap::Parser;
use mocker_core::tui::RunArgs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mock-templates")]
#[command(about = "Scaffold each template through its generator, run its tests and build, then clean up")]
#[command(version)]
pub struct Args {
    /// Template to scaffold (smoke mode); omit to run the full suite
    pub template: Option<String>,

    /// Repository root containing the template workspaces
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Maximum templates run at once in full-suite mode (default: all)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// List supported templates and exit
    #[arg(long)]
    pub list: bool,

    /// Print the GitHub Actions matrix JSON and exit
    #[arg(long, conflicts_with = "template")]
    pub matrix: bool,

    /// Skip the git/yarn/node toolchain check
    #[arg(long = "skip-checks")]
    pub skip_checks: bool,

    /// Show output of successful steps
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<Args> for RunArgs {
    fn from(args: Args) -> Self {
        RunArgs {
            template: args.template,
            root: args.root,
            jobs: args.jobs,
            list: args.list,
            matrix: args.matrix,
            skip_checks: args.skip_checks,
            verbose: args.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    let args = Args::parse();

    // Ctrl+C drops the run future, which kills child processes and removes
    // the output folder before we exit
    let result = tokio::select! {
        result = mocker_core::run(args.into()) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    // Ensure cursor is visible on every exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Some(result) => result,
        None => {
            eprintln!("\nInterrupted");
            std::process::exit(130);
        }
    }
}
