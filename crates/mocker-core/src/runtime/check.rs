//! Toolchain detection for git, yarn and Node.js

use super::process::{CommandLine, CommandRunner};
use anyhow::Result;

/// Tools every run shells out to, with the hint shown when one is missing
pub const REQUIRED_TOOLS: &[(&str, &str, &str)] = &[
    ("git", "Git", "install from https://git-scm.com"),
    ("node", "Node.js", "install from https://nodejs.org"),
    ("npm", "npm", "ships with Node.js"),
    ("npx", "npx", "ships with Node.js"),
    ("yarn", "Yarn", "run `corepack enable`"),
];

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

/// Check whether a tool answers `--version`
pub async fn check_tool<R: CommandRunner>(
    runner: &R,
    program: &str,
    name: &'static str,
) -> ToolInfo {
    let output = runner
        .run(&CommandLine::new(program).arg("--version"))
        .await;

    match output {
        Ok(out) if out.success => {
            let version = out.output.lines().next().unwrap_or("").trim().to_string();
            ToolInfo {
                name,
                version: Some(version),
                available: true,
            }
        }
        _ => ToolInfo {
            name,
            version: None,
            available: false,
        },
    }
}

/// Check every required tool; fail with the list of missing ones
pub async fn check_tools<R: CommandRunner>(runner: &R) -> Result<Vec<ToolInfo>> {
    let mut results = Vec::new();
    let mut missing = Vec::new();

    for &(program, name, hint) in REQUIRED_TOOLS {
        let info = check_tool(runner, program, name).await;
        if info.available {
            results.push(info);
        } else {
            missing.push(format!("{} ({})", name, hint));
        }
    }

    if !missing.is_empty() {
        anyhow::bail!(
            "Missing required tools:\n{}",
            missing
                .iter()
                .map(|m| format!("  - {}", m))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    Ok(results)
}
