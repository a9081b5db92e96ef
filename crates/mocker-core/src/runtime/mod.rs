//! Subprocess execution and toolchain detection
//!
//! This module provides:
//! - Argument-vector commands and the runner seam used by every stage
//! - Toolchain preflight for git, yarn and the Node.js tooling

pub mod check;
pub mod process;

pub use check::{check_tools, ToolInfo, REQUIRED_TOOLS};
pub use process::{CommandLine, CommandOutput, CommandRunner, SystemRunner};
