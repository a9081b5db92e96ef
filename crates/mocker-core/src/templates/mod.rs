//! Template catalog, command table and the mocking workflow
//!
//! This module provides:
//! - The fixed list of supported templates and their output folders
//! - Command table construction from workspaces and repository identity
//! - Scaffold/test/build/cleanup runs in smoke and full-suite modes
//! - CI matrix output

pub mod catalog;
pub mod commands;
pub mod matrix;
pub mod mocker;

pub use catalog::{find_template, Generator, TemplateSpec, TEMPLATES};
pub use commands::{CommandTable, TemplateCommand};
pub use matrix::Matrix;
pub use mocker::{Cleanup, OutputDir, SuiteReport, TemplateMocker, TemplateResult};
