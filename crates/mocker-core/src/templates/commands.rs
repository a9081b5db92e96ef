//! Per-template command table: scaffold, test and build command lines

use super::catalog::{Generator, TemplateSpec, TEMPLATES};
use crate::error::{MockError, MockResult};
use crate::repo::{RepositoryIdentity, WorkspaceMap};
use crate::runtime::process::CommandLine;

/// Everything needed to run one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCommand {
    pub spec: &'static TemplateSpec,
    /// Run in order from the repository root (or their own `cwd`)
    pub scaffold: Vec<CommandLine>,
    pub test: CommandLine,
    pub build: Option<CommandLine>,
}

impl TemplateCommand {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn output_dir(&self) -> &'static str {
        self.spec.output_dir
    }

    /// Scaffold commands as a single shell-readable line
    pub fn scaffold_line(&self) -> String {
        self.scaffold
            .iter()
            .map(|cmd| match &cmd.cwd {
                Some(dir) => format!("(cd {} && {})", dir.display(), cmd),
                None => cmd.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

/// Read-only table of every supported template, in catalog order
///
/// A local template whose workspace is missing from the listing has no
/// commands; asking for it yields `MissingWorkspace` without affecting the
/// other templates.
#[derive(Debug, Clone)]
pub struct CommandTable {
    entries: Vec<TemplateCommand>,
    missing: Vec<&'static TemplateSpec>,
}

impl CommandTable {
    /// Build commands for every supported template
    pub fn build(workspaces: &WorkspaceMap, identity: &RepositoryIdentity) -> Self {
        let mut entries = Vec::new();
        let mut missing = Vec::new();
        for spec in TEMPLATES {
            match template_command(spec, workspaces, identity) {
                Ok(entry) => entries.push(entry),
                Err(_) => missing.push(spec),
            }
        }
        Self { entries, missing }
    }

    pub fn get(&self, name: &str) -> MockResult<&TemplateCommand> {
        if let Some(entry) = self.entries.iter().find(|e| e.name() == name) {
            return Ok(entry);
        }
        if self.missing.iter().any(|spec| spec.name == name) {
            return Err(MockError::MissingWorkspace {
                template: name.to_string(),
            });
        }
        Err(MockError::UnknownTemplate {
            name: name.to_string(),
            available: self.names().join(", "),
        })
    }

    /// Templates with resolved commands
    pub fn iter(&self) -> impl Iterator<Item = &TemplateCommand> {
        self.entries.iter()
    }

    /// Templates skipped because their workspace was not listed
    pub fn missing(&self) -> Vec<&'static str> {
        self.missing.iter().map(|spec| spec.name).collect()
    }

    /// Every template in the table, resolved or not, in catalog order
    pub fn names(&self) -> Vec<&'static str> {
        TEMPLATES
            .iter()
            .map(|spec| spec.name)
            .filter(|name| {
                self.entries.iter().any(|e| e.name() == *name)
                    || self.missing.iter().any(|spec| spec.name == *name)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the scaffold, test and build commands of one template
pub fn template_command(
    spec: &'static TemplateSpec,
    workspaces: &WorkspaceMap,
    identity: &RepositoryIdentity,
) -> MockResult<TemplateCommand> {
    let scaffold = scaffold_commands(spec, workspaces, identity)?;

    let test = CommandLine::new("npm")
        .args(["run", spec.test_script])
        .current_dir(spec.output_dir)
        .env("CI", "true");

    let build = spec.build_script.map(|script| {
        CommandLine::new("npm")
            .args(["run", script])
            .current_dir(spec.output_dir)
    });

    Ok(TemplateCommand {
        spec,
        scaffold,
        test,
        build,
    })
}

fn local_template_ref(spec: &TemplateSpec, workspaces: &WorkspaceMap) -> MockResult<String> {
    let path = workspaces
        .get(spec.name)
        .ok_or_else(|| MockError::MissingWorkspace {
            template: spec.name.to_string(),
        })?;
    Ok(format!("file:{}", path.display()))
}

fn scaffold_commands(
    spec: &TemplateSpec,
    workspaces: &WorkspaceMap,
    identity: &RepositoryIdentity,
) -> MockResult<Vec<CommandLine>> {
    let commands = match spec.generator {
        Generator::CreateReactApp => vec![CommandLine::new("npx").args([
            "create-react-app@latest".to_string(),
            spec.output_dir.to_string(),
            "--template".to_string(),
            local_template_ref(spec, workspaces)?,
        ])],
        Generator::CreateExpo => vec![CommandLine::new("npx").args([
            "create-expo@latest".to_string(),
            spec.output_dir.to_string(),
            "--template".to_string(),
            local_template_ref(spec, workspaces)?,
        ])],
        Generator::ReactNative => vec![CommandLine::new("npx").args([
            "react-native@latest".to_string(),
            "init".to_string(),
            "app".to_string(),
            "--template".to_string(),
            local_template_ref(spec, workspaces)?,
            "--pm=npm".to_string(),
            "--directory".to_string(),
            spec.output_dir.to_string(),
        ])],
        Generator::Tiged => {
            let reference = identity.tree_reference(&format!("packages/{}", spec.name));
            vec![
                CommandLine::new("npx").args([
                    "tiged".to_string(),
                    reference,
                    spec.output_dir.to_string(),
                    "-v".to_string(),
                ]),
                CommandLine::new("npm")
                    .arg("install")
                    .current_dir(spec.output_dir),
            ]
        }
    };
    Ok(commands)
}
