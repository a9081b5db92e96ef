//! The fixed set of supported templates and where each one is generated

use crate::error::MockError;

/// How a template is materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    /// `create-react-app` with a `file:` template
    CreateReactApp,
    /// `create-expo` with a `file:` template
    CreateExpo,
    /// `react-native init` with a `file:` template
    ReactNative,
    /// `tiged` archive fetch from the remote, followed by `npm install`
    Tiged,
}

impl Generator {
    /// Whether the generator reads the template from the local workspace
    pub fn is_local(&self) -> bool {
        !matches!(self, Generator::Tiged)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Generator::CreateReactApp => "create-react-app",
            Generator::CreateExpo => "create-expo",
            Generator::ReactNative => "react-native",
            Generator::Tiged => "tiged",
        }
    }
}

/// One supported template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSpec {
    /// Workspace name, also the name used on the command line
    pub name: &'static str,
    /// Directory the generator creates under the repository root
    pub output_dir: &'static str,
    pub generator: Generator,
    /// npm script run with `CI=true` after scaffolding
    pub test_script: &'static str,
    /// npm script producing a production build, if the framework has one
    pub build_script: Option<&'static str>,
}

pub const TEMPLATES: &[TemplateSpec] = &[
    TemplateSpec {
        name: "cra-template-redux",
        output_dir: "cra-js-app",
        generator: Generator::CreateReactApp,
        test_script: "test",
        build_script: Some("build"),
    },
    TemplateSpec {
        name: "cra-template-redux-typescript",
        output_dir: "cra-ts-app",
        generator: Generator::CreateReactApp,
        test_script: "test",
        build_script: Some("build"),
    },
    TemplateSpec {
        name: "expo-template-redux-typescript",
        output_dir: "expo-ts-app",
        generator: Generator::CreateExpo,
        test_script: "test",
        build_script: Some("build"),
    },
    TemplateSpec {
        name: "react-native-template-redux-typescript",
        output_dir: "rn-ts-app",
        generator: Generator::ReactNative,
        test_script: "test",
        build_script: None,
    },
    TemplateSpec {
        name: "vite-template-redux",
        output_dir: "vite-ts-app",
        generator: Generator::Tiged,
        test_script: "test",
        build_script: Some("build"),
    },
];

/// Comma-separated list of every template name
pub fn available_names() -> String {
    TEMPLATES
        .iter()
        .map(|t| t.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Look up a template by name
pub fn find_template(name: &str) -> Result<&'static TemplateSpec, MockError> {
    TEMPLATES
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| MockError::UnknownTemplate {
            name: name.to_string(),
            available: available_names(),
        })
}
