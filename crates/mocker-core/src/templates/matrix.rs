//! GitHub Actions matrix describing every template's scaffold command

use super::commands::CommandTable;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MatrixEntry {
    pub template: String,
    pub package: String,
}

/// `{"include": [...]}` as accepted by `strategy.matrix`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Matrix {
    pub include: Vec<MatrixEntry>,
}

impl Matrix {
    pub fn from_table(table: &CommandTable) -> Self {
        Self {
            include: table
                .iter()
                .map(|entry| MatrixEntry {
                    template: entry.name().to_string(),
                    package: entry.scaffold_line(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
