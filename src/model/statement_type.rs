//! Statement types: named schemas of typed variables.

use serde::{Deserialize, Serialize};

use super::{StatementTypeId, VariableKind};

/// One declared variable of a statement type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
}

/// A named, ordered schema of variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementType {
    pub id: StatementTypeId,
    pub name: String,
    pub variables: Vec<Variable>,
}

impl StatementType {
    pub fn new(id: StatementTypeId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), variables: Vec::new() }
    }

    pub fn with_variable(mut self, name: impl Into<String>, kind: VariableKind) -> Self {
        self.variables.push(Variable { name: name.into(), kind });
        self
    }

    /// Declared kind of a variable, if the schema has it.
    pub fn kind_of(&self, name: &str) -> Option<VariableKind> {
        self.variables.iter().find(|v| v.name == name).map(|v| v.kind)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }
}
