//! Declared task interfaces.
//!
//! A [`VariableMap`] is one side (inputs or outputs) of a task's declared
//! interface: an ordered mapping of variable names to wire types. The
//! interchange engine uses it to infer native types when a caller receives a
//! bag of literals without type information.

use serde::{Deserialize, Serialize};

use crate::types::LiteralType;

/// A declared interface variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Declared wire type.
    pub literal_type: LiteralType,
    /// Human-readable description.
    pub description: String,
}

impl Variable {
    /// Creates a variable.
    pub fn new(literal_type: LiteralType, description: impl Into<String>) -> Self {
        Self {
            literal_type,
            description: description.into(),
        }
    }
}

/// An ordered mapping of variable names to declared variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableMap {
    variables: Vec<(String, Variable)>,
}

impl VariableMap {
    /// Creates an empty variable map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable, preserving declaration order.
    pub fn insert(&mut self, name: impl Into<String>, variable: Variable) {
        self.variables.push((name.into(), variable));
    }

    /// Looks up a variable by name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if no variables are declared.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
