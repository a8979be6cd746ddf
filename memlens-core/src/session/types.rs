//! Frame and scope model exposed by a debug session

use serde::{Deserialize, Serialize};

/// The stack frame selected in the host's debug view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl StackFrame {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A DAP scope (locals, arguments, registers, ...) of a frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub name: String,
    pub variables_reference: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_variables: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_variables: Option<u64>,
    #[serde(default)]
    pub expensive: bool,
}

/// A DAP variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub variables_reference: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluate_name: Option<String>,
}

/// A page of indexed children, `[start..start + count)`, of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableGroup {
    pub variables_reference: i64,
    pub start: u64,
    pub count: u64,
}

impl VariableGroup {
    /// Display label in the `[first..last]` form used by debug views
    pub fn label(&self) -> String {
        let last = self.start.saturating_add(self.count.saturating_sub(1));
        format!("[{}..{}]", self.start, last)
    }
}

/// Child of a scope: a real variable, or a synthetic paging group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeElement {
    Variable(Variable),
    Group(VariableGroup),
}

// Response bodies

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateBody {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScopesBody {
    pub scopes: Vec<Scope>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariablesBody {
    pub variables: Vec<Variable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_deserialize() {
        let scope: Scope = serde_json::from_str(
            r#"{"name":"Locals","variablesReference":1000,"expensive":false}"#,
        )
        .unwrap();
        assert_eq!(scope.name, "Locals");
        assert_eq!(scope.variables_reference, 1000);
        assert_eq!(scope.indexed_variables, None);
    }

    #[test]
    fn test_variable_deserialize() {
        let variable: Variable = serde_json::from_str(
            r#"{"name":"buf","value":"{...}","type":"char [16]","variablesReference":7}"#,
        )
        .unwrap();
        assert_eq!(variable.type_name.as_deref(), Some("char [16]"));
        assert_eq!(variable.variables_reference, 7);
    }

    #[test]
    fn test_group_label() {
        let group = VariableGroup {
            variables_reference: 3,
            start: 100,
            count: 100,
        };
        assert_eq!(group.label(), "[100..199]");
    }

    #[test]
    fn test_group_label_near_max() {
        let group = VariableGroup {
            variables_reference: 3,
            start: u64::MAX - 10,
            count: 100,
        };
        assert_eq!(group.label(), format!("[{}..{}]", u64::MAX - 10, u64::MAX));
    }
}
