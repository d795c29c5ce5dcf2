//! Edit scripts: a recorded sequence of builder edits that can be replayed onto a tree.
//!
//! ```yaml
//! - op: add
//!   strategy: name
//!   value: Acme
//! - op: add
//!   strategy: section_8
//!   operator: OR
//! - op: group
//!   a: 0
//!   b: 1
//!   operator: AND
//! ```

use crate::errors::QueryError;
use crate::path::NodePath;
use crate::registry::StrategyRegistry;
use crate::tree::FilterTree;
use crate::types::Operator;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    Add {
        #[serde(default)]
        parent: NodePath,
        strategy: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        operator: Option<Operator>,
    },
    Remove {
        path: NodePath,
    },
    Group {
        #[serde(default)]
        parent: NodePath,
        a: usize,
        b: usize,
        operator: Operator,
    },
    Ungroup {
        path: NodePath,
    },
    Toggle {
        #[serde(default)]
        path: NodePath,
    },
    Replace {
        path: NodePath,
        strategy: String,
        #[serde(default)]
        value: Option<String>,
    },
}

/// Apply one command. `Ok(false)` means the command did not apply to this tree and
/// changed nothing.
pub fn apply(
    tree: &mut FilterTree,
    registry: &StrategyRegistry,
    command: &EditCommand,
) -> Result<bool, QueryError> {
    match command {
        EditCommand::Add {
            parent,
            strategy,
            value,
            operator,
        } => {
            let condition = registry.condition(strategy, value.as_deref().unwrap_or(""))?;
            tree.add_condition(parent, condition, *operator)?;
            Ok(true)
        }
        EditCommand::Remove { path } => Ok(tree.remove_operand(path).is_some()),
        EditCommand::Group {
            parent,
            a,
            b,
            operator,
        } => Ok(tree.group_operands(parent, *a, *b, *operator)),
        EditCommand::Ungroup { path } => Ok(tree.ungroup_operands(path)),
        EditCommand::Toggle { path } => Ok(tree.toggle_operator(path)),
        EditCommand::Replace {
            path,
            strategy,
            value,
        } => {
            let condition = registry.condition(strategy, value.as_deref().unwrap_or(""))?;
            tree.replace_condition(path, condition)
        }
    }
}

/// Apply commands in order, stopping at the first error. The group invariant is
/// checked after every step. Returns how many commands changed the tree.
pub fn apply_all(
    tree: &mut FilterTree,
    registry: &StrategyRegistry,
    commands: &[EditCommand],
) -> Result<usize, QueryError> {
    let mut applied = 0;
    for (step, command) in commands.iter().enumerate() {
        if apply(tree, registry, command)? {
            applied += 1;
        } else {
            debug!(step, ?command, "Command was a no-op");
        }
        tree.check_invariant()
            .map_err(QueryError::InvariantViolated)?;
    }
    Ok(applied)
}

/// Parse a script written as a JSON array or as YAML.
pub fn parse_script(text: &str) -> Result<Vec<EditCommand>, QueryError> {
    if text.trim_start().starts_with('[') {
        Ok(serde_json::from_str(text)?)
    } else {
        Ok(serde_yaml_ng::from_str(text)?)
    }
}
