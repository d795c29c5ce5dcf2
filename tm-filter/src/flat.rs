//! Flattened view of a filter query: an ordered list of conditions, each carrying the
//! operator that joins it to everything before it.
//!
//! Evaluation is strictly left-associative with no precedence between AND and OR:
//! `a OR b AND c` means `(a OR b) AND c`, not `a OR (b AND c)`.

use crate::errors::QueryError;
use crate::path::NodePath;
use crate::tree::FilterTree;
use crate::types::{Condition, Group, Node, Operator, QueryValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatCondition {
    pub strategy: String,
    #[serde(default)]
    pub query: QueryValue,
    /// Display only, never sent.
    #[serde(default, skip_serializing)]
    pub label: Option<String>,
    /// `None` for the first condition.
    pub operator: Option<Operator>,
}

impl FlatCondition {
    pub fn new(condition: &Condition, operator: Option<Operator>) -> Self {
        Self {
            strategy: condition.strategy.clone(),
            query: condition.query.clone(),
            label: condition.label.clone(),
            operator,
        }
    }

    pub fn to_condition(&self) -> Condition {
        Condition {
            strategy: self.strategy.clone(),
            query: self.query.clone(),
            label: self.label.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatQuery {
    pub conditions: Vec<FlatCondition>,
}

impl FlatQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FlatCondition> {
        self.conditions.get(index)
    }

    /// Append a condition. The first one never carries an operator, later ones must.
    pub fn push(
        &mut self,
        condition: &Condition,
        operator: Option<Operator>,
    ) -> Result<(), QueryError> {
        if !condition.has_value() {
            return Err(QueryError::EmptyValue(condition.strategy.clone()));
        }
        let operator = match (self.conditions.is_empty(), operator) {
            (true, _) => None,
            (false, Some(op)) => Some(op),
            (false, None) => {
                return Err(QueryError::MissingOperator(NodePath::from([
                    self.conditions.len()
                ])))
            }
        };
        self.conditions.push(FlatCondition::new(condition, operator));
        Ok(())
    }

    /// Remove the condition at `index`; whatever becomes first loses its operator.
    pub fn remove(&mut self, index: usize) -> Option<FlatCondition> {
        if index >= self.conditions.len() {
            return None;
        }
        let removed = self.conditions.remove(index);
        if let Some(first) = self.conditions.first_mut() {
            first.operator = None;
        }
        Some(removed)
    }

    pub fn toggle_operator(&mut self, index: usize) -> bool {
        match self
            .conditions
            .get_mut(index)
            .and_then(|item| item.operator.as_mut())
        {
            Some(op) => {
                *op = op.toggled();
                true
            }
            None => false,
        }
    }

    /// Swap in a new condition at `index`, keeping its operator.
    pub fn replace(&mut self, index: usize, condition: &Condition) -> Result<bool, QueryError> {
        if !condition.has_value() {
            return Err(QueryError::EmptyValue(condition.strategy.clone()));
        }
        let Some(item) = self.conditions.get_mut(index) else {
            return Ok(false);
        };
        *item = FlatCondition::new(condition, item.operator);
        Ok(true)
    }

    /// Left-to-right evaluation; `None` for an empty list.
    pub fn evaluate<F>(&self, mut predicate: F) -> Option<bool>
    where
        F: FnMut(&FlatCondition) -> bool,
    {
        let (first, rest) = self.conditions.split_first()?;
        let mut result = predicate(first);
        for item in rest {
            let value = predicate(item);
            result = item.operator.unwrap_or(Operator::And).combine(result, value);
        }
        Some(result)
    }

    /// Nested tree with the same meaning. Always possible.
    pub fn to_tree(&self) -> Result<FilterTree, QueryError> {
        let mut tree = FilterTree::new();
        let root = NodePath::root();
        for (index, item) in self.conditions.iter().enumerate() {
            tree.add_condition(&root, item.to_condition(), item.operator)
                .map_err(|err| match err {
                    QueryError::MissingOperator(_) => {
                        QueryError::MissingOperator(NodePath::from([index]))
                    }
                    other => other,
                })?;
        }
        Ok(tree)
    }

    /// Flattened view of a tree. Only left-deep trees qualify: a group may have a group
    /// as its first operand, every later operand must be a condition.
    pub fn from_tree(tree: &FilterTree) -> Result<Self, QueryError> {
        let mut conditions = Vec::with_capacity(tree.len());
        flatten_into(tree.root(), &NodePath::root(), &mut conditions)?;
        Ok(Self { conditions })
    }
}

fn flatten_into(
    group: &Group,
    path: &NodePath,
    out: &mut Vec<FlatCondition>,
) -> Result<(), QueryError> {
    for (index, operand) in group.operands.iter().enumerate() {
        let operator = if out.is_empty() {
            None
        } else {
            Some(group.operator)
        };
        match (index, operand.as_ref()) {
            (_, Node::Condition(condition)) => out.push(FlatCondition::new(condition, operator)),
            (0, Node::Group(inner)) => flatten_into(inner, &path.child(0), out)?,
            (_, Node::Group(_)) => return Err(QueryError::NotFlattenable(path.child(index))),
        }
    }
    Ok(())
}
