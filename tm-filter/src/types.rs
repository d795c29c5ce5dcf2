//! Data model of the filter expression tree

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn toggled(self) -> Self {
        match self {
            Operator::And => Operator::Or,
            Operator::Or => Operator::And,
        }
    }

    pub fn combine(self, left: bool, right: bool) -> bool {
        match self {
            Operator::And => left && right,
            Operator::Or => left || right,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StrategyKind {
    Text,
    Date,
    Boolean,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Section {
    #[default]
    General,
    #[serde(rename = "Filing Status")]
    #[strum(to_string = "Filing Status", serialize = "filing_status")]
    FilingStatus,
    Classification,
}

/// Value matched by a condition. Boolean strategies carry no value, the presence of the
/// condition asserts the flag; on the wire that is the JSON literal `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Flag,
    Text(String),
}

impl QueryValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            QueryValue::Flag => None,
            QueryValue::Text(text) => Some(text),
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, QueryValue::Flag)
    }
}

impl Default for QueryValue {
    fn default() -> Self {
        QueryValue::Text(String::new())
    }
}

impl From<&str> for QueryValue {
    fn from(text: &str) -> Self {
        QueryValue::Text(text.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(text: String) -> Self {
        QueryValue::Text(text)
    }
}

impl Serialize for QueryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QueryValue::Flag => serializer.serialize_bool(true),
            QueryValue::Text(text) => serializer.serialize_str(text),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQueryValue {
    Bool(bool),
    Text(String),
}

impl<'de> Deserialize<'de> for QueryValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawQueryValue::deserialize(deserializer)? {
            RawQueryValue::Bool(true) => Ok(QueryValue::Flag),
            RawQueryValue::Bool(false) => Err(serde::de::Error::custom(
                "a boolean condition can only assert `true`",
            )),
            RawQueryValue::Text(text) => Ok(QueryValue::Text(text)),
        }
    }
}

/// A single search predicate (leaf of the tree)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub strategy: String,
    #[serde(default)]
    pub query: QueryValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Condition {
    pub fn text(strategy: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            query: QueryValue::Text(query.into()),
            label: None,
        }
    }

    pub fn flag(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            query: QueryValue::Flag,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.strategy)
    }

    /// Flags always carry a value; text and date conditions need a non-blank one.
    pub fn has_value(&self) -> bool {
        match &self.query {
            QueryValue::Flag => true,
            QueryValue::Text(text) => !text.trim().is_empty(),
        }
    }
}

/// Boolean combination of child nodes. Children sit behind `Arc` so clones of a tree share
/// every subtree an edit does not touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub operator: Operator,
    #[serde(default)]
    pub operands: Vec<Arc<Node>>,
}

impl Default for Group {
    fn default() -> Self {
        Self::new(Operator::And)
    }
}

impl Group {
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            operands: Vec::new(),
        }
    }

    pub fn of<I, N>(operator: Operator, operands: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        Self {
            operator,
            operands: operands
                .into_iter()
                .map(|node| Arc::new(node.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.operands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }

    pub fn operand(&self, index: usize) -> Option<&Node> {
        self.operands.get(index).map(Arc::as_ref)
    }

    pub fn condition_count(&self) -> usize {
        self.operands.iter().map(|node| node.condition_count()).sum()
    }

    /// Conventional boolean evaluation: an empty AND holds, an empty OR does not.
    pub fn matches<F>(&self, predicate: &mut F) -> bool
    where
        F: FnMut(&Condition) -> bool,
    {
        let mut result = self.operator == Operator::And;
        for operand in &self.operands {
            let value = operand.matches(predicate);
            result = self.operator.combine(result, value);
        }
        result
    }

    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        for operand in &self.operands {
            operand.collect_conditions(&mut out);
        }
        out
    }
}

/// Tree node. Written with a `kind` discriminant; read with or without one, since
/// payloads from other clients tell nodes apart by `strategy` versus `operator`/`operands`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Condition(Condition),
    Group(Group),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NodeKind {
    Condition,
    Group,
}

#[derive(Deserialize)]
struct RawGroup {
    #[serde(default)]
    kind: Option<NodeKind>,
    operator: Operator,
    operands: Vec<Arc<Node>>,
}

#[derive(Deserialize)]
struct RawCondition {
    #[serde(default)]
    kind: Option<NodeKind>,
    strategy: String,
    #[serde(default)]
    query: QueryValue,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNode {
    Group(RawGroup),
    Condition(RawCondition),
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer).map_err(|_| {
            serde::de::Error::custom(
                "expected a condition (`strategy`, `query`) or a group (`operator`, `operands`)",
            )
        })?;
        match raw {
            RawNode::Group(RawGroup {
                kind: None | Some(NodeKind::Group),
                operator,
                operands,
            }) => Ok(Node::Group(Group { operator, operands })),
            RawNode::Condition(RawCondition {
                kind: None | Some(NodeKind::Condition),
                strategy,
                query,
                label,
            }) => Ok(Node::Condition(Condition {
                strategy,
                query,
                label,
            })),
            RawNode::Group(_) => Err(serde::de::Error::custom(
                "node with `kind: condition` has group fields",
            )),
            RawNode::Condition(_) => Err(serde::de::Error::custom(
                "node with `kind: group` has condition fields",
            )),
        }
    }
}

impl Node {
    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            Node::Condition(condition) => Some(condition),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            Node::Condition(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    pub fn condition_count(&self) -> usize {
        match self {
            Node::Condition(_) => 1,
            Node::Group(group) => group.condition_count(),
        }
    }

    pub fn matches<F>(&self, predicate: &mut F) -> bool
    where
        F: FnMut(&Condition) -> bool,
    {
        match self {
            Node::Condition(condition) => predicate(condition),
            Node::Group(group) => group.matches(predicate),
        }
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            Node::Condition(condition) => out.push(condition),
            Node::Group(group) => {
                for operand in &group.operands {
                    operand.collect_conditions(out);
                }
            }
        }
    }
}

impl From<Condition> for Node {
    fn from(condition: Condition) -> Self {
        Node::Condition(condition)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

/// Take a node out of its `Arc`, cloning only when a snapshot still shares it.
pub(crate) fn unwrap_node(node: Arc<Node>) -> Node {
    Arc::try_unwrap(node).unwrap_or_else(|shared| (*shared).clone())
}
