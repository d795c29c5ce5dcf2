use crate::display::render_tree;
use crate::errors::QueryError;
use crate::path::NodePath;
use crate::payload::SearchRequest;
use crate::registry::StrategyRegistry;
use crate::tree::FilterTree;
use crate::types::{Node, Operator, QueryValue, StrategyKind};
use tracing::debug;

/// Strategy selected when a session starts.
pub const DEFAULT_STRATEGY: &str = "wordmark";

/// Feedback left by the last commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Accepted,
    Rejected,
}

/// Interactive query-building state: the tree being composed plus the inputs used to
/// compose it. One session per builder; nothing here is shared.
#[derive(Debug, Clone)]
pub struct BuilderSession {
    tree: FilterTree,
    registry: StrategyRegistry,
    selected: String,
    value: String,
    pending_operator: Operator,
    editing: Option<NodePath>,
    input_error: bool,
    flash: Option<Flash>,
}

impl BuilderSession {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self::with_tree(registry, FilterTree::new())
    }

    pub fn with_tree(registry: StrategyRegistry, tree: FilterTree) -> Self {
        Self {
            tree,
            registry,
            selected: DEFAULT_STRATEGY.to_string(),
            value: String::new(),
            pending_operator: Operator::And,
            editing: None,
            input_error: false,
            flash: None,
        }
    }

    pub fn tree(&self) -> &FilterTree {
        &self.tree
    }

    /// Structural edits (remove, group, ungroup, toggle) go straight to the tree.
    pub fn tree_mut(&mut self) -> &mut FilterTree {
        &mut self.tree
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn pending_operator(&self) -> Operator {
        self.pending_operator
    }

    pub fn editing(&self) -> Option<&NodePath> {
        self.editing.as_ref()
    }

    pub fn input_error(&self) -> bool {
        self.input_error
    }

    pub fn flash(&self) -> Option<Flash> {
        self.flash
    }

    pub fn display_text(&self) -> String {
        render_tree(&self.tree)
    }

    /// Pick a strategy. Boolean strategies need no input and are added right away;
    /// returns `Ok(true)` when that happened.
    pub fn select(&mut self, strategy: &str) -> Result<bool, QueryError> {
        let kind = self
            .registry
            .kind_of(strategy)
            .ok_or_else(|| QueryError::UnknownStrategy(strategy.to_string()))?;
        if kind == StrategyKind::Boolean {
            let condition = self.registry.condition(strategy, "")?;
            self.tree
                .add_condition(&NodePath::root(), condition, Some(self.pending_operator))?;
            self.flash = Some(Flash::Accepted);
            return Ok(true);
        }
        self.selected = strategy.to_string();
        self.value.clear();
        self.input_error = false;
        Ok(false)
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn toggle_pending_operator(&mut self) -> Operator {
        self.pending_operator = self.pending_operator.toggled();
        self.pending_operator
    }

    /// Load the condition at `path` into the inputs; the next commit replaces it.
    pub fn begin_edit(&mut self, path: &NodePath) -> bool {
        let Some(Node::Condition(condition)) = self.tree.node(path) else {
            debug!(%path, "Edit ignored: no condition at path");
            return false;
        };
        self.selected = condition.strategy.clone();
        self.value = match &condition.query {
            QueryValue::Text(text) => text.clone(),
            QueryValue::Flag => String::new(),
        };
        self.editing = Some(path.clone());
        self.input_error = false;
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.value.clear();
        self.input_error = false;
    }

    /// Validate the current inputs and add them to the tree, or replace the condition
    /// being edited. A rejected commit leaves the tree untouched and flags the input.
    pub fn commit(&mut self) -> Result<(), QueryError> {
        match self.try_commit() {
            Ok(()) => {
                self.value.clear();
                self.editing = None;
                self.input_error = false;
                self.flash = Some(Flash::Accepted);
                Ok(())
            }
            Err(err) => {
                debug!(strategy = %self.selected, "Commit rejected: {}", err);
                self.input_error = true;
                self.flash = Some(Flash::Rejected);
                Err(err)
            }
        }
    }

    fn try_commit(&mut self) -> Result<(), QueryError> {
        let condition = self.registry.condition(&self.selected, &self.value)?;
        match &self.editing {
            Some(path) => {
                if self.tree.replace_condition(path, condition)? {
                    Ok(())
                } else {
                    Err(QueryError::InvalidPath(path.clone()))
                }
            }
            None => {
                self.tree
                    .add_condition(&NodePath::root(), condition, Some(self.pending_operator))
            }
        }
    }

    /// Request for the current tree. A value still sitting in the input is committed first.
    pub fn submission(&mut self, page: u32, per_page: u32) -> Result<SearchRequest, QueryError> {
        if !self.value.trim().is_empty() {
            self.commit()?;
        }
        Ok(SearchRequest::new(self.tree.snapshot(), page, per_page))
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.value.clear();
        self.editing = None;
        self.input_error = false;
        self.flash = None;
    }
}
