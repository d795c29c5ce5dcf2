use crate::errors::QueryError;
use crate::path::NodePath;
use crate::types::{unwrap_node, Condition, Group, Node, Operator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

/// Filter expression tree rooted at a group.
///
/// Every group below the root holds at least two operands. The root is exempt: it is empty
/// for "no conditions" and may hold a single operand.
///
/// Edits address nodes by [`NodePath`] and copy only the groups between the root and the
/// edited node (`Arc::make_mut`), so a [`FilterTree::snapshot`] taken before an edit keeps
/// seeing the old tree while sharing everything the edit left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Group", into = "Group")]
pub struct FilterTree {
    root: Group,
}

impl From<Group> for FilterTree {
    fn from(group: Group) -> Self {
        Self::from_group(group)
    }
}

impl From<FilterTree> for Group {
    fn from(tree: FilterTree) -> Self {
        tree.root
    }
}

impl FilterTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree holding one default condition, as a freshly mounted builder shows it.
    pub fn with_condition(condition: Condition) -> Self {
        Self {
            root: Group::of(Operator::And, [condition]),
        }
    }

    /// Build from an arbitrary group, collapsing groups below the root with fewer than two
    /// operands. The root itself is kept as given so a decoded payload re-encodes unchanged.
    pub fn from_group(group: Group) -> Self {
        Self {
            root: normalize_group(group),
        }
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of conditions in the whole tree.
    pub fn len(&self) -> usize {
        self.root.condition_count()
    }

    pub fn snapshot(&self) -> FilterTree {
        self.clone()
    }

    pub fn clear(&mut self) {
        self.root = Group::default();
    }

    /// Node at a non-root path.
    pub fn node(&self, path: &NodePath) -> Option<&Node> {
        let (parent, index) = path.split_last()?;
        self.group(&parent)?.operand(index)
    }

    /// Group at `path`; the empty path is the root.
    pub fn group(&self, path: &NodePath) -> Option<&Group> {
        let mut group = &self.root;
        for &index in path.indices() {
            group = group.operand(index)?.as_group()?;
        }
        Some(group)
    }

    fn group_mut(&mut self, path: &NodePath) -> Option<&mut Group> {
        // Resolve first so a bad path never copies shared groups.
        self.group(path)?;
        let mut group = &mut self.root;
        for &index in path.indices() {
            group = match Arc::make_mut(group.operands.get_mut(index)?) {
                Node::Group(inner) => inner,
                Node::Condition(_) => return None,
            };
        }
        Some(group)
    }

    /// Append a condition as the last operand of the group at `parent`.
    ///
    /// `operator` says how the new condition combines with everything before it and is
    /// required unless the target group is empty. The nested form keeps one operator per
    /// group, so adding with an operator different from the group's wraps the existing
    /// operands in a sub-group first: `a AND b` + `OR c` becomes `(a AND b) OR c`, which is
    /// exactly the left-to-right reading of the additions.
    pub fn add_condition(
        &mut self,
        parent: &NodePath,
        condition: Condition,
        operator: Option<Operator>,
    ) -> Result<(), QueryError> {
        if !condition.has_value() {
            debug!(strategy = %condition.strategy, "Rejected condition without a value");
            return Err(QueryError::EmptyValue(condition.strategy));
        }

        let target_len = self
            .group(parent)
            .map(Group::len)
            .ok_or_else(|| QueryError::InvalidPath(parent.clone()))?;
        let operator = match (target_len, operator) {
            (0, _) => None,
            (_, Some(op)) => Some(op),
            (_, None) => return Err(QueryError::MissingOperator(parent.clone())),
        };

        let group = self
            .group_mut(parent)
            .ok_or_else(|| QueryError::InvalidPath(parent.clone()))?;
        let node = Arc::new(Node::Condition(condition));
        match operator {
            None => group.operands.push(node),
            Some(op) if group.operands.len() == 1 || op == group.operator => {
                group.operator = op;
                group.operands.push(node);
            }
            Some(op) => {
                let previous = std::mem::replace(group, Group::new(op));
                trace!(path = %parent, "Wrapping {} operands before {}", previous.len(), op);
                group.operands.push(Arc::new(Node::Group(previous)));
                group.operands.push(node);
            }
        }
        Ok(())
    }

    /// Replace the condition at `path`. Returns `Ok(false)` when `path` is not a condition.
    pub fn replace_condition(
        &mut self,
        path: &NodePath,
        condition: Condition,
    ) -> Result<bool, QueryError> {
        if !condition.has_value() {
            return Err(QueryError::EmptyValue(condition.strategy));
        }
        if !matches!(self.node(path), Some(Node::Condition(_))) {
            debug!(%path, "Replace ignored: no condition at path");
            return Ok(false);
        }
        let Some((parent, index)) = path.split_last() else {
            return Ok(false);
        };
        let Some(group) = self.group_mut(&parent) else {
            return Ok(false);
        };
        group.operands[index] = Arc::new(Node::Condition(condition));
        Ok(true)
    }

    /// Delete the node at `path`, collapsing any group left with a single operand into that
    /// operand. A root left holding only a group takes that group's place.
    pub fn remove_operand(&mut self, path: &NodePath) -> Option<Node> {
        if self.node(path).is_none() {
            debug!(%path, "Remove ignored: no node at path");
            return None;
        }
        let (parent, index) = path.split_last()?;
        let removed = self.group_mut(&parent)?.operands.remove(index);
        self.collapse_from(parent, true);
        Some(unwrap_node(removed))
    }

    /// Wrap two adjacent operands of the group at `parent` into a new group.
    /// Indices may come in either order; anything but a neighbouring pair is a no-op.
    pub fn group_operands(
        &mut self,
        parent: &NodePath,
        index_a: usize,
        index_b: usize,
        operator: Operator,
    ) -> bool {
        let (lo, hi) = if index_a < index_b {
            (index_a, index_b)
        } else {
            (index_b, index_a)
        };
        let len = self.group(parent).map(Group::len).unwrap_or(0);
        if hi != lo + 1 || hi >= len {
            debug!(%parent, index_a, index_b, "Group ignored: operands are not an adjacent pair");
            return false;
        }
        let Some(group) = self.group_mut(parent) else {
            return false;
        };
        let pair: Vec<Arc<Node>> = group.operands.drain(lo..=hi).collect();
        group.operands.insert(
            lo,
            Arc::new(Node::Group(Group {
                operator,
                operands: pair,
            })),
        );
        self.collapse_from(parent.clone(), false);
        true
    }

    /// Splice the operands of the group at `path` into its parent in its place.
    pub fn ungroup_operands(&mut self, path: &NodePath) -> bool {
        if !matches!(self.node(path), Some(Node::Group(_))) {
            debug!(%path, "Ungroup ignored: no group at path");
            return false;
        }
        let Some((parent, index)) = path.split_last() else {
            return false;
        };
        let Some(group) = self.group_mut(&parent) else {
            return false;
        };
        if let Node::Group(inner) = unwrap_node(group.operands.remove(index)) {
            group.operands.splice(index..index, inner.operands);
        }
        true
    }

    /// Flip AND/OR on the group at `path` (the root for the empty path).
    pub fn toggle_operator(&mut self, path: &NodePath) -> bool {
        match self.group_mut(path) {
            Some(group) => {
                group.operator = group.operator.toggled();
                true
            }
            None => {
                debug!(%path, "Toggle ignored: no group at path");
                false
            }
        }
    }

    /// First non-root group holding fewer than two operands, if any.
    pub fn check_invariant(&self) -> Result<(), NodePath> {
        fn walk(group: &Group, path: &NodePath) -> Result<(), NodePath> {
            for (index, operand) in group.operands.iter().enumerate() {
                if let Node::Group(inner) = operand.as_ref() {
                    let child = path.child(index);
                    if inner.len() < 2 {
                        return Err(child);
                    }
                    walk(inner, &child)?;
                }
            }
            Ok(())
        }
        walk(&self.root, &NodePath::root())
    }

    pub fn matches<F>(&self, mut predicate: F) -> Option<bool>
    where
        F: FnMut(&Condition) -> bool,
    {
        if self.root.is_empty() {
            return None;
        }
        Some(self.root.matches(&mut predicate))
    }

    /// Walk from `path` towards the root replacing undersized groups by their contents.
    fn collapse_from(&mut self, mut path: NodePath, absorb_root: bool) {
        loop {
            let Some(len) = self.group(&path).map(Group::len) else {
                return;
            };
            let Some((parent, index)) = path.split_last() else {
                if absorb_root && len == 1 && self.root.operands[0].is_group() {
                    if let Some(Node::Group(inner)) = self.root.operands.pop().map(unwrap_node) {
                        trace!("Root absorbed its only group");
                        self.root = inner;
                    }
                }
                return;
            };
            if len >= 2 {
                return;
            }
            let Some(grandparent) = self.group_mut(&parent) else {
                return;
            };
            if let Node::Group(inner) = unwrap_node(grandparent.operands.remove(index)) {
                trace!(path = %path, "Collapsed group with {} operand(s)", inner.len());
                grandparent.operands.splice(index..index, inner.operands);
            }
            path = parent;
        }
    }
}

fn normalize_group(group: Group) -> Group {
    let mut operands = Vec::with_capacity(group.operands.len());
    for operand in group.operands {
        match unwrap_node(operand) {
            Node::Condition(condition) => operands.push(Arc::new(Node::Condition(condition))),
            Node::Group(inner) => {
                let inner = normalize_group(inner);
                if inner.len() >= 2 {
                    operands.push(Arc::new(Node::Group(inner)));
                } else {
                    operands.extend(inner.operands);
                }
            }
        }
    }
    Group {
        operator: group.operator,
        operands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> Condition {
        Condition::text("name", "Acme").with_label("Name")
    }

    fn sec8() -> Condition {
        Condition::flag("section_8").with_label("Section 8 filed")
    }

    fn cond(value: &str) -> Condition {
        Condition::text("wordmark", value)
    }

    fn tree_of(values: &[&str], operator: Operator) -> FilterTree {
        let mut tree = FilterTree::new();
        for value in values {
            tree.add_condition(&NodePath::root(), cond(value), Some(operator))
                .unwrap();
        }
        tree
    }

    fn values(group: &Group) -> Vec<String> {
        group
            .conditions()
            .iter()
            .map(|c| c.query.as_text().unwrap_or("true").to_string())
            .collect()
    }

    #[test]
    fn test_add_to_empty_root() {
        let mut tree = FilterTree::new();
        tree.add_condition(&NodePath::root(), acme(), None).unwrap();
        assert_eq!(tree.root().len(), 1);
        assert_eq!(tree.root().operand(0).unwrap().as_condition(), Some(&acme()));
    }

    #[test]
    fn test_add_requires_operator_when_not_first() {
        let mut tree = FilterTree::with_condition(acme());
        let err = tree
            .add_condition(&NodePath::root(), sec8(), None)
            .unwrap_err();
        assert!(matches!(err, QueryError::MissingOperator(_)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_add_rejects_empty_value() {
        let mut tree = FilterTree::new();
        let err = tree
            .add_condition(&NodePath::root(), Condition::text("name", " "), None)
            .unwrap_err();
        assert!(err.is_input_error());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_add_second_sets_group_operator() {
        let mut tree = FilterTree::with_condition(acme());
        tree.add_condition(&NodePath::root(), sec8(), Some(Operator::Or))
            .unwrap();
        assert_eq!(tree.root().operator, Operator::Or);
        assert_eq!(tree.root().len(), 2);
    }

    #[test]
    fn test_add_with_other_operator_wraps_left() {
        let mut tree = tree_of(&["a", "b"], Operator::And);
        tree.add_condition(&NodePath::root(), cond("c"), Some(Operator::Or))
            .unwrap();

        let root = tree.root();
        assert_eq!(root.operator, Operator::Or);
        assert_eq!(root.len(), 2);
        let left = root.operand(0).unwrap().as_group().unwrap();
        assert_eq!(left.operator, Operator::And);
        assert_eq!(values(left), vec!["a", "b"]);
        assert!(tree.check_invariant().is_ok());
    }

    #[test]
    fn test_add_into_nested_group() {
        let mut tree = tree_of(&["a", "b", "c"], Operator::Or);
        assert!(tree.group_operands(&NodePath::root(), 0, 1, Operator::And));
        tree.add_condition(&NodePath::from([0]), cond("d"), Some(Operator::And))
            .unwrap();
        let inner = tree.group(&NodePath::from([0])).unwrap();
        assert_eq!(values(inner), vec!["a", "b", "d"]);
    }

    #[test]
    fn test_add_to_condition_path_is_invalid() {
        let mut tree = tree_of(&["a", "b"], Operator::And);
        let err = tree
            .add_condition(&NodePath::from([0]), cond("c"), Some(Operator::And))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidPath(_)));
    }

    #[test]
    fn test_remove_last_operand_leaves_empty_root() {
        let mut tree = FilterTree::with_condition(acme());
        let removed = tree.remove_operand(&NodePath::from([0])).unwrap();
        assert_eq!(removed, Node::Condition(acme()));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_collapses_two_operand_group() {
        let mut tree = tree_of(&["a", "b", "c"], Operator::Or);
        tree.group_operands(&NodePath::root(), 0, 1, Operator::And);
        tree.remove_operand(&NodePath::from([0, 0])).unwrap();

        assert_eq!(tree.root().len(), 2);
        assert_eq!(
            tree.root().operand(0).unwrap().as_condition(),
            Some(&cond("b"))
        );
        assert!(tree.check_invariant().is_ok());
    }

    #[test]
    fn test_remove_cascades_through_levels() {
        // (a OR (b AND (c OR d))) style nesting, then strip from the bottom up
        let mut tree = tree_of(&["a", "b", "c", "d"], Operator::Or);
        tree.group_operands(&NodePath::root(), 2, 3, Operator::Or);
        tree.group_operands(&NodePath::root(), 1, 2, Operator::And);
        tree.group_operands(&NodePath::root(), 0, 1, Operator::Or);
        assert!(tree.check_invariant().is_ok());

        tree.remove_operand(&NodePath::from([0, 1, 1, 0])).unwrap();
        assert!(tree.check_invariant().is_ok());
        assert_eq!(values(tree.root()), vec!["a", "b", "d"]);
    }

    #[test]
    fn test_remove_absorbs_single_group_into_root() {
        let mut tree = tree_of(&["a", "b", "c"], Operator::Or);
        tree.group_operands(&NodePath::root(), 0, 1, Operator::And);
        tree.remove_operand(&NodePath::from([1])).unwrap();

        assert_eq!(tree.root().operator, Operator::And);
        assert_eq!(tree.root().len(), 2);
        assert!(!tree.root().operand(0).unwrap().is_group());
    }

    #[test]
    fn test_remove_bad_path_is_noop() {
        let mut tree = tree_of(&["a", "b"], Operator::And);
        assert!(tree.remove_operand(&NodePath::from([5])).is_none());
        assert!(tree.remove_operand(&NodePath::root()).is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_group_requires_adjacent_indices() {
        let mut tree = tree_of(&["a", "b", "c"], Operator::And);
        let before = tree.clone();
        assert!(!tree.group_operands(&NodePath::root(), 0, 2, Operator::Or));
        assert!(!tree.group_operands(&NodePath::root(), 2, 3, Operator::Or));
        assert!(!tree.group_operands(&NodePath::root(), 1, 1, Operator::Or));
        assert!(!tree.group_operands(&NodePath::from([0]), 0, 1, Operator::Or));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_group_accepts_either_order() {
        let mut tree = tree_of(&["a", "b", "c"], Operator::And);
        assert!(tree.group_operands(&NodePath::root(), 2, 1, Operator::Or));
        let inner = tree.group(&NodePath::from([1])).unwrap();
        assert_eq!(inner.operator, Operator::Or);
        assert_eq!(values(inner), vec!["b", "c"]);
    }

    #[test]
    fn test_group_whole_subgroup_collapses_it() {
        let mut tree = tree_of(&["a", "b", "c"], Operator::Or);
        tree.group_operands(&NodePath::root(), 0, 1, Operator::And);
        assert!(tree.group_operands(&NodePath::from([0]), 0, 1, Operator::Or));

        assert!(tree.check_invariant().is_ok());
        let inner = tree.group(&NodePath::from([0])).unwrap();
        assert_eq!(inner.operator, Operator::Or);
        assert_eq!(values(inner), vec!["a", "b"]);
    }

    #[test]
    fn test_group_then_ungroup_restores_sequence() {
        let original = tree_of(&["a", "b", "c", "d"], Operator::Or);
        for lo in 0..3 {
            let mut tree = original.clone();
            assert!(tree.group_operands(&NodePath::root(), lo, lo + 1, Operator::And));
            assert!(tree.ungroup_operands(&NodePath::from([lo])));
            assert_eq!(tree, original);
        }
    }

    #[test]
    fn test_ungroup_non_group_is_noop() {
        let mut tree = tree_of(&["a", "b"], Operator::And);
        let before = tree.clone();
        assert!(!tree.ungroup_operands(&NodePath::from([0])));
        assert!(!tree.ungroup_operands(&NodePath::root()));
        assert!(!tree.ungroup_operands(&NodePath::from([9])));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_toggle_operator() {
        let mut tree = tree_of(&["a", "b", "c"], Operator::And);
        tree.group_operands(&NodePath::root(), 0, 1, Operator::And);
        assert!(tree.toggle_operator(&NodePath::from([0])));
        assert_eq!(tree.group(&NodePath::from([0])).unwrap().operator, Operator::Or);
        assert!(tree.toggle_operator(&NodePath::root()));
        assert_eq!(tree.root().operator, Operator::Or);
        assert!(!tree.toggle_operator(&NodePath::from([1])));
    }

    #[test]
    fn test_replace_condition() {
        let mut tree = tree_of(&["a", "b"], Operator::And);
        assert!(tree.replace_condition(&NodePath::from([1]), cond("z")).unwrap());
        assert_eq!(values(tree.root()), vec!["a", "z"]);
        assert!(!tree.replace_condition(&NodePath::from([4]), cond("z")).unwrap());
        assert!(tree
            .replace_condition(&NodePath::from([0]), Condition::text("name", ""))
            .is_err());
    }

    #[test]
    fn test_snapshot_is_isolated_and_shares_untouched_subtrees() {
        let mut tree = tree_of(&["a", "b", "c", "d"], Operator::Or);
        tree.group_operands(&NodePath::root(), 0, 1, Operator::And);
        tree.group_operands(&NodePath::root(), 1, 2, Operator::And);
        let snapshot = tree.snapshot();

        tree.toggle_operator(&NodePath::from([1]));

        assert_eq!(
            snapshot.group(&NodePath::from([1])).unwrap().operator,
            Operator::And
        );
        assert_eq!(
            tree.group(&NodePath::from([1])).unwrap().operator,
            Operator::Or
        );
        assert!(Arc::ptr_eq(
            &snapshot.root().operands[0],
            &tree.root().operands[0]
        ));
        assert!(!Arc::ptr_eq(
            &snapshot.root().operands[1],
            &tree.root().operands[1]
        ));
    }

    #[test]
    fn test_from_group_collapses_degenerate_groups() {
        let group = Group::of(
            Operator::And,
            [
                Node::Group(Group::of(Operator::Or, [cond("a")])),
                Node::Group(Group::new(Operator::Or)),
                Node::Condition(cond("b")),
            ],
        );
        let tree = FilterTree::from_group(group);
        assert!(tree.check_invariant().is_ok());
        assert_eq!(values(tree.root()), vec!["a", "b"]);
        assert_eq!(tree.root().len(), 2);
    }

    #[test]
    fn test_check_invariant_reports_path() {
        let tree = FilterTree {
            root: Group::of(
                Operator::And,
                [
                    Node::Condition(cond("a")),
                    Node::Group(Group::of(Operator::Or, [cond("b")])),
                ],
            ),
        };
        assert_eq!(tree.check_invariant(), Err(NodePath::from([1])));
    }

    #[test]
    fn test_invariant_holds_over_edit_sequences() {
        let ops = [Operator::And, Operator::Or];
        for seed in 0..64usize {
            let mut tree = FilterTree::new();
            for step in 0..10usize {
                let op = ops[(seed >> (step % 6)) & 1];
                let value = format!("v{}", step);
                if (seed + step) % 3 == 2 && tree.len() > 1 {
                    let path = first_leaf_path(&tree, (seed + step) % tree.len());
                    tree.remove_operand(&path);
                } else {
                    tree.add_condition(&NodePath::root(), cond(&value), Some(op))
                        .unwrap();
                }
                assert!(tree.check_invariant().is_ok(), "seed {} step {}", seed, step);
            }
        }
    }

    fn first_leaf_path(tree: &FilterTree, nth: usize) -> NodePath {
        fn collect(group: &Group, path: &NodePath, out: &mut Vec<NodePath>) {
            for (index, operand) in group.operands.iter().enumerate() {
                match operand.as_ref() {
                    Node::Condition(_) => out.push(path.child(index)),
                    Node::Group(inner) => collect(inner, &path.child(index), out),
                }
            }
        }
        let mut out = Vec::new();
        collect(tree.root(), &NodePath::root(), &mut out);
        out.swap_remove(nth)
    }
}
