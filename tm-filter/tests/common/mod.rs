//! Shared builders for the tm-filter integration tests

#![allow(dead_code)]

use tm_filter::{Condition, FilterTree, NodePath, Operator, StrategyRegistry};

/// Payload written by the nested builder for `(Name = "Acme" AND Section 8 filed IS TRUE)`
pub const GROUPED_PAYLOAD: &str = r#"{
  "filter_tree": {
    "operator": "AND",
    "operands": [
      {
        "kind": "group",
        "operator": "AND",
        "operands": [
          {"kind": "condition", "strategy": "name", "query": "Acme"},
          {"kind": "condition", "strategy": "section_8", "query": true}
        ]
      }
    ]
  },
  "page": 1,
  "per_page": 10
}"#;

/// Payload written by the flattened builder
pub const FLAT_PAYLOAD: &str = r#"{
  "conditions": [
    {"strategy": "wordmark", "query": "apple", "operator": null},
    {"strategy": "owner_name", "query": "Apple Inc", "operator": "OR"},
    {"strategy": "filing_date", "query": "2020-01-31", "operator": "AND"}
  ],
  "page": 2,
  "per_page": 20
}"#;

pub fn registry() -> StrategyRegistry {
    StrategyRegistry::builtin()
}

pub fn acme() -> Condition {
    registry().condition("name", "Acme").unwrap()
}

pub fn section_8() -> Condition {
    registry().condition("section_8", "").unwrap()
}

/// Empty root, then `name = Acme`, then `OR section_8`
pub fn acme_or_section_8() -> FilterTree {
    let mut tree = FilterTree::new();
    tree.add_condition(&NodePath::root(), acme(), None).unwrap();
    tree.add_condition(&NodePath::root(), section_8(), Some(Operator::Or))
        .unwrap();
    tree
}

pub fn wordmarks(values: &[&str], operator: Operator) -> FilterTree {
    let mut tree = FilterTree::new();
    for value in values {
        tree.add_condition(
            &NodePath::root(),
            Condition::text("wordmark", *value),
            Some(operator),
        )
        .unwrap();
    }
    tree
}
