mod common;

use common::*;
use std::fs;
use tempfile::TempDir;
use tm_filter::{
    apply_all, parse_canonical, parse_request, parse_script, render_tree, serialize_flat,
    serialize_tree, AnyRequest, FilterTree, Operator, QueryError, SearchRequest,
};

#[test]
fn test_grouped_payload_is_stable() {
    let request = parse_canonical(GROUPED_PAYLOAD).unwrap();
    assert_eq!(request.filter_tree.root().len(), 1);
    assert_eq!(
        render_tree(&registry().normalize(&request.filter_tree)),
        "(Name = \"Acme\" AND Section 8 filed IS TRUE)"
    );

    let first = serialize_tree(&request).unwrap();
    let second = serialize_tree(&parse_canonical(&first).unwrap()).unwrap();
    assert_eq!(first, second);
    let expected: serde_json::Value = serde_json::from_str(GROUPED_PAYLOAD).unwrap();
    let actual: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_payload_without_kind_decodes_by_shape() {
    let json = r#"{"filter_tree":{"operator":"OR","operands":[{"strategy":"name","query":"Acme","label":"Name"},{"strategy":"section_8","query":"true"}]},"page":1,"per_page":10}"#;
    let request = parse_canonical(json).unwrap();
    assert_eq!(request.filter_tree.root().operator, Operator::Or);
    assert_eq!(request.filter_tree.root().len(), 2);

    let normalized = registry().normalize(&request.filter_tree);
    assert_eq!(
        render_tree(&normalized),
        "Name = \"Acme\" OR Section 8 filed IS TRUE"
    );

    let first = serialize_tree(&request).unwrap();
    let second = serialize_tree(&parse_canonical(&first).unwrap()).unwrap();
    assert_eq!(first, second);
    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["filter_tree"]["operands"][0]["kind"], "condition");
    assert_eq!(value["filter_tree"]["operands"][1]["query"], "true");
}

#[test]
fn test_flat_payload_converts_to_left_deep_tree() {
    let request = parse_request(FLAT_PAYLOAD).unwrap();
    let AnyRequest::Flat(flat) = request.clone() else {
        panic!("expected the flat form");
    };
    let canonical = request.into_canonical().unwrap();
    assert_eq!(canonical.page, 2);
    assert_eq!(canonical.per_page, 20);

    // (wordmark OR owner_name) AND filing_date
    let root = canonical.filter_tree.root();
    assert_eq!(root.operator, Operator::And);
    assert_eq!(
        root.operand(0).unwrap().as_group().unwrap().operator,
        Operator::Or
    );

    let back = canonical.to_flat().unwrap();
    assert_eq!(back, flat);
    let value: serde_json::Value = serde_json::from_str(&serialize_flat(&back).unwrap()).unwrap();
    let expected: serde_json::Value = serde_json::from_str(FLAT_PAYLOAD).unwrap();
    assert_eq!(value, expected);
}

#[test]
fn test_normalize_legacy_boolean_text() {
    let json = r#"{"filter_tree": {"operator": "OR", "operands": [
        {"kind": "condition", "strategy": "wordmark", "query": "apple"},
        {"kind": "condition", "strategy": "color_drawing", "query": "true"}
    ]}}"#;
    let request = parse_canonical(json).unwrap();
    let normalized = registry().normalize(&request.filter_tree);
    assert_eq!(
        render_tree(&normalized),
        "Word Mark = \"apple\" OR Color Drawing IS TRUE"
    );
}

#[test]
fn test_script_file_replay() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("edits.yaml");
    fs::write(
        &path,
        r#"
- op: add
  strategy: wordmark
  value: apple
- op: add
  strategy: owner_name
  value: Apple Inc
  operator: OR
- op: add
  strategy: section_8
  operator: AND
- op: remove
  path: "/0/0"
"#,
    )
    .unwrap();

    let script = parse_script(&fs::read_to_string(&path).unwrap()).unwrap();
    let mut tree = FilterTree::new();
    assert_eq!(apply_all(&mut tree, &registry(), &script).unwrap(), 4);
    assert_eq!(
        render_tree(&tree),
        "Owner's Name = \"Apple Inc\" AND Section 8 filed IS TRUE"
    );

    let request = SearchRequest::new(tree, 1, 10);
    let out = dir.path().join("request.json");
    fs::write(&out, serialize_tree(&request).unwrap()).unwrap();
    let reread = parse_canonical(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(reread.filter_tree.len(), 2);
}

#[test]
fn test_unflattenable_tree_reports_path() {
    let mut tree = wordmarks(&["a", "b", "c"], Operator::Or);
    tree.group_operands(&tm_filter::NodePath::root(), 1, 2, Operator::And);
    let request = SearchRequest::new(tree, 1, 10);
    assert!(matches!(
        request.to_flat(),
        Err(QueryError::NotFlattenable(_))
    ));
}
