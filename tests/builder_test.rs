//! Tests for ForestBuilder

use rstest::{fixture, rstest};
use serde_json::{json, Value};

use orgtree::domain::{Fault, ForestBuilder, HierarchyRecord, NodeId};

#[fixture]
fn seed() -> Vec<HierarchyRecord> {
    vec![
        HierarchyRecord::new(1, None, [2, 3]),
        HierarchyRecord::new(2, Some(1), [4]),
        HierarchyRecord::new(3, Some(1), []),
        HierarchyRecord::new(4, Some(2), []),
    ]
}

fn ids(values: &[i64]) -> Vec<NodeId> {
    values.iter().copied().map(NodeId).collect()
}

#[rstest]
fn given_seed_records_when_building_then_links_children_in_declared_order(
    seed: Vec<HierarchyRecord>,
) {
    // Act
    let forest = ForestBuilder::build(&seed);

    // Assert
    assert_eq!(forest.root_ids(), ids(&[1]));
    assert_eq!(forest.children_of(NodeId(1)), ids(&[2, 3]));
    assert_eq!(forest.children_of(NodeId(2)), ids(&[4]));
    assert!(forest.children_of(NodeId(3)).is_empty());
    assert_eq!(forest.get(NodeId(4)).unwrap().parent_id, Some(NodeId(2)));
    assert_eq!(forest.node_count(), 4);
    assert_eq!(forest.depth(), 3);
}

#[rstest]
#[case::single_root(json!([{"id": 1, "parentId": null, "childIds": []}]), 1)]
#[case::two_roots(json!([
    {"id": 1, "parentId": null, "childIds": [3]},
    {"id": 2, "childIds": []},
    {"id": 3, "parentId": 1, "childIds": []}
]), 2)]
#[case::no_parentless_records(json!([
    {"id": 1, "parentId": 2, "childIds": [2]},
    {"id": 2, "parentId": 1, "childIds": [1]}
]), 0)]
#[case::dual_membership(json!([
    {"id": 1, "parentId": null, "childIds": [2]},
    {"id": 2, "parentId": null, "childIds": []}
]), 2)]
#[case::empty(json!([]), 0)]
fn given_records_when_building_then_root_count_equals_parentless_records(
    #[case] input: Value,
    #[case] expected_roots: usize,
) {
    let parentless = input
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r.get("parentId").map_or(true, Value::is_null))
        .count();

    let forest = ForestBuilder::build_from_value(Some(&input));

    assert_eq!(parentless, expected_roots);
    assert_eq!(forest.root_indices().len(), expected_roots);
}

#[rstest]
fn given_same_input_twice_when_building_then_forests_match(seed: Vec<HierarchyRecord>) {
    let first = ForestBuilder::build(&seed);
    let second = ForestBuilder::build(&seed);

    assert_eq!(first.root_ids(), second.root_ids());
    for id in first.ids() {
        assert_eq!(first.children_of(id), second.children_of(id), "node {id}");
    }
    let first_order: Vec<NodeId> = first.iter().map(|(_, n)| n.id).collect();
    let second_order: Vec<NodeId> = second.iter().map(|(_, n)| n.id).collect();
    assert_eq!(first_order, ids(&[1, 2, 4, 3]));
    assert_eq!(first_order, second_order);
}

#[test]
fn given_dangling_child_when_building_then_drops_it_and_keeps_sibling_order() {
    // Arrange
    let records = vec![
        HierarchyRecord::new(1, None, [2, 99, 3]),
        HierarchyRecord::new(2, Some(1), []),
        HierarchyRecord::new(3, Some(1), []),
    ];

    // Act
    let forest = ForestBuilder::build(&records);

    // Assert
    assert_eq!(forest.children_of(NodeId(1)), ids(&[2, 3]));
    assert!(!forest.contains(NodeId(99)));
    assert_eq!(
        ForestBuilder::dangling_references(&records),
        vec![Fault::DanglingReference {
            parent: NodeId(1),
            child: NodeId(99)
        }]
    );
}

#[test]
fn given_well_formed_input_when_building_then_each_non_root_has_one_parent() {
    let records = vec![
        HierarchyRecord::new(1, None, [2, 3]),
        HierarchyRecord::new(2, Some(1), [4, 5]),
        HierarchyRecord::new(3, Some(1), [6]),
        HierarchyRecord::new(4, Some(2), []),
        HierarchyRecord::new(5, Some(2), []),
        HierarchyRecord::new(6, Some(3), []),
    ];
    let forest = ForestBuilder::build(&records);

    for id in ids(&[2, 3, 4, 5, 6]) {
        let parents = forest
            .ids()
            .filter(|&p| forest.children_of(p).contains(&id))
            .count();
        assert_eq!(parents, 1, "node {id}");
    }
    assert!(forest.detached().is_empty());
    assert!(forest.dual_memberships().is_empty());
}

#[test]
fn given_wire_aliases_when_building_then_decodes_like_canonical_names() {
    let input = json!([
        {"user_Id": 10, "prev_Id": null, "next_Id": [11]},
        {"userId": 11, "parent_id": 10, "child_ids": null}
    ]);

    let forest = ForestBuilder::build_from_value(Some(&input));

    assert_eq!(forest.root_ids(), ids(&[10]));
    assert_eq!(forest.children_of(NodeId(10)), ids(&[11]));
}

#[rstest]
#[case::absent(None)]
#[case::null(Some(Value::Null))]
#[case::object(Some(json!({"data": []})))]
#[case::string(Some(json!("users")))]
fn given_non_array_input_when_building_then_yields_empty_forest(#[case] input: Option<Value>) {
    let forest = ForestBuilder::build_from_value(input.as_ref());
    assert!(forest.is_empty());
    assert_eq!(forest.node_count(), 0);
}

#[test]
fn given_array_with_bad_element_when_building_then_skips_only_that_element() {
    let input = json!([
        {"id": 1, "childIds": [2]},
        {"id": "two"},
        {"id": 2, "parentId": 1}
    ]);

    let forest = ForestBuilder::build_from_value(Some(&input));

    assert_eq!(forest.node_count(), 2);
    assert_eq!(forest.children_of(NodeId(1)), ids(&[2]));
}
