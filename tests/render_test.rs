//! Tests for TreeRenderer

use rstest::{fixture, rstest};

use orgtree::application::render::{Connector, Guide, Toggle};
use orgtree::application::{
    Charset, ExpansionState, NodeState, RenderStyle, TreeRenderer,
};
use orgtree::domain::{Fault, Forest, ForestBuilder, HierarchyRecord, NodeId};

#[fixture]
fn seed_forest() -> Forest {
    ForestBuilder::build(&[
        HierarchyRecord::new(1, None, [2, 3]),
        HierarchyRecord::new(2, Some(1), [4]),
        HierarchyRecord::new(3, Some(1), []),
        HierarchyRecord::new(4, Some(2), []),
    ])
}

#[rstest]
fn given_seed_forest_when_rendering_then_draws_connector_geometry(seed_forest: Forest) {
    // Act
    let tree = TreeRenderer::default().render(&seed_forest, &ExpansionState::new());

    // Assert
    assert_eq!(
        tree.lines(&RenderStyle::default()),
        vec![
            "└─ ▾ User 1",
            "   ├─ ▾ User 2",
            "   │  └─   User 4",
            "   └─   User 3",
        ]
    );
    assert!(tree.faults.is_empty());
}

#[rstest]
fn given_seed_forest_when_rendering_then_last_flags_follow_sibling_position(
    seed_forest: Forest,
) {
    let tree = TreeRenderer::default().render(&seed_forest, &ExpansionState::new());

    let three = tree.row(NodeId(3)).unwrap();
    let four = tree.row(NodeId(4)).unwrap();
    let two = tree.row(NodeId(2)).unwrap();
    assert!(three.is_last());
    assert!(four.is_last());
    assert!(!two.is_last());
    assert_eq!(four.guides, vec![Guide::Blank, Guide::Pipe]);
    assert_eq!(two.connector, Connector::Tee);
    assert_eq!(three.toggle, Toggle::Leaf);
}

#[rstest]
fn given_collapsed_node_when_rendering_then_hides_its_subtree(seed_forest: Forest) {
    let mut state = ExpansionState::new();
    state.set(NodeId(2), NodeState::Collapsed);

    let tree = TreeRenderer::default().render(&seed_forest, &state);

    assert_eq!(
        tree.ids(),
        vec![NodeId(1), NodeId(2), NodeId(3)]
    );
    assert_eq!(tree.row(NodeId(2)).unwrap().toggle, Toggle::Collapsed);
}

#[rstest]
fn given_ascii_charset_when_rendering_then_uses_ascii_glyphs(seed_forest: Forest) {
    let style = RenderStyle {
        charset: Charset::Ascii,
        label: "#{id}".to_string(),
    };

    let tree = TreeRenderer::default().render(&seed_forest, &ExpansionState::new());

    assert_eq!(
        tree.lines(&style),
        vec!["`- - #1", "   |- - #2", "   |  `-   #4", "   `-   #3"]
    );
}

#[test]
fn given_multiple_roots_when_rendering_then_only_final_root_is_last() {
    let forest = ForestBuilder::build(&[
        HierarchyRecord::new(1, None, []),
        HierarchyRecord::new(2, None, []),
        HierarchyRecord::new(3, None, []),
    ]);

    let tree = TreeRenderer::default().render(&forest, &ExpansionState::new());

    let last: Vec<bool> = tree.rows.iter().map(|r| r.is_last()).collect();
    assert_eq!(last, vec![false, false, true]);
    assert!(tree.rows.iter().all(|r| r.depth() == 0));
}

#[rstest]
#[case::self_reference(vec![HierarchyRecord::new(1, None, [1])], 1)]
#[case::two_cycle(vec![
    HierarchyRecord::new(1, None, [2]),
    HierarchyRecord::new(2, Some(1), [1]),
], 2)]
#[case::long_cycle(vec![
    HierarchyRecord::new(1, None, [2]),
    HierarchyRecord::new(2, Some(1), [3]),
    HierarchyRecord::new(3, Some(2), [1]),
], 3)]
fn given_cyclic_links_when_rendering_then_terminates_with_cycle_fault(
    #[case] records: Vec<HierarchyRecord>,
    #[case] expected_rows: usize,
) {
    let forest = ForestBuilder::build(&records);

    let tree = TreeRenderer::default().render(&forest, &ExpansionState::new());

    assert_eq!(tree.rows.len(), expected_rows);
    assert_eq!(tree.faults.len(), 1);
    assert!(matches!(
        tree.faults[0],
        Fault::StructuralCycle {
            child: NodeId(1),
            ..
        }
    ));
}

#[test]
fn given_dual_membership_when_rendering_then_node_appears_in_both_places() {
    let forest = ForestBuilder::build(&[
        HierarchyRecord::new(1, None, [2]),
        HierarchyRecord::new(2, None, []),
    ]);

    let tree = TreeRenderer::default().render(&forest, &ExpansionState::new());

    assert_eq!(tree.ids(), vec![NodeId(1), NodeId(2), NodeId(2)]);
    assert!(tree.faults.is_empty());
}

#[test]
fn given_chain_deeper_than_limit_when_rendering_then_stops_with_depth_fault() {
    let records: Vec<HierarchyRecord> = (1..=5)
        .map(|id| {
            let parent = (id > 1).then(|| id - 1);
            let children = if id < 5 { vec![id + 1] } else { vec![] };
            HierarchyRecord::new(id, parent, children)
        })
        .collect();
    let forest = ForestBuilder::build(&records);

    let tree = TreeRenderer::new(3).render(&forest, &ExpansionState::new());

    assert_eq!(tree.ids(), vec![NodeId(1), NodeId(2), NodeId(3)]);
    assert_eq!(
        tree.faults,
        vec![Fault::DepthLimit {
            parent: NodeId(3),
            limit: 3
        }]
    );
}

#[test]
fn given_empty_forest_when_rendering_then_returns_no_rows() {
    let tree = TreeRenderer::default().render(&Forest::new(), &ExpansionState::new());
    assert!(tree.rows.is_empty());
    assert!(tree.faults.is_empty());
}
