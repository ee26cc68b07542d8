//! Whole-engine tests: flatten, build, rank and layout together.

use std::collections::HashSet;

use serde_json::{json, Value};

use super::*;
use crate::model::NodeId;

fn post() -> PostRecord {
    PostRecord {
        id: 1000,
        title: "What should we build next?".to_string(),
        upvotes: 12,
        downvotes: 2,
        ..PostRecord::default()
    }
}

fn comment(id: NodeId, parent: Option<NodeId>, votes: i64) -> Value {
    let (up, down) = if votes >= 0 { (votes, 0) } else { (0, -votes) };
    json!({ "id": id, "parentId": parent, "upvotes": up, "downvotes": down, "content": format!("c{id}") })
}

fn build(comments: Vec<Value>) -> CommentTree {
    CommentTree::build(post(), comments, &LayoutConfig::default())
}

/// Deterministic pseudo-random forest: each comment picks an earlier parent
/// or none, with some dangling parents mixed in.
fn generated(count: i64) -> Vec<Value> {
    (1..=count)
        .map(|id| {
            let parent = match id % 7 {
                0 => None,
                3 => Some(id + 10_000),
                _ if id > 1 => Some((id * 31) % (id - 1) + 1),
                _ => None,
            };
            comment(id, parent, (id * 17) % 11 - 4)
        })
        .collect()
}

#[test]
fn test_reference_scenario() {
    let tree = build(vec![
        comment(1, None, 3),
        comment(2, Some(1), 5),
        comment(3, Some(1), 1),
        comment(4, Some(999), 2),
    ]);
    let root = &tree.root;

    let top: Vec<NodeId> = root.children.iter().map(|c| c.id).collect();
    assert_eq!(top, vec![1, 4]);

    let a = &root.children[0];
    let d = &root.children[1];
    let under_a: Vec<NodeId> = a.children.iter().map(|c| c.id).collect();
    assert_eq!(under_a, vec![2, 3]);

    assert!(a.highlighted, "A carries the best path under the post");
    assert!(a.children[0].highlighted, "B is the best reply under A");
    assert!(!a.children[1].highlighted);
    assert!(!d.highlighted);
    assert!(!root.highlighted, "the post root is never highlighted");

    let indices: Vec<(NodeId, &str)> = root
        .dfs_iter()
        .skip(1)
        .map(|n| (n.id, n.index.as_str()))
        .collect();
    assert_eq!(indices, vec![(1, "1"), (2, "1.1"), (3, "1.2"), (4, "2")]);

    assert_eq!(
        tree.best_path(),
        vec![NodeKey::Comment(1), NodeKey::Comment(2)]
    );
}

#[test]
fn test_empty_post_is_representable() {
    let tree = build(Vec::new());
    assert!(tree.is_empty());
    assert_eq!(tree.comment_count(), 0);
    assert_eq!(tree.root.vote_score, 10);
    assert!(tree.root.position().is_some());
    assert!(tree.best_path().is_empty());
}

#[test]
fn test_nested_and_flat_input_build_the_same_tree() {
    let flat = build(vec![
        comment(1, None, 3),
        comment(2, Some(1), 5),
        comment(5, Some(2), -1),
        comment(3, Some(1), 1),
        comment(4, None, 2),
    ]);
    let nested = build(vec![
        json!({
            "id": 1, "upvotes": 3, "content": "c1",
            "replies": [
                { "id": 2, "upvotes": 5, "content": "c2",
                  "replies": [{ "id": 5, "downvotes": 1, "content": "c5" }] },
                { "id": 3, "parentId": 1, "upvotes": 1, "content": "c3" },
            ],
        }),
        comment(4, None, 2),
    ]);

    assert_eq!(flat.root, nested.root);
}

#[test]
fn test_malformed_records_are_skipped_not_fatal() {
    let tree = build(vec![
        comment(1, None, 1),
        json!({ "parentId": 1, "content": "no id" }),
        json!({ "id": 2, "parentId": 1, "upvotes": "a lot" }),
        comment(3, Some(1), 0),
    ]);
    assert_eq!(tree.comment_count(), 2);
    assert_eq!(tree.skipped.len(), 2);
}

#[test]
fn test_tree_shape_properties_on_generated_input() {
    let input = generated(150);
    let tree = build(input);
    let root = &tree.root;

    assert_eq!(tree.comment_count(), 150, "every valid record becomes a node");

    let mut seen = HashSet::new();
    for node in root.dfs_iter().skip(1) {
        assert!(seen.insert(node.id), "node {} appears twice", node.id);
    }

    for node in root.dfs_iter() {
        for child in &node.children {
            assert_eq!(child.level, node.level + 1);
            assert_eq!(
                child.vote_score,
                vote_score(child.upvotes, child.downvotes)
            );
        }
        for pair in node.children.windows(2) {
            assert!(pair[0].vote_score >= pair[1].vote_score);
        }
        let marked = node.children.iter().filter(|c| c.highlighted).count();
        let expected = usize::from(!node.children.is_empty());
        assert_eq!(marked, expected, "node {} has {marked} highlighted children", node.id);
    }
}

#[test]
fn test_long_reply_chain_builds_serializes_and_drops() {
    let chain: Vec<Value> = (1..=10_000)
        .map(|id| comment(id, (id > 1).then(|| id - 1), 1))
        .collect();
    let tree = build(chain);

    assert_eq!(tree.comment_count(), 10_000);
    assert!(tree.root.dfs_iter().all(|n| n.level <= MAX_LEVEL));
    assert_eq!(tree.best_path().len(), usize::try_from(MAX_LEVEL + 1).unwrap_or(0));
    assert!(tree.root.dfs_iter().all(|n| n.position().is_some()));

    let json = serde_json::to_string(&tree.root).expect("tree should serialize");
    let parsed: Value = serde_json::from_str(&json).expect("output stays within nesting limits");
    assert_eq!(parsed["children"][0]["index"], "1");

    let outline = crate::outline::render_outline(&tree);
    assert_eq!(outline.lines().count(), 10_001);
}

#[test]
fn test_dangling_parents_land_at_top_level() {
    let tree = build(generated(40));
    for id in [3, 10, 17, 24, 31, 38] {
        let node = tree
            .root
            .children
            .iter()
            .find(|c| c.id == id)
            .unwrap_or_else(|| panic!("comment {id} should be top level"));
        assert_eq!(node.level, 0);
    }
}

#[test]
fn test_rebuild_is_deterministic() {
    let first = build(generated(80));
    let second = build(generated(80));
    assert_eq!(first.root, second.root);

    let bits = |tree: &CommentTree| -> Vec<(NodeKey, u64, u64, String, bool)> {
        tree.root
            .dfs_iter()
            .map(|n| {
                (
                    n.key(),
                    n.x.unwrap_or_default().to_bits(),
                    n.y.unwrap_or_default().to_bits(),
                    n.index.clone(),
                    n.highlighted,
                )
            })
            .collect()
    };
    assert_eq!(bits(&first), bits(&second));
}

#[test]
fn test_collapse_state_survives_rebuild() {
    let mut tree = build(vec![comment(1, None, 1), comment(2, Some(1), 1)]);
    assert_eq!(tree.toggle_collapsed(NodeKey::Comment(1)), Some(true));
    assert_eq!(tree.toggle_collapsed(NodeKey::Comment(42)), None);

    let keys = tree.collapsed_keys();
    let mut rebuilt = build(vec![
        comment(1, None, 1),
        comment(2, Some(1), 1),
        comment(3, None, 4),
    ]);
    rebuilt.restore_collapsed(&keys);

    assert!(rebuilt.get(NodeKey::Comment(1)).is_some_and(|n| n.collapsed));
    assert!(rebuilt.get(NodeKey::Comment(3)).is_some_and(|n| !n.collapsed));
}

#[test]
fn test_snapshot_sequence_is_carried() {
    let snapshot: Snapshot = serde_json::from_value(json!({
        "post": { "id": 1, "title": "t" },
        "comments": [comment(1, None, 0)],
        "seq": 7,
    }))
    .expect("snapshot should parse");
    let tree = CommentTree::from_snapshot(snapshot, &LayoutConfig::default());
    assert_eq!(tree.seq, Some(7));
    assert_eq!(tree.comment_count(), 1);
}

#[test]
fn test_output_contract_serializes_camel_case() {
    let tree = build(vec![comment(1, None, -2)]);
    let value = serde_json::to_value(&tree.root).expect("tree should serialize");

    assert_eq!(value["isPost"], json!(true));
    assert_eq!(value["level"], json!(-1));
    let child = &value["children"][0];
    assert_eq!(child["voteScore"], json!(-2));
    assert_eq!(child["negativeScore"], json!(true));
    assert_eq!(child["highlighted"], json!(true));
    assert_eq!(child["collapsed"], json!(false));
    assert_eq!(child["index"], json!("1"));
    assert!(child["x"].is_number());
    assert!(child["y"].is_number());
}
