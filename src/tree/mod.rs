//! Comment tree engine.
//!
//! One render cycle runs four independent passes in sequence:
//! - `model::flatten_records`: normalize nested/flat input
//! - `builder`: reconstruct the tree under a synthetic post root
//! - `ranking`: mark the best path
//! - `layout`: assign coordinates and display indices
//!
//! The result is rebuilt from scratch on every data change.

mod builder;
mod layout;
mod node;
mod ranking;
#[cfg(test)]
mod tests;

use std::collections::HashSet;

pub use builder::build_tree;
pub use hit_test::{find_node_at, NodeRadii, Viewport};
pub use layout::{layout, LayoutConfig, SpreadRange};
pub use node::{vote_score, CommentNode, NodeKey, MAX_LEVEL, ROOT_LEVEL};
pub use ranking::{best_path, mark_best_path};
use serde_json::Value;
use tracing::debug;

use crate::model::{flatten_records, PostRecord, SkippedRecord, Snapshot};

/// A fully annotated comment tree for one post.
#[derive(Debug, Clone)]
pub struct CommentTree {
    pub root: CommentNode,
    /// Sequence number of the snapshot this tree was built from.
    pub seq: Option<u64>,
    /// Input records that were dropped as malformed.
    pub skipped: Vec<SkippedRecord>,
}

impl CommentTree {
    /// Run every pass over a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot, config: &LayoutConfig) -> Self {
        let mut tree = Self::build(snapshot.post, snapshot.comments, config);
        tree.seq = snapshot.seq;
        tree
    }

    /// Run every pass over a post and its raw comment values.
    #[must_use]
    pub fn build(post: PostRecord, comments: Vec<Value>, config: &LayoutConfig) -> Self {
        let flat = flatten_records(comments);
        let mut root = build_tree(post, flat.records);
        let best = mark_best_path(&mut root);
        layout(&mut root, config);

        debug!(
            comments = root.descendant_count(),
            skipped = flat.skipped.len(),
            best_path_score = best,
            "Comment tree ready"
        );

        Self {
            root,
            seq: None,
            skipped: flat.skipped,
        }
    }

    /// Number of comments, not counting the post root.
    #[must_use]
    pub fn comment_count(&self) -> usize {
        self.root.descendant_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: NodeKey) -> Option<&CommentNode> {
        self.root.find(key)
    }

    /// Flip the collapsed flag of a node. Returns the new state, or `None`
    /// if the node does not exist.
    pub fn toggle_collapsed(&mut self, key: NodeKey) -> Option<bool> {
        let node = self.root.find_mut(key)?;
        node.collapsed = !node.collapsed;
        Some(node.collapsed)
    }

    #[must_use]
    pub fn collapsed_keys(&self) -> HashSet<NodeKey> {
        self.root
            .dfs_iter()
            .filter(|n| n.collapsed)
            .map(CommentNode::key)
            .collect()
    }

    /// Re-apply collapse state carried over from a previous tree. Keys that no
    /// longer exist are ignored.
    pub fn restore_collapsed(&mut self, keys: &HashSet<NodeKey>) {
        restore(&mut self.root, keys);
    }

    /// Keys along the best path from the post down.
    #[must_use]
    pub fn best_path(&self) -> Vec<NodeKey> {
        best_path(&self.root)
    }
}

fn restore(node: &mut CommentNode, keys: &HashSet<NodeKey>) {
    node.collapsed = keys.contains(&node.key());
    for child in &mut node.children {
        restore(child, keys);
    }
}
