//! Best-path ranking: marks the canonical thread through the tree.

use super::node::{CommentNode, NodeKey};

/// Mark, under `node` and recursively below it, the child that continues the
/// best path, and return the score of that path.
///
/// A child's path score is its own vote score plus the best path score of its
/// subtree. A leaf contributes 0: a node's own score is counted by its
/// parent, never by itself. On equal path scores the earlier sibling wins.
///
/// `node` itself is never marked. Stale marks on its children are cleared, so
/// running this twice gives the same result.
pub fn mark_best_path(node: &mut CommentNode) -> i64 {
    let mut best: Option<(usize, i64)> = None;

    for (i, child) in node.children.iter_mut().enumerate() {
        child.highlighted = false;
        let path_score = child.vote_score.saturating_add(mark_best_path(child));
        match best {
            Some((_, score)) if path_score <= score => {}
            _ => best = Some((i, path_score)),
        }
    }

    let Some((winner, score)) = best else {
        return 0;
    };
    node.children[winner].highlighted = true;
    score
}

/// Keys along the highlighted path, starting below `node`.
#[must_use]
pub fn best_path(node: &CommentNode) -> Vec<NodeKey> {
    let mut path = Vec::new();
    let mut current = node;
    while let Some(next) = current.children.iter().find(|c| c.highlighted) {
        path.push(next.key());
        current = next;
    }
    path
}
