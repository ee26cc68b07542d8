//! Tree construction from flat, parent-referencing comment records.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::node::{CommentNode, MAX_LEVEL, ROOT_LEVEL};
use crate::model::{CommentRecord, NodeId, PostRecord};

/// Build the comment tree for a post.
///
/// - Each comment becomes one node with a freshly computed vote score.
/// - A comment whose parent is unknown (or is itself) is placed at top level.
/// - When several records share an id, the last one wins and takes the
///   position of that last record.
/// - Parent chains that loop without reaching a top-level comment are broken
///   by promoting the earliest record of the loop to top level.
/// - Replies nested below [`MAX_LEVEL`] are attached at that level, under
///   their ancestor one level up, so no record is lost to depth.
/// - Every child list is sorted by descending vote score; ties keep input
///   order.
#[must_use]
pub fn build_tree(post: PostRecord, records: Vec<CommentRecord>) -> CommentNode {
    let mut root = CommentNode::post(post);
    if records.is_empty() {
        return root;
    }

    let links = Links::resolve(&records);
    let mut slots: Vec<Option<CommentRecord>> = records.into_iter().map(Some).collect();

    root.children = links
        .top_level
        .iter()
        .filter_map(|&idx| assemble(idx, ROOT_LEVEL + 1, &mut slots, &links.children))
        .collect();
    sort_by_score(&mut root.children);

    debug!(
        post_id = root.id,
        comments = root.descendant_count(),
        top_level = root.children.len(),
        "Built comment tree"
    );
    root
}

/// Parent/child relations between record indices.
struct Links {
    /// Indices of top-level records, in input order.
    top_level: Vec<usize>,
    /// Child record indices per parent record index, in input order.
    children: HashMap<usize, Vec<usize>>,
}

impl Links {
    fn resolve(records: &[CommentRecord]) -> Self {
        let mut by_id: HashMap<NodeId, usize> = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if let Some(previous) = by_id.insert(record.id, idx) {
                warn!(
                    id = record.id,
                    previous, idx, "Duplicate comment id, keeping the last record"
                );
            }
        }

        let mut parent_of: Vec<Option<usize>> = vec![None; records.len()];
        let mut links = Self {
            top_level: Vec::new(),
            children: HashMap::new(),
        };

        for (idx, record) in records.iter().enumerate() {
            if by_id.get(&record.id) != Some(&idx) {
                continue; // shadowed duplicate
            }
            match record.parent_id.and_then(|pid| by_id.get(&pid).copied()) {
                Some(parent) if parent != idx => {
                    parent_of[idx] = Some(parent);
                    links.children.entry(parent).or_default().push(idx);
                }
                Some(_) => {
                    warn!(id = record.id, "Comment lists itself as parent, placing at top level");
                    links.top_level.push(idx);
                }
                None => {
                    if let Some(pid) = record.parent_id {
                        debug!(id = record.id, parent_id = pid, "Unknown parent, placing at top level");
                    }
                    links.top_level.push(idx);
                }
            }
        }

        links.break_cycles(records, &by_id, &mut parent_of);
        links
    }

    /// Promote records that can't reach a top-level comment.
    fn break_cycles(
        &mut self,
        records: &[CommentRecord],
        by_id: &HashMap<NodeId, usize>,
        parent_of: &mut [Option<usize>],
    ) {
        let mut reached = vec![false; records.len()];
        let mut stack: Vec<usize> = self.top_level.clone();
        self.mark_reached(&mut stack, &mut reached);

        let mut promoted = false;
        for start in 0..records.len() {
            if reached[start] || by_id.get(&records[start].id) != Some(&start) {
                continue;
            }
            let idx = earliest_on_loop(start, parent_of);
            warn!(id = records[idx].id, "Comment parent chain loops, placing at top level");
            if let Some(parent) = parent_of[idx].take() {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|&c| c != idx);
                }
            }
            self.top_level.push(idx);
            stack.push(idx);
            self.mark_reached(&mut stack, &mut reached);
            promoted = true;
        }

        if promoted {
            self.top_level.sort_unstable();
        }
    }

    fn mark_reached(&self, stack: &mut Vec<usize>, reached: &mut [bool]) {
        while let Some(idx) = stack.pop() {
            if reached[idx] {
                continue;
            }
            reached[idx] = true;
            if let Some(children) = self.children.get(&idx) {
                stack.extend(children.iter().copied());
            }
        }
    }
}

/// Follow parent links from `start` until one repeats and return the
/// lowest record index on the loop found.
fn earliest_on_loop(start: usize, parent_of: &[Option<usize>]) -> usize {
    let mut chain = Vec::new();
    let mut seen_at: HashMap<usize, usize> = HashMap::new();
    let mut current = start;
    loop {
        if let Some(&pos) = seen_at.get(&current) {
            return chain[pos..].iter().copied().min().unwrap_or(current);
        }
        seen_at.insert(current, chain.len());
        chain.push(current);
        match parent_of[current] {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}

fn assemble(
    idx: usize,
    level: i32,
    slots: &mut [Option<CommentRecord>],
    children: &HashMap<usize, Vec<usize>>,
) -> Option<CommentNode> {
    let record = slots.get_mut(idx)?.take()?;
    let mut node = CommentNode::comment(record, level);

    if let Some(child_indices) = children.get(&idx) {
        node.children = if level + 1 < MAX_LEVEL {
            child_indices
                .iter()
                .filter_map(|&child| assemble(child, level + 1, slots, children))
                .collect()
        } else {
            let lifted = lift_descendants(idx, level + 1, slots, children);
            if lifted.len() > child_indices.len() {
                warn!(
                    id = node.id,
                    lifted = lifted.len() - child_indices.len(),
                    max_level = MAX_LEVEL,
                    "Replies nested too deep, attaching them at the deepest level"
                );
            }
            lifted
        };
        sort_by_score(&mut node.children);
    }

    Some(node)
}

/// Every record below `idx`, in pre-order, as leaves at `level`.
fn lift_descendants(
    idx: usize,
    level: i32,
    slots: &mut [Option<CommentRecord>],
    children: &HashMap<usize, Vec<usize>>,
) -> Vec<CommentNode> {
    let mut lifted = Vec::new();
    let mut stack: Vec<usize> = children
        .get(&idx)
        .map(|c| c.iter().rev().copied().collect())
        .unwrap_or_default();

    while let Some(next) = stack.pop() {
        if let Some(below) = children.get(&next) {
            stack.extend(below.iter().rev().copied());
        }
        if let Some(record) = slots.get_mut(next).and_then(Option::take) {
            lifted.push(CommentNode::comment(record, level));
        }
    }
    lifted
}

/// Stable sort, highest score first.
fn sort_by_score(nodes: &mut [CommentNode]) {
    nodes.sort_by(|a, b| b.vote_score.cmp(&a.vote_score));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: NodeId, parent_id: Option<NodeId>, upvotes: u64, downvotes: u64) -> CommentRecord {
        CommentRecord {
            id,
            parent_id,
            upvotes,
            downvotes,
            content: format!("comment {id}"),
            ..CommentRecord::default()
        }
    }

    fn post() -> PostRecord {
        PostRecord {
            id: 100,
            title: "Post".to_string(),
            upvotes: 10,
            downvotes: 4,
            ..PostRecord::default()
        }
    }

    fn child_ids(node: &CommentNode) -> Vec<NodeId> {
        node.children.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_empty_input_yields_root_only() {
        let root = build_tree(post(), Vec::new());
        assert!(root.is_post);
        assert_eq!(root.level, ROOT_LEVEL);
        assert_eq!(root.vote_score, 6);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_children_attach_to_parents_with_levels() {
        let root = build_tree(
            post(),
            vec![
                record(1, None, 1, 0),
                record(2, Some(1), 1, 0),
                record(3, Some(2), 1, 0),
            ],
        );
        let a = &root.children[0];
        let b = &a.children[0];
        let c = &b.children[0];
        assert_eq!((a.id, a.level), (1, 0));
        assert_eq!((b.id, b.level), (2, 1));
        assert_eq!((c.id, c.level), (3, 2));
    }

    #[test]
    fn test_child_listed_before_parent_still_attaches() {
        let root = build_tree(post(), vec![record(2, Some(1), 0, 0), record(1, None, 0, 0)]);
        assert_eq!(child_ids(&root), vec![1]);
        assert_eq!(child_ids(&root.children[0]), vec![2]);
    }

    #[test]
    fn test_unknown_parent_becomes_top_level() {
        let root = build_tree(post(), vec![record(1, None, 0, 0), record(4, Some(999), 2, 0)]);
        assert_eq!(child_ids(&root), vec![4, 1]);
        assert_eq!(root.children[0].level, 0);
    }

    #[test]
    fn test_siblings_sorted_by_score_with_stable_ties() {
        let root = build_tree(
            post(),
            vec![
                record(1, None, 1, 0),
                record(2, None, 5, 0),
                record(3, None, 2, 1),
                record(4, None, 0, 3),
                record(5, None, 5, 0),
            ],
        );
        assert_eq!(child_ids(&root), vec![2, 5, 1, 3, 4]);
    }

    #[test]
    fn test_duplicate_ids_keep_last_record() {
        let root = build_tree(
            post(),
            vec![
                record(1, None, 9, 0),
                record(2, None, 1, 0),
                record(1, Some(2), 3, 0),
            ],
        );
        assert_eq!(child_ids(&root), vec![2]);
        let dup = &root.children[0].children[0];
        assert_eq!((dup.id, dup.vote_score, dup.level), (1, 3, 1));
        assert_eq!(root.descendant_count(), 2);
    }

    #[test]
    fn test_self_parent_becomes_top_level() {
        let root = build_tree(post(), vec![record(1, Some(1), 0, 0)]);
        assert_eq!(child_ids(&root), vec![1]);
        assert!(root.children[0].children.is_empty());
    }

    #[test]
    fn test_parent_cycle_is_broken_at_earliest_record() {
        let root = build_tree(
            post(),
            vec![
                record(1, None, 0, 0),
                record(2, Some(3), 0, 0),
                record(3, Some(2), 0, 0),
                record(4, Some(3), 0, 0),
            ],
        );

        assert_eq!(child_ids(&root), vec![1, 2]);
        let promoted = &root.children[1];
        assert_eq!(child_ids(promoted), vec![3]);
        assert_eq!(child_ids(&promoted.children[0]), vec![4]);
        assert_eq!(promoted.children[0].children[0].level, 2);
        assert_eq!(root.descendant_count(), 4);
    }

    #[test]
    fn test_long_reply_chain_is_capped_not_fatal() {
        let records: Vec<CommentRecord> = (1..=10_000)
            .map(|id| record(id, (id > 1).then(|| id - 1), 1, 0))
            .collect();
        let root = build_tree(post(), records);

        assert_eq!(root.descendant_count(), 10_000);
        let deepest = root.dfs_iter().map(|n| n.level).max();
        assert_eq!(deepest, Some(MAX_LEVEL));

        let mut node = &root;
        while let [only] = node.children.as_slice() {
            node = only;
        }
        assert_eq!(node.level, MAX_LEVEL - 1, "chain fans out one level above the cap");
        assert_eq!(node.children.len(), 10_000 - usize::try_from(MAX_LEVEL).unwrap_or(0));
        assert!(node.children.iter().all(CommentNode::is_leaf));
    }

    #[test]
    fn test_capped_replies_keep_input_order_on_ties() {
        let depth = i64::from(MAX_LEVEL);
        let mut records: Vec<CommentRecord> = (0..=depth)
            .map(|id| record(id, (id > 0).then(|| id - 1), 0, 0))
            .collect();
        records.push(record(1000, Some(depth), 0, 0));
        records.push(record(1001, Some(depth - 1), 0, 0));
        let root = build_tree(post(), records);

        let mut node = &root.children[0];
        while node.level < MAX_LEVEL - 1 {
            node = &node.children[0];
        }
        assert_eq!(child_ids(node), vec![depth, 1000, 1001]);
    }

    #[test]
    fn test_reply_hanging_off_a_loop_keeps_its_parent() {
        let root = build_tree(
            post(),
            vec![
                record(5, Some(7), 0, 0),
                record(6, Some(7), 0, 0),
                record(7, Some(6), 0, 0),
            ],
        );

        assert_eq!(child_ids(&root), vec![6], "loop member promoted, not the reply");
        assert_eq!(child_ids(&root.children[0]), vec![7]);
        assert_eq!(child_ids(&root.children[0].children[0]), vec![5]);
    }
}
