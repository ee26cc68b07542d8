//! Annotated comment tree nodes.

use serde::Serialize;

use crate::model::{CommentRecord, NodeId, PostRecord, UserInfo};

/// Level of the synthetic post root. Top-level comments sit at level 0.
pub const ROOT_LEVEL: i32 = -1;

/// Deepest level a comment is placed at. Replies nested further down are
/// attached at this level under their nearest ancestor one level up.
///
/// Every pass over the tree, serialization included, recurses once per
/// level, and the serialized tree stays within common JSON nesting limits.
pub const MAX_LEVEL: i32 = 50;

/// Addresses a node in a tree.
///
/// Comment ids and the post id come from different id spaces and may collide,
/// so the root is addressed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum NodeKey {
    Post,
    Comment(NodeId),
}

/// Net score of a node. Always derived from the raw counts.
#[must_use]
pub fn vote_score(upvotes: u64, downvotes: u64) -> i64 {
    let up = i64::try_from(upvotes).unwrap_or(i64::MAX);
    let down = i64::try_from(downvotes).unwrap_or(i64::MAX);
    up.saturating_sub(down)
}

/// A node of the comment tree, ready for drawing once the ranking and
/// layout passes have run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::use_self)] // Self in Vec<Self> doesn't work well with derived traits
pub struct CommentNode {
    pub id: NodeId,
    /// Post title; only set on the synthetic root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    pub author: UserInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub upvotes: u64,
    pub downvotes: u64,
    pub vote_score: i64,
    pub negative_score: bool,
    /// Depth from the root; the root is [`ROOT_LEVEL`].
    pub level: i32,
    /// Horizontal offset from the centerline. `None` until layout runs.
    pub x: Option<f64>,
    /// Vertical position. `None` until layout runs.
    pub y: Option<f64>,
    /// Hierarchical display index such as `"2.1.3"`. Empty on the root.
    pub index: String,
    /// Whether this node continues the best path from its parent.
    pub highlighted: bool,
    /// UI state: hide this node's subtree.
    pub collapsed: bool,
    pub is_post: bool,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    /// The synthetic root standing for the post itself.
    #[must_use]
    pub fn post(post: PostRecord) -> Self {
        let score = vote_score(post.upvotes, post.downvotes);
        Self {
            id: post.id,
            title: Some(post.title),
            content: post.content,
            author: post.user,
            created_at: None,
            upvotes: post.upvotes,
            downvotes: post.downvotes,
            vote_score: score,
            negative_score: score < 0,
            level: ROOT_LEVEL,
            x: None,
            y: None,
            index: String::new(),
            highlighted: false,
            collapsed: false,
            is_post: true,
            children: Vec::new(),
        }
    }

    /// A comment node with no children yet.
    #[must_use]
    pub fn comment(record: CommentRecord, level: i32) -> Self {
        let score = vote_score(record.upvotes, record.downvotes);
        Self {
            id: record.id,
            title: None,
            content: record.content,
            author: record.user,
            created_at: record.created_at,
            upvotes: record.upvotes,
            downvotes: record.downvotes,
            vote_score: score,
            negative_score: score < 0,
            level,
            x: None,
            y: None,
            index: String::new(),
            highlighted: false,
            collapsed: false,
            is_post: false,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub const fn key(&self) -> NodeKey {
        if self.is_post {
            NodeKey::Post
        } else {
            NodeKey::Comment(self.id)
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Layout position, once assigned.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    /// Number of nodes below this one.
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Iterate this node and its descendants in pre-order.
    #[must_use]
    pub fn dfs_iter(&self) -> impl Iterator<Item = &Self> {
        DfsIterator { stack: vec![self] }
    }

    #[must_use]
    pub fn find(&self, key: NodeKey) -> Option<&Self> {
        self.dfs_iter().find(|node| node.key() == key)
    }

    pub fn find_mut(&mut self, key: NodeKey) -> Option<&mut Self> {
        if self.key() == key {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(key))
    }
}

/// Pre-order iterator over a subtree.
struct DfsIterator<'a> {
    stack: Vec<&'a CommentNode>,
}

impl<'a> Iterator for DfsIterator<'a> {
    type Item = &'a CommentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so first child is processed first
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
