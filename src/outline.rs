//! Plain-text outline of an annotated comment tree.

use std::fmt::Write;

use crate::tree::{CommentNode, CommentTree};

const MAX_CONTENT_CHARS: usize = 60;

/// Render the tree as an indented outline, one comment per line.
///
/// Best-path comments are prefixed with `*`. Collapsed comments show how
/// many replies they hide instead of the replies themselves.
#[must_use]
pub fn render_outline(tree: &CommentTree) -> String {
    let root = &tree.root;
    let mut out = String::new();
    let title = root.title.as_deref().unwrap_or_default();
    let _ = writeln!(
        out,
        "# {title} [{:+}] by {}",
        root.vote_score,
        root.author.display_name()
    );

    if tree.is_empty() {
        out.push_str("  No comments yet\n");
        return out;
    }
    if root.collapsed {
        let _ = writeln!(out, "  ({} hidden)", root.descendant_count());
        return out;
    }
    for child in &root.children {
        write_node(&mut out, child);
    }
    out
}

fn write_node(out: &mut String, node: &CommentNode) {
    let indent = "  ".repeat(usize::try_from(node.level).unwrap_or_default() + 1);
    let marker = if node.highlighted { '*' } else { ' ' };
    let _ = write!(
        out,
        "{indent}{marker}{} [{:+}] {}: {}",
        node.index,
        node.vote_score,
        node.author.display_name(),
        summarize(&node.content)
    );

    if node.collapsed && !node.is_leaf() {
        let _ = writeln!(out, " (+{} hidden)", node.descendant_count());
        return;
    }
    out.push('\n');
    for child in &node.children {
        write_node(out, child);
    }
}

/// First line of the content, shortened to a fixed number of characters.
fn summarize(content: &str) -> String {
    let line = content.lines().next().unwrap_or_default().trim();
    if line.chars().count() > MAX_CONTENT_CHARS {
        let cut: String = line.chars().take(MAX_CONTENT_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}
