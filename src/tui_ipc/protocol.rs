use std::path::PathBuf;

use comment_tree::model::Snapshot;
use serde::{Deserialize, Serialize};

/// Returns the path to the Unix socket shared by `feed` and `view`.
pub fn socket_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("comment-tree/comment-tree.sock")
}

/// Messages from a snapshot producer to viewers, one JSON object per line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// A new producer session started; sequence numbers restart.
    Connected,
    /// Fresh comment data for the post.
    Snapshot(Snapshot),
    Error { error: String },
}

impl Message {
    /// Collapse a burst of messages so that only the last snapshot is kept.
    ///
    /// Earlier snapshots would be rebuilt and immediately replaced, so they
    /// are dropped. Other messages keep their relative order, and the kept
    /// snapshot stays in its own position.
    pub fn coalesce(messages: Vec<Self>) -> Vec<Self> {
        let last_snapshot = messages
            .iter()
            .rposition(|m| matches!(m, Self::Snapshot(_)));
        messages
            .into_iter()
            .enumerate()
            .filter(|(i, m)| !matches!(m, Self::Snapshot(_)) || Some(*i) == last_snapshot)
            .map(|(_, m)| m)
            .collect()
    }
}
