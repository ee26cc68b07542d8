//! Input side of the engine: what the comment data source delivers.

mod flatten;
mod record;

pub use flatten::{flatten_records, FlattenReport, SkippedRecord};
pub use record::{CommentRecord, NodeId, PostRecord, UserInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One data refresh for a single post.
///
/// Comments stay raw so that one bad record does not reject the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub post: PostRecord,
    #[serde(default, deserialize_with = "record::null_as_default")]
    pub comments: Vec<Value>,
    /// Monotonic sequence number assigned by the producer, used to drop
    /// snapshots that arrive out of date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Whether this snapshot should replace one already applied with `applied`.
    ///
    /// Unsequenced snapshots always win.
    #[must_use]
    pub fn is_newer_than(&self, applied: Option<u64>) -> bool {
        match (self.seq, applied) {
            (Some(seq), Some(applied)) => seq > applied,
            _ => true,
        }
    }
}
