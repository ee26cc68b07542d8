//! Records delivered by the comment data source.
//!
//! The data source is loose about types: counts and ids sometimes arrive as
//! JSON strings, and fields are frequently omitted. Deserialization accepts
//! those shapes and rejects only values that cannot mean a count or an id.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier of a comment (or of the post, for the synthetic root).
pub type NodeId = i64;

// ============================================================================
// Author metadata
// ============================================================================

/// Author metadata attached to posts and comments.
///
/// Opaque to the engine: it is carried from the input record to the output
/// node unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, deserialize_with = "lenient_optional_id")]
    pub id: Option<NodeId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Badge names. Badge objects are reduced to their `name` field.
    #[serde(default, deserialize_with = "badge_names")]
    pub badges: Vec<String>,
}

impl UserInfo {
    /// Name to show for the author, falling back to "anonymous".
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("anonymous")
    }
}

// ============================================================================
// Post and comment records
// ============================================================================

/// The post a comment thread belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(deserialize_with = "strict_id")]
    pub id: NodeId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "vote_count")]
    pub upvotes: u64,
    #[serde(default, deserialize_with = "vote_count")]
    pub downvotes: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: UserInfo,
}

/// A single comment as delivered by the data source, with any nested
/// `replies` already stripped off (see [`super::flatten_records`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    #[serde(deserialize_with = "strict_id")]
    pub id: NodeId,
    /// `None` marks a top-level comment. Values that are not integers are
    /// treated like an unknown parent.
    #[serde(default, deserialize_with = "lenient_optional_id")]
    pub parent_id: Option<NodeId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "vote_count")]
    pub upvotes: u64,
    #[serde(default, deserialize_with = "vote_count")]
    pub downvotes: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: UserInfo,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl CommentRecord {
    /// Parse a record from its raw JSON form.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

// ============================================================================
// Lenient field decoding
// ============================================================================

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-negative integer, given as a number or a numeric string. `null` is 0.
fn vote_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(0);
    }
    parse_integer(&value)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| de::Error::custom(format!("invalid vote count: {value}")))
}

pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn badge_names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let badges: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(badges
        .unwrap_or_default()
        .into_iter()
        .filter_map(|badge| match badge {
            Value::String(name) => Some(name),
            Value::Object(mut fields) => match fields.remove("name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        })
        .collect())
}

fn strict_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NodeId, D::Error> {
    let value = Value::deserialize(deserializer)?;
    parse_integer(&value).ok_or_else(|| de::Error::custom(format!("invalid id: {value}")))
}

fn lenient_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NodeId>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_integer(&value))
}
