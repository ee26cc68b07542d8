//! Normalization of pre-nested comment input into a flat record list.
//!
//! Some data sources nest replies under a `replies` array, others deliver a
//! flat list linked by `parentId`, and some mix both. Everything is reduced
//! to the flat form here so the tree builder has a single input shape.

use serde_json::Value;
use tracing::warn;

use super::record::{CommentRecord, NodeId};

/// A raw record that could not be turned into a [`CommentRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Pre-order position of the record in the (possibly nested) input.
    pub position: usize,
    /// The raw `id` field, if there was one.
    pub raw_id: Option<String>,
    pub reason: String,
}

/// Result of flattening: usable records in pre-order, plus what was dropped.
#[derive(Debug, Clone, Default)]
pub struct FlattenReport {
    pub records: Vec<CommentRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Flatten raw comment values into records.
///
/// Records are emitted depth-first, each one before its replies. A reply
/// without its own `parentId` is attached to the record it was nested under.
/// Malformed records are skipped; their replies are still processed.
#[must_use]
pub fn flatten_records(raw: Vec<Value>) -> FlattenReport {
    let mut report = FlattenReport::default();
    let mut position = 0;
    for value in raw {
        flatten_into(value, None, &mut position, &mut report);
    }
    report
}

fn flatten_into(
    value: Value,
    enclosing: Option<NodeId>,
    position: &mut usize,
    report: &mut FlattenReport,
) {
    let current = *position;
    *position += 1;

    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            skip(report, current, None, format!("expected an object, got {other}"));
            return;
        }
    };

    let replies = match fields.remove("replies") {
        Some(Value::Array(replies)) => replies,
        _ => Vec::new(),
    };
    let raw_id = fields.get("id").map(ToString::to_string);

    let own_id = match CommentRecord::from_value(Value::Object(fields)) {
        Ok(mut record) => {
            if record.parent_id.is_none() {
                record.parent_id = enclosing;
            }
            let id = record.id;
            report.records.push(record);
            Some(id)
        }
        Err(e) => {
            skip(report, current, raw_id, e.to_string());
            None
        }
    };

    for reply in replies {
        flatten_into(reply, own_id, position, report);
    }
}

fn skip(report: &mut FlattenReport, position: usize, raw_id: Option<String>, reason: String) {
    warn!(position, raw_id = raw_id.as_deref(), %reason, "Skipping malformed comment record");
    report.skipped.push(SkippedRecord {
        position,
        raw_id,
        reason,
    });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ids_and_parents(report: &FlattenReport) -> Vec<(NodeId, Option<NodeId>)> {
        report.records.iter().map(|r| (r.id, r.parent_id)).collect()
    }

    #[test]
    fn test_flat_input_passes_through_in_order() {
        let report = flatten_records(vec![
            json!({ "id": 1, "parentId": null }),
            json!({ "id": 2, "parentId": 1 }),
            json!({ "id": 3, "parentId": 1 }),
        ]);
        assert_eq!(
            ids_and_parents(&report),
            vec![(1, None), (2, Some(1)), (3, Some(1))]
        );
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_nested_replies_inherit_enclosing_parent() {
        let report = flatten_records(vec![json!({
            "id": 1,
            "replies": [
                { "id": 2, "replies": [{ "id": 4 }] },
                { "id": 3, "parentId": 1 },
            ],
        })]);
        assert_eq!(
            ids_and_parents(&report),
            vec![(1, None), (2, Some(1)), (4, Some(2)), (3, Some(1))]
        );
    }

    #[test]
    fn test_explicit_parent_id_wins_over_nesting() {
        let report = flatten_records(vec![json!({
            "id": 1,
            "replies": [{ "id": 2, "parentId": 10 }],
        })]);
        assert_eq!(ids_and_parents(&report), vec![(1, None), (2, Some(10))]);
    }

    #[test]
    fn test_malformed_record_is_skipped_but_replies_survive() {
        let report = flatten_records(vec![
            json!({ "content": "no id", "replies": [{ "id": 5 }] }),
            json!("not an object"),
            json!({ "id": 6, "upvotes": "many" }),
            json!({ "id": 7 }),
        ]);

        assert_eq!(ids_and_parents(&report), vec![(5, None), (7, None)]);
        let positions: Vec<usize> = report.skipped.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 2, 3]);
        assert_eq!(report.skipped[2].raw_id.as_deref(), Some("6"));
    }
}
