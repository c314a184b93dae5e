//! Per-participant activity counters and ranking helpers.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Message tallies for one participant in one group.
///
/// Counters only grow while the group's counter is enabled; toggling the
/// counter off freezes them, and only explicit re-registration resets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantActivity {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub group_id: String,
    pub user_id: String,

    #[serde(default)]
    pub total: i64,

    #[serde(default)]
    pub text: i64,

    #[serde(default)]
    pub image: i64,

    #[serde(default)]
    pub video: i64,

    #[serde(default)]
    pub sticker: i64,

    #[serde(default)]
    pub audio: i64,

    #[serde(default)]
    pub other: i64,
}

impl ParticipantActivity {
    /// Create a zeroed record.
    pub fn new(group_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: None,
            group_id: group_id.into(),
            user_id: user_id.into(),
            total: 0,
            text: 0,
            image: 0,
            video: 0,
            sticker: 0,
            audio: 0,
            other: 0,
        }
    }
}

/// Sort records by total, descending, truncated to `limit`.
///
/// Ties keep the group's participant-list order: records are pre-ordered by
/// participant position, then stably sorted on the total alone. Records for
/// users no longer in the list sort after current participants among equal
/// totals.
pub fn rank_by_total(
    mut records: Vec<ParticipantActivity>,
    participants: &[String],
    limit: usize,
) -> Vec<ParticipantActivity> {
    let position = |user_id: &str| {
        participants
            .iter()
            .position(|p| p == user_id)
            .unwrap_or(usize::MAX)
    };

    records.sort_by_key(|r| position(&r.user_id));
    records.sort_by(|a, b| b.total.cmp(&a.total));
    records.truncate(limit);
    records
}

/// Records with `total` below `threshold`, ascending by total, restricted
/// to current participants (stale records for departed members excluded).
pub fn totals_lower_than(
    records: Vec<ParticipantActivity>,
    participants: &[String],
    threshold: i64,
) -> Vec<ParticipantActivity> {
    let mut below: Vec<ParticipantActivity> = records
        .into_iter()
        .filter(|r| r.total < threshold && participants.iter().any(|p| p == &r.user_id))
        .collect();

    below.sort_by(|a, b| a.total.cmp(&b.total));
    below
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, total: i64) -> ParticipantActivity {
        let mut r = ParticipantActivity::new("123@g.us", user);
        r.total = total;
        r
    }

    fn participants() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into(), "d".into()]
    }

    #[test]
    fn test_ranking_orders_by_total_desc() {
        let ranked = rank_by_total(
            vec![record("a", 1), record("b", 7), record("c", 4)],
            &participants(),
            10,
        );

        let users: Vec<&str> = ranked.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(users, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ranking_ties_keep_participant_order() {
        // Records arrive out of order; ties on 5 must resolve to the
        // participant-list order a, c.
        let ranked = rank_by_total(
            vec![record("c", 5), record("b", 3), record("a", 5)],
            &participants(),
            10,
        );

        let users: Vec<&str> = ranked.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(users, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_ranking_truncates_to_limit() {
        let ranked = rank_by_total(
            vec![record("a", 1), record("b", 2), record("c", 3)],
            &participants(),
            2,
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].user_id, "c");
    }

    #[test]
    fn test_lower_than_excludes_departed_members() {
        let below = totals_lower_than(
            vec![record("a", 2), record("gone", 0), record("b", 9)],
            &participants(),
            5,
        );

        let users: Vec<&str> = below.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(users, vec!["a"]);
    }

    #[test]
    fn test_lower_than_sorts_ascending() {
        let below = totals_lower_than(
            vec![record("a", 4), record("b", 1), record("c", 3)],
            &participants(),
            5,
        );

        let totals: Vec<i64> = below.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![1, 3, 4]);
    }
}
