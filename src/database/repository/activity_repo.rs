//! Participant-activity repository.
//!
//! Counter bumps are Mongo `$inc` updates, so overlapping deliveries from
//! different chats never lose increments. Reads always hit storage; a cache
//! here would hand rankings stale totals.

use anyhow::Result;
use futures::StreamExt;
use mongodb::Collection;
use mongodb::bson::doc;

use crate::database::Database;
use crate::database::models::{Group, ParticipantActivity, rank_by_total, totals_lower_than};
use crate::transport::MessageKind;

/// Repository for per-(group, user) activity tallies.
#[derive(Clone)]
pub struct ActivityRepo {
    collection: Collection<ParticipantActivity>,
}

impl ActivityRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("participant_activity"),
        }
    }

    /// Bump `total` and the media-type bucket for one message.
    ///
    /// Creates the record on the fly when absent. Callers gate this on the
    /// group's counter status.
    pub async fn increment(&self, group_id: &str, user_id: &str, kind: MessageKind) -> Result<()> {
        let options = mongodb::options::UpdateOptions::builder()
            .upsert(true)
            .build();

        let mut increments = doc! { "total": 1_i64 };
        increments.insert(kind.bucket(), 1_i64);

        self.collection
            .update_one(
                doc! { "group_id": group_id, "user_id": user_id },
                doc! { "$inc": increments },
            )
            .with_options(options)
            .await?;

        Ok(())
    }

    /// Ensure a zeroed record exists; idempotent for existing records.
    pub async fn register(&self, group_id: &str, user_id: &str) -> Result<ParticipantActivity> {
        let options = mongodb::options::UpdateOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .update_one(
                doc! { "group_id": group_id, "user_id": user_id },
                doc! { "$setOnInsert": {
                    "total": 0_i64,
                    "text": 0_i64,
                    "image": 0_i64,
                    "video": 0_i64,
                    "sticker": 0_i64,
                    "audio": 0_i64,
                    "other": 0_i64,
                } },
            )
            .with_options(options)
            .await?;

        Ok(self
            .get(group_id, user_id)
            .await?
            .unwrap_or_else(|| ParticipantActivity::new(group_id, user_id)))
    }

    /// Ensure every listed participant has a record, without touching
    /// existing tallies.
    pub async fn register_all(&self, group_id: &str, participants: &[String]) -> Result<()> {
        for user_id in participants {
            self.register(group_id, user_id).await?;
        }

        Ok(())
    }

    /// Get one participant's tallies.
    pub async fn get(&self, group_id: &str, user_id: &str) -> Result<Option<ParticipantActivity>> {
        Ok(self
            .collection
            .find_one(doc! { "group_id": group_id, "user_id": user_id })
            .await?)
    }

    /// Participants ranked by total, descending, ties in participant order.
    pub async fn ranking(&self, group: &Group, limit: usize) -> Result<Vec<ParticipantActivity>> {
        let records = self.all_for_group(&group.group_id).await?;
        Ok(rank_by_total(records, &group.participants, limit))
    }

    /// Current participants with totals below `threshold`, ascending.
    pub async fn lower_than(
        &self,
        group: &Group,
        threshold: i64,
    ) -> Result<Vec<ParticipantActivity>> {
        let records = self.all_for_group(&group.group_id).await?;
        Ok(totals_lower_than(records, &group.participants, threshold))
    }

    async fn all_for_group(&self, group_id: &str) -> Result<Vec<ParticipantActivity>> {
        let mut cursor = self.collection.find(doc! { "group_id": group_id }).await?;
        let mut records = Vec::new();

        while let Some(record) = cursor.next().await {
            records.push(record?);
        }

        Ok(records)
    }
}
