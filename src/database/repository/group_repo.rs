//! Group repository.

use anyhow::Result;
use mongodb::Collection;
use mongodb::bson::doc;
use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::database::Database;
use crate::database::models::Group;
use crate::transport::GroupMetadata;

/// Repository for group documents.
#[derive(Clone)]
pub struct GroupRepo {
    collection: Collection<Group>,
    cache: TypedCache<String, Group>,
}

impl GroupRepo {
    pub fn new(db: &Database, cache_registry: &CacheRegistry) -> Self {
        let cache = cache_registry.get_or_create("groups", CacheConfig::message_context());

        Self {
            collection: db.collection("groups"),
            cache,
        }
    }

    /// Get a group if tracked.
    pub async fn get(&self, group_id: &str) -> Result<Option<Group>> {
        if let Some(group) = self.cache.get(&group_id.to_string()) {
            return Ok(Some(group));
        }

        let filter = doc! { "group_id": group_id };
        let result = self.collection.find_one(filter).await?;

        if let Some(g) = &result {
            self.cache.insert(group_id.to_string(), g.clone());
        }

        Ok(result)
    }

    /// Create-or-refresh a group document from protocol metadata.
    pub async fn sync_metadata(&self, meta: &GroupMetadata) -> Result<Group> {
        let mut group = self
            .get(&meta.group_id)
            .await?
            .unwrap_or_else(|| Group::new(&meta.group_id));

        group.apply_metadata(meta);
        self.save(&group).await?;

        debug!(
            "Synced group {} ({} participants)",
            group.group_id,
            group.participants.len()
        );

        Ok(group)
    }

    /// Save a group document (upsert).
    pub async fn save(&self, group: &Group) -> Result<()> {
        let filter = doc! { "group_id": &group.group_id };
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .replace_one(filter, group)
            .with_options(options)
            .await?;

        self.cache.insert(group.group_id.clone(), group.clone());
        Ok(())
    }

    /// Atomically bump the executed-commands counter.
    pub async fn inc_executed_cmds(&self, group_id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "group_id": group_id },
                doc! { "$inc": { "executed_cmds": 1_i64 } },
            )
            .await?;

        self.cache.invalidate(&group_id.to_string());
        Ok(())
    }

    /// Add a user to the blacklist.
    pub async fn add_to_blacklist(&self, group_id: &str, user_id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "group_id": group_id },
                doc! { "$addToSet": { "blacklist": user_id } },
            )
            .await?;

        self.cache.invalidate(&group_id.to_string());
        Ok(())
    }

    /// Remove a user from the blacklist.
    pub async fn remove_from_blacklist(&self, group_id: &str, user_id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "group_id": group_id },
                doc! { "$pull": { "blacklist": user_id } },
            )
            .await?;

        self.cache.invalidate(&group_id.to_string());
        Ok(())
    }

    /// Record a member joining.
    pub async fn add_participant(&self, group_id: &str, user_id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "group_id": group_id },
                doc! { "$addToSet": { "participants": user_id } },
            )
            .await?;

        self.cache.invalidate(&group_id.to_string());
        Ok(())
    }

    /// Record a member leaving (also drops any admin role).
    pub async fn remove_participant(&self, group_id: &str, user_id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "group_id": group_id },
                doc! { "$pull": { "participants": user_id, "admins": user_id } },
            )
            .await?;

        self.cache.invalidate(&group_id.to_string());
        Ok(())
    }

    /// Disable commands in a group.
    pub async fn block_commands(&self, group_id: &str, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        self.collection
            .update_one(
                doc! { "group_id": group_id },
                doc! { "$addToSet": { "block_cmds": { "$each": names } } },
            )
            .await?;

        self.cache.invalidate(&group_id.to_string());
        Ok(())
    }

    /// Re-enable commands in a group.
    pub async fn unblock_commands(&self, group_id: &str, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        self.collection
            .update_one(
                doc! { "group_id": group_id },
                doc! { "$pull": { "block_cmds": { "$in": names } } },
            )
            .await?;

        self.cache.invalidate(&group_id.to_string());
        Ok(())
    }
}
