//! User repository.

use anyhow::Result;
use futures::StreamExt;
use mongodb::Collection;
use mongodb::bson::doc;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::database::Database;
use crate::database::models::User;

/// Repository for tracked users.
#[derive(Clone)]
pub struct UserRepo {
    collection: Collection<User>,
    cache: TypedCache<String, User>,
}

impl UserRepo {
    pub fn new(db: &Database, cache_registry: &CacheRegistry) -> Self {
        let cache = cache_registry.get_or_create("users", CacheConfig::lazy_load());

        Self {
            collection: db.collection("users"),
            cache,
        }
    }

    /// Get a user if seen before.
    pub async fn get(&self, user_id: &str) -> Result<Option<User>> {
        if let Some(user) = self.cache.get(&user_id.to_string()) {
            return Ok(Some(user));
        }

        let result = self.collection.find_one(doc! { "user_id": user_id }).await?;

        if let Some(u) = &result {
            self.cache.insert(user_id.to_string(), u.clone());
        }

        Ok(result)
    }

    /// Update the push name, creating the record on first contact.
    pub async fn upsert_name(&self, user_id: &str, name: &str) -> Result<()> {
        let options = mongodb::options::UpdateOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .update_one(
                doc! { "user_id": user_id },
                doc! { "$set": { "name": name } },
            )
            .with_options(options)
            .await?;

        self.cache.invalidate(&user_id.to_string());
        Ok(())
    }

    /// Atomically bump the issued-commands counter.
    pub async fn inc_commands(&self, user_id: &str) -> Result<()> {
        let options = mongodb::options::UpdateOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .update_one(
                doc! { "user_id": user_id },
                doc! { "$inc": { "commands": 1_i64 } },
            )
            .with_options(options)
            .await?;

        self.cache.invalidate(&user_id.to_string());
        Ok(())
    }

    /// Mark the private-chat welcome as delivered.
    pub async fn set_received_welcome(&self, user_id: &str, received: bool) -> Result<()> {
        self.collection
            .update_one(
                doc! { "user_id": user_id },
                doc! { "$set": { "received_welcome": received } },
            )
            .await?;

        self.cache.invalidate(&user_id.to_string());
        Ok(())
    }

    /// All users with operator privileges.
    pub async fn bot_admins(&self) -> Result<Vec<User>> {
        let mut cursor = self.collection.find(doc! { "is_bot_admin": true }).await?;
        let mut admins = Vec::new();

        while let Some(user) = cursor.next().await {
            admins.push(user?);
        }

        Ok(admins)
    }

    /// Register the bot owner (first operator).
    pub async fn register_owner(&self, user_id: &str) -> Result<()> {
        let options = mongodb::options::UpdateOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .update_one(
                doc! { "user_id": user_id },
                doc! { "$set": { "is_bot_admin": true, "is_owner": true } },
            )
            .with_options(options)
            .await?;

        self.cache.invalidate(&user_id.to_string());
        Ok(())
    }
}
