//! Bot profile repository (singleton document).

use anyhow::Result;
use mongodb::Collection;
use mongodb::bson::doc;
use tracing::info;

use crate::database::Database;
use crate::database::models::BotProfile;

/// Repository for the single bot-profile document.
///
/// The engine keeps the loaded profile in memory; this repo only persists
/// changes, so no read cache is needed.
#[derive(Clone)]
pub struct BotRepo {
    collection: Collection<BotProfile>,
}

impl BotRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("bot"),
        }
    }

    /// Load the profile, creating it on first run.
    pub async fn load_or_create(&self, name: &str, prefix: &str) -> Result<BotProfile> {
        if let Some(profile) = self.collection.find_one(doc! {}).await? {
            return Ok(profile);
        }

        let profile = BotProfile::new(name, prefix);
        self.collection.insert_one(&profile).await?;
        info!("Created bot profile '{}' with prefix '{}'", name, prefix);

        Ok(profile)
    }

    /// Save the profile (upsert).
    pub async fn save(&self, profile: &BotProfile) -> Result<()> {
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .replace_one(doc! {}, profile)
            .with_options(options)
            .await?;

        Ok(())
    }

    /// Persist the connected account's JID.
    pub async fn set_host_number(&self, host_number: &str) -> Result<()> {
        self.collection
            .update_one(doc! {}, doc! { "$set": { "host_number": host_number } })
            .await?;

        Ok(())
    }

    /// Atomically bump the executed-commands counter.
    pub async fn inc_executed_cmds(&self) -> Result<()> {
        self.collection
            .update_one(doc! {}, doc! { "$inc": { "executed_cmds": 1_i64 } })
            .await?;

        Ok(())
    }

    /// Globally disable commands.
    pub async fn block_commands(&self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        self.collection
            .update_one(
                doc! {},
                doc! { "$addToSet": { "block_cmds": { "$each": names } } },
            )
            .await?;

        Ok(())
    }

    /// Globally re-enable commands.
    pub async fn unblock_commands(&self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        self.collection
            .update_one(doc! {}, doc! { "$pull": { "block_cmds": { "$in": names } } })
            .await?;

        Ok(())
    }
}
