//! Engine composition root.
//!
//! Owns the repositories, the in-memory moderation trackers and the loaded
//! bot profile. The embedding dispatch loop feeds it decoded events; each
//! one is processed to completion (side effects included) before the call
//! returns.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{error, info, warn};

use crate::cache::CacheRegistry;
use crate::commands::{self, CommandContext};
use crate::config::Config;
use crate::database::{
    ActivityRepo, BotProfile, BotRepo, Database, Group, GroupRepo, UserRepo,
};
use crate::events;
use crate::moderation::{CommandRateLimiter, FloodTracker, procedures};
use crate::texts::get_text;
use crate::transport::{InboundMessage, Transport};
use crate::utils::is_group_id;

/// Shared engine state.
pub struct Engine {
    pub transport: Arc<dyn Transport>,

    /// Database connection.
    pub db: Arc<Database>,

    /// Cache registry for creating/accessing caches.
    pub cache: Arc<CacheRegistry>,

    pub groups: GroupRepo,
    pub users: UserRepo,
    pub bots: BotRepo,
    pub activity: ActivityRepo,

    /// In-memory antiflood state.
    pub flood: FloodTracker,

    /// In-memory command-rate state.
    pub rate: CommandRateLimiter,

    bot: RwLock<BotProfile>,
}

impl Engine {
    /// Connect storage and load the bot profile.
    pub async fn new(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let db = Arc::new(Database::connect(&config.mongodb_uri, &config.mongodb_database).await?);
        let cache = Arc::new(CacheRegistry::new());

        let groups = GroupRepo::new(&db, &cache);
        let users = UserRepo::new(&db, &cache);
        let bots = BotRepo::new(&db);
        let activity = ActivityRepo::new(&db);

        let bot = bots
            .load_or_create(&config.bot_name, &config.command_prefix)
            .await?;
        info!("Engine ready, command prefix '{}'", bot.prefix);

        Ok(Self {
            transport,
            db,
            cache,
            groups,
            users,
            bots,
            activity,
            flood: FloodTracker::new(),
            rate: CommandRateLimiter::new(),
            bot: RwLock::new(bot),
        })
    }

    /// Snapshot of the loaded bot profile.
    pub fn bot_profile(&self) -> BotProfile {
        self.bot.read().clone()
    }

    /// Record the connected account and refresh all group documents.
    pub async fn handle_connected(&self, host_number: &str) -> Result<()> {
        self.bot.write().host_number = host_number.to_string();
        self.bots.set_host_number(host_number).await?;
        info!("Connected as {}", host_number);

        self.sync_groups().await
    }

    /// Refresh every joined group's document from protocol metadata.
    pub async fn sync_groups(&self) -> Result<()> {
        let metas = self.transport.fetch_joined_groups().await?;

        for meta in &metas {
            self.groups.sync_metadata(meta).await?;
        }

        info!("Synced {} groups", metas.len());
        Ok(())
    }

    /// Process one inbound message to completion.
    ///
    /// Returns true when the engine consumed it (ignore-condition, a
    /// moderation check fired, or a command ran).
    pub async fn handle_message(&self, message: InboundMessage) -> Result<bool> {
        let bot = self.bot_profile();
        let transport = self.transport.as_ref();

        if procedures::is_user_blocked(transport, &message).await? {
            return Ok(true);
        }

        procedures::update_user_name(&self.users, &message).await?;

        let command = message.command(&bot.prefix);

        if !is_group_id(&message.chat_id) {
            return self
                .handle_private_message(&bot, &message, command.as_deref())
                .await;
        }

        let group = match self.groups.get(&message.chat_id).await? {
            Some(group) => group,
            None => {
                // first contact with this group since startup
                let meta = self.transport.fetch_group_metadata(&message.chat_id).await?;
                self.groups.sync_metadata(&meta).await?
            }
        };

        if procedures::is_ignored_by_admin_mode(&bot, &message) {
            return Ok(true);
        }

        if procedures::is_ignored_by_group_muted(&group, &message) {
            return Ok(true);
        }

        if command.is_some() && procedures::is_bot_limited_by_group_restricted(&group, &bot) {
            return Ok(true);
        }

        if let Err(e) = procedures::read_user_message(transport, &message).await {
            warn!("Failed to mark message read: {}", e);
        }

        if let Some(cmd) = command.as_deref() {
            if procedures::register_owner_if_first(transport, &self.users, &message, cmd).await? {
                return Ok(true);
            }
        }

        if procedures::screen_group_message(
            transport,
            &self.rate,
            &self.flood,
            &bot,
            &group,
            &message,
            command.as_deref(),
        )
        .await?
        {
            return Ok(true);
        }

        let is_command = command.as_deref().is_some_and(commands::is_known_command);
        procedures::increment_participant_activity(&self.activity, &group, &message, is_command)
            .await?;

        if let Some(cmd) = command.as_deref() {
            if commands::is_known_command(cmd) {
                self.run_command(&bot, &group, &message, cmd).await;
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Private-chat path: ignore-conditions, welcome, then global screening.
    async fn handle_private_message(
        &self,
        bot: &BotProfile,
        message: &InboundMessage,
        command: Option<&str>,
    ) -> Result<bool> {
        let transport = self.transport.as_ref();

        if procedures::is_ignored_by_private_allowed(bot, message) {
            return Ok(true);
        }

        if procedures::is_ignored_by_admin_mode(bot, message) {
            return Ok(true);
        }

        procedures::send_private_welcome(transport, &self.users, bot, message).await?;

        if let Some(cmd) = command {
            if procedures::register_owner_if_first(transport, &self.users, message, cmd).await? {
                return Ok(true);
            }

            if procedures::is_user_limited_by_command_rate(transport, &self.rate, bot, message)
                .await?
            {
                return Ok(true);
            }

            if procedures::is_command_blocked_globally(transport, bot, message, cmd).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Run one known command, converting failures into replies. A failing
    /// command never takes the engine down.
    async fn run_command(&self, bot: &BotProfile, group: &Group, message: &InboundMessage, cmd: &str) {
        if let Err(e) = self.bump_command_counters(group, message).await {
            warn!("Failed to bump command counters: {}", e);
        }

        let ctx = CommandContext {
            transport: self.transport.as_ref(),
            bot,
            group,
            message,
            groups: &self.groups,
            users: &self.users,
            bots: &self.bots,
            activity: &self.activity,
        };

        match commands::dispatch(&ctx, cmd).await {
            Ok(()) => {
                // global block lists live on the in-memory profile too
                if matches!(cmd, "gbcmd" | "gdcmd") {
                    if let Err(e) = self.refresh_bot_profile().await {
                        warn!("Failed to refresh bot profile: {}", e);
                    }
                }
            }
            Err(err) => {
                let text = match err.reply_text() {
                    Some(text) => text.to_string(),
                    None => {
                        error!("Command '{}' failed: {}", cmd, err);
                        get_text("common.error_generic")
                    }
                };

                if let Err(e) = self
                    .transport
                    .reply_text(
                        &message.chat_id,
                        &text,
                        &message.message_ref(),
                        &message.send_options(),
                    )
                    .await
                {
                    warn!("Failed to send error reply: {}", e);
                }
            }
        }
    }

    async fn bump_command_counters(&self, group: &Group, message: &InboundMessage) -> Result<()> {
        self.users.inc_commands(&message.sender).await?;
        self.bots.inc_executed_cmds().await?;
        self.groups.inc_executed_cmds(&group.group_id).await?;
        Ok(())
    }

    async fn refresh_bot_profile(&self) -> Result<()> {
        let name = self.bot.read().name.clone();
        let prefix = self.bot.read().prefix.clone();
        let fresh = self.bots.load_or_create(&name, &prefix).await?;
        *self.bot.write() = fresh;
        Ok(())
    }

    /// Handle a participant joining a group.
    pub async fn handle_group_join(&self, group_id: &str, user_id: &str) -> Result<()> {
        let bot = self.bot_profile();
        let group = self.group_or_sync(group_id).await?;

        events::handle_group_join(self.transport.as_ref(), &self.groups, &bot, &group, user_id)
            .await
    }

    /// Handle a participant leaving a group.
    pub async fn handle_group_leave(&self, group_id: &str, user_id: &str) -> Result<()> {
        let group = self.group_or_sync(group_id).await?;
        events::handle_group_leave(&self.groups, &group, user_id).await
    }

    async fn group_or_sync(&self, group_id: &str) -> Result<Group> {
        if let Some(group) = self.groups.get(group_id).await? {
            return Ok(group);
        }

        let meta = self.transport.fetch_group_metadata(group_id).await?;
        self.groups.sync_metadata(&meta).await
    }
}
