//! Command handlers.
//!
//! Add new commands by:
//! 1. Creating the handler in the matching module (or a new one)
//! 2. Adding the name to `CATALOG`
//! 3. Adding the dispatch arm in `dispatch()`

pub mod activity;
pub mod blocking;
pub mod members;
pub mod settings;

use crate::database::{ActivityRepo, BotProfile, BotRepo, Group, GroupRepo, UserRepo};
use crate::error::CommandError;
use crate::texts::get_text;
use crate::transport::{InboundMessage, Transport};

/// Every command the bot knows, names without prefix.
pub const CATALOG: &[&str] = &[
    "group",
    "photo",
    "blacklist",
    "unblacklist",
    "blacklisted",
    "add",
    "ban",
    "promote",
    "demote",
    "everyone",
    "members",
    "admins",
    "owner",
    "mute",
    "link",
    "revokelink",
    "restrict",
    "antilink",
    "autosticker",
    "welcome",
    "antifake",
    "antiflood",
    "counter",
    "delete",
    "topactive",
    "activity",
    "inactive",
    "bcmd",
    "dcmd",
    "gbcmd",
    "gdcmd",
];

/// Commands that can never be blocked (blocking them would lock admins out
/// of the unblock path).
pub const PROTECTED: &[&str] = &["bcmd", "dcmd", "gbcmd", "gdcmd"];

/// Whether a name (without prefix) is a known command.
pub fn is_known_command(name: &str) -> bool {
    CATALOG.contains(&name)
}

/// Everything a handler needs for one invocation.
pub struct CommandContext<'a> {
    pub transport: &'a dyn Transport,
    pub bot: &'a BotProfile,
    pub group: &'a Group,
    pub message: &'a InboundMessage,
    pub groups: &'a GroupRepo,
    pub users: &'a UserRepo,
    pub bots: &'a BotRepo,
    pub activity: &'a ActivityRepo,
}

impl CommandContext<'_> {
    /// Reply to the invoking message.
    pub async fn reply(&self, text: &str) -> Result<(), CommandError> {
        self.transport
            .reply_text(
                &self.message.chat_id,
                text,
                &self.message.message_ref(),
                &self.message.send_options(),
            )
            .await?;
        Ok(())
    }

    /// Reply mentioning the listed users.
    pub async fn reply_mentioning(
        &self,
        text: &str,
        mentions: &[String],
    ) -> Result<(), CommandError> {
        self.transport
            .reply_with_mentions(
                &self.message.chat_id,
                text,
                mentions,
                &self.message.message_ref(),
                &self.message.send_options(),
            )
            .await?;
        Ok(())
    }

    /// Fail unless the sender is a group admin.
    pub fn require_group_admin(&self) -> Result<(), CommandError> {
        if self.message.is_group_admin {
            Ok(())
        } else {
            Err(CommandError::Permission(get_text(
                "permission.group_admin_only",
            )))
        }
    }

    /// Fail unless the sender is a bot admin.
    pub fn require_bot_admin(&self) -> Result<(), CommandError> {
        if self.message.is_bot_admin {
            Ok(())
        } else {
            Err(CommandError::Permission(get_text(
                "permission.bot_admin_only",
            )))
        }
    }

    /// Fail unless the bot itself is a group admin.
    pub fn require_bot_group_admin(&self) -> Result<(), CommandError> {
        if self.group.is_admin(&self.bot.host_number) {
            Ok(())
        } else {
            Err(CommandError::Permission(get_text(
                "permission.bot_not_group_admin",
            )))
        }
    }

    /// Usage error for the invoked command.
    pub fn usage(&self, command: &str) -> CommandError {
        CommandError::Usage(
            get_text("common.usage")
                .replace("{prefix}", &self.bot.prefix)
                .replace("{command}", command),
        )
    }
}

/// Route a known command to its handler.
pub async fn dispatch(ctx: &CommandContext<'_>, command: &str) -> Result<(), CommandError> {
    match command {
        "group" => settings::group_info(ctx).await,
        "photo" => settings::set_group_photo(ctx).await,
        "mute" => settings::toggle_mute(ctx).await,
        "link" => settings::invite_link(ctx).await,
        "revokelink" => settings::revoke_invite_link(ctx).await,
        "restrict" => settings::toggle_restriction(ctx).await,
        "antilink" => settings::toggle_antilink(ctx).await,
        "autosticker" => settings::toggle_autosticker(ctx).await,
        "welcome" => settings::toggle_welcome(ctx).await,
        "antifake" => settings::toggle_antifake(ctx).await,
        "antiflood" => settings::toggle_antiflood(ctx).await,
        "counter" => settings::toggle_counter(ctx).await,
        "blacklist" => members::blacklist_add(ctx).await,
        "unblacklist" => members::blacklist_remove(ctx).await,
        "blacklisted" => members::blacklist_list(ctx).await,
        "add" => members::add_participant(ctx).await,
        "ban" => members::ban(ctx).await,
        "promote" => members::promote(ctx).await,
        "demote" => members::demote(ctx).await,
        "everyone" => members::mention_everyone(ctx).await,
        "members" => members::mention_members(ctx).await,
        "admins" => members::mention_admins(ctx).await,
        "owner" => members::owner_info(ctx).await,
        "delete" => members::delete_quoted(ctx).await,
        "topactive" => activity::top_active(ctx).await,
        "activity" => activity::activity_report(ctx).await,
        "inactive" => activity::inactive(ctx).await,
        "bcmd" => blocking::block_group_commands(ctx).await,
        "dcmd" => blocking::unblock_group_commands(ctx).await,
        "gbcmd" => blocking::block_global_commands(ctx).await,
        "gdcmd" => blocking::unblock_global_commands(ctx).await,
        other => Err(ctx.usage(other)),
    }
}
