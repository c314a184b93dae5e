//! Message-screening procedures.
//!
//! Ignore-conditions and the fixed-order policy checks run for every
//! inbound message. Each check that fires performs its own side effects
//! (reply, delete, kick) and reports the message as consumed so the caller
//! stops further processing. Rate limiting and command blocking are
//! evaluated before the content detectors: a limited or blocked user's
//! flood/link behavior is not separately punished in the same turn.

use anyhow::Result;
use tracing::{debug, warn};

use crate::database::{ActivityRepo, BotProfile, Group, UserRepo};
use crate::moderation::link;
use crate::moderation::{CommandRateLimiter, FloodTracker};
use crate::texts::get_text;
use crate::transport::{InboundMessage, Transport};
use crate::utils::remove_user_suffix;

/// Private chats are ignored for non-admins while pv_allowed is off.
pub fn is_ignored_by_private_allowed(bot: &BotProfile, message: &InboundMessage) -> bool {
    !message.is_bot_admin && !bot.pv_allowed
}

/// Muted groups only serve group admins.
pub fn is_ignored_by_group_muted(group: &Group, message: &InboundMessage) -> bool {
    group.muted && !message.is_group_admin
}

/// Admin mode restricts the whole bot to bot admins.
pub fn is_ignored_by_admin_mode(bot: &BotProfile, message: &InboundMessage) -> bool {
    bot.admin_mode && !message.is_bot_admin
}

/// In a restricted group the bot stays quiet unless it is a group admin.
pub fn is_bot_limited_by_group_restricted(group: &Group, bot: &BotProfile) -> bool {
    group.restricted && !group.is_admin(&bot.host_number)
}

/// Whether the sender is on the bot account's blocked-contact list.
pub async fn is_user_blocked(transport: &dyn Transport, message: &InboundMessage) -> Result<bool> {
    let blocked = transport.get_blocked_contacts().await?;
    Ok(blocked.iter().any(|c| c == &message.sender))
}

/// Bootstrap the first operator: while no bot admins exist, the `admin`
/// command registers its sender as owner.
pub async fn register_owner_if_first(
    transport: &dyn Transport,
    users: &UserRepo,
    message: &InboundMessage,
    command: &str,
) -> Result<bool> {
    if command != "admin" {
        return Ok(false);
    }

    if !users.bot_admins().await?.is_empty() {
        return Ok(false);
    }

    users.register_owner(&message.sender).await?;
    transport
        .reply_text(
            &message.chat_id,
            &get_text("moderation.owner_registered"),
            &message.message_ref(),
            &message.send_options(),
        )
        .await?;

    Ok(true)
}

/// Greet a user the first time they talk to the bot in private.
pub async fn send_private_welcome(
    transport: &dyn Transport,
    users: &UserRepo,
    bot: &BotProfile,
    message: &InboundMessage,
) -> Result<()> {
    let Some(user) = users.get(&message.sender).await? else {
        return Ok(());
    };

    if user.received_welcome {
        return Ok(());
    }

    let display = message
        .pushname
        .clone()
        .unwrap_or_else(|| remove_user_suffix(&message.sender).to_string());
    let text = get_text("moderation.private_welcome")
        .replace("{user}", &display)
        .replace("{bot}", &bot.name)
        .replace("{prefix}", &bot.prefix);

    transport
        .send_text(&message.chat_id, &text, &message.send_options())
        .await?;
    users.set_received_welcome(&message.sender, true).await?;

    Ok(())
}

/// Track the sender's current push name.
pub async fn update_user_name(users: &UserRepo, message: &InboundMessage) -> Result<()> {
    if let Some(name) = &message.pushname {
        users.upsert_name(&message.sender, name).await?;
    }

    Ok(())
}

/// Mark the message as read.
pub async fn read_user_message(transport: &dyn Transport, message: &InboundMessage) -> Result<()> {
    transport.read_message(&message.message_ref()).await?;
    Ok(())
}

/// Tally the message for the activity counter.
///
/// No-op while counting is disabled for the group. Commands are tallied
/// under their underlying media type; `_is_command` is informational.
pub async fn increment_participant_activity(
    activity: &ActivityRepo,
    group: &Group,
    message: &InboundMessage,
    _is_command: bool,
) -> Result<()> {
    if !group.counter.status {
        return Ok(());
    }

    activity
        .increment(&group.group_id, &message.sender, message.kind)
        .await
}

/// Command-rate check. Replies with the block duration when the sender
/// just got limited (or still is).
pub async fn is_user_limited_by_command_rate(
    transport: &dyn Transport,
    limiter: &CommandRateLimiter,
    bot: &BotProfile,
    message: &InboundMessage,
) -> Result<bool> {
    if !bot.command_rate.status {
        return Ok(false);
    }

    if !limiter.has_exceeded(bot, &message.sender, message.is_bot_admin) {
        return Ok(false);
    }

    let text = get_text("moderation.rate_limited")
        .replace("{minutes}", &bot.command_rate.block_time.to_string());
    transport
        .reply_text(
            &message.chat_id,
            &text,
            &message.message_ref(),
            &message.send_options(),
        )
        .await?;

    Ok(true)
}

/// Globally-blocked command check. Bot admins are exempt.
pub async fn is_command_blocked_globally(
    transport: &dyn Transport,
    bot: &BotProfile,
    message: &InboundMessage,
    command: &str,
) -> Result<bool> {
    if !bot.is_command_blocked_globally(command) || message.is_bot_admin {
        return Ok(false);
    }

    let text = get_text("moderation.globally_blocked_command")
        .replace("{command}", &format!("{}{}", bot.prefix, command));
    transport
        .reply_text(
            &message.chat_id,
            &text,
            &message.message_ref(),
            &message.send_options(),
        )
        .await?;

    Ok(true)
}

/// Group-blocked command check. Applies to admins too; an admin re-enables
/// the command instead of bypassing the block.
pub async fn is_command_blocked_in_group(
    transport: &dyn Transport,
    group: &Group,
    bot: &BotProfile,
    message: &InboundMessage,
    command: &str,
) -> Result<bool> {
    if !group.is_blocked_command(command) {
        return Ok(false);
    }

    let text = get_text("moderation.group_blocked_command")
        .replace("{command}", &format!("{}{}", bot.prefix, command));
    transport
        .reply_text(
            &message.chat_id,
            &text,
            &message.message_ref(),
            &message.send_options(),
        )
        .await?;

    Ok(true)
}

/// Antilink check: notify with a mention, then delete the offending
/// message.
pub async fn is_detected_by_antilink(
    transport: &dyn Transport,
    bot: &BotProfile,
    group: &Group,
    message: &InboundMessage,
) -> Result<bool> {
    if !link::is_message_with_link(message, group, bot) {
        return Ok(false);
    }

    debug!("Antilink fired for {} in {}", message.sender, group.group_id);

    let text =
        get_text("moderation.detected_link").replace("{user}", remove_user_suffix(&message.sender));
    transport
        .send_text_with_mentions(
            &message.chat_id,
            &text,
            &[message.sender.clone()],
            &message.send_options(),
        )
        .await?;
    transport
        .delete_message(&message.message_ref(), false)
        .await?;

    Ok(true)
}

/// Antiflood check: remove the sender, then announce it. The kick comes
/// first; tests assert on the transport call order.
pub async fn is_detected_by_antiflood(
    transport: &dyn Transport,
    flood: &FloodTracker,
    bot: &BotProfile,
    group: &Group,
    message: &InboundMessage,
) -> Result<bool> {
    if !flood.is_flood(group, &message.sender, message.is_group_admin) {
        return Ok(false);
    }

    if let Err(e) = transport
        .remove_participant(&group.group_id, &message.sender)
        .await
    {
        warn!("Failed to remove flooding user {}: {}", message.sender, e);
    }

    let text = get_text("moderation.antiflood_kick")
        .replace("{user}", remove_user_suffix(&message.sender))
        .replace("{bot}", &bot.name);
    transport
        .send_text_with_mentions(
            &message.chat_id,
            &text,
            &[message.sender.clone()],
            &message.send_options(),
        )
        .await?;

    Ok(true)
}

/// Run the fixed-order policy checks for one group message.
///
/// Rate limiting and command blocking only apply when the message carries a
/// command; the content detectors run for every message. Returns true when
/// a check fired and consumed the message.
pub async fn screen_group_message(
    transport: &dyn Transport,
    limiter: &CommandRateLimiter,
    flood: &FloodTracker,
    bot: &BotProfile,
    group: &Group,
    message: &InboundMessage,
    command: Option<&str>,
) -> Result<bool> {
    if let Some(command) = command {
        if is_user_limited_by_command_rate(transport, limiter, bot, message).await? {
            return Ok(true);
        }

        if is_command_blocked_globally(transport, bot, message, command).await? {
            return Ok(true);
        }

        if is_command_blocked_in_group(transport, group, bot, message, command).await? {
            return Ok(true);
        }
    }

    if is_detected_by_antilink(transport, bot, group, message).await? {
        return Ok(true);
    }

    if is_detected_by_antiflood(transport, flood, bot, group, message).await? {
        return Ok(true);
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{
        GroupMetadata, MessageKind, MessageRef, ParticipantUpdate, SendOptions, TransportError,
        TransportResult,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Transport double that records the order of calls.
    #[derive(Clone, Default)]
    struct RecordingTransport {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingTransport {
        fn record(&self, name: &str) {
            self.calls.lock().push(name.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send_text(
            &self,
            _chat_id: &str,
            _text: &str,
            _options: &SendOptions,
        ) -> TransportResult<()> {
            self.record("send_text");
            Ok(())
        }

        async fn reply_text(
            &self,
            _chat_id: &str,
            _text: &str,
            _quoted: &MessageRef,
            _options: &SendOptions,
        ) -> TransportResult<()> {
            self.record("reply_text");
            Ok(())
        }

        async fn send_text_with_mentions(
            &self,
            _chat_id: &str,
            _text: &str,
            _mentions: &[String],
            _options: &SendOptions,
        ) -> TransportResult<()> {
            self.record("send_text_with_mentions");
            Ok(())
        }

        async fn reply_with_mentions(
            &self,
            _chat_id: &str,
            _text: &str,
            _mentions: &[String],
            _quoted: &MessageRef,
            _options: &SendOptions,
        ) -> TransportResult<()> {
            self.record("reply_with_mentions");
            Ok(())
        }

        async fn delete_message(
            &self,
            _message: &MessageRef,
            _delete_quoted: bool,
        ) -> TransportResult<()> {
            self.record("delete_message");
            Ok(())
        }

        async fn read_message(&self, _message: &MessageRef) -> TransportResult<()> {
            self.record("read_message");
            Ok(())
        }

        async fn remove_participant(
            &self,
            _group_id: &str,
            user_id: &str,
        ) -> TransportResult<ParticipantUpdate> {
            self.record("remove_participant");
            Ok(ParticipantUpdate {
                user_id: user_id.to_string(),
                status: 200,
            })
        }

        async fn add_participant(
            &self,
            _group_id: &str,
            user_id: &str,
        ) -> TransportResult<ParticipantUpdate> {
            self.record("add_participant");
            Ok(ParticipantUpdate {
                user_id: user_id.to_string(),
                status: 200,
            })
        }

        async fn promote_participant(
            &self,
            _group_id: &str,
            user_id: &str,
        ) -> TransportResult<ParticipantUpdate> {
            self.record("promote_participant");
            Ok(ParticipantUpdate {
                user_id: user_id.to_string(),
                status: 200,
            })
        }

        async fn demote_participant(
            &self,
            _group_id: &str,
            user_id: &str,
        ) -> TransportResult<ParticipantUpdate> {
            self.record("demote_participant");
            Ok(ParticipantUpdate {
                user_id: user_id.to_string(),
                status: 200,
            })
        }

        async fn fetch_group_metadata(&self, group_id: &str) -> TransportResult<GroupMetadata> {
            self.record("fetch_group_metadata");
            Ok(GroupMetadata {
                group_id: group_id.to_string(),
                name: String::new(),
                description: None,
                owner: None,
                participants: vec![],
                admins: vec![],
                restricted: false,
            })
        }

        async fn fetch_joined_groups(&self) -> TransportResult<Vec<GroupMetadata>> {
            self.record("fetch_joined_groups");
            Ok(vec![])
        }

        async fn get_group_invite_link(&self, _group_id: &str) -> TransportResult<String> {
            self.record("get_group_invite_link");
            Ok("https://chat.whatsapp.com/invite".to_string())
        }

        async fn revoke_group_invite(&self, _group_id: &str) -> TransportResult<()> {
            self.record("revoke_group_invite");
            Ok(())
        }

        async fn update_profile_pic(&self, _group_id: &str, _image: &[u8]) -> TransportResult<()> {
            self.record("update_profile_pic");
            Ok(())
        }

        async fn update_group_restriction(
            &self,
            _group_id: &str,
            _restricted: bool,
        ) -> TransportResult<()> {
            self.record("update_group_restriction");
            Ok(())
        }

        async fn download_media(&self, _message: &MessageRef) -> TransportResult<Vec<u8>> {
            self.record("download_media");
            Err(TransportError::new("no media in tests"))
        }

        async fn get_blocked_contacts(&self) -> TransportResult<Vec<String>> {
            self.record("get_blocked_contacts");
            Ok(vec![])
        }
    }

    const BOT_JID: &str = "5511888888888@s.whatsapp.net";
    const SENDER: &str = "5511999999999@s.whatsapp.net";

    fn bot() -> BotProfile {
        let mut b = BotProfile::new("Zelador", "!");
        b.host_number = BOT_JID.to_string();
        b
    }

    fn group() -> Group {
        let mut g = Group::new("123@g.us");
        g.participants = vec![BOT_JID.to_string(), SENDER.to_string()];
        g.admins = vec![BOT_JID.to_string()];
        g
    }

    fn message(body: &str) -> InboundMessage {
        InboundMessage {
            message_id: "ABC".into(),
            chat_id: "123@g.us".into(),
            sender: SENDER.into(),
            pushname: Some("Tester".into()),
            kind: MessageKind::Text,
            body: body.into(),
            mentioned: vec![],
            quoted: None,
            is_group_admin: false,
            is_bot_admin: false,
            expiration: None,
        }
    }

    #[tokio::test]
    async fn test_group_blocked_command_short_circuits_detectors() {
        let transport = RecordingTransport::default();
        let limiter = CommandRateLimiter::new();
        let flood = FloodTracker::new();
        let bot = bot();

        let mut group = group();
        group.block_cmds.push("ban".into());
        group.antilink = true;
        group.antiflood.status = true;
        group.antiflood.max_messages = 1;

        // carries a link and would trip antiflood, but the block wins
        let msg = message("!ban https://spam.example");
        let consumed = screen_group_message(
            &transport, &limiter, &flood, &bot, &group, &msg,
            Some("ban"),
        )
        .await
        .unwrap();

        assert!(consumed);
        assert_eq!(transport.calls(), vec!["reply_text"]);
    }

    #[tokio::test]
    async fn test_group_blocked_command_applies_to_admins_too() {
        let transport = RecordingTransport::default();
        let limiter = CommandRateLimiter::new();
        let flood = FloodTracker::new();
        let bot = bot();

        let mut group = group();
        group.block_cmds.push("ban".into());

        let mut msg = message("!ban");
        msg.is_group_admin = true;

        let consumed = screen_group_message(
            &transport, &limiter, &flood, &bot, &group, &msg,
            Some("ban"),
        )
        .await
        .unwrap();

        assert!(consumed);
        assert_eq!(transport.calls(), vec!["reply_text"]);
    }

    #[tokio::test]
    async fn test_antiflood_kicks_before_replying() {
        let transport = RecordingTransport::default();
        let limiter = CommandRateLimiter::new();
        let flood = FloodTracker::new();
        let bot = bot();

        let mut group = group();
        group.antiflood.status = true;
        group.antiflood.max_messages = 1;

        let msg = message("spam");
        let consumed = screen_group_message(
            &transport, &limiter, &flood, &bot, &group, &msg, None,
        )
        .await
        .unwrap();

        assert!(consumed);
        assert_eq!(
            transport.calls(),
            vec!["remove_participant", "send_text_with_mentions"]
        );
    }

    #[tokio::test]
    async fn test_antilink_mentions_then_deletes() {
        let transport = RecordingTransport::default();
        let limiter = CommandRateLimiter::new();
        let flood = FloodTracker::new();
        let bot = bot();

        let mut group = group();
        group.antilink = true;

        let msg = message("check https://spam.example");
        let consumed = screen_group_message(
            &transport, &limiter, &flood, &bot, &group, &msg, None,
        )
        .await
        .unwrap();

        assert!(consumed);
        assert_eq!(
            transport.calls(),
            vec!["send_text_with_mentions", "delete_message"]
        );
    }

    #[tokio::test]
    async fn test_rate_limit_runs_before_block_checks() {
        let transport = RecordingTransport::default();
        let limiter = CommandRateLimiter::new();
        let flood = FloodTracker::new();

        let mut bot = bot();
        bot.command_rate.status = true;
        bot.command_rate.max_cmds_minute = 0;

        let mut group = group();
        group.block_cmds.push("ban".into());

        let msg = message("!ban");
        let consumed = screen_group_message(
            &transport, &limiter, &flood, &bot, &group, &msg,
            Some("ban"),
        )
        .await
        .unwrap();

        assert!(consumed);
        // one reply from the rate limiter, none from the block registry
        assert_eq!(transport.calls(), vec!["reply_text"]);
    }

    #[tokio::test]
    async fn test_clean_message_is_not_consumed() {
        let transport = RecordingTransport::default();
        let limiter = CommandRateLimiter::new();
        let flood = FloodTracker::new();
        let bot = bot();
        let group = group();

        let msg = message("just chatting");
        let consumed = screen_group_message(
            &transport, &limiter, &flood, &bot, &group, &msg, None,
        )
        .await
        .unwrap();

        assert!(!consumed);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ignore_conditions() {
        let mut bot = bot();
        let mut group = group();
        let mut msg = message("hi");

        assert!(!is_ignored_by_group_muted(&group, &msg));
        group.muted = true;
        assert!(is_ignored_by_group_muted(&group, &msg));
        msg.is_group_admin = true;
        assert!(!is_ignored_by_group_muted(&group, &msg));

        msg.is_group_admin = false;
        bot.admin_mode = true;
        assert!(is_ignored_by_admin_mode(&bot, &msg));
        msg.is_bot_admin = true;
        assert!(!is_ignored_by_admin_mode(&bot, &msg));

        // restricted group where the bot is not an admin
        group.restricted = true;
        group.admins.clear();
        assert!(is_bot_limited_by_group_restricted(&group, &bot));
    }
}
