//! Group membership events.
//!
//! Joins run through blacklist and antifake enforcement before the member
//! is recorded and welcomed; leaves just update the stored roster.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::database::{BotProfile, Group, GroupRepo};
use crate::moderation::fake::is_fake_number;
use crate::texts::get_text;
use crate::transport::{SendOptions, Transport};
use crate::utils::remove_user_suffix;

/// Handle a user joining a group.
pub async fn handle_group_join(
    transport: &dyn Transport,
    groups: &GroupRepo,
    bot: &BotProfile,
    group: &Group,
    user_id: &str,
) -> Result<()> {
    let can_enforce = group.is_admin(&bot.host_number);

    // blacklisted numbers are removed quietly
    if group.is_blacklisted(user_id) {
        if can_enforce {
            if let Err(e) = transport.remove_participant(&group.group_id, user_id).await {
                warn!("Failed to remove blacklisted {}: {}", user_id, e);
            } else {
                info!("Removed blacklisted {} from {}", user_id, group.group_id);
            }
        }
        return Ok(());
    }

    if is_fake_number(user_id, group) && can_enforce {
        if let Err(e) = transport.remove_participant(&group.group_id, user_id).await {
            warn!("Failed to remove fake number {}: {}", user_id, e);
            return Ok(());
        }

        let text =
            get_text("event.antifake_kick").replace("{user}", remove_user_suffix(user_id));
        transport
            .send_text_with_mentions(
                &group.group_id,
                &text,
                &[user_id.to_string()],
                &SendOptions::default(),
            )
            .await?;

        return Ok(());
    }

    groups.add_participant(&group.group_id, user_id).await?;
    debug!("{} joined {}", user_id, group.group_id);

    if group.welcome.status {
        let mut text = get_text("event.welcome")
            .replace("{user}", remove_user_suffix(user_id))
            .replace("{group}", &group.name);

        if let Some(custom) = &group.welcome.text {
            text.push_str("\n\n");
            text.push_str(custom);
        }

        transport
            .send_text_with_mentions(
                &group.group_id,
                &text,
                &[user_id.to_string()],
                &SendOptions::default(),
            )
            .await?;
    }

    Ok(())
}

/// Handle a user leaving a group.
pub async fn handle_group_leave(
    groups: &GroupRepo,
    group: &Group,
    user_id: &str,
) -> Result<()> {
    groups.remove_participant(&group.group_id, user_id).await?;
    debug!("{} left {}", user_id, group.group_id);
    Ok(())
}
