//! Group settings commands.
//!
//! Info summary plus the per-group feature toggles.

use chrono::Utc;
use tracing::info;

use crate::error::CommandError;
use crate::texts::get_text;
use crate::transport::MessageKind;
use crate::utils::format_datetime;

use super::CommandContext;

/// Handle the `group` command - group summary, with the resource section
/// for admins.
pub async fn group_info(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    let group = ctx.group;

    let mut reply = get_text("group.info.title")
        .replace("{name}", &group.name)
        .replace("{participants}", &group.participants.len().to_string())
        .replace("{admins}", &group.admins.len().to_string())
        .replace("{description}", group.description.as_deref().unwrap_or("---"))
        .replace("{executed}", &group.executed_cmds.to_string());

    if ctx.message.is_group_admin {
        reply += &get_text("group.info.resources_title");

        reply += &get_text(if group.welcome.status {
            "group.info.welcome_on"
        } else {
            "group.info.welcome_off"
        });
        reply += &get_text(if group.muted {
            "group.info.mute_on"
        } else {
            "group.info.mute_off"
        });
        reply += &get_text(if group.autosticker {
            "group.info.autosticker_on"
        } else {
            "group.info.autosticker_off"
        });
        reply += &get_text(if group.antilink {
            "group.info.antilink_on"
        } else {
            "group.info.antilink_off"
        });

        reply += &if group.antifake.status {
            get_text("group.info.antifake_on").replace("{allowed}", &group.antifake.allowed.join(", "))
        } else {
            get_text("group.info.antifake_off")
        };

        reply += &if group.antiflood.status {
            get_text("group.info.antiflood_on")
                .replace("{max}", &group.antiflood.max_messages.to_string())
                .replace("{interval}", &group.antiflood.interval_seconds.to_string())
        } else {
            get_text("group.info.antiflood_off")
        };

        reply += &match (group.counter.status, &group.counter.started) {
            (true, Some(started)) => {
                get_text("group.info.counter_on").replace("{started}", &format_datetime(started))
            }
            (true, None) => get_text("group.info.counter_on").replace("{started}", "---"),
            _ => get_text("group.info.counter_off"),
        };

        reply += &if group.block_cmds.is_empty() {
            get_text("group.info.blockcmds_off")
        } else {
            let prefixed: Vec<String> = group
                .block_cmds
                .iter()
                .map(|c| format!("{}{}", ctx.bot.prefix, c))
                .collect();
            get_text("group.info.blockcmds_on").replace("{cmds}", &prefixed.join(", "))
        };

        reply += &get_text("group.info.blacklist")
            .replace("{count}", &group.blacklist.len().to_string());
    }

    ctx.reply(&reply).await
}

/// Handle the `photo` command - set the group picture from the sent or
/// quoted image.
pub async fn set_group_photo(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    let media_ref = if ctx.message.kind == MessageKind::Image {
        Some(ctx.message.message_ref())
    } else if ctx
        .message
        .quoted
        .as_ref()
        .is_some_and(|q| q.kind == MessageKind::Image)
    {
        ctx.message.quoted_ref()
    } else {
        None
    };

    let Some(media_ref) = media_ref else {
        return Err(CommandError::Usage(get_text("group.photo.error_not_image")));
    };

    let image = ctx.transport.download_media(&media_ref).await?;
    ctx.transport
        .update_profile_pic(&ctx.group.group_id, &image)
        .await?;

    ctx.reply(&get_text("group.photo.reply")).await
}

/// Handle the `mute` command - toggle admin-only commands.
pub async fn toggle_mute(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    let reply = get_text(if ctx.group.muted {
        "group.mute.off"
    } else {
        "group.mute.on"
    });

    let mut group = ctx.group.clone();
    group.muted = !group.muted;
    ctx.groups.save(&group).await?;

    ctx.reply(&reply).await
}

/// Handle the `link` command - fetch the invite link.
pub async fn invite_link(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    let link = ctx
        .transport
        .get_group_invite_link(&ctx.group.group_id)
        .await?;

    let reply = get_text("group.link.reply")
        .replace("{name}", &ctx.group.name)
        .replace("{link}", &link);
    ctx.reply(&reply).await
}

/// Handle the `revokelink` command.
pub async fn revoke_invite_link(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    ctx.transport
        .revoke_group_invite(&ctx.group.group_id)
        .await
        .map_err(|_| CommandError::Collaborator(get_text("group.link.error_revoke")))?;

    ctx.reply(&get_text("group.link.revoked")).await
}

/// Handle the `restrict` command - toggle admin-only group-info edits.
pub async fn toggle_restriction(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    ctx.transport
        .update_group_restriction(&ctx.group.group_id, !ctx.group.restricted)
        .await?;

    let reply = get_text(if ctx.group.restricted {
        "group.restrict.off"
    } else {
        "group.restrict.on"
    });

    let mut group = ctx.group.clone();
    group.restricted = !group.restricted;
    ctx.groups.save(&group).await?;

    ctx.reply(&reply).await
}

/// Handle the `antilink` command.
pub async fn toggle_antilink(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    let reply = get_text(if ctx.group.antilink {
        "group.antilink.off"
    } else {
        "group.antilink.on"
    });

    let mut group = ctx.group.clone();
    group.antilink = !group.antilink;
    ctx.groups.save(&group).await?;
    info!("Antilink {} in {}", group.antilink, group.group_id);

    ctx.reply(&reply).await
}

/// Handle the `autosticker` command.
pub async fn toggle_autosticker(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    let reply = get_text(if ctx.group.autosticker {
        "group.autosticker.off"
    } else {
        "group.autosticker.on"
    });

    let mut group = ctx.group.clone();
    group.autosticker = !group.autosticker;
    ctx.groups.save(&group).await?;

    ctx.reply(&reply).await
}

/// Handle the `welcome` command. Arguments become the custom welcome text.
pub async fn toggle_welcome(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    let reply = get_text(if ctx.group.welcome.status {
        "group.welcome.off"
    } else {
        "group.welcome.on"
    });

    let custom = ctx.message.arg_text();

    let mut group = ctx.group.clone();
    group.welcome.status = !group.welcome.status;
    group.welcome.text = if custom.is_empty() { None } else { Some(custom) };
    ctx.groups.save(&group).await?;

    ctx.reply(&reply).await
}

/// Handle the `antifake` command. Arguments are allowed country codes,
/// defaulting to Brazil.
pub async fn toggle_antifake(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    let allowed: Vec<String> = if ctx.message.args().is_empty() {
        vec!["55".to_string()]
    } else {
        ctx.message.args().iter().map(|a| a.to_string()).collect()
    };

    let reply = if ctx.group.antifake.status {
        get_text("group.antifake.off")
    } else {
        get_text("group.antifake.on").replace("{allowed}", &allowed.join(", "))
    };

    let mut group = ctx.group.clone();
    group.antifake.status = !group.antifake.status;
    group.antifake.allowed = allowed;
    ctx.groups.save(&group).await?;
    info!("Antifake {} in {}", group.antifake.status, group.group_id);

    ctx.reply(&reply).await
}

/// Handle the `antiflood` command. Optional arguments: max messages and
/// interval seconds.
pub async fn toggle_antiflood(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    let args = ctx.message.args();
    let (max_arg, interval_arg) = match args.as_slice() {
        [] => ("10", "10"),
        [max] => (*max, "10"),
        [max, interval, ..] => (*max, *interval),
    };

    let interval: u32 = match interval_arg.parse() {
        Ok(n) if (10..=60).contains(&n) => n,
        _ => return Err(CommandError::Usage(get_text("group.antiflood.error_interval"))),
    };

    let max_messages: u32 = match max_arg.parse() {
        Ok(n) if (5..=20).contains(&n) => n,
        _ => return Err(CommandError::Usage(get_text("group.antiflood.error_max"))),
    };

    let reply = if ctx.group.antiflood.status {
        get_text("group.antiflood.off")
    } else {
        get_text("group.antiflood.on")
            .replace("{max}", &max_messages.to_string())
            .replace("{interval}", &interval.to_string())
    };

    let mut group = ctx.group.clone();
    group.antiflood.status = !group.antiflood.status;
    group.antiflood.max_messages = max_messages;
    group.antiflood.interval_seconds = interval;
    ctx.groups.save(&group).await?;
    info!("Antiflood {} in {}", group.antiflood.status, group.group_id);

    ctx.reply(&reply).await
}

/// Handle the `counter` command - toggle activity counting.
///
/// Enabling registers every current participant so threshold queries see
/// the full roster; existing tallies are never reset by a toggle.
pub async fn toggle_counter(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    if !ctx.group.counter.status {
        ctx.activity
            .register_all(&ctx.group.group_id, &ctx.group.participants)
            .await?;
    }

    let reply = get_text(if ctx.group.counter.status {
        "group.counter.off"
    } else {
        "group.counter.on"
    });

    let mut group = ctx.group.clone();
    group.counter.status = !group.counter.status;
    if group.counter.status {
        group.counter.started = Some(Utc::now());
    }
    ctx.groups.save(&group).await?;

    ctx.reply(&reply).await
}
