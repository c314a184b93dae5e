//! Member management commands.
//!
//! Blacklist, ban/add, promote/demote and the mention helpers. Multi-target
//! commands classify every target independently and reply with one line per
//! outcome.

use crate::error::CommandError;
use crate::texts::get_text;
use crate::utils::{add_user_suffix, remove_user_suffix};

use super::CommandContext;

/// Targets for ban-like commands: quoted sender first, then mentions.
fn targets_quoted_then_mentions(ctx: &CommandContext<'_>) -> Vec<String> {
    let message = ctx.message;

    if message.mentioned.is_empty() {
        if let Some(quoted) = &message.quoted {
            return vec![quoted.sender.clone()];
        }
    }

    message.mentioned.clone()
}

/// Targets for promote/demote: mentions first, then the quoted sender.
fn targets_mentions_then_quoted(ctx: &CommandContext<'_>) -> Vec<String> {
    let message = ctx.message;

    if !message.mentioned.is_empty() {
        return message.mentioned.clone();
    }

    if let Some(quoted) = &message.quoted {
        return vec![quoted.sender.clone()];
    }

    Vec::new()
}

/// Handle the `blacklist` command - ban a number from rejoining.
pub async fn blacklist_add(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    let message = ctx.message;

    let target = if let Some(quoted) = &message.quoted {
        quoted.sender.clone()
    } else if let Some(first) = message.mentioned.first() {
        first.clone()
    } else if !message.args().is_empty() {
        add_user_suffix(&message.arg_text())
    } else {
        return Err(ctx.usage("blacklist"));
    };

    if target == ctx.bot.host_number {
        return Err(CommandError::State(get_text("group.blacklist.error_add_bot")));
    }
    if ctx.group.is_admin(&target) {
        return Err(CommandError::State(get_text(
            "group.blacklist.error_add_admin",
        )));
    }
    if ctx.group.is_blacklisted(&target) {
        return Err(CommandError::State(get_text(
            "group.blacklist.error_already_listed",
        )));
    }

    ctx.groups
        .add_to_blacklist(&ctx.group.group_id, &target)
        .await?;
    ctx.reply(&get_text("group.blacklist.added")).await?;

    // kick the target if currently present
    if ctx.group.is_participant(&target) {
        ctx.transport
            .remove_participant(&ctx.group.group_id, &target)
            .await?;
    }

    Ok(())
}

/// Handle the `unblacklist` command. Accepts a number, or a 1-based index
/// into the `blacklisted` listing.
pub async fn blacklist_remove(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    let args = ctx.message.args();
    if args.is_empty() {
        return Err(ctx.usage("unblacklist"));
    }

    let target = if args.len() == 1 && args[0].len() <= 3 {
        let index: usize = args[0]
            .parse()
            .map_err(|_| ctx.usage("unblacklist"))?;
        index
            .checked_sub(1)
            .and_then(|i| ctx.group.blacklist.get(i))
            .cloned()
            .ok_or_else(|| CommandError::State(get_text("group.blacklist.error_not_listed")))?
    } else {
        add_user_suffix(&ctx.message.arg_text())
    };

    if !ctx.group.is_blacklisted(&target) {
        return Err(CommandError::State(get_text(
            "group.blacklist.error_not_listed",
        )));
    }

    ctx.groups
        .remove_from_blacklist(&ctx.group.group_id, &target)
        .await?;
    ctx.reply(&get_text("group.blacklist.removed")).await
}

/// Handle the `blacklisted` command - list blacklisted numbers.
pub async fn blacklist_list(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    if ctx.group.blacklist.is_empty() {
        return Err(CommandError::State(get_text("group.blacklist.error_empty")));
    }

    let mut reply = get_text("group.blacklist.list_title")
        .replace("{count}", &ctx.group.blacklist.len().to_string());

    for (position, user_id) in ctx.group.blacklist.iter().enumerate() {
        let user = ctx.users.get(user_id).await?;
        let name = user.and_then(|u| u.name).unwrap_or_else(|| "---".to_string());

        reply += &get_text("group.blacklist.list_item")
            .replace("{position}", &(position + 1).to_string())
            .replace("{name}", &name)
            .replace("{user}", remove_user_suffix(user_id));
    }

    ctx.reply(&reply).await
}

/// Handle the `add` command - add a number to the group.
pub async fn add_participant(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    if ctx.message.args().is_empty() {
        return Err(ctx.usage("add"));
    }

    let user_id = add_user_suffix(&ctx.message.arg_text());
    let number = remove_user_suffix(&user_id);

    if number.parse::<u64>().is_err() {
        return Err(CommandError::Usage(get_text("group.add.error_input")));
    }

    let response = ctx
        .transport
        .add_participant(&ctx.group.group_id, &user_id)
        .await
        .map_err(|_| {
            CommandError::Collaborator(
                get_text("group.add.error_invalid_number").replace("{user}", number),
            )
        })?;

    if !response.succeeded() {
        return Err(CommandError::Collaborator(
            get_text("group.add.error_add_failed").replace("{user}", number),
        ));
    }

    ctx.reply(&get_text("group.add.reply").replace("{user}", number))
        .await
}

/// Handle the `ban` command - remove the quoted or mentioned users.
pub async fn ban(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    let targets = targets_quoted_then_mentions(ctx);
    if targets.is_empty() {
        return Err(ctx.usage("ban"));
    }

    let mut reply = get_text("group.ban.title");

    for user_id in &targets {
        let number = remove_user_suffix(user_id);

        if !ctx.group.is_participant(user_id) {
            reply += &get_text("group.ban.item_not_found").replace("{user}", number);
        } else if ctx.group.is_admin(user_id) {
            reply += &get_text("group.ban.item_admin").replace("{user}", number);
        } else {
            ctx.transport
                .remove_participant(&ctx.group.group_id, user_id)
                .await?;
            reply += &get_text("group.ban.item_success").replace("{user}", number);
        }
    }

    ctx.reply_mentioning(&reply, &targets).await
}

/// Handle the `promote` command.
pub async fn promote(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    let targets = targets_mentions_then_quoted(ctx);
    if targets.is_empty() {
        return Err(ctx.usage("promote"));
    }

    let mut reply = get_text("group.promote.title");

    for user_id in &targets {
        let number = remove_user_suffix(user_id);

        if ctx.group.is_admin(user_id) {
            reply += &get_text("group.promote.item_error").replace("{user}", number);
        } else {
            ctx.transport
                .promote_participant(&ctx.group.group_id, user_id)
                .await?;
            reply += &get_text("group.promote.item_success").replace("{user}", number);
        }
    }

    ctx.reply_mentioning(&reply, &targets).await
}

/// Handle the `demote` command. The owner and the bot itself are protected.
pub async fn demote(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    let targets = targets_mentions_then_quoted(ctx);
    if targets.is_empty() {
        return Err(ctx.usage("demote"));
    }

    let mut reply = get_text("group.demote.title");

    for user_id in &targets {
        let number = remove_user_suffix(user_id);
        let is_protected =
            *user_id == ctx.bot.host_number || Some(user_id) == ctx.group.owner.as_ref();

        if is_protected {
            reply += &get_text("group.demote.item_error_protected").replace("{user}", number);
        } else if ctx.group.is_admin(user_id) {
            ctx.transport
                .demote_participant(&ctx.group.group_id, user_id)
                .await?;
            reply += &get_text("group.demote.item_success").replace("{user}", number);
        } else {
            reply += &get_text("group.demote.item_error_member").replace("{user}", number);
        }
    }

    ctx.reply_mentioning(&reply, &targets).await
}

/// Handle the `everyone` command - mention all participants.
pub async fn mention_everyone(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    let count = ctx.group.participants.len().to_string();
    let extra = ctx.message.arg_text();

    let reply = if extra.is_empty() {
        get_text("group.mention.all").replace("{count}", &count)
    } else {
        get_text("group.mention.all_message")
            .replace("{count}", &count)
            .replace("{message}", &extra)
    };

    ctx.reply_mentioning(&reply, &ctx.group.participants).await
}

/// Handle the `members` command - mention non-admin participants.
pub async fn mention_members(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    let members: Vec<String> = ctx
        .group
        .participants
        .iter()
        .filter(|p| !ctx.group.is_admin(p))
        .cloned()
        .collect();

    if members.is_empty() {
        return Err(CommandError::State(get_text("group.mention.error_no_members")));
    }

    let count = members.len().to_string();
    let extra = ctx.message.arg_text();

    let reply = if extra.is_empty() {
        get_text("group.mention.members").replace("{count}", &count)
    } else {
        get_text("group.mention.members_message")
            .replace("{count}", &count)
            .replace("{message}", &extra)
    };

    ctx.reply_mentioning(&reply, &members).await
}

/// Handle the `admins` command - mention the group admins. Open to every
/// participant.
pub async fn mention_admins(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    let count = ctx.group.admins.len().to_string();
    let extra = ctx.message.arg_text();

    let reply = if extra.is_empty() {
        get_text("group.mention.admins").replace("{count}", &count)
    } else {
        get_text("group.mention.admins_message")
            .replace("{count}", &count)
            .replace("{message}", &extra)
    };

    ctx.reply_mentioning(&reply, &ctx.group.admins).await
}

/// Handle the `owner` command.
pub async fn owner_info(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    let owner = ctx
        .group
        .owner
        .as_ref()
        .ok_or_else(|| CommandError::State(get_text("group.owner.error_unknown")))?;

    ctx.reply(&get_text("group.owner.reply").replace("{user}", remove_user_suffix(owner)))
        .await
}

/// Handle the `delete` command - delete the quoted message.
pub async fn delete_quoted(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;
    ctx.require_bot_group_admin()?;

    if ctx.message.quoted.is_none() {
        return Err(ctx.usage("delete"));
    }

    ctx.transport
        .delete_message(&ctx.message.message_ref(), true)
        .await?;

    Ok(())
}
