//! Activity ranking commands.
//!
//! `topactive` does not register missing participants, so unregistered
//! members are simply absent from the ranking; `inactive` registers the
//! whole roster first so nobody escapes the threshold query. The asymmetry
//! is intentional and matched by the tests.

use crate::error::CommandError;
use crate::texts::get_text;
use crate::utils::remove_user_suffix;

use super::CommandContext;

fn medal(position: usize) -> &'static str {
    match position {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "",
    }
}

/// Handle the `topactive` command - ranking of the most active members.
pub async fn top_active(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    if !ctx.group.counter.status {
        return Err(CommandError::State(get_text(
            "group.topactive.error_counter_off",
        )));
    }

    let limit: usize = match ctx.message.args().first() {
        Some(arg) => arg
            .parse()
            .map_err(|_| CommandError::Usage(get_text("group.topactive.error_limit")))?,
        None => 10,
    };

    if !(1..=50).contains(&limit) {
        return Err(CommandError::Usage(get_text("group.topactive.error_limit")));
    }

    let ranking = ctx.activity.ranking(ctx.group, limit).await?;

    let mut reply = get_text("group.topactive.title").replace("{limit}", &limit.to_string());
    let mut mentioned = Vec::with_capacity(ranking.len());

    for (i, record) in ranking.iter().enumerate() {
        let position = i + 1;

        reply += &get_text("group.topactive.item")
            .replace("{icon}", medal(position))
            .replace("{position}", &position.to_string())
            .replace("{user}", remove_user_suffix(&record.user_id))
            .replace("{count}", &record.total.to_string());

        mentioned.push(record.user_id.clone());
    }

    ctx.reply_mentioning(&reply, &mentioned).await
}

/// Handle the `activity` command - one member's tallies.
pub async fn activity_report(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    if !ctx.group.counter.status {
        return Err(CommandError::State(get_text(
            "group.activity.error_counter_off",
        )));
    }

    let message = ctx.message;
    let target = if let Some(quoted) = &message.quoted {
        quoted.sender.clone()
    } else if message.mentioned.len() == 1 {
        message.mentioned[0].clone()
    } else {
        return Err(ctx.usage("activity"));
    };

    if !ctx.group.is_participant(&target) {
        return Err(CommandError::State(get_text(
            "group.activity.error_not_member",
        )));
    }

    let record = match ctx.activity.get(&ctx.group.group_id, &target).await? {
        Some(record) => record,
        // present in the group but never counted: register a zeroed record
        None => ctx.activity.register(&ctx.group.group_id, &target).await?,
    };

    let user = ctx.users.get(&target).await?;
    let name = user.and_then(|u| u.name).unwrap_or_else(|| "---".to_string());

    let reply = get_text("group.activity.reply")
        .replace("{name}", &name)
        .replace("{user}", remove_user_suffix(&target))
        .replace("{total}", &record.total.to_string())
        .replace("{text}", &record.text.to_string())
        .replace("{image}", &record.image.to_string())
        .replace("{video}", &record.video.to_string())
        .replace("{sticker}", &record.sticker.to_string())
        .replace("{audio}", &record.audio.to_string())
        .replace("{other}", &record.other.to_string());

    ctx.reply(&reply).await
}

/// Handle the `inactive` command - members below a message threshold.
pub async fn inactive(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    if !ctx.group.counter.status {
        return Err(CommandError::State(get_text(
            "group.inactive.error_counter_off",
        )));
    }

    let args = ctx.message.args();
    if args.is_empty() {
        return Err(ctx.usage("inactive"));
    }

    let threshold: i64 = args[0]
        .parse()
        .map_err(|_| CommandError::Usage(get_text("group.inactive.error_value")))?;

    if threshold < 1 {
        return Err(CommandError::Usage(get_text("group.inactive.error_value")));
    }

    // register everyone first so members without a record count as zero
    ctx.activity
        .register_all(&ctx.group.group_id, &ctx.group.participants)
        .await?;

    let inactive = ctx.activity.lower_than(ctx.group, threshold).await?;

    if inactive.is_empty() {
        return Err(CommandError::State(get_text("group.inactive.error_none")));
    }

    let mut reply = get_text("group.inactive.title")
        .replace("{count}", &inactive.len().to_string())
        .replace("{threshold}", &threshold.to_string());
    let mut mentioned = Vec::with_capacity(inactive.len());

    for record in &inactive {
        reply += &get_text("group.inactive.item")
            .replace("{user}", remove_user_suffix(&record.user_id))
            .replace("{count}", &record.total.to_string());

        mentioned.push(record.user_id.clone());
    }

    ctx.reply_mentioning(&reply, &mentioned).await
}
