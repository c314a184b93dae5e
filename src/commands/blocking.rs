//! Command blocking - per-group and global registries.
//!
//! Every requested name is classified independently against the catalog
//! and the current block list; the reply enumerates one outcome per name
//! and never stops at the first invalid one.

use crate::error::CommandError;
use crate::texts::get_text;

use super::{CATALOG, CommandContext, PROTECTED};

/// Per-name outcome of a block/unblock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    Blocked,
    AlreadyBlocked,
    Unblocked,
    NotBlocked,
    Protected,
    Unknown,
}

/// Normalize a requested name: optional prefix stripped, lowercased.
fn normalize(name: &str, prefix: &str) -> String {
    name.strip_prefix(prefix).unwrap_or(name).to_lowercase()
}

/// Classify names for a block request.
pub fn classify_block(
    names: &[String],
    blocked: &[String],
    prefix: &str,
) -> Vec<(String, BlockOutcome)> {
    names
        .iter()
        .map(|raw| {
            let name = normalize(raw, prefix);
            let outcome = if !CATALOG.contains(&name.as_str()) {
                BlockOutcome::Unknown
            } else if PROTECTED.contains(&name.as_str()) {
                BlockOutcome::Protected
            } else if blocked.iter().any(|b| b == &name) {
                BlockOutcome::AlreadyBlocked
            } else {
                BlockOutcome::Blocked
            };
            (name, outcome)
        })
        .collect()
}

/// Classify names for an unblock request.
pub fn classify_unblock(
    names: &[String],
    blocked: &[String],
    prefix: &str,
) -> Vec<(String, BlockOutcome)> {
    names
        .iter()
        .map(|raw| {
            let name = normalize(raw, prefix);
            let outcome = if !CATALOG.contains(&name.as_str()) {
                BlockOutcome::Unknown
            } else if blocked.iter().any(|b| b == &name) {
                BlockOutcome::Unblocked
            } else {
                BlockOutcome::NotBlocked
            };
            (name, outcome)
        })
        .collect()
}

/// Render the per-name summary under a title key.
fn render_summary(
    scope: &str,
    title_key: &str,
    outcomes: &[(String, BlockOutcome)],
    prefix: &str,
) -> String {
    let mut reply = get_text(title_key);

    for (name, outcome) in outcomes {
        let item_key = match outcome {
            BlockOutcome::Blocked => "item_blocked",
            BlockOutcome::AlreadyBlocked => "item_already_blocked",
            BlockOutcome::Unblocked => "item_unblocked",
            BlockOutcome::NotBlocked => "item_not_blocked",
            BlockOutcome::Protected => "item_protected",
            BlockOutcome::Unknown => "item_not_found",
        };

        reply += &get_text(&format!("{}.{}", scope, item_key))
            .replace("{command}", &format!("{}{}", prefix, name));
    }

    reply
}

fn requested_names(ctx: &CommandContext<'_>, command: &str) -> Result<Vec<String>, CommandError> {
    let names: Vec<String> = ctx.message.args().iter().map(|a| a.to_string()).collect();
    if names.is_empty() {
        return Err(ctx.usage(command));
    }
    Ok(names)
}

/// Handle the `bcmd` command - disable commands in this group.
pub async fn block_group_commands(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    let names = requested_names(ctx, "bcmd")?;
    let outcomes = classify_block(&names, &ctx.group.block_cmds, &ctx.bot.prefix);

    let to_block: Vec<String> = outcomes
        .iter()
        .filter(|(_, o)| *o == BlockOutcome::Blocked)
        .map(|(name, _)| name.clone())
        .collect();

    ctx.groups
        .block_commands(&ctx.group.group_id, &to_block)
        .await?;

    let reply = render_summary("group.block", "group.block.title", &outcomes, &ctx.bot.prefix);
    ctx.reply(&reply).await
}

/// Handle the `dcmd` command - re-enable commands in this group.
pub async fn unblock_group_commands(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_group_admin()?;

    let names = requested_names(ctx, "dcmd")?;
    let outcomes = classify_unblock(&names, &ctx.group.block_cmds, &ctx.bot.prefix);

    let to_unblock: Vec<String> = outcomes
        .iter()
        .filter(|(_, o)| *o == BlockOutcome::Unblocked)
        .map(|(name, _)| name.clone())
        .collect();

    ctx.groups
        .unblock_commands(&ctx.group.group_id, &to_unblock)
        .await?;

    let reply = render_summary(
        "group.unblock",
        "group.unblock.title",
        &outcomes,
        &ctx.bot.prefix,
    );
    ctx.reply(&reply).await
}

/// Handle the `gbcmd` command - disable commands everywhere.
pub async fn block_global_commands(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_bot_admin()?;

    let names = requested_names(ctx, "gbcmd")?;
    let outcomes = classify_block(&names, &ctx.bot.block_cmds, &ctx.bot.prefix);

    let to_block: Vec<String> = outcomes
        .iter()
        .filter(|(_, o)| *o == BlockOutcome::Blocked)
        .map(|(name, _)| name.clone())
        .collect();

    ctx.bots.block_commands(&to_block).await?;

    let reply = render_summary("bot.block", "bot.block.title", &outcomes, &ctx.bot.prefix);
    ctx.reply(&reply).await
}

/// Handle the `gdcmd` command - re-enable commands everywhere.
pub async fn unblock_global_commands(ctx: &CommandContext<'_>) -> Result<(), CommandError> {
    ctx.require_bot_admin()?;

    let names = requested_names(ctx, "gdcmd")?;
    let outcomes = classify_unblock(&names, &ctx.bot.block_cmds, &ctx.bot.prefix);

    let to_unblock: Vec<String> = outcomes
        .iter()
        .filter(|(_, o)| *o == BlockOutcome::Unblocked)
        .map(|(name, _)| name.clone())
        .collect();

    ctx.bots.unblock_commands(&to_unblock).await?;

    let reply = render_summary("bot.unblock", "bot.unblock.title", &outcomes, &ctx.bot.prefix);
    ctx.reply(&reply).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_block_handles_every_name_independently() {
        let outcomes = classify_block(
            &names(&["!ban", "mute", "ban", "nosuchcmd", "bcmd"]),
            &names(&["mute"]),
            "!",
        );

        assert_eq!(
            outcomes,
            vec![
                ("ban".to_string(), BlockOutcome::Blocked),
                ("mute".to_string(), BlockOutcome::AlreadyBlocked),
                ("ban".to_string(), BlockOutcome::Blocked),
                ("nosuchcmd".to_string(), BlockOutcome::Unknown),
                ("bcmd".to_string(), BlockOutcome::Protected),
            ]
        );
    }

    #[test]
    fn test_classify_does_not_stop_at_invalid_names() {
        // invalid first, valid afterwards: the valid one is still classified
        let outcomes = classify_block(&names(&["bogus", "ban"]), &[], "!");

        assert_eq!(outcomes[0].1, BlockOutcome::Unknown);
        assert_eq!(outcomes[1].1, BlockOutcome::Blocked);
    }

    #[test]
    fn test_classify_unblock() {
        let outcomes = classify_unblock(
            &names(&["ban", "mute", "bogus"]),
            &names(&["ban"]),
            "!",
        );

        assert_eq!(
            outcomes,
            vec![
                ("ban".to_string(), BlockOutcome::Unblocked),
                ("mute".to_string(), BlockOutcome::NotBlocked),
                ("bogus".to_string(), BlockOutcome::Unknown),
            ]
        );
    }

    #[test]
    fn test_render_summary_enumerates_all_outcomes() {
        let outcomes = classify_block(&names(&["ban", "bogus"]), &[], "!");
        let reply = render_summary("group.block", "group.block.title", &outcomes, "!");

        assert!(reply.contains("!ban"));
        assert!(reply.contains("!bogus"));
    }
}
