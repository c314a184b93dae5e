//! Antilink detection.
//!
//! Stateless pattern match over message text/captions. Enforcement (delete
//! + remove) is the orchestrator's job.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::database::{BotProfile, Group};
use crate::transport::InboundMessage;

/// Generic hyperlinks plus group-invite links.
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(https?://\S+|www\.[\w-]+\.\S+|chat\.whatsapp\.com/\S+)").unwrap()
});

/// Whether the text contains a link or invite URL.
pub fn contains_link(text: &str) -> bool {
    LINK_RE.is_match(text)
}

/// Antilink check for an inbound group message.
///
/// Always false when the feature is off, the sender is a group admin, or
/// the bot itself is not a group admin (it could not enforce the removal).
pub fn is_message_with_link(message: &InboundMessage, group: &Group, bot: &BotProfile) -> bool {
    if !group.antilink {
        return false;
    }

    if message.is_group_admin {
        return false;
    }

    if !group.is_admin(&bot.host_number) {
        return false;
    }

    contains_link(&message.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MessageKind;

    fn bot() -> BotProfile {
        let mut b = BotProfile::new("Zelador", "!");
        b.host_number = "5511888888888@s.whatsapp.net".to_string();
        b
    }

    fn group_with_antilink() -> Group {
        let mut g = Group::new("123@g.us");
        g.antilink = true;
        g.participants = vec!["5511888888888@s.whatsapp.net".into()];
        g.admins = vec!["5511888888888@s.whatsapp.net".into()];
        g
    }

    fn message(body: &str, is_group_admin: bool) -> InboundMessage {
        InboundMessage {
            message_id: "ABC".into(),
            chat_id: "123@g.us".into(),
            sender: "5511999999999@s.whatsapp.net".into(),
            pushname: None,
            kind: MessageKind::Text,
            body: body.into(),
            mentioned: vec![],
            quoted: None,
            is_group_admin,
            is_bot_admin: false,
            expiration: None,
        }
    }

    #[test]
    fn test_detects_plain_and_invite_links() {
        assert!(contains_link("look https://example.com/x"));
        assert!(contains_link("join chat.whatsapp.com/AbCdEf123"));
        assert!(contains_link("WWW.EXAMPLE.com/promo"));
        assert!(!contains_link("no links here, just 10.5 reais"));
    }

    #[test]
    fn test_disabled_or_admin_is_exempt() {
        let bot = bot();
        let mut group = group_with_antilink();

        assert!(is_message_with_link(
            &message("https://spam.example", false),
            &group,
            &bot
        ));
        assert!(!is_message_with_link(
            &message("https://spam.example", true),
            &group,
            &bot
        ));

        group.antilink = false;
        assert!(!is_message_with_link(
            &message("https://spam.example", false),
            &group,
            &bot
        ));
    }

    #[test]
    fn test_no_detection_when_bot_cannot_enforce() {
        let bot = bot();
        let mut group = group_with_antilink();
        group.admins.clear();

        assert!(!is_message_with_link(
            &message("https://spam.example", false),
            &group,
            &bot
        ));
    }
}
