//! Transport-level message and group types.

use serde::{Deserialize, Serialize};

/// Media type of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Video,
    Sticker,
    Audio,
    Document,
    Other,
}

impl MessageKind {
    /// Activity-counter bucket this kind is tallied under.
    pub fn bucket(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Sticker => "sticker",
            Self::Audio => "audio",
            Self::Document | Self::Other => "other",
        }
    }
}

/// Handle identifying a protocol message for quoting/deleting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: String,
    pub message_id: String,
    pub sender: String,
}

/// Options applied to outgoing messages.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Ephemeral message expiration, seconds.
    pub expiration: Option<u64>,
}

impl SendOptions {
    pub fn expiring(expiration: Option<u64>) -> Self {
        Self { expiration }
    }
}

/// A message quoted by an inbound message.
#[derive(Debug, Clone)]
pub struct QuotedMessage {
    pub message_id: String,
    pub sender: String,
    pub kind: MessageKind,
}

/// Decoded inbound message handed to the engine by the dispatch loop.
///
/// `is_group_admin` / `is_bot_admin` are resolved by the caller against the
/// group metadata and the user store before the engine runs.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub message_id: String,
    pub chat_id: String,
    pub sender: String,
    pub pushname: Option<String>,
    pub kind: MessageKind,
    /// Message text, or the caption for media messages.
    pub body: String,
    pub mentioned: Vec<String>,
    pub quoted: Option<QuotedMessage>,
    pub is_group_admin: bool,
    pub is_bot_admin: bool,
    /// Ephemeral expiration to mirror on replies.
    pub expiration: Option<u64>,
}

impl InboundMessage {
    /// Handle for quoting or deleting this message.
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat_id.clone(),
            message_id: self.message_id.clone(),
            sender: self.sender.clone(),
        }
    }

    /// Handle for the quoted message, if any.
    pub fn quoted_ref(&self) -> Option<MessageRef> {
        self.quoted.as_ref().map(|q| MessageRef {
            chat_id: self.chat_id.clone(),
            message_id: q.message_id.clone(),
            sender: q.sender.clone(),
        })
    }

    /// Send options mirroring this message's expiration.
    pub fn send_options(&self) -> SendOptions {
        SendOptions::expiring(self.expiration)
    }

    /// Command name (without prefix, lowercased) when the body starts with
    /// the prefix.
    pub fn command(&self, prefix: &str) -> Option<String> {
        let first = self.body.split_whitespace().next()?;
        let name = first.strip_prefix(prefix)?;
        if name.is_empty() {
            return None;
        }
        Some(name.to_lowercase())
    }

    /// Whitespace-separated tokens after the command.
    pub fn args(&self) -> Vec<&str> {
        self.body.split_whitespace().skip(1).collect()
    }

    /// Everything after the command token, trimmed.
    pub fn arg_text(&self) -> String {
        let mut parts = self.body.splitn(2, char::is_whitespace);
        parts.next();
        parts.next().unwrap_or("").trim().to_string()
    }
}

/// Group state as reported by the protocol client.
#[derive(Debug, Clone)]
pub struct GroupMetadata {
    pub group_id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub participants: Vec<String>,
    pub admins: Vec<String>,
    /// Whether group-info edits are restricted to admins.
    pub restricted: bool,
}

/// Result of a participant add/remove/promote/demote call.
#[derive(Debug, Clone)]
pub struct ParticipantUpdate {
    pub user_id: String,
    /// Protocol status code; 200 means the change was applied.
    pub status: u16,
}

impl ParticipantUpdate {
    pub fn succeeded(&self) -> bool {
        self.status == 200
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(body: &str) -> InboundMessage {
        InboundMessage {
            message_id: "ABC".into(),
            chat_id: "123@g.us".into(),
            sender: "5511999999999@s.whatsapp.net".into(),
            pushname: None,
            kind: MessageKind::Text,
            body: body.into(),
            mentioned: vec![],
            quoted: None,
            is_group_admin: false,
            is_bot_admin: false,
            expiration: None,
        }
    }

    #[test]
    fn test_command_parsing() {
        let msg = message("!Ban @someone now");
        assert_eq!(msg.command("!").as_deref(), Some("ban"));
        assert_eq!(msg.args(), vec!["@someone", "now"]);
        assert_eq!(msg.arg_text(), "@someone now");
    }

    #[test]
    fn test_bare_prefix_is_not_a_command() {
        assert_eq!(message("!").command("!"), None);
        assert_eq!(message("hello").command("!"), None);
    }

    #[test]
    fn test_bucket_mapping() {
        assert_eq!(MessageKind::Sticker.bucket(), "sticker");
        assert_eq!(MessageKind::Document.bucket(), "other");
    }
}
