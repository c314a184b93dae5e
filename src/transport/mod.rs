//! Capability interface to the WhatsApp protocol client.
//!
//! The engine never talks to the wire directly: the embedding application
//! implements [`Transport`] on top of its protocol client and hands the
//! engine a handle. Every operation here maps to a single protocol call;
//! framing, retries and media codecs belong to the implementor.

mod types;

pub use types::{
    GroupMetadata, InboundMessage, MessageKind, MessageRef, ParticipantUpdate, QuotedMessage,
    SendOptions,
};

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by the protocol client.
#[derive(Debug, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Narrow capability interface consumed by the moderation core.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a plain text message to a chat.
    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        options: &SendOptions,
    ) -> TransportResult<()>;

    /// Send a text message quoting another message.
    async fn reply_text(
        &self,
        chat_id: &str,
        text: &str,
        quoted: &MessageRef,
        options: &SendOptions,
    ) -> TransportResult<()>;

    /// Send a text message mentioning the listed users.
    async fn send_text_with_mentions(
        &self,
        chat_id: &str,
        text: &str,
        mentions: &[String],
        options: &SendOptions,
    ) -> TransportResult<()>;

    /// Send a text message with mentions, quoting another message.
    async fn reply_with_mentions(
        &self,
        chat_id: &str,
        text: &str,
        mentions: &[String],
        quoted: &MessageRef,
        options: &SendOptions,
    ) -> TransportResult<()>;

    /// Delete a message for everyone. When `delete_quoted` is set, the
    /// message quoted by `message` is deleted instead of `message` itself.
    async fn delete_message(&self, message: &MessageRef, delete_quoted: bool)
        -> TransportResult<()>;

    /// Mark a message as read.
    async fn read_message(&self, message: &MessageRef) -> TransportResult<()>;

    /// Remove a participant from a group.
    async fn remove_participant(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> TransportResult<ParticipantUpdate>;

    /// Add a participant to a group.
    async fn add_participant(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> TransportResult<ParticipantUpdate>;

    /// Promote a participant to group admin.
    async fn promote_participant(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> TransportResult<ParticipantUpdate>;

    /// Demote a group admin to plain participant.
    async fn demote_participant(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> TransportResult<ParticipantUpdate>;

    /// Fetch current metadata for one group.
    async fn fetch_group_metadata(&self, group_id: &str) -> TransportResult<GroupMetadata>;

    /// Fetch metadata for every group the bot participates in.
    async fn fetch_joined_groups(&self) -> TransportResult<Vec<GroupMetadata>>;

    /// Get the group invite link.
    async fn get_group_invite_link(&self, group_id: &str) -> TransportResult<String>;

    /// Revoke the current group invite link.
    async fn revoke_group_invite(&self, group_id: &str) -> TransportResult<()>;

    /// Update the group profile picture.
    async fn update_profile_pic(&self, group_id: &str, image: &[u8]) -> TransportResult<()>;

    /// Restrict group-info edits to admins (or lift the restriction).
    async fn update_group_restriction(
        &self,
        group_id: &str,
        restricted: bool,
    ) -> TransportResult<()>;

    /// Download the media payload of a message.
    async fn download_media(&self, message: &MessageRef) -> TransportResult<Vec<u8>>;

    /// Contacts the bot account has blocked.
    async fn get_blocked_contacts(&self) -> TransportResult<Vec<String>>;
}
