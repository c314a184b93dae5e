//! Error types for command handling.
//!
//! Every failure a command can hit is recoverable: the dispatcher turns it
//! into a reply to the originating chat and moves on to the next message.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors raised by command handlers.
///
/// The `Permission`, `Usage` and `State` variants carry the already-rendered
/// reply text; the dispatcher sends it verbatim.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Caller lacks the required role (group admin, bot admin, or the bot
    /// itself must be a group admin).
    #[error("{0}")]
    Permission(String),

    /// Malformed or missing arguments.
    #[error("{0}")]
    Usage(String),

    /// The requested change conflicts with current state (already
    /// blacklisted, empty list, counter disabled, ...).
    #[error("{0}")]
    State(String),

    /// A transport call failed and was re-signaled with a user-facing text.
    #[error("{0}")]
    Collaborator(String),

    /// Raw transport failure with no domain-specific rendering.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Storage or other internal failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CommandError {
    /// Text to reply with, if this error is user-visible.
    ///
    /// Transport/internal failures return `None`; those are logged and
    /// answered with a generic error text instead.
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            Self::Permission(t) | Self::Usage(t) | Self::State(t) | Self::Collaborator(t) => {
                Some(t)
            }
            Self::Transport(_) | Self::Internal(_) => None,
        }
    }
}
