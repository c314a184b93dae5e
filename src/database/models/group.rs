//! Group document and nested feature configs.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::transport::GroupMetadata;

/// Welcome-message configuration for a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WelcomeConfig {
    #[serde(default)]
    pub status: bool,

    /// Extra text appended to the welcome message.
    #[serde(default)]
    pub text: Option<String>,
}

/// Anti-fake configuration: allowed phone country codes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AntifakeConfig {
    #[serde(default)]
    pub status: bool,

    /// Allowed country-code prefixes, e.g. ["55", "351"].
    #[serde(default)]
    pub allowed: Vec<String>,
}

/// Anti-flood configuration for a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntifloodConfig {
    #[serde(default)]
    pub status: bool,

    /// Messages allowed inside the window before the sender is removed.
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,

    /// Window length in seconds.
    #[serde(default = "default_interval")]
    pub interval_seconds: u32,
}

fn default_max_messages() -> u32 {
    10
}

fn default_interval() -> u32 {
    10
}

impl Default for AntifloodConfig {
    fn default() -> Self {
        Self {
            status: false,
            max_messages: 10,
            interval_seconds: 10,
        }
    }
}

/// Activity-counter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounterConfig {
    #[serde(default)]
    pub status: bool,

    /// When counting was last enabled.
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
}

/// A WhatsApp group tracked by the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Group JID
    pub group_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Owner JID, empty for very old groups.
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub participants: Vec<String>,

    #[serde(default)]
    pub admins: Vec<String>,

    /// Commands restricted to group admins.
    #[serde(default)]
    pub muted: bool,

    /// Group-info edits restricted to admins (mirrors protocol state).
    #[serde(default)]
    pub restricted: bool,

    #[serde(default)]
    pub autosticker: bool,

    #[serde(default)]
    pub antilink: bool,

    #[serde(default)]
    pub welcome: WelcomeConfig,

    #[serde(default)]
    pub antifake: AntifakeConfig,

    #[serde(default)]
    pub antiflood: AntifloodConfig,

    #[serde(default)]
    pub counter: CounterConfig,

    /// Users banned from rejoining.
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Command names (without prefix) disabled in this group.
    #[serde(default)]
    pub block_cmds: Vec<String>,

    #[serde(default)]
    pub executed_cmds: i64,
}

impl Group {
    /// Create a new group document with defaults.
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            id: None,
            group_id: group_id.into(),
            name: String::new(),
            description: None,
            owner: None,
            participants: Vec::new(),
            admins: Vec::new(),
            muted: false,
            restricted: false,
            autosticker: false,
            antilink: false,
            welcome: WelcomeConfig::default(),
            antifake: AntifakeConfig::default(),
            antiflood: AntifloodConfig::default(),
            counter: CounterConfig::default(),
            blacklist: Vec::new(),
            block_cmds: Vec::new(),
            executed_cmds: 0,
        }
    }

    /// Overwrite membership state from fresh protocol metadata.
    ///
    /// Invariants restored here: admins are a subset of participants, and
    /// the owner (when known) is an admin.
    pub fn apply_metadata(&mut self, meta: &GroupMetadata) {
        self.name = meta.name.clone();
        self.description = meta.description.clone();
        self.owner = meta.owner.clone();
        self.restricted = meta.restricted;
        self.participants = meta.participants.clone();

        let mut admins: Vec<String> = meta
            .admins
            .iter()
            .filter(|a| self.participants.contains(a))
            .cloned()
            .collect();

        if let Some(owner) = &self.owner {
            if self.participants.contains(owner) && !admins.contains(owner) {
                admins.push(owner.clone());
            }
        }

        self.admins = admins;
    }

    /// Whether a user is a group admin.
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.iter().any(|a| a == user_id)
    }

    /// Whether a user is currently in the group.
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// Whether a user is blacklisted.
    pub fn is_blacklisted(&self, user_id: &str) -> bool {
        self.blacklist.iter().any(|b| b == user_id)
    }

    /// Whether a command (name without prefix) is disabled in this group.
    pub fn is_blocked_command(&self, command: &str) -> bool {
        self.block_cmds.iter().any(|c| c == command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> GroupMetadata {
        GroupMetadata {
            group_id: "123@g.us".into(),
            name: "Test".into(),
            description: None,
            owner: Some("1@s.whatsapp.net".into()),
            participants: vec![
                "1@s.whatsapp.net".into(),
                "2@s.whatsapp.net".into(),
                "3@s.whatsapp.net".into(),
            ],
            admins: vec!["2@s.whatsapp.net".into(), "9@s.whatsapp.net".into()],
            restricted: false,
        }
    }

    #[test]
    fn test_apply_metadata_keeps_admins_inside_participants() {
        let mut group = Group::new("123@g.us");
        group.apply_metadata(&metadata());

        // "9" is not a participant and must be dropped
        assert!(!group.is_admin("9@s.whatsapp.net"));
        assert!(group.is_admin("2@s.whatsapp.net"));
    }

    #[test]
    fn test_apply_metadata_promotes_owner() {
        let mut group = Group::new("123@g.us");
        group.apply_metadata(&metadata());

        assert!(group.is_admin("1@s.whatsapp.net"));
    }

    #[test]
    fn test_blocked_command_lookup() {
        let mut group = Group::new("123@g.us");
        group.block_cmds.push("ban".into());

        assert!(group.is_blocked_command("ban"));
        assert!(!group.is_blocked_command("mute"));
    }
}
