//! Bot profile document (process-wide configuration/state).

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Command-rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRateConfig {
    #[serde(default)]
    pub status: bool,

    /// Commands a non-admin may issue per minute.
    #[serde(default = "default_max_cmds")]
    pub max_cmds_minute: u32,

    /// Block duration in minutes once the rate is exceeded.
    #[serde(default = "default_block_time")]
    pub block_time: u32,
}

fn default_max_cmds() -> u32 {
    10
}

fn default_block_time() -> u32 {
    5
}

impl Default for CommandRateConfig {
    fn default() -> Self {
        Self {
            status: false,
            max_cmds_minute: 10,
            block_time: 5,
        }
    }
}

/// Singleton document describing the bot instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotProfile {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default = "Utc::now")]
    pub started: DateTime<Utc>,

    /// The bot account's own JID, set once the transport connects.
    #[serde(default)]
    pub host_number: String,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub executed_cmds: i64,

    #[serde(default)]
    pub autosticker: bool,

    /// Whether non-admins may use the bot in private chats.
    #[serde(default = "default_true")]
    pub pv_allowed: bool,

    /// When set, only bot admins are served.
    #[serde(default)]
    pub admin_mode: bool,

    /// Command names (without prefix) disabled everywhere.
    #[serde(default)]
    pub block_cmds: Vec<String>,

    #[serde(default)]
    pub command_rate: CommandRateConfig,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_true() -> bool {
    true
}

impl BotProfile {
    /// Create a fresh profile.
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            id: None,
            started: Utc::now(),
            host_number: String::new(),
            name: name.into(),
            prefix: prefix.into(),
            executed_cmds: 0,
            autosticker: false,
            pv_allowed: true,
            admin_mode: false,
            block_cmds: Vec::new(),
            command_rate: CommandRateConfig::default(),
        }
    }

    /// Whether a command (name without prefix) is globally disabled.
    pub fn is_command_blocked_globally(&self, command: &str) -> bool {
        self.block_cmds.iter().any(|c| c == command)
    }
}
