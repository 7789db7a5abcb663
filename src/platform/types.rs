//! Platform resource types shared by the trait and its implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel type id for guild text channels.
pub const CHANNEL_GUILD_TEXT: u8 = 0;

/// Overwrite target type for roles.
pub const OVERWRITE_ROLE: u8 = 0;

/// A permission overwrite on a channel. Bit sets travel as decimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub allow: String,
    #[serde(default)]
    pub deny: String,
}

/// The parts of a channel needed to recreate it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub rate_limit_per_user: u32,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl ChannelInfo {
    pub fn is_text(&self) -> bool {
        self.kind == CHANNEL_GUILD_TEXT
    }
}

/// A message as returned by history fetches.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MessageInfo {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

/// Where a command's replies go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Post into a channel.
    Channel(String),
    /// Answer a slash-command interaction.
    Interaction { id: String, token: String },
}
