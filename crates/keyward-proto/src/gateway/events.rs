//! Dispatch events consumed by the bot.

use super::opcode::OpCode;
use super::payload::GatewayFrame;
use crate::error::Result;
use crate::permissions::Permissions;
use serde::Deserialize;
use serde_json::Value;

/// Interaction type for slash-command invocations.
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;

/// A platform user.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Snowflake id.
    pub id: String,
    /// Account name.
    pub username: String,
    /// Legacy discriminator; `"0"` for migrated accounts.
    #[serde(default)]
    pub discriminator: Option<String>,
    /// True for bot accounts.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Display tag: `name#1234` for legacy accounts, plain `name` otherwise.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }
}

/// Guild member fragment attached to message events.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Member {
    /// Role ids held by the member.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A message posted to a channel (`MESSAGE_CREATE`).
#[derive(Clone, Debug, Deserialize)]
pub struct ChannelMessage {
    /// Message id.
    pub id: String,
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Guild, absent for direct messages.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Author.
    pub author: User,
    /// Author's guild membership, absent for direct messages.
    #[serde(default)]
    pub member: Option<Member>,
    /// Text content.
    #[serde(default)]
    pub content: String,
    /// Users mentioned in the message, in mention order.
    #[serde(default)]
    pub mentions: Vec<User>,
}

/// Session established (`READY`).
#[derive(Clone, Debug, Deserialize)]
pub struct Ready {
    /// The bot's own user.
    pub user: User,
    /// Session id.
    pub session_id: String,
}

/// Member fragment attached to guild interactions.
#[derive(Clone, Debug, Deserialize)]
pub struct InteractionMember {
    /// The invoking user.
    pub user: User,
    /// Role ids held by the member.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Effective permissions in the invoking channel, as a decimal string.
    #[serde(default)]
    pub permissions: Option<String>,
}

/// A single named option of a slash command.
#[derive(Clone, Debug, Deserialize)]
pub struct InteractionOption {
    /// Option name.
    pub name: String,
    /// Option value.
    #[serde(default)]
    pub value: Value,
}

/// Slash command payload.
#[derive(Clone, Debug, Deserialize)]
pub struct InteractionData {
    /// Command name.
    pub name: String,
    /// Supplied options.
    #[serde(default)]
    pub options: Vec<InteractionOption>,
}

/// An interaction (`INTERACTION_CREATE`).
#[derive(Clone, Debug, Deserialize)]
pub struct Interaction {
    /// Interaction id.
    pub id: String,
    /// Interaction type.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Continuation token for responding.
    pub token: String,
    /// Guild, absent in direct messages.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Channel the interaction was invoked in.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Guild member, present for guild interactions.
    #[serde(default)]
    pub member: Option<InteractionMember>,
    /// User, present for direct-message interactions.
    #[serde(default)]
    pub user: Option<User>,
    /// Command payload.
    #[serde(default)]
    pub data: Option<InteractionData>,
}

impl Interaction {
    /// True for slash-command invocations.
    pub fn is_command(&self) -> bool {
        self.kind == INTERACTION_APPLICATION_COMMAND
    }

    /// Name of the invoked command.
    pub fn command_name(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.name.as_str())
    }

    /// String value of a named option.
    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.data
            .as_ref()?
            .options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_str())
    }

    /// The invoking user, from the member fragment or the top-level user.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .map(|m| &m.user)
            .or(self.user.as_ref())
    }

    /// Permissions supplied with the interaction.
    pub fn permissions(&self) -> Option<Permissions> {
        self.member
            .as_ref()?
            .permissions
            .as_deref()
            .and_then(|p| p.parse().ok())
    }
}

/// Dispatch events the bot reacts to.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum DispatchEvent {
    /// Session ready.
    Ready(Ready),
    /// A message was posted.
    MessageCreate(ChannelMessage),
    /// An interaction was invoked.
    InteractionCreate(Interaction),
    /// Any other dispatch, by event name.
    Other(String),
}

impl DispatchEvent {
    /// Decode a dispatch frame. Returns `None` for non-dispatch frames.
    pub fn from_frame(frame: &GatewayFrame) -> Result<Option<DispatchEvent>> {
        if frame.opcode() != OpCode::Dispatch {
            return Ok(None);
        }
        let name = frame.t.as_deref().unwrap_or_default();
        let event = match name {
            "READY" => DispatchEvent::Ready(Ready::deserialize(&frame.d)?),
            "MESSAGE_CREATE" => DispatchEvent::MessageCreate(ChannelMessage::deserialize(&frame.d)?),
            "INTERACTION_CREATE" => {
                DispatchEvent::InteractionCreate(Interaction::deserialize(&frame.d)?)
            }
            other => DispatchEvent::Other(other.to_string()),
        };
        Ok(Some(event))
    }

    /// Event name for logging.
    pub fn name(&self) -> &str {
        match self {
            Self::Ready(_) => "READY",
            Self::MessageCreate(_) => "MESSAGE_CREATE",
            Self::InteractionCreate(_) => "INTERACTION_CREATE",
            Self::Other(name) => name,
        }
    }
}
