//! Chat platform capability.
//!
//! Handlers never talk HTTP directly. Everything they need from the platform
//! goes through [`Platform`], so tests can substitute a recording fake and the
//! ledger never depends on a network call.

pub mod discord;
mod types;

pub use discord::DiscordRest;
pub use types::{
    CHANNEL_GUILD_TEXT, ChannelInfo, MessageInfo, OVERWRITE_ROLE, PermissionOverwrite,
    ReplyTarget,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward_proto::Permissions;

use crate::error::PlatformError;

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Operations the bot performs against the chat platform.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Post a message; returns the new message id.
    async fn send_message(&self, channel_id: &str, content: &str) -> PlatformResult<String>;

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> PlatformResult<()>;

    /// Answer an interaction with a visible message.
    async fn respond_interaction(
        &self,
        interaction_id: &str,
        token: &str,
        content: &str,
    ) -> PlatformResult<()>;

    /// Open (or reuse) a DM channel with `user_id` and post into it.
    async fn send_direct_message(&self, user_id: &str, content: &str) -> PlatformResult<()>;

    /// Effective guild-level permissions of a member.
    async fn member_permissions(&self, guild_id: &str, user_id: &str)
    -> PlatformResult<Permissions>;

    /// Privilege grant: add `role_id` to a member.
    async fn grant_role(&self, guild_id: &str, user_id: &str, role_id: &str)
    -> PlatformResult<()>;

    async fn kick_member(&self, guild_id: &str, user_id: &str, reason: &str)
    -> PlatformResult<()>;

    async fn ban_member(&self, guild_id: &str, user_id: &str, reason: &str) -> PlatformResult<()>;

    async fn unban_member(&self, guild_id: &str, user_id: &str) -> PlatformResult<()>;

    /// Time a member out until `until`, or clear the timeout with `None`.
    async fn timeout_member(
        &self,
        guild_id: &str,
        user_id: &str,
        until: Option<DateTime<Utc>>,
        reason: Option<&str>,
    ) -> PlatformResult<()>;

    /// Deny (`locked`) or allow `@everyone` to send messages in a channel,
    /// leaving the overwrite's other bits alone.
    async fn set_channel_locked(
        &self,
        guild_id: &str,
        channel_id: &str,
        locked: bool,
    ) -> PlatformResult<()>;

    /// Look a channel up; `None` when it does not exist.
    async fn fetch_channel(&self, channel_id: &str) -> PlatformResult<Option<ChannelInfo>>;

    /// Create a copy of `channel` (same position); returns the new channel id.
    async fn clone_channel(&self, channel: &ChannelInfo) -> PlatformResult<String>;

    async fn delete_channel(&self, channel_id: &str) -> PlatformResult<()>;

    /// Most recent messages in a channel, newest first.
    async fn recent_messages(&self, channel_id: &str, limit: u32)
    -> PlatformResult<Vec<MessageInfo>>;

    /// Delete the given messages; returns how many were deleted.
    async fn delete_messages(&self, channel_id: &str, message_ids: &[String])
    -> PlatformResult<usize>;
}
