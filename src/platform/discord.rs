//! REST implementation of [`Platform`].
//!
//! One `reqwest::Client` per process, bot-token auth on every request.
//! Moderation calls carry their reason in the audit-log header.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use keyward_proto::Permissions;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, info};

use super::types::{ChannelInfo, MessageInfo, OVERWRITE_ROLE, PermissionOverwrite};
use super::{Platform, PlatformResult};
use crate::error::PlatformError;

/// Timeout for a single REST call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const AUDIT_LOG_REASON: &str = "X-Audit-Log-Reason";

/// Interaction callback type for "reply with a message".
const CALLBACK_CHANNEL_MESSAGE: u8 = 4;

/// Slash-command option type for strings.
const OPTION_STRING: u8 = 3;

/// Bulk delete accepts between 2 and 100 ids.
const BULK_DELETE_MIN: usize = 2;
const BULK_DELETE_MAX: usize = 100;

#[derive(Deserialize)]
struct Created {
    id: String,
}

#[derive(Deserialize)]
struct RoleEntry {
    id: String,
    #[serde(default)]
    permissions: String,
}

#[derive(Deserialize)]
struct GuildEntry {
    owner_id: String,
    #[serde(default)]
    roles: Vec<RoleEntry>,
}

#[derive(Deserialize)]
struct MemberEntry {
    #[serde(default)]
    roles: Vec<String>,
}

/// HTTPS client for the platform's REST API.
pub struct DiscordRest {
    http: reqwest::Client,
    api_base: String,
    token: String,
    application_id: String,
}

impl DiscordRest {
    /// Build a client. Fails only if the TLS backend cannot initialise.
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        application_id: impl Into<String>,
    ) -> PlatformResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("keyward/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            application_id: application_id.into(),
        })
    }

    /// Register the `/redeem` slash command in one guild, replacing any
    /// previously registered set.
    pub async fn register_commands(&self, guild_id: &str) -> PlatformResult<()> {
        let path = format!(
            "/applications/{}/guilds/{}/commands",
            self.application_id, guild_id
        );
        let body = json!([{
            "name": "redeem",
            "description": "Redeem a key and get the Buyer role",
            "options": [
                {
                    "type": OPTION_STRING,
                    "name": "key",
                    "description": "The key to redeem",
                    "required": true,
                },
                {
                    "type": OPTION_STRING,
                    "name": "duration",
                    "description": "Duration of the key (e.g., 24hr, L for Lifetime)",
                    "required": true,
                },
            ],
        }]);
        self.execute(self.request(Method::PUT, &path).json(&body))
            .await?;
        info!(guild = guild_id, "Slash commands registered");
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_base, path))
            .header(AUTHORIZATION, format!("Bot {}", self.token))
    }

    fn with_reason(builder: RequestBuilder, reason: &str) -> RequestBuilder {
        match HeaderValue::from_str(&encode_reason(reason)) {
            Ok(value) => builder.header(AUDIT_LOG_REASON, value),
            Err(_) => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> PlatformResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %message, "REST call failed");
        if status == StatusCode::NOT_FOUND {
            Err(PlatformError::NotFound(message))
        } else {
            Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn get_channel_raw(&self, channel_id: &str) -> PlatformResult<ChannelInfo> {
        let path = format!("/channels/{}", channel_id);
        Ok(self.execute(self.request(Method::GET, &path)).await?.json().await?)
    }
}

#[async_trait]
impl Platform for DiscordRest {
    async fn send_message(&self, channel_id: &str, content: &str) -> PlatformResult<String> {
        let path = format!("/channels/{}/messages", channel_id);
        let created: Created = self
            .execute(self.request(Method::POST, &path).json(&json!({ "content": content })))
            .await?
            .json()
            .await?;
        Ok(created.id)
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> PlatformResult<()> {
        let path = format!("/channels/{}/messages/{}", channel_id, message_id);
        self.execute(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn respond_interaction(
        &self,
        interaction_id: &str,
        token: &str,
        content: &str,
    ) -> PlatformResult<()> {
        let path = format!("/interactions/{}/{}/callback", interaction_id, token);
        let body = json!({
            "type": CALLBACK_CHANNEL_MESSAGE,
            "data": { "content": content },
        });
        self.execute(self.request(Method::POST, &path).json(&body))
            .await?;
        Ok(())
    }

    async fn send_direct_message(&self, user_id: &str, content: &str) -> PlatformResult<()> {
        let dm: Created = self
            .execute(
                self.request(Method::POST, "/users/@me/channels")
                    .json(&json!({ "recipient_id": user_id })),
            )
            .await?
            .json()
            .await?;
        self.send_message(&dm.id, content).await?;
        Ok(())
    }

    async fn member_permissions(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> PlatformResult<Permissions> {
        let guild: GuildEntry = self
            .execute(self.request(Method::GET, &format!("/guilds/{}", guild_id)))
            .await?
            .json()
            .await?;
        let member: MemberEntry = self
            .execute(self.request(
                Method::GET,
                &format!("/guilds/{}/members/{}", guild_id, user_id),
            ))
            .await?
            .json()
            .await?;
        Ok(base_permissions(guild_id, user_id, &guild, &member.roles))
    }

    async fn grant_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> PlatformResult<()> {
        let path = format!("/guilds/{}/members/{}/roles/{}", guild_id, user_id, role_id);
        self.execute(self.request(Method::PUT, &path)).await?;
        Ok(())
    }

    async fn kick_member(&self, guild_id: &str, user_id: &str, reason: &str) -> PlatformResult<()> {
        let path = format!("/guilds/{}/members/{}", guild_id, user_id);
        self.execute(Self::with_reason(self.request(Method::DELETE, &path), reason))
            .await?;
        Ok(())
    }

    async fn ban_member(&self, guild_id: &str, user_id: &str, reason: &str) -> PlatformResult<()> {
        let path = format!("/guilds/{}/bans/{}", guild_id, user_id);
        let builder = self.request(Method::PUT, &path).json(&json!({}));
        self.execute(Self::with_reason(builder, reason)).await?;
        Ok(())
    }

    async fn unban_member(&self, guild_id: &str, user_id: &str) -> PlatformResult<()> {
        let path = format!("/guilds/{}/bans/{}", guild_id, user_id);
        self.execute(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn timeout_member(
        &self,
        guild_id: &str,
        user_id: &str,
        until: Option<DateTime<Utc>>,
        reason: Option<&str>,
    ) -> PlatformResult<()> {
        let path = format!("/guilds/{}/members/{}", guild_id, user_id);
        let until = until.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true));
        let mut builder = self
            .request(Method::PATCH, &path)
            .json(&json!({ "communication_disabled_until": until }));
        if let Some(reason) = reason {
            builder = Self::with_reason(builder, reason);
        }
        self.execute(builder).await?;
        Ok(())
    }

    async fn set_channel_locked(
        &self,
        guild_id: &str,
        channel_id: &str,
        locked: bool,
    ) -> PlatformResult<()> {
        let channel = self.get_channel_raw(channel_id).await?;
        let existing = channel
            .permission_overwrites
            .iter()
            .find(|o| o.id == guild_id);
        let overwrite = everyone_send_overwrite(guild_id, existing, locked);

        let path = format!("/channels/{}/permissions/{}", channel_id, guild_id);
        let body = json!({
            "type": overwrite.kind,
            "allow": overwrite.allow,
            "deny": overwrite.deny,
        });
        self.execute(self.request(Method::PUT, &path).json(&body))
            .await?;
        Ok(())
    }

    async fn fetch_channel(&self, channel_id: &str) -> PlatformResult<Option<ChannelInfo>> {
        match self.get_channel_raw(channel_id).await {
            Ok(channel) => Ok(Some(channel)),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn clone_channel(&self, channel: &ChannelInfo) -> PlatformResult<String> {
        let guild_id = channel
            .guild_id
            .as_deref()
            .ok_or_else(|| PlatformError::NotFound(format!("guild of channel {}", channel.id)))?;
        let path = format!("/guilds/{}/channels", guild_id);
        let body = json!({
            "name": channel.name,
            "type": channel.kind,
            "topic": channel.topic,
            "nsfw": channel.nsfw,
            "parent_id": channel.parent_id,
            "rate_limit_per_user": channel.rate_limit_per_user,
            "position": channel.position,
            "permission_overwrites": channel.permission_overwrites,
        });
        let created: Created = self
            .execute(self.request(Method::POST, &path).json(&body))
            .await?
            .json()
            .await?;
        Ok(created.id)
    }

    async fn delete_channel(&self, channel_id: &str) -> PlatformResult<()> {
        let path = format!("/channels/{}", channel_id);
        self.execute(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel_id: &str,
        limit: u32,
    ) -> PlatformResult<Vec<MessageInfo>> {
        let path = format!("/channels/{}/messages", channel_id);
        let builder = self
            .request(Method::GET, &path)
            .query(&[("limit", limit.to_string())]);
        Ok(self.execute(builder).await?.json().await?)
    }

    async fn delete_messages(
        &self,
        channel_id: &str,
        message_ids: &[String],
    ) -> PlatformResult<usize> {
        match message_ids.len() {
            0 => Ok(0),
            1 => {
                self.delete_message(channel_id, &message_ids[0]).await?;
                Ok(1)
            }
            _ => {
                let path = format!("/channels/{}/messages/bulk-delete", channel_id);
                let mut deleted = 0;
                for chunk in message_ids.chunks(BULK_DELETE_MAX) {
                    if chunk.len() < BULK_DELETE_MIN {
                        self.delete_message(channel_id, &chunk[0]).await?;
                    } else {
                        self.execute(
                            self.request(Method::POST, &path)
                                .json(&json!({ "messages": chunk })),
                        )
                        .await?;
                    }
                    deleted += chunk.len();
                }
                Ok(deleted)
            }
        }
    }
}

/// Guild-level permissions: the owner holds everything, everyone else the
/// union of `@everyone` (role id == guild id) and their own roles.
fn base_permissions(
    guild_id: &str,
    user_id: &str,
    guild: &GuildEntry,
    member_roles: &[String],
) -> Permissions {
    if guild.owner_id == user_id {
        return Permissions::ALL;
    }
    guild
        .roles
        .iter()
        .filter(|role| role.id == guild_id || member_roles.contains(&role.id))
        .filter_map(|role| role.permissions.parse::<Permissions>().ok())
        .fold(Permissions::NONE, |acc, p| acc | p)
}

/// The `@everyone` overwrite after locking or unlocking, keeping every bit
/// other than SendMessages as it was.
fn everyone_send_overwrite(
    guild_id: &str,
    existing: Option<&PermissionOverwrite>,
    locked: bool,
) -> PermissionOverwrite {
    let parse = |bits: Option<&str>| {
        bits.and_then(|b| b.parse::<Permissions>().ok())
            .unwrap_or(Permissions::NONE)
    };
    let mut allow = parse(existing.map(|o| o.allow.as_str()));
    let mut deny = parse(existing.map(|o| o.deny.as_str()));

    let send = Permissions::SEND_MESSAGES;
    if locked {
        allow.remove(send);
        deny |= send;
    } else {
        deny.remove(send);
        allow |= send;
    }

    PermissionOverwrite {
        id: guild_id.to_string(),
        kind: OVERWRITE_ROLE,
        allow: allow.bits().to_string(),
        deny: deny.bits().to_string(),
    }
}

/// Audit-log reasons travel URL-encoded so any text fits in a header.
fn encode_reason(reason: &str) -> Cow<'_, str> {
    urlencoding::encode(reason)
}
