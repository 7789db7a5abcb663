//! Channel commands: `.lock`, `.unlock`, `.nuke`.

use async_trait::async_trait;
use keyward_proto::mention::channel_mention;
use keyward_proto::{Command, Permissions};
use tracing::{info, warn};

use super::context::{Context, Handler, Requirement};
use super::misrouted;
use crate::error::{HandlerResult, PlatformError};
use crate::platform::ChannelInfo;

/// `.lock` / `.unlock`: toggle `@everyone` send permission in the current
/// channel.
pub struct LockHandler {
    locked: bool,
}

impl LockHandler {
    pub const fn lock() -> Self {
        Self { locked: true }
    }

    pub const fn unlock() -> Self {
        Self { locked: false }
    }
}

#[async_trait]
impl Handler for LockHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::ADMINISTRATOR)
    }

    async fn handle(&self, ctx: &Context<'_>, _cmd: &Command) -> HandlerResult {
        let result = ctx
            .platform()
            .set_channel_locked(&ctx.guild_id, &ctx.channel_id, self.locked)
            .await;

        let verb = if self.locked { "locking" } else { "unlocking" };
        match result {
            Ok(()) => {
                info!(by = %ctx.author.id, channel = %ctx.channel_id, locked = self.locked, "Channel lock changed");
                ctx.reply(if self.locked {
                    "Channel Locked"
                } else {
                    "Channel Unlocked"
                })
                .await
            }
            Err(e) => {
                warn!(channel = %ctx.channel_id, error = %e, "Error {} channel", verb);
                ctx.reply(&format!("❌ Error {} the channel.", verb)).await
            }
        }
    }
}

/// `.nuke <channel_id>`: replace a text channel with a fresh copy.
pub struct NukeHandler;

#[async_trait]
impl Handler for NukeHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::MANAGE_CHANNELS)
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Nuke { channel_id } = cmd else {
            return Err(misrouted(cmd));
        };

        let channel = match ctx.platform().fetch_channel(channel_id).await {
            Ok(Some(channel)) if channel.guild_id.as_deref() == Some(ctx.guild_id.as_str()) => {
                channel
            }
            Ok(_) => return ctx.reply("❌ Channel not found.").await,
            Err(e) => {
                warn!(channel = %channel_id, error = %e, "Channel lookup failed");
                return ctx.reply("❌ Channel not found.").await;
            }
        };
        if !channel.is_text() {
            return ctx.reply("❌ Only text channels can be nuked.").await;
        }

        let new_id = match recreate(ctx, &channel).await {
            Ok(new_id) => new_id,
            Err(e) => {
                warn!(channel = %channel_id, error = %e, "Nuke failed");
                return ctx.reply("❌ Failed to nuke the channel.").await;
            }
        };
        info!(by = %ctx.author.id, old = %channel_id, new = %new_id, "Channel nuked");

        let announcement = format!("💥 Nuked and recreated {}", channel_mention(&new_id));
        if *channel_id == ctx.channel_id {
            // The invoking channel is gone; announce in its replacement.
            ctx.platform().send_message(&new_id, &announcement).await?;
            Ok(())
        } else {
            ctx.reply(&announcement).await
        }
    }
}

async fn recreate(ctx: &Context<'_>, channel: &ChannelInfo) -> Result<String, PlatformError> {
    let new_id = ctx.platform().clone_channel(channel).await?;
    ctx.platform().delete_channel(&channel.id).await?;
    Ok(new_id)
}
