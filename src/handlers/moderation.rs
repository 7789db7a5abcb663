//! Member moderation: kick, ban, unban, timeout, untimeout, purge.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use keyward_proto::mention::user_mention;
use keyward_proto::{Command, Permissions};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::context::{Context, Handler, Requirement};
use super::misrouted;
use crate::error::HandlerResult;

/// Messages older than this many days cannot be bulk-deleted.
const BULK_DELETE_MAX_AGE_DAYS: i64 = 14;

/// Largest `.purge` request.
pub const PURGE_MAX: u32 = 100;

pub struct KickHandler;

#[async_trait]
impl Handler for KickHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::KICK_MEMBERS)
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Kick { user_id, reason } = cmd else {
            return Err(misrouted(cmd));
        };

        match ctx.platform().kick_member(&ctx.guild_id, user_id, reason).await {
            Ok(()) => {
                info!(by = %ctx.author.id, user = %user_id, reason = %reason, "Member kicked");
                ctx.reply(&format!(
                    "🚪 **{} has been kicked.** Reason: {}",
                    user_mention(user_id),
                    reason
                ))
                .await
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "Kick failed");
                ctx.reply("❌ Error kicking user.").await
            }
        }
    }
}

pub struct BanHandler;

#[async_trait]
impl Handler for BanHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::BAN_MEMBERS)
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Ban { user_id, reason } = cmd else {
            return Err(misrouted(cmd));
        };

        match ctx.platform().ban_member(&ctx.guild_id, user_id, reason).await {
            Ok(()) => {
                info!(by = %ctx.author.id, user = %user_id, reason = %reason, "User banned");
                ctx.reply(&format!(
                    "🔨 **{} has been banned.** Reason: {}",
                    user_mention(user_id),
                    reason
                ))
                .await
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "Ban failed");
                ctx.reply("❌ Error banning user.").await
            }
        }
    }
}

pub struct UnbanHandler;

#[async_trait]
impl Handler for UnbanHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::BAN_MEMBERS)
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Unban { user_id } = cmd else {
            return Err(misrouted(cmd));
        };

        match ctx.platform().unban_member(&ctx.guild_id, user_id).await {
            Ok(()) => {
                info!(by = %ctx.author.id, user = %user_id, "User unbanned");
                ctx.reply(&format!("✅ **{} has been unbanned.**", user_mention(user_id)))
                    .await
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "Unban failed");
                ctx.reply("❌ Error unbanning user.").await
            }
        }
    }
}

pub struct TimeoutHandler;

#[async_trait]
impl Handler for TimeoutHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::MODERATE_MEMBERS)
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Timeout {
            user_id,
            minutes,
            reason,
        } = cmd
        else {
            return Err(misrouted(cmd));
        };

        let max = ctx.config().moderation.timeout_max_minutes;
        if !(1..=max).contains(minutes) {
            return ctx
                .reply(&format!("❌ Duration must be between 1 and {} minutes.", max))
                .await;
        }

        let until = Utc::now() + TimeDelta::minutes(i64::from(*minutes));
        let result = ctx
            .platform()
            .timeout_member(&ctx.guild_id, user_id, Some(until), Some(reason))
            .await;
        match result {
            Ok(()) => {
                info!(by = %ctx.author.id, user = %user_id, minutes, reason = %reason, "Member timed out");
                ctx.reply(&format!(
                    "⏳ **{} has been timed out for {} minutes.**",
                    user_mention(user_id),
                    minutes
                ))
                .await
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "Timeout failed");
                ctx.reply("❌ Error timing out user.").await
            }
        }
    }
}

pub struct UntimeoutHandler;

#[async_trait]
impl Handler for UntimeoutHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::MODERATE_MEMBERS)
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Untimeout { user_id } = cmd else {
            return Err(misrouted(cmd));
        };

        let result = ctx
            .platform()
            .timeout_member(&ctx.guild_id, user_id, None, None)
            .await;
        match result {
            Ok(()) => {
                info!(by = %ctx.author.id, user = %user_id, "Timeout removed");
                ctx.reply(&format!(
                    "✅ **{} timeout has been removed.**",
                    user_mention(user_id)
                ))
                .await
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "Untimeout failed");
                ctx.reply("❌ Error removing timeout from user.").await
            }
        }
    }
}

pub struct PurgeHandler;

#[async_trait]
impl Handler for PurgeHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::MANAGE_MESSAGES)
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Purge { amount } = cmd else {
            return Err(misrouted(cmd));
        };
        if !(1..=PURGE_MAX).contains(amount) {
            return ctx.reply("❌ Specify a number between **1 and 100**.").await;
        }

        let platform = ctx.platform();
        let recent = match platform.recent_messages(&ctx.channel_id, *amount).await {
            Ok(recent) => recent,
            Err(e) => {
                warn!(channel = %ctx.channel_id, error = %e, "Fetching messages for purge failed");
                return ctx.reply("❌ Error purging messages.").await;
            }
        };

        let cutoff = Utc::now() - TimeDelta::days(BULK_DELETE_MAX_AGE_DAYS);
        let ids: Vec<String> = recent
            .into_iter()
            .filter(|m| m.timestamp > cutoff)
            .map(|m| m.id)
            .collect();
        if ids.is_empty() {
            return ctx.reply("❌ No messages found to delete.").await;
        }

        let deleted = match platform.delete_messages(&ctx.channel_id, &ids).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(channel = %ctx.channel_id, error = %e, "Purge failed");
                return ctx.reply("❌ Error purging messages.").await;
            }
        };
        info!(by = %ctx.author.id, channel = %ctx.channel_id, deleted, "Messages purged");

        let notice_id = ctx.say(&format!("Purged **{}** messages.", deleted)).await?;
        schedule_delete(ctx, notice_id);
        Ok(())
    }
}

/// Delete the purge notice after the configured delay. Failures are ignored.
fn schedule_delete(ctx: &Context<'_>, message_id: String) {
    let platform = Arc::clone(&ctx.services.platform);
    let channel_id = ctx.channel_id.clone();
    let delay = ctx.config().moderation.purge_notice();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = platform.delete_message(&channel_id, &message_id).await {
            debug!(channel = %channel_id, error = %e, "Purge notice already gone");
        }
    });
}
