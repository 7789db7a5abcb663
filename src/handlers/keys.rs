//! Key commands: `/redeem`, `.give`, `.take`, `.keylist`.
//!
//! The ledger is updated first; the buyer role is granted afterwards. A
//! failed role grant is reported but never undoes the ledger entry.

use async_trait::async_trait;
use chrono::Utc;
use keyward_proto::mention::user_mention;
use keyward_proto::{Command, Permissions};
use tracing::{info, warn};

use super::context::{Context, Handler, Requirement};
use super::misrouted;
use crate::error::{HandlerResult, LedgerError};
use crate::keys::KeyRecord;

/// Longest message body the platform accepts.
pub const MESSAGE_LIMIT: usize = 2000;

const KEYLIST_HEADER: &str = "🗝 **Redeemed Keys List**:\n";

pub struct RedeemHandler;

#[async_trait]
impl Handler for RedeemHandler {
    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Redeem { key, duration } = cmd else {
            return Err(misrouted(cmd));
        };

        let user = &ctx.author.id;
        let expiration = ctx.ledger().redeem(user, key, duration, Utc::now())?;
        info!(user = %user, key = %key, expires = %expiration, "Key redeemed");

        let granted = ctx
            .platform()
            .grant_role(&ctx.guild_id, user, ctx.services.buyer_role())
            .await;
        match granted {
            Ok(()) => {
                ctx.reply(&format!(
                    "✅ **Key redeemed!** You've been given the Buyer role.\n🕒 Expires: {}",
                    expiration
                ))
                .await
            }
            Err(e) => {
                warn!(user = %user, error = %e, "Buyer role grant failed after redemption");
                ctx.reply("❌ Key redeemed but failed to assign Buyer role.")
                    .await
            }
        }
    }
}

pub struct GiveHandler;

#[async_trait]
impl Handler for GiveHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::ADMINISTRATOR)
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Give {
            user_id,
            key,
            duration,
        } = cmd
        else {
            return Err(misrouted(cmd));
        };

        let expiration = match ctx.ledger().grant(user_id, key, duration, Utc::now()) {
            Ok(expiration) => expiration,
            Err(LedgerError::InvalidDuration(_)) => {
                return ctx
                    .reply("❌ Invalid time format. Use \"24hr\", \"12hr\", or \"L\" for Lifetime.")
                    .await;
            }
            Err(e) => return Err(e.into()),
        };
        info!(by = %ctx.author.id, user = %user_id, key = %key, expires = %expiration, "Key granted");

        let granted = ctx
            .platform()
            .grant_role(&ctx.guild_id, user_id, ctx.services.buyer_role())
            .await;
        let text = match granted {
            Ok(()) => format!(
                "✅ **Key given!** User: {} | Key: **{}** | Expires: {}",
                user_mention(user_id),
                key,
                expiration
            ),
            Err(e) => {
                warn!(user = %user_id, error = %e, "Buyer role grant failed after key grant");
                format!(
                    "❌ Key given to {} but failed to assign Buyer role.",
                    user_mention(user_id)
                )
            }
        };
        ctx.reply(&text).await
    }
}

pub struct TakeHandler;

#[async_trait]
impl Handler for TakeHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::ADMINISTRATOR)
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult {
        let Command::Take { user_id, key } = cmd else {
            return Err(misrouted(cmd));
        };

        let removed = ctx.ledger().revoke(user_id, key)?;
        if removed == 0 {
            return ctx
                .reply(&format!(
                    "❌ No key **{}** found for {}.",
                    key,
                    user_mention(user_id)
                ))
                .await;
        }

        info!(by = %ctx.author.id, user = %user_id, key = %key, removed, "Key revoked");
        ctx.reply(&format!(
            "✅ **Key removed for {}** | Key: **{}**",
            user_mention(user_id),
            key
        ))
        .await
    }
}

pub struct KeyListHandler;

#[async_trait]
impl Handler for KeyListHandler {
    fn requirement(&self) -> Requirement {
        Requirement::Permission(Permissions::ADMINISTRATOR)
    }

    async fn handle(&self, ctx: &Context<'_>, _cmd: &Command) -> HandlerResult {
        let records = ctx.ledger().list();
        if records.is_empty() {
            return ctx.reply("❌ No keys have been redeemed yet.").await;
        }

        for chunk in render_keylist(&records, MESSAGE_LIMIT) {
            ctx.reply(&chunk).await?;
        }
        Ok(())
    }
}

/// Render the key list as messages of at most `limit` characters each.
pub fn render_keylist(records: &[KeyRecord], limit: usize) -> Vec<String> {
    let lines = records.iter().map(|r| {
        format!(
            "**User:** {} | **Key:** {} | **Expires:** {}\n",
            user_mention(&r.user),
            r.key,
            r.expiration
        )
    });
    pack_lines(KEYLIST_HEADER, lines, limit)
}

/// Pack lines into messages no longer than `limit` characters. The header
/// opens the first message only; a line longer than `limit` is split.
fn pack_lines(header: &str, lines: impl Iterator<Item = String>, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = header.to_string();
    let mut current_len = current.chars().count();

    for line in lines {
        let line_len = line.chars().count();
        if current_len + line_len > limit && current_len > 0 {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > limit {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(&line);
        current_len += line_len;
    }
    if current_len > 0 {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Expiration;

    fn records(n: usize) -> Vec<KeyRecord> {
        (0..n)
            .map(|i| KeyRecord::new(format!("{}", 1000 + i), format!("KEY-{i:04}"), Expiration::Lifetime))
            .collect()
    }

    #[test]
    fn keylist_lines() {
        let out = render_keylist(&records(1), MESSAGE_LIMIT);
        assert_eq!(
            out,
            vec![format!(
                "{}**User:** <@1000> | **Key:** KEY-0000 | **Expires:** Lifetime\n",
                KEYLIST_HEADER
            )]
        );
    }

    #[test]
    fn long_keylists_are_split_under_the_limit() {
        let out = render_keylist(&records(200), MESSAGE_LIMIT);
        assert!(out.len() > 1);
        assert!(out.iter().all(|m| m.chars().count() <= MESSAGE_LIMIT));
        assert!(out[0].starts_with(KEYLIST_HEADER));
        assert!(!out[1].starts_with(KEYLIST_HEADER));

        let total: usize = out.iter().map(|m| m.matches("**User:**").count()).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn oversized_lines_are_cut() {
        let lines = std::iter::once("x".repeat(25));
        let out = pack_lines("head\n", lines, 10);
        assert_eq!(out, vec!["head\n", "xxxxxxxxxx", "xxxxxxxxxx", "xxxxx"]);
    }
}
