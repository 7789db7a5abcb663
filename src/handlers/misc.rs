//! Informational commands: `.help`, `.userid`, `.download`.

use async_trait::async_trait;
use keyward_proto::{Command, CommandName};
use tracing::{info, warn};

use super::context::{Context, Handler, Requirement};
use crate::error::HandlerResult;

pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    async fn handle(&self, ctx: &Context<'_>, _cmd: &Command) -> HandlerResult {
        ctx.reply(&help_text()).await
    }
}

/// The command listing, in help order.
pub fn help_text() -> String {
    let mut text = String::from("**🛠 Bot Commands:**\n");
    for name in CommandName::ALL {
        text.push_str(&format!("• **{}** - {}\n", name.syntax(), name.summary()));
    }
    text
}

pub struct UserIdHandler;

#[async_trait]
impl Handler for UserIdHandler {
    async fn handle(&self, ctx: &Context<'_>, _cmd: &Command) -> HandlerResult {
        match ctx.mentions.first() {
            Some(user) => {
                ctx.reply(&format!("👤 **{}**'s User ID: **{}**", user.tag(), user.id))
                    .await
            }
            None => {
                ctx.reply("❌ You need to mention a user to get their user ID.")
                    .await
            }
        }
    }
}

pub struct DownloadHandler;

#[async_trait]
impl Handler for DownloadHandler {
    fn requirement(&self) -> Requirement {
        Requirement::BuyerRole
    }

    async fn handle(&self, ctx: &Context<'_>, _cmd: &Command) -> HandlerResult {
        let Some(url) = ctx.config().download.url.as_deref() else {
            return ctx.reply("❌ No download link is configured.").await;
        };

        let dm = format!("Here is your download link: {}", url);
        match ctx.platform().send_direct_message(&ctx.author.id, &dm).await {
            Ok(()) => {
                info!(user = %ctx.author.id, "Download link sent");
                ctx.reply("📥 The download link has been sent to your DMs.")
                    .await
            }
            Err(e) => {
                warn!(user = %ctx.author.id, error = %e, "Download DM failed");
                ctx.reply("❌ I couldn't send you a private message. Make sure your DMs are open.")
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_every_command_once() {
        let text = help_text();
        for name in CommandName::ALL {
            assert_eq!(text.matches(&format!("**{}**", name.syntax())).count(), 1);
        }
        assert!(text.starts_with("**🛠 Bot Commands:**"));
    }
}
