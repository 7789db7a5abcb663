//! Handler context and the `Handler` trait.

use async_trait::async_trait;
use keyward_proto::gateway::User;
use keyward_proto::{Command, Permissions};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{HandlerResult, PlatformError};
use crate::keys::Ledger;
use crate::platform::{Platform, ReplyTarget};

/// Long-lived collaborators shared by every command.
pub struct Services {
    pub platform: Arc<dyn Platform>,
    pub ledger: Arc<Ledger>,
    pub config: Arc<Config>,
}

impl Services {
    pub fn new(platform: Arc<dyn Platform>, ledger: Arc<Ledger>, config: Arc<Config>) -> Self {
        Self {
            platform,
            ledger,
            config,
        }
    }

    /// The role granted on redemption.
    pub fn buyer_role(&self) -> &str {
        &self.config.bot.buyer_role_id
    }
}

/// Everything a handler knows about one command invocation.
pub struct Context<'a> {
    pub services: &'a Services,
    /// Guild the command was issued in.
    pub guild_id: String,
    /// Channel the command was issued in.
    pub channel_id: String,
    /// Invoking user.
    pub author: User,
    /// Role ids held by the author.
    pub member_roles: Vec<String>,
    /// Users mentioned in the command message, in mention order.
    pub mentions: Vec<User>,
    /// Where replies go.
    pub reply_to: ReplyTarget,
    /// Permissions delivered with the event, if any. Fetched on demand
    /// otherwise.
    pub permissions: Option<Permissions>,
}

impl<'a> Context<'a> {
    pub fn platform(&self) -> &dyn Platform {
        self.services.platform.as_ref()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.services.ledger
    }

    pub fn config(&self) -> &Config {
        &self.services.config
    }

    /// Send a reply to wherever the command came from.
    pub async fn reply(&self, text: &str) -> HandlerResult {
        match &self.reply_to {
            ReplyTarget::Channel(channel_id) => {
                self.platform().send_message(channel_id, text).await?;
            }
            ReplyTarget::Interaction { id, token } => {
                self.platform().respond_interaction(id, token, text).await?;
            }
        }
        Ok(())
    }

    /// Post into the invoking channel, returning the message id.
    pub async fn say(&self, text: &str) -> Result<String, PlatformError> {
        self.platform().send_message(&self.channel_id, text).await
    }

    /// The author's effective guild permissions.
    pub async fn author_permissions(&self) -> Result<Permissions, PlatformError> {
        match self.permissions {
            Some(perms) => Ok(perms),
            None => {
                self.platform()
                    .member_permissions(&self.guild_id, &self.author.id)
                    .await
            }
        }
    }

    pub fn author_has_role(&self, role_id: &str) -> bool {
        self.member_roles.iter().any(|r| r == role_id)
    }
}

/// What a caller must hold before a handler runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone may run it.
    Anyone,
    /// The author's guild permissions must allow this.
    Permission(Permissions),
    /// The author must hold the configured buyer role.
    BuyerRole,
}

/// A command handler.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Checked by the registry before argument parsing.
    fn requirement(&self) -> Requirement {
        Requirement::Anyone
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &Command) -> HandlerResult;
}
