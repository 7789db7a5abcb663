//! Gateway events to command dispatch.

use keyward_proto::gateway::{ChannelMessage, DispatchEvent, Interaction};
use keyward_proto::CommandName;
use tracing::{debug, info};

use super::context::{Context, Services};
use super::registry::Registry;
use crate::error::HandlerResult;
use crate::platform::ReplyTarget;

/// Slash command name for redemption.
const REDEEM_SLASH: &str = "redeem";

/// Turns dispatch events into handler invocations.
pub struct Router {
    services: Services,
    registry: Registry,
}

impl Router {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            registry: Registry::new(),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// React to one gateway dispatch. Errors have already been answered
    /// when they carry a reply; the result is for logging.
    pub async fn on_event(&self, event: DispatchEvent) -> HandlerResult {
        match event {
            DispatchEvent::Ready(ready) => {
                info!(user = %ready.user.tag(), session = %ready.session_id, "Logged in");
                Ok(())
            }
            DispatchEvent::MessageCreate(message) => self.on_message(message).await,
            DispatchEvent::InteractionCreate(interaction) => {
                self.on_interaction(interaction).await
            }
            other => {
                debug!(event = other.name(), "Ignoring dispatch");
                Ok(())
            }
        }
    }

    /// Handle a channel message. Bot authors, direct messages and lines that
    /// do not start with a command token are ignored.
    pub async fn on_message(&self, message: ChannelMessage) -> HandlerResult {
        if message.author.bot {
            return Ok(());
        }
        let Some(guild_id) = message.guild_id else {
            return Ok(());
        };
        let Some((name, args)) = CommandName::split(&message.content) else {
            return Ok(());
        };

        let ctx = Context {
            services: &self.services,
            guild_id,
            channel_id: message.channel_id.clone(),
            author: message.author,
            member_roles: message.member.map(|m| m.roles).unwrap_or_default(),
            mentions: message.mentions,
            reply_to: ReplyTarget::Channel(message.channel_id),
            permissions: None,
        };
        self.registry.dispatch(&ctx, name, &args).await
    }

    /// Handle a slash-command interaction. Only `/redeem` is registered.
    pub async fn on_interaction(&self, interaction: Interaction) -> HandlerResult {
        if !interaction.is_command() || interaction.command_name() != Some(REDEEM_SLASH) {
            return Ok(());
        }
        let Some(author) = interaction.invoker().cloned() else {
            return Ok(());
        };

        let reply_to = ReplyTarget::Interaction {
            id: interaction.id.clone(),
            token: interaction.token.clone(),
        };
        // A missing option stops collection; parsing then reports usage.
        let args: Vec<&str> = ["key", "duration"]
            .into_iter()
            .map_while(|option| interaction.option_str(option))
            .collect();

        let ctx = Context {
            services: &self.services,
            guild_id: interaction
                .guild_id
                .clone()
                .unwrap_or_else(|| self.services.config.bot.guild_id.clone()),
            channel_id: interaction.channel_id.clone().unwrap_or_default(),
            author,
            member_roles: interaction
                .member
                .as_ref()
                .map(|m| m.roles.clone())
                .unwrap_or_default(),
            mentions: Vec::new(),
            reply_to,
            permissions: interaction.permissions(),
        };

        self.registry.dispatch(&ctx, CommandName::Redeem, &args).await
    }
}
