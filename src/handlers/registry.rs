//! Command handler registry and dispatch.
//!
//! Dispatch order is fixed: requirement check, then argument parsing, then
//! the handler. Errors that carry a user-facing reply are answered here, so
//! handlers only reply on their own success and platform-failure paths.

use keyward_proto::{Command, CommandName};
use std::collections::HashMap;
use tracing::{Instrument, debug, warn};

use super::channel::{LockHandler, NukeHandler};
use super::context::{Context, Handler, Requirement};
use super::keys::{GiveHandler, KeyListHandler, RedeemHandler, TakeHandler};
use super::misc::{DownloadHandler, HelpHandler, UserIdHandler};
use super::moderation::{
    BanHandler, KickHandler, PurgeHandler, TimeoutHandler, UnbanHandler, UntimeoutHandler,
};
use crate::error::{HandlerError, HandlerResult};
use crate::telemetry::{CommandTimer, spans};

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<CommandName, Box<dyn Handler>>,
}

impl Registry {
    /// Create a registry with every command registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<CommandName, Box<dyn Handler>> = HashMap::new();

        // Keys
        handlers.insert(CommandName::Redeem, Box::new(RedeemHandler));
        handlers.insert(CommandName::Give, Box::new(GiveHandler));
        handlers.insert(CommandName::Take, Box::new(TakeHandler));
        handlers.insert(CommandName::KeyList, Box::new(KeyListHandler));

        // Channel
        handlers.insert(CommandName::Lock, Box::new(LockHandler::lock()));
        handlers.insert(CommandName::Unlock, Box::new(LockHandler::unlock()));
        handlers.insert(CommandName::Nuke, Box::new(NukeHandler));

        // Moderation
        handlers.insert(CommandName::Kick, Box::new(KickHandler));
        handlers.insert(CommandName::Ban, Box::new(BanHandler));
        handlers.insert(CommandName::Unban, Box::new(UnbanHandler));
        handlers.insert(CommandName::Timeout, Box::new(TimeoutHandler));
        handlers.insert(CommandName::Untimeout, Box::new(UntimeoutHandler));
        handlers.insert(CommandName::Purge, Box::new(PurgeHandler));

        // Misc
        handlers.insert(CommandName::Help, Box::new(HelpHandler));
        handlers.insert(CommandName::UserId, Box::new(UserIdHandler));
        handlers.insert(CommandName::Download, Box::new(DownloadHandler));

        Self { handlers }
    }

    /// Run a command and answer any error that has a user-facing reply.
    ///
    /// The returned error (if any) has already been answered where possible;
    /// callers only need to log it.
    pub async fn dispatch(&self, ctx: &Context<'_>, name: CommandName, args: &[&str]) -> HandlerResult {
        let span = spans::command(name.label(), &ctx.author.id, &ctx.channel_id);
        async {
            let _timer = CommandTimer::new(name.label());

            let result = self.run(ctx, name, args).await;
            if let Err(ref e) = result {
                debug!(command = name.label(), error = %e, code = e.error_code(), "Command error");
                if let Some(text) = e.to_reply()
                    && let Err(reply_err) = ctx.reply(&text).await
                {
                    warn!(command = name.label(), error = %reply_err, "Failed to send error reply");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, ctx: &Context<'_>, name: CommandName, args: &[&str]) -> HandlerResult {
        let handler = self
            .handlers
            .get(&name)
            .ok_or_else(|| HandlerError::Internal(format!("no handler for {}", name)))?;

        check_requirement(ctx, name, handler.requirement()).await?;
        let cmd = Command::parse(name, args)?;
        handler.handle(ctx, &cmd).await
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

async fn check_requirement(ctx: &Context<'_>, name: CommandName, req: Requirement) -> HandlerResult {
    let allowed = match req {
        Requirement::Anyone => true,
        Requirement::BuyerRole => ctx.author_has_role(ctx.services.buyer_role()),
        Requirement::Permission(required) => ctx.author_permissions().await?.allows(required),
    };
    if allowed {
        Ok(())
    } else {
        Err(HandlerError::PermissionDenied(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_a_handler() {
        let registry = Registry::new();
        for name in CommandName::ALL {
            assert!(registry.handlers.contains_key(&name), "{} unregistered", name);
        }
    }

    #[test]
    fn requirements_match_the_command_table() {
        use keyward_proto::Permissions;
        let registry = Registry::new();
        let req = |name| registry.handlers[&name].requirement();

        assert_eq!(req(CommandName::Redeem), Requirement::Anyone);
        assert_eq!(req(CommandName::Help), Requirement::Anyone);
        assert_eq!(req(CommandName::UserId), Requirement::Anyone);
        assert_eq!(req(CommandName::Download), Requirement::BuyerRole);
        for admin in [
            CommandName::Give,
            CommandName::Take,
            CommandName::KeyList,
            CommandName::Lock,
            CommandName::Unlock,
        ] {
            assert_eq!(req(admin), Requirement::Permission(Permissions::ADMINISTRATOR));
        }
        assert_eq!(
            req(CommandName::Nuke),
            Requirement::Permission(Permissions::MANAGE_CHANNELS)
        );
        assert_eq!(
            req(CommandName::Purge),
            Requirement::Permission(Permissions::MANAGE_MESSAGES)
        );
        assert_eq!(
            req(CommandName::Untimeout),
            Requirement::Permission(Permissions::MODERATE_MEMBERS)
        );
        assert_eq!(
            req(CommandName::Unban),
            Requirement::Permission(Permissions::BAN_MEMBERS)
        );
    }
}
