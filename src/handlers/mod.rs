//! Command handlers.
//!
//! This module contains the [`Handler`] trait, the command [`Registry`] and
//! the [`Router`] that turns gateway events into handler calls.
//!
//! ## Permission-first dispatch
//!
//! Each handler declares a [`Requirement`]. The registry checks it before
//! any argument is looked at, so an unprivileged caller never learns a
//! command's usage line. Arguments are parsed by `keyward_proto` and a
//! handler receives the typed [`Command`](keyward_proto::Command).

mod channel;
mod context;
mod keys;
mod misc;
mod moderation;
mod registry;
mod router;

pub use channel::{LockHandler, NukeHandler};
pub use context::{Context, Handler, Requirement, Services};
pub use keys::{GiveHandler, KeyListHandler, MESSAGE_LIMIT, RedeemHandler, TakeHandler, render_keylist};
pub use misc::{DownloadHandler, HelpHandler, UserIdHandler, help_text};
pub use moderation::{
    BanHandler, KickHandler, PURGE_MAX, PurgeHandler, TimeoutHandler, UnbanHandler,
    UntimeoutHandler,
};
pub use registry::Registry;
pub use router::Router;

use crate::error::HandlerError;
use keyward_proto::Command;

/// A handler received a command variant it does not serve.
fn misrouted(cmd: &Command) -> HandlerError {
    HandlerError::Internal(format!("{} routed to the wrong handler", cmd.name()))
}
