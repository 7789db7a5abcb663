//! Command types.
//!
//! [`CommandName`] identifies a command from its leading token before any
//! argument is inspected, so callers can run permission checks first.
//! [`Command`] carries the parsed arguments.

use std::fmt;

/// Reason recorded when a moderator does not supply one.
pub const DEFAULT_REASON: &str = "No reason provided";

/// Every command the bot understands, keyed by its leading token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandName {
    /// `/redeem <key> <duration>`
    Redeem,
    /// `.give <user_id> <key> <time>`
    Give,
    /// `.take <user_id> <key>`
    Take,
    /// `.keylist`
    KeyList,
    /// `.help`
    Help,
    /// `.userid <mention>`
    UserId,
    /// `.lock`
    Lock,
    /// `.unlock`
    Unlock,
    /// `.nuke <channel_id>`
    Nuke,
    /// `.download`
    Download,
    /// `.purge <amount>`
    Purge,
    /// `.timeout <user_id> <duration> [reason]`
    Timeout,
    /// `.untimeout <user_id>`
    Untimeout,
    /// `.kick <user_id> [reason]`
    Kick,
    /// `.ban <user_id> [reason]`
    Ban,
    /// `.unban <user_id>`
    Unban,
}

impl CommandName {
    /// All commands, in help-text order.
    pub const ALL: [CommandName; 16] = [
        CommandName::Lock,
        CommandName::Unlock,
        CommandName::Give,
        CommandName::Redeem,
        CommandName::Take,
        CommandName::KeyList,
        CommandName::Timeout,
        CommandName::Kick,
        CommandName::Ban,
        CommandName::Unban,
        CommandName::Untimeout,
        CommandName::Help,
        CommandName::UserId,
        CommandName::Download,
        CommandName::Nuke,
        CommandName::Purge,
    ];

    /// Look up a command by its exact leading token (case-sensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        let name = match token {
            "/redeem" => Self::Redeem,
            ".give" => Self::Give,
            ".take" => Self::Take,
            ".keylist" => Self::KeyList,
            ".help" => Self::Help,
            ".userid" => Self::UserId,
            ".lock" => Self::Lock,
            ".unlock" => Self::Unlock,
            ".nuke" => Self::Nuke,
            ".download" => Self::Download,
            ".purge" => Self::Purge,
            ".timeout" => Self::Timeout,
            ".untimeout" => Self::Untimeout,
            ".kick" => Self::Kick,
            ".ban" => Self::Ban,
            ".unban" => Self::Unban,
            _ => return None,
        };
        Some(name)
    }

    /// The token that invokes this command.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Redeem => "/redeem",
            Self::Give => ".give",
            Self::Take => ".take",
            Self::KeyList => ".keylist",
            Self::Help => ".help",
            Self::UserId => ".userid",
            Self::Lock => ".lock",
            Self::Unlock => ".unlock",
            Self::Nuke => ".nuke",
            Self::Download => ".download",
            Self::Purge => ".purge",
            Self::Timeout => ".timeout",
            Self::Untimeout => ".untimeout",
            Self::Kick => ".kick",
            Self::Ban => ".ban",
            Self::Unban => ".unban",
        }
    }

    /// Stable lowercase label used in logs and spans.
    pub fn label(&self) -> &'static str {
        self.token().trim_start_matches(['.', '/'])
    }

    /// Usage line shown when arguments are missing.
    pub fn usage(&self) -> &'static str {
        match self {
            Self::Redeem => {
                "Usage: /redeem <key> <duration>. Example: `/redeem abc123 24hr` or `/redeem abc123 L`"
            }
            Self::Give => "Usage: .give <user_id> <key> <time>",
            Self::Take => "Usage: .take <user_id> <key>",
            Self::KeyList => "Usage: .keylist",
            Self::Help => "Usage: .help",
            Self::UserId => "Usage: .userid <pinged_user>",
            Self::Lock => "Usage: .lock",
            Self::Unlock => "Usage: .unlock",
            Self::Nuke => "Usage: .nuke <channel_id>",
            Self::Download => "Usage: .download",
            Self::Purge => "Usage: .purge <amount>",
            Self::Timeout => "Usage: .timeout <user_id> <duration> <reason (optional)>",
            Self::Untimeout => "Usage: .untimeout <user_id>",
            Self::Kick => "Usage: .kick <user_id> <reason (optional)>",
            Self::Ban => "Usage: .ban <user_id> <reason (optional)>",
            Self::Unban => "Usage: .unban <user_id>",
        }
    }

    /// Token and argument synopsis, e.g. `.take <user_id> <key>`.
    pub fn syntax(&self) -> &'static str {
        match self {
            Self::Redeem => "/redeem <key> <duration>",
            Self::Give => ".give <user_id> <key> <time>",
            Self::Take => ".take <user_id> <key>",
            Self::KeyList => ".keylist",
            Self::Help => ".help",
            Self::UserId => ".userid <pinged_user>",
            Self::Lock => ".lock",
            Self::Unlock => ".unlock",
            Self::Nuke => ".nuke <channel_id>",
            Self::Download => ".download",
            Self::Purge => ".purge <amount>",
            Self::Timeout => ".timeout <user_id> <duration> <reason (optional)>",
            Self::Untimeout => ".untimeout <user_id>",
            Self::Kick => ".kick <user_id> <reason (optional)>",
            Self::Ban => ".ban <user_id> <reason (optional)>",
            Self::Unban => ".unban <user_id>",
        }
    }

    /// One-line description for the help listing.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Redeem => "Redeems a key and assigns the Buyer role.",
            Self::Give => "Gives a user a key (Admins only).",
            Self::Take => "Removes a key from a user (Admins only).",
            Self::KeyList => "Lists all redeemed keys.",
            Self::Help => "Shows this message.",
            Self::UserId => "Displays the user's ID that you pinged.",
            Self::Lock => "Locks the channel (Admins only).",
            Self::Unlock => "Unlocks the channel (Admins only).",
            Self::Nuke => "Recreates a text channel from scratch.",
            Self::Download => "Sends the paid download link in DMs.",
            Self::Purge => "Deletes recent messages (1-100).",
            Self::Timeout => "Mutes a user (1-60 minutes).",
            Self::Untimeout => "Removes a timeout from a user.",
            Self::Kick => "Kicks a user from the server.",
            Self::Ban => "Bans a user from the server.",
            Self::Unban => "Unbans a user from the server.",
        }
    }

    /// Split a message line into its command and argument tokens.
    ///
    /// Returns `None` when the first token is not a known command.
    pub fn split(line: &str) -> Option<(Self, Vec<&str>)> {
        let mut tokens = line.split_whitespace();
        let name = Self::from_token(tokens.next()?)?;
        Some((name, tokens.collect()))
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A command with its parsed arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Self-service key redemption.
    Redeem {
        /// The redemption code.
        key: String,
        /// Duration expression (`24hr`, `7day`, `L`).
        duration: String,
    },
    /// Administrative key grant.
    Give {
        /// Receiving user.
        user_id: String,
        /// The redemption code.
        key: String,
        /// Duration expression.
        duration: String,
    },
    /// Administrative key revocation.
    Take {
        /// Owning user.
        user_id: String,
        /// The redemption code.
        key: String,
    },
    /// List every redeemed key.
    KeyList,
    /// Show the command list.
    Help,
    /// Show the id of the first mentioned user.
    UserId,
    /// Deny `@everyone` send permission in the current channel.
    Lock,
    /// Restore `@everyone` send permission in the current channel.
    Unlock,
    /// Recreate a text channel.
    Nuke {
        /// Channel to recreate.
        channel_id: String,
    },
    /// DM the buyer download link.
    Download,
    /// Bulk-delete recent messages.
    Purge {
        /// Requested message count (range checked by the caller).
        amount: u32,
    },
    /// Time a member out.
    Timeout {
        /// Target user.
        user_id: String,
        /// Timeout length in minutes (range checked by the caller).
        minutes: u32,
        /// Audit reason.
        reason: String,
    },
    /// Clear a member's timeout.
    Untimeout {
        /// Target user.
        user_id: String,
    },
    /// Kick a member.
    Kick {
        /// Target user.
        user_id: String,
        /// Audit reason.
        reason: String,
    },
    /// Ban a user.
    Ban {
        /// Target user.
        user_id: String,
        /// Audit reason.
        reason: String,
    },
    /// Lift a ban.
    Unban {
        /// Target user.
        user_id: String,
    },
}

impl Command {
    /// The name of this command.
    pub fn name(&self) -> CommandName {
        match self {
            Self::Redeem { .. } => CommandName::Redeem,
            Self::Give { .. } => CommandName::Give,
            Self::Take { .. } => CommandName::Take,
            Self::KeyList => CommandName::KeyList,
            Self::Help => CommandName::Help,
            Self::UserId => CommandName::UserId,
            Self::Lock => CommandName::Lock,
            Self::Unlock => CommandName::Unlock,
            Self::Nuke { .. } => CommandName::Nuke,
            Self::Download => CommandName::Download,
            Self::Purge { .. } => CommandName::Purge,
            Self::Timeout { .. } => CommandName::Timeout,
            Self::Untimeout { .. } => CommandName::Untimeout,
            Self::Kick { .. } => CommandName::Kick,
            Self::Ban { .. } => CommandName::Ban,
            Self::Unban { .. } => CommandName::Unban,
        }
    }
}
