//! Argument parsing for text commands.

use super::types::{Command, CommandName, DEFAULT_REASON};
use crate::error::{ParseError, Result};
use crate::mention::normalize_user_arg;

impl Command {
    /// Parse the argument tokens that followed a command token.
    ///
    /// Extra trailing tokens are ignored except where they form a reason.
    pub fn parse(name: CommandName, args: &[&str]) -> Result<Command> {
        let arg = |i: usize| positional(args, i, name);

        let cmd = match name {
            CommandName::Redeem => Command::Redeem {
                key: arg(0)?.to_string(),
                duration: arg(1)?.to_string(),
            },
            CommandName::Give => Command::Give {
                user_id: normalize_user_arg(arg(0)?).to_string(),
                key: arg(1)?.to_string(),
                duration: arg(2)?.to_string(),
            },
            CommandName::Take => Command::Take {
                user_id: normalize_user_arg(arg(0)?).to_string(),
                key: arg(1)?.to_string(),
            },
            CommandName::KeyList => Command::KeyList,
            CommandName::Help => Command::Help,
            CommandName::UserId => Command::UserId,
            CommandName::Lock => Command::Lock,
            CommandName::Unlock => Command::Unlock,
            CommandName::Download => Command::Download,
            CommandName::Nuke => Command::Nuke {
                channel_id: normalize_channel_arg(arg(0)?).to_string(),
            },
            CommandName::Purge => {
                let raw = arg(0)?;
                let amount = raw
                    .parse::<u32>()
                    .map_err(|_| ParseError::InvalidNumber(raw.to_string()))?;
                Command::Purge { amount }
            }
            CommandName::Timeout => {
                let user_id = normalize_user_arg(arg(0)?).to_string();
                let raw = arg(1)?;
                let minutes = parse_minutes(raw)?;
                Command::Timeout {
                    user_id,
                    minutes,
                    reason: reason_from(&args[2..]),
                }
            }
            CommandName::Untimeout => Command::Untimeout {
                user_id: normalize_user_arg(arg(0)?).to_string(),
            },
            CommandName::Kick => Command::Kick {
                user_id: normalize_user_arg(arg(0)?).to_string(),
                reason: reason_from(&args[1..]),
            },
            CommandName::Ban => Command::Ban {
                user_id: normalize_user_arg(arg(0)?).to_string(),
                reason: reason_from(&args[1..]),
            },
            CommandName::Unban => Command::Unban {
                user_id: normalize_user_arg(arg(0)?).to_string(),
            },
        };
        Ok(cmd)
    }
}

fn positional<'a>(args: &[&'a str], i: usize, command: CommandName) -> Result<&'a str> {
    args.get(i)
        .copied()
        .ok_or(ParseError::MissingArgument { command })
}

/// Parse `<n>m`, `<n>minute` or `<n>minutes` (anchored, no spaces).
pub fn parse_minutes(raw: &str) -> Result<u32> {
    let digits = raw
        .strip_suffix("minutes")
        .or_else(|| raw.strip_suffix("minute"))
        .or_else(|| raw.strip_suffix('m'))
        .ok_or_else(|| ParseError::InvalidTimeout(raw.to_string()))?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidTimeout(raw.to_string()));
    }
    digits
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidTimeout(raw.to_string()))
}

fn reason_from(rest: &[&str]) -> String {
    if rest.is_empty() {
        DEFAULT_REASON.to_string()
    } else {
        rest.join(" ")
    }
}

/// Accept `<#id>` channel mentions as well as raw ids.
fn normalize_channel_arg(arg: &str) -> &str {
    arg.strip_prefix("<#")
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(arg)
}
